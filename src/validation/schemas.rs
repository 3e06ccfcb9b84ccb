//! Per-route request schemas.

use super::{Rule, Schema};

const PASSWORD_MIN: usize = 6;
const NAME_MAX: usize = 100;

fn id_params(names: &[&'static str]) -> Schema {
    names
        .iter()
        .fold(Schema::new(), |schema, name| schema.field(*name, [Rule::Required, Rule::Uuid]))
}

pub fn tenant_params() -> Schema {
    id_params(&["id"])
}

pub fn project_params() -> Schema {
    id_params(&["projectId"])
}

pub fn team_member_params() -> Schema {
    id_params(&["projectId", "id"])
}

pub fn media_params() -> Schema {
    id_params(&["id"])
}

pub fn template_params() -> Schema {
    Schema::new().field("name", [Rule::Required, Rule::NonEmpty, Rule::MaxLength(512)])
}

pub fn create_tenant() -> Schema {
    Schema::new()
        .field("name", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("domain", [Rule::Required, Rule::String, Rule::Domain])
        .field("websiteName", [Rule::String, Rule::MaxLength(NAME_MAX)])
        .field("favicon", [Rule::String, Rule::Url])
        .field("adminEmail", [Rule::Required, Rule::String, Rule::Email])
        .field("adminPassword", [Rule::Required, Rule::String, Rule::MinLength(PASSWORD_MIN)])
        .field("adminUsername", [Rule::String, Rule::Username, Rule::MaxLength(NAME_MAX)])
        .field("adminFirstName", [Rule::String, Rule::MaxLength(NAME_MAX)])
        .field("adminLastName", [Rule::String, Rule::MaxLength(NAME_MAX)])
}

pub fn tenant_status() -> Schema {
    Schema::new().field("isActive", [Rule::Required, Rule::Boolean])
}

pub fn tenant_settings() -> Schema {
    Schema::new()
        .field("websiteName", [Rule::String, Rule::MaxLength(NAME_MAX)])
        .field("favicon", [Rule::String, Rule::Url])
        .field("whatsapp", [Rule::Object])
        .field("whatsapp.accountId", [Rule::String])
        .field("whatsapp.accessToken", [Rule::String])
        .field("whatsapp.appId", [Rule::String])
        .field("whatsapp.baseUrl", [Rule::String, Rule::Url])
        .field("whatsapp.apiVersion", [Rule::String, Rule::MaxLength(16)])
}

pub fn create_team_member() -> Schema {
    Schema::new()
        .field("username", [Rule::Required, Rule::String, Rule::Username, Rule::MaxLength(NAME_MAX)])
        .field("email", [Rule::Required, Rule::String, Rule::Email])
        .field("password", [Rule::Required, Rule::String, Rule::MinLength(PASSWORD_MIN)])
        .field("firstName", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("lastName", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("mobileNumber", [Rule::String, Rule::MaxLength(32)])
        .field("permissions", [Rule::StringArray])
}

pub fn update_team_member() -> Schema {
    Schema::new()
        .field("username", [Rule::String, Rule::Username, Rule::MaxLength(NAME_MAX)])
        .field("email", [Rule::String, Rule::Email])
        .field("password", [Rule::String, Rule::MinLength(PASSWORD_MIN)])
        .field("firstName", [Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("lastName", [Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("mobileNumber", [Rule::String, Rule::MaxLength(32)])
        .field("permissions", [Rule::StringArray])
        .field("isActive", [Rule::Boolean])
}

pub fn register() -> Schema {
    Schema::new()
        .field("username", [Rule::Required, Rule::String, Rule::Username, Rule::MaxLength(NAME_MAX)])
        .field("email", [Rule::Required, Rule::String, Rule::Email])
        .field("password", [Rule::Required, Rule::String, Rule::MinLength(PASSWORD_MIN)])
        .field("firstName", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("lastName", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("mobileNumber", [Rule::String, Rule::MaxLength(32)])
        .field("tenantDomain", [Rule::Required, Rule::String, Rule::Domain])
}

pub fn login() -> Schema {
    Schema::new()
        .field("email", [Rule::Required, Rule::String, Rule::Email])
        .field("password", [Rule::Required, Rule::String, Rule::NonEmpty])
}

pub fn update_profile() -> Schema {
    Schema::new()
        .field("username", [Rule::String, Rule::Username, Rule::MaxLength(NAME_MAX)])
        .field("password", [Rule::String, Rule::MinLength(PASSWORD_MIN)])
        .field("firstName", [Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("lastName", [Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("mobileNumber", [Rule::String, Rule::MaxLength(32)])
}

pub fn create_user() -> Schema {
    Schema::new()
        .field("username", [Rule::Required, Rule::String, Rule::Username, Rule::MaxLength(NAME_MAX)])
        .field("email", [Rule::Required, Rule::String, Rule::Email])
        .field("password", [Rule::Required, Rule::String, Rule::MinLength(PASSWORD_MIN)])
        .field("firstName", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("lastName", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(NAME_MAX)])
        .field("mobileNumber", [Rule::String, Rule::MaxLength(32)])
        .field("role", [Rule::String, Rule::OneOf(&["user", "tenant_admin"])])
}

pub fn create_template() -> Schema {
    Schema::new()
        .field("name", [Rule::Required, Rule::String, Rule::NonEmpty, Rule::MaxLength(512)])
        .field("language", [Rule::Required, Rule::String, Rule::NonEmpty])
        .field(
            "category",
            [Rule::Required, Rule::String, Rule::OneOf(&["MARKETING", "UTILITY", "AUTHENTICATION"])],
        )
        .field("components", [Rule::Required, Rule::Array])
}

pub fn analytics_query() -> Schema {
    Schema::new()
        .field("start", [Rule::Required, Rule::Integer])
        .field("end", [Rule::Required, Rule::Integer])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn team_member_create_reports_each_missing_field() {
        let errors = create_team_member().validate(&json!({ "email": "x@example.com" }), false);
        assert_eq!(
            errors,
            vec![
                "\"username\" is required",
                "\"password\" is required",
                "\"firstName\" is required",
                "\"lastName\" is required",
            ]
        );
    }

    #[test]
    fn settings_accept_partial_credentials() {
        let body = json!({ "whatsapp": { "accountId": "123" } });
        assert!(tenant_settings().validate(&body, false).is_empty());

        let bad = json!({ "whatsapp": "token" });
        assert_eq!(
            tenant_settings().validate(&bad, false),
            vec!["\"whatsapp\" must be of type object"]
        );
    }

    #[test]
    fn tenant_creation_checks_domain_and_password() {
        let body = json!({
            "name": "Acme",
            "domain": "not a domain",
            "adminEmail": "admin@acme.test",
            "adminPassword": "123"
        });
        assert_eq!(
            create_tenant().validate(&body, false),
            vec![
                "\"domain\" must contain a valid domain name",
                "\"adminPassword\" length must be at least 6 characters long",
            ]
        );
    }
}
