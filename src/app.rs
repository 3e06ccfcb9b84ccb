//! Router assembly.
//!
//! Public routes need nothing. Protected and elevated routes carry the JWT
//! middleware per method; each route validates params, query and body
//! outside of it, so a malformed request is rejected before identity is
//! resolved.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::validation::{schemas, ValidateLayer};
use crate::AppState;

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        // Public
        .route("/health", get(public::health::health_get))
        .merge(auth_public_routes(&config))
        // Protected + elevated
        .merge(profile_routes(&state))
        .merge(user_routes(&state))
        .merge(team_member_routes(&state))
        .merge(media_routes(&state))
        .merge(template_routes(&state))
        .merge(tenant_routes(&state))
        // Global middleware
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn validate(config: &AppConfig) -> ValidateLayer {
    ValidateLayer::new(config.api.validation_abort_early, config.api.max_request_size_bytes)
}

/// Require a verified bearer token. Layers added to the result run before it.
fn authenticated(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // Browsers refuse credentials with a wildcard origin
    if config.security.cors_origins.iter().any(|origin| origin.trim() == "*") {
        tracing::warn!("CORS allows any origin; credentials are disabled");
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(origins).allow_credentials(true)
}

fn auth_public_routes(config: &AppConfig) -> Router<AppState> {
    use public::auth;

    Router::new()
        .route(
            "/api/auth/register",
            post(auth::register_post).layer(validate(config).body(schemas::register())),
        )
        .route(
            "/api/auth/login",
            post(auth::login_post).layer(validate(config).body(schemas::login())),
        )
}

fn profile_routes(state: &AppState) -> Router<AppState> {
    let config = &state.config;

    Router::new()
        .route("/api/auth/me", authenticated(state, get(protected::me_get)))
        .route(
            "/api/users/profile",
            authenticated(state, put(protected::profile_put)).layer(validate(config).body(schemas::update_profile())),
        )
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let config = &state.config;

    Router::new().route(
        "/api/users",
        authenticated(state, get(protected::users_get)).merge(
            authenticated(state, post(protected::users_post)).layer(validate(config).body(schemas::create_user())),
        ),
    )
}

fn team_member_routes(state: &AppState) -> Router<AppState> {
    let config = &state.config;

    Router::new()
        .route(
            "/api/projects/:projectId/team-members",
            authenticated(state, get(protected::team_members_get))
                .layer(validate(config).params(schemas::project_params()))
                .merge(
                    authenticated(state, post(protected::team_member_post)).layer(
                        validate(config)
                            .params(schemas::project_params())
                            .body(schemas::create_team_member()),
                    ),
                ),
        )
        .route(
            "/api/projects/:projectId/team-members/:id",
            authenticated(
                state,
                get(protected::team_member_get).delete(protected::team_member_delete),
            )
            .layer(validate(config).params(schemas::team_member_params()))
            .merge(
                authenticated(state, put(protected::team_member_put)).layer(
                    validate(config)
                        .params(schemas::team_member_params())
                        .body(schemas::update_team_member()),
                ),
            ),
        )
}

fn media_routes(state: &AppState) -> Router<AppState> {
    let config = &state.config;

    Router::new()
        .route(
            "/api/media/upload",
            authenticated(state, post(protected::media_upload))
                .layer(DefaultBodyLimit::max(config.media.upload_request_limit())),
        )
        .route("/api/media", authenticated(state, get(protected::media_get)))
        .route(
            "/api/media/:id",
            authenticated(state, axum::routing::delete(protected::media_delete))
                .layer(validate(config).params(schemas::media_params())),
        )
}

fn template_routes(state: &AppState) -> Router<AppState> {
    let config = &state.config;

    Router::new()
        .route(
            "/api/templates",
            authenticated(state, get(protected::templates_get)).merge(
                authenticated(state, post(protected::template_post))
                    .layer(validate(config).body(schemas::create_template())),
            ),
        )
        .route(
            "/api/templates/analytics",
            authenticated(state, get(protected::analytics_get))
                .layer(validate(config).query(schemas::analytics_query())),
        )
        .route(
            "/api/templates/:name",
            authenticated(state, axum::routing::delete(protected::template_delete))
                .layer(validate(config).params(schemas::template_params())),
        )
}

fn tenant_routes(state: &AppState) -> Router<AppState> {
    let config = &state.config;

    Router::new()
        .route(
            "/api/tenants",
            authenticated(state, get(elevated::tenant_list)).merge(
                authenticated(state, post(elevated::tenant_create))
                    .layer(validate(config).body(schemas::create_tenant())),
            ),
        )
        .route(
            "/api/tenants/:id",
            authenticated(state, put(protected::tenant_settings_put)).layer(
                validate(config)
                    .params(schemas::tenant_params())
                    .body(schemas::tenant_settings()),
            ),
        )
        .route(
            "/api/tenants/:id/status",
            authenticated(state, put(elevated::tenant_status)).layer(
                validate(config)
                    .params(schemas::tenant_params())
                    .body(schemas::tenant_status()),
            ),
        )
}
