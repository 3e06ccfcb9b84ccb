use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request},
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::{Location, Schema};
use crate::error::ApiError;

/// Schemas for the three request locations of one route.
#[derive(Debug, Clone, Default)]
pub struct RouteSchemas {
    pub params: Option<Schema>,
    pub query: Option<Schema>,
    pub body: Option<Schema>,
}

/// Runs [`RouteSchemas`] before the wrapped handler; a violation answers 400
/// and the handler is never called.
#[derive(Clone)]
pub struct ValidateLayer {
    schemas: Arc<RouteSchemas>,
    abort_early: bool,
    body_limit: usize,
}

impl ValidateLayer {
    pub fn new(abort_early: bool, body_limit: usize) -> Self {
        Self {
            schemas: Arc::new(RouteSchemas::default()),
            abort_early,
            body_limit,
        }
    }

    pub fn params(mut self, schema: Schema) -> Self {
        Arc::make_mut(&mut self.schemas).params = Some(schema);
        self
    }

    pub fn query(mut self, schema: Schema) -> Self {
        Arc::make_mut(&mut self.schemas).query = Some(schema);
        self
    }

    pub fn body(mut self, schema: Schema) -> Self {
        Arc::make_mut(&mut self.schemas).body = Some(schema);
        self
    }
}

impl<S> Layer<S> for ValidateLayer {
    type Service = Validate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Validate {
            inner,
            schemas: self.schemas.clone(),
            abort_early: self.abort_early,
            body_limit: self.body_limit,
        }
    }
}

#[derive(Clone)]
pub struct Validate<S> {
    inner: S,
    schemas: Arc<RouteSchemas>,
    abort_early: bool,
    body_limit: usize,
}

fn string_map(map: HashMap<String, String>) -> Value {
    Value::Object(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect::<Map<_, _>>())
}

fn check(location: Location, schema: &Schema, value: &Value, abort_early: bool, errors: &mut Vec<String>) {
    let found = schema.validate_in(location, value, abort_early);
    if !found.is_empty() {
        tracing::warn!("Validation failed in {}: {} error(s)", location.as_str(), found.len());
        errors.extend(found);
    }
}

impl<S> Service<Request> for Validate<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Take the service that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let schemas = self.schemas.clone();
        let abort_early = self.abort_early;
        let body_limit = self.body_limit;

        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            let mut errors = Vec::new();

            if let Some(schema) = &schemas.params {
                let params = parts
                    .extract::<Path<HashMap<String, String>>>()
                    .await
                    .map(|Path(p)| p)
                    .unwrap_or_default();
                check(Location::Params, schema, &string_map(params), abort_early, &mut errors);
            }

            if let Some(schema) = &schemas.query {
                let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
                    .map(|Query(q)| q)
                    .unwrap_or_default();
                check(Location::Query, schema, &string_map(query), abort_early, &mut errors);
            }

            let body = match &schemas.body {
                None => body,
                Some(schema) => {
                    let bytes = match to_bytes(body, body_limit).await {
                        Ok(bytes) => bytes,
                        Err(_) => return Ok(ApiError::bad_request("Request body too large").into_response()),
                    };

                    let value = if bytes.iter().all(u8::is_ascii_whitespace) {
                        Value::Object(Map::new())
                    } else {
                        match serde_json::from_slice::<Value>(&bytes) {
                            Ok(value) => value,
                            Err(_) => {
                                return Ok(ApiError::validation(vec!["Request body must be valid JSON".to_string()])
                                    .into_response())
                            }
                        }
                    };

                    if value.is_object() {
                        check(Location::Body, schema, &value, abort_early, &mut errors);
                    } else {
                        errors.push("\"value\" must be of type object".to_string());
                    }

                    Body::from(bytes)
                }
            };

            if !errors.is_empty() {
                return Ok(ApiError::validation(errors).into_response());
            }

            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Rule;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use tower::ServiceExt;

    async fn echo(Json(body): Json<Value>) -> Json<Value> {
        Json(body)
    }

    fn router(abort_early: bool) -> Router {
        let layer = ValidateLayer::new(abort_early, 1024)
            .params(Schema::new().field("id", [Rule::Required, Rule::Uuid]))
            .body(
                Schema::new()
                    .field("name", [Rule::Required, Rule::String])
                    .field("email", [Rule::Required, Rule::Email]),
            );
        Router::new().route("/items/:id", post(echo).layer(layer))
    }

    async fn send(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn valid_request_reaches_handler_with_body_intact() {
        let id = uuid::Uuid::new_v4();
        let (status, body) = send(
            router(false),
            &format!("/items/{}", id),
            r#"{"name":"n","email":"n@example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "n");
    }

    #[tokio::test]
    async fn locations_aggregate_in_order() {
        let (status, body) = send(router(false), "/items/42", r#"{}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(
            body["errors"],
            serde_json::json!([
                "\"id\" must be a valid GUID",
                "\"name\" is required",
                "\"email\" is required"
            ])
        );
    }

    #[tokio::test]
    async fn abort_early_keeps_one_error_per_location() {
        let (_, body) = send(router(true), "/items/42", "").await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_failure() {
        let id = uuid::Uuid::new_v4();
        let (status, body) = send(router(false), &format!("/items/{}", id), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0], "Request body must be valid JSON");
    }
}
