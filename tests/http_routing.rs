//! HTTP sub-router behaviour through the public API.
//!
//! Covers path re-templating for arbitrary templates, access control against
//! the shapes authorizers actually send, and middleware precedence.

use axum::http::{Method, StatusCode};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

use lambda_router::http::middleware::{from_fn, MiddlewareChain};
use lambda_router::http::template::canonicalize;
use lambda_router::http::{HttpInput, HttpResponse, HttpRoute, HttpRouter, HttpRoutes};
use lambda_router::security::AccessRequirement;

mod common;

use common::{http_event, with_claims};

fn echo_params(input: &HttpInput<'_>) -> HttpResponse {
    let params: Map<String, Value> = input
        .path_params()
        .map(|(k, v)| (k.to_string(), Value::from(v)))
        .collect();
    HttpResponse::success(StatusCode::OK, &params)
}

/// Literal segments are lowercase letters, placeholder names uppercase
/// letters and values digits, so no value can occur inside another part.
fn route_shape() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    (1usize..5).prop_flat_map(|n| {
        (
            prop::collection::vec("[a-z]{1,6}", n + 1),
            prop::collection::btree_set("[0-9]{1,4}", n..=n)
                .prop_map(|values| values.into_iter().collect::<Vec<_>>())
                .prop_shuffle(),
        )
    })
}

fn placeholder(index: usize) -> String {
    char::from(b'A' + index as u8).to_string()
}

fn build(literals: &[String], values: &[String]) -> (String, String, Map<String, Value>) {
    let mut template = format!("/{}", literals[0]);
    let mut resource = template.clone();
    let mut params = Map::new();
    for (i, value) in values.iter().enumerate() {
        let key = placeholder(i);
        template.push_str(&format!("/{{{key}}}/{}", literals[i + 1]));
        resource.push_str(&format!("/{value}/{}", literals[i + 1]));
        params.insert(key, Value::from(value.as_str()));
    }
    (template, resource, params)
}

proptest! {
    #[test]
    fn concrete_path_resolves_to_its_template((literals, values) in route_shape()) {
        let (template, resource, params) = build(&literals, &values);
        let router = HttpRouter::new(
            HttpRoutes::new().route(template.clone(), Method::GET, HttpRoute::new(echo_params)),
        );

        let response = router
            .dispatch(&http_event(&resource, "GET", Value::Object(params.clone())))
            .unwrap();
        prop_assert_eq!(response.status(), StatusCode::OK);
        let echoed: Map<String, Value> = serde_json::from_str(response.body()).unwrap();
        prop_assert_eq!(echoed, params);
    }

    #[test]
    fn other_methods_are_not_found(
        (literals, values) in route_shape(),
        method in prop::sample::select(vec!["POST", "PUT", "DELETE", "PATCH"]),
    ) {
        let (template, resource, params) = build(&literals, &values);
        let router = HttpRouter::new(
            HttpRoutes::new().route(template, Method::GET, HttpRoute::new(echo_params)),
        );

        let response = router
            .dispatch(&http_event(&resource, method, Value::Object(params)))
            .unwrap();
        prop_assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn canonicalize_ignores_parameter_order((literals, values) in route_shape()) {
        let (template, resource, params) = build(&literals, &values);
        let forward: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap_or_default()))
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        prop_assert_eq!(canonicalize(&resource, &forward), template.clone());
        prop_assert_eq!(canonicalize(&resource, &backward), template);
    }
}

fn admin_router(requirement: AccessRequirement) -> HttpRouter {
    HttpRouter::new(HttpRoutes::new().route(
        "/reports/{id}",
        Method::GET,
        HttpRoute::new(echo_params).require(requirement),
    ))
}

fn report_event() -> Value {
    http_event("/reports/9", "GET", json!({"id": "9"}))
}

#[test]
fn test_array_claim_any_of() {
    let router = admin_router(AccessRequirement::roles(["Admin", "Auditor"]));
    let event = with_claims(report_event(), json!({"cognito:groups": ["Reader", "Auditor"]}));
    assert_eq!(router.dispatch(&event).unwrap().status(), StatusCode::OK);
}

#[test]
fn test_string_encoded_claims() {
    let router = admin_router(AccessRequirement::roles(["Admin"]));
    let event = with_claims(report_event(), Value::from(r#"{"cognito:groups":"Admin"}"#));
    assert_eq!(router.dispatch(&event).unwrap().status(), StatusCode::OK);
}

#[test]
fn test_custom_claim_key() {
    let router = admin_router(AccessRequirement::new("custom:role", ["owner"]));

    let allowed = with_claims(report_event(), json!({"custom:role": "owner"}));
    assert_eq!(router.dispatch(&allowed).unwrap().status(), StatusCode::OK);

    let wrong_key = with_claims(report_event(), json!({"cognito:groups": "owner"}));
    assert_eq!(router.dispatch(&wrong_key).unwrap().status(), StatusCode::FORBIDDEN);
}

#[test]
fn test_forbidden_body_and_headers() {
    let router = admin_router(AccessRequirement::roles(["Admin"]));
    let response = router.dispatch(&report_event()).unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.body(), r#"{"error":"forbidden"}"#);
    assert_eq!(response.headers()["Access-Control-Allow-Methods"], "*");
}

#[test]
fn test_public_route_ignores_claims() {
    let router = HttpRouter::new(HttpRoutes::new().route(
        "/reports/{id}",
        Method::GET,
        HttpRoute::new(echo_params),
    ));
    assert_eq!(router.dispatch(&report_event()).unwrap().status(), StatusCode::OK);
}

fn require_json() -> MiddlewareChain {
    MiddlewareChain::new().with(from_fn(|input| match input.header("content-type") {
        Some("application/json") => None,
        _ => Some(HttpResponse::error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected application/json",
        )),
    }))
}

#[test]
fn test_global_middleware_applies_without_local_list() {
    let router = HttpRouter::new(HttpRoutes::new().route(
        "/upload",
        Method::POST,
        HttpRoute::new(echo_params),
    ))
    .with_middleware(require_json());

    let mut event = http_event("/upload", "POST", Value::Null);
    assert_eq!(router.dispatch(&event).unwrap().status(), StatusCode::OK);

    event["headers"] = json!({"Content-Type": "text/plain"});
    let response = router.dispatch(&event).unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.body(), r#"{"error":"expected application/json"}"#);
}

#[test]
fn test_local_middleware_overrides_global() {
    let local = MiddlewareChain::new().with(from_fn(|input| match input.query_param("token") {
        Some(_) => None,
        None => Some(HttpResponse::error(StatusCode::UNAUTHORIZED, "token required")),
    }));
    let router = HttpRouter::new(HttpRoutes::new().route(
        "/upload",
        Method::POST,
        HttpRoute::new(echo_params).with_middleware(local),
    ))
    .with_middleware(require_json());

    // Global content-type check does not run for this route.
    let mut event = http_event("/upload", "POST", Value::Null);
    event["headers"] = json!({"Content-Type": "text/plain"});
    assert_eq!(router.dispatch(&event).unwrap().status(), StatusCode::UNAUTHORIZED);

    event["queryStringParameters"] = json!({"token": "t"});
    assert_eq!(router.dispatch(&event).unwrap().status(), StatusCode::OK);
}
