use crate::common::{body_json, with_csrf, TestHelper, CSRF_TOKEN};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login.json")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"admin","password":"admin"}"#))
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid authenticity token");
}

#[tokio::test]
async fn test_mismatched_token_is_rejected() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/projects/web")
        .header("cookie", format!("csrf_token={}", CSRF_TOKEN))
        .header("x-csrf-token", "forged")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_token_in_query_is_accepted() {
    let helper = TestHelper::with_strategy("remote_user").await;

    // passes the token check, then login is unavailable for remote_user
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/auth/login?authenticity_token={}", CSRF_TOKEN))
        .header("cookie", format!("csrf_token={}", CSRF_TOKEN))
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bearer_requests_are_exempt() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/projects/web.json")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    // reaches the login gate, which rejects the token
    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_with_token() {
    let helper = TestHelper::new().await;

    let request = with_csrf(Request::builder())
        .method(Method::POST)
        .uri("/auth/logout.json")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
