use crate::common::{body_bytes, body_json, set_cookies, with_csrf, TestHelper};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};

#[tokio::test]
async fn test_gated_route_without_credentials() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .uri("/projects/web.json")
        .body(Body::empty())
        .unwrap();
    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Authentication required");

    let request = Request::builder()
        .uri("/projects/web")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();
    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    let request = Request::builder()
        .uri("/projects/web/environments/production/bugs.atom")
        .body(Body::empty())
        .unwrap();
    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_invalid_session_cookie() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .uri("/projects/web/environments/production/bugs/1.json")
        .header("cookie", "session=garbage")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_remote_user_requires_header() {
    let helper = TestHelper::with_strategy("remote_user").await;

    let request = Request::builder()
        .uri("/")
        .header(header::ACCEPT, "application/json")
        .header("x-remote-user", "   ")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_page_embeds_token() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .uri("/login")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookies(&response)
        .into_iter()
        .find(|cookie| cookie.starts_with("csrf_token="))
        .unwrap();
    let token = cookie
        .trim_start_matches("csrf_token=")
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let page = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(page.contains(&format!("/auth/login?authenticity_token={}", token)));
}

#[tokio::test]
async fn test_login_unavailable_for_remote_user() {
    let helper = TestHelper::with_strategy("remote_user").await;

    let request = Request::builder()
        .uri("/login")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_login_body() {
    let helper = TestHelper::new().await;

    let request = with_csrf(Request::builder())
        .method(Method::POST)
        .uri("/auth/login.json")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{"))
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}
