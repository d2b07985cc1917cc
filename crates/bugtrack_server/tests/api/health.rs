use crate::common::{body_json, set_cookies, TestHelper};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bugtrack_types::Alive;

#[tokio::test]
async fn test_health_check() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .uri("/healthcheck")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    // first visit hands out an authenticity token
    assert!(set_cookies(&response)
        .iter()
        .any(|cookie| cookie.starts_with("csrf_token=")));

    let alive: Alive = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(alive.status, "Alive");
}

#[tokio::test]
async fn test_existing_token_is_not_reissued() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .uri("/healthcheck")
        .header("cookie", "csrf_token=already-set")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
}
