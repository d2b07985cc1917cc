use crate::common::{body_bytes, TestHelper};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};

#[tokio::test]
async fn test_suffix_routes_to_same_handler() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .uri("/healthcheck.json")
        .body(Body::empty())
        .unwrap();

    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_per_format() {
    let helper = TestHelper::new().await;

    let request = Request::builder()
        .uri("/nowhere")
        .body(Body::empty())
        .unwrap();
    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
    let page = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(page.contains("doesn't exist"));

    let request = Request::builder()
        .uri("/nowhere.json")
        .body(Body::empty())
        .unwrap();
    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());

    let request = Request::builder()
        .uri("/nowhere")
        .header(header::ACCEPT, "application/atom+xml")
        .body(Body::empty())
        .unwrap();
    let response = helper.send_oneshot(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());
}
