mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{day, Fixture};
use order_service::api::{create_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn order_walks_through_the_api() {
    let f = Fixture::with_capacity(1).await;
    let app = create_router(AppState { orders: f.orders.clone() });

    let request = serde_json::to_value(f.request(day(1), day(3))).unwrap();
    let (status, created) = send(&app, post_json("/orders", request)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending_payment");
    assert_eq!(created["nights"], 2);
    assert!(created.get("assigned_room_number").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, post_json(&format!("/orders/{id}/confirm"), json!({"room_number": "12"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "state_conflict");

    let (status, paid) = send(&app, post_json(&format!("/orders/{id}/pay"), Value::Null)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "pending_confirmation");

    let (status, confirmed) = send(&app, post_json(&format!("/orders/{id}/confirm"), json!({"room_number": "12"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "pending_check_in");
    assert_eq!(confirmed["assigned_room_number"], "12");
    assert!(confirmed["confirmation_timestamp"].is_string());

    let (status, fetched) = send(&app, Request::get(format!("/orders/{id}")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, confirmed);
    assert_eq!(f.available(day(1), day(3)).await, vec![0, 0]);
}

#[tokio::test]
async fn sold_out_confirmation_is_a_conflict() {
    let f = Fixture::with_capacity(1).await;
    let app = create_router(AppState { orders: f.orders.clone() });

    let mut ids = Vec::new();
    for _ in 0..2 {
        let order = f.orders.create_order(f.request(day(2), day(3))).await.unwrap();
        f.orders.pay_order(order.id).await.unwrap();
        ids.push(order.id);
    }

    let (status, _) = send(&app, post_json(&format!("/orders/{}/confirm", ids[0]), json!({"room_number": "1"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, post_json(&format!("/orders/{}/confirm", ids[1]), json!({"room_number": "2"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "insufficient_inventory");
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let f = Fixture::with_capacity(1).await;
    let app = create_router(AppState { orders: f.orders.clone() });

    let (status, body) = send(&app, post_json("/orders", serde_json::to_value(f.request(day(4), day(2))).unwrap())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation_error");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, Request::get(format!("/orders/{missing}")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, _) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}
