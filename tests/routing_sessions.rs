//! Routing and session behavior over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use setlist::catalog::InMemoryCatalog;
use setlist::config::AppConfig;
use setlist::http::{handler_fn, Handler, Reply, Request, Response};
use setlist::routing::Router;
use serde_json::{json, Value};

mod common;

fn reply_with(status: StatusCode, message: &str, payload: Value) -> Response {
    let mut res = Response::new();
    let _ = res.send(Reply::new(status, message).payload(payload));
    res
}

fn test_routes() -> Router<Handler> {
    let mut routes = Router::new();
    routes
        .get(
            "/songs/:id",
            handler_fn(|req: Request, _res: Response| async move {
                let params: Value = req.params().iter().map(|(k, v)| (k.to_string(), json!(v))).collect();
                reply_with(StatusCode::OK, "param", params)
            }),
        )
        .unwrap();
    routes
        .get(
            "/songs/top",
            handler_fn(|_req: Request, _res: Response| async move {
                reply_with(StatusCode::OK, "literal", json!({}))
            }),
        )
        .unwrap();
    routes
        .post(
            "/login-as/:id",
            handler_fn(|req: Request, _res: Response| async move {
                let id = req.get_id().unwrap_or_default();
                req.session().set("userId", id);
                reply_with(StatusCode::OK, "ok", json!({ "session": req.session().id() }))
            }),
        )
        .unwrap();
    routes
        .get(
            "/whoami",
            handler_fn(|req: Request, _res: Response| async move {
                let user = req.session().get("userId").and_then(|v| v.as_int());
                reply_with(StatusCode::OK, "whoami", json!({ "userId": user, "session": req.session().id() }))
            }),
        )
        .unwrap();
    routes
}

async fn start() -> common::TestServer {
    common::start_with_routes(AppConfig::default(), test_routes(), Arc::new(InMemoryCatalog::new())).await
}

fn session_cookie(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session_id="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_param_route_captures_id() {
    let srv = start().await;
    let res = common::bare_client().get(srv.url("/songs/42")).send().await.unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["payload"], json!({ "id": "42" }));
}

#[tokio::test]
async fn test_literal_beats_param_regardless_of_order() {
    let srv = start().await;
    let body: Value = common::bare_client()
        .get(srv.url("/songs/top"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "literal");
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let srv = start().await;
    let res = common::bare_client().post(srv.url("/unknown/path")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn test_wrong_method_is_405_with_allow() {
    let srv = start().await;
    let res = common::bare_client().delete(srv.url("/songs/42")).send().await.unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(res.headers()["allow"], "GET");
}

#[tokio::test]
async fn test_session_cookie_round_trip() {
    let srv = start().await;
    let client = common::bare_client();

    let first = client.get(srv.url("/whoami")).send().await.unwrap();
    let cookie = session_cookie(&first).expect("first response sets a session cookie");
    let first: Value = first.json().await.unwrap();

    let second = client
        .get(srv.url("/whoami"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert!(session_cookie(&second).is_none());
    let second: Value = second.json().await.unwrap();

    assert_eq!(first["payload"]["session"], second["payload"]["session"]);
    assert_eq!(srv.sessions.len(), 1);
}

#[tokio::test]
async fn test_destroyed_session_is_not_resurrected() {
    let srv = start().await;
    let client = common::browser();

    let res: Value = client.post(srv.url("/login-as/7")).send().await.unwrap().json().await.unwrap();
    let old_id = res["payload"]["session"].as_str().unwrap().to_string();

    let res: Value = client.get(srv.url("/whoami")).send().await.unwrap().json().await.unwrap();
    assert_eq!(res["payload"]["userId"], 7);

    srv.sessions.destroy(&old_id);

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert!(session_cookie(&res).is_some());
    let res: Value = res.json().await.unwrap();
    assert_ne!(res["payload"]["session"], old_id.as_str());
    assert!(res["payload"]["userId"].is_null());
}

#[tokio::test]
async fn test_expired_session_is_replaced() {
    let mut config = AppConfig::default();
    config.session.ttl_secs = 1;
    config.session.sweep_interval_secs = 0;
    let srv = common::start_with_routes(config, test_routes(), Arc::new(InMemoryCatalog::new())).await;
    let client = common::browser();

    let res: Value = client.post(srv.url("/login-as/3")).send().await.unwrap().json().await.unwrap();
    let old_id = res["payload"]["session"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let res = common::bare_client()
        .get(srv.url("/whoami"))
        .header(reqwest::header::COOKIE, format!("session_id={old_id}"))
        .send()
        .await
        .unwrap();
    let res: Value = res.json().await.unwrap();
    assert_ne!(res["payload"]["session"], old_id.as_str());
    assert!(res["payload"]["userId"].is_null());
}

#[tokio::test]
async fn test_garbled_cookie_header_is_harmless() {
    let srv = start().await;
    let res = common::bare_client()
        .get(srv.url("/whoami"))
        .header(reqwest::header::COOKIE, "=; ;;session_id; junk")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(session_cookie(&res).is_some());
}
