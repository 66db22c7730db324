//! End-to-end flows through the song catalog.

use serde_json::{json, Value};

mod common;

async fn body(res: reqwest::Response) -> (u16, Value) {
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}

async fn register(client: &reqwest::Client, srv: &common::TestServer, email: &str) -> (u16, Value) {
    let res = client
        .post(srv.url("/register"))
        .form(&[
            ("username", "tester"),
            ("email", email),
            ("password", "password"),
            ("confirmPassword", "password"),
        ])
        .send()
        .await
        .unwrap();
    body(res).await
}

async fn login(client: &reqwest::Client, srv: &common::TestServer, email: &str) -> (u16, Value) {
    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": email, "password": "password" }))
        .send()
        .await
        .unwrap();
    body(res).await
}

#[tokio::test]
async fn test_register_login_account_logout() {
    let srv = common::start_app().await;
    let client = common::browser();

    let (status, res) = register(&client, &srv, "user@email.com").await;
    assert_eq!(status, 201);
    assert_eq!(res["message"], "User created");
    assert_eq!(res["redirect"], "/login");

    let (status, res) = register(&client, &srv, "user@email.com").await;
    assert_eq!(status, 400);
    assert_eq!(res["message"], "User with this email already exists.");

    let (status, _) = body(client.get(srv.url("/account")).send().await.unwrap()).await;
    assert_eq!(status, 401);

    let (status, res) = login(&client, &srv, "user@email.com").await;
    assert_eq!(status, 200);
    assert_eq!(res["message"], "Logged in successfully!");
    assert_eq!(res["payload"]["loggedIn"], true);

    let (status, res) = body(client.get(srv.url("/account")).send().await.unwrap()).await;
    assert_eq!(status, 200);
    assert_eq!(res["message"], "Account Details");
    assert_eq!(res["payload"]["user"]["email"], "user@email.com");

    let res = client.post(srv.url("/logout")).send().await.unwrap();
    let clears = res
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("session_id=;") && v.contains("Max-Age=0"));
    assert!(clears);
    let (status, res) = body(res).await;
    assert_eq!(status, 200);
    assert_eq!(res["message"], "Logout successful");

    let (status, res) = body(client.get(srv.url("/account")).send().await.unwrap()).await;
    assert_eq!(status, 401);
    assert_eq!(res["message"], "Please log in to view your account");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let srv = common::start_app().await;
    let client = common::browser();
    register(&client, &srv, "user@email.com").await;

    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": "user@email.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let (status, res) = body(res).await;
    assert_eq!(status, 400);
    assert_eq!(res["message"], "Invalid credentials.");

    let (status, res) = body(
        client
            .post(srv.url("/login"))
            .json(&json!({ "password": "password" }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(res["redirect"], "/login?error=Email is required");
}

#[tokio::test]
async fn test_remember_me_prefills_login_form() {
    let srv = common::start_app().await;
    let client = common::browser();
    register(&client, &srv, "user@email.com").await;

    client
        .post(srv.url("/login"))
        .form(&[("email", "user@email.com"), ("password", "password"), ("rememberMe", "on")])
        .send()
        .await
        .unwrap();

    let (status, res) = body(client.get(srv.url("/login")).send().await.unwrap()).await;
    assert_eq!(status, 200);
    assert_eq!(res["template"], "LoginFormView");
    assert_eq!(res["payload"]["rememberEmail"], "user@email.com");
}

#[tokio::test]
async fn test_song_rating_and_reviews() {
    let srv = common::start_app().await;
    let client = common::browser();
    let song = srv.add_song("Test Song", "Test Artist", 2021).await;

    let (status, res) = body(
        client
            .post(srv.url(&format!("/songs/{}/rate", song.id)))
            .form(&[("rating", "4")])
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(res["message"], "Please log in to rate the song");

    register(&client, &srv, "user@email.com").await;
    login(&client, &srv, "user@email.com").await;

    let (status, res) = body(
        client
            .post(srv.url(&format!("/songs/{}/rate", song.id)))
            .json(&json!({ "rating": 4 }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(res["message"], "Rating added successfully");

    let (status, res) = body(client.get(srv.url(&format!("/songs/{}", song.id))).send().await.unwrap()).await;
    assert_eq!(status, 200);
    assert_eq!(res["payload"]["avgRating"], "4.00");
    assert_eq!(res["payload"]["loggedIn"], true);

    let (status, res) = body(
        client
            .post(srv.url(&format!("/songs/{}/review", song.id)))
            .form(&[("content", "Amazing song!")])
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(res["payload"]["review"]["content"], "Amazing song!");
    let review_id = res["payload"]["review"]["id"].as_i64().unwrap();

    let (status, res) = body(
        client
            .get(srv.url(&format!("/songs/{}/reviews", song.id)))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(res["payload"]["reviews"][0]["content"], "Amazing song!");

    let (status, res) = body(
        client
            .delete(srv.url(&format!("/reviews/{review_id}")))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(res["message"], "Review deleted successfully");

    let (status, res) = body(client.get(srv.url("/")).send().await.unwrap()).await;
    assert_eq!(status, 200);
    assert_eq!(res["payload"]["topSongs"][0]["title"], "Test Song");
}

#[tokio::test]
async fn test_invalid_and_missing_ids() {
    let srv = common::start_app().await;
    let client = common::browser();
    register(&client, &srv, "user@email.com").await;
    login(&client, &srv, "user@email.com").await;

    for path in ["/songs/abc", "/songs/0", "/songs/-1/reviews"] {
        let (status, res) = body(client.get(srv.url(path)).send().await.unwrap()).await;
        assert_eq!(status, 400, "{path}");
        assert_eq!(res["message"], "Invalid song ID");
    }

    let (status, res) = body(client.get(srv.url("/songs/999")).send().await.unwrap()).await;
    assert_eq!(status, 404);
    assert_eq!(res["message"], "Song not found");

    let (status, res) = body(
        client
            .post(srv.url("/songs/999/rate"))
            .form(&[("rating", "4")])
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(res["message"], "Error adding rating");

    let (status, res) = body(client.delete(srv.url("/reviews/999")).send().await.unwrap()).await;
    assert_eq!(status, 400);
    assert_eq!(res["message"], "Error deleting review");

    let (status, res) = body(client.get(srv.url("/songs/999/reviews")).send().await.unwrap()).await;
    assert_eq!(status, 404);
    assert_eq!(res["message"], "Song not found");
}

#[tokio::test]
async fn test_search() {
    let srv = common::start_app().await;
    let client = common::bare_client();
    srv.add_song("Heroes", "David Bowie", 1977).await;

    let (status, res) = body(client.post(srv.url("/songs/search")).send().await.unwrap()).await;
    assert_eq!(status, 400);
    assert_eq!(res["message"], "Query parameter is missing");

    let (status, res) = body(
        client
            .post(srv.url("/songs/search"))
            .form(&[("query", "hero")])
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(res["payload"]["song"]["artist"], "David Bowie");

    let (status, res) = body(
        client
            .post(srv.url("/songs/search"))
            .form(&[("query", "nothing")])
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(res["message"], "No song found matching the query");
}
