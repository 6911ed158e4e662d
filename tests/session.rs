mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{app, post_json, send, signup_body};
use serde_json::json;

fn get_session(cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::get("/api/session");
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn signup_cookie_restores_the_session() {
    let app = app();
    let signup = send(&app, post_json("/api/users", signup_body("a@b.com", "alice1"))).await;
    let cookie = signup.cookie_pair("token").expect("session cookie");

    let res = send(&app, get_session(Some(&cookie))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["user"], signup.json["user"]);
}

#[tokio::test]
async fn no_cookie_means_no_user() {
    let app = app();
    let res = send(&app, get_session(None)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json, json!({ "user": null }));
}

#[tokio::test]
async fn tampered_cookie_is_cleared() {
    let app = app();
    let res = send(&app, get_session(Some("token=not-a-jwt"))).await;
    assert_eq!(res.json, json!({ "user": null }));
    let cleared = res
        .set_cookie
        .iter()
        .find(|c| c.starts_with("token="))
        .expect("removal cookie");
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn login_with_username_or_email() {
    let app = app();
    send(&app, post_json("/api/users", signup_body("a@b.com", "alice1"))).await;

    for credential in ["alice1", "a@b.com"] {
        let res = send(
            &app,
            post_json(
                "/api/session",
                json!({ "credential": credential, "password": "secret1" }),
            ),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json["user"]["username"], "alice1");
        assert!(res.cookie_pair("token").is_some());
    }
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = app();
    send(&app, post_json("/api/users", signup_body("a@b.com", "alice1"))).await;

    let res = send(
        &app,
        post_json(
            "/api/session",
            json!({ "credential": "alice1", "password": "wrong-one" }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json["message"], "Login failed");
    assert_eq!(
        res.json["errors"]["credential"],
        "The provided credentials were invalid."
    );
    assert!(res.set_cookie.is_empty());
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = app();
    let res = send(&app, post_json("/api/session", json!({}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json["errors"]["credential"],
        "Please provide a valid email or username."
    );
    assert_eq!(res.json["errors"]["password"], "Please provide a password.");
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = app();
    let req = Request::delete("/api/session")
        .header(header::COOKIE, "token=whatever")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json, json!({ "message": "success" }));
    let cleared = res
        .set_cookie
        .iter()
        .find(|c| c.starts_with("token="))
        .expect("removal cookie");
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let res = send(
        &app,
        Request::get("/api/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let app = app();
    let res = send(
        &app,
        Request::get("/api/nowhere").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json, json!({ "message": "Not found." }));
}
