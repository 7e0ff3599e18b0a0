mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{assert_error, ACCESS_TOKEN_HEADER, SESSION_TOKEN_HEADER};

#[tokio::test]
async fn missing_access_token_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/entities/City/")).send().await?;
    assert_error(res, StatusCode::UNAUTHORIZED, 112).await?;

    let res = server.client.post(server.url("/login")).json(&json!({})).send().await?;
    assert_error(res, StatusCode::UNAUTHORIZED, 112).await
}

#[tokio::test]
async fn wrong_access_token_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(server.url("/entities/City/"))
        .header(ACCESS_TOKEN_HEADER, "nope")
        .send()
        .await?;
    assert_error(res, StatusCode::UNAUTHORIZED, 113).await
}

#[tokio::test]
async fn unknown_url_is_not_found_after_auth() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/nowhere").send().await?;
    assert_error(res, StatusCode::NOT_FOUND, 121).await?;

    let res = server.client.get(server.url("/nowhere")).send().await?;
    assert_error(res, StatusCode::UNAUTHORIZED, 112).await
}

#[tokio::test]
async fn unknown_session_token_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .get("/entities/City/")
        .header(SESSION_TOKEN_HEADER, "not-a-session")
        .send()
        .await?;
    assert_error(res, StatusCode::UNAUTHORIZED, 117).await
}

#[tokio::test]
async fn health_needs_no_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn unrouted_method_on_known_path_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;

    let cases = [
        (reqwest::Method::PATCH, "/entities/City/"),
        (reqwest::Method::POST, "/entities/City/c1/"),
        (reqwest::Method::GET, "/login"),
        (reqwest::Method::DELETE, "/logout/"),
    ];
    for (method, path) in cases {
        let res = server
            .client
            .request(method, server.url(path))
            .header(ACCESS_TOKEN_HEADER, common::ACCESS_TOKEN)
            .send()
            .await?;
        assert_error(res, StatusCode::NOT_FOUND, 121).await?;
    }
    Ok(())
}

#[tokio::test]
async fn undecodable_path_segment_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/entities/%FF/").send().await?;
    assert_error(res, StatusCode::NOT_FOUND, 121).await?;

    let res = server.get("/entities/City/%FF%FE").send().await?;
    assert_error(res, StatusCode::NOT_FOUND, 121).await
}
