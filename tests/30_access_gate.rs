mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};

#[tokio::test]
async fn unauthenticated_studio_redirects_to_login() -> Result<()> {
    let server = common::TestServer::start().await?;
    let resp = server.client().get(server.url("/studio/desk/projectMeta")).send().await?;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = resp.headers().get(header::LOCATION).unwrap().to_str()?.to_string();
    let url = url::Url::parse(&server.url(&location))?;
    assert_eq!(url.path(), "/login");
    let callback = url
        .query_pairs()
        .find(|(k, _)| k == "callbackUrl")
        .map(|(_, v)| v.into_owned());
    assert_eq!(callback.as_deref(), Some("/studio/desk/projectMeta"));
    Ok(())
}

#[tokio::test]
async fn forged_token_is_treated_as_unauthenticated() -> Result<()> {
    let server = common::TestServer::start().await?;
    let resp = server
        .client()
        .get(server.url("/studio"))
        .header(header::COOKIE, "session_token=not.a.token")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FOUND);
    Ok(())
}

#[tokio::test]
async fn non_admin_is_forbidden_with_empty_body() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.session("editor");
    let resp = server
        .client()
        .get(server.url("/studio"))
        .header(header::COOKIE, format!("session_token={}", token))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.text().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn admin_reaches_the_studio() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.session("admin");

    let resp = server
        .client()
        .get(server.url("/studio/desk"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await?;
    assert!(body.contains(r#"data-project-id="itest""#));
    assert!(body.contains("itest@example.dev"));
    Ok(())
}

#[tokio::test]
async fn custom_prefixes_are_gated() -> Result<()> {
    let server = common::TestServer::start_with(&[("STUDIO_PATHS", "/admin,/studio")]).await?;
    let resp = server.client().get(server.url("/admin/tools")).send().await?;
    assert_eq!(resp.status(), StatusCode::FOUND);

    // Paths that merely share a prefix string stay public.
    let resp = server.client().get(server.url("/administrator")).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn login_page_carries_callback() -> Result<()> {
    let server = common::TestServer::start().await?;
    let resp = server
        .client()
        .get(server.url("/login?callbackUrl=%2Fstudio%2Fdesk"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await?.contains(r#"value="/studio/desk""#));
    Ok(())
}
