mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"].is_object());
    Ok(())
}

#[tokio::test]
async fn public_pages_render_for_anonymous_visitors() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for (path, page) in [
        ("/en", "home"),
        ("/en/login-info", "login-info"),
        ("/fr/logged-out", "logged-out"),
    ] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "unexpected status for {}", path);

        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["data"]["page"], page, "unexpected page for {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn login_info_echoes_the_from_parameter() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/en/login-info?from=%2Fen%2Fadmin%2Fusers",
            server.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["from"], "/en/admin/users");
    Ok(())
}
