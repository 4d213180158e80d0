mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn anonymous_admin_navigation_redirects_to_sign_in() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client();

    let res = client
        .get(format!("{}/en/admin/users", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        res.headers()["location"],
        "/en/login-info?from=%2Fen%2Fadmin%2Fusers"
    );
    Ok(())
}

#[tokio::test]
async fn anonymous_redirect_keeps_the_requested_locale() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client();

    let res = client
        .get(format!("{}/fr/applicant", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        res.headers()["location"],
        "/fr/login-info?from=%2Ffr%2Fapplicant"
    );
    Ok(())
}

#[tokio::test]
async fn whoami_reports_anonymous_without_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["user"].is_null());
    Ok(())
}
