use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub session_dir: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Isolated session storage per test process so suites cannot see
        // each other's tokens
        let session_dir = std::env::temp_dir().join(format!(
            "talent-gateway-it-{}",
            uuid::Uuid::new_v4()
        ));

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/talent-gateway");
        cmd.env("TALENT_GATEWAY_PORT", port.to_string())
            .env("TALENT_SESSION_DIR", &session_dir)
            // Point the identity/refresh endpoints at a closed port: every
            // upstream call fails fast and navigations resolve as anonymous
            .env("TALENT_API_GRAPHQL_ENDPOINT", "http://127.0.0.1:9/graphql")
            .env("TALENT_API_REFRESH_ENDPOINT", "http://127.0.0.1:9/refresh")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            session_dir,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    if resp.status() == StatusCode::OK {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }

    /// The persisted token set as raw JSON, or None when no session exists
    pub fn read_session_file(&self) -> Option<serde_json::Value> {
        let content = std::fs::read_to_string(self.session_dir.join("session.json")).ok()?;
        serde_json::from_str(&content).ok()
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that surfaces redirects instead of following them, so tests can
/// assert on Location headers
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build test client")
}
