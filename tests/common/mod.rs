#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Each test binary gets its own throwaway database file
        let db_path = std::env::temp_dir().join(format!("reviewpilot-test-{}.db", port));
        let _ = std::fs::remove_file(&db_path);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_reviewpilot-api"));
        cmd.env("PORT", port.to_string())
            .env("DATABASE_URL", db_path.display().to_string())
            .env("APP_ENV", "development")
            .env("JWT_SECRET", "integration-test-secret")
            .env("RESPONDER_LATENCY_MS", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
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
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique per-test email so parallel tests never collide.
pub fn unique_email(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@example.com", prefix, std::process::id(), n)
}

/// Sign up a fresh account and return (token, signup body).
pub async fn signup_and_login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    name: &str,
) -> Result<(String, serde_json::Value)> {
    let signup = client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&serde_json::json!({
            "email": email,
            "password": "Password123!",
            "name": name,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        signup.status() == StatusCode::CREATED,
        "signup failed: {}",
        signup.status()
    );
    let signup_body = signup.json::<serde_json::Value>().await?;

    let login = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({
            "email": email,
            "password": "Password123!",
        }))
        .send()
        .await?;
    anyhow::ensure!(
        login.status() == StatusCode::OK,
        "login failed: {}",
        login.status()
    );
    let login_body = login.json::<serde_json::Value>().await?;
    let token = login_body["token"]
        .as_str()
        .context("login response missing token")?
        .to_string();

    Ok((token, signup_body))
}

/// Create a review and return its JSON representation.
pub async fn create_review(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    payload: serde_json::Value,
) -> Result<serde_json::Value> {
    let resp = client
        .post(format!("{}/api/reviews", base_url))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await?;
    anyhow::ensure!(
        resp.status() == StatusCode::CREATED,
        "create review failed: {}",
        resp.status()
    );
    let body = resp.json::<serde_json::Value>().await?;
    Ok(body["review"].clone())
}
