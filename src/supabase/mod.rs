pub mod proofs;
pub mod users;

pub use self::proofs::ProofId;
pub use self::users::UserRecord;

use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Result};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Error body returned by the PostgREST layer
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Typed client for the hosted store's REST API, built once at startup and
/// shared read-only by the handlers.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    key: SecretString,
}

#[instrument]
pub fn base_url(url: &str) -> Result<String> {
    let url = Url::parse(url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {}", scheme)),
        },
    };

    let base_url = format!("{scheme}://{host}:{port}");

    debug!("store base URL: {}", base_url);

    Ok(base_url)
}

impl Client {
    pub fn new(globals: &GlobalArgs) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url(&globals.supabase_url)?,
            key: globals.supabase_key.clone(),
        })
    }

    /// Request against a table endpoint, `apikey` and bearer headers set
    pub(crate) fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", self.key.expose_secret())
            .bearer_auth(self.key.expose_secret())
    }

    pub(crate) async fn check(
        &self,
        response: reqwest::Response,
        table: &str,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();

        match response.json::<ApiErrorBody>().await {
            Ok(body) => Err(anyhow!("{} - {}, {}", table, status, body.message)),
            Err(_) => Err(anyhow!("{} - {}", table, status)),
        }
    }

    /// Startup connectivity probe, selects a single row from the users table
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .request(Method::GET, "users")
            .query(&[("select", "email"), ("limit", "1")])
            .send()
            .await?;

        self.check(response, "users").await?;

        Ok(())
    }
}
