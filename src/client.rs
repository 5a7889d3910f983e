//! MailHog v2 API async client implementation.

use crate::models::{MessageList, Messages};
use crate::{Error, Message, Result};
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderValue};
use std::fmt;
use std::time::Duration;

/// Port MailHog serves its HTTP API on by default.
pub const DEFAULT_PORT: u16 = 8025;

/// Number of results requested by a search when no limit is given.
pub const DEFAULT_LIMIT: u32 = 100;

/// Filter dimension of a search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criteria {
    /// Full-text match on the message content.
    Containing,
    /// Match on the sender address.
    From,
    /// Match on a recipient address.
    To,
}

impl Criteria {
    /// The `kind` value MailHog expects for this criteria.
    pub fn as_str(self) -> &'static str {
        match self {
            Criteria::Containing => "containing",
            Criteria::From => "from",
            Criteria::To => "to",
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Async client for the MailHog v2 HTTP API.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] for a custom port,
/// timeout, proxy, or a preconfigured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the MailHog instance at `host` on [`DEFAULT_PORT`].
    ///
    /// `host` includes the scheme, e.g. `"http://localhost"`.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailhog_client::Client;
    /// # fn main() -> Result<(), mailhog_client::Error> {
    /// let client = Client::new("http://localhost")?;
    /// assert_eq!(client.base_url(), "http://localhost:8025/api/v2/");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(host: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().host(host).build()
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every captured message.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailhog_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mailhog_client::Error> {
    /// let client = Client::new("http://localhost")?;
    /// for msg in client.find_all().await? {
    ///     println!("{}: {:?}", msg.id(), msg.subject());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_all(&self) -> Result<Messages> {
        self.query("messages", &[]).await
    }

    /// Search messages matching `value` on the given criteria.
    ///
    /// At most `limit` messages are requested, [`DEFAULT_LIMIT`] when `None`.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailhog_client::{Client, Criteria};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mailhog_client::Error> {
    /// let client = Client::new("http://localhost")?;
    /// let welcome = client.find_by(Criteria::Containing, "Welcome", Some(10)).await?;
    /// println!("{} matches", welcome.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by(
        &self,
        criteria: Criteria,
        value: &str,
        limit: Option<u32>,
    ) -> Result<Messages> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).to_string();
        let params = [
            ("kind", criteria.as_str()),
            ("query", value),
            ("limit", limit.as_str()),
        ];

        self.query("search", &params).await
    }

    /// First message matching `value` on the given criteria.
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub async fn find_one_by(&self, criteria: Criteria, value: &str) -> Result<Option<Message>> {
        Ok(self.find_by(criteria, value, Some(1)).await?.next())
    }

    /// Messages sent to `to`.
    pub async fn find_to(&self, to: &str, limit: Option<u32>) -> Result<Messages> {
        self.find_by(Criteria::To, to, limit).await
    }

    /// Messages sent from `from`.
    pub async fn find_from(&self, from: &str, limit: Option<u32>) -> Result<Messages> {
        self.find_by(Criteria::From, from, limit).await
    }

    /// First message sent to `to`.
    pub async fn find_one_to(&self, to: &str) -> Result<Option<Message>> {
        self.find_one_by(Criteria::To, to).await
    }

    /// First message sent from `from`.
    pub async fn find_one_from(&self, from: &str) -> Result<Option<Message>> {
        self.find_one_by(Criteria::From, from).await
    }

    /// First message containing `keyword` in its content.
    pub async fn find_one_like(&self, keyword: &str) -> Result<Option<Message>> {
        self.find_one_by(Criteria::Containing, keyword).await
    }

    /// The last message of the full listing, if any.
    pub async fn get_last(&self) -> Result<Option<Message>> {
        Ok(self.find_all().await?.last())
    }

    /// Common GET request pattern shared by every listing operation.
    async fn query(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Messages> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            warn!("GET {} failed with status {}", url, status);
            return Err(Error::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let body = response.bytes().await?;
        let list: MessageList = serde_json::from_slice(&body)?;
        debug!(
            "GET {} returned {} items",
            url,
            list.items.as_ref().map_or(0, Vec::len)
        );

        Ok(Messages::new(list))
    }
}

/// Builder for configuring a MailHog client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    host: String,
    port: u16,
    timeout: Option<Duration>,
    proxy: Option<String>,
    user_agent: Option<String>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Host `http://localhost`
    /// - Port [`DEFAULT_PORT`]
    /// - reqwest's own timeout, proxy and user agent behavior
    pub fn new() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: DEFAULT_PORT,
            timeout: None,
            proxy: None,
            user_agent: None,
            http: None,
        }
    }

    /// Set the MailHog host, scheme included (e.g. "http://mailhog").
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the API port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set a total timeout for each request.
    ///
    /// Passed straight to reqwest; no timeout is applied otherwise.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:1080").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a preconfigured `reqwest::Client` as transport.
    ///
    /// When set, `timeout`, `proxy` and `user_agent` are ignored.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client. No request is sent.
    pub fn build(self) -> Result<Client> {
        let base_url = format!(
            "{}:{}/api/v2/",
            self.host.trim_end_matches('/'),
            self.port
        );

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(proxy_url) = &self.proxy {
                    builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
                }
                if let Some(user_agent) = &self.user_agent {
                    builder = builder.user_agent(user_agent.as_str());
                }
                builder.build()?
            }
        };

        Ok(Client { http, base_url })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
