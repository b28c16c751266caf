use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_NETWORK_ERRORS, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::session_store::SessionStore;
use crate::types::{AuthToken, Credentials, QueryRequest, QueryResponse};

const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Environment variable consulted when no base URL is passed explicitly.
pub const BASE_URL_ENV: &str = "QUERENT_BASE_URL";

/// The backend operations a view can invoke.
///
/// [`Client`] is the HTTP implementation.  Views are written against this trait
/// so they can be driven by anything that answers the same three calls.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Log in and persist the issued token.
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken>;

    /// Register a new account and persist the issued token.
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthToken>;

    /// Ask a question and return the answer verbatim.
    async fn query(&self, question: &str) -> Result<QueryResponse>;
}

/// The three endpoints the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /api/login`
    Login,
    /// `POST /api/register`
    Register,
    /// `POST /api/query`
    Query,
}

impl Endpoint {
    /// Path relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "api/login",
            Endpoint::Register => "api/register",
            Endpoint::Query => "api/query",
        }
    }

    /// True for endpoints that issue a session token.
    pub fn issues_token(self) -> bool {
        matches!(self, Endpoint::Login | Endpoint::Register)
    }

    /// Message used when the backend rejects a request without saying why.
    fn rejection_fallback(self) -> &'static str {
        match self {
            Endpoint::Login => "Invalid email or password.",
            Endpoint::Register => "Registration failed. Please try again.",
            Endpoint::Query => "Sorry, something went wrong.",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Login => write!(f, "login"),
            Endpoint::Register => write!(f, "register"),
            Endpoint::Query => write!(f, "query"),
        }
    }
}

/// Transport settings for [`Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Overall request timeout.  `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    /// Whether to honor `HTTP_PROXY` and friends.
    pub use_env_proxy: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            use_env_proxy: true,
        }
    }
}

/// Client for the login/register/query backend.
///
/// The client owns no credentials itself: the token lives in the injected
/// [`SessionStore`], which the client writes after a successful login or
/// register and reads before every request.
#[derive(Clone)]
pub struct Client {
    http: ReqwestClient,
    base_url: Url,
    store: Arc<dyn SessionStore>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Client {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the `QUERENT_BASE_URL`
    /// environment variable; it defaults to `http://localhost:8080/`.
    pub fn new(base_url: Option<&str>, store: Arc<dyn SessionStore>) -> Result<Self> {
        Self::with_options(base_url, store, ClientOptions::default())
    }

    /// Create a new client with custom transport settings.
    pub fn with_options(
        base_url: Option<&str>,
        store: Arc<dyn SessionStore>,
        options: ClientOptions,
    ) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url.to_string(),
            None => env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        let base_url = parse_base_url(&base_url)?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if !options.use_env_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            http,
            base_url,
            store,
            logger: None,
        })
    }

    /// Attach a logger that observes every exchange.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL all endpoint paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session store this client reads and writes.
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Forget the stored token.
    pub fn logout(&self) -> Result<()> {
        self.store.clear_token()
    }

    /// Log in with an email and password.
    ///
    /// On success the issued token is written to the session store before this
    /// returns.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] when a field is empty; no request is made.
    /// - [`Error::Authentication`] when the backend rejects the credentials.
    /// - [`Error::Network`] when no response arrives.
    /// - [`Error::UnexpectedResponse`] when the success body has no token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken> {
        self.authenticate(Endpoint::Login, Credentials::login(email, password))
            .await
    }

    /// Register a new account.  Same failure taxonomy as [`Client::login`].
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthToken> {
        self.authenticate(
            Endpoint::Register,
            Credentials::register(username, email, password),
        )
        .await
    }

    /// Ask the backend a question.
    ///
    /// The answer is returned exactly as the backend sent it.
    pub async fn query(&self, question: &str) -> Result<QueryResponse> {
        if question.trim().is_empty() {
            return Err(Error::validation(
                "question is required",
                Some("question".to_string()),
            ));
        }
        let body = self
            .execute(Endpoint::Query, &QueryRequest::new(question))
            .await?;
        match body.get("answer").and_then(Value::as_str) {
            Some(answer) => Ok(QueryResponse {
                answer: answer.to_string(),
            }),
            None => Err(self.record_failure(
                Endpoint::Query,
                Error::unexpected_response("query response did not include an answer"),
            )),
        }
    }

    async fn authenticate(&self, endpoint: Endpoint, credentials: Credentials) -> Result<AuthToken> {
        if let Some(field) = credentials.missing_field() {
            return Err(Error::validation(
                format!("{field} is required"),
                Some(field.to_string()),
            ));
        }
        let body = self.execute(endpoint, &credentials).await?;
        let token = match extract_token(&body) {
            Some(token) => token,
            None => {
                return Err(self.record_failure(
                    endpoint,
                    Error::unexpected_response(format!(
                        "{endpoint} response did not include a token"
                    )),
                ));
            }
        };
        self.store.set_token(&token)?;
        debug!(endpoint = %endpoint, "session token stored");
        Ok(AuthToken::new(token))
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let token = match self.store.token() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "session token unreadable; sending request without it");
                None
            }
        };
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                Error::http_client(
                    "stored session token is not a valid header value",
                    Some(Box::new(e)),
                )
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send `body` to `endpoint` and return the decoded success body.
    ///
    /// Every call funnels through here so that transport failures and error
    /// statuses are normalized in one place.
    #[tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint))]
    async fn execute<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> Result<Value> {
        let url = self.base_url.join(endpoint.path())?;
        let headers = self.default_headers()?;

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = match self.http.post(url).headers(headers).json(body).send().await {
            Ok(response) => response,
            Err(e) => return Err(self.record_failure(endpoint, normalize_transport_error(e))),
        };
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.record_failure(endpoint, normalize_transport_error(e))),
        };
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        debug!(
            status = status.as_u16(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "response received"
        );

        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
        if let Some(logger) = &self.logger {
            logger.log_response(endpoint, status.as_u16(), &redact_token(endpoint, &body));
        }

        if !status.is_success() {
            return Err(self.record_failure(endpoint, normalize_error_response(endpoint, status, &body)));
        }
        Ok(body)
    }

    fn record_failure(&self, endpoint: Endpoint, error: Error) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        if error.is_network() {
            CLIENT_NETWORK_ERRORS.click();
            let cause = std::error::Error::source(&error)
                .map(|e| e.to_string())
                .unwrap_or_default();
            warn!(endpoint = %endpoint, cause = %cause, "no response from backend");
        } else {
            warn!(endpoint = %endpoint, error = %error, "request failed");
        }
        if let Some(logger) = &self.logger {
            logger.log_failure(endpoint, &error);
        }
        error
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Backend for Client {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken> {
        Client::login(self, email, password).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthToken> {
        Client::register(self, username, email, password).await
    }

    async fn query(&self, question: &str) -> Result<QueryResponse> {
        Client::query(self, question).await
    }
}

/// Parse a base URL, making sure relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = if raw.ends_with('/') {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("{raw}/"))?
    };
    if url.cannot_be_a_base() {
        return Err(Error::url(format!("{raw} cannot be used as a base URL"), None));
    }
    Ok(url)
}

/// Any failure that kept a response from arriving.
fn normalize_transport_error(e: reqwest::Error) -> Error {
    Error::network(Some(Box::new(e)))
}

/// Map a non-success status to the error the caller sees.
///
/// Auth endpoints surface the body's `message` (or a fallback) as an
/// authentication error.  The query endpoint has no rejection body, so its
/// statuses become [`Error::Api`].
fn normalize_error_response(endpoint: Endpoint, status: StatusCode, body: &Value) -> Error {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(endpoint.rejection_fallback());
    if endpoint.issues_token() {
        Error::authentication(message)
    } else {
        Error::api(status.as_u16(), message)
    }
}

fn extract_token(body: &Value) -> Option<String> {
    body.get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

fn redact_token(endpoint: Endpoint, body: &Value) -> Value {
    let mut body = body.clone();
    if endpoint.issues_token()
        && let Some(token) = body.get_mut("token")
    {
        *token = Value::String("<redacted>".to_string());
    }
    body
}
