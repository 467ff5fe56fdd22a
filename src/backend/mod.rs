use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE,
};
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::config::{AuthOptions, Config, ConfigError};
use crate::error::{DataError, DataResult};

pub mod query;

pub use query::{Filter, IsValue, Order, Query, Request};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Anything able to carry out one backend round trip. Operations take
/// `&dyn Backend` so tests can substitute a recording fake.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn execute(&self, request: &Request) -> DataResult<Value>;
}

/// HTTP binding to the hosted database's REST surface. Construct once at
/// startup and share by reference.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    rest_base: Url,
    anon_key: String,
    access_token: Option<String>,
    schema: String,
    auth: AuthOptions,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("rest_base", &self.rest_base)
            .field("schema", &self.schema)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Fails immediately when either secret is missing; there is no lazy
    /// connection to defer the error to.
    pub fn new(url: &str, anon_key: &str, auth: AuthOptions) -> Result<Self, ConfigError> {
        if url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.url must be non-empty"));
        }
        if anon_key.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.anon_key must be non-empty"));
        }
        let mut base = url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|_| ConfigError::Invalid("backend.url must be an absolute URL"))?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid("backend.url must be an absolute URL"));
        }
        let rest_base = base
            .join("rest/v1/")
            .map_err(|_| ConfigError::Invalid("backend.url must be an absolute URL"))?;
        let http = Client::builder()
            .user_agent("campus-data/0.1")
            .build()?;
        Ok(Self {
            http,
            rest_base,
            anon_key: anon_key.trim().to_string(),
            access_token: None,
            schema: "public".to_string(),
            auth,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        Ok(
            Self::new(&cfg.backend.url, &cfg.backend.anon_key, cfg.auth.clone())?
                .with_schema(&cfg.backend.schema),
        )
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = schema.to_string();
        self
    }

    /// Use a signed-in user's token instead of the anon key as bearer.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> DataResult<Url> {
        self.rest_base
            .join(path)
            .map_err(|err| DataError::Request(format!("bad endpoint {}: {}", path, err)))
    }

    fn base_headers(&self, write: bool) -> DataResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        headers.insert("apikey", header_value(&self.anon_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", bearer))?);
        if self.schema != "public" {
            let name = if write { "content-profile" } else { "accept-profile" };
            headers.insert(name, header_value(&self.schema)?);
        }
        Ok(headers)
    }

    /// Translate a [`Request`] into the HTTP request that would be sent.
    pub fn build_request(&self, request: &Request) -> DataResult<reqwest::Request> {
        let builder = match request {
            Request::Select(query) => {
                let mut headers = self.base_headers(false)?;
                if query.single {
                    headers.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));
                }
                self.http
                    .request(Method::GET, self.endpoint(&query.table)?)
                    .headers(headers)
                    .query(&query.to_params(true))
            }
            Request::Insert { table, row, single } => {
                let mut headers = self.base_headers(true)?;
                headers.insert("prefer", HeaderValue::from_static("return=representation"));
                if *single {
                    headers.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));
                }
                self.http
                    .request(Method::POST, self.endpoint(table)?)
                    .headers(headers)
                    .query(&[("select", "*")])
                    .json(row)
            }
            Request::Update { query, patch } => {
                let mut headers = self.base_headers(true)?;
                headers.insert("prefer", HeaderValue::from_static("return=representation"));
                if query.single {
                    headers.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));
                }
                self.http
                    .request(Method::PATCH, self.endpoint(&query.table)?)
                    .headers(headers)
                    .query(&query.to_params(true))
                    .json(patch)
            }
            Request::Delete(query) => {
                let mut headers = self.base_headers(true)?;
                headers.insert("prefer", HeaderValue::from_static("return=minimal"));
                self.http
                    .request(Method::DELETE, self.endpoint(&query.table)?)
                    .headers(headers)
                    .query(&query.to_params(false))
            }
            Request::Count(query) => {
                let mut headers = self.base_headers(false)?;
                headers.insert("prefer", HeaderValue::from_static("count=exact"));
                self.http
                    .request(Method::HEAD, self.endpoint(&query.table)?)
                    .headers(headers)
                    .query(&query.to_params(true))
            }
            Request::Rpc { name, args } => {
                let headers = self.base_headers(true)?;
                self.http
                    .request(Method::POST, self.endpoint(&format!("rpc/{}", name))?)
                    .headers(headers)
                    .header(CONTENT_TYPE, "application/json")
                    .json(args)
            }
        };
        Ok(builder.build()?)
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn execute(&self, request: &Request) -> DataResult<Value> {
        let http_request = self.build_request(request)?;
        debug!(
            table = request.target(),
            method = %http_request.method(),
            url = %http_request.url(),
            "backend request"
        );

        let res = self.http.execute(http_request).await?;
        let status = res.status();
        if let Request::Count(_) = request {
            if !status.is_success() {
                return Err(parse_error_body(status.as_u16(), ""));
            }
            let range = res
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            return parse_content_range(range).map(Value::from);
        }
        let body = res.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "backend response");

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|err| DataError::Decode {
            operation: "response_body",
            message: err.to_string(),
        })
    }
}

fn header_value(raw: &str) -> DataResult<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|_| DataError::Request("header contains invalid bytes".into()))
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range(range: &str) -> DataResult<u64> {
    range
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| DataError::Decode {
            operation: "content_range",
            message: format!("no exact total in {:?}", range),
        })
}

#[derive(Deserialize)]
struct ErrorPayload {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Interpret a non-2xx body. The REST layer answers with
/// `{code, message, details, hint}`; anything else is kept verbatim.
pub fn parse_error_body(status: u16, body: &str) -> DataError {
    match serde_json::from_str::<ErrorPayload>(body) {
        Ok(payload) => DataError::Backend {
            status,
            code: payload.code.unwrap_or_else(|| status.to_string()),
            message: payload.message.unwrap_or_else(|| body.to_string()),
            details: payload.details,
            hint: payload.hint,
        },
        Err(_) => DataError::Backend {
            status,
            code: status.to_string(),
            message: body.to_string(),
            details: None,
            hint: None,
        },
    }
}
