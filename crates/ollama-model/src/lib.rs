//! A model provider for a local Ollama server.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use intake_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use mime::Mime;
use reqwest::{Client, Response, header};
use serde::de::DeserializeOwned;

pub use config::{Endpoint, OllamaConfig, OllamaConfigBuilder};
pub use proto::ModelInfo;
use proto::{ChatResponse, GenerateResponse, TagsResponse, VersionResponse};

const INFO_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for [`OllamaProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Unreachable
        } else if err.is_decode() {
            ErrorKind::InvalidResponse
        } else {
            ErrorKind::Other
        };
        Self::new(format!("{err}"), kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// What the server reports about itself. Building this never fails, the
/// fields degrade to placeholder text instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server version, or a human-readable reason why it is unknown.
    pub version: String,
    /// Installed models, empty if they could not be listed.
    pub models: Vec<ModelInfo>,
}

/// Ollama model provider.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: Client,
    config: Arc<OllamaConfig>,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider` with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if !config.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|err| {
            Error::new(format!("cannot build HTTP client: {err}"), ErrorKind::Other)
        })?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Fetches the server version from `/api/version`.
    pub async fn version(&self) -> Result<String, Error> {
        let resp = self
            .client
            .get(self.config.url("/api/version"))
            .timeout(INFO_TIMEOUT)
            .send()
            .await;
        let payload: VersionResponse = decode_json(ensure_success(resp).await?).await?;
        Ok(payload
            .version
            .unwrap_or_else(|| "unknown version".to_owned()))
    }

    /// Lists installed models from `/api/tags`.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, Error> {
        let resp = self
            .client
            .get(self.config.url("/api/tags"))
            .timeout(INFO_TIMEOUT)
            .send()
            .await;
        let payload: TagsResponse = decode_json(ensure_success(resp).await?).await?;
        Ok(payload.models)
    }

    /// Collects the server version and installed models.
    pub async fn server_info(&self) -> ServerInfo {
        let version = match self.version().await {
            Ok(version) => version,
            Err(err) if err.kind == ErrorKind::Unreachable => {
                debug!("ollama is unreachable: {err}");
                return ServerInfo {
                    version: "Ollama is not running".to_owned(),
                    models: vec![],
                };
            }
            Err(err) if err.kind == ErrorKind::BadStatus => {
                warn!("cannot fetch ollama version: {err}");
                "unable to fetch version".to_owned()
            }
            Err(err) => {
                warn!("cannot fetch ollama version: {err}");
                format!("error: {err}")
            }
        };
        let models = self.list_models().await.unwrap_or_else(|err| {
            warn!("cannot list ollama models: {err}");
            vec![]
        });
        ServerInfo { version, models }
    }
}

impl ModelProvider for OllamaProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let endpoint = self.config.endpoint;
        let builder = match endpoint {
            Endpoint::Chat => self
                .client
                .post(self.config.url("/api/chat"))
                .json(&proto::create_chat_request(req, &self.config)),
            Endpoint::Generate => self
                .client
                .post(self.config.url("/api/generate"))
                .json(&proto::create_generate_request(req, &self.config)),
        };
        let resp_fut = builder.send();

        async move {
            let resp = ensure_success(resp_fut.await).await?;
            let resp = match endpoint {
                Endpoint::Chat => decode_json::<ChatResponse>(resp)
                    .await?
                    .into_model_response(),
                Endpoint::Generate => decode_json::<GenerateResponse>(resp)
                    .await?
                    .into_model_response(),
            };
            resp.ok_or_else(|| {
                Error::new("No response from the model", ErrorKind::InvalidResponse)
            })
        }
    }
}

async fn ensure_success(
    resp_or_err: Result<Response, reqwest::Error>,
) -> Result<Response, Error> {
    let resp = resp_or_err.map_err(Error::from_reqwest)?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::new(
        format!("API error: {} - {}", status.as_u16(), body),
        ErrorKind::BadStatus,
    ))
}

async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let is_json = content_type
        .as_deref()
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| m.subtype() == mime::JSON)
        .unwrap_or(false);
    if !is_json {
        return Err(Error::new(
            format!("Unexpected content type: {content_type:?}"),
            ErrorKind::InvalidResponse,
        ));
    }

    let body = resp.text().await.map_err(Error::from_reqwest)?;
    trace!("got response body: {body}");
    serde_json::from_str(&body)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::InvalidResponse))
}
