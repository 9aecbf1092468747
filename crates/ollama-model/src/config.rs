use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Which Ollama API the provider talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /api/chat`, sending the role-tagged transcript as is.
    #[default]
    Chat,
    /// `POST /api/generate`, sending the transcript flattened into a single
    /// prompt of `role: content` lines.
    Generate,
}

/// Builder for [`OllamaConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OllamaConfigBuilder {
    model: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
    endpoint: Option<Endpoint>,
    use_proxy: bool,
}

impl OllamaConfigBuilder {
    /// Creates a builder for the given model, e.g. `qwen3:30b`.
    #[inline]
    pub fn with_model<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            base_url: None,
            timeout: None,
            endpoint: None,
            use_proxy: true,
        }
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the timeout applied to every completion request. Without it a
    /// request waits as long as the backend takes.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the API used for completions.
    #[inline]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Ignores proxy settings from the environment.
    #[inline]
    pub fn without_proxy(mut self) -> Self {
        self.use_proxy = false;
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> OllamaConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        OllamaConfig {
            model: self.model,
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: self.timeout,
            endpoint: self.endpoint.unwrap_or_default(),
            use_proxy: self.use_proxy,
        }
    }
}

/// Configuration for the Ollama provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OllamaConfig {
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) endpoint: Endpoint,
    pub(crate) use_proxy: bool,
}

impl OllamaConfig {
    /// Returns the model name.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the base URL, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the completion endpoint.
    #[inline]
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    #[inline]
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
