//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use intake_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request, in order. Every request is
/// captured so tests can assert on the exact transcript a session sent. If
/// the script runs out of responses, an error will be returned.
///
/// Clones share the same script, so a test can keep one handle for
/// assertions while the session owns another.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
}

impl TestModelProvider {
    /// Appends a reply to the script.
    #[inline]
    pub fn add_response(&self, preset: PresetResponse) {
        self.lock().responses.push_back(preset);
    }

    /// Shorthand for adding a plain text reply.
    #[inline]
    pub fn add_text_response(&self, content: impl Into<String>) {
        self.add_response(PresetResponse::with_content(content));
    }

    /// Returns all requests received so far, oldest first.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    /// Returns the number of scripted replies not consumed yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.lock().responses.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_result(&self, req: &ModelRequest) -> Result<ModelResponse, Error> {
        let mut script = self.lock();
        script.requests.push(req.clone());

        let Some(step) = script.responses.front_mut() else {
            return Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Other,
            });
        };

        if let Some(failures) = step.failures {
            step.failures = match failures {
                0 => Some(0),
                1 => None,
                n => Some(n - 1),
            };
            return Err(Error {
                message: "connection refused",
                kind: ErrorKind::Unreachable,
            });
        }

        let step = script
            .responses
            .pop_front()
            .map(|step| step.content)
            .unwrap_or_default();
        Ok(ModelResponse::with_content(step))
    }
}

impl Debug for TestModelProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let script = self.lock();
        f.debug_struct("TestModelProvider")
            .field("remaining", &script.responses.len())
            .field("requests", &script.requests.len())
            .finish()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        ready(self.next_result(req))
    }
}

#[cfg(test)]
mod tests {
    use intake_model::ModelMessage;

    use super::*;

    fn request(text: &str) -> ModelRequest {
        ModelRequest {
            messages: vec![ModelMessage::User(text.to_owned())],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::default();
        provider.add_text_response("Hello, world!");
        provider.add_text_response("Sure, let me take a look.");

        let resp = provider.send_request(&request("Hi")).await.unwrap();
        assert_eq!(resp.content, "Hello, world!");

        let resp = provider
            .send_request(&request("Check my todo"))
            .await
            .unwrap();
        assert_eq!(resp.content, "Sure, let me take a look.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], request("Check my todo"));
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test]
    async fn test_failures_then_success() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_content("ok").with_failures(2));

        for _ in 0..2 {
            let err = provider.send_request(&request("Hi")).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unreachable);
        }
        let resp = provider.send_request(&request("Hi")).await.unwrap();
        assert_eq!(resp.content, "ok");
    }

    #[tokio::test]
    async fn test_infinite_failures() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_content("never").with_failures(0));

        for _ in 0..5 {
            let err = provider.send_request(&request("Hi")).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unreachable);
        }
        assert_eq!(provider.remaining(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_script() {
        let provider = TestModelProvider::default();
        let err = provider.send_request(&request("Hi")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(provider.requests().len(), 1);
    }

    #[test]
    fn test_clones_share_script() {
        let provider = TestModelProvider::default();
        let clone = provider.clone();
        clone.add_text_response("shared");
        assert_eq!(provider.remaining(), 1);
    }
}
