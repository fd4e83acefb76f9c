//! JSON fetch client with dependency tagging.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::dependency::DependencyTag;
use crate::error::FetchError;
use crate::retry::RetryPolicy;
use crate::timeout::TimeoutConfig;
use crate::transport::Transport;

/// Fetch policy combining timeout and retry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Timeout configuration.
    pub timeout: TimeoutConfig,
    /// Retry policy.
    pub retry: RetryPolicy,
}

impl FetchPolicy {
    /// Create a new fetch policy.
    pub fn new(timeout: TimeoutConfig, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }

    /// Create from a dependency tag's defaults.
    pub fn from_tag(tag: DependencyTag) -> Self {
        let max_retries = tag.default_max_retries();
        Self {
            timeout: TimeoutConfig::from_total(tag.default_timeout()),
            retry: if max_retries == 0 {
                RetryPolicy::none()
            } else {
                RetryPolicy::new(max_retries)
            },
        }
    }
}

/// Fetch client for the storefront API.
///
/// Resolves paths against a base URL and applies the timeout and retry policy
/// of the dependency being called.
#[derive(Clone)]
pub struct FetchClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    policies: HashMap<DependencyTag, FetchPolicy>,
}

impl FetchClient {
    /// Create a new fetch client.
    pub fn new(base_url: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: base_url.into(),
            transport: Arc::new(transport),
            policies: HashMap::new(),
        }
    }

    /// Create a client using `reqwest`, bounding connection setup by
    /// `connect_timeout`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_reqwest(
        base_url: impl Into<String>,
        connect_timeout: std::time::Duration,
    ) -> Result<Self, FetchError> {
        let transport = crate::ReqwestTransport::new(connect_timeout)?;
        Ok(Self::new(base_url, transport))
    }

    /// Override the policy for one dependency.
    pub fn with_policy(mut self, tag: DependencyTag, policy: FetchPolicy) -> Self {
        self.policies.insert(tag, policy);
        self
    }

    /// Effective policy for a dependency.
    pub fn policy_for(&self, tag: DependencyTag) -> FetchPolicy {
        self.policies
            .get(&tag)
            .cloned()
            .unwrap_or_else(|| FetchPolicy::from_tag(tag))
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a path against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET a JSON document with the dependency's timeout and retry policy.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        tag: DependencyTag,
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        let policy = self.policy_for(tag);
        let span = tracing::debug_span!("fetch", dependency = %tag, url = %url);

        async {
            let mut attempt = 0;
            loop {
                match self.attempt::<T>(&url, &policy.timeout).await {
                    Ok(value) => return Ok(value),
                    Err(err) if policy.retry.should_retry(&err, attempt) => {
                        let delay = policy.retry.backoff.delay_for_attempt(attempt);
                        tracing::warn!(attempt, error = %err, delay_ms = delay.as_millis() as u64, "retrying fetch");
                        sleep(delay).await;
                        attempt += 1;
                    }
                    Err(err) => {
                        tracing::debug!(attempt, error = %err, "fetch failed");
                        return Err(err);
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: &TimeoutConfig,
    ) -> Result<T, FetchError> {
        let response = with_timeout(timeout, self.transport.get(url)).await?;
        tracing::trace!(status = response.status, bytes = response.body.len(), "fetch response");
        response.error_for_status(url)?.json()
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn with_timeout<F, T>(timeout: &TimeoutConfig, fut: F) -> Result<T, FetchError>
where
    F: std::future::Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(timeout.total, fut)
        .await
        .map_err(|_| FetchError::Timeout(format!("no response after {:?}", timeout.total)))?
}

// No timer available to wasm guests; the host enforces its own deadline.
#[cfg(target_arch = "wasm32")]
async fn with_timeout<F, T>(_timeout: &TimeoutConfig, fut: F) -> Result<T, FetchError>
where
    F: std::future::Future<Output = Result<T, FetchError>>,
{
    fut.await
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(delay: std::time::Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep(_delay: std::time::Duration) {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::retry::BackoffStrategy;
    use crate::transport::Response;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Transport that replays canned results and records requested URLs.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedTransport {
        replies: Arc<Mutex<VecDeque<Result<Response, FetchError>>>>,
        pub(crate) requests: Arc<Mutex<Vec<String>>>,
        delay: Option<Duration>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(replies: Vec<Result<Response, FetchError>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                ..Default::default()
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<Response, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Connection("script exhausted".into())))
        }
    }

    fn ok(body: &str) -> Result<Response, FetchError> {
        Ok(Response::new(200, body))
    }

    #[test]
    fn test_url_join() {
        let client = FetchClient::new("http://localhost:3333/", ScriptedTransport::default());
        assert_eq!(client.url("/stock/1"), "http://localhost:3333/stock/1");
        assert_eq!(client.url("products/2"), "http://localhost:3333/products/2");
        assert_eq!(client.url("https://cdn.example.com/x"), "https://cdn.example.com/x");
    }

    #[test]
    fn test_policy_override() {
        let custom = FetchPolicy::new(
            TimeoutConfig::from_total(Duration::from_millis(100)),
            RetryPolicy::new(3),
        );
        let client = FetchClient::new("http://x", ScriptedTransport::default())
            .with_policy(DependencyTag::Inventory, custom.clone());

        assert_eq!(client.policy_for(DependencyTag::Inventory), custom);
        assert_eq!(
            client.policy_for(DependencyTag::Catalog),
            FetchPolicy::from_tag(DependencyTag::Catalog)
        );
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let transport = ScriptedTransport::new(vec![ok(r#"{"id":1,"amount":3}"#)]);
        let client = FetchClient::new("http://api", transport.clone());

        let value: serde_json::Value = client
            .get_json("/stock/1", DependencyTag::Inventory)
            .await
            .unwrap();

        assert_eq!(value["amount"], 3);
        assert_eq!(transport.requested(), vec!["http://api/stock/1".to_string()]);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let transport = ScriptedTransport::new(vec![
            Ok(Response::new(503, "")),
            ok("{}"),
        ]);
        let client = FetchClient::new("http://api", transport.clone());

        let err = client
            .get_json::<serde_json::Value>("/stock/1", DependencyTag::Inventory)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(transport.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_when_enabled() {
        let transport = ScriptedTransport::new(vec![
            Ok(Response::new(503, "")),
            Err(FetchError::Connection("reset".into())),
            ok(r#"{"ok":true}"#),
        ]);
        let policy = FetchPolicy::new(
            TimeoutConfig::default(),
            RetryPolicy::new(2).with_backoff(BackoffStrategy::None),
        );
        let client = FetchClient::new("http://api", transport.clone())
            .with_policy(DependencyTag::Catalog, policy);

        let value: serde_json::Value = client
            .get_json("/products/1", DependencyTag::Catalog)
            .await
            .unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(transport.requested().len(), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let transport = ScriptedTransport::new(vec![Ok(Response::new(404, ""))]);
        let client = FetchClient::new("http://api", transport.clone()).with_policy(
            DependencyTag::Catalog,
            FetchPolicy::new(TimeoutConfig::default(), RetryPolicy::new(5)),
        );

        let err = client
            .get_json::<serde_json::Value>("/products/404", DependencyTag::Catalog)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(transport.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let transport = ScriptedTransport::new(vec![ok("{}")]).with_delay(Duration::from_millis(300));
        let client = FetchClient::new("http://api", transport).with_policy(
            DependencyTag::Inventory,
            FetchPolicy::new(
                TimeoutConfig::from_total(Duration::from_millis(20)),
                RetryPolicy::none(),
            ),
        );

        let err = client
            .get_json::<serde_json::Value>("/stock/1", DependencyTag::Inventory)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout(_)));
    }
}
