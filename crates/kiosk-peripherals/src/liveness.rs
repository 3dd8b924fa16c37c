//! HTTP liveness probe.

use std::time::Duration;

use tracing::debug;

use crate::error::{PeripheralError, Result};
use crate::traits::LivenessProbe;

/// Issues a GET on a fixed URL with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpLivenessProbe {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpLivenessProbe {
    /// Create a probe for `url` that gives up after `timeout`.
    ///
    /// # Errors
    /// Returns `PeripheralError::Http` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LivenessProbe for HttpLivenessProbe {
    async fn probe(&self) -> Result<u16> {
        debug!("liveness probe: GET {}", self.url);
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                PeripheralError::timeout(self.timeout.as_millis() as u64)
            } else {
                PeripheralError::Http(e)
            }
        })?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_keeps_url() {
        let probe = HttpLivenessProbe::new("http://127.0.0.1:9/health", Duration::from_millis(50))
            .unwrap();
        assert_eq!(probe.url(), "http://127.0.0.1:9/health");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        // Port 9 (discard) is closed on test machines; the connect fails fast.
        let probe = HttpLivenessProbe::new("http://127.0.0.1:9/health", Duration::from_millis(500))
            .unwrap();
        assert!(probe.probe().await.is_err());
    }
}
