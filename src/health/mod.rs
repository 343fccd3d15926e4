//! HTTP readiness probing.
//!
//! [`HttpProbe`] polls an endpoint until it answers with a healthy status
//! or an absolute deadline passes. The deadline, not an attempt count,
//! bounds the wait: a timeout error is never returned before it.
//!
//! # Example
//!
//! ```no_run
//! use reposwarm::health::{HealthCheck, HttpProbe};
//! use std::time::Duration;
//!
//! let probe = HttpProbe::new()?;
//! probe.wait_for_http("http://localhost:3000/v1/health", Duration::from_secs(30))?;
//! # Ok::<(), reposwarm::error::SwarmError>(())
//! ```

pub mod mock;

pub use mock::MockHealth;

use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Result, SwarmError};

/// Delay between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound on a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Statuses below this are healthy.
pub const HEALTHY_BELOW: u16 = 500;

/// Whether `status` counts as healthy.
pub fn is_healthy_status(status: u16) -> bool {
    status < HEALTHY_BELOW
}

/// Readiness checks used by provisioning and verification.
pub trait HealthCheck {
    /// One GET; returns the HTTP status.
    fn check(&self, url: &str) -> Result<u16>;

    /// Poll `url` until healthy or `timeout` has elapsed.
    fn wait_for_http(&self, url: &str, timeout: Duration) -> Result<()>;
}

/// [`HealthCheck`] over a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    interval: Duration,
    request_timeout: Duration,
}

impl HttpProbe {
    /// Build a probe with the default poll policy.
    ///
    /// Fails if the HTTP client cannot be set up (e.g. no TLS backend).
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;
        Ok(Self {
            client,
            interval: POLL_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn get_status(&self, url: &str, timeout: Duration) -> Result<u16> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| anyhow::anyhow!("GET {} failed: {}", url, e))?;
        Ok(response.status().as_u16())
    }
}

impl HealthCheck for HttpProbe {
    fn check(&self, url: &str) -> Result<u16> {
        self.get_status(url, self.request_timeout)
    }

    fn wait_for_http(&self, url: &str, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let deadline = start + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SwarmError::HealthTimeout {
                    url: url.to_string(),
                    elapsed: start.elapsed(),
                });
            }

            match self.get_status(url, self.request_timeout.min(remaining)) {
                Ok(status) if is_healthy_status(status) => {
                    debug!("{} healthy (HTTP {}) after {:?}", url, status, start.elapsed());
                    return Ok(());
                }
                Ok(status) => debug!("{} answered HTTP {}", url, status),
                Err(e) => debug!("{}", e),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            thread::sleep(self.interval.min(remaining));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fast_probe() -> HttpProbe {
        HttpProbe::new()
            .unwrap()
            .with_interval(Duration::from_millis(50))
            .with_request_timeout(Duration::from_millis(500))
    }

    /// A local port with nothing listening on it.
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/health", port)
    }

    #[test]
    fn threshold_is_below_500() {
        assert!(is_healthy_status(200));
        assert!(is_healthy_status(404));
        assert!(is_healthy_status(499));
        assert!(!is_healthy_status(500));
        assert!(!is_healthy_status(503));
    }

    #[test]
    fn defaults_match_poll_policy() {
        let probe = HttpProbe::new().unwrap();
        assert_eq!(probe.interval(), Duration::from_secs(2));
        assert_eq!(probe.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn check_returns_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/health");
            then.status(204);
        });

        let status = fast_probe().check(&server.url("/v1/health")).unwrap();
        assert_eq!(status, 204);
    }

    #[test]
    fn check_errors_when_unreachable() {
        assert!(fast_probe().check(&closed_port_url()).is_err());
    }

    #[test]
    fn wait_succeeds_on_healthy_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/health");
            then.status(200).body("ok");
        });

        fast_probe()
            .wait_for_http(&server.url("/v1/health"), Duration::from_secs(5))
            .unwrap();
        mock.assert();
    }

    #[test]
    fn wait_accepts_client_errors_as_healthy() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(404);
        });

        assert!(fast_probe()
            .wait_for_http(&server.url("/"), Duration::from_secs(5))
            .is_ok());
    }

    #[test]
    fn wait_times_out_on_server_errors() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/health");
            then.status(503);
        });

        let timeout = Duration::from_millis(400);
        let err = fast_probe()
            .wait_for_http(&server.url("/v1/health"), timeout)
            .unwrap_err();

        assert!(matches!(err, SwarmError::HealthTimeout { .. }));
        assert!(mock.hits() >= 2);
    }

    #[test]
    fn wait_never_times_out_early() {
        let url = closed_port_url();
        let timeout = Duration::from_millis(600);
        let start = Instant::now();

        let err = fast_probe().wait_for_http(&url, timeout).unwrap_err();

        assert!(start.elapsed() >= timeout);
        assert!(start.elapsed() < timeout + Duration::from_secs(2));
        match err {
            SwarmError::HealthTimeout { url: u, elapsed } => {
                assert_eq!(u, url);
                assert!(elapsed >= timeout);
            }
            other => panic!("expected HealthTimeout, got {other:?}"),
        }
    }
}
