//! Scripted health checks for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, SwarmError};

use super::HealthCheck;

/// [`HealthCheck`] answering from a table instead of the network.
///
/// Every URL is healthy (HTTP 200) unless marked otherwise. Waits on an
/// unhealthy URL fail immediately with a timeout carrying the requested
/// duration as elapsed time.
#[derive(Debug, Default)]
pub struct MockHealth {
    statuses: RefCell<HashMap<String, u16>>,
    unreachable: RefCell<Vec<String>>,
    waits: RefCell<Vec<String>>,
    checks: RefCell<Vec<String>>,
}

impl MockHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status`.
    pub fn set_status(&self, url: &str, status: u16) {
        self.statuses.borrow_mut().insert(url.to_string(), status);
    }

    /// Make requests to `url` fail to connect.
    pub fn set_unreachable(&self, url: &str) {
        self.unreachable.borrow_mut().push(url.to_string());
    }

    /// URLs passed to `wait_for_http`, in call order.
    pub fn waits(&self) -> Vec<String> {
        self.waits.borrow().clone()
    }

    /// URLs passed to `check`, in call order.
    pub fn checks(&self) -> Vec<String> {
        self.checks.borrow().clone()
    }

    fn status_of(&self, url: &str) -> Result<u16> {
        if self.unreachable.borrow().iter().any(|u| u == url) {
            return Err(anyhow::anyhow!("GET {} failed: connection refused", url).into());
        }
        Ok(self.statuses.borrow().get(url).copied().unwrap_or(200))
    }
}

impl HealthCheck for MockHealth {
    fn check(&self, url: &str) -> Result<u16> {
        self.checks.borrow_mut().push(url.to_string());
        self.status_of(url)
    }

    fn wait_for_http(&self, url: &str, timeout: Duration) -> Result<()> {
        self.waits.borrow_mut().push(url.to_string());
        match self.status_of(url) {
            Ok(status) if super::is_healthy_status(status) => Ok(()),
            _ => Err(SwarmError::HealthTimeout {
                url: url.to_string(),
                elapsed: timeout,
            }),
        }
    }
}
