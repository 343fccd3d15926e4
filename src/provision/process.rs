//! Handles to detached service processes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, SwarmError};

/// A service process launched in the background.
///
/// Launched services are not supervised; the handle only records where
/// the process writes its output and lets callers check on or stop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessHandle {
    pub service: String,
    pub pid: u32,
    pub log_path: PathBuf,
    pub pid_file: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl ProcessHandle {
    /// Record a process launched just now.
    pub fn new(service: impl Into<String>, pid: u32, log_path: PathBuf, pid_file: PathBuf) -> Self {
        Self {
            service: service.into(),
            pid,
            log_path,
            pid_file,
            started_at: Utc::now(),
        }
    }

    /// Write the pid to [`pid_file`](Self::pid_file).
    pub fn write_pid_file(&self) -> Result<()> {
        fs::write(&self.pid_file, self.pid.to_string()).map_err(|e| {
            SwarmError::ConfigWriteFailed {
                path: self.pid_file.clone(),
                message: e.to_string(),
            }
        })
    }

    /// Rebuild a handle from `<dir>/<service>.pid`.
    ///
    /// The launch time is taken from the pid file's modification time.
    pub fn from_pid_file(service: &str, dir: &Path) -> Result<Self> {
        let pid_file = dir.join(format!("{}.pid", service));
        let content = fs::read_to_string(&pid_file)?;
        let pid = content.trim().parse::<u32>().map_err(|_| {
            anyhow::anyhow!("invalid pid in {}: {:?}", pid_file.display(), content.trim())
        })?;
        let started_at = fs::metadata(&pid_file)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            service: service.to_string(),
            pid,
            log_path: dir.join(format!("{}.log", service)),
            pid_file,
            started_at,
        })
    }

    /// Whether the process still exists.
    #[cfg(unix)]
    pub fn is_running(&self) -> bool {
        let Ok(pid) = libc::pid_t::try_from(self.pid) else {
            return false;
        };
        // Signal 0 checks for existence without delivering anything.
        unsafe { libc::kill(pid, 0) == 0 }
    }

    #[cfg(not(unix))]
    pub fn is_running(&self) -> bool {
        false
    }

    /// Ask the service to exit (SIGTERM) and remove the pid file.
    ///
    /// Services are launched as process-group leaders, so the whole group
    /// is signalled; a process that is already gone is not an error.
    #[cfg(unix)]
    pub fn terminate(&self) -> Result<()> {
        let pid = libc::pid_t::try_from(self.pid)
            .ok()
            .filter(|pid| *pid > 1)
            .ok_or_else(|| anyhow::anyhow!("refusing to signal pid {}", self.pid))?;

        let signal = |target: libc::pid_t| -> std::io::Result<bool> {
            if unsafe { libc::kill(target, libc::SIGTERM) } == 0 {
                return Ok(true);
            }
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::ESRCH) {
                Ok(false)
            } else {
                Err(err)
            }
        };

        if !signal(-pid)? {
            signal(pid)?;
        }
        let _ = fs::remove_file(&self.pid_file);
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn terminate(&self) -> Result<()> {
        Err(anyhow::anyhow!("stopping services is only supported on Unix").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn pid_file_round_trips() {
        let temp = TempDir::new().unwrap();
        let handle = ProcessHandle::new(
            "api",
            4242,
            temp.path().join("api.log"),
            temp.path().join("api.pid"),
        );
        handle.write_pid_file().unwrap();

        let loaded = ProcessHandle::from_pid_file("api", temp.path()).unwrap();
        assert_eq!(loaded.pid, 4242);
        assert_eq!(loaded.service, "api");
        assert_eq!(loaded.log_path, temp.path().join("api.log"));
    }

    #[test]
    fn from_pid_file_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ui.pid"), "not-a-pid").unwrap();
        assert!(ProcessHandle::from_pid_file("ui", temp.path()).is_err());
    }

    #[test]
    fn from_pid_file_missing_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(ProcessHandle::from_pid_file("worker", temp.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn current_process_is_running() {
        let handle = ProcessHandle::new(
            "self",
            std::process::id(),
            PathBuf::from("self.log"),
            PathBuf::from("self.pid"),
        );
        assert!(handle.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn terminate_stops_child() {
        let temp = TempDir::new().unwrap();
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let handle = ProcessHandle::new(
            "sleeper",
            child.id(),
            temp.path().join("sleeper.log"),
            temp.path().join("sleeper.pid"),
        );
        handle.write_pid_file().unwrap();

        handle.terminate().unwrap();
        let status = child.wait().unwrap();

        assert!(!status.success());
        assert!(!handle.pid_file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn terminate_refuses_init() {
        let handle = ProcessHandle::new("x", 1, PathBuf::from("x.log"), PathBuf::from("x.pid"));
        assert!(handle.terminate().is_err());
    }
}
