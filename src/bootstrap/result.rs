//! The aggregate setup report.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::step::{SetupStep, StepResult, StepStatus};
use crate::error::SwarmError;
use crate::provision::ProcessHandle;

/// Everything one setup run produced.
///
/// Serializes to the machine-readable contract
/// `{installDir, token, steps, success}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupResult {
    pub install_dir: PathBuf,
    pub token: String,
    pub steps: Vec<StepResult>,
    pub success: bool,
    /// Services launched during the run.
    #[serde(skip)]
    pub processes: Vec<ProcessHandle>,
}

impl SetupResult {
    pub fn new(install_dir: PathBuf) -> Self {
        Self {
            install_dir,
            token: String::new(),
            steps: Vec::new(),
            success: false,
            processes: Vec::new(),
        }
    }

    /// Result recorded for `step`, if it ran.
    pub fn step(&self, step: SetupStep) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.name == step.name())
    }

    pub fn status_of(&self, step: SetupStep) -> Option<StepStatus> {
        self.step(step).map(|s| s.status)
    }

    /// No critical step failed and verification did not fail.
    ///
    /// Worker and UI failures never affect this.
    pub fn critical_path_ok(&self) -> bool {
        !self.steps.iter().any(|result| {
            result.status == StepStatus::Fail
                && result
                    .step()
                    .map_or(true, |step| step.is_critical() || step == SetupStep::Verify)
        })
    }

    /// Handle of the launched `service`, if any.
    pub fn process(&self, service: &str) -> Option<&ProcessHandle> {
        self.processes.iter().find(|p| p.service == service)
    }
}

/// A critical step failed; the run stopped early.
///
/// Carries everything recorded before the failure.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SetupAborted {
    pub result: SetupResult,
    #[source]
    pub error: SwarmError,
}

impl SetupAborted {
    /// Name of the step that aborted the run.
    pub fn failed_step(&self) -> Option<&str> {
        match &self.error {
            SwarmError::Step { step, .. } => Some(step.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(steps: &[(SetupStep, StepStatus)]) -> SetupResult {
        let mut result = SetupResult::new(PathBuf::from("/tmp/rs"));
        for (step, status) in steps {
            result.steps.push(StepResult::new(*step, *status, ""));
        }
        result
    }

    #[test]
    fn advisory_failures_keep_critical_path_ok() {
        let result = result_with(&[
            (SetupStep::Api, StepStatus::Ok),
            (SetupStep::Worker, StepStatus::Fail),
            (SetupStep::Ui, StepStatus::Fail),
            (SetupStep::Verify, StepStatus::Ok),
        ]);
        assert!(result.critical_path_ok());
    }

    #[test]
    fn verify_failure_breaks_success() {
        let result = result_with(&[
            (SetupStep::Api, StepStatus::Ok),
            (SetupStep::Verify, StepStatus::Fail),
        ]);
        assert!(!result.critical_path_ok());
    }

    #[test]
    fn critical_failure_breaks_success() {
        let result = result_with(&[(SetupStep::Prerequisites, StepStatus::Fail)]);
        assert!(!result.critical_path_ok());
    }

    #[test]
    fn serializes_contract_fields_only() {
        let mut result = result_with(&[(SetupStep::Prerequisites, StepStatus::Ok)]);
        result.token = "ab".repeat(32);
        result.processes.push(ProcessHandle::new(
            "api",
            1,
            PathBuf::from("api.log"),
            PathBuf::from("api.pid"),
        ));

        let json = serde_json::to_value(&result).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["installDir", "steps", "success", "token"]);
        assert_eq!(json["steps"][0]["status"], "ok");
    }

    #[test]
    fn aborted_reports_failed_step() {
        let aborted = SetupAborted {
            result: result_with(&[]),
            error: SwarmError::PrerequisitesMissing {
                missing: vec!["git".into()],
            }
            .in_step("prerequisites"),
        };
        assert_eq!(aborted.failed_step(), Some("prerequisites"));
        assert!(aborted.to_string().starts_with("prerequisites: missing prerequisites"));
    }
}
