//! Pipeline steps and their recorded outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One step of the local setup, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetupStep {
    Prerequisites,
    Directories,
    Temporal,
    Api,
    Worker,
    Ui,
    CliConfig,
    Verify,
}

impl SetupStep {
    /// Every step, in the order the pipeline runs them.
    pub const ALL: [SetupStep; 8] = [
        SetupStep::Prerequisites,
        SetupStep::Directories,
        SetupStep::Temporal,
        SetupStep::Api,
        SetupStep::Worker,
        SetupStep::Ui,
        SetupStep::CliConfig,
        SetupStep::Verify,
    ];

    /// Name recorded in [`StepResult::name`].
    pub fn name(self) -> &'static str {
        match self {
            SetupStep::Prerequisites => "prerequisites",
            SetupStep::Directories => "directories",
            SetupStep::Temporal => "temporal",
            SetupStep::Api => "api",
            SetupStep::Worker => "worker",
            SetupStep::Ui => "ui",
            SetupStep::CliConfig => "cli-config",
            SetupStep::Verify => "verify",
        }
    }

    /// Capitalized name used in warnings.
    pub fn display_name(self) -> &'static str {
        match self {
            SetupStep::Prerequisites => "Prerequisites",
            SetupStep::Directories => "Directories",
            SetupStep::Temporal => "Temporal",
            SetupStep::Api => "API",
            SetupStep::Worker => "Worker",
            SetupStep::Ui => "UI",
            SetupStep::CliConfig => "CLI config",
            SetupStep::Verify => "Verification",
        }
    }

    /// Section title shown while the step runs.
    pub fn title(self) -> &'static str {
        match self {
            SetupStep::Prerequisites => "Checking prerequisites",
            SetupStep::Directories => "Creating directory structure",
            SetupStep::Temporal => "Starting Temporal (Docker Compose)",
            SetupStep::Api => "Setting up API server",
            SetupStep::Worker => "Setting up Worker",
            SetupStep::Ui => "Setting up UI",
            SetupStep::CliConfig => "Configuring CLI",
            SetupStep::Verify => "Verifying services",
        }
    }

    /// A failed critical step aborts the pipeline.
    pub fn is_critical(self) -> bool {
        !matches!(
            self,
            SetupStep::Worker | SetupStep::Ui | SetupStep::Verify
        )
    }

    /// Steps the caller may opt out of.
    pub fn is_skippable(self) -> bool {
        matches!(
            self,
            SetupStep::Worker | SetupStep::Ui | SetupStep::Verify
        )
    }

    /// What still works when this advisory step fails.
    pub fn degraded_hint(self) -> Option<&'static str> {
        match self {
            SetupStep::Worker => Some("investigations won't run, but API/UI will work"),
            SetupStep::Ui => Some("CLI still works"),
            _ => None,
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SetupStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|step| step.name() == s)
            .ok_or_else(|| format!("unknown step: {}", s))
    }
}

/// Terminal state of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Fail,
    Skip,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Ok => '✓',
            StepStatus::Fail => '✗',
            StepStatus::Skip => '○',
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Ok => "ok",
            StepStatus::Fail => "fail",
            StepStatus::Skip => "skip",
        };
        f.write_str(s)
    }
}

/// Outcome of one step. Appended once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl StepResult {
    pub fn new(step: SetupStep, status: StepStatus, message: impl Into<String>) -> Self {
        Self {
            name: step.name().to_string(),
            status,
            message: message.into(),
        }
    }

    /// The step this result belongs to.
    pub fn step(&self) -> Option<SetupStep> {
        self.name.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_in_order() {
        let names: Vec<_> = SetupStep::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "prerequisites",
                "directories",
                "temporal",
                "api",
                "worker",
                "ui",
                "cli-config",
                "verify"
            ]
        );
    }

    #[test]
    fn criticality() {
        let advisory: Vec<_> = SetupStep::ALL
            .into_iter()
            .filter(|s| !s.is_critical())
            .collect();
        assert_eq!(
            advisory,
            vec![SetupStep::Worker, SetupStep::Ui, SetupStep::Verify]
        );
    }

    #[test]
    fn parses_names() {
        assert_eq!("cli-config".parse::<SetupStep>(), Ok(SetupStep::CliConfig));
        assert_eq!(" UI ".parse::<SetupStep>(), Ok(SetupStep::Ui));
        assert!("frontend".parse::<SetupStep>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let result = StepResult::new(SetupStep::Worker, StepStatus::Fail, "boom");
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"name":"worker","status":"fail","message":"boom"}"#);
    }

    #[test]
    fn empty_message_is_omitted() {
        let result = StepResult::new(SetupStep::Api, StepStatus::Ok, "");
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"name":"api","status":"ok"}"#);
    }
}
