use crate::domain::schema::{InputKind, WizardKind, WizardSchema, fields};
use crate::error::{FlowError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Latencies of every simulated or displayed interval, in milliseconds.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Timings {
    pub splash_duration_ms: u64,
    pub lang_auto_advance_ms: u64,
    pub capture_latency_ms: u64,
    pub success_pulse_ms: u64,
    pub approval_latency_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            splash_duration_ms: 3000,
            lang_auto_advance_ms: 5000,
            capture_latency_ms: 2000,
            success_pulse_ms: 1500,
            approval_latency_ms: 3000,
        }
    }
}

impl Timings {
    pub fn splash(&self) -> Duration {
        Duration::from_millis(self.splash_duration_ms)
    }

    pub fn lang_auto_advance(&self) -> Duration {
        Duration::from_millis(self.lang_auto_advance_ms)
    }

    pub fn capture_latency(&self) -> Duration {
        Duration::from_millis(self.capture_latency_ms)
    }

    pub fn success_pulse(&self) -> Duration {
        Duration::from_millis(self.success_pulse_ms)
    }

    pub fn approval_latency(&self) -> Duration {
        Duration::from_millis(self.approval_latency_ms)
    }
}

/// Everything a session can be configured with.
///
/// Every key is optional in the JSON form; missing keys fall back to the
/// built-in timings and schemas.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FlowConfig {
    pub timings: Timings,
    pub tutorial: WizardSchema,
    pub application: WizardSchema,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            tutorial: WizardSchema::tutorial(),
            application: WizardSchema::application(),
        }
    }
}

impl FlowConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (schema, expected) in [
            (&self.tutorial, WizardKind::Tutorial),
            (&self.application, WizardKind::Application),
        ] {
            if schema.kind != expected {
                return Err(FlowError::ConfigError(format!(
                    "{expected:?} schema declared as {:?}",
                    schema.kind
                )));
            }
            if schema.is_empty() {
                return Err(FlowError::ConfigError(format!(
                    "{expected:?} schema has no steps"
                )));
            }
        }

        if let Some(missing) = fields::LOAN_RECORD
            .iter()
            .find(|key| !self.application.contains_field(key))
        {
            return Err(FlowError::ConfigError(format!(
                "application schema is missing field '{missing}'"
            )));
        }

        if let Some(step) = self.application.steps.iter().find(|step| {
            step.field_key == fields::LOAN_AMOUNT && step.input_kind != InputKind::Amount
        }) {
            return Err(FlowError::ConfigError(format!(
                "field '{}' must use the amount input kind, not {:?}",
                step.field_key, step.input_kind
            )));
        }
        Ok(())
    }
}
