use crate::domain::schema::{StepDefinition, WizardKind, WizardSchema};
use crate::error::{FlowError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Identifies the step and navigation generation a capture was started for.
///
/// Every navigation bumps the engine's generation, so a ticket issued before
/// the user moved on no longer matches and its result is rejected as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTicket {
    generation: u64,
    index: usize,
}

/// Identifies the success pulse that must settle before the wizard advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTicket {
    generation: u64,
    index: usize,
}

/// What the caller must hand to the voice capture port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub ticket: CaptureTicket,
    pub field_key: String,
}

/// Result of leaving the active step forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub current_index: usize,
    pub field_values: HashMap<String, String>,
    pub is_capturing: bool,
    pub capture_succeeded: bool,
}

/// Drives one wizard visit over a fixed schema.
///
/// The engine never waits on anything itself. Async work is described by the
/// tickets it hands out, and results are fed back through
/// [`StepEngine::on_capture_resolved`] and [`StepEngine::on_settle_elapsed`].
#[derive(Debug, Clone)]
pub struct StepEngine {
    schema: Arc<WizardSchema>,
    state: WizardState,
    generation: u64,
    complete: bool,
}

impl StepEngine {
    pub fn start(schema: Arc<WizardSchema>) -> Result<Self> {
        if schema.is_empty() {
            return Err(FlowError::InvalidState(
                "cannot start a wizard without steps".to_string(),
            ));
        }
        Ok(Self {
            schema,
            state: WizardState::default(),
            generation: 0,
            complete: false,
        })
    }

    pub fn kind(&self) -> WizardKind {
        self.schema.kind
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> &StepDefinition {
        &self.schema.steps[self.state.current_index]
    }

    pub fn current_value(&self) -> Option<&str> {
        self.state
            .field_values
            .get(&self.current_step().field_key)
            .map(String::as_str)
    }

    pub fn step_count(&self) -> usize {
        self.schema.len()
    }

    /// 1-based position and total, as shown in the wizard header.
    pub fn progress(&self) -> (usize, usize) {
        (self.state.current_index + 1, self.step_count())
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn begin_capture(&mut self) -> Result<CaptureRequest> {
        self.ensure_open()?;
        if self.state.is_capturing {
            return Err(FlowError::InvalidState(
                "a capture is already in progress".to_string(),
            ));
        }
        if self.state.capture_succeeded {
            return Err(FlowError::InvalidState(
                "the previous capture is still settling".to_string(),
            ));
        }

        self.state.is_capturing = true;
        Ok(CaptureRequest {
            ticket: CaptureTicket {
                generation: self.generation,
                index: self.state.current_index,
            },
            field_key: self.current_step().field_key.clone(),
        })
    }

    /// Applies a recognised value to the step the capture was started for.
    pub fn on_capture_resolved(
        &mut self,
        ticket: CaptureTicket,
        value: impl Into<String>,
    ) -> Result<SettleTicket> {
        self.check_capture(ticket)?;
        self.state.is_capturing = false;

        let value = value.into().trim().to_string();
        self.current_step().input_kind.validate(&value)?;

        let key = self.current_step().field_key.clone();
        self.state.field_values.insert(key, value);
        self.state.capture_succeeded = true;
        Ok(SettleTicket {
            generation: self.generation,
            index: self.state.current_index,
        })
    }

    /// Releases the capture slot after the capture port failed.
    pub fn on_capture_failed(&mut self, ticket: CaptureTicket) -> Result<()> {
        self.check_capture(ticket)?;
        self.state.is_capturing = false;
        Ok(())
    }

    pub fn on_settle_elapsed(&mut self, ticket: SettleTicket) -> Result<Advance> {
        if self.complete
            || ticket.generation != self.generation
            || ticket.index != self.state.current_index
            || !self.state.capture_succeeded
        {
            return Err(FlowError::StaleResolution(format!(
                "success pulse for step {} no longer active",
                ticket.index
            )));
        }
        self.state.capture_succeeded = false;
        Ok(self.advance())
    }

    pub fn go_back(&mut self) -> Result<usize> {
        self.ensure_open()?;
        if self.state.current_index == 0 {
            return Err(FlowError::InvalidState(
                "already at the first step".to_string(),
            ));
        }
        self.state.current_index -= 1;
        self.state.is_capturing = false;
        self.state.capture_succeeded = false;
        self.generation += 1;
        Ok(self.state.current_index)
    }

    /// Manual advance without voice; the active field must hold a valid value.
    pub fn go_next(&mut self) -> Result<Advance> {
        self.ensure_open()?;
        if self.state.is_capturing {
            return Err(FlowError::InvalidState(
                "cannot advance while listening".to_string(),
            ));
        }
        let step = self.current_step();
        let value = self.current_value().unwrap_or_default();
        step.input_kind.validate(value).map_err(|e| match e {
            FlowError::ValidationError(reason) => {
                FlowError::ValidationError(format!("{}: {reason}", step.field_key))
            }
            other => other,
        })?;

        self.state.capture_succeeded = false;
        Ok(self.advance())
    }

    /// Typed input for the active field; overwrites whatever is there.
    pub fn set_field(&mut self, value: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        let key = self.current_step().field_key.clone();
        self.state.field_values.insert(key, value.into());
        Ok(())
    }

    fn advance(&mut self) -> Advance {
        self.generation += 1;
        if self.state.current_index + 1 >= self.step_count() {
            self.complete = true;
            Advance::Completed
        } else {
            self.state.current_index += 1;
            Advance::Moved(self.state.current_index)
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.complete {
            Err(FlowError::InvalidState("wizard already complete".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_capture(&self, ticket: CaptureTicket) -> Result<()> {
        if self.complete
            || ticket.generation != self.generation
            || ticket.index != self.state.current_index
            || !self.state.is_capturing
        {
            return Err(FlowError::StaleResolution(format!(
                "capture for step {} no longer active",
                ticket.index
            )));
        }
        Ok(())
    }
}
