use crate::application::dashboard::DashboardTab;
use crate::application::session::UserEvent;
use crate::error::{FlowError, Result};
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ScriptEvent {
    PickLanguage,
    Continue,
    Help,
    ManualNext,
    ManualPrevious,
    CloseManual,
    Mic,
    Edit,
    Back,
    Next,
    Submit,
    Skip,
    Tab,
    ToggleQr,
    NewApplication,
    Wait,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScriptRow {
    pub event: ScriptEvent,
    pub value: Option<String>,
}

/// One instruction of a replayed session.
#[derive(Debug, PartialEq, Clone)]
pub enum ScriptStep {
    User(UserEvent),
    /// Let async work run for this long.
    Wait(Duration),
}

impl TryFrom<ScriptRow> for ScriptStep {
    type Error = FlowError;

    fn try_from(row: ScriptRow) -> Result<Self> {
        let value = |row: ScriptRow| {
            row.value.ok_or_else(|| {
                FlowError::ValidationError(format!("'{:?}' needs a value", row.event))
            })
        };

        let kind = row.event;
        let event = match kind {
            ScriptEvent::PickLanguage => UserEvent::PickLanguage(value(row)?),
            ScriptEvent::Continue => UserEvent::Continue,
            ScriptEvent::Help => UserEvent::RequestHelp,
            ScriptEvent::ManualNext => UserEvent::ManualNext,
            ScriptEvent::ManualPrevious => UserEvent::ManualPrevious,
            ScriptEvent::CloseManual => UserEvent::CloseManual,
            ScriptEvent::Mic => UserEvent::MicPressed,
            // A blank edit clears the field.
            ScriptEvent::Edit => UserEvent::EditField(row.value.unwrap_or_default()),
            ScriptEvent::Back => UserEvent::Back,
            ScriptEvent::Next => UserEvent::Next,
            ScriptEvent::Submit => UserEvent::Submit,
            ScriptEvent::Skip => UserEvent::Skip,
            ScriptEvent::Tab => UserEvent::SwitchTab(value(row)?.parse::<DashboardTab>()?),
            ScriptEvent::ToggleQr => UserEvent::ToggleQrCode,
            ScriptEvent::NewApplication => UserEvent::NewApplication,
            ScriptEvent::Wait => {
                let raw = value(row)?;
                let millis = raw.trim().parse::<u64>().map_err(|_| {
                    FlowError::ValidationError(format!("'{raw}' is not a number of milliseconds"))
                })?;
                return Ok(ScriptStep::Wait(Duration::from_millis(millis)));
            }
        };
        Ok(ScriptStep::User(event))
    }
}

/// Reads a scripted session from a CSV source with an `event,value` header.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields script steps; a malformed row yields an error and reading continues.
    pub fn steps(self) -> impl Iterator<Item = Result<ScriptStep>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map_err(FlowError::from)
                .and_then(|row: ScriptRow| ScriptStep::try_from(row))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "event,value\nwait,3000\npick_language,hi\ncontinue,\nedit,\"₹25,000\"\ntab,Repay";
        let steps: Vec<Result<ScriptStep>> = EventReader::new(data.as_bytes()).steps().collect();

        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[0].as_ref().unwrap(),
            &ScriptStep::Wait(Duration::from_millis(3000))
        );
        assert_eq!(
            steps[1].as_ref().unwrap(),
            &ScriptStep::User(UserEvent::PickLanguage("hi".to_string()))
        );
        assert_eq!(
            steps[2].as_ref().unwrap(),
            &ScriptStep::User(UserEvent::Continue)
        );
        assert_eq!(
            steps[3].as_ref().unwrap(),
            &ScriptStep::User(UserEvent::EditField("₹25,000".to_string()))
        );
        assert_eq!(
            steps[4].as_ref().unwrap(),
            &ScriptStep::User(UserEvent::SwitchTab(DashboardTab::Repay))
        );
    }

    #[test]
    fn test_reader_malformed_lines() {
        let data = "event,value\ndance,\nwait,soon\npick_language,\nmic,";
        let steps: Vec<Result<ScriptStep>> = EventReader::new(data.as_bytes()).steps().collect();

        assert!(matches!(steps[0], Err(FlowError::CsvError(_))));
        assert!(matches!(steps[1], Err(FlowError::ValidationError(_))));
        assert!(matches!(steps[2], Err(FlowError::ValidationError(_))));
        assert_eq!(
            steps[3].as_ref().unwrap(),
            &ScriptStep::User(UserEvent::MicPressed)
        );
    }

    #[test]
    fn test_missing_value_column() {
        let data = "event\nskip";
        let steps: Vec<Result<ScriptStep>> = EventReader::new(data.as_bytes()).steps().collect();
        assert_eq!(steps[0].as_ref().unwrap(), &ScriptStep::User(UserEvent::Skip));
    }
}
