use crate::application::session::{ScreenState, Session};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One-row description of where a session ended up.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct SessionSummary {
    pub screen: ScreenState,
    pub language: Option<String>,
    pub step: Option<usize>,
    pub total_steps: Option<usize>,
    pub loan_amount: Option<Decimal>,
    pub remaining_balance: Option<Decimal>,
    pub monthly_emi: Option<Decimal>,
    pub credit_score: Option<u32>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        let progress = session.wizard().map(|wizard| wizard.progress());
        let account = session.dashboard().map(|dashboard| dashboard.account());
        Self {
            screen: session.screen_state(),
            language: session.language().map(|lang| lang.code.clone()),
            step: progress.map(|(step, _)| step),
            total_steps: progress.map(|(_, total)| total),
            loan_amount: account.map(|a| a.loan_amount.normalize()),
            remaining_balance: account.map(|a| a.remaining_balance.normalize()),
            monthly_emi: account.map(|a| a.monthly_emi.normalize()),
            credit_score: account.map(|a| a.credit_score),
        }
    }
}

/// Writes session summaries as CSV.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    /// Writes the header (first call only) and one row, then flushes.
    pub fn write_summary(&mut self, summary: &SessionSummary) -> std::io::Result<()> {
        self.writer.serialize(summary)?;
        self.writer.flush()
    }
}
