use super::loan::LoanRecord;
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Speech-to-text stand-in. Resolves exactly once per call.
#[async_trait]
pub trait VoiceCapture: Send + Sync {
    async fn capture(&self, field_key: &str) -> Result<String>;
}

/// Approves a finished application before disbursement.
#[async_trait]
pub trait LoanApproval: Send + Sync {
    async fn approve(&self, record: LoanRecord) -> Result<LoanRecord>;
}

/// Source of display and settle intervals.
#[async_trait]
pub trait Timer: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Receives the requested amount once an application has been approved.
pub trait DisbursementListener: Send + Sync {
    fn on_loan_disbursed(&self, amount: Decimal);
}

pub type VoiceCaptureRef = Arc<dyn VoiceCapture>;
pub type LoanApprovalRef = Arc<dyn LoanApproval>;
pub type TimerRef = Arc<dyn Timer>;
pub type DisbursementListenerRef = Arc<dyn DisbursementListener>;

/// The external capabilities a session depends on.
#[derive(Clone)]
pub struct Services {
    pub voice: VoiceCaptureRef,
    pub approval: LoanApprovalRef,
    pub timer: TimerRef,
    pub disbursement: DisbursementListenerRef,
}
