use crate::domain::ports::DisbursementListener;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// A thread-safe in-memory record of every disbursement callback.
///
/// Uses `Arc<Mutex<Vec<Decimal>>>` so clones handed to a controller and kept
/// by the caller observe the same history.
#[derive(Default, Clone)]
pub struct RecordingDisbursements {
    amounts: Arc<Mutex<Vec<Decimal>>>,
}

impl RecordingDisbursements {
    /// Creates a new, empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Amounts received so far, in call order.
    pub fn amounts(&self) -> Vec<Decimal> {
        self.amounts
            .lock()
            .map(|amounts| amounts.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.amounts.lock().map(|amounts| amounts.len()).unwrap_or(0)
    }
}

impl DisbursementListener for RecordingDisbursements {
    fn on_loan_disbursed(&self, amount: Decimal) {
        if let Ok(mut amounts) = self.amounts.lock() {
            amounts.push(amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DisbursementListenerRef;
    use rust_decimal_macros::dec;

    #[test]
    fn test_clones_share_history() {
        let recorder = RecordingDisbursements::new();
        let listener: DisbursementListenerRef = Arc::new(recorder.clone());

        listener.on_loan_disbursed(dec!(25000));
        listener.on_loan_disbursed(dec!(1000));

        assert_eq!(recorder.amounts(), vec![dec!(25000), dec!(1000)]);
        assert_eq!(recorder.count(), 2);
    }

    #[test]
    fn test_empty_recorder() {
        let recorder = RecordingDisbursements::new();
        assert!(recorder.amounts().is_empty());
    }
}
