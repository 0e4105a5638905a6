use crate::config::Timings;
use crate::domain::loan::LoanRecord;
use crate::domain::ports::{
    DisbursementListenerRef, LoanApproval, Services, Timer, TimerRef, VoiceCapture,
};
use crate::domain::schema::fields;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Returned for fields without a canned sample (the tutorial steps).
pub const DEFAULT_SAMPLE: &str = "Sample input received";

/// Timer backed by the tokio clock, so paused test time drives it too.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Pretends to recognise speech: waits, then answers with a canned value.
#[derive(Clone)]
pub struct SimulatedVoiceCapture {
    latency: Duration,
    timer: TimerRef,
    samples: HashMap<String, String>,
}

impl SimulatedVoiceCapture {
    pub fn new(latency: Duration, timer: TimerRef) -> Self {
        let samples = [
            (fields::NAME, "राम कुमार"),
            (fields::LOCATION, "रामपुर, मेरठ"),
            (fields::INCOME, "₹15,000"),
            (fields::LOAN_AMOUNT, "₹25,000"),
            (fields::PURPOSE, "व्यापार"),
            (fields::BANK_ACCOUNT, "1234567890"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            latency,
            timer,
            samples,
        }
    }

    /// Replaces or adds the answer given for `field_key`.
    pub fn with_sample(mut self, field_key: &str, value: &str) -> Self {
        self.samples
            .insert(field_key.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl VoiceCapture for SimulatedVoiceCapture {
    async fn capture(&self, field_key: &str) -> Result<String> {
        self.timer.wait(self.latency).await;
        Ok(self
            .samples
            .get(field_key)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SAMPLE.to_string()))
    }
}

/// Approves every application after a fixed delay.
#[derive(Clone)]
pub struct SimulatedApproval {
    latency: Duration,
    timer: TimerRef,
}

impl SimulatedApproval {
    pub fn new(latency: Duration, timer: TimerRef) -> Self {
        Self { latency, timer }
    }
}

#[async_trait]
impl LoanApproval for SimulatedApproval {
    async fn approve(&self, record: LoanRecord) -> Result<LoanRecord> {
        self.timer.wait(self.latency).await;
        Ok(record)
    }
}

/// Wires the simulated adapters with the configured latencies.
///
/// Every delay, the adapters' included, goes through the one shared timer.
pub fn simulated_services(timings: &Timings, disbursement: DisbursementListenerRef) -> Services {
    let timer: TimerRef = Arc::new(TokioTimer);
    Services {
        voice: Arc::new(SimulatedVoiceCapture::new(
            timings.capture_latency(),
            Arc::clone(&timer),
        )),
        approval: Arc::new(SimulatedApproval::new(
            timings.approval_latency(),
            Arc::clone(&timer),
        )),
        timer,
        disbursement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Returns at once and remembers what it was asked to wait for.
    #[derive(Default)]
    struct RecordingTimer {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Timer for RecordingTimer {
        async fn wait(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    fn tokio_timer() -> TimerRef {
        Arc::new(TokioTimer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_waits_for_latency() {
        let voice = SimulatedVoiceCapture::new(Duration::from_millis(2000), tokio_timer());
        let started = Instant::now();

        let value = voice.capture(fields::LOAN_AMOUNT).await.unwrap();

        assert_eq!(value, "₹25,000");
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_field_gets_default_sample() {
        let voice = SimulatedVoiceCapture::new(Duration::ZERO, tokio_timer());
        assert_eq!(voice.capture("complete").await.unwrap(), DEFAULT_SAMPLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_override() {
        let voice = SimulatedVoiceCapture::new(Duration::ZERO, tokio_timer())
            .with_sample(fields::NAME, "Sita");
        assert_eq!(voice.capture(fields::NAME).await.unwrap(), "Sita");
    }

    #[tokio::test]
    async fn test_latency_goes_through_timer_port() {
        let timer = Arc::new(RecordingTimer::default());
        let voice = SimulatedVoiceCapture::new(Duration::from_millis(2000), timer.clone());
        let approval = SimulatedApproval::new(Duration::from_millis(3000), timer.clone());

        voice.capture(fields::NAME).await.unwrap();
        let record = LoanRecord {
            name: "Ram".to_string(),
            location: "Rampur".to_string(),
            income_text: "15000".to_string(),
            loan_amount_requested: dec!(25000).try_into().unwrap(),
            purpose: "Dairy".to_string(),
            bank_account: "1234".to_string(),
        };
        assert_eq!(approval.approve(record.clone()).await.unwrap(), record);

        assert_eq!(
            *timer.waits.lock().unwrap(),
            vec![Duration::from_millis(2000), Duration::from_millis(3000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_waits() {
        let started = Instant::now();
        TokioTimer.wait(Duration::from_millis(1500)).await;
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
