#![allow(dead_code)]

use std::sync::Arc;
use udhaar_flow::application::flow::FlowController;
use udhaar_flow::application::session::{ScreenState, Session, UserEvent};
use udhaar_flow::config::FlowConfig;
use udhaar_flow::infrastructure::in_memory::RecordingDisbursements;
use udhaar_flow::infrastructure::simulated::simulated_services;

/// Application field values in schema order, as the simulated voice would produce them.
pub const APPLICATION_ANSWERS: [&str; 6] = [
    "राम कुमार",
    "रामपुर, मेरठ",
    "₹15,000",
    "₹25,000",
    "व्यापार",
    "1234567890",
];

pub fn controller() -> (FlowController, RecordingDisbursements) {
    controller_with(FlowConfig::default())
}

pub fn controller_with(config: FlowConfig) -> (FlowController, RecordingDisbursements) {
    let disbursements = RecordingDisbursements::new();
    let services = simulated_services(&config.timings, Arc::new(disbursements.clone()));
    (FlowController::new(config, services), disbursements)
}

pub fn on(screen: ScreenState) -> impl Fn(&Session) -> bool {
    move |session| session.screen_state() == screen
}

/// True once no capture or success pulse is pending on the shown wizard.
pub fn wizard_settled(session: &Session) -> bool {
    session
        .wizard()
        .map(|wizard| !wizard.state().is_capturing && !wizard.state().capture_succeeded)
        .unwrap_or(true)
}

pub fn current_index(flow: &FlowController) -> usize {
    flow.session()
        .wizard()
        .expect("a wizard is shown")
        .state()
        .current_index
}

pub async fn to_language_select(flow: &mut FlowController) {
    flow.start();
    flow.run_until(on(ScreenState::LanguageSelect)).await.unwrap();
}

pub async fn to_tutorial(flow: &mut FlowController) {
    to_language_select(flow).await;
    flow.dispatch(UserEvent::PickLanguage("hi".to_string()))
        .unwrap();
    flow.dispatch(UserEvent::Continue).unwrap();
    assert_eq!(flow.screen_state(), ScreenState::Tutorial);
}

pub async fn to_application(flow: &mut FlowController) {
    to_tutorial(flow).await;
    flow.dispatch(UserEvent::Skip).unwrap();
    assert_eq!(flow.screen_state(), ScreenState::Application);
}

/// Presses the microphone and waits for the capture and its success pulse.
pub async fn speak(flow: &mut FlowController) {
    flow.dispatch(UserEvent::MicPressed).unwrap();
    flow.run_until(wizard_settled).await.unwrap();
}

/// Types the given values into consecutive steps, pressing next after each.
pub fn type_answers(flow: &mut FlowController, answers: &[&str]) {
    for answer in answers {
        flow.dispatch(UserEvent::EditField(answer.to_string()))
            .unwrap();
        flow.dispatch(UserEvent::Next).unwrap();
    }
}
