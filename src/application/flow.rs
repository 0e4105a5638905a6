use super::dashboard::DashboardPresenter;
use super::session::{Screen, ScreenState, Session, UserEvent};
use crate::config::{FlowConfig, Timings};
use crate::domain::language::LanguageChoice;
use crate::domain::loan::{LoanAccount, LoanRecord};
use crate::domain::manual::ManualState;
use crate::domain::ports::Services;
use crate::domain::schema::{WizardKind, WizardSchema};
use crate::domain::wizard::{Advance, CaptureTicket, SettleTicket, StepEngine};
use crate::error::{FlowError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TaskKind {
    Splash,
    LanguageWindow,
    Capture,
    Settle,
    Approval,
}

#[derive(Debug)]
enum FlowEvent {
    SplashElapsed,
    LanguageWindowElapsed,
    CaptureResolved {
        ticket: CaptureTicket,
        outcome: Result<String>,
    },
    SettleElapsed {
        ticket: SettleTicket,
    },
    LoanApproved {
        outcome: Result<LoanRecord>,
    },
}

/// An async result tagged with the task that produced it and the screen it belongs to.
#[derive(Debug)]
struct Envelope {
    task: u64,
    epoch: u64,
    event: FlowEvent,
}

/// Outstanding tasks, at most one per kind.
#[derive(Default)]
struct PendingTasks {
    next_id: u64,
    handles: HashMap<TaskKind, (u64, AbortHandle)>,
}

impl PendingTasks {
    fn reserve(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert(&mut self, kind: TaskKind, id: u64, handle: AbortHandle) {
        if let Some((_, previous)) = self.handles.insert(kind, (id, handle)) {
            previous.abort();
        }
    }

    fn cancel(&mut self, kind: TaskKind) {
        if let Some((_, handle)) = self.handles.remove(&kind) {
            handle.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, (_, handle)) in self.handles.drain() {
            handle.abort();
        }
    }

    /// Forgets a task whose result has been received.
    fn finish(&mut self, id: u64) {
        self.handles.retain(|_, (task, _)| *task != id);
    }

    fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for PendingTasks {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Aborts the inner worker when the reporting task is itself aborted.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Top-level screen state machine for one session.
///
/// User events are applied synchronously through [`FlowController::dispatch`].
/// Timers, captures and approval run as tokio tasks whose results are queued
/// and applied one at a time by [`FlowController::process_next`], so every
/// state change happens on the caller's task.
pub struct FlowController {
    session: Session,
    timings: Timings,
    tutorial: Arc<WizardSchema>,
    application: Arc<WizardSchema>,
    services: Services,
    epoch: u64,
    tasks: PendingTasks,
    events_tx: UnboundedSender<Envelope>,
    events_rx: UnboundedReceiver<Envelope>,
}

impl FlowController {
    pub fn new(config: FlowConfig, services: Services) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            timings: config.timings,
            tutorial: Arc::new(config.tutorial),
            application: Arc::new(config.application),
            services,
            epoch: 0,
            tasks: PendingTasks::default(),
            events_tx,
            events_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn screen_state(&self) -> ScreenState {
        self.session.screen_state()
    }

    /// Shows the splash screen and schedules the move to language selection.
    pub fn start(&mut self) {
        self.enter(Screen::Splash);
        self.schedule_timer(
            TaskKind::Splash,
            self.timings.splash(),
            FlowEvent::SplashElapsed,
        );
    }

    /// Applies one user interaction.
    ///
    /// `InvalidState` and `ValidationError` mean the control should have been
    /// disabled; the session is left unchanged. The one exception is a
    /// submitted application whose values do not form a loan record: the
    /// error is returned after the application wizard has been restarted.
    pub fn dispatch(&mut self, event: UserEvent) -> Result<()> {
        debug!(?event, screen = ?self.screen_state(), "user event");
        match event {
            UserEvent::PickLanguage(code) => {
                self.expect_screen(ScreenState::LanguageSelect)?;
                let language = LanguageChoice::from_code(&code)?;
                info!(code = %language.code, "language selected");
                self.session.language = Some(language);
                Ok(())
            }
            UserEvent::Continue => {
                self.expect_screen(ScreenState::LanguageSelect)?;
                if self.session.language.is_none() {
                    return Err(FlowError::InvalidState(
                        "no language chosen yet".to_string(),
                    ));
                }
                self.enter_tutorial()
            }
            UserEvent::RequestHelp => {
                if !self.session.quick_guide_visible() {
                    return Err(FlowError::InvalidState(
                        "the quick guide is no longer offered".to_string(),
                    ));
                }
                self.enter(Screen::Manual(ManualState::default()));
                Ok(())
            }
            UserEvent::ManualNext => self.manual_mut()?.next().map(|_| ()),
            UserEvent::ManualPrevious => self.manual_mut()?.previous().map(|_| ()),
            UserEvent::CloseManual => {
                self.expect_screen(ScreenState::Manual)?;
                self.enter_tutorial()
            }
            UserEvent::MicPressed => {
                let request = self.open_wizard()?.begin_capture()?;
                let voice = Arc::clone(&self.services.voice);
                let ticket = request.ticket;
                self.spawn(
                    TaskKind::Capture,
                    async move { voice.capture(&request.field_key).await },
                    move |joined| FlowEvent::CaptureResolved {
                        ticket,
                        outcome: joined.unwrap_or_else(|e| {
                            Err(FlowError::CaptureError(format!("capture task failed: {e}")))
                        }),
                    },
                );
                Ok(())
            }
            UserEvent::EditField(value) => self.open_wizard()?.set_field(value),
            UserEvent::Back => {
                let wizard = self.open_wizard()?;
                if wizard.kind() != WizardKind::Application {
                    return Err(FlowError::InvalidState(
                        "the tutorial has no back navigation".to_string(),
                    ));
                }
                let index = wizard.go_back()?;
                self.tasks.cancel(TaskKind::Capture);
                self.tasks.cancel(TaskKind::Settle);
                debug!(index, "stepped back");
                Ok(())
            }
            UserEvent::Next | UserEvent::Submit => {
                let advance = self.open_wizard()?.go_next()?;
                self.tasks.cancel(TaskKind::Settle);
                self.after_advance(advance)
            }
            UserEvent::Skip => {
                self.expect_screen(ScreenState::Tutorial)?;
                info!("tutorial skipped");
                self.enter_application()
            }
            UserEvent::SwitchTab(tab) => {
                self.dashboard_mut()?.switch_tab(tab);
                Ok(())
            }
            UserEvent::ToggleQrCode => self.dashboard_mut()?.toggle_qr_code().map(|_| ()),
            UserEvent::NewApplication => {
                self.expect_screen(ScreenState::Dashboard)?;
                self.enter_application()
            }
        }
    }

    /// Waits for the next async result and applies it.
    ///
    /// Returns `false` without waiting when nothing is outstanding. Stale and
    /// failed results are logged and absorbed.
    pub async fn process_next(&mut self) -> bool {
        if self.tasks.is_empty() && self.events_rx.is_empty() {
            return false;
        }
        let Some(envelope) = self.events_rx.recv().await else {
            return false;
        };

        match self.apply(envelope) {
            Ok(()) => {}
            Err(FlowError::StaleResolution(reason)) => {
                debug!(%reason, "discarding stale resolution");
            }
            Err(e) => {
                warn!(error = %e, screen = ?self.screen_state(), "async result rejected");
            }
        }
        true
    }

    /// Processes async results until `done` holds for the session.
    pub async fn run_until<P>(&mut self, done: P) -> Result<()>
    where
        P: Fn(&Session) -> bool,
    {
        while !done(&self.session) {
            if !self.process_next().await {
                return Err(FlowError::InvalidState(format!(
                    "nothing left to wait for on {:?}",
                    self.screen_state()
                )));
            }
        }
        Ok(())
    }

    /// Processes async results until none are outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.process_next().await {}
    }

    /// Lets async work progress for `duration`.
    pub async fn run_for(&mut self, duration: Duration) {
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            match tokio::time::timeout_at(deadline, self.process_next()).await {
                Ok(true) => continue,
                Ok(false) => {
                    tokio::time::sleep_until(deadline).await;
                    break;
                }
                Err(_) => break,
            }
        }
    }

    fn apply(&mut self, envelope: Envelope) -> Result<()> {
        self.tasks.finish(envelope.task);
        if envelope.epoch != self.epoch {
            return Err(FlowError::StaleResolution(format!(
                "{:?} belongs to a screen that was left",
                envelope.event
            )));
        }

        match envelope.event {
            FlowEvent::SplashElapsed => {
                self.expect_screen(ScreenState::Splash)
                    .map_err(|e| FlowError::StaleResolution(e.to_string()))?;
                self.enter_language_select();
                Ok(())
            }
            FlowEvent::LanguageWindowElapsed => {
                let Screen::LanguageSelect {
                    quick_guide_visible,
                } = &mut self.session.screen
                else {
                    return Err(FlowError::StaleResolution(
                        "language window outlived its screen".to_string(),
                    ));
                };
                *quick_guide_visible = false;
                // The choice is read when the expiry event is applied; a pick
                // that lands before that advances, a later one needs Continue.
                if self.session.language.is_some() {
                    info!("auto-advancing from language selection");
                    self.enter_tutorial()
                } else {
                    debug!("language window expired without a choice");
                    Ok(())
                }
            }
            FlowEvent::CaptureResolved { ticket, outcome } => {
                let wizard = self.session.wizard_mut().ok_or_else(|| {
                    FlowError::StaleResolution("capture outlived its wizard".to_string())
                })?;
                match outcome {
                    Ok(value) => {
                        let settle = wizard.on_capture_resolved(ticket, value)?;
                        debug!(field = %wizard.current_step().field_key, "capture stored");
                        self.schedule_timer(
                            TaskKind::Settle,
                            self.timings.success_pulse(),
                            FlowEvent::SettleElapsed { ticket: settle },
                        );
                        Ok(())
                    }
                    Err(e) => {
                        wizard.on_capture_failed(ticket)?;
                        Err(e)
                    }
                }
            }
            FlowEvent::SettleElapsed { ticket } => {
                let wizard = self.session.wizard_mut().ok_or_else(|| {
                    FlowError::StaleResolution("success pulse outlived its wizard".to_string())
                })?;
                let advance = wizard.on_settle_elapsed(ticket)?;
                self.after_advance(advance)
            }
            FlowEvent::LoanApproved { outcome } => {
                if !self.session.is_approving() {
                    return Err(FlowError::StaleResolution(
                        "approval arrived without a pending application".to_string(),
                    ));
                }
                match outcome {
                    Ok(record) => self.disburse(record).or_else(|e| {
                        warn!(error = %e, "account could not be opened, restarting application");
                        self.enter_application()
                    }),
                    Err(e) => {
                        warn!(error = %e, "approval failed, restarting application");
                        self.enter_application()
                    }
                }
            }
        }
    }

    fn after_advance(&mut self, advance: Advance) -> Result<()> {
        match advance {
            Advance::Moved(index) => {
                debug!(index, "wizard advanced");
                Ok(())
            }
            Advance::Completed => match self.screen_state() {
                ScreenState::Tutorial => {
                    info!("tutorial complete");
                    self.enter_application()
                }
                ScreenState::Application => self.submit_application(),
                other => Err(FlowError::InvalidState(format!(
                    "no wizard completes on {other:?}"
                ))),
            },
        }
    }

    fn submit_application(&mut self) -> Result<()> {
        let Screen::Application { wizard, approving } = &mut self.session.screen else {
            return Err(FlowError::InvalidState(
                "no application to submit".to_string(),
            ));
        };
        let record = match LoanRecord::from_fields(&wizard.state().field_values) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "no loan record from collected values, restarting application");
                self.enter_application()?;
                return Err(e);
            }
        };
        *approving = true;
        info!(amount = %record.loan_amount_requested.value(), "application submitted");

        let approval = Arc::clone(&self.services.approval);
        self.spawn(
            TaskKind::Approval,
            async move { approval.approve(record).await },
            |joined| FlowEvent::LoanApproved {
                outcome: joined.unwrap_or_else(|e| {
                    Err(FlowError::ApprovalError(format!("approval task failed: {e}")))
                }),
            },
        );
        Ok(())
    }

    fn disburse(&mut self, record: LoanRecord) -> Result<()> {
        let amount = record.loan_amount_requested.value();
        let account = LoanAccount::open(record)?;
        info!(%amount, "loan disbursed");
        self.services.disbursement.on_loan_disbursed(amount);
        self.enter(Screen::Dashboard(DashboardPresenter::new(account)));
        Ok(())
    }

    fn enter_language_select(&mut self) {
        self.enter(Screen::LanguageSelect {
            quick_guide_visible: true,
        });
        self.schedule_timer(
            TaskKind::LanguageWindow,
            self.timings.lang_auto_advance(),
            FlowEvent::LanguageWindowElapsed,
        );
    }

    fn enter_tutorial(&mut self) -> Result<()> {
        let wizard = StepEngine::start(Arc::clone(&self.tutorial))?;
        self.enter(Screen::Tutorial(wizard));
        Ok(())
    }

    fn enter_application(&mut self) -> Result<()> {
        let wizard = StepEngine::start(Arc::clone(&self.application))?;
        self.enter(Screen::Application {
            wizard,
            approving: false,
        });
        Ok(())
    }

    /// Swaps the active screen, cancelling everything the old one started.
    fn enter(&mut self, screen: Screen) {
        self.tasks.cancel_all();
        self.epoch += 1;
        let from = self.screen_state();
        self.session.screen = screen;
        info!(?from, to = ?self.screen_state(), "screen transition");
    }

    fn expect_screen(&self, expected: ScreenState) -> Result<()> {
        let actual = self.screen_state();
        if actual == expected {
            Ok(())
        } else {
            Err(FlowError::InvalidState(format!(
                "expected {expected:?} screen, on {actual:?}"
            )))
        }
    }

    /// The wizard on screen, if it still accepts input.
    fn open_wizard(&mut self) -> Result<&mut StepEngine> {
        if self.session.is_approving() {
            return Err(FlowError::InvalidState(
                "application is awaiting approval".to_string(),
            ));
        }
        self.session
            .wizard_mut()
            .ok_or_else(|| FlowError::InvalidState("no wizard on screen".to_string()))
    }

    fn manual_mut(&mut self) -> Result<&mut ManualState> {
        match &mut self.session.screen {
            Screen::Manual(manual) => Ok(manual),
            _ => Err(FlowError::InvalidState("manual is not open".to_string())),
        }
    }

    fn dashboard_mut(&mut self) -> Result<&mut DashboardPresenter> {
        match &mut self.session.screen {
            Screen::Dashboard(dashboard) => Ok(dashboard),
            _ => Err(FlowError::InvalidState("dashboard not shown".to_string())),
        }
    }

    fn schedule_timer(&mut self, kind: TaskKind, duration: Duration, event: FlowEvent) {
        let timer = Arc::clone(&self.services.timer);
        self.spawn(
            kind,
            async move { timer.wait(duration).await },
            move |joined| {
                // A broken timer counts as elapsed.
                if let Err(e) = joined {
                    warn!(error = %e, ?kind, "timer task failed");
                }
                event
            },
        );
    }

    /// Runs `work` on its own task and posts `finish(outcome)` back to the
    /// controller. A panicking port reaches `finish` as a `JoinError`, so the
    /// controller is never left waiting on a result that cannot arrive.
    fn spawn<T, F, G>(&mut self, kind: TaskKind, work: F, finish: G)
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
        G: FnOnce(std::result::Result<T, JoinError>) -> FlowEvent + Send + 'static,
    {
        let id = self.tasks.reserve();
        let epoch = self.epoch;
        let tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            let mut worker = AbortOnDrop(tokio::spawn(work));
            let event = finish((&mut worker.0).await);
            // The receiver lives as long as the controller.
            let _ = tx.send(Envelope {
                task: id,
                epoch,
                event,
            });
        });
        self.tasks.insert(kind, id, handle.abort_handle());
    }
}
