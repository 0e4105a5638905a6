use super::dashboard::{DashboardPresenter, DashboardTab};
use crate::domain::language::LanguageChoice;
use crate::domain::manual::ManualState;
use crate::domain::wizard::StepEngine;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ScreenState {
    Splash,
    #[serde(rename = "language")]
    LanguageSelect,
    Tutorial,
    Manual,
    Application,
    Dashboard,
}

/// The active screen together with the state that only lives while it is shown.
#[derive(Debug)]
pub enum Screen {
    Splash,
    LanguageSelect { quick_guide_visible: bool },
    Manual(ManualState),
    Tutorial(StepEngine),
    Application { wizard: StepEngine, approving: bool },
    Dashboard(DashboardPresenter),
}

impl Screen {
    pub fn state(&self) -> ScreenState {
        match self {
            Screen::Splash => ScreenState::Splash,
            Screen::LanguageSelect { .. } => ScreenState::LanguageSelect,
            Screen::Manual(_) => ScreenState::Manual,
            Screen::Tutorial(_) => ScreenState::Tutorial,
            Screen::Application { .. } => ScreenState::Application,
            Screen::Dashboard(_) => ScreenState::Dashboard,
        }
    }
}

/// Inbound user interactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    PickLanguage(String),
    Continue,
    RequestHelp,
    ManualNext,
    ManualPrevious,
    CloseManual,
    MicPressed,
    EditField(String),
    Back,
    Next,
    /// The final "next" of the application wizard.
    Submit,
    Skip,
    SwitchTab(DashboardTab),
    ToggleQrCode,
    NewApplication,
}

/// Per-user state owned by one flow controller.
#[derive(Debug)]
pub struct Session {
    pub(crate) screen: Screen,
    pub(crate) language: Option<LanguageChoice>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            screen: Screen::Splash,
            language: None,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_state(&self) -> ScreenState {
        self.screen.state()
    }

    pub fn language(&self) -> Option<&LanguageChoice> {
        self.language.as_ref()
    }

    /// The wizard of the tutorial or application screen, if one is shown.
    pub fn wizard(&self) -> Option<&StepEngine> {
        match &self.screen {
            Screen::Tutorial(wizard) | Screen::Application { wizard, .. } => Some(wizard),
            _ => None,
        }
    }

    pub(crate) fn wizard_mut(&mut self) -> Option<&mut StepEngine> {
        match &mut self.screen {
            Screen::Tutorial(wizard) | Screen::Application { wizard, .. } => Some(wizard),
            _ => None,
        }
    }

    pub fn is_approving(&self) -> bool {
        matches!(self.screen, Screen::Application { approving: true, .. })
    }

    pub fn quick_guide_visible(&self) -> bool {
        matches!(
            self.screen,
            Screen::LanguageSelect {
                quick_guide_visible: true
            }
        )
    }

    pub fn manual(&self) -> Option<&ManualState> {
        match &self.screen {
            Screen::Manual(manual) => Some(manual),
            _ => None,
        }
    }

    pub fn dashboard(&self) -> Option<&DashboardPresenter> {
        match &self.screen {
            Screen::Dashboard(dashboard) => Some(dashboard),
            _ => None,
        }
    }
}
