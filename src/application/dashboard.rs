use crate::domain::loan::LoanAccount;
use crate::error::{FlowError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Overview,
    Repay,
    Community,
    Rewards,
}

impl FromStr for DashboardTab {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" | "home" => Ok(DashboardTab::Overview),
            "repay" | "pay" => Ok(DashboardTab::Repay),
            "community" => Ok(DashboardTab::Community),
            "rewards" => Ok(DashboardTab::Rewards),
            other => Err(FlowError::ValidationError(format!("unknown tab '{other}'"))),
        }
    }
}

/// Figures shown on the active tab.
#[derive(Debug, PartialEq, Clone)]
pub enum TabView {
    Overview {
        loan_amount: Decimal,
        remaining_balance: Decimal,
        payments_completed: u32,
        total_payments: u32,
        next_installment: u32,
        monthly_emi: Decimal,
    },
    Repay {
        monthly_emi: Decimal,
        qr_code_visible: bool,
    },
    Community {
        rating: Decimal,
    },
    Rewards {
        credit_score: u32,
        total_paid: Decimal,
    },
}

/// Read-only projection of a disbursed loan. Only tab and QR state change.
#[derive(Debug, Clone)]
pub struct DashboardPresenter {
    account: LoanAccount,
    active_tab: DashboardTab,
    qr_code_visible: bool,
}

impl DashboardPresenter {
    pub fn new(account: LoanAccount) -> Self {
        Self {
            account,
            active_tab: DashboardTab::default(),
            qr_code_visible: false,
        }
    }

    pub fn account(&self) -> &LoanAccount {
        &self.account
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.active_tab
    }

    pub fn switch_tab(&mut self, tab: DashboardTab) {
        self.active_tab = tab;
        if tab != DashboardTab::Repay {
            self.qr_code_visible = false;
        }
    }

    pub fn toggle_qr_code(&mut self) -> Result<bool> {
        if self.active_tab != DashboardTab::Repay {
            return Err(FlowError::InvalidState(
                "the QR code is only offered on the repay tab".to_string(),
            ));
        }
        self.qr_code_visible = !self.qr_code_visible;
        Ok(self.qr_code_visible)
    }

    pub fn view(&self) -> TabView {
        let account = &self.account;
        match self.active_tab {
            DashboardTab::Overview => TabView::Overview {
                loan_amount: account.loan_amount,
                remaining_balance: account.remaining_balance,
                payments_completed: account.payments_completed,
                total_payments: account.total_payments,
                next_installment: account.next_installment(),
                monthly_emi: account.monthly_emi,
            },
            DashboardTab::Repay => TabView::Repay {
                monthly_emi: account.monthly_emi,
                qr_code_visible: self.qr_code_visible,
            },
            DashboardTab::Community => TabView::Community {
                rating: account.community_rating,
            },
            DashboardTab::Rewards => TabView::Rewards {
                credit_score: account.credit_score,
                total_paid: account.total_paid,
            },
        }
    }
}
