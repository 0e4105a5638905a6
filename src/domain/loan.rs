use crate::domain::schema::fields;
use crate::error::{FlowError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Share of the requested amount still outstanding on a freshly opened account.
const REMAINING_BALANCE_RATIO: Decimal = dec!(0.75);
/// Flat interest charged over the whole schedule.
const FLAT_INTEREST_RATE: Decimal = dec!(0.08);
const TOTAL_PAYMENTS: u32 = 12;
const PAYMENTS_COMPLETED: u32 = 3;
const CREDIT_SCORE: u32 = 720;
const COMMUNITY_RATING: Decimal = dec!(4.5);
/// Largest amount a single microloan may request (one crore).
pub const MAX_AMOUNT: Decimal = dec!(10000000);

/// A positive rupee amount requested by the applicant, at most [`MAX_AMOUNT`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(FlowError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        if value > MAX_AMOUNT {
            return Err(FlowError::ValidationError(format!(
                "Amount must not exceed {MAX_AMOUNT}"
            )));
        }
        Ok(Self(value))
    }

    /// Parses spoken or typed amounts such as "₹25,000" or "25000.50".
    ///
    /// Currency symbols, grouping commas and whitespace are ignored; any other
    /// character makes the value invalid.
    pub fn parse(text: &str) -> Result<Self> {
        let cleaned: String = text
            .trim()
            .trim_start_matches('₹')
            .trim_start_matches("Rs.")
            .trim_start_matches("Rs")
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(FlowError::ValidationError(format!(
                "'{text}' is not an amount"
            )));
        }
        let value = Decimal::from_str(&cleaned)
            .map_err(|_| FlowError::ValidationError(format!("'{text}' is not an amount")))?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = FlowError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// The finalized application, produced once when the application wizard completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub name: String,
    pub location: String,
    pub income_text: String,
    pub loan_amount_requested: Amount,
    pub purpose: String,
    pub bank_account: String,
}

impl LoanRecord {
    /// Builds the record from collected wizard values keyed by field.
    pub fn from_fields(values: &HashMap<String, String>) -> Result<Self> {
        let field = |key: &str| -> Result<String> {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| FlowError::ValidationError(format!("missing field '{key}'")))
        };

        Ok(Self {
            name: field(fields::NAME)?,
            location: field(fields::LOCATION)?,
            income_text: field(fields::INCOME)?,
            loan_amount_requested: Amount::parse(&field(fields::LOAN_AMOUNT)?)?,
            purpose: field(fields::PURPOSE)?,
            bank_account: field(fields::BANK_ACCOUNT)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
}

/// The servicing view of a disbursed loan, shown by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanAccount {
    pub record: LoanRecord,
    pub loan_amount: Decimal,
    pub remaining_balance: Decimal,
    pub monthly_emi: Decimal,
    pub total_paid: Decimal,
    pub payments_completed: u32,
    pub total_payments: u32,
    pub credit_score: u32,
    pub community_rating: Decimal,
    pub status: LoanStatus,
}

impl LoanAccount {
    /// Opens the simulated servicing account for an approved record.
    ///
    /// Figures that do not fit a `Decimal` fail with `ApprovalError`.
    pub fn open(record: LoanRecord) -> Result<Self> {
        let overflow = || {
            FlowError::ApprovalError(format!(
                "loan figures for {} overflow",
                record.loan_amount_requested.value()
            ))
        };
        let loan_amount = record.loan_amount_requested.value();
        let total_due = loan_amount
            .checked_mul(Decimal::ONE + FLAT_INTEREST_RATE)
            .ok_or_else(overflow)?;
        let monthly_emi = total_due
            .checked_div(Decimal::from(TOTAL_PAYMENTS))
            .ok_or_else(overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let remaining_balance = loan_amount
            .checked_mul(REMAINING_BALANCE_RATIO)
            .ok_or_else(overflow)?;
        let total_paid = monthly_emi
            .checked_mul(Decimal::from(PAYMENTS_COMPLETED))
            .ok_or_else(overflow)?;

        Ok(Self {
            record,
            loan_amount,
            remaining_balance,
            monthly_emi,
            total_paid,
            payments_completed: PAYMENTS_COMPLETED,
            total_payments: TOTAL_PAYMENTS,
            credit_score: CREDIT_SCORE,
            community_rating: COMMUNITY_RATING,
            status: LoanStatus::Active,
        })
    }

    /// Installment number due next, 1-based.
    pub fn next_installment(&self) -> u32 {
        (self.payments_completed + 1).min(self.total_payments)
    }
}
