use crate::domain::loan::Amount;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// Field keys collected by the application wizard.
pub mod fields {
    pub const NAME: &str = "name";
    pub const LOCATION: &str = "location";
    pub const INCOME: &str = "income";
    pub const LOAN_AMOUNT: &str = "loanAmount";
    pub const PURPOSE: &str = "purpose";
    pub const BANK_ACCOUNT: &str = "bankAccount";

    /// Every key a `LoanRecord` is built from.
    pub const LOAN_RECORD: [&str; 6] = [NAME, LOCATION, INCOME, LOAN_AMOUNT, PURPOSE, BANK_ACCOUNT];
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum WizardKind {
    Tutorial,
    Application,
}

/// How the value of a step is checked before the wizard may leave it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    /// A positive currency amount such as "₹25,000".
    Amount,
    /// Digits only, whitespace ignored (account numbers).
    Digits,
}

impl InputKind {
    pub fn validate(self, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FlowError::ValidationError("value is empty".to_string()));
        }
        match self {
            InputKind::Text => Ok(()),
            InputKind::Amount => Amount::parse(value).map(|_| ()),
            InputKind::Digits => {
                if value
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .all(|c| c.is_ascii_digit())
                {
                    Ok(())
                } else {
                    Err(FlowError::ValidationError(format!(
                        "'{value}' must contain digits only"
                    )))
                }
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    pub title: String,
    pub localized_prompt: String,
    pub english_prompt: String,
    pub field_key: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub input_kind: InputKind,
}

impl StepDefinition {
    fn new(
        title: &str,
        localized_prompt: &str,
        english_prompt: &str,
        field_key: &str,
        placeholder: &str,
        input_kind: InputKind,
    ) -> Self {
        Self {
            title: title.to_string(),
            localized_prompt: localized_prompt.to_string(),
            english_prompt: english_prompt.to_string(),
            field_key: field_key.to_string(),
            placeholder: placeholder.to_string(),
            input_kind,
        }
    }
}

/// The ordered, immutable step list of one wizard.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct WizardSchema {
    pub kind: WizardKind,
    pub steps: Vec<StepDefinition>,
}

impl WizardSchema {
    pub fn tutorial() -> Self {
        Self {
            kind: WizardKind::Tutorial,
            steps: vec![
                StepDefinition::new(
                    "नमस्ते! मैं उधार साथी हूं। मैं आपकी मदद करूंगा। • Hello! I am Udhaar Saathi. I will help you.",
                    "माइक्रोफोन पर टैप करके अपना नाम बताएं।",
                    "Tap the microphone and tell me your name.",
                    "name",
                    "",
                    InputKind::Text,
                ),
                StepDefinition::new(
                    "बहुत अच्छा! अब मुझे अपना गांव या शहर का नाम बताएं। • Very good! Now tell me your village or city name.",
                    "माइक्रोफोन दबाकर बोलें।",
                    "Press microphone and speak.",
                    "location",
                    "",
                    InputKind::Text,
                ),
                StepDefinition::new(
                    "परफेक्ट! देखा कितना आसान है? • Perfect! See how easy it is?",
                    "अब हम आपका असली आवेदन शुरू कर सकते हैं।",
                    "Now we can start your real application.",
                    "complete",
                    "",
                    InputKind::Text,
                ),
            ],
        }
    }

    pub fn application() -> Self {
        Self {
            kind: WizardKind::Application,
            steps: vec![
                StepDefinition::new(
                    "Personal Information",
                    "आपका पूरा नाम क्या है?",
                    "What is your full name?",
                    fields::NAME,
                    "राम कुमार • Ram Kumar",
                    InputKind::Text,
                ),
                StepDefinition::new(
                    "Location",
                    "आप कहां रहते हैं? गांव और जिला बताएं।",
                    "Where do you live? Tell village and district.",
                    fields::LOCATION,
                    "रामपुर, मेरठ • Rampur, Meerut",
                    InputKind::Text,
                ),
                StepDefinition::new(
                    "Income Information",
                    "आपकी महीने की कमाई कितनी है?",
                    "What is your monthly income?",
                    fields::INCOME,
                    "₹15,000",
                    InputKind::Text,
                ),
                StepDefinition::new(
                    "Loan Amount",
                    "आपको कितने रुपए चाहिए?",
                    "How much money do you need?",
                    fields::LOAN_AMOUNT,
                    "₹25,000",
                    InputKind::Amount,
                ),
                StepDefinition::new(
                    "Loan Purpose",
                    "पैसे किस काम के लिए चाहिए?",
                    "What do you need the money for?",
                    fields::PURPOSE,
                    "व्यापार • Business",
                    InputKind::Text,
                ),
                StepDefinition::new(
                    "Bank Account",
                    "आपका बैंक खाता नंबर क्या है?",
                    "What is your bank account number?",
                    fields::BANK_ACCOUNT,
                    "1234567890",
                    InputKind::Digits,
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains_field(&self, field_key: &str) -> bool {
        self.steps.iter().any(|step| step.field_key == field_key)
    }
}
