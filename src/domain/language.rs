use crate::error::{FlowError, Result};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct LanguageChoice {
    pub code: String,
    pub name: String,
    pub english_name: String,
}

const CATALOG: [(&str, &str, &str); 6] = [
    ("hi", "हिंदी", "Hindi"),
    ("en", "English", "English"),
    ("bn", "বাংলা", "Bengali"),
    ("te", "తెలుగు", "Telugu"),
    ("mr", "मराठी", "Marathi"),
    ("ta", "தமிழ்", "Tamil"),
];

/// Languages offered on the selection screen, in display order.
pub fn catalog() -> Vec<LanguageChoice> {
    CATALOG
        .iter()
        .map(|(code, name, english)| LanguageChoice {
            code: code.to_string(),
            name: name.to_string(),
            english_name: english.to_string(),
        })
        .collect()
}

impl LanguageChoice {
    pub fn from_code(code: &str) -> Result<Self> {
        let code = code.trim();
        catalog()
            .into_iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| FlowError::ValidationError(format!("unsupported language '{code}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code() {
        let lang = LanguageChoice::from_code("TA").unwrap();
        assert_eq!(lang.english_name, "Tamil");
        assert_eq!(catalog().len(), 6);
    }

    #[test]
    fn test_unknown_code() {
        assert!(matches!(
            LanguageChoice::from_code("fr"),
            Err(FlowError::ValidationError(_))
        ));
    }
}
