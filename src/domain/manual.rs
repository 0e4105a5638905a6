use crate::error::{FlowError, Result};

pub const SECTION_TITLES: [&str; 4] = [
    "About UdhaarAI",
    "How to Apply for Loan",
    "How to Repay",
    "Security & Privacy",
];

/// Position within the guide reachable from language selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualState {
    section: usize,
}

impl ManualState {
    pub fn section(&self) -> usize {
        self.section
    }

    pub fn title(&self) -> &'static str {
        SECTION_TITLES[self.section]
    }

    pub fn next(&mut self) -> Result<usize> {
        if self.section + 1 >= SECTION_TITLES.len() {
            return Err(FlowError::InvalidState(
                "already at the last manual section".to_string(),
            ));
        }
        self.section += 1;
        Ok(self.section)
    }

    pub fn previous(&mut self) -> Result<usize> {
        if self.section == 0 {
            return Err(FlowError::InvalidState(
                "already at the first manual section".to_string(),
            ));
        }
        self.section -= 1;
        Ok(self.section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_bounds() {
        let mut manual = ManualState::default();
        assert!(manual.previous().is_err());
        for expected in 1..SECTION_TITLES.len() {
            assert_eq!(manual.next().unwrap(), expected);
        }
        assert!(manual.next().is_err());
        assert_eq!(manual.title(), "Security & Privacy");
        assert_eq!(manual.previous().unwrap(), 2);
    }
}
