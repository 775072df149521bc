//! Australian state and territory codes.
//!
//! Provides mappings between the eight postal state codes and their full
//! names, plus lenient parsing of either form.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the eight Australian states and territories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum State {
    /// New South Wales
    Nsw,
    /// Victoria
    Vic,
    /// Queensland
    Qld,
    /// South Australia
    Sa,
    /// Western Australia
    Wa,
    /// Tasmania
    Tas,
    /// Northern Territory
    Nt,
    /// Australian Capital Territory
    Act,
}

impl State {
    /// All states and territories in postal-code order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Nsw,
            Self::Vic,
            Self::Qld,
            Self::Sa,
            Self::Wa,
            Self::Tas,
            Self::Nt,
            Self::Act,
        ]
    }

    /// Full name of the state or territory.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nsw => "New South Wales",
            Self::Vic => "Victoria",
            Self::Qld => "Queensland",
            Self::Sa => "South Australia",
            Self::Wa => "Western Australia",
            Self::Tas => "Tasmania",
            Self::Nt => "Northern Territory",
            Self::Act => "Australian Capital Territory",
        }
    }

    /// Parses a state from its code (`"nsw"`, `"NSW"`) or its full name
    /// (`"new south wales"`). Surrounding whitespace is ignored.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Ok(state) = trimmed.parse::<Self>() {
            return Some(state);
        }
        Self::all()
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(trimmed))
    }

    /// Comma-separated list of valid codes, for error hints.
    #[must_use]
    pub fn valid_codes() -> String {
        Self::all()
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_count() {
        assert_eq!(State::all().len(), 8);
    }

    #[test]
    fn code_roundtrip() {
        for state in State::all() {
            let code = state.to_string();
            assert_eq!(code.len(), code.trim().len());
            assert_eq!(State::parse(&code), Some(*state), "roundtrip failed for {code}");
        }
    }

    #[test]
    fn case_insensitive_codes() {
        assert_eq!(State::parse("nsw"), Some(State::Nsw));
        assert_eq!(State::parse("Vic"), Some(State::Vic));
        assert_eq!(State::parse(" act "), Some(State::Act));
    }

    #[test]
    fn parses_full_names() {
        assert_eq!(State::parse("New South Wales"), Some(State::Nsw));
        assert_eq!(State::parse("northern territory"), Some(State::Nt));
    }

    #[test]
    fn unknown_states() {
        assert_eq!(State::parse("XX"), None);
        assert_eq!(State::parse(""), None);
        assert_eq!(State::parse("Wales"), None);
    }

    #[test]
    fn displays_uppercase_code() {
        assert_eq!(State::Qld.to_string(), "QLD");
        assert_eq!(State::Act.as_ref(), "ACT");
        assert_eq!(State::valid_codes(), "NSW, VIC, QLD, SA, WA, TAS, NT, ACT");
    }
}
