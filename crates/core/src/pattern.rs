//! Validate patterns
//!
//! A pattern of the form `<migration_type>:<migration_state>` allows
//! specific type/state combinations through validation, e.g.
//! `repeatable:missing_success` or `*:pending`.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{CoreError, CoreResult};
use crate::state::MigrationState;

const VALID_MIGRATION_TYPES: [&str; 3] = ["*", "repeatable", "versioned"];
const VALID_MIGRATION_STATES: [&str; 5] = [
    "*",
    "missing_success",
    "pending",
    "ignored",
    "future_success",
];

/// Parsed `<migration_type>:<migration_state>` filter
#[derive(Debug, Clone)]
pub struct ValidatePattern {
    migration_type: String,
    migration_state: String,
    raw: String,
}

impl ValidatePattern {
    /// Parse a raw pattern, normalizing both parts to lower case
    pub fn parse(raw: Option<&str>) -> CoreResult<Self> {
        let raw = raw
            .ok_or_else(|| CoreError::Configuration("Null pattern not allowed".to_string()))?;

        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 2 {
            return Err(CoreError::Configuration(format!(
                "Invalid pattern '{}'. Pattern must be of the form <migration_type>:<migration_state>",
                raw
            )));
        }

        let migration_type = parts[0].trim().to_lowercase();
        let migration_state = parts[1].trim().to_lowercase();

        if !VALID_MIGRATION_TYPES.contains(&migration_type.as_str()) {
            return Err(CoreError::Configuration(format!(
                "Invalid migration type '{}'. Valid types are: {:?}",
                parts[0], VALID_MIGRATION_TYPES
            )));
        }

        if !VALID_MIGRATION_STATES.contains(&migration_state.as_str()) {
            return Err(CoreError::Configuration(format!(
                "Invalid migration state '{}'. Valid states are: {:?}",
                parts[1], VALID_MIGRATION_STATES
            )));
        }

        Ok(Self {
            migration_type,
            migration_state,
            raw: raw.to_string(),
        })
    }

    /// Whether a migration with the given kind and state passes this filter
    pub fn matches(&self, is_versioned: bool, state: MigrationState) -> bool {
        if self.migration_state != "*"
            && !state.pattern().eq_ignore_ascii_case(&self.migration_state)
        {
            return false;
        }

        if self.migration_type == "*" {
            return true;
        }
        if is_versioned && self.migration_type == "versioned" {
            return true;
        }
        if !is_versioned && self.migration_type == "repeatable" {
            return true;
        }

        false
    }
}

/// Identity is the parsed type and state; the raw text is display only
impl PartialEq for ValidatePattern {
    fn eq(&self, other: &Self) -> bool {
        self.migration_type == other.migration_type
            && self.migration_state == other.migration_state
    }
}

impl Eq for ValidatePattern {}

impl Hash for ValidatePattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.migration_type.hash(state);
        self.migration_state.hash(state);
    }
}

impl fmt::Display for ValidatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_rejects_null() {
        let err = ValidatePattern::parse(None).unwrap_err();
        assert!(err.to_string().contains("Null pattern not allowed"));
    }

    #[test]
    fn test_parse_requires_two_parts() {
        assert!(ValidatePattern::parse(Some("versioned")).is_err());
        assert!(ValidatePattern::parse(Some("versioned:pending:extra")).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = ValidatePattern::parse(Some("bogus:pending")).unwrap_err();
        assert!(err.to_string().contains("Invalid migration type 'bogus'"));
    }

    #[test]
    fn test_parse_rejects_unknown_state() {
        let err = ValidatePattern::parse(Some("versioned:bogus")).unwrap_err();
        assert!(err.to_string().contains("Invalid migration state 'bogus'"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let upper = ValidatePattern::parse(Some("Versioned : PENDING")).unwrap();
        let lower = ValidatePattern::parse(Some("versioned:pending")).unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_wildcard_matches_everything() {
        let pattern = ValidatePattern::parse(Some("*:*")).unwrap();
        for state in [
            MigrationState::Pending,
            MigrationState::OutOfOrder,
            MigrationState::Ignored,
            MigrationState::MissingSuccess,
            MigrationState::FutureSuccess,
            MigrationState::Success,
            MigrationState::Failed,
        ] {
            assert!(pattern.matches(true, state));
            assert!(pattern.matches(false, state));
        }
    }

    #[test]
    fn test_type_selector() {
        let pattern = ValidatePattern::parse(Some("versioned:pending")).unwrap();
        assert!(pattern.matches(true, MigrationState::Pending));
        assert!(!pattern.matches(false, MigrationState::Pending));
        assert!(!pattern.matches(true, MigrationState::Ignored));

        let repeatable = ValidatePattern::parse(Some("repeatable:missing_success")).unwrap();
        assert!(repeatable.matches(false, MigrationState::MissingSuccess));
        assert!(!repeatable.matches(true, MigrationState::MissingSuccess));
    }

    #[test]
    fn test_equality_ignores_raw_text() {
        let spaced = ValidatePattern::parse(Some(" versioned : ignored ")).unwrap();
        let plain = ValidatePattern::parse(Some("versioned:ignored")).unwrap();
        assert_eq!(spaced, plain);
        assert_eq!(spaced.to_string(), " versioned : ignored ");

        let mut set = HashSet::new();
        set.insert(spaced);
        assert!(set.contains(&plain));
    }
}
