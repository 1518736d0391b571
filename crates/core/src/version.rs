//! Migration versions
//!
//! A version is a dotted sequence of numeric parts ("1", "2.1", "3.0.4").
//! Ordering is numeric part by part, with missing parts treated as zero, so
//! "2" == "2.0" and "2.1" > "2.0.9".

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Version of a versioned migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationVersion {
    raw: String,
    parts: Vec<u64>,
}

impl MigrationVersion {
    /// Parse a dotted numeric version string
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let cleaned = raw.trim();
        if cleaned.is_empty() {
            return Err(CoreError::Configuration(format!(
                "Invalid version '{}': version must not be empty",
                raw
            )));
        }

        let parts = cleaned
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| {
                    CoreError::Configuration(format!(
                        "Invalid version '{}': '{}' is not numeric",
                        raw, part
                    ))
                })
            })
            .collect::<CoreResult<Vec<u64>>>()?;

        Ok(Self {
            raw: cleaned.to_string(),
            parts,
        })
    }

    /// Original version text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn significant_parts(&self) -> &[u64] {
        let mut end = self.parts.len();
        while end > 0 && self.parts[end - 1] == 0 {
            end -= 1;
        }
        &self.parts[..end]
    }
}

impl fmt::Display for MigrationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Ord for MigrationVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let left = self.parts.get(i).copied().unwrap_or(0);
            let right = other.parts.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MigrationVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MigrationVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MigrationVersion {}

impl Hash for MigrationVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_parts().hash(state);
    }
}
