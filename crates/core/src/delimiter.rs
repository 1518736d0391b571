//! Statement delimiters
//!
//! A delimiter describes where one statement ends inside a raw script: a
//! literal token, whether the token must stand alone on its own line, and an
//! optional escape allowing the token to appear as data. Scanning a script
//! for delimiter occurrences is the script reader's job.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Boundary between statements in a raw script
#[derive(Debug, Clone)]
pub struct Delimiter {
    token: String,
    alone_on_line: bool,
    escape: Option<String>,
}

impl Delimiter {
    pub fn new(token: impl Into<String>, alone_on_line: bool) -> Self {
        Self {
            token: token.into(),
            alone_on_line,
            escape: None,
        }
    }

    pub fn with_escape(
        token: impl Into<String>,
        alone_on_line: bool,
        escape: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            alone_on_line,
            escape: Some(escape.into()),
        }
    }

    /// Ordinary inline `;` terminator
    pub fn semicolon() -> Self {
        Self::new(";", false)
    }

    /// Batch-style `GO` separator, standing alone on its own line
    pub fn go() -> Self {
        Self::new("GO", true)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_alone_on_line(&self) -> bool {
        self.alone_on_line
    }

    pub fn escape(&self) -> Option<&str> {
        self.escape.as_deref()
    }
}

/// Identity is the token and the alone-on-line flag; escape is not part of it
impl PartialEq for Delimiter {
    fn eq(&self, other: &Self) -> bool {
        self.alone_on_line == other.alone_on_line && self.token == other.token
    }
}

impl Eq for Delimiter {}

impl Hash for Delimiter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.alone_on_line.hash(state);
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            if self.alone_on_line { "\n" } else { "" },
            self.token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_display() {
        assert_eq!(Delimiter::semicolon().to_string(), ";");
        assert_eq!(Delimiter::go().to_string(), "\nGO");
    }

    #[test]
    fn test_equality_ignores_escape() {
        assert_eq!(Delimiter::semicolon(), Delimiter::new(";", false));
        assert_ne!(Delimiter::semicolon(), Delimiter::new(";", true));
        assert_ne!(Delimiter::semicolon(), Delimiter::go());
        assert_eq!(
            Delimiter::with_escape(";", false, "\\"),
            Delimiter::semicolon()
        );
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut delimiters = HashMap::new();
        delimiters.insert(Delimiter::semicolon(), "inline");
        delimiters.insert(Delimiter::go(), "batch");

        assert_eq!(delimiters.get(&Delimiter::new(";", false)), Some(&"inline"));
        assert_eq!(
            delimiters.get(&Delimiter::with_escape("GO", true, "\\")),
            Some(&"batch")
        );
    }
}
