//! Delimiter-aware script reader
//!
//! Cuts a raw script into executable statement units on the active
//! delimiter. An escaped delimiter occurrence is literal content, not a
//! terminator; delimiters inside single-quoted strings and line comments
//! never terminate a statement.

use async_trait::async_trait;

use schemaflow_core::{
    ConnectionType, CoreResult, Database, Delimiter, LoadableResource, MigrateConfig,
    ParsingContext, Reader,
};

/// Reader for PostgreSQL scripts
pub struct PostgresReader {
    delimiter: Delimiter,
}

impl PostgresReader {
    pub fn new() -> Self {
        Self {
            delimiter: Delimiter::semicolon(),
        }
    }

    pub fn with_delimiter(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }
}

impl Default for PostgresReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reader for PostgresReader {
    fn can_read(&self, connection_type: ConnectionType) -> bool {
        connection_type == ConnectionType::Postgres
    }

    async fn read(
        &self,
        _config: &MigrateConfig,
        _database: &dyn Database,
        _context: &ParsingContext,
        resource: &dyn LoadableResource,
    ) -> CoreResult<Vec<String>> {
        let script = resource.load_as_string().await?;
        Ok(split_statements(&script, &self.delimiter))
    }
}

/// Split a script into statement units on the given delimiter
pub fn split_statements(script: &str, delimiter: &Delimiter) -> Vec<String> {
    if delimiter.is_alone_on_line() {
        split_batch(script, delimiter)
    } else {
        split_inline(script, delimiter)
    }
}

/// Batch-style separators match only as a full line of their own
fn split_batch(script: &str, delimiter: &Delimiter) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();
    for line in script.lines() {
        if line.trim().eq_ignore_ascii_case(delimiter.token()) {
            push_unit(&mut units, &mut current);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_unit(&mut units, &mut current);
    units
}

fn split_inline(script: &str, delimiter: &Delimiter) -> Vec<String> {
    let token = delimiter.token();
    let mut units = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut in_comment = false;
    let mut i = 0;

    while i < script.len() {
        let rest = &script[i..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };

        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            current.push(c);
            i += c.len_utf8();
            continue;
        }

        if in_string {
            if c == '\'' {
                in_string = false;
            }
            current.push(c);
            i += c.len_utf8();
            continue;
        }

        if c == '\'' {
            in_string = true;
            current.push(c);
            i += 1;
            continue;
        }

        if rest.starts_with("--") {
            in_comment = true;
            current.push_str("--");
            i += 2;
            continue;
        }

        if let Some(escape) = delimiter.escape() {
            if rest.starts_with(escape) && rest[escape.len()..].starts_with(token) {
                current.push_str(token);
                i += escape.len() + token.len();
                continue;
            }
        }

        if rest.starts_with(token) {
            push_unit(&mut units, &mut current);
            i += token.len();
            continue;
        }

        current.push(c);
        i += c.len_utf8();
    }

    push_unit(&mut units, &mut current);
    units
}

fn push_unit(units: &mut Vec<String>, current: &mut String) {
    let unit = current.trim();
    if !unit.is_empty() {
        units.push(unit.to_string());
    }
    current.clear();
}
