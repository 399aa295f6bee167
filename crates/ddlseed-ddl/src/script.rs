//! Splitting a formatted DDL script into the chunks worth walking.

use std::sync::LazyLock;

use regex::Regex;

/// `-- Statement # N` delimiter emitted by the formatter, plus any comment
/// lines directly following it.
static DELIMITER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"-- Statement # \d+\r?\n(--[^\n]*\n)*").ok());

/// Identity-sequence boilerplate the formatter emits for identity columns.
static IDENTITY_SEQUENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?s)ADD GENERATED (BY DEFAULT|ALWAYS) AS IDENTITY \(\s*SEQUENCE NAME\s*.+START WITH \d+\s*INCREMENT BY \d+\s*NO MINVALUE\s*NO MAXVALUE\s*CACHE \d+\s*\);",
    )
    .ok()
});

const WALKED_PREFIXES: [&str; 3] = ["CREATE SCHEMA", "CREATE TABLE", "ALTER TABLE"];

/// Split `script` on statement delimiters, dropping blank chunks.
pub fn split_statements(script: &str) -> Vec<&str> {
    let chunks: Vec<&str> = match DELIMITER.as_ref() {
        Some(delimiter) => delimiter.split(script).collect(),
        None => vec![script],
    };
    chunks
        .into_iter()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Whether a statement starts with one of the kinds the walker handles.
/// Leading line comments are ignored.
pub fn is_walkable(statement: &str) -> bool {
    let head = statement_head(statement);
    WALKED_PREFIXES.iter().any(|prefix| {
        head.get(..prefix.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(prefix))
    })
}

/// Whether any walked statement keyword appears anywhere in `chunk`.
pub fn mentions_walkable(chunk: &str) -> bool {
    let upper = chunk.to_ascii_uppercase();
    WALKED_PREFIXES.iter().any(|prefix| upper.contains(prefix))
}

pub fn is_identity_boilerplate(statement: &str) -> bool {
    IDENTITY_SEQUENCE
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(statement))
}

/// `statement` without leading whitespace and `--` comment lines.
pub fn statement_head(statement: &str) -> &str {
    let mut head = statement.trim_start();
    while head.starts_with("--") {
        head = match head.find('\n') {
            Some(end) => head[end + 1..].trim_start(),
            None => "",
        };
    }
    head
}
