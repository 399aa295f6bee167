use std::fmt;

use ddlseed_core::StructuralError;
use thiserror::Error;

/// A structural error together with the statement that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}\n  in statement: {}", snippet(.statement))]
pub struct Diagnostic {
    pub statement: String,
    #[source]
    pub error: StructuralError,
}

/// A non-fatal finding; logged, never blocks a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub statement: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n  in statement: {}", self.message, snippet(&self.statement))
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{} structural error(s) in DDL script", .diagnostics.len())]
    Structural { diagnostics: Vec<Diagnostic> },
}

/// First line of a statement, enough to locate it in the script.
fn snippet(statement: &str) -> &str {
    statement
        .trim()
        .lines()
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_names_error_and_statement() {
        let diagnostic = Diagnostic {
            statement: "\nCREATE SCHEMA sales;\n".to_string(),
            error: StructuralError::SchemaAlreadyDeclared("sales".to_string()),
        };
        assert_eq!(
            diagnostic.to_string(),
            "schema sales already declared\n  in statement: CREATE SCHEMA sales;"
        );
    }
}
