//! Top-level error type.
//!
//! Each subsystem defines its own error with miette `#[diagnostic]` derives
//! next to the code that raises it; this enum only wraps them so the full
//! diagnostic chain (codes, help text, sources) reaches the user.
//!
//! Structural mismatches while probing expression shapes are `Option`s and
//! vocabulary problems are [`Diagnostic`](crate::diagnostic::Diagnostic)s;
//! neither ever becomes an error.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::knowledge::KnowledgeError;
use crate::sexpr::ParseError;

#[derive(Debug, Error, Diagnostic)]
pub enum MettaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Knowledge(#[from] KnowledgeError),
}

/// Convenience result type for callers mixing subsystems.
pub type MettaResult<T> = std::result::Result<T, MettaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse_one;

    #[test]
    fn subsystem_errors_convert() {
        fn parse(input: &str) -> MettaResult<String> {
            Ok(parse_one(input)?.to_string())
        }
        let err = parse("(a b").unwrap_err();
        assert!(matches!(err, MettaError::Parse(ParseError::UnexpectedEof { .. })));
    }

    #[test]
    fn diagnostic_codes_pass_through() {
        let err: MettaError = ConfigError::Parse {
            path: "x.toml".into(),
            message: "bad".into(),
        }
        .into();
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("metta::config::parse"));
    }
}
