//! Knowledge documents: typed facts, eventualities, norms, and validation.
//!
//! - **Model** (`model`): triples, eventualities, entities, negations,
//!   logical expressions, norms, and their canonical renderings
//! - **Parse** (`parse`): shape probes over expression trees
//! - **Validate** (`validate`): naming convention and vocabulary checks
//! - **Document** (`document`): whole-document extraction and file I/O

pub mod document;
pub mod model;
pub mod parse;
pub mod validate;
pub mod vocabulary;

use miette::Diagnostic;
use thiserror::Error;

pub use document::{extract_knowledge, extract_norms, read_document, write_document};
pub use model::{
    Condition, Entity, Eventuality, KnowledgeSet, LogicalExpression, LogicalOp, MettaDocument,
    Negation, Norm, Triple, TripleKind, derive_expected_name,
};
pub use parse::{ExpressionKind, KnowledgeItem, interpret};
pub use validate::{
    EventualityError, ValidationReport, validate_entities, validate_eventualities,
    validate_eventuality, validate_predicate,
};

/// Errors from knowledge document file I/O.
#[derive(Debug, Error, Diagnostic)]
pub enum KnowledgeError {
    #[error("failed to read document: {path}")]
    #[diagnostic(
        code(metta::knowledge::read),
        help("Ensure the document exists and is readable UTF-8 text.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write document: {path}")]
    #[diagnostic(
        code(metta::knowledge::write),
        help("Check that the parent directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for knowledge document operations.
pub type KnowledgeResult<T> = std::result::Result<T, KnowledgeError>;
