// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # metta-infer
//!
//! Turns the textual output of a MeTTa reasoning engine into structured
//! knowledge and semantic classifications.
//!
//! ## Architecture
//!
//! - **Expressions** (`sexpr`): lexer, reader, and flat wildcard matcher
//! - **Knowledge** (`knowledge`): facts, eventualities, norms, validation,
//!   and document round-tripping
//! - **Resolver** (`resolver`): identifiers to display names, verb forms,
//!   and description templates
//! - **Classification** (`classify`): propositions, contradictions,
//!   conflicts, violations, and compliances, projected into `Metrics`
//! - **Configuration** (`config`): TOML/JSON overlay for resolver tables
//!
//! ## Library usage
//!
//! ```no_run
//! use metta_infer::classify::Classifier;
//! use metta_infer::resolver::{DescriptionTemplates, EntityResolver};
//!
//! let resolver = EntityResolver::new();
//! let templates = DescriptionTemplates::new();
//! let classifier = Classifier::new(&resolver, &templates);
//!
//! let result = classifier.analyze("[(conflict not_opt soa_elam)]");
//! let metrics = result.to_metrics(&resolver, &templates);
//! println!("{}", metrics.conflict_details[0].description);
//! ```

pub mod classify;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod knowledge;
pub mod resolver;
pub mod sexpr;
