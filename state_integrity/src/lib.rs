//! # State Integrity
//!
//! Lifecycle of a save document, from whatever was loaded to a document the
//! rules crate can trust. Every stage takes a value and returns a new one;
//! nothing here holds document state between calls.
//!
//! ## Core Components
//!
//! - **schema**: Classifies a document as canonical or one of the legacy shapes
//! - **migrator**: Moves legacy data to its canonical place through alias chains
//! - **validator**: Read-only check of the canonical shape
//! - **repair**: Total pass that coerces numbers, fills defaults and clears dangling references
//! - **pipeline**: Runs the stages in order and falls back when repair is not enough
//!
//! ## Design Philosophy
//!
//! - **Total**: Migration and repair never fail; anomalies become diagnostics
//! - **Pure**: Inputs are never mutated and time is passed in
//! - **Lossless**: Data no stage understands is preserved, not dropped

pub mod config;
pub mod error;
pub mod migrator;
pub mod numeric;
pub mod pipeline;
pub mod repair;
pub mod schema;
pub mod tree;
pub mod validator;

pub use config::{DocumentDefaults, IntegrityConfig};
pub use error::{ConfigError, Diagnostic, Diagnostics, IntegrityError, Severity};
pub use migrator::{Migration, MigrationReport, Migrator};
pub use pipeline::{Derivation, LifecycleState, Outcome, Pipeline, Settled};
pub use repair::{Repair, Repairer};
pub use schema::{detect, Detection, SchemaGeneration};
pub use validator::{validate, ValidationReport};
