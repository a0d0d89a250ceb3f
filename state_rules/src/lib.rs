//! # State Rules
//!
//! The rules crate: the canonical save document's typed model, the six-axis
//! attribute model, rank and quality tables, and the mechanics that derive
//! numbers from a clean document. It holds no pipeline logic.

pub mod document;
pub mod entities;
pub mod error;
pub mod mechanics;

pub use document::*;
pub use entities::*;
pub use error::{Result, RulesError};
pub use mechanics::*;
