//! Structured diagnostics for index passes.

pub mod index_diagnostics;

pub use index_diagnostics::{DiagnosticStage, IndexDiagnostic, SkipReason};
