//! Guide generation pipeline and domain logic.
//!
//! Ties together input parsing, markdown assembly, validation, asset ingestion
//! and archiving into one `generate_guide` workflow.

pub mod input;
pub mod pipeline;
pub mod tree;
pub mod validator;

pub use input::GuideInput;
pub use pipeline::{GuideOutput, GuideRequest, ProgressReporter, SilentProgress, generate_guide};
pub use validator::{IssueKind, ValidationIssue, validate};
