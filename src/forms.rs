//! Form state, validation and submission
//!
//! This module provides access to formkit-forms:
//!
//! - **Form engine**: [`Form`] with change / blur / validate / reset operations
//! - **Validators**: composable rules and per-form [`RuleSet`]s
//! - **Schemas**: whole-record validation mapped onto fields
//! - **Submission**: [`SubmitHandler`] with notifications and mount-safety
//! - **Wizards**: multi-step forms over one [`Form`]

pub use formkit_forms::*;
