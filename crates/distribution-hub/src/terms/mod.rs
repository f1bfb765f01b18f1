//! Terms-and-conditions templates, variable checks, rendering, and renewals.
//!
//! Templates carry `{{placeholder}}` tokens and a typed variable schema. Generation
//! layers distributor-derived values between the schema defaults and the caller's
//! variables, validates the result, and stores the rendered document as a draft.

pub mod document;
pub mod renewal;
pub mod router;
pub mod schema;
pub mod service;
pub mod substitution;
pub mod template;

#[cfg(test)]
mod tests;

pub use document::{DocumentStatus, TermsDocument};
pub use renewal::{RenewalFailure, RenewalOutcome, RenewalPolicy};
pub use router::terms_router;
pub use schema::{validate_variables, VariableReport, VariableSchema, VariableSpec, VariableType};
pub use service::{derived_values, GenerationRequest, TermsError, TermsService, DERIVED_VARIABLES};
pub use substitution::{merge_values, placeholders, render, Rendered};
pub use template::{TemplateCategory, TermsTemplate};
