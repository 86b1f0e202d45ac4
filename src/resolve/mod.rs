//! Inheritance-aware resolution over the scanned types and their documentation

pub mod fields;
pub mod tags;

pub use fields::{ancestor_chain, is_report, merge_collaborators, merge_parameters, MAVEN_REPORT};
pub use tags::{field_comment, resolve_tag};
