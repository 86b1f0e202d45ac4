use crate::error::{ExtractionError, Result};
use crate::javadoc::{DocIndex, FieldComment, StructuredComment};
use std::collections::HashSet;

/// Walks `record` and then its documented ancestors, returning the first
/// record for which `visit` yields a value.
fn walk<'a, T>(
    docs: &'a DocIndex,
    record: &'a StructuredComment,
    mut visit: impl FnMut(&'a StructuredComment) -> Option<T>,
) -> Result<Option<T>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = record;

    loop {
        if !seen.insert(current.name.as_str()) {
            return Err(ExtractionError::InheritanceCycle {
                type_name: current.name.clone(),
            });
        }
        if let Some(found) = visit(current) {
            return Ok(Some(found));
        }
        match current.parent.as_deref().and_then(|p| docs.get(p)) {
            Some(parent) => current = parent,
            None => return Ok(None),
        }
    }
}

/// Type-level tag lookup with fallback through the documented superclasses.
pub fn resolve_tag<'a>(
    docs: &'a DocIndex,
    record: &'a StructuredComment,
    tag: &str,
) -> Result<Option<&'a str>> {
    walk(docs, record, |r| r.tag(tag))
}

/// The comment of the nearest declaration of `field`, starting at `record`.
///
/// Only the declaration is searched for through the hierarchy; its tags are
/// not inherited.
pub fn field_comment<'a>(
    docs: &'a DocIndex,
    record: &'a StructuredComment,
    field: &str,
) -> Result<Option<&'a FieldComment>> {
    walk(docs, record, |r| r.field(field))
}
