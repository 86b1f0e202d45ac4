use crate::error::{ExtractionError, Result};
use crate::model::{AnnotatedType, CollaboratorSpec, ConfigParameterSpec, OrderedMap, TypeIndex};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

pub const MAVEN_REPORT: &str = "org.apache.maven.reporting.MavenReport";

/// `leaf` followed by each indexed superclass, nearest first.
///
/// The walk stops quietly at the first ancestor that is not in the index.
pub fn ancestor_chain<'a>(
    types: &'a TypeIndex,
    leaf: &'a AnnotatedType,
) -> Result<Vec<&'a AnnotatedType>> {
    let mut chain = vec![leaf];
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(leaf.name.as_str());

    let mut current = leaf;
    while let Some(parent_name) = current.parent.as_deref() {
        let Some(parent) = types.get(parent_name) else {
            debug!(
                type_name = %leaf.name,
                ancestor = parent_name,
                "Ancestor not on the scanned classpath, truncating hierarchy"
            );
            break;
        };
        if !seen.insert(parent.name.as_str()) {
            return Err(ExtractionError::InheritanceCycle {
                type_name: parent.name.clone(),
            });
        }
        chain.push(parent);
        current = parent;
    }

    Ok(chain)
}

/// Folds the fields selected by `fields` root-first into one ordered map.
fn merge<'a, V: Clone + 'a>(
    types: &'a TypeIndex,
    leaf: &'a AnnotatedType,
    fields: impl Fn(&'a AnnotatedType) -> &'a OrderedMap<String, V>,
) -> Result<OrderedMap<String, V>> {
    let mut merged = OrderedMap::new();
    for ancestor in ancestor_chain(types, leaf)?.into_iter().rev() {
        for (name, value) in fields(ancestor).iter() {
            merged.insert(name.clone(), value.clone());
        }
    }
    Ok(merged)
}

/// Configuration parameters visible on `leaf`, ancestors first. A field
/// redeclared lower in the hierarchy keeps its ancestor's position.
pub fn merge_parameters(
    types: &TypeIndex,
    leaf: &AnnotatedType,
) -> Result<OrderedMap<String, ConfigParameterSpec>> {
    merge(types, leaf, |t| &t.parameters)
}

/// Collaborators visible on `leaf`, with the same ordering rules as parameters.
pub fn merge_collaborators(
    types: &TypeIndex,
    leaf: &AnnotatedType,
) -> Result<OrderedMap<String, CollaboratorSpec>> {
    merge(types, leaf, |t| &t.components)
}

/// True when `leaf`, a superclass or any super-interface known to the index
/// implements the reporting contract.
pub fn is_report(types: &TypeIndex, leaf: &AnnotatedType) -> Result<bool> {
    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for t in ancestor_chain(types, leaf)? {
        queue.extend(t.interfaces.iter().map(String::as_str));
    }

    while let Some(name) = queue.pop_front() {
        if name == MAVEN_REPORT {
            return Ok(true);
        }
        if !seen.insert(name) {
            continue;
        }
        if let Some(interface) = types.get(name) {
            queue.extend(interface.interfaces.iter().map(String::as_str));
        }
    }

    Ok(false)
}
