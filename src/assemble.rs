//! Descriptor assembly: documentation enrichment plus one `MojoDescriptor`
//! per executable unit

use crate::error::{ExtractionError, Result};
use crate::javadoc::{DocIndex, FieldComment};
use crate::model::descriptor::DEFAULT_LANGUAGE;
use crate::model::{
    AnnotatedType, CollaboratorSpec, ConfigParameterSpec, DescriptorParameter, Documentation,
    MojoDescriptor, PluginContext, Requirement, TypeIndex,
};
use crate::resolve::{field_comment, is_report, merge_collaborators, merge_parameters, resolve_tag};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

fn field_docs(comment: &FieldComment) -> Documentation {
    Documentation {
        description: comment.body.clone(),
        since: comment.tag("since").map(str::to_string),
        deprecated: comment.tag("deprecated").map(str::to_string),
    }
}

/// Copies documentation onto the annotated types that have a comment record.
///
/// Comment records are first relinked to the superclasses found in bytecode.
/// Unit descriptions come from the type's own comment; `since` and
/// `deprecated` fall back through documented superclasses. Fields only take
/// documentation from their own declaration.
pub fn enrich(types: &mut TypeIndex, docs: &mut DocIndex) -> Result<()> {
    let relinked = docs.link_parents(types);
    if relinked > 0 {
        debug!(records = relinked, "Relinked comment records to bytecode superclasses");
    }
    let docs = &*docs;
    let mut enriched = 0usize;

    for annotated in types.iter_mut() {
        let Some(record) = docs.get(&annotated.name) else {
            if annotated.has_plugin_metadata() {
                debug!(type_name = %annotated.name, "No sources for type, leaving undocumented");
            }
            continue;
        };

        if let Some(unit) = annotated.mojo.as_mut() {
            unit.docs = Documentation {
                description: record.body.clone(),
                since: resolve_tag(docs, record, "since")?.map(str::to_string),
                deprecated: resolve_tag(docs, record, "deprecated")?.map(str::to_string),
            };
        }

        for parameter in annotated.parameters.values_mut() {
            if let Some(comment) = field_comment(docs, record, &parameter.field_name)? {
                parameter.docs = field_docs(comment);
            }
        }
        for component in annotated.components.values_mut() {
            if let Some(comment) = field_comment(docs, record, &component.field_name)? {
                component.docs = field_docs(comment);
            }
        }
        enriched += 1;
    }

    debug!(types = enriched, "Enriched types with documentation");
    Ok(())
}

fn parameter_entry(parameter: ConfigParameterSpec) -> DescriptorParameter {
    let editable = parameter.editable();
    DescriptorParameter {
        name: parameter.field_name,
        type_name: Some(parameter.type_name),
        alias: parameter.alias,
        default_value: parameter.default_value,
        expression: parameter.expression,
        required: parameter.required,
        editable,
        requirement: None,
        docs: parameter.docs,
    }
}

fn collaborator_entry(component: CollaboratorSpec) -> DescriptorParameter {
    DescriptorParameter {
        name: component.field_name,
        type_name: Some(component.role.clone()),
        alias: None,
        default_value: None,
        expression: None,
        required: false,
        editable: false,
        requirement: Some(Requirement {
            role: component.role,
            role_hint: component.role_hint,
        }),
        docs: component.docs,
    }
}

fn build_descriptor(
    types: &TypeIndex,
    annotated: &AnnotatedType,
    plugin: &Arc<PluginContext>,
) -> Result<Option<MojoDescriptor>> {
    let Some(unit) = &annotated.mojo else {
        return Ok(None);
    };

    let parameters = merge_parameters(types, annotated)?;
    let collaborators = merge_collaborators(types, annotated)?;

    if let Some(name) = collaborators.keys().find(|k| parameters.contains_key(k.as_str())) {
        return Err(ExtractionError::DuplicateParameter {
            goal: unit.goal.clone(),
            type_name: annotated.name.clone(),
            parameter: name.clone(),
        });
    }

    let entries = parameters
        .into_values()
        .map(parameter_entry)
        .chain(collaborators.into_values().map(collaborator_entry))
        .collect();

    Ok(Some(MojoDescriptor {
        goal: unit.goal.clone(),
        implementation: annotated.name.clone(),
        language: DEFAULT_LANGUAGE.to_string(),
        phase: unit.phase.clone(),
        execute: annotated.execute.clone(),
        dependency_resolution: unit.dependency_resolution.clone(),
        dependency_collection: unit.dependency_collection.clone(),
        aggregator: unit.aggregator,
        thread_safe: unit.thread_safe,
        online_required: unit.online_required,
        direct_invocation_only: unit.direct_invocation_only,
        project_required: unit.project_required,
        reports_required: unit.reports_required,
        inherit_by_default: unit.inherit_by_default,
        execution_strategy: unit.execution_strategy.clone(),
        instantiation_strategy: unit.instantiation_strategy.clone(),
        configurator: unit.configurator.clone(),
        is_report: is_report(types, annotated)?,
        docs: unit.docs.clone(),
        parameters: entries,
        plugin: Arc::clone(plugin),
    }))
}

/// Builds one descriptor per executable unit, in scan order.
pub fn assemble(types: &TypeIndex, plugin: Arc<PluginContext>) -> Result<Vec<MojoDescriptor>> {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    let mut descriptors = Vec::new();

    for annotated in types.iter() {
        let Some(descriptor) = build_descriptor(types, annotated, &plugin)? else {
            continue;
        };

        if let Some(first) = owners.get(descriptor.goal.as_str()) {
            return Err(ExtractionError::DuplicateGoal {
                goal: descriptor.goal,
                first: first.to_string(),
                second: annotated.name.clone(),
            });
        }
        if let Some(unit) = &annotated.mojo {
            owners.insert(unit.goal.as_str(), annotated.name.as_str());
        }

        debug!(
            goal = %descriptor.qualified_goal(),
            implementation = %descriptor.implementation,
            parameters = descriptor.parameters.len(),
            "Assembled mojo descriptor"
        );
        descriptors.push(descriptor);
    }

    info!(
        plugin = %plugin.artifact,
        mojos = descriptors.len(),
        "Descriptor assembly complete"
    );
    Ok(descriptors)
}
