//! Mapping from `org.apache.maven.plugins.annotations` to the plugin model

use crate::classfile::{Annotation, ClassFile, FieldInfo};
use crate::error::{ExtractionError, Result};
use crate::model::{
    AnnotatedType, ArtifactKey, CollaboratorSpec, ConfigParameterSpec, ExecutableUnitSpec,
    ExecuteSpec,
};

pub const MOJO: &str = "Lorg/apache/maven/plugins/annotations/Mojo;";
pub const EXECUTE: &str = "Lorg/apache/maven/plugins/annotations/Execute;";
pub const PARAMETER: &str = "Lorg/apache/maven/plugins/annotations/Parameter;";
pub const COMPONENT: &str = "Lorg/apache/maven/plugins/annotations/Component;";

const OBJECT: &str = "java.lang.Object";

/// `LifecyclePhase` constant to phase id; `NONE` means unbound.
pub fn lifecycle_phase_id(const_name: &str) -> Option<String> {
    if const_name == "NONE" || const_name.is_empty() {
        return None;
    }
    Some(const_name.to_lowercase().replace('_', "-"))
}

/// `ResolutionScope` constant to scope id; `NONE` means no resolution.
pub fn resolution_scope_id(const_name: &str) -> Option<String> {
    if const_name == "NONE" || const_name.is_empty() {
        return None;
    }
    Some(const_name.to_lowercase().replace("_plus_", "+"))
}

pub fn instantiation_strategy_id(const_name: &str) -> String {
    const_name.to_lowercase().replace('_', "-")
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn malformed(class: &ClassFile, source: crate::classfile::ClassFileError) -> ExtractionError {
    ExtractionError::MalformedClass {
        location: class.name.clone(),
        source,
    }
}

fn read_mojo(class: &ClassFile, mojo: &Annotation) -> Result<ExecutableUnitSpec> {
    let goal = non_empty(mojo.string("name")).ok_or_else(|| ExtractionError::MissingGoalName {
        type_name: class.name.clone(),
    })?;

    let mut unit = ExecutableUnitSpec::new(goal);
    unit.phase = mojo.enum_const("defaultPhase").and_then(lifecycle_phase_id);
    unit.dependency_resolution = mojo
        .enum_const("requiresDependencyResolution")
        .and_then(resolution_scope_id);
    unit.dependency_collection = mojo
        .enum_const("requiresDependencyCollection")
        .and_then(resolution_scope_id);
    if let Some(strategy) = mojo.enum_const("instantiationStrategy") {
        unit.instantiation_strategy = instantiation_strategy_id(strategy);
    }
    if let Some(strategy) = non_empty(mojo.string("executionStrategy")) {
        unit.execution_strategy = strategy;
    }
    unit.project_required = mojo.bool("requiresProject").unwrap_or(true);
    unit.reports_required = mojo.bool("requiresReports").unwrap_or(false);
    unit.aggregator = mojo.bool("aggregator").unwrap_or(false);
    unit.direct_invocation_only = mojo.bool("requiresDirectInvocation").unwrap_or(false);
    unit.online_required = mojo.bool("requiresOnline").unwrap_or(false);
    unit.inherit_by_default = mojo.bool("inheritByDefault").unwrap_or(true);
    unit.configurator = non_empty(mojo.string("configurator"));
    unit.thread_safe = mojo.bool("threadSafe").unwrap_or(false);

    Ok(unit)
}

fn read_execute(execute: &Annotation) -> ExecuteSpec {
    ExecuteSpec {
        phase: execute.enum_const("phase").and_then(lifecycle_phase_id),
        goal: non_empty(execute.string("goal")),
        lifecycle: non_empty(execute.string("lifecycle")),
    }
}

fn read_parameter(
    class: &ClassFile,
    field: &FieldInfo,
    annotation: &Annotation,
) -> Result<ConfigParameterSpec> {
    let type_name = field.type_name().map_err(|e| malformed(class, e))?;
    let mut parameter = ConfigParameterSpec::new(&field.name, type_name);

    parameter.alias = non_empty(annotation.string("alias"));
    parameter.default_value = non_empty(annotation.string("defaultValue"));
    parameter.expression = non_empty(annotation.string("expression"))
        .or_else(|| non_empty(annotation.string("property")).map(|p| format!("${{{}}}", p)));
    parameter.required = annotation.bool("required").unwrap_or(false);
    parameter.read_only = annotation.bool("readonly").unwrap_or(false);

    if parameter.required
        && parameter.read_only
        && parameter.default_value.is_none()
        && parameter.expression.is_none()
    {
        return Err(ExtractionError::InvalidParameter {
            type_name: class.name.clone(),
            field: field.name.clone(),
            reason: "required read-only parameter has neither a default value nor an expression"
                .to_string(),
        });
    }

    Ok(parameter)
}

fn read_component(
    class: &ClassFile,
    field: &FieldInfo,
    annotation: &Annotation,
) -> Result<CollaboratorSpec> {
    let role = match annotation.class("role") {
        Some(role) if role != OBJECT => role,
        _ => field.type_name().map_err(|e| malformed(class, e))?,
    };

    let mut component = CollaboratorSpec::new(&field.name, role);
    component.role_hint = non_empty(annotation.string("hint"));
    Ok(component)
}

/// Builds the annotated-type record for one parsed class.
pub fn to_annotated_type(class: &ClassFile, artifact: &ArtifactKey) -> Result<AnnotatedType> {
    let mut annotated = AnnotatedType::new(&class.name, artifact.clone());
    annotated.parent = class.super_name.clone().filter(|s| s != OBJECT);
    annotated.interfaces = class.interfaces.clone();

    if let Some(mojo) = class.annotation(MOJO) {
        annotated.mojo = Some(read_mojo(class, mojo)?);
    }
    if let Some(execute) = class.annotation(EXECUTE) {
        annotated.execute = Some(read_execute(execute));
    }

    for field in &class.fields {
        let parameter = field.annotation(PARAMETER);
        let component = field.annotation(COMPONENT);

        match (parameter, component) {
            (Some(_), Some(_)) => {
                return Err(ExtractionError::InvalidParameter {
                    type_name: class.name.clone(),
                    field: field.name.clone(),
                    reason: "field is annotated with both @Parameter and @Component".to_string(),
                });
            }
            (Some(annotation), None) => {
                let spec = read_parameter(class, field, annotation)?;
                annotated.parameters.insert(field.name.clone(), spec);
            }
            (None, Some(annotation)) => {
                let spec = read_component(class, field, annotation)?;
                annotated.components.insert(field.name.clone(), spec);
            }
            (None, None) => {}
        }
    }

    Ok(annotated)
}
