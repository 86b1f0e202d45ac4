//! Plugin metadata model
//!
//! `AnnotatedType` is what the metadata scanner produces for every compiled
//! class; `descriptor` holds what the assembler hands to the outside world.

pub mod descriptor;
pub mod ordered;

pub use descriptor::{
    DescriptorParameter, MojoDescriptor, PluginContext, PluginDependency, PluginDescriptor,
    Requirement,
};
pub use ordered::OrderedMap;

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_EXECUTION_STRATEGY: &str = "once-per-session";
pub const DEFAULT_INSTANTIATION_STRATEGY: &str = "per-lookup";

/// Identity of the artifact (module or jar) a type was compiled into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ArtifactKey {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Javadoc-derived text, filled in once before assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

/// Contents of `@Mojo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableUnitSpec {
    pub goal: String,
    pub phase: Option<String>,
    pub aggregator: bool,
    pub dependency_resolution: Option<String>,
    pub dependency_collection: Option<String>,
    pub thread_safe: bool,
    pub online_required: bool,
    pub direct_invocation_only: bool,
    pub project_required: bool,
    pub reports_required: bool,
    pub inherit_by_default: bool,
    pub execution_strategy: String,
    pub instantiation_strategy: String,
    pub configurator: Option<String>,
    pub docs: Documentation,
}

impl ExecutableUnitSpec {
    /// A unit with the annotation defaults
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            phase: None,
            aggregator: false,
            dependency_resolution: None,
            dependency_collection: None,
            thread_safe: false,
            online_required: false,
            direct_invocation_only: false,
            project_required: true,
            reports_required: false,
            inherit_by_default: true,
            execution_strategy: DEFAULT_EXECUTION_STRATEGY.to_string(),
            instantiation_strategy: DEFAULT_INSTANTIATION_STRATEGY.to_string(),
            configurator: None,
            docs: Documentation::default(),
        }
    }
}

/// Contents of `@Execute`: the lifecycle fork triggered before the goal runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<String>,
}

/// Contents of `@Parameter` on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigParameterSpec {
    pub field_name: String,
    pub type_name: String,
    pub alias: Option<String>,
    pub default_value: Option<String>,
    pub expression: Option<String>,
    pub required: bool,
    pub read_only: bool,
    pub docs: Documentation,
}

impl ConfigParameterSpec {
    pub fn new(field_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            type_name: type_name.into(),
            alias: None,
            default_value: None,
            expression: None,
            required: false,
            read_only: false,
            docs: Documentation::default(),
        }
    }

    pub fn editable(&self) -> bool {
        !self.read_only
    }
}

/// Contents of `@Component` on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorSpec {
    pub field_name: String,
    pub role: String,
    pub role_hint: Option<String>,
    pub docs: Documentation,
}

impl CollaboratorSpec {
    pub fn new(field_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            role: role.into(),
            role_hint: None,
            docs: Documentation::default(),
        }
    }
}

/// One scanned class and the plugin metadata declared directly on it
#[derive(Debug, Clone)]
pub struct AnnotatedType {
    pub name: String,
    pub mojo: Option<ExecutableUnitSpec>,
    pub execute: Option<ExecuteSpec>,
    pub parameters: OrderedMap<String, ConfigParameterSpec>,
    pub components: OrderedMap<String, CollaboratorSpec>,
    /// Immediate superclass, by name only
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub artifact: ArtifactKey,
}

impl AnnotatedType {
    pub fn new(name: impl Into<String>, artifact: ArtifactKey) -> Self {
        Self {
            name: name.into(),
            mojo: None,
            execute: None,
            parameters: OrderedMap::new(),
            components: OrderedMap::new(),
            parent: None,
            interfaces: Vec::new(),
            artifact,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_mojo(mut self, mojo: ExecutableUnitSpec) -> Self {
        self.mojo = Some(mojo);
        self
    }

    pub fn with_parameter(mut self, parameter: ConfigParameterSpec) -> Self {
        self.parameters
            .insert(parameter.field_name.clone(), parameter);
        self
    }

    pub fn with_component(mut self, component: CollaboratorSpec) -> Self {
        self.components
            .insert(component.field_name.clone(), component);
        self
    }

    /// True when the class carries any plugin annotation at all
    pub fn has_plugin_metadata(&self) -> bool {
        self.mojo.is_some()
            || self.execute.is_some()
            || !self.parameters.is_empty()
            || !self.components.is_empty()
    }
}

/// All scanned types, in scan order, keyed by fully-qualified name
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    types: OrderedMap<String, AnnotatedType>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type unless one with the same name is already present.
    /// Returns false when the earlier classpath entry shadows this one.
    pub fn insert(&mut self, annotated: AnnotatedType) -> bool {
        if self.types.contains_key(annotated.name.as_str()) {
            return false;
        }
        self.types.insert(annotated.name.clone(), annotated);
        true
    }

    pub fn get(&self, name: &str) -> Option<&AnnotatedType> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedType> {
        self.types.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AnnotatedType> {
        self.types.values_mut()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn mojo_count(&self) -> usize {
        self.iter().filter(|t| t.mojo.is_some()).count()
    }
}

impl FromIterator<AnnotatedType> for TypeIndex {
    fn from_iter<I: IntoIterator<Item = AnnotatedType>>(iter: I) -> Self {
        let mut index = TypeIndex::new();
        for t in iter {
            index.insert(t);
        }
        index
    }
}
