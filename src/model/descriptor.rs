//! Assembled plugin descriptor, the output handed to the descriptor writer

use super::{ArtifactKey, Documentation, ExecuteSpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_LANGUAGE: &str = "java";

/// A runtime dependency of the plugin itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDependency {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(rename = "type")]
    pub dependency_type: String,
    pub version: String,
}

/// The owning plugin module, shared by every descriptor it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginContext {
    pub artifact: ArtifactKey,
    pub goal_prefix: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PluginDependency>,
}

impl PluginContext {
    pub fn new(artifact: ArtifactKey, goal_prefix: impl Into<String>) -> Self {
        Self {
            artifact,
            goal_prefix: goal_prefix.into(),
            dependencies: Vec::new(),
        }
    }
}

/// A collaborator requirement: the role and hint the runtime injects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorParameter {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    pub required: bool,
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<Requirement>,
    #[serde(flatten)]
    pub docs: Documentation,
}

/// Everything the orchestrator needs to invoke one goal
#[derive(Debug, Clone, Serialize)]
pub struct MojoDescriptor {
    pub goal: String,
    pub implementation: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute: Option<ExecuteSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_collection: Option<String>,
    pub aggregator: bool,
    pub thread_safe: bool,
    pub online_required: bool,
    pub direct_invocation_only: bool,
    pub project_required: bool,
    pub reports_required: bool,
    pub inherit_by_default: bool,
    pub execution_strategy: String,
    pub instantiation_strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurator: Option<String>,
    pub is_report: bool,
    #[serde(flatten)]
    pub docs: Documentation,
    pub parameters: Vec<DescriptorParameter>,
    /// Serialized once at the plugin level
    #[serde(skip)]
    pub plugin: Arc<PluginContext>,
}

impl MojoDescriptor {
    pub fn parameter(&self, name: &str) -> Option<&DescriptorParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Fully-qualified goal, e.g. `demo:run`
    pub fn qualified_goal(&self) -> String {
        format!("{}:{}", self.plugin.goal_prefix, self.goal)
    }
}

/// The plugin context together with its goals, in scan order
#[derive(Debug, Clone, Serialize)]
pub struct PluginDescriptor {
    #[serde(flatten)]
    pub context: PluginContext,
    pub mojos: Vec<MojoDescriptor>,
}

impl PluginDescriptor {
    pub fn mojo(&self, goal: &str) -> Option<&MojoDescriptor> {
        self.mojos.iter().find(|m| m.goal == goal)
    }
}
