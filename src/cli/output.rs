//! Output formatting for extracted plugin descriptors
//!
//! JSON and YAML carry the full descriptor for downstream writers; the human
//! format is a summary of goals, phases and parameters for a terminal.
//!
//! # Example
//!
//! ```no_run
//! use mojo_descriptor::cli::output::{OutputFormat, OutputFormatter};
//! use mojo_descriptor::{extract, ExtractorConfig};
//! use std::path::Path;
//!
//! let descriptor = extract(Path::new("."), &ExtractorConfig::default(), &[])?;
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format(&descriptor)?);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::config::ExtractorConfig;
use crate::model::{DescriptorParameter, MojoDescriptor, PluginDescriptor};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";
const BRANCH: &str = "\u{251C}\u{2500}";
const LAST: &str = "\u{2514}\u{2500}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable summary
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a plugin descriptor according to the configured format
    pub fn format(&self, descriptor: &PluginDescriptor) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(descriptor)
                .context("Failed to serialize plugin descriptor to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(descriptor)
                .context("Failed to serialize plugin descriptor to YAML"),
            OutputFormat::Human => Ok(self.format_human(descriptor)),
        }
    }

    /// Formats configuration display
    pub fn format_config(&self, config: &ExtractorConfig) -> Result<String> {
        // Sorted so repeated runs print identical output
        let config_map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config_map)
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&config_map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_human(&self, descriptor: &PluginDescriptor) -> String {
        let context = &descriptor.context;
        let mut output = String::new();

        output.push_str("\u{2713} Plugin Descriptor\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let _ = writeln!(output, "Plugin:       {}", context.artifact);
        let _ = writeln!(output, "Goal Prefix:  {}", context.goal_prefix);
        let _ = writeln!(output, "Goals:        {}", descriptor.mojos.len());

        if !context.dependencies.is_empty() {
            output.push_str("\nDependencies:\n");
            let count = context.dependencies.len();
            for (i, dep) in context.dependencies.iter().enumerate() {
                let connector = if i + 1 == count { LAST } else { BRANCH };
                let _ = writeln!(
                    output,
                    "{} {}:{}:{} ({})",
                    connector, dep.group_id, dep.artifact_id, dep.version, dep.dependency_type
                );
            }
        }

        for mojo in &descriptor.mojos {
            output.push('\n');
            format_mojo(&mut output, mojo);
        }

        if descriptor.mojos.is_empty() {
            output.push_str("\n\u{26A0} No goals found\n");
        }

        output
    }
}

fn format_mojo(output: &mut String, mojo: &MojoDescriptor) {
    let _ = write!(output, "{}", mojo.qualified_goal());
    if mojo.docs.deprecated.is_some() {
        output.push_str(" (deprecated)");
    }
    output.push('\n');

    let _ = writeln!(output, "{} Class:  {}", BRANCH, mojo.implementation);
    let _ = writeln!(
        output,
        "{} Phase:  {}",
        BRANCH,
        mojo.phase.as_deref().unwrap_or("(none)")
    );
    if let Some(ref since) = mojo.docs.since {
        let _ = writeln!(output, "{} Since:  {}", BRANCH, since);
    }
    if let Some(ref description) = mojo.docs.description {
        let _ = writeln!(output, "{} About:  {}", BRANCH, first_line(description));
    }

    if mojo.parameters.is_empty() {
        let _ = writeln!(output, "{} Parameters: (none)", LAST);
        return;
    }

    let _ = writeln!(output, "{} Parameters:", LAST);
    let count = mojo.parameters.len();
    for (i, parameter) in mojo.parameters.iter().enumerate() {
        let connector = if i + 1 == count { LAST } else { BRANCH };
        let _ = writeln!(output, "   {} {}", connector, describe_parameter(parameter));
    }
}

fn describe_parameter(parameter: &DescriptorParameter) -> String {
    let mut line = parameter.name.clone();
    if let Some(ref type_name) = parameter.type_name {
        let _ = write!(line, ": {}", type_name);
    }

    let mut notes = Vec::new();
    if parameter.required {
        notes.push("required".to_string());
    }
    if parameter.requirement.is_some() {
        notes.push("component".to_string());
    } else if !parameter.editable {
        notes.push("read-only".to_string());
    }
    if let Some(ref expression) = parameter.expression {
        notes.push(expression.clone());
    }
    if let Some(ref default_value) = parameter.default_value {
        notes.push(format!("default {}", default_value));
    }
    if parameter.docs.deprecated.is_some() {
        notes.push("deprecated".to_string());
    }

    if !notes.is_empty() {
        let _ = write!(line, " [{}]", notes.join(", "));
    }
    line
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ArtifactKey, Documentation, PluginContext, PluginDependency, Requirement,
        DEFAULT_EXECUTION_STRATEGY, DEFAULT_INSTANTIATION_STRATEGY,
    };
    use std::sync::Arc;

    fn parameter(name: &str) -> DescriptorParameter {
        DescriptorParameter {
            name: name.to_string(),
            type_name: Some("java.lang.String".to_string()),
            alias: None,
            default_value: None,
            expression: None,
            required: false,
            editable: true,
            requirement: None,
            docs: Documentation::default(),
        }
    }

    fn create_test_descriptor() -> PluginDescriptor {
        let mut context = PluginContext::new(
            ArtifactKey::new("com.example", "demo-maven-plugin", "1.0"),
            "demo",
        );
        context.dependencies.push(PluginDependency {
            group_id: "org.apache.maven".to_string(),
            artifact_id: "maven-core".to_string(),
            dependency_type: "jar".to_string(),
            version: "3.9.6".to_string(),
        });
        let plugin = Arc::new(context.clone());

        let mut output_dir = parameter("outputDirectory");
        output_dir.required = true;
        output_dir.default_value = Some("${project.build.directory}".to_string());
        output_dir.docs.description = Some("Where to write.\nSecond line.".to_string());

        let mut session = parameter("session");
        session.type_name = Some("org.apache.maven.execution.MavenSession".to_string());
        session.editable = false;
        session.requirement = Some(Requirement {
            role: "org.apache.maven.execution.MavenSession".to_string(),
            role_hint: None,
        });

        let mojo = MojoDescriptor {
            goal: "run".to_string(),
            implementation: "com.example.RunMojo".to_string(),
            language: "java".to_string(),
            phase: Some("process-classes".to_string()),
            execute: None,
            dependency_resolution: Some("runtime".to_string()),
            dependency_collection: None,
            aggregator: false,
            thread_safe: true,
            online_required: false,
            direct_invocation_only: false,
            project_required: true,
            reports_required: false,
            inherit_by_default: true,
            execution_strategy: DEFAULT_EXECUTION_STRATEGY.to_string(),
            instantiation_strategy: DEFAULT_INSTANTIATION_STRATEGY.to_string(),
            configurator: None,
            is_report: false,
            docs: Documentation {
                description: Some("Runs the demo.".to_string()),
                since: Some("1.0".to_string()),
                deprecated: None,
            },
            parameters: vec![output_dir, session],
            plugin,
        };

        PluginDescriptor {
            context,
            mojos: vec![mojo],
        }
    }

    #[test]
    fn test_json_format() {
        let descriptor = create_test_descriptor();
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format(&descriptor).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["goal_prefix"], "demo");
        assert_eq!(parsed["artifact"]["artifact_id"], "demo-maven-plugin");
        assert_eq!(parsed["mojos"][0]["goal"], "run");
        assert_eq!(parsed["mojos"][0]["since"], "1.0");
        assert_eq!(parsed["mojos"][0]["parameters"][1]["editable"], false);
        assert!(parsed["mojos"][0].get("plugin").is_none());
    }

    #[test]
    fn test_yaml_format() {
        let descriptor = create_test_descriptor();
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format(&descriptor).unwrap();

        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed["goal_prefix"].as_str(), Some("demo"));
        assert_eq!(parsed["mojos"][0]["phase"].as_str(), Some("process-classes"));
    }

    #[test]
    fn test_human_format() {
        let descriptor = create_test_descriptor();
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format(&descriptor).unwrap();

        assert!(output.contains("Plugin:       com.example:demo-maven-plugin:1.0"));
        assert!(output.contains("Goal Prefix:  demo"));
        assert!(output.contains("org.apache.maven:maven-core:3.9.6 (jar)"));
        assert!(output.contains("demo:run\n"));
        assert!(output.contains("Phase:  process-classes"));
        assert!(output.contains("About:  Runs the demo."));
        assert!(output.contains(
            "outputDirectory: java.lang.String [required, default ${project.build.directory}]"
        ));
        assert!(output.contains("session: org.apache.maven.execution.MavenSession [component]"));
    }

    #[test]
    fn test_human_format_without_goals() {
        let mut descriptor = create_test_descriptor();
        descriptor.mojos.clear();
        let output = OutputFormatter::new(OutputFormat::Human)
            .format(&descriptor)
            .unwrap();
        assert!(output.contains("Goals:        0"));
        assert!(output.contains("No goals found"));
    }

    #[test]
    fn test_config_formats() {
        let config = ExtractorConfig::default();

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_config(&config)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("encoding").is_some());
        assert!(parsed.get("classes_dir").is_some());

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_config(&config)
            .unwrap();
        assert!(human.starts_with("Mojo Descriptor Configuration:"));
    }
}
