//! Module context: everything the pipeline needs to know about the plugin
//! module being described and the reactor it lives in.
//!
//! A context is either assembled programmatically with the builder methods or
//! loaded from a Maven module on disk with [`load_module`].

use crate::config::ExtractorConfig;
use crate::error::{ExtractionError, Result};
use crate::javadoc::{SourceEncoding, SourceFilter};
use crate::model::{ArtifactKey, PluginContext, PluginDependency, TypeIndex};
use crate::scanner::ClasspathRoot;
use regex::Regex;
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

pub const POM_FILE: &str = "pom.xml";
pub const DEFAULT_SOURCE_DIRECTORY: &str = "src/main/java";
const DEFAULT_PARENT_PATH: &str = "../pom.xml";
const PLUGIN_PLUGIN: &str = "maven-plugin-plugin";

/// Another module of the same reactor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingModule {
    pub artifact: ArtifactKey,
    pub base_dir: PathBuf,
    pub source_roots: Vec<PathBuf>,
    pub classes_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ModuleContext {
    pub base_dir: PathBuf,
    pub artifact: ArtifactKey,
    pub encoding: SourceEncoding,
    pub source_filter: SourceFilter,
    /// The module's own compile source roots
    pub source_roots: Vec<PathBuf>,
    pub generated_sources: PathBuf,
    pub classpath: Vec<ClasspathRoot>,
    pub siblings: Vec<SiblingModule>,
    pub plugin: PluginContext,
}

impl ModuleContext {
    /// A context with the conventional layout below `base_dir` and no classpath.
    pub fn new(base_dir: impl Into<PathBuf>, plugin: PluginContext) -> Self {
        let base_dir = base_dir.into();
        Self {
            source_roots: vec![base_dir.join(DEFAULT_SOURCE_DIRECTORY)],
            generated_sources: base_dir.join("target/generated-sources/plugin"),
            artifact: plugin.artifact.clone(),
            encoding: SourceEncoding::default(),
            source_filter: SourceFilter::default(),
            classpath: Vec::new(),
            siblings: Vec::new(),
            base_dir,
            plugin,
        }
    }

    pub fn with_classpath_root(mut self, root: ClasspathRoot) -> Self {
        self.classpath.push(root);
        self
    }

    pub fn with_source_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.source_roots = roots;
        self
    }

    pub fn with_sibling(mut self, sibling: SiblingModule) -> Self {
        self.siblings.push(sibling);
        self
    }

    pub fn with_encoding(mut self, encoding: SourceEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_source_filter(mut self, filter: SourceFilter) -> Self {
        self.source_filter = filter;
        self
    }

    pub fn sibling(&self, artifact: &ArtifactKey) -> Option<&SiblingModule> {
        self.siblings.iter().find(|s| &s.artifact == artifact)
    }

    /// Source roots to document `types` from, in priority order.
    ///
    /// The module's own roots come first, then the generated sources directory
    /// and then the roots of every sibling that contributed a type carrying
    /// plugin metadata. Artifacts without a sibling in the reactor are skipped.
    pub fn documentation_roots(&self, types: &TypeIndex) -> Vec<PathBuf> {
        let mut roots = self.source_roots.clone();
        if !roots.contains(&self.generated_sources) {
            roots.push(self.generated_sources.clone());
        }

        for annotated in types.iter().filter(|t| t.has_plugin_metadata()) {
            if annotated.artifact.artifact_id == self.artifact.artifact_id {
                continue;
            }
            match self.sibling(&annotated.artifact) {
                Some(sibling) => {
                    for root in &sibling.source_roots {
                        if !roots.contains(root) {
                            roots.push(root.clone());
                        }
                    }
                }
                None => debug!(
                    type_name = %annotated.name,
                    artifact = %annotated.artifact,
                    "No sources in the reactor for artifact"
                ),
            }
        }

        roots
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub dependency_type: String,
    pub scope: Option<String>,
}

/// The parts of a `pom.xml` the extractor cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomModel {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub source_directory: Option<String>,
    pub modules: Vec<String>,
    pub dependencies: Vec<PomDependency>,
    pub goal_prefix: Option<String>,
    pub properties: HashMap<String, String>,
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(name))
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|c| c.text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl PomModel {
    pub fn parse(content: &str) -> std::result::Result<Self, roxmltree::Error> {
        let doc = Document::parse(content)?;
        let root = doc.root_element();

        let mut pom = PomModel {
            group_id: child_text(root, "groupId"),
            artifact_id: child_text(root, "artifactId"),
            version: child_text(root, "version"),
            packaging: child_text(root, "packaging"),
            ..Default::default()
        };

        if let Some(parent) = child(root, "parent") {
            pom.parent = Some(ParentRef {
                group_id: child_text(parent, "groupId"),
                artifact_id: child_text(parent, "artifactId"),
                version: child_text(parent, "version"),
                relative_path: child_text(parent, "relativePath"),
            });
        }

        if let Some(properties) = child(root, "properties") {
            for property in properties.children().filter(Node::is_element) {
                let value = property.text().map(|s| s.trim().to_string()).unwrap_or_default();
                pom.properties
                    .insert(property.tag_name().name().to_string(), value);
            }
        }

        if let Some(modules) = child(root, "modules") {
            pom.modules = modules
                .children()
                .filter(|c| c.has_tag_name("module"))
                .filter_map(|c| c.text())
                .map(|s| s.trim().to_string())
                .collect();
        }

        if let Some(dependencies) = child(root, "dependencies") {
            for dependency in dependencies.children().filter(|c| c.has_tag_name("dependency")) {
                let (Some(group_id), Some(artifact_id)) = (
                    child_text(dependency, "groupId"),
                    child_text(dependency, "artifactId"),
                ) else {
                    continue;
                };
                pom.dependencies.push(PomDependency {
                    group_id,
                    artifact_id,
                    version: child_text(dependency, "version"),
                    dependency_type: child_text(dependency, "type")
                        .unwrap_or_else(|| "jar".to_string()),
                    scope: child_text(dependency, "scope"),
                });
            }
        }

        if let Some(build) = child(root, "build") {
            pom.source_directory = child_text(build, "sourceDirectory");
            pom.goal_prefix = build
                .descendants()
                .filter(|n| n.has_tag_name("plugin"))
                .find(|p| child_text(*p, "artifactId").as_deref() == Some(PLUGIN_PLUGIN))
                .and_then(|p| {
                    p.descendants()
                        .find(|n| n.has_tag_name("goalPrefix"))
                        .and_then(|n| n.text())
                        .map(|s| s.trim().to_string())
                })
                .filter(|s| !s.is_empty());
        }

        Ok(pom)
    }

    pub fn effective_group_id(&self) -> Option<String> {
        self.group_id
            .clone()
            .or_else(|| self.parent.as_ref().and_then(|p| p.group_id.clone()))
    }

    pub fn effective_version(&self) -> Option<String> {
        self.version
            .clone()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.clone()))
    }

    pub fn artifact_key(&self) -> Option<ArtifactKey> {
        Some(ArtifactKey::new(
            self.effective_group_id()?,
            self.artifact_id.clone()?,
            self.effective_version()?,
        ))
    }

    /// Replaces `${project.*}` and `${property}` references the POM defines.
    pub fn interpolate(&self, value: &str) -> String {
        let mut result = value.to_string();
        let builtins = [
            ("project.groupId", self.effective_group_id()),
            ("project.artifactId", self.artifact_id.clone()),
            ("project.version", self.effective_version()),
        ];
        for (key, replacement) in builtins {
            if let Some(replacement) = replacement {
                result = result.replace(&format!("${{{}}}", key), &replacement);
            }
        }
        for (key, replacement) in &self.properties {
            result = result.replace(&format!("${{{}}}", key), replacement);
        }
        result
    }

    /// Runtime dependencies, as recorded in the plugin descriptor
    pub fn plugin_dependencies(&self) -> Vec<PluginDependency> {
        self.dependencies
            .iter()
            .filter(|d| matches!(d.scope.as_deref(), None | Some("compile") | Some("runtime")))
            .map(|d| PluginDependency {
                group_id: self.interpolate(&d.group_id),
                artifact_id: self.interpolate(&d.artifact_id),
                dependency_type: d.dependency_type.clone(),
                version: d
                    .version
                    .as_deref()
                    .map(|v| self.interpolate(v))
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Goal prefix derived from a plugin artifact id, e.g. `demo` for
/// `demo-maven-plugin` or `maven-demo-plugin`.
pub fn goal_prefix_from_artifact_id(artifact_id: &str) -> String {
    if artifact_id == PLUGIN_PLUGIN {
        return "plugin".to_string();
    }
    let maven = Regex::new("-?maven-?").map(|re| re.replace_all(artifact_id, "").into_owned());
    let stripped = maven.unwrap_or_else(|_| artifact_id.to_string());
    Regex::new("-?plugin-?")
        .map(|re| re.replace_all(&stripped, "").into_owned())
        .unwrap_or(stripped)
}

fn read_pom(path: &Path) -> Result<PomModel> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ExtractionError::workspace(path, e.to_string()))?;
    PomModel::parse(&content).map_err(|e| ExtractionError::workspace(path, e.to_string()))
}

fn sibling_from_pom(module_dir: &Path, pom: &PomModel, config: &ExtractorConfig) -> Option<SiblingModule> {
    let artifact = pom.artifact_key()?;
    let source_dir = pom
        .source_directory
        .clone()
        .unwrap_or_else(|| DEFAULT_SOURCE_DIRECTORY.to_string());
    Some(SiblingModule {
        artifact,
        base_dir: module_dir.to_path_buf(),
        source_roots: vec![module_dir.join(source_dir)],
        classes_dir: module_dir.join(&config.classes_dir),
    })
}

/// Resolves `.` and `..` lexically so reactor paths stay comparable.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Modules of the reactor the primary module's parent aggregates.
fn load_siblings(base_dir: &Path, pom: &PomModel, config: &ExtractorConfig) -> Vec<SiblingModule> {
    let Some(parent) = &pom.parent else {
        return Vec::new();
    };

    let mut parent_pom =
        normalize(&base_dir.join(parent.relative_path.as_deref().unwrap_or(DEFAULT_PARENT_PATH)));
    if parent_pom.is_dir() {
        parent_pom = parent_pom.join(POM_FILE);
    }
    let parent_model = match read_pom(&parent_pom) {
        Ok(model) => model,
        Err(err) => {
            debug!(error = %err, "No readable reactor parent");
            return Vec::new();
        }
    };
    let Some(reactor_dir) = parent_pom.parent() else {
        return Vec::new();
    };

    let mut siblings = Vec::new();
    for module in &parent_model.modules {
        let module_dir = reactor_dir.join(module);
        if same_dir(&module_dir, base_dir) {
            continue;
        }
        match read_pom(&module_dir.join(POM_FILE)) {
            Ok(model) => match sibling_from_pom(&module_dir, &model, config) {
                Some(sibling) => siblings.push(sibling),
                None => debug!(module = %module, "Reactor module has no complete coordinates"),
            },
            Err(err) => debug!(module = %module, error = %err, "Skipping unreadable reactor module"),
        }
    }
    siblings
}

fn parse_pom_properties(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('!'))
        .filter_map(|l| l.split_once(['=', ':']))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Coordinates from a jar's embedded `pom.properties`, if it has one
fn artifact_from_manifest(path: &Path) -> Option<ArtifactKey> {
    let file = File::open(path).ok()?;
    let mut archive = zip::ZipArchive::new(file).ok()?;

    let entry_name = archive
        .file_names()
        .find(|n| n.starts_with("META-INF/maven/") && n.ends_with("/pom.properties"))?
        .to_string();
    let mut entry = archive.by_name(&entry_name).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;

    let props = parse_pom_properties(&content);
    Some(ArtifactKey::new(
        props.get("groupId")?.clone(),
        props.get("artifactId")?.clone(),
        props.get("version")?.clone(),
    ))
}

/// Identity of a dependency jar: its embedded Maven coordinates, or a guess
/// from a `name-version.jar` file name.
pub fn jar_artifact(path: &Path) -> ArtifactKey {
    if let Some(artifact) = artifact_from_manifest(path) {
        return artifact;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let split = stem
        .match_indices('-')
        .find(|(i, _)| stem[i + 1..].starts_with(|c: char| c.is_ascii_digit()))
        .map(|(i, _)| i);

    match split {
        Some(i) => ArtifactKey::new("", &stem[..i], &stem[i + 1..]),
        None => ArtifactKey::new("", stem, ""),
    }
}

/// Builds the context for the Maven module at `base_dir`.
///
/// `extra_jars` are appended to the classpath after the reactor class
/// directories.
pub fn load_module(
    base_dir: &Path,
    config: &ExtractorConfig,
    extra_jars: &[PathBuf],
) -> Result<ModuleContext> {
    let pom_path = base_dir.join(POM_FILE);
    let pom = read_pom(&pom_path)?;
    let artifact = pom.artifact_key().ok_or_else(|| {
        ExtractionError::workspace(&pom_path, "missing groupId, artifactId or version")
    })?;

    let goal_prefix = pom
        .goal_prefix
        .clone()
        .unwrap_or_else(|| goal_prefix_from_artifact_id(&artifact.artifact_id));
    let mut plugin = PluginContext::new(artifact.clone(), goal_prefix);
    plugin.dependencies = pom.plugin_dependencies();

    let encoding = config
        .source_encoding()
        .map_err(|e| ExtractionError::workspace(&pom_path, e.to_string()))?;
    let source_filter = config
        .source_filter()
        .map_err(|e| ExtractionError::workspace(&pom_path, e.to_string()))?;

    let source_dir = pom
        .source_directory
        .clone()
        .unwrap_or_else(|| DEFAULT_SOURCE_DIRECTORY.to_string());

    let mut context = ModuleContext::new(base_dir, plugin)
        .with_source_roots(vec![base_dir.join(source_dir)])
        .with_encoding(encoding)
        .with_source_filter(source_filter)
        .with_classpath_root(ClasspathRoot::new(
            base_dir.join(&config.classes_dir),
            artifact.clone(),
        ));
    context.generated_sources = base_dir.join(&config.generated_sources);

    for sibling in load_siblings(base_dir, &pom, config) {
        let depended_on = pom.dependencies.iter().any(|d| {
            pom.interpolate(&d.group_id) == sibling.artifact.group_id
                && pom.interpolate(&d.artifact_id) == sibling.artifact.artifact_id
        });
        if depended_on {
            context
                .classpath
                .push(ClasspathRoot::new(&sibling.classes_dir, sibling.artifact.clone()));
        }
        context.siblings.push(sibling);
    }

    for jar in extra_jars {
        context
            .classpath
            .push(ClasspathRoot::new(jar, jar_artifact(jar)));
    }

    info!(
        module = %artifact,
        goal_prefix = %context.plugin.goal_prefix,
        classpath = context.classpath.len(),
        siblings = context.siblings.len(),
        "Loaded module context"
    );
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotatedType;
    use yare::parameterized;

    const PLUGIN_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>com.example</groupId>
    <artifactId>demo-parent</artifactId>
    <version>2.1.0</version>
  </parent>
  <artifactId>demo-maven-plugin</artifactId>
  <packaging>maven-plugin</packaging>
  <properties>
    <plexus.version>2.1</plexus.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>${project.groupId}</groupId>
      <artifactId>demo-core</artifactId>
      <version>${project.version}</version>
    </dependency>
    <dependency>
      <groupId>org.codehaus.plexus</groupId>
      <artifactId>plexus-utils</artifactId>
      <version>${plexus.version}</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
  <build>
    <sourceDirectory>src/java</sourceDirectory>
    <plugins>
      <plugin>
        <artifactId>maven-plugin-plugin</artifactId>
        <configuration>
          <goalPrefix>dm</goalPrefix>
        </configuration>
      </plugin>
    </plugins>
  </build>
</project>"#;

    #[test]
    fn test_parse_plugin_pom() {
        let pom = PomModel::parse(PLUGIN_POM).unwrap();

        assert_eq!(
            pom.artifact_key(),
            Some(ArtifactKey::new("com.example", "demo-maven-plugin", "2.1.0"))
        );
        assert_eq!(pom.packaging.as_deref(), Some("maven-plugin"));
        assert_eq!(pom.source_directory.as_deref(), Some("src/java"));
        assert_eq!(pom.goal_prefix.as_deref(), Some("dm"));
        assert_eq!(pom.dependencies.len(), 3);
    }

    #[test]
    fn test_plugin_dependencies_are_interpolated_runtime_deps() {
        let pom = PomModel::parse(PLUGIN_POM).unwrap();
        let deps = pom.plugin_dependencies();

        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].group_id, "com.example");
        assert_eq!(deps[0].version, "2.1.0");
        assert_eq!(deps[0].dependency_type, "jar");
        assert_eq!(deps[1].version, "2.1");
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        assert!(PomModel::parse("<project><artifactId>x</project>").is_err());
    }

    #[parameterized(
        suffix = { "demo-maven-plugin", "demo" },
        prefix = { "maven-demo-plugin", "demo" },
        plain_plugin = { "demo-plugin", "demo" },
        no_affix = { "demo", "demo" },
        plugin_plugin = { "maven-plugin-plugin", "plugin" },
    )]
    fn test_goal_prefix_from_artifact_id(artifact_id: &str, expected: &str) {
        assert_eq!(goal_prefix_from_artifact_id(artifact_id), expected);
    }

    #[test]
    fn test_pom_properties() {
        let props = parse_pom_properties("#Generated\ngroupId=org.example\nartifactId = lib\nversion:1.0\n");
        assert_eq!(props.get("groupId").map(String::as_str), Some("org.example"));
        assert_eq!(props.get("artifactId").map(String::as_str), Some("lib"));
        assert_eq!(props.get("version").map(String::as_str), Some("1.0"));
    }

    #[test]
    fn test_jar_artifact_from_file_name() {
        let key = jar_artifact(Path::new("/repo/plexus-utils-3.0.24.jar"));
        assert_eq!(key.artifact_id, "plexus-utils");
        assert_eq!(key.version, "3.0.24");

        let bare = jar_artifact(Path::new("/repo/tools.jar"));
        assert_eq!(bare.artifact_id, "tools");
        assert_eq!(bare.version, "");
    }

    #[test]
    fn test_normalize_resolves_parent_components() {
        assert_eq!(
            normalize(Path::new("/ws/plugin/../pom.xml")),
            PathBuf::from("/ws/pom.xml")
        );
        assert_eq!(normalize(Path::new("./../pom.xml")), PathBuf::from("../pom.xml"));
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
    }

    #[test]
    fn test_documentation_roots() {
        let own = ArtifactKey::new("com.example", "demo-maven-plugin", "1.0");
        let core = ArtifactKey::new("com.example", "demo-core", "1.0");
        let external = ArtifactKey::new("org.other", "lib", "3.0");

        let context = ModuleContext::new("/ws/plugin", PluginContext::new(own.clone(), "demo"))
            .with_sibling(SiblingModule {
                artifact: core.clone(),
                base_dir: PathBuf::from("/ws/core"),
                source_roots: vec![PathBuf::from("/ws/core/src/main/java")],
                classes_dir: PathBuf::from("/ws/core/target/classes"),
            });

        let mut base = AnnotatedType::new("com.example.core.Base", core);
        base.parameters.insert(
            "timeout".to_string(),
            crate::model::ConfigParameterSpec::new("timeout", "int"),
        );
        let mut lib = AnnotatedType::new("org.other.Helper", external);
        lib.parameters.insert(
            "x".to_string(),
            crate::model::ConfigParameterSpec::new("x", "int"),
        );
        let types: TypeIndex = vec![AnnotatedType::new("com.example.RunMojo", own), base, lib]
            .into_iter()
            .collect();

        assert_eq!(
            context.documentation_roots(&types),
            vec![
                PathBuf::from("/ws/plugin/src/main/java"),
                PathBuf::from("/ws/plugin/target/generated-sources/plugin"),
                PathBuf::from("/ws/core/src/main/java"),
            ]
        );
    }
}
