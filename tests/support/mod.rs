//! Fixture helpers shared by the integration tests
//!
//! There is no Java compiler in the test environment, so fixtures are written
//! as raw class files carrying `RuntimeVisibleAnnotations`, plus the Java
//! sources and POMs a real plugin module would have next to them.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

const ANNOTATIONS: &str = "org/apache/maven/plugins/annotations";
const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";

fn internal(name: &str) -> String {
    name.replace('.', "/")
}

/// An annotation element value
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Bool(bool),
    /// Enum type simple name under the annotations package, constant name
    Enum(&'static str, String),
    /// Class literal, by qualified name
    Class(String),
}

#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    descriptor: String,
    elements: Vec<(String, Value)>,
}

impl AnnotationSpec {
    fn maven(simple_name: &str) -> Self {
        Self {
            descriptor: format!("L{}/{};", ANNOTATIONS, simple_name),
            elements: Vec::new(),
        }
    }

    pub fn custom(type_name: &str) -> Self {
        Self {
            descriptor: format!("L{};", internal(type_name)),
            elements: Vec::new(),
        }
    }

    pub fn string(mut self, name: &str, value: &str) -> Self {
        self.elements
            .push((name.to_string(), Value::Str(value.to_string())));
        self
    }

    pub fn boolean(mut self, name: &str, value: bool) -> Self {
        self.elements.push((name.to_string(), Value::Bool(value)));
        self
    }

    pub fn enumeration(mut self, name: &str, enum_type: &'static str, constant: &str) -> Self {
        self.elements
            .push((name.to_string(), Value::Enum(enum_type, constant.to_string())));
        self
    }

    pub fn class(mut self, name: &str, type_name: &str) -> Self {
        self.elements
            .push((name.to_string(), Value::Class(type_name.to_string())));
        self
    }

    pub fn phase(self, constant: &str) -> Self {
        self.enumeration("defaultPhase", "LifecyclePhase", constant)
    }
}

pub fn mojo(goal: &str) -> AnnotationSpec {
    AnnotationSpec::maven("Mojo").string("name", goal)
}

pub fn execute() -> AnnotationSpec {
    AnnotationSpec::maven("Execute")
}

pub fn parameter() -> AnnotationSpec {
    AnnotationSpec::maven("Parameter")
}

pub fn component() -> AnnotationSpec {
    AnnotationSpec::maven("Component")
}

struct FieldSpec {
    name: String,
    descriptor: String,
    annotations: Vec<AnnotationSpec>,
}

#[derive(Default)]
struct ConstantPool {
    bytes: Vec<u8>,
    next: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    integers: HashMap<i32, u16>,
}

impl ConstantPool {
    fn new() -> Self {
        Self {
            next: 1,
            ..Default::default()
        }
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8.get(value) {
            return index;
        }
        self.bytes.push(1);
        self.bytes
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(value.as_bytes());
        let index = self.allocate();
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(&index) = self.classes.get(internal_name) {
            return index;
        }
        let name_index = self.utf8(internal_name);
        self.bytes.push(7);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        let index = self.allocate();
        self.classes.insert(internal_name.to_string(), index);
        index
    }

    fn integer(&mut self, value: i32) -> u16 {
        if let Some(&index) = self.integers.get(&value) {
            return index;
        }
        self.bytes.push(3);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        let index = self.allocate();
        self.integers.insert(value, index);
        index
    }

    fn allocate(&mut self) -> u16 {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Writes a class file with the given annotations; no methods are emitted.
pub struct ClassBuilder {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    annotations: Vec<AnnotationSpec>,
    fields: Vec<FieldSpec>,
}

impl ClassBuilder {
    /// `name` is the binary name, e.g. `com.example.Outer$Inner`
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            super_name: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn annotate(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Adds a field; `descriptor` is a JVM field descriptor such as `Ljava/io/File;`
    pub fn field(mut self, name: &str, descriptor: &str, annotations: Vec<AnnotationSpec>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = ConstantPool::new();
        let mut body = Vec::new();

        put_u16(&mut body, 0x0021);
        put_u16(&mut body, pool.class(&internal(&self.name)));
        let super_index = match self.super_name {
            Some(ref super_name) => pool.class(&internal(super_name)),
            None => 0,
        };
        put_u16(&mut body, super_index);

        put_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            put_u16(&mut body, pool.class(&internal(interface)));
        }

        put_u16(&mut body, self.fields.len() as u16);
        for field in &self.fields {
            put_u16(&mut body, 0x0002);
            put_u16(&mut body, pool.utf8(&field.name));
            put_u16(&mut body, pool.utf8(&field.descriptor));
            write_annotation_attribute(&mut body, &mut pool, &field.annotations);
        }

        // methods
        put_u16(&mut body, 0);

        write_annotation_attribute(&mut body, &mut pool, &self.annotations);

        let mut bytes = Vec::with_capacity(body.len() + pool.bytes.len() + 10);
        bytes.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        put_u16(&mut bytes, 0);
        put_u16(&mut bytes, 52);
        put_u16(&mut bytes, pool.next);
        bytes.extend_from_slice(&pool.bytes);
        bytes.extend_from_slice(&body);
        bytes
    }

    /// Path of the class file below a classes directory
    pub fn relative_path(&self) -> String {
        format!("{}.class", internal(&self.name))
    }

    pub fn write_to(&self, classes_dir: &Path) -> PathBuf {
        let path = classes_dir.join(self.relative_path());
        write_file(&path, &self.build());
        path
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_annotation_attribute(
    out: &mut Vec<u8>,
    pool: &mut ConstantPool,
    annotations: &[AnnotationSpec],
) {
    if annotations.is_empty() {
        put_u16(out, 0);
        return;
    }

    let mut data = Vec::new();
    put_u16(&mut data, annotations.len() as u16);
    for annotation in annotations {
        put_u16(&mut data, pool.utf8(&annotation.descriptor));
        put_u16(&mut data, annotation.elements.len() as u16);
        for (name, value) in &annotation.elements {
            put_u16(&mut data, pool.utf8(name));
            write_element_value(&mut data, pool, value);
        }
    }

    put_u16(out, 1);
    put_u16(out, pool.utf8(RUNTIME_VISIBLE_ANNOTATIONS));
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&data);
}

fn write_element_value(out: &mut Vec<u8>, pool: &mut ConstantPool, value: &Value) {
    match value {
        Value::Str(s) => {
            out.push(b's');
            put_u16(out, pool.utf8(s));
        }
        Value::Bool(b) => {
            out.push(b'Z');
            put_u16(out, pool.integer(i32::from(*b)));
        }
        Value::Enum(enum_type, constant) => {
            out.push(b'e');
            put_u16(out, pool.utf8(&format!("L{}/{};", ANNOTATIONS, enum_type)));
            put_u16(out, pool.utf8(constant));
        }
        Value::Class(type_name) => {
            out.push(b'c');
            put_u16(out, pool.utf8(&format!("L{};", internal(type_name))));
        }
    }
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Writes `Name.java` for a top-level type below `source_root`.
pub fn write_source(source_root: &Path, type_name: &str, content: &str) -> PathBuf {
    let path = source_root.join(format!("{}.java", internal(type_name)));
    write_file(&path, content.as_bytes());
    path
}

/// Packs `classes` into a jar, with `pom.properties` when `artifact` is given.
pub fn write_jar(path: &Path, classes: &[ClassBuilder], artifact: Option<(&str, &str, &str)>) {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
        zip.write_all(b"Manifest-Version: 1.0\n").unwrap();

        if let Some((group_id, artifact_id, version)) = artifact {
            zip.start_file(
                format!("META-INF/maven/{}/{}/pom.properties", group_id, artifact_id),
                options,
            )
            .unwrap();
            let properties = format!(
                "groupId={}\nartifactId={}\nversion={}\n",
                group_id, artifact_id, version
            );
            zip.write_all(properties.as_bytes()).unwrap();
        }

        for class in classes {
            zip.start_file(class.relative_path(), options).unwrap();
            zip.write_all(&class.build()).unwrap();
        }
        zip.finish().unwrap();
    }
    write_file(path, &buf);
}

/// A minimal POM; `extra` is inserted verbatim before `</project>`.
pub fn pom(group_id: &str, artifact_id: &str, version: &str, extra: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{}</groupId>
  <artifactId>{}</artifactId>
  <version>{}</version>
{}
</project>
"#,
        group_id, artifact_id, version, extra
    )
}

/// A module POM inheriting groupId and version from `../pom.xml`.
pub fn child_pom(parent_group: &str, parent_artifact: &str, version: &str, artifact_id: &str, extra: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>{}</groupId>
    <artifactId>{}</artifactId>
    <version>{}</version>
  </parent>
  <artifactId>{}</artifactId>
{}
</project>
"#,
        parent_group, parent_artifact, version, artifact_id, extra
    )
}

/// `<dependencies>` block for the given `(groupId, artifactId, version)` triples
pub fn dependencies(deps: &[(&str, &str, &str)]) -> String {
    let mut out = String::from("  <dependencies>\n");
    for (group_id, artifact_id, version) in deps {
        out.push_str(&format!(
            "    <dependency>\n      <groupId>{}</groupId>\n      <artifactId>{}</artifactId>\n      <version>{}</version>\n    </dependency>\n",
            group_id, artifact_id, version
        ));
    }
    out.push_str("  </dependencies>");
    out
}

/// `<modules>` block for an aggregator POM
pub fn modules(names: &[&str]) -> String {
    let mut out = String::from("  <packaging>pom</packaging>\n  <modules>\n");
    for name in names {
        out.push_str(&format!("    <module>{}</module>\n", name));
    }
    out.push_str("  </modules>");
    out
}

pub fn mojo_descriptor_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mojo-descriptor"))
}
