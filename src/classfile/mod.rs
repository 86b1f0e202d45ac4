//! Minimal JVM class-file reader
//!
//! Only the parts needed for plugin metadata are decoded: the class name, its
//! superclass and interfaces, fields with their descriptors, and the runtime
//! (in)visible annotations attached to the class and its fields. Method bodies
//! and every other attribute are skipped.
//!
//! # Example
//!
//! ```no_run
//! use mojo_descriptor::classfile::ClassFile;
//!
//! let bytes = std::fs::read("target/classes/com/example/RunMojo.class").unwrap();
//! let class = ClassFile::parse(&bytes).unwrap();
//! println!("{} extends {:?}", class.name, class.super_name);
//! ```

mod annotation;
mod reader;

pub use annotation::{Annotation, ElementValue};

use thiserror::Error;

pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassFileError {
    #[error("bad magic number 0x{0:08X}")]
    BadMagic(u32),
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof { offset: usize },
    #[error("invalid constant pool index {0}")]
    BadConstantIndex(u16),
    #[error("unknown constant pool tag {tag} at index {index}")]
    BadConstantTag { tag: u8, index: u16 },
    #[error("constant #{index} is not a {expected}")]
    UnexpectedConstant { index: u16, expected: &'static str },
    #[error("unknown annotation element tag '{0}'")]
    BadElementTag(char),
    #[error("invalid type descriptor '{0}'")]
    InvalidDescriptor(String),
}

/// A decoded class file
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub major_version: u16,
    pub access_flags: u16,
    /// Fully-qualified, dot-separated binary name (`com.example.Outer$Inner`)
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<Annotation>,
}

impl FieldInfo {
    /// Declared Java type of the field, e.g. `java.io.File` or `java.lang.String[]`
    pub fn type_name(&self) -> Result<String, ClassFileError> {
        descriptor_to_type_name(&self.descriptor)
    }

    pub fn annotation(&self, type_descriptor: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.type_descriptor == type_descriptor)
    }
}

impl ClassFile {
    pub const ACC_INTERFACE: u16 = 0x0200;

    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFileError> {
        reader::parse_class(bytes)
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & Self::ACC_INTERFACE != 0
    }

    pub fn annotation(&self, type_descriptor: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.type_descriptor == type_descriptor)
    }
}

/// Converts an internal name (`com/example/Foo`) to a dotted name.
pub fn internal_to_type_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Converts a field descriptor (`Ljava/io/File;`, `[I`) to a Java type name.
pub fn descriptor_to_type_name(descriptor: &str) -> Result<String, ClassFileError> {
    let dims = descriptor.chars().take_while(|c| *c == '[').count();
    let base = &descriptor[dims..];

    let mut name = match base {
        "B" => "byte".to_string(),
        "C" => "char".to_string(),
        "D" => "double".to_string(),
        "F" => "float".to_string(),
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        "S" => "short".to_string(),
        "Z" => "boolean".to_string(),
        "V" if dims == 0 => "void".to_string(),
        _ if base.len() > 2 && base.starts_with('L') && base.ends_with(';') => {
            internal_to_type_name(&base[1..base.len() - 1])
        }
        _ => return Err(ClassFileError::InvalidDescriptor(descriptor.to_string())),
    };

    for _ in 0..dims {
        name.push_str("[]");
    }
    Ok(name)
}
