use super::reader::{ByteReader, ConstantPool};
use super::{descriptor_to_type_name, ClassFileError};

/// One annotation instance, e.g. `@Parameter(defaultValue = "30")`
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type (`Lorg/apache/maven/plugins/annotations/Mojo;`)
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Int(i64),
    Float(f64),
    Char(char),
    Bool(bool),
    String(String),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// A class literal, kept as its return descriptor (`Ljava/lang/Object;`)
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

impl Annotation {
    pub fn get(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ElementValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ElementValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn enum_const(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ElementValue::Enum { const_name, .. } => Some(const_name),
            _ => None,
        }
    }

    /// Type name of a class-literal element
    pub fn class(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            ElementValue::Class(descriptor) => descriptor_to_type_name(descriptor).ok(),
            _ => None,
        }
    }
}

pub(super) fn parse_annotations(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<Annotation>, ClassFileError> {
    let count = reader.u16()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(parse_annotation(reader, pool)?);
    }
    Ok(annotations)
}

fn parse_annotation(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Annotation, ClassFileError> {
    let type_descriptor = pool.utf8(reader.u16()?)?.to_string();
    let pair_count = reader.u16()?;
    let mut elements = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let name = pool.utf8(reader.u16()?)?.to_string();
        let value = parse_element_value(reader, pool)?;
        elements.push((name, value));
    }
    Ok(Annotation {
        type_descriptor,
        elements,
    })
}

fn parse_element_value(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<ElementValue, ClassFileError> {
    let tag = reader.u8()? as char;
    let value = match tag {
        'B' | 'I' | 'S' => ElementValue::Int(pool.integer(reader.u16()?)? as i64),
        'J' => ElementValue::Int(pool.long(reader.u16()?)?),
        'C' => {
            let code = pool.integer(reader.u16()?)? as u32;
            ElementValue::Char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        }
        'Z' => ElementValue::Bool(pool.integer(reader.u16()?)? != 0),
        'D' | 'F' => ElementValue::Float(pool.float(reader.u16()?)?),
        's' => ElementValue::String(pool.utf8(reader.u16()?)?.to_string()),
        'e' => {
            let type_descriptor = pool.utf8(reader.u16()?)?.to_string();
            let const_name = pool.utf8(reader.u16()?)?.to_string();
            ElementValue::Enum {
                type_descriptor,
                const_name,
            }
        }
        'c' => ElementValue::Class(pool.utf8(reader.u16()?)?.to_string()),
        '@' => ElementValue::Annotation(parse_annotation(reader, pool)?),
        '[' => {
            let count = reader.u16()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(parse_element_value(reader, pool)?);
            }
            ElementValue::Array(values)
        }
        other => return Err(ClassFileError::BadElementTag(other)),
    };
    Ok(value)
}
