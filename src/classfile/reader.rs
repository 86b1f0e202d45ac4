use super::annotation::{parse_annotations, Annotation};
use super::{internal_to_type_name, ClassFile, ClassFileError, FieldInfo, CLASS_MAGIC};

const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";

pub(super) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(super) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(super) fn take(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::UnexpectedEof { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(super) fn u8(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.take(1)?[0])
    }

    pub(super) fn u16(&mut self) -> Result<u16, ClassFileError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(super) fn u32(&mut self) -> Result<u32, ClassFileError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[derive(Debug, Clone)]
pub(super) enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    /// Entries the reader does not need, and the second slot of long/double
    Skipped,
}

pub(super) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, ClassFileError> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        // Slot 0 is never used.
        entries.push(Constant::Skipped);

        let mut index: u16 = 1;
        while index < count {
            let tag = reader.u8()?;
            let constant = match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.take(len)?))
                }
                3 => Constant::Integer(reader.u32()? as i32),
                4 => Constant::Float(f32::from_bits(reader.u32()?)),
                5 | 6 => {
                    let high = reader.u32()? as u64;
                    let low = reader.u32()? as u64;
                    let bits = (high << 32) | low;
                    let constant = if tag == 5 {
                        Constant::Long(bits as i64)
                    } else {
                        Constant::Double(f64::from_bits(bits))
                    };
                    entries.push(constant);
                    entries.push(Constant::Skipped);
                    index = index
                        .checked_add(2)
                        .ok_or(ClassFileError::BadConstantIndex(index))?;
                    continue;
                }
                7 => Constant::Class(reader.u16()?),
                8 | 16 | 19 | 20 => {
                    reader.u16()?;
                    Constant::Skipped
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.u32()?;
                    Constant::Skipped
                }
                15 => {
                    reader.take(3)?;
                    Constant::Skipped
                }
                _ => return Err(ClassFileError::BadConstantTag { tag, index }),
            };
            entries.push(constant);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassFileError> {
        match self.entries.get(index as usize) {
            Some(Constant::Skipped) | None => Err(ClassFileError::BadConstantIndex(index)),
            Some(c) => Ok(c),
        }
    }

    pub(super) fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    pub(super) fn integer(&self, index: u16) -> Result<i32, ClassFileError> {
        match self.get(index)? {
            Constant::Integer(v) => Ok(*v),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Integer",
            }),
        }
    }

    pub(super) fn long(&self, index: u16) -> Result<i64, ClassFileError> {
        match self.get(index)? {
            Constant::Long(v) => Ok(*v),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Long",
            }),
        }
    }

    pub(super) fn float(&self, index: u16) -> Result<f64, ClassFileError> {
        match self.get(index)? {
            Constant::Float(v) => Ok(*v as f64),
            Constant::Double(v) => Ok(*v),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Float or Double",
            }),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, ClassFileError> {
        match self.get(index)? {
            Constant::Class(name_index) => Ok(internal_to_type_name(self.utf8(*name_index)?)),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Class",
            }),
        }
    }
}

/// Decodes the JVM "modified UTF-8" encoding used in the constant pool.
fn decode_modified_utf8(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i] as u16;
        if b & 0x80 == 0 {
            units.push(b);
            i += 1;
        } else if b & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            units.push(((b & 0x1F) << 6) | (bytes[i + 1] as u16 & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            units.push(
                ((b & 0x0F) << 12)
                    | ((bytes[i + 1] as u16 & 0x3F) << 6)
                    | (bytes[i + 2] as u16 & 0x3F),
            );
            i += 3;
        } else {
            units.push(0xFFFD);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}

fn read_annotation_attributes(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<Annotation>, ClassFileError> {
    let count = reader.u16()?;
    let mut annotations = Vec::new();
    for _ in 0..count {
        let name = pool.utf8(reader.u16()?)?;
        let len = reader.u32()? as usize;
        let data = reader.take(len)?;
        if name == RUNTIME_VISIBLE_ANNOTATIONS || name == RUNTIME_INVISIBLE_ANNOTATIONS {
            let mut attr = ByteReader::new(data);
            annotations.extend(parse_annotations(&mut attr, pool)?);
        }
    }
    Ok(annotations)
}

pub(super) fn parse_class(bytes: &[u8]) -> Result<ClassFile, ClassFileError> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.u32()?;
    if magic != CLASS_MAGIC {
        return Err(ClassFileError::BadMagic(magic));
    }
    let _minor = reader.u16()?;
    let major_version = reader.u16()?;

    let pool = ConstantPool::parse(&mut reader)?;

    let access_flags = reader.u16()?;
    let name = pool.class_name(reader.u16()?)?;
    let super_index = reader.u16()?;
    let super_name = if super_index == 0 {
        None
    } else {
        Some(pool.class_name(super_index)?)
    };

    let interface_count = reader.u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(reader.u16()?)?);
    }

    let field_count = reader.u16()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let access_flags = reader.u16()?;
        let name = pool.utf8(reader.u16()?)?.to_string();
        let descriptor = pool.utf8(reader.u16()?)?.to_string();
        let annotations = read_annotation_attributes(&mut reader, &pool)?;
        fields.push(FieldInfo {
            access_flags,
            name,
            descriptor,
            annotations,
        });
    }

    let method_count = reader.u16()?;
    for _ in 0..method_count {
        reader.take(6)?;
        let attr_count = reader.u16()?;
        for _ in 0..attr_count {
            reader.u16()?;
            let len = reader.u32()? as usize;
            reader.take(len)?;
        }
    }

    let annotations = read_annotation_attributes(&mut reader, &pool)?;

    Ok(ClassFile {
        major_version,
        access_flags,
        name,
        super_name,
        interfaces,
        annotations,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modified_utf8_ascii() {
        assert_eq!(decode_modified_utf8(b"timeout"), "timeout");
    }

    #[test]
    fn test_modified_utf8_encoded_nul_and_two_byte() {
        // U+0000 is encoded as C0 80, U+00E9 as C3 A9
        assert_eq!(decode_modified_utf8(&[0x61, 0xC0, 0x80, 0xC3, 0xA9]), "a\0\u{e9}");
    }

    #[test]
    fn test_modified_utf8_surrogate_pair() {
        // U+1F600 as two three-byte surrogate halves
        let bytes = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode_modified_utf8(&bytes), "\u{1F600}");
    }

    #[test]
    fn test_long_in_last_pool_slot_is_rejected() {
        // count 0xFFFF, then Integer entries up to #65533 and a Long at #65534
        let mut bytes = vec![0xFF, 0xFF];
        for _ in 1..65534u32 {
            bytes.extend_from_slice(&[3, 0, 0, 0, 0]);
        }
        bytes.push(5);
        bytes.extend_from_slice(&[0; 8]);

        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            ConstantPool::parse(&mut reader),
            Err(ClassFileError::BadConstantIndex(65534))
        ));
    }

    #[test]
    fn test_byte_reader_reports_offset_on_eof() {
        let mut reader = ByteReader::new(&[0x00, 0x01, 0x02]);
        assert_eq!(reader.u16().unwrap(), 1);
        assert_eq!(
            reader.u32(),
            Err(ClassFileError::UnexpectedEof { offset: 2 })
        );
    }
}
