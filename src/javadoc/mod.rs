//! Documentation scanner: Java sources to per-type comment records
//!
//! The scanner walks source roots, decodes each file with the configured
//! encoding and hands the text to a [`CommentLexer`]. Records are keyed by the
//! binary type name so they line up with the names coming out of class files.

pub mod lexer;
pub mod sources;

pub use lexer::JavadocLexer;
pub use sources::SourceFilter;

use crate::error::{ExtractionError, Result};
use crate::model::TypeIndex;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Comment attached to one field declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldComment {
    pub body: Option<String>,
    pub tags: HashMap<String, String>,
}

impl FieldComment {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// Documentation recovered for one type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredComment {
    pub name: String,
    pub body: Option<String>,
    /// Block tags, first occurrence wins
    pub tags: HashMap<String, String>,
    pub fields: HashMap<String, FieldComment>,
    /// Superclass, guessed from source until linked against bytecode
    pub parent: Option<String>,
}

impl StructuredComment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: None,
            tags: HashMap::new(),
            fields: HashMap::new(),
            parent: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.entry(name.into()).or_insert_with(|| value.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, comment: FieldComment) -> Self {
        self.fields.insert(name.into(), comment);
        self
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&FieldComment> {
        self.fields.get(name)
    }
}

/// Turns source text into comment records.
///
/// Implementations must be lenient: source they cannot make sense of simply
/// produces fewer records.
pub trait CommentLexer {
    fn lex(&self, source: &str) -> Vec<StructuredComment>;
}

impl<L: CommentLexer + ?Sized> CommentLexer for &L {
    fn lex(&self, source: &str) -> Vec<StructuredComment> {
        (**self).lex(source)
    }
}

/// Type name to comment record, for every type found in the scanned sources
#[derive(Debug, Clone, Default)]
pub struct DocIndex {
    records: HashMap<String, StructuredComment>,
}

impl DocIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record unless the type was already documented by an earlier root.
    pub fn insert(&mut self, record: StructuredComment) -> bool {
        if self.records.contains_key(&record.name) {
            return false;
        }
        self.records.insert(record.name.clone(), record);
        true
    }

    pub fn get(&self, name: &str) -> Option<&StructuredComment> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Points each record at the superclass recorded in bytecode.
    ///
    /// Source text only gives a best guess at the superclass (wildcard
    /// imports and nested types are not resolved), so records for scanned
    /// types take the class file's answer. Other records keep the lexer's
    /// name. Returns how many records changed.
    pub fn link_parents(&mut self, types: &TypeIndex) -> usize {
        let mut relinked = 0;
        for record in self.records.values_mut() {
            let Some(annotated) = types.get(&record.name) else {
                continue;
            };
            if record.parent != annotated.parent {
                record.parent = annotated.parent.clone();
                relinked += 1;
            }
        }
        relinked
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<StructuredComment> for DocIndex {
    fn from_iter<I: IntoIterator<Item = StructuredComment>>(iter: I) -> Self {
        let mut index = DocIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

/// Character encodings accepted for source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl SourceEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Latin1 => "ISO-8859-1",
            SourceEncoding::Ascii => "US-ASCII",
        }
    }

    /// Decodes raw file bytes; a leading UTF-8 byte order mark is dropped.
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<String, String> {
        match self {
            SourceEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
            }
            SourceEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            SourceEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(format!("non-ASCII byte at offset {}", pos)),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }
}

impl FromStr for SourceEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "UTF-8" | "UTF8" => Ok(SourceEncoding::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "LATIN-1" | "LATIN1" => Ok(SourceEncoding::Latin1),
            "US-ASCII" | "ASCII" => Ok(SourceEncoding::Ascii),
            other => Err(format!("unsupported source encoding '{}'", other)),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct DocumentationScanner<L = JavadocLexer> {
    lexer: L,
    encoding: SourceEncoding,
    filter: SourceFilter,
}

impl DocumentationScanner<JavadocLexer> {
    pub fn new(encoding: SourceEncoding, filter: SourceFilter) -> Self {
        Self::with_lexer(JavadocLexer::new(), encoding, filter)
    }
}

impl<L: CommentLexer> DocumentationScanner<L> {
    pub fn with_lexer(lexer: L, encoding: SourceEncoding, filter: SourceFilter) -> Self {
        Self {
            lexer,
            encoding,
            filter,
        }
    }

    /// Scans the given roots in order; earlier roots win on duplicate types.
    pub fn scan(&self, roots: &[PathBuf]) -> Result<DocIndex> {
        let mut index = DocIndex::new();
        for root in roots {
            self.scan_into(root, &mut index)?;
        }
        info!(
            roots = roots.len(),
            types = index.len(),
            encoding = %self.encoding,
            "Documentation scan complete"
        );
        Ok(index)
    }

    /// Adds the records of one root, returning how many were new.
    pub fn scan_into(&self, root: &Path, index: &mut DocIndex) -> Result<usize> {
        let files = self.filter.find_sources(root)?;
        if files.is_empty() {
            debug!(root = %root.display(), "No sources found");
            return Ok(0);
        }

        let mut added = 0;
        for file in &files {
            let text = self.read_source(file)?;
            for record in self.lexer.lex(&text) {
                if index.insert(record) {
                    added += 1;
                }
            }
        }

        debug!(
            root = %root.display(),
            files = files.len(),
            types = added,
            "Scanned source root"
        );
        Ok(added)
    }

    fn read_source(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.encoding
            .decode(&bytes)
            .map_err(|message| ExtractionError::SourceRead {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, message),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct FixedLexer;

    impl CommentLexer for FixedLexer {
        fn lex(&self, source: &str) -> Vec<StructuredComment> {
            vec![StructuredComment::new(source.trim()).with_body("fixed")]
        }
    }

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_link_parents_prefers_bytecode_superclass() {
        use crate::model::{AnnotatedType, ArtifactKey};

        let artifact = ArtifactKey::new("com.example", "demo-maven-plugin", "1.0");
        let types: TypeIndex = vec![
            AnnotatedType::new("com.example.Child", artifact.clone()).with_parent("com.base.Base"),
            AnnotatedType::new("com.example.Plain", artifact),
        ]
        .into_iter()
        .collect();
        let mut docs: DocIndex = vec![
            StructuredComment::new("com.example.Child").with_parent("com.example.Base"),
            StructuredComment::new("com.example.Plain").with_parent("com.example.Guess"),
            StructuredComment::new("com.example.Unscanned").with_parent("com.example.Base"),
        ]
        .into_iter()
        .collect();

        assert_eq!(docs.link_parents(&types), 2);
        assert_eq!(
            docs.get("com.example.Child").unwrap().parent.as_deref(),
            Some("com.base.Base")
        );
        assert_eq!(docs.get("com.example.Plain").unwrap().parent, None);
        assert_eq!(
            docs.get("com.example.Unscanned").unwrap().parent.as_deref(),
            Some("com.example.Base")
        );
        assert_eq!(docs.link_parents(&types), 0);
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("utf-8".parse::<SourceEncoding>().unwrap(), SourceEncoding::Utf8);
        assert_eq!("Latin1".parse::<SourceEncoding>().unwrap(), SourceEncoding::Latin1);
        assert_eq!(
            "ISO_8859_1".parse::<SourceEncoding>().unwrap(),
            SourceEncoding::Latin1
        );
        assert_eq!("ascii".parse::<SourceEncoding>().unwrap(), SourceEncoding::Ascii);
        assert!("EBCDIC".parse::<SourceEncoding>().is_err());
    }

    #[test]
    fn test_decode() {
        assert_eq!(SourceEncoding::Utf8.decode(b"\xEF\xBB\xBFclass A").unwrap(), "class A");
        assert_eq!(SourceEncoding::Latin1.decode(b"caf\xE9").unwrap(), "café");
        assert!(SourceEncoding::Utf8.decode(b"caf\xE9").is_err());
        assert!(SourceEncoding::Ascii.decode(b"caf\xE9").is_err());
    }

    #[test]
    fn test_missing_root_yields_empty_index() {
        let dir = TempDir::new().unwrap();
        let scanner = DocumentationScanner::new(SourceEncoding::Utf8, SourceFilter::default());
        let index = scanner.scan(&[dir.path().join("src/main/java")]).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_earlier_root_wins() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        write(&first, "a/A.java", b"a.A");
        write(&second, "a/A.java", b"a.A");
        write(&second, "a/B.java", b"a.B");

        let scanner =
            DocumentationScanner::with_lexer(FixedLexer, SourceEncoding::Utf8, SourceFilter::default());
        let mut index = DocIndex::new();
        assert_eq!(scanner.scan_into(&first, &mut index).unwrap(), 1);
        assert_eq!(scanner.scan_into(&second, &mut index).unwrap(), 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_undecodable_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/Bad.java", b"class Bad { String s = \"\xFF\"; }");

        let scanner = DocumentationScanner::new(SourceEncoding::Utf8, SourceFilter::default());
        match scanner.scan(&[dir.path().to_path_buf()]) {
            Err(ExtractionError::SourceRead { path, .. }) => assert!(path.ends_with("Bad.java")),
            other => panic!("Expected SourceRead, got {:?}", other),
        }
    }

    #[test]
    fn test_latin1_sources_are_lexed() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "a/Doc.java",
            b"package a; /** Caf\xE9 goal. */ public class Doc { }",
        );

        let scanner = DocumentationScanner::new(SourceEncoding::Latin1, SourceFilter::default());
        let index = scanner.scan(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(index.get("a.Doc").unwrap().body.as_deref(), Some("Café goal."));
    }
}
