//! Metadata scanner: compiled classpath roots to a `TypeIndex`
//!
//! Every root is either a directory of `.class` files or a jar. Each root is
//! tagged with the artifact that produced it so the documentation scanner can
//! later find the matching source roots.

pub mod annotations;

use crate::classfile::ClassFile;
use crate::error::{ExtractionError, Result, RootFailure};
use crate::model::{ArtifactKey, TypeIndex};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Upper bound on the buffer reserved up front for a jar entry; the size a
/// jar claims for an entry is not trusted beyond this.
const MAX_ENTRY_PREALLOC: u64 = 1 << 20;

fn entry_capacity(claimed: u64) -> usize {
    claimed.min(MAX_ENTRY_PREALLOC) as usize
}

/// One compiled-output location on the plugin classpath
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathRoot {
    pub path: PathBuf,
    pub artifact: ArtifactKey,
}

impl ClasspathRoot {
    pub fn new(path: impl Into<PathBuf>, artifact: ArtifactKey) -> Self {
        Self {
            path: path.into(),
            artifact,
        }
    }

    pub fn is_jar(&self) -> bool {
        self.path.is_file()
    }
}

enum RootError {
    Unreadable(String),
    Fatal(ExtractionError),
}

impl From<ExtractionError> for RootError {
    fn from(err: ExtractionError) -> Self {
        RootError::Fatal(err)
    }
}

#[derive(Debug, Default)]
struct RootStats {
    classes: usize,
    shadowed: usize,
}

#[derive(Debug, Default)]
pub struct MetadataScanner;

impl MetadataScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scans every root in classpath order.
    ///
    /// Unreadable roots do not stop the scan; they are collected and returned
    /// together once every root has been attempted.
    pub fn scan(&self, roots: &[ClasspathRoot]) -> Result<TypeIndex> {
        let start = Instant::now();
        info!(roots = roots.len(), "Scanning classpath roots");

        let mut index = TypeIndex::new();
        let mut failures = Vec::new();

        for root in roots {
            let mut stats = RootStats::default();
            let outcome = if root.is_jar() {
                self.scan_jar(root, &mut index, &mut stats)
            } else {
                self.scan_directory(root, &mut index, &mut stats)
            };

            match outcome {
                Ok(()) => debug!(
                    root = %root.path.display(),
                    artifact = %root.artifact,
                    classes = stats.classes,
                    shadowed = stats.shadowed,
                    "Scanned classpath root"
                ),
                Err(RootError::Unreadable(reason)) => {
                    warn!(root = %root.path.display(), reason = %reason, "Unreadable classpath root");
                    failures.push(RootFailure {
                        path: root.path.clone(),
                        reason,
                    });
                }
                Err(RootError::Fatal(err)) => return Err(err),
            }
        }

        if !failures.is_empty() {
            return Err(ExtractionError::UnreadableRoots { failures });
        }

        info!(
            types = index.len(),
            mojos = index.mojo_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Classpath scan complete"
        );
        Ok(index)
    }

    fn scan_directory(
        &self,
        root: &ClasspathRoot,
        index: &mut TypeIndex,
        stats: &mut RootStats,
    ) -> std::result::Result<(), RootError> {
        if !root.path.is_dir() {
            return Err(RootError::Unreadable("no such file or directory".to_string()));
        }

        for entry in WalkDir::new(&root.path).sort_by_file_name() {
            let entry = entry.map_err(|e| RootError::Unreadable(e.to_string()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_scannable_class(path.to_string_lossy().as_ref())
            {
                continue;
            }

            let bytes = fs::read(path).map_err(|e| {
                RootError::Unreadable(format!("{}: {}", path.display(), e))
            })?;
            self.add_class(&bytes, &path.display().to_string(), root, index, stats)?;
        }
        Ok(())
    }

    fn scan_jar(
        &self,
        root: &ClasspathRoot,
        index: &mut TypeIndex,
        stats: &mut RootStats,
    ) -> std::result::Result<(), RootError> {
        let file = File::open(&root.path).map_err(|e| RootError::Unreadable(e.to_string()))?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| RootError::Unreadable(e.to_string()))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| RootError::Unreadable(e.to_string()))?;
            let name = entry.name().to_string();
            if !entry.is_file() || name.starts_with("META-INF/") || !is_scannable_class(&name) {
                continue;
            }

            let mut bytes = Vec::with_capacity(entry_capacity(entry.size()));
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| RootError::Unreadable(format!("{}: {}", name, e)))?;
            let location = format!("{}!/{}", root.path.display(), name);
            self.add_class(&bytes, &location, root, index, stats)?;
        }
        Ok(())
    }

    fn add_class(
        &self,
        bytes: &[u8],
        location: &str,
        root: &ClasspathRoot,
        index: &mut TypeIndex,
        stats: &mut RootStats,
    ) -> Result<()> {
        let class = ClassFile::parse(bytes).map_err(|source| ExtractionError::MalformedClass {
            location: location.to_string(),
            source,
        })?;
        let annotated = annotations::to_annotated_type(&class, &root.artifact)?;

        if let Some(mojo) = &annotated.mojo {
            debug!(goal = %mojo.goal, type_name = %annotated.name, "Found mojo");
        }

        stats.classes += 1;
        if !index.insert(annotated) {
            stats.shadowed += 1;
            debug!(type_name = %class.name, location, "Type already defined earlier on the classpath");
        }
        Ok(())
    }
}

fn is_scannable_class(path: &str) -> bool {
    path.ends_with(".class")
        && !path.ends_with("module-info.class")
        && !path.ends_with("package-info.class")
}

/// Convenience for callers that only have a single class directory.
pub fn scan_directory(path: &Path, artifact: ArtifactKey) -> Result<TypeIndex> {
    MetadataScanner::new().scan(&[ClasspathRoot::new(path, artifact)])
}
