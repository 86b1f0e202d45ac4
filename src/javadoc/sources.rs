use crate::error::{ExtractionError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_INCLUDE: &str = "**/*.java";

/// Version-control and editor droppings that are never treated as sources
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/CVS/**",
    "**/.cvsignore",
    "**/.svn/**",
    "**/.git/**",
    "**/.gitignore",
    "**/.gitattributes",
    "**/.hg/**",
    "**/.bzr/**",
    "**/_darcs/**",
    "**/.DS_Store",
];

/// Include/exclude matcher for source files below a source root
#[derive(Debug, Clone)]
pub struct SourceFilter {
    include_set: GlobSet,
    exclude_set: GlobSet,
}

impl SourceFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        let includes = if includes.is_empty() {
            vec![DEFAULT_INCLUDE.to_string()]
        } else {
            includes.to_vec()
        };

        let mut all_excludes: Vec<String> =
            DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        all_excludes.extend(excludes.iter().cloned());

        Ok(Self {
            include_set: build_globset(&includes)?,
            exclude_set: build_globset(&all_excludes)?,
        })
    }

    pub fn matches(&self, relative: &str) -> bool {
        !self.exclude_set.is_match(relative) && self.include_set.is_match(relative)
    }

    /// Matching files below `root`, sorted. A missing root yields nothing.
    pub fn find_sources(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                let message = e.to_string();
                ExtractionError::SourceRead {
                    path,
                    source: e.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, message)
                    }),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            let rel_str = relative.to_string_lossy().replace('\\', "/");
            if self.matches(&rel_str) {
                found.push(path.to_path_buf());
            }
        }
        Ok(found)
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self::new(&[], &[]).unwrap_or_else(|_| Self {
            include_set: GlobSet::empty(),
            exclude_set: GlobSet::empty(),
        })
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ExtractionError::SourcePattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ExtractionError::SourcePattern {
        pattern: patterns.join(","),
        message: e.to_string(),
    })
}
