//! Extraction pipeline: scan, document, enrich, assemble
//!
//! Each phase runs to completion before the next one starts. A pipeline run
//! owns all of its intermediate state, so one `ExtractionPipeline` can be
//! reused for any number of modules.

use crate::assemble::{assemble, enrich};
use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::javadoc::{CommentLexer, DocumentationScanner, JavadocLexer};
use crate::model::PluginDescriptor;
use crate::scanner::MetadataScanner;
use crate::workspace::{load_module, ModuleContext};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct ExtractionPipeline<L = JavadocLexer> {
    scanner: MetadataScanner,
    lexer: L,
}

impl ExtractionPipeline<JavadocLexer> {
    pub fn new() -> Self {
        Self::with_lexer(JavadocLexer::new())
    }
}

impl Default for ExtractionPipeline<JavadocLexer> {
    fn default() -> Self {
        Self::new()
    }
}

fn phase<T>(name: &str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    info!("Phase: {}", name);
    let start = Instant::now();
    let result = run()?;
    debug!(
        phase = name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Phase complete"
    );
    Ok(result)
}

impl<L: CommentLexer> ExtractionPipeline<L> {
    pub fn with_lexer(lexer: L) -> Self {
        Self {
            scanner: MetadataScanner::new(),
            lexer,
        }
    }

    /// Produces the plugin descriptor for `context`.
    pub fn run(&self, context: &ModuleContext) -> Result<PluginDescriptor> {
        let start = Instant::now();
        info!(
            module = %context.artifact,
            base_dir = %context.base_dir.display(),
            "Starting descriptor extraction"
        );

        let mut types = phase("scan", || self.scanner.scan(&context.classpath))?;

        let mut docs = phase("document", || {
            let roots = context.documentation_roots(&types);
            DocumentationScanner::with_lexer(
                &self.lexer,
                context.encoding,
                context.source_filter.clone(),
            )
            .scan(&roots)
        })?;

        phase("enrich", || enrich(&mut types, &mut docs))?;

        let plugin = Arc::new(context.plugin.clone());
        let mojos = phase("assemble", || assemble(&types, Arc::clone(&plugin)))?;

        info!(
            mojos = mojos.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        Ok(PluginDescriptor {
            context: context.plugin.clone(),
            mojos,
        })
    }
}

/// Loads the module at `base_dir` and runs the default pipeline over it.
pub fn extract(
    base_dir: &Path,
    config: &ExtractorConfig,
    extra_jars: &[PathBuf],
) -> Result<PluginDescriptor> {
    let context = load_module(base_dir, config, extra_jars)?;
    ExtractionPipeline::new().run(&context)
}
