//! Subcommand handlers; each returns the process exit code

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::commands::{ConfigArgs, ExtractArgs};
use super::output::OutputFormatter;
use crate::config::ExtractorConfig;
use crate::pipeline::ExtractionPipeline;
use crate::workspace::load_module;

pub fn handle_extract(args: &ExtractArgs, quiet: bool) -> i32 {
    info!("Starting descriptor extraction");

    let base_dir = match resolve_base_dir(args.basedir.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };
    debug!("Module directory: {}", base_dir.display());

    let mut config = ExtractorConfig::default();
    if let Some(ref encoding) = args.encoding {
        debug!("Encoding overridden to: {}", encoding);
        config.encoding = encoding.clone();
    }

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }

    match run_extract(args, &base_dir, &config) {
        Ok(goals) => {
            if !quiet {
                if let Some(ref path) = args.output {
                    eprintln!("Wrote {} goal(s) to {}", goals, path.display());
                }
            }
            0
        }
        Err(e) => {
            error!("Extraction failed: {:#}", e);
            1
        }
    }
}

fn resolve_base_dir(basedir: Option<&Path>) -> Result<PathBuf> {
    let path = match basedir {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    if !path.is_dir() {
        anyhow::bail!("Module path is not a directory: {}", path.display());
    }

    path.canonicalize()
        .with_context(|| format!("Failed to canonicalize module path {}", path.display()))
}

fn run_extract(args: &ExtractArgs, base_dir: &Path, config: &ExtractorConfig) -> Result<usize> {
    let mut context = load_module(base_dir, config, &args.classpath)
        .with_context(|| format!("Failed to load module at {}", base_dir.display()))?;

    if !args.source_roots.is_empty() {
        let roots: Vec<PathBuf> = args
            .source_roots
            .iter()
            .map(|root| {
                if root.is_absolute() {
                    root.clone()
                } else {
                    base_dir.join(root)
                }
            })
            .collect();
        debug!("Source roots overridden: {:?}", roots);
        context = context.with_source_roots(roots);
    }

    let descriptor = ExtractionPipeline::new().run(&context)?;
    let rendered = OutputFormatter::new(args.format.into()).format(&descriptor)?;

    match args.output {
        Some(ref path) => fs::write(path, &rendered)
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(descriptor.mojos.len())
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = ExtractorConfig::default();

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
    }

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(rendered) => {
            println!("{}", rendered);
            0
        }
        Err(e) => {
            error!("Failed to format configuration: {:#}", e);
            1
        }
    }
}
