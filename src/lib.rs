//! mojo-descriptor - Maven plugin descriptor extraction
//!
//! This library turns the compiled classes of a Maven plugin module into plugin
//! descriptors. Annotation metadata comes from class files; descriptions,
//! `@since` and `@deprecated` come from the Javadoc of the module's sources and
//! of sibling modules in the same reactor.
//!
//! # Core Concepts
//!
//! - **Annotated Type**: what the metadata scanner records for one class, its
//!   `@Mojo`, `@Execute`, `@Parameter` and `@Component` annotations included
//! - **Structured Comment**: the Javadoc of one type and its fields, keyed by
//!   the binary type name
//! - **Mojo Descriptor**: one goal with its inherited parameters and
//!   collaborators, ready for a descriptor writer
//!
//! # Example Usage
//!
//! ```no_run
//! use mojo_descriptor::{extract, ExtractorConfig};
//! use std::path::Path;
//!
//! let config = ExtractorConfig::default();
//! let descriptor = extract(Path::new("my-maven-plugin"), &config, &[])?;
//!
//! for mojo in &descriptor.mojos {
//!     println!("{} ({} parameters)", mojo.qualified_goal(), mojo.parameters.len());
//! }
//! # Ok::<(), mojo_descriptor::ExtractionError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`scanner`]: class-file scanning into a [`model::TypeIndex`]
//! - [`javadoc`]: source scanning into a [`javadoc::DocIndex`]
//! - [`resolve`]: tag inheritance and field merging along superclass chains
//! - [`assemble`]: documentation enrichment and descriptor assembly
//! - [`pipeline`]: the four phases wired together
//! - [`workspace`]: module context loaded from a Maven reactor

pub mod assemble;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod error;
pub mod javadoc;
pub mod model;
pub mod pipeline;
pub mod resolve;
pub mod scanner;
pub mod util;
pub mod workspace;

pub use config::{ConfigError, ExtractorConfig};
pub use error::{ExtractionError, Result};
pub use model::{MojoDescriptor, PluginContext, PluginDescriptor};
pub use pipeline::{extract, ExtractionPipeline};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use workspace::{load_module, ModuleContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_mojo_descriptor() {
        assert_eq!(NAME, "mojo-descriptor");
    }
}
