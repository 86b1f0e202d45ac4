use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Maven plugin descriptor extractor
#[derive(Parser, Debug)]
#[command(
    name = "mojo-descriptor",
    about = "Extract Maven plugin descriptors from annotated classes and their Javadoc",
    version,
    author,
    long_about = "mojo-descriptor reads the compiled classes of a Maven plugin module, \
                  collects the @Mojo, @Parameter and @Component annotations and merges \
                  them with the Javadoc found in the module's sources and its reactor \
                  siblings. The result is one descriptor per goal."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Extract the plugin descriptor of a Maven module",
        long_about = "Scans the module's compiled classes, reads Javadoc from its sources \
                      and writes the assembled plugin descriptor.\n\n\
                      Examples:\n  \
                      mojo-descriptor extract\n  \
                      mojo-descriptor extract /path/to/plugin --format json\n  \
                      mojo-descriptor extract --classpath lib/maven-core.jar -o plugin.yaml -f yaml"
    )]
    Extract(ExtractArgs),

    #[command(
        about = "Show the effective configuration",
        long_about = "Prints the configuration assembled from MOJO_DESCRIPTOR_* environment \
                      variables and defaults.\n\n\
                      Examples:\n  \
                      mojo-descriptor config\n  \
                      mojo-descriptor config --format json"
    )]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(
        value_name = "BASEDIR",
        help = "Path to the plugin module (defaults to current directory)"
    )]
    pub basedir: Option<PathBuf>,

    #[arg(
        long = "classpath",
        value_name = "JAR",
        help = "Additional jar to scan after the module classes (repeatable)"
    )]
    pub classpath: Vec<PathBuf>,

    #[arg(
        long = "source-root",
        value_name = "DIR",
        help = "Source root to read Javadoc from, replacing the POM's (repeatable)"
    )]
    pub source_roots: Vec<PathBuf>,

    #[arg(long, value_name = "ENCODING", help = "Source file encoding")]
    pub encoding: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
