use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "typedprops", about = "Typed configuration property CLI")]
pub struct Cli {
    /// Flat TOML table of raw string property values.
    #[arg(long, default_value = "properties.toml")]
    pub config: String,

    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a property parsed under the requested kind and shape.
    Get {
        name: String,

        #[arg(long, value_enum, default_value = "string")]
        kind: KindArg,

        #[arg(long, value_enum, default_value = "scalar")]
        shape: ShapeArg,
    },
    /// List the raw property names in the config file.
    Names,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    String,
    Double,
    Long,
    Int,
    Duration,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShapeArg {
    Scalar,
    List,
    Multimap,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
