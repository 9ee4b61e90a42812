use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "modelbridge-inspect",
    version,
    about = "Print the methods of a reference program"
)]
pub struct InspectArgs {
    /// Path to the program file.
    pub program: PathBuf,
    /// Only print this method.
    #[arg(long)]
    pub method: Option<String>,
    /// Optional TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Load every method before printing.
    #[arg(long, default_value_t = false)]
    pub load_all: bool,
}

pub fn parse_inspect_args() -> InspectArgs {
    InspectArgs::parse()
}
