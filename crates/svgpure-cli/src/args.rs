use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "svgpure",
    version,
    about = "Remove all unnecessary elements, attributes and whitespace from SVG files"
)]
pub struct Args {
    /// Directory of the SVG files to purify
    #[arg(short, long, value_name = "DIR")]
    pub directory: PathBuf,
    /// Element vocabulary to keep (default: broad)
    #[arg(short, long, value_enum)]
    pub profile: Option<ProfileArg>,
    /// TOML file with allow-list and validator settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Extra element name to keep (repeatable)
    #[arg(long = "allow-element", value_name = "NAME")]
    pub allow_elements: Vec<String>,
    /// Extra attribute name to keep (repeatable)
    #[arg(long = "allow-attribute", value_name = "NAME")]
    pub allow_attributes: Vec<String>,
    /// Tag name of the element to purify and emit (default: svg)
    #[arg(long, value_name = "NAME")]
    pub root: Option<String>,
    /// Reject documents nested deeper than this (default: 256)
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u16>,
    /// Leave whitespace inside text untouched
    #[arg(long)]
    pub keep_whitespace: bool,
    /// Don't apply the attribute allow-list to the root element
    #[arg(long)]
    pub keep_root_attributes: bool,
    /// Write each result back over its original file
    #[arg(short, long, conflicts_with = "output_dir")]
    pub overwrite: bool,
    /// Where to write results (default: DIR/purified)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Skip the external validator
    #[arg(long)]
    pub no_validate: bool,
    /// Validator program run on every written file (default: svgcheck)
    #[arg(long, value_name = "PROGRAM")]
    pub validator: Option<String>,
    /// Argument passed to the validator before the file path (repeatable)
    #[arg(long = "validator-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub validator_args: Vec<String>,
    /// Kill the validator after this many seconds
    #[arg(long, value_name = "SECS")]
    pub validator_timeout: Option<u64>,
    /// Worker threads (default: one per core)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProfileArg {
    Broad,
    Minimal,
}

impl From<ProfileArg> for svgpure::Profile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Broad => svgpure::Profile::Broad,
            ProfileArg::Minimal => svgpure::Profile::Minimal,
        }
    }
}
