//! Settings resolution: command-line flags over config file over defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use svgpure::xml::Config as ParserConfig;
use svgpure::{Allowlist, Options, Profile, Purifier, Sanitizer, DEFAULT_ROOT};

use crate::args::Args;
use crate::validator::Validator;

const DEFAULT_VALIDATOR: &str = "svgcheck";
const DEFAULT_VALIDATOR_ARGS: &[&str] = &["-r", "-q"];

/// Optional TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub profile: Option<Profile>,
    pub root: Option<String>,
    pub max_depth: Option<u16>,
    /// Added to the profile's element names
    pub elements: Vec<String>,
    /// Added to the default attribute names
    pub attributes: Vec<String>,
    pub strip_whitespace: Option<bool>,
    pub filter_root_attributes: Option<bool>,
    pub jobs: Option<usize>,
    pub validator: ValidatorConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub enabled: Option<bool>,
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Where purified documents are written
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Replace each input file
    Overwrite,
    /// Write into this directory under the input's file name
    Directory(PathBuf),
}

impl OutputMode {
    pub fn target_for(&self, input: &Path) -> Option<PathBuf> {
        match self {
            Self::Overwrite => Some(input.to_path_buf()),
            Self::Directory(dir) => input.file_name().map(|name| dir.join(name)),
        }
    }
}

/// Fully resolved run settings
#[derive(Debug)]
pub struct Settings {
    pub directory: PathBuf,
    pub purifier: Purifier,
    pub output: OutputMode,
    pub validator: Option<Validator>,
    /// 0 lets rayon pick
    pub jobs: usize,
}

impl Settings {
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self> {
        let profile = args
            .profile
            .map(Profile::from)
            .or(file.profile)
            .unwrap_or_default();

        let mut allowlist = Allowlist::for_profile(profile);
        allowlist.extend_elements(file.elements);
        allowlist.extend_elements(args.allow_elements.iter().cloned());
        allowlist.extend_attributes(file.attributes);
        allowlist.extend_attributes(args.allow_attributes.iter().cloned());

        let options = Options {
            strip_whitespace: !args.keep_whitespace && file.strip_whitespace.unwrap_or(true),
            filter_root_attributes: !args.keep_root_attributes
                && file.filter_root_attributes.unwrap_or(true),
        };
        let sanitizer = Sanitizer::new(allowlist)
            .context("unusable allow-lists")?
            .with_options(options);

        let root = args
            .root
            .clone()
            .or(file.root)
            .unwrap_or_else(|| DEFAULT_ROOT.to_string());

        let parser = ParserConfig {
            max_depth: args
                .max_depth
                .or(file.max_depth)
                .unwrap_or(ParserConfig::default().max_depth),
            ..ParserConfig::default()
        };

        let output = if args.overwrite {
            OutputMode::Overwrite
        } else {
            OutputMode::Directory(
                args.output_dir
                    .clone()
                    .unwrap_or_else(|| args.directory.join("purified")),
            )
        };

        let validator_file = file.validator;
        let validator = if args.no_validate || validator_file.enabled == Some(false) {
            None
        } else {
            let program = args
                .validator
                .clone()
                .or(validator_file.program)
                .unwrap_or_else(|| DEFAULT_VALIDATOR.to_string());
            let validator_args = if args.validator_args.is_empty() {
                validator_file.args.unwrap_or_else(|| {
                    DEFAULT_VALIDATOR_ARGS.iter().map(|s| s.to_string()).collect()
                })
            } else {
                args.validator_args.clone()
            };
            let timeout = args
                .validator_timeout
                .or(validator_file.timeout_secs)
                .map(Duration::from_secs);
            Some(Validator::new(program, validator_args).with_timeout(timeout))
        };

        Ok(Self {
            directory: args.directory.clone(),
            purifier: Purifier::new(sanitizer)
                .with_root(root)
                .with_parser_config(parser),
            output,
            validator,
            jobs: args.jobs.or(file.jobs).unwrap_or(0),
        })
    }
}
