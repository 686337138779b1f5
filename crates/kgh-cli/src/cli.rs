//! Command-line surface

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use kgh_manifest::ManifestFormat;
use std::ffi::OsString;
use std::path::PathBuf;

/// Log verbosity requested on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// `--quiet`: warnings and errors only
    Quiet,
    /// No flag: `RUST_LOG` or info
    #[default]
    Normal,
    /// `-v`: debug detail
    Verbose,
}

/// Parsed invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Current manifest
    pub manifest: PathBuf,
    /// Previous manifest; listing mode when absent
    pub previous: Option<PathBuf>,
    /// Perform writes instead of a dry run
    pub apply: bool,
    /// Storage bucket override
    pub bucket: Option<String>,
    /// TOML configuration file
    pub config: Option<PathBuf>,
    /// Print the run report as JSON
    pub json: bool,
    /// Manifest format override
    pub format: Option<ManifestFormat>,
    /// Redirect removed objects to this notice
    pub orphan_notice: Option<String>,
    /// Per-call timeout override in seconds
    pub timeout_seconds: Option<u64>,
    /// Retry budget override
    pub retries: Option<u32>,
    /// Storage endpoint override
    pub endpoint: Option<String>,
    /// CDN invalidation endpoint override
    pub cdn_endpoint: Option<String>,
    /// Log verbosity
    pub verbosity: Verbosity,
}

impl Invocation {
    /// Parse from an argument list (first item is the program name)
    ///
    /// # Errors
    /// Returns the clap error for invalid usage, `--help` and `--version`.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(m: &ArgMatches) -> Self {
        let verbosity = if m.get_flag("quiet") {
            Verbosity::Quiet
        } else if m.get_flag("verbose") {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            manifest: m.get_one::<PathBuf>("manifest").cloned().unwrap_or_default(),
            previous: m.get_one::<PathBuf>("previous").cloned(),
            apply: m.get_flag("apply"),
            bucket: m.get_one::<String>("bucket").cloned(),
            config: m.get_one::<PathBuf>("config").cloned(),
            json: m.get_flag("json"),
            format: m.get_one::<String>("format").map(String::as_str).map(parse_format),
            orphan_notice: m.get_one::<String>("orphan-notice").cloned(),
            timeout_seconds: m.get_one::<u64>("timeout").copied(),
            retries: m.get_one::<u32>("retries").copied(),
            endpoint: m.get_one::<String>("endpoint").cloned(),
            cdn_endpoint: m.get_one::<String>("cdn-endpoint").cloned(),
            verbosity,
        }
    }
}

fn parse_format(name: &str) -> ManifestFormat {
    match name {
        "yaml" => ManifestFormat::Yaml,
        "lines" => ManifestFormat::Lines,
        _ => ManifestFormat::Auto,
    }
}

/// Command definition for the `kgh-redirect` binary
#[must_use]
pub fn command() -> Command {
    Command::new("kgh-redirect")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep previously published KG-Hub download URLs working after a manifest update")
        .arg(
            Arg::new("manifest")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Current manifest file"),
        )
        .arg(
            Arg::new("previous")
                .long("previous")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Previous manifest to diff against; without it, URLs are only listed"),
        )
        .arg(
            Arg::new("apply")
                .long("apply")
                .action(ArgAction::SetTrue)
                .help("Write redirects (default is a dry run)"),
        )
        .arg(
            Arg::new("bucket")
                .long("bucket")
                .value_name("NAME")
                .help("Storage bucket to target"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Output the run report as JSON"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(["auto", "yaml", "lines"])
                .help("Manifest format"),
        )
        .arg(
            Arg::new("orphan-notice")
                .long("orphan-notice")
                .value_name("URL")
                .help("Redirect removed objects to this notice page"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .help("Per-call storage timeout"),
        )
        .arg(
            Arg::new("retries")
                .long("retries")
                .value_name("N")
                .value_parser(value_parser!(u32))
                .help("Retries per storage call after the first attempt"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("URL")
                .help("S3-compatible storage endpoint"),
        )
        .arg(
            Arg::new("cdn-endpoint")
                .long("cdn-endpoint")
                .value_name("URL")
                .help("CDN invalidation endpoint"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet")
                .help("Debug logging"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Log warnings and errors only"),
        )
}
