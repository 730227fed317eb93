//! Command line parsing into a [`CatConfig`]

use crate::config::{CatConfig, Source};
use crate::error::{CatError, CatResult};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Usage text printed for `-h`/`--help`
pub const USAGE: &str = "\
usage: cat [OPTION]... [FILE]...

options:
  -b, --number-nonbreak   show line number without empty line
  -n, --number            show line number
  -s, --squeeze-blank     supress repeated empty line
  -v, --show-nonprinting  use ^ and M- notation, expect LFD and TAB
  -A, --show-all          equivalent -vET
  -E, --show-ends         print $ at end of each lines
  -T, --show-tabs         print TAB as ^I
  -e                      equivalent -vE
  -t                      equivalent -vT
  -u                      (ignored)
  -h, --help              display this help
";

fn flag(id: &'static str) -> Arg {
    Arg::new(id).action(ArgAction::SetTrue)
}

/// Build the clap command describing every accepted option
pub fn build_cli() -> Command {
    Command::new("cat")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("cat [OPTION]... [FILE]...")
        .about("Concatenate files and print on the standard output")
        .override_help(USAGE)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true)
        // Sources, `-` is standard input
        .arg(Arg::new("files")
            .num_args(0..)
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf)))
        // Numbering
        .arg(flag("number-nonblank")
            .short('b')
            .long("number-nonbreak")
            .alias("number-nonblank"))
        .arg(flag("number")
            .short('n')
            .long("number"))
        .arg(flag("squeeze-blank")
            .short('s')
            .long("squeeze-blank"))
        // Display
        .arg(flag("show-nonprinting")
            .short('v')
            .long("show-nonprinting"))
        .arg(flag("show-all")
            .short('A')
            .long("show-all"))
        .arg(flag("show-ends")
            .short('E')
            .long("show-ends"))
        .arg(flag("show-tabs")
            .short('T')
            .long("show-tabs"))
        .arg(flag("nonprinting-ends").short('e'))
        .arg(flag("nonprinting-tabs").short('t'))
        .arg(flag("unbuffered").short('u'))
        .arg(Arg::new("help")
            .short('h')
            .long("help")
            .action(ArgAction::Help))
        .arg(Arg::new("version")
            .long("version")
            .action(ArgAction::Version))
}

/// Parse a full argument vector (program name first) into a configuration
pub fn parse_args<I, T>(args: I) -> CatResult<CatConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args).map_err(config_error)?;
    config_from_matches(&matches)
}

/// Translate a clap failure into the cat error taxonomy
fn config_error(err: clap::Error) -> CatError {
    match err.kind() {
        ErrorKind::DisplayHelp => CatError::HelpRequested,
        ErrorKind::DisplayVersion => CatError::VersionRequested,
        kind => match err.get(ContextKind::InvalidArg) {
            Some(ContextValue::String(option)) => CatError::unknown_option(option),
            _ => CatError::invalid_arguments(kind.as_str().unwrap_or("invalid arguments")),
        },
    }
}

fn config_from_matches(matches: &ArgMatches) -> CatResult<CatConfig> {
    let show_all = matches.get_flag("show-all");
    let nonprinting_ends = matches.get_flag("nonprinting-ends");
    let nonprinting_tabs = matches.get_flag("nonprinting-tabs");

    let sources: Vec<Source> = matches
        .get_many::<PathBuf>("files")
        .unwrap_or_default()
        .cloned()
        .map(Source::from)
        .collect();

    let config = CatConfig::new()
        .with_number(matches.get_flag("number"))
        .with_number_nonblank(matches.get_flag("number-nonblank"))
        .with_squeeze_blank(matches.get_flag("squeeze-blank"))
        .with_show_nonprinting(
            matches.get_flag("show-nonprinting") || show_all || nonprinting_ends || nonprinting_tabs,
        )
        .with_show_ends(matches.get_flag("show-ends") || show_all || nonprinting_ends)
        .with_show_tabs(matches.get_flag("show-tabs") || show_all || nonprinting_tabs)
        .with_sources(sources);

    config.validate()?;
    log::debug!("parsed configuration: {config:?}");
    Ok(config)
}
