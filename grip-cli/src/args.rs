use clap::{Arg, ArgAction, Command, CommandFactory, Parser, ValueEnum};
use grip::{ConfigOverrides, EncodingMode, SearchError};
use std::io::IsTerminal;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "grip",
    author,
    version,
    about = "Recursively search a directory tree for lines containing a piece of text",
    override_usage = "grip <SEARCH_TEXT> <SEARCH_DIR> [OPTIONS]\n       grip usage",
    disable_help_flag = true
)]
pub struct Cli {
    /// The text to search for (literal and case-sensitive)
    pub search_text: Option<String>,

    /// Directory to search in; use '.' for the current directory
    pub directory: Option<PathBuf>,

    /// Search hidden directories as well (hidden files are always searched)
    #[arg(short = 'h', long = "hidden")]
    pub hidden: bool,

    /// Print a summary once the search completes
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Number of worker threads (default: CPU cores)
    #[arg(short = 'j', long)]
    pub threads: Option<NonZeroUsize>,

    /// How to handle invalid UTF-8 sequences (lossy|failfast)
    #[arg(long, value_parser = parse_encoding)]
    pub encoding: Option<EncodingMode>,

    /// When to color output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Configuration file to load on top of the default locations
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// Command-line values for [`grip::SearchConfig::merge_with_cli`]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            search_text: self.search_text.clone(),
            root_path: self.directory.clone(),
            include_hidden: self.hidden,
            verbose: self.verbose,
            thread_count: self.threads,
            encoding_mode: self.encoding,
            log_level: self.log_level.clone(),
        }
    }

    /// Both positional arguments were given
    pub fn has_request(&self) -> bool {
        self.search_text.is_some() && self.directory.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Sets the process-wide coloring for `colored`
    pub fn apply(self) {
        let enabled = match self {
            ColorChoice::Auto => std::io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        colored::control::set_override(enabled);
    }
}

fn parse_encoding(value: &str) -> Result<EncodingMode, String> {
    value.parse().map_err(|e: SearchError| e.to_string())
}

/// The first argument asks for usage text instead of a search
pub fn wants_usage(args: &[String]) -> bool {
    args.get(1).is_some_and(|arg| arg == "usage")
}

/// Search text and directory
const POSITIONALS: usize = 2;

/// Separates options the parser doesn't know from everything else.
///
/// Unknown options are reported and ignored instead of aborting the run, so they are
/// taken out before `clap` sees the arguments. Until both positionals are filled, any
/// argument that is not a known option fills the next one, even if it starts with `-`
/// (`grip -> src` searches for `->`). Once both are filled, further unknown options and
/// surplus arguments are unrecognized. Everything after `--` is positional.
///
/// The kept arguments come back as the program name, the known options with their
/// values, then `--` and the positionals, so `clap` never reads a positional as a flag.
pub fn split_unrecognized<I>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut command = Cli::command();
    command.build();

    let mut options = Vec::new();
    let mut positionals = Vec::new();
    let mut unrecognized = Vec::new();
    let mut args = args.into_iter();
    let program = args.next();

    let mut positional_only = false;
    while let Some(arg) = args.next() {
        let shape = if positional_only || arg == "-" || !arg.starts_with('-') {
            None
        } else if arg == "--" {
            positional_only = true;
            continue;
        } else {
            option_shape(&command, &arg)
        };

        match shape {
            Some(OptionShape::NeedsValue) => match args.next() {
                Some(value) => {
                    options.push(arg);
                    options.push(value);
                }
                None => unrecognized.push(arg),
            },
            Some(OptionShape::Complete) => options.push(arg),
            None if positionals.len() < POSITIONALS => positionals.push(arg),
            None => unrecognized.push(arg),
        }
    }

    let mut kept: Vec<String> = program.into_iter().collect();
    kept.extend(options);
    if !positionals.is_empty() {
        kept.push("--".to_string());
        kept.extend(positionals);
    }
    (kept, unrecognized)
}

#[derive(Debug, PartialEq, Eq)]
enum OptionShape {
    /// Flag, or option with its value attached
    Complete,
    /// Option whose value is the next argument
    NeedsValue,
}

fn option_shape(command: &Command, arg: &str) -> Option<OptionShape> {
    if let Some(long) = arg.strip_prefix("--") {
        let (name, inline_value) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        let known = command
            .get_arguments()
            .find(|a| a.get_long() == Some(name))?;
        return Some(if takes_value(known) && !inline_value {
            OptionShape::NeedsValue
        } else {
            OptionShape::Complete
        });
    }

    // Short cluster such as `-hv` or `-j4`
    let cluster = arg.strip_prefix('-')?;
    for (index, short) in cluster.char_indices() {
        let known = command
            .get_arguments()
            .find(|a| a.get_short() == Some(short))?;
        if takes_value(known) {
            let value_attached = index + short.len_utf8() < cluster.len();
            return Some(if value_attached {
                OptionShape::Complete
            } else {
                OptionShape::NeedsValue
            });
        }
    }
    Some(OptionShape::Complete)
}

fn takes_value(arg: &Arg) -> bool {
    arg.get_action().takes_values()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_options_are_split_out() {
        let (kept, unrecognized) =
            split_unrecognized(args(&["grip", "hello", ".", "-x", "-h", "--nope", "-v"]));
        assert_eq!(kept, args(&["grip", "-h", "-v", "--", "hello", "."]));
        assert_eq!(unrecognized, args(&["-x", "--nope"]));
    }

    #[test]
    fn test_option_values_are_kept_with_their_option() {
        let (kept, unrecognized) = split_unrecognized(args(&[
            "grip",
            "--threads",
            "4",
            "hello",
            "--encoding=failfast",
            "dir",
            "-j2",
        ]));
        assert_eq!(
            kept,
            args(&["grip", "--threads", "4", "--encoding=failfast", "-j2", "--", "hello", "dir"])
        );
        assert!(unrecognized.is_empty());
    }

    #[test]
    fn test_short_clusters() {
        let (kept, unrecognized) = split_unrecognized(args(&["grip", "a", "b", "-hv", "-hz"]));
        assert_eq!(kept, args(&["grip", "-hv", "--", "a", "b"]));
        assert_eq!(unrecognized, args(&["-hz"]));
    }

    #[test]
    fn test_double_dash_makes_rest_positional() {
        let (kept, unrecognized) = split_unrecognized(args(&["grip", "-v", "--", "-x", "dir"]));
        assert_eq!(kept, args(&["grip", "-v", "--", "-x", "dir"]));
        assert!(unrecognized.is_empty());
    }

    #[test]
    fn test_surplus_arguments_are_unrecognized() {
        let (kept, unrecognized) =
            split_unrecognized(args(&["grip", "hello", "dir", "extra", "-v", "more"]));
        assert_eq!(kept, args(&["grip", "-v", "--", "hello", "dir"]));
        assert_eq!(unrecognized, args(&["extra", "more"]));

        let cli = Cli::parse_from(kept);
        assert_eq!(cli.search_text.as_deref(), Some("hello"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_hyphenated_search_text_fills_positional() {
        for text in ["->", "-1", "--flag"] {
            let (kept, unrecognized) =
                split_unrecognized(args(&["grip", text, "src", "--color", "never"]));
            assert!(unrecognized.is_empty(), "{} was dropped", text);

            let cli = Cli::parse_from(kept);
            assert_eq!(cli.search_text.as_deref(), Some(text));
            assert_eq!(cli.directory, Some(PathBuf::from("src")));
            assert_eq!(cli.color, ColorChoice::Never);
        }
    }

    #[test]
    fn test_known_flag_before_positionals_stays_a_flag() {
        let (kept, unrecognized) = split_unrecognized(args(&["grip", "-h", "hello", "src"]));
        assert!(unrecognized.is_empty());

        let cli = Cli::parse_from(kept);
        assert!(cli.hidden);
        assert_eq!(cli.search_text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_option_missing_its_value_is_unrecognized() {
        let (kept, unrecognized) = split_unrecognized(args(&["grip", "a", "b", "--threads"]));
        assert_eq!(kept, args(&["grip", "--", "a", "b"]));
        assert_eq!(unrecognized, args(&["--threads"]));
    }

    #[test]
    fn test_parse_flags_and_positionals() {
        let cli = Cli::parse_from(args(&["grip", "hello", "src", "-h", "-v", "--color", "never"]));
        assert_eq!(cli.search_text.as_deref(), Some("hello"));
        assert_eq!(cli.directory, Some(PathBuf::from("src")));
        assert!(cli.hidden);
        assert!(cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert!(cli.has_request());

        let overrides = cli.overrides();
        assert!(overrides.include_hidden);
        assert_eq!(overrides.search_text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_missing_directory() {
        let cli = Cli::parse_from(args(&["grip", "hello"]));
        assert!(!cli.has_request());
    }

    #[test]
    fn test_wants_usage() {
        assert!(wants_usage(&args(&["grip", "usage"])));
        assert!(wants_usage(&args(&["grip", "usage", "dir"])));
        assert!(!wants_usage(&args(&["grip", "hello", "usage"])));
        assert!(!wants_usage(&args(&["grip"])));
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }
}
