//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download the files listed in a DAT manifest from an HTTP file archive.
///
/// Generate a DAT with the tool of your choice (No-Intro, Redump, Retool...),
/// then fetch the matching files. Interrupted or failed downloads resume from
/// what is already on disk the next time you run the same command.
#[derive(Parser, Debug, Clone)]
#[command(name = "datfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Input DAT file listing the wanted entries
    #[arg(short = 'i', long = "input", value_name = "DAT")]
    pub input: PathBuf,

    /// Existing directory to download into (defaults to `output_dir` from the config file)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Choose the catalog manually, even if it was detected from the DAT
    #[arg(short = 'c', long = "choose-catalog")]
    pub choose_catalog: bool,

    /// Choose the system collection manually, even if it was detected
    #[arg(short = 's', long = "choose-system")]
    pub choose_system: bool,

    /// Only list wanted entries missing from the server; download nothing
    #[arg(short = 'l', long = "list")]
    pub list_only: bool,

    /// Archive base address the catalogs are listed under
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Maximum attempts per file, including the first one (1-20)
    #[arg(short = 'r', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: Option<u32>,

    /// Print the run summary as JSON on stdout when done
    #[arg(long)]
    pub json: bool,

    /// Disable colored output (also honours NO_COLOR and TERM=dumb)
    #[arg(long)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print errors; hides progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_minimal_args_parse() {
        let args = Args::try_parse_from(["datfetch", "-i", "gb.dat", "-o", "/roms"]).unwrap();
        assert_eq!(args.input, PathBuf::from("gb.dat"));
        assert_eq!(args.output_dir, Some(PathBuf::from("/roms")));
        assert!(!args.choose_catalog);
        assert!(!args.choose_system);
        assert!(!args.list_only);
        assert_eq!(args.max_retries, None);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_input_is_required() {
        let err = Args::try_parse_from(["datfetch", "-o", "/roms"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_output_may_come_from_config() {
        let args = Args::try_parse_from(["datfetch", "-i", "gb.dat"]).unwrap();
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn test_cli_selection_and_list_flags() {
        let args = Args::try_parse_from(["datfetch", "-i", "a.dat", "-c", "-s", "-l"]).unwrap();
        assert!(args.choose_catalog);
        assert!(args.choose_system);
        assert!(args.list_only);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["datfetch", "-i", "a.dat", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_verbose_conflicts_with_quiet() {
        let err = Args::try_parse_from(["datfetch", "-i", "a.dat", "-v", "-q"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_max_retries_range() {
        let args = Args::try_parse_from(["datfetch", "-i", "a.dat", "-r", "20"]).unwrap();
        assert_eq!(args.max_retries, Some(20));

        for bad in ["0", "21"] {
            let err = Args::try_parse_from(["datfetch", "-i", "a.dat", "-r", bad]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_long_flags() {
        let args = Args::try_parse_from([
            "datfetch",
            "--input",
            "a.dat",
            "--output",
            "out",
            "--base-url",
            "http://127.0.0.1:8080/files/",
            "--json",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(args.base_url.as_deref(), Some("http://127.0.0.1:8080/files/"));
        assert!(args.json);
        assert!(args.no_color);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["datfetch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["datfetch", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
