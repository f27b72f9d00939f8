//! Merges CLI arguments, file config and built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use datfetch_core::download::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, RetryPolicy,
};

use crate::app::config::{FileConfig, VerbositySetting};
use crate::cli::Args;

/// Effective settings for one run. CLI flags win over the file, the file over defaults.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) input: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) base_url: String,
    pub(crate) retry: RetryPolicy,
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) choose_catalog: bool,
    pub(crate) choose_system: bool,
    pub(crate) list_only: bool,
    pub(crate) json: bool,
    pub(crate) no_color: bool,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
}

pub(crate) fn resolve_settings(args: Args, file: Option<&FileConfig>) -> Result<Settings> {
    let default_file = FileConfig::default();
    let file = file.unwrap_or(&default_file);

    let output_dir = match (args.output_dir, &file.output_dir, args.list_only) {
        (Some(dir), _, _) => dir,
        (None, Some(dir), _) => dir.clone(),
        (None, None, true) => PathBuf::from("."),
        (None, None, false) => bail!(
            "No output directory given.\n  \
             Pass -o DIR or set `output_dir` in the config file"
        ),
    };

    let base_url = args
        .base_url
        .or_else(|| file.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let max_attempts = args
        .max_retries
        .or(file.max_attempts)
        .unwrap_or(DEFAULT_MAX_ATTEMPTS);
    let mut retry = RetryPolicy::with_max_attempts(max_attempts);
    if let Some(secs) = file.retry_base_delay_secs {
        retry = retry.with_base_delay(Duration::from_secs(secs));
    }
    if let Some(ms) = file.retry_jitter_ms {
        retry = retry.with_jitter(Duration::from_millis(ms));
    }

    let (mut verbose, mut quiet) = (args.verbose, args.quiet);
    if verbose == 0
        && !quiet
        && let Some(verbosity) = file.verbosity
    {
        (verbose, quiet) = match verbosity {
            VerbositySetting::Default => (0, false),
            VerbositySetting::Verbose => (1, false),
            VerbositySetting::Debug => (2, false),
            VerbositySetting::Quiet => (0, true),
        };
    }

    Ok(Settings {
        input: args.input,
        output_dir,
        base_url,
        retry,
        connect_timeout: Duration::from_secs(
            file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
        ),
        read_timeout: file.read_timeout_secs.map(Duration::from_secs),
        choose_catalog: args.choose_catalog,
        choose_system: args.choose_system,
        list_only: args.list_only,
        json: args.json,
        no_color: args.no_color,
        verbose,
        quiet,
    })
}

/// Default tracing level; `RUST_LOG` takes precedence when set.
pub(crate) fn resolve_default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
