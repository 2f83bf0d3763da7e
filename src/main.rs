//! cc-shellguard: Claude Code hook for Bash commands.
//!
//! Reads the hook JSON from stdin and writes a decision to stdout (or
//! nothing, for a silent allow). Diagnostics go to stderr. Always exits 0.

use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use cc_shellguard::config::{Config, OracleConfig};
use cc_shellguard::eval::Gate;
use cc_shellguard::hook::{self, HookEvent};
use cc_shellguard::logging;
use cc_shellguard::oracle::{CliOracle, DisabledOracle, Oracle};

#[derive(Debug, Default, Parser)]
#[command(name = "cc-shellguard", version, about)]
struct Cli {
    /// Response envelope; defaults to the input's hook_event_name.
    #[arg(long, value_enum)]
    event: Option<HookEvent>,

    /// Skip the oracle; commands no rule decides are allowed.
    #[arg(long)]
    no_oracle: bool,

    /// Oracle timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Config overlay to use instead of ~/.config/cc-shellguard/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the merged configuration as TOML and exit.
    #[arg(long)]
    dump_config: bool,

    /// Debug diagnostics.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings only.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn level_override(&self) -> Option<LevelFilter> {
        if self.verbose {
            Some(LevelFilter::Debug)
        } else if self.quiet {
            Some(LevelFilter::Warn)
        } else {
            None
        }
    }
}

fn oracle_for(config: &OracleConfig) -> Box<dyn Oracle> {
    if config.enabled {
        Box::new(CliOracle::from_config(config))
    } else {
        Box::new(DisabledOracle)
    }
}

fn try_parse(program: &OsString, tokens: &[OsString]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once(program).chain(tokens))
}

fn rejected(program: &OsString, tokens: &[OsString]) -> bool {
    matches!(try_parse(program, tokens), Err(e) if e.use_stderr())
}

/// Parse the command line, dropping the tokens clap rejects so the flags
/// that did parse still apply. Only help and version come back as `Err`.
///
/// The culprit is the first token whose prefix fails to parse and is not
/// rescued by the token after it (an option waiting for its value).
fn parse_lenient(args: Vec<OsString>) -> Result<(Cli, Vec<String>), clap::Error> {
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| OsString::from("cc-shellguard"));
    let mut rest: Vec<OsString> = args.collect();
    let mut dropped = Vec::new();

    loop {
        match try_parse(&program, &rest) {
            Ok(cli) => return Ok((cli, dropped)),
            Err(e) if !e.use_stderr() => return Err(e),
            Err(_) => {}
        }
        let culprit = (0..rest.len()).find(|&i| {
            rejected(&program, &rest[..=i])
                && (i + 1 == rest.len() || rejected(&program, &rest[..=i + 1]))
        });
        match culprit {
            Some(i) => dropped.push(rest.remove(i).to_string_lossy().into_owned()),
            None => return Ok((Cli::default(), dropped)),
        }
    }
}

fn main() {
    let (cli, dropped) = match parse_lenient(std::env::args_os().collect()) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    logging::init(cli.level_override().unwrap_or(LevelFilter::Info));
    for token in &dropped {
        log::warn!("ignoring invalid argument: {token}");
    }

    let mut config = Config::load(cli.config.as_deref());
    if cli.level_override().is_none()
        && let Some(level) = logging::parse_level(&config.settings.log_level)
    {
        logging::set_level(level);
    }
    if let Some(secs) = cli.timeout {
        config.oracle.timeout_secs = secs;
    }
    if cli.no_oracle {
        config.oracle.enabled = false;
    }

    if cli.dump_config {
        match config.to_toml() {
            Ok(toml) => print!("{toml}"),
            Err(e) => log::warn!("cannot serialize config: {e}"),
        }
        return;
    }

    let gate = Gate::from_config_or_default(&config, oracle_for(&config.oracle));

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        log::warn!("failed to read stdin: {e}");
    }

    if let Some(output) = hook::respond(&input, &gate, &config.settings.tool_name, cli.event)
        && let Err(e) = output.write_to(std::io::stdout().lock())
    {
        log::warn!("failed to write decision: {e}");
    }
}
