//! cc-shellguard: a Claude Code hook that gates Bash commands before they run.
//!
//! Each proposed command gets exactly one [`eval::Decision`]: allow, ask or
//! deny. Cheap deterministic checks run first; an external reasoning oracle
//! is consulted only for commands they have no opinion on.
//!
//! # Pipeline
//!
//! 1. **Forbidden rules** ([`rules`]): a matching pattern denies outright,
//!    regardless of anything below.
//! 2. **Caution rules**: a matching pattern asks for confirmation. The oracle
//!    is not consulted.
//! 3. **Allow-list**: simple commands (see [`parse::is_simple`]) whose leading
//!    verb or verb phrase is listed are allowed.
//! 4. **Oracle** ([`oracle`]): `SAFE:` allows, `UNSAFE:` denies.
//!
//! # Fail-open
//!
//! Infrastructure failures never block the agent. Malformed input, a
//! missing oracle, a timeout, a non-zero exit or an unparseable answer all
//! end in allow, with the cause recorded as the reason. In that degraded
//! mode a genuinely unsafe command that no deterministic rule catches will
//! be allowed. This is a known limitation, traded for availability.
//!
//! # Modules
//!
//! - **[`rules`]**: rule store and the human-readable rules document.
//! - **[`parse`]**: simple-command test and leading-verb extraction.
//! - **[`eval`]**: deterministic policy engine and the decision composer ([`eval::Gate`]).
//! - **[`oracle`]**: oracle trait, response parsing, CLI-backed oracle.
//! - **[`hook`]**: stdin/stdout JSON envelopes.
//! - **[`config`]**: embedded defaults + user overlay merge.
//! - **[`logging`]**: stderr diagnostics.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error types for every layer.
pub mod error;
/// Policy engine, decision types, decision composer.
pub mod eval;
/// Hook input/output envelopes.
pub mod hook;
/// Stderr diagnostics via simplelog.
pub mod logging;
/// External reasoning oracle.
pub mod oracle;
/// Command classification: simplicity and leading verb.
pub mod parse;
/// Forbidden/caution rules and the allow-list.
pub mod rules;

use eval::{Gate, Outcome};
use oracle::Oracle;

/// Decide a single command with the default configuration and the given oracle.
///
/// This is the main entry point for tests and simple usage. The CLI builds
/// the [`Gate`] from the merged user configuration instead.
pub fn evaluate(command: &str, oracle: Box<dyn Oracle>) -> Result<Outcome, error::GateError> {
    let config = config::Config::default_config();
    let gate = Gate::from_config(&config, oracle)?;
    Ok(gate.decide(command))
}
