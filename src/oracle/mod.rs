//! External reasoning oracle consulted when no deterministic rule decides.
//!
//! Only an explicit `SAFE:` or `UNSAFE:` answer is authoritative. Everything
//! else is [`OracleVerdict::Indeterminate`], which the gate turns into an
//! allow. That is a fail-open choice: a missing, slow or confused oracle
//! never blocks the agent, and an unsafe command slips through in that
//! degraded mode.

pub mod cli;
pub mod prompt;

pub use cli::CliOracle;

use crate::error::OracleUnavailable;

const SAFE_PREFIX: &str = "SAFE:";
const UNSAFE_PREFIX: &str = "UNSAFE:";

/// Result of one oracle consultation.
#[derive(Debug)]
pub enum OracleVerdict {
    Safe(String),
    Unsafe(String),
    Indeterminate(OracleUnavailable),
}

/// A source of safety verdicts for commands the rules have no opinion on.
///
/// Implementations make at most one attempt per call and never retry.
pub trait Oracle: Send + Sync {
    fn evaluate(&self, command: &str) -> OracleVerdict;
}

/// Oracle that is never consulted; every verdict is indeterminate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOracle;

impl Oracle for DisabledOracle {
    fn evaluate(&self, _command: &str) -> OracleVerdict {
        OracleVerdict::Indeterminate(OracleUnavailable::Disabled)
    }
}

/// Classify raw oracle output. Leading and trailing whitespace is ignored.
pub fn parse_response(output: &str) -> OracleVerdict {
    let response = output.trim();
    if let Some(reason) = response.strip_prefix(SAFE_PREFIX) {
        OracleVerdict::Safe(reason.trim().to_string())
    } else if let Some(reason) = response.strip_prefix(UNSAFE_PREFIX) {
        OracleVerdict::Unsafe(reason.trim().to_string())
    } else {
        OracleVerdict::Indeterminate(OracleUnavailable::UnexpectedResponse {
            response: response.to_string(),
        })
    }
}

/// First `max` characters of `s`, for diagnostics.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_response() {
        match parse_response("SAFE: Read-only directory listing\n") {
            OracleVerdict::Safe(reason) => assert_eq!(reason, "Read-only directory listing"),
            other => panic!("expected Safe, got {other:?}"),
        }
    }

    #[test]
    fn unsafe_response() {
        match parse_response("  UNSAFE:   Deletes entire filesystem") {
            OracleVerdict::Unsafe(reason) => assert_eq!(reason, "Deletes entire filesystem"),
            other => panic!("expected Unsafe, got {other:?}"),
        }
    }

    #[test]
    fn empty_reason_is_still_authoritative() {
        assert!(matches!(parse_response("SAFE:"), OracleVerdict::Safe(r) if r.is_empty()));
    }

    #[test]
    fn prose_before_token_is_indeterminate() {
        let verdict = parse_response("I think this is SAFE: it only lists files");
        assert!(matches!(
            verdict,
            OracleVerdict::Indeterminate(OracleUnavailable::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn lowercase_is_indeterminate() {
        assert!(matches!(
            parse_response("safe: fine"),
            OracleVerdict::Indeterminate(_)
        ));
    }

    #[test]
    fn empty_output_is_indeterminate() {
        assert!(matches!(parse_response(""), OracleVerdict::Indeterminate(_)));
    }

    #[test]
    fn disabled_oracle() {
        assert!(matches!(
            DisabledOracle.evaluate("ls"),
            OracleVerdict::Indeterminate(OracleUnavailable::Disabled)
        ));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ab", 10), "ab");
    }
}
