//! Error taxonomy.
//!
//! Every variant is recovered locally by the layer that produces it and
//! turned into that layer's safe default; none of them ever reach the host
//! as a crash or a non-zero exit.

use std::path::PathBuf;
use std::time::Duration;

/// Errors raised outside the oracle boundary.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The hook input on stdin was not the expected JSON document.
    #[error("malformed hook input: {0}")]
    MalformedInput(#[from] serde_json::Error),

    /// The tool call is not the gated command-execution tool.
    #[error("not a gated tool: {}", .tool.as_deref().unwrap_or("<none>"))]
    ToolMismatch { tool: Option<String> },

    #[error("empty command")]
    EmptyCommand,

    /// The rules document could not be read; a placeholder is shown instead.
    #[error("rules file {} unavailable: {source}", .path.display())]
    RuleSourceMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Why the oracle could not give an authoritative verdict.
///
/// The `Display` text becomes the reason on the fail-open `Allow`.
#[derive(Debug, thiserror::Error)]
pub enum OracleUnavailable {
    #[error("oracle disabled")]
    Disabled,

    #[error("oracle CLI not available: {program}")]
    NotFound { program: String },

    #[error("oracle CLI error (exit {})", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("analysis timeout after {}s", .after.as_secs_f32())]
    Timeout { after: Duration },

    #[error("unexpected oracle response format")]
    UnexpectedResponse { response: String },

    #[error("oracle invocation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("oracle runtime unavailable: {0}")]
    Runtime(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_display() {
        let e = OracleUnavailable::NonZeroExit {
            code: Some(2),
            stderr: "boom".into(),
        };
        assert_eq!(e.to_string(), "oracle CLI error (exit 2)");
        let e = OracleUnavailable::NonZeroExit {
            code: None,
            stderr: String::new(),
        };
        assert_eq!(e.to_string(), "oracle CLI error (exit signal)");
    }

    #[test]
    fn timeout_display() {
        let e = OracleUnavailable::Timeout {
            after: Duration::from_secs(10),
        };
        assert_eq!(e.to_string(), "analysis timeout after 10s");
    }

    #[test]
    fn tool_mismatch_display() {
        let e = GateError::ToolMismatch {
            tool: Some("Edit".into()),
        };
        assert_eq!(e.to_string(), "not a gated tool: Edit");
        let e = GateError::ToolMismatch { tool: None };
        assert_eq!(e.to_string(), "not a gated tool: <none>");
    }
}
