//! Host protocol: the JSON document read from stdin and the two response
//! envelopes (PreToolUse and PermissionRequest).

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::GateError;
use crate::eval::{Decision, Gate, Outcome};

#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
}

#[derive(Debug, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub command: Option<String>,
}

impl HookInput {
    pub fn from_json(input: &str) -> Result<Self, GateError> {
        Ok(serde_json::from_str(input)?)
    }

    /// The command to gate, if this is a non-empty call of `tool_name`.
    pub fn gated_command(&self, tool_name: &str) -> Result<&str, GateError> {
        if self.tool_name.as_deref() != Some(tool_name) {
            return Err(GateError::ToolMismatch {
                tool: self.tool_name.clone(),
            });
        }
        match self.tool_input.as_ref().and_then(|t| t.command.as_deref()) {
            Some(command) if !command.trim().is_empty() => Ok(command),
            _ => Err(GateError::EmptyCommand),
        }
    }

    pub fn event(&self) -> Option<HookEvent> {
        self.hook_event_name.as_deref().and_then(HookEvent::from_name)
    }
}

/// Which host hook invoked us; selects the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HookEvent {
    #[default]
    PreToolUse,
    PermissionRequest,
}

impl HookEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PermissionRequest => "PermissionRequest",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PreToolUse" => Some(HookEvent::PreToolUse),
            "PermissionRequest" => Some(HookEvent::PermissionRequest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreToolUseOutput {
    pub hook_event_name: &'static str,
    pub permission_decision: &'static str,
    pub permission_decision_reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionDecision {
    pub behavior: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequestOutput {
    pub hook_event_name: &'static str,
    pub decision: PermissionDecision,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HookSpecificOutput {
    PreToolUse(PreToolUseOutput),
    PermissionRequest(PermissionRequestOutput),
}

/// The complete document written to stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

impl HookOutput {
    /// Envelope for `outcome`, or `None` when the host expects no output:
    /// allow under PreToolUse, ask under PermissionRequest (the host's own
    /// dialog is the confirmation).
    pub fn render(event: HookEvent, outcome: &Outcome) -> Option<Self> {
        let specific = match (event, outcome.decision) {
            (HookEvent::PreToolUse, Decision::Allow) => return None,
            (HookEvent::PreToolUse, decision) => {
                HookSpecificOutput::PreToolUse(PreToolUseOutput {
                    hook_event_name: event.as_str(),
                    permission_decision: decision.as_str(),
                    permission_decision_reason: outcome.reason().to_string(),
                })
            }
            (HookEvent::PermissionRequest, Decision::Ask) => return None,
            (HookEvent::PermissionRequest, Decision::Allow) => {
                HookSpecificOutput::PermissionRequest(PermissionRequestOutput {
                    hook_event_name: event.as_str(),
                    decision: PermissionDecision {
                        behavior: "allow",
                        message: None,
                    },
                })
            }
            (HookEvent::PermissionRequest, Decision::Deny) => {
                HookSpecificOutput::PermissionRequest(PermissionRequestOutput {
                    hook_event_name: event.as_str(),
                    decision: PermissionDecision {
                        behavior: "deny",
                        message: outcome.reason.clone(),
                    },
                })
            }
        };
        Some(Self {
            hook_specific_output: specific,
        })
    }

    pub fn write_to(&self, mut writer: impl Write) -> std::io::Result<()> {
        serde_json::to_writer(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Handle one raw hook input end to end.
///
/// Malformed input, other tools and empty commands are allowed without
/// analysis. `event` overrides the event named in the input.
pub fn respond(
    input: &str,
    gate: &Gate,
    tool_name: &str,
    event: Option<HookEvent>,
) -> Option<HookOutput> {
    let parsed = match HookInput::from_json(input) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("{e}, allowing command");
            let event = event.unwrap_or_default();
            return HookOutput::render(event, &Outcome::allow_silently());
        }
    };
    let event = event.or_else(|| parsed.event()).unwrap_or_default();

    let outcome = match parsed.gated_command(tool_name) {
        Ok(command) => gate.decide(command),
        Err(e) => {
            log::debug!("{e}, allowing");
            Outcome::allow_silently()
        }
    };
    log::debug!("{} -> {outcome}", event.as_str());

    if outcome.decision == Decision::Ask && event == HookEvent::PermissionRequest {
        log::info!("needs confirmation: {}", outcome.reason());
    }
    HookOutput::render(event, &outcome)
}
