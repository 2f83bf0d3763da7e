use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Decision {
    Allow,
    Ask,
    Deny,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Ask => "ask",
            Decision::Deny => "deny",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Ask => "ASK",
            Decision::Deny => "DENY",
        }
    }
}

/// Final result of the pipeline: a decision plus an optional reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub decision: Decision,
    pub reason: Option<String>,
}

impl Outcome {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Allow,
            reason: Some(reason.into()),
        }
    }

    /// Allow without comment (non-gated tool, empty command).
    pub fn allow_silently() -> Self {
        Self {
            decision: Decision::Allow,
            reason: None,
        }
    }

    pub fn ask(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Ask,
            reason: Some(reason.into()),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Deny,
            reason: Some(reason.into()),
        }
    }

    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.decision.label()),
            None => f.write_str(self.decision.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        assert_eq!(Outcome::allow("ok").decision, Decision::Allow);
        assert_eq!(Outcome::ask("hm").decision, Decision::Ask);
        assert_eq!(Outcome::deny("no").reason(), "no");
        assert_eq!(Outcome::allow_silently().reason, None);
    }

    #[test]
    fn display() {
        assert_eq!(Outcome::deny("rm command forbidden").to_string(), "DENY: rm command forbidden");
        assert_eq!(Outcome::allow_silently().to_string(), "ALLOW");
    }
}
