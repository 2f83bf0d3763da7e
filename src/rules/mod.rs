//! Deterministic rule content: forbidden and caution patterns plus the
//! allow-list. Built once at startup and never mutated.

pub mod doc;

pub use doc::{RULES_PLACEHOLDER, RuleDoc};

use std::collections::HashSet;

use regex::Regex;

use crate::config::{Config, PatternKind, RuleConfig};
use crate::error::GateError;

/// How a rule matches command text.
#[derive(Debug, Clone)]
pub enum RulePattern {
    /// Unanchored search; anchors only apply when written in the pattern.
    Regex(Regex),
    Substring(String),
}

impl RulePattern {
    pub fn is_match(&self, command: &str) -> bool {
        match self {
            RulePattern::Regex(re) => re.is_match(command),
            RulePattern::Substring(s) => command.contains(s.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RulePattern::Regex(re) => re.as_str(),
            RulePattern::Substring(s) => s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub pattern: RulePattern,
    pub reason: String,
}

impl RuleEntry {
    pub fn regex(pattern: &str, reason: &str) -> Result<Self, GateError> {
        let re = Regex::new(pattern).map_err(|source| GateError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: RulePattern::Regex(re),
            reason: reason.to_string(),
        })
    }

    pub fn substring(pattern: &str, reason: &str) -> Self {
        Self {
            pattern: RulePattern::Substring(pattern.to_string()),
            reason: reason.to_string(),
        }
    }

    fn from_config(rule: &RuleConfig) -> Result<Self, GateError> {
        match rule.kind {
            PatternKind::Regex => Self::regex(&rule.pattern, &rule.reason),
            PatternKind::Substring => Ok(Self::substring(&rule.pattern, &rule.reason)),
        }
    }
}

/// Immutable rule content consulted by the policy engine.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    forbidden: Vec<RuleEntry>,
    caution: Vec<RuleEntry>,
    allow_list: HashSet<String>,
}

impl RuleStore {
    /// Assemble a store from already-built parts. Allow-list entries are
    /// whitespace-normalized (`"git   status"` → `"git status"`).
    pub fn new(
        forbidden: Vec<RuleEntry>,
        caution: Vec<RuleEntry>,
        allow_list: impl IntoIterator<Item = String>,
    ) -> Self {
        let allow_list = allow_list
            .into_iter()
            .map(|entry| normalize_phrase(&entry))
            .filter(|entry| !entry.is_empty())
            .collect();
        Self {
            forbidden,
            caution,
            allow_list,
        }
    }

    /// Build from configuration, compiling every pattern. Fails on the first
    /// pattern that does not compile.
    pub fn from_config(config: &Config) -> Result<Self, GateError> {
        let forbidden = config
            .rules
            .forbidden
            .iter()
            .map(RuleEntry::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        let caution = config
            .rules
            .caution
            .iter()
            .map(RuleEntry::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            forbidden,
            caution,
            config.allow.commands.iter().cloned(),
        ))
    }

    /// First forbidden rule matching the command.
    pub fn match_forbidden(&self, command: &str) -> Option<&RuleEntry> {
        self.forbidden.iter().find(|r| r.pattern.is_match(command))
    }

    /// First caution rule matching the command.
    pub fn match_caution(&self, command: &str) -> Option<&RuleEntry> {
        self.caution.iter().find(|r| r.pattern.is_match(command))
    }

    pub fn is_allow_listed(&self, phrase: &str) -> bool {
        self.allow_list.contains(phrase)
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}
