use crate::config::Config;
use crate::error::GateError;
use crate::parse::{Classifier, is_simple};
use crate::rules::{RuleDoc, RuleStore};

use super::Outcome;

/// Reason attached to allow-list hits.
pub const WHITELISTED: &str = "whitelisted";

/// Deterministic first stage: forbidden rules, then caution rules, then the
/// allow-list. Returns `None` (no opinion) when none of them decide.
pub struct PolicyEngine {
    store: RuleStore,
    classifier: Classifier,
    rules_doc: RuleDoc,
}

impl PolicyEngine {
    pub fn new(store: RuleStore, classifier: Classifier, rules_doc: RuleDoc) -> Self {
        Self {
            store,
            classifier,
            rules_doc,
        }
    }

    /// Build from configuration. Fails only if a rule pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self, GateError> {
        Ok(Self::new(
            RuleStore::from_config(config)?,
            Classifier::new(config.wrappers.transparent.clone()),
            RuleDoc::new(config.rules_file_path()),
        ))
    }

    /// Like [`PolicyEngine::from_config`], but a broken pattern falls back to
    /// the embedded default rules, and failing that to no rules at all.
    pub fn from_config_or_default(config: &Config) -> Self {
        Self::from_config(config).unwrap_or_else(|e| {
            log::warn!("{e}, using default rules");
            Self::from_config(&Config::default_config()).unwrap_or_else(|e| {
                log::warn!("{e}, running without deterministic rules");
                Self::new(RuleStore::default(), Classifier::default(), RuleDoc::none())
            })
        })
    }

    /// Pair a rule reason with the rules document for display.
    fn with_rules(&self, reason: &str) -> String {
        format!("{reason}\n\n{}", self.rules_doc.load())
    }

    pub fn classify(&self, command: &str) -> Option<Outcome> {
        // Forbidden rules are a floor nothing else can override
        if let Some(rule) = self.store.match_forbidden(command) {
            log::debug!("forbidden rule /{}/ matched", rule.pattern.as_str());
            return Some(Outcome::deny(self.with_rules(&rule.reason)));
        }

        if let Some(rule) = self.store.match_caution(command) {
            log::debug!("caution rule /{}/ matched", rule.pattern.as_str());
            return Some(Outcome::ask(self.with_rules(&rule.reason)));
        }

        // Compound commands are never whitelisted, whatever their first verb
        if !is_simple(command) {
            return None;
        }

        let verb = self.classifier.leading_verb(command);
        if self.store.is_allow_listed(verb) {
            log::info!("whitelisted command: {verb}");
            return Some(Outcome::allow(WHITELISTED));
        }
        if let Some(phrase) = self.classifier.leading_phrase(command)
            && self.store.is_allow_listed(&phrase)
        {
            log::info!("whitelisted command: {phrase}");
            return Some(Outcome::allow(WHITELISTED));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Decision;
    use crate::rules::{RULES_PLACEHOLDER, RuleEntry};

    fn engine() -> PolicyEngine {
        let config = Config::default_config();
        PolicyEngine::new(
            RuleStore::from_config(&config).unwrap(),
            Classifier::new(config.wrappers.transparent.clone()),
            RuleDoc::none(),
        )
    }

    fn decision(cmd: &str) -> Option<Decision> {
        engine().classify(cmd).map(|o| o.decision)
    }

    #[test]
    fn forbidden_denies_with_rules_text() {
        let outcome = engine().classify("rm -rf /tmp/x").unwrap();
        assert_eq!(outcome.decision, Decision::Deny);
        assert_eq!(
            outcome.reason(),
            format!("rm command forbidden\n\n{RULES_PLACEHOLDER}")
        );
    }

    #[test]
    fn forbidden_beats_allow_list() {
        // "find" is allow-listed and the command is simple
        assert_eq!(decision("find . -name x -exec rm {} +"), Some(Decision::Deny));
    }

    #[test]
    fn forbidden_beats_caution() {
        let outcome = engine()
            .classify("ls | xargs -I{} sh -c 'rm {}'")
            .unwrap();
        assert_eq!(outcome.decision, Decision::Deny);
    }

    #[test]
    fn caution_asks() {
        let outcome = engine()
            .classify("fd -e md | xargs -I{} sh -c 'wc -l {}'")
            .unwrap();
        assert_eq!(outcome.decision, Decision::Ask);
        assert!(outcome.reason().starts_with("xargs -I ... sh -c antipattern detected"));
    }

    #[test]
    fn allow_list_simple() {
        let outcome = engine().classify("ls -la").unwrap();
        assert_eq!(outcome, Outcome::allow(WHITELISTED));
    }

    #[test]
    fn allow_list_two_word_phrase() {
        assert_eq!(decision("git status"), Some(Decision::Allow));
        assert_eq!(decision("git log --oneline -5"), Some(Decision::Allow));
        assert_eq!(decision("git push origin main"), None);
        assert_eq!(decision("git"), None);
    }

    #[test]
    fn allow_list_through_wrapper() {
        assert_eq!(decision("sudo ls /root"), Some(Decision::Allow));
        assert_eq!(decision("time git diff"), Some(Decision::Allow));
    }

    #[test]
    fn compound_never_whitelisted() {
        assert_eq!(decision("ls | wc -l"), None);
        assert_eq!(decision("cat a > b"), None);
        assert_eq!(decision("echo $(whoami)"), None);
        assert_eq!(decision("ls; pwd"), None);
        assert_eq!(decision("ls && pwd"), None);
        assert_eq!(decision("echo `id`"), None);
        assert_eq!(decision("sort < data"), None);
    }

    #[test]
    fn verb_must_match_exactly() {
        assert_eq!(decision("lsblk"), None);
        assert_eq!(decision("/bin/ls"), None);
    }

    #[test]
    fn unknown_command_has_no_opinion() {
        assert_eq!(decision("cargo build"), None);
        assert_eq!(decision("npm install"), None);
    }

    #[test]
    fn injected_rules() {
        let engine = PolicyEngine::new(
            RuleStore::new(
                vec![RuleEntry::substring("--force", "force forbidden")],
                vec![RuleEntry::regex(r"^curl\b", "network").unwrap()],
                vec!["curl".to_string()],
            ),
            Classifier::default(),
            RuleDoc::none(),
        );
        assert_eq!(
            engine.classify("git push --force").map(|o| o.decision),
            Some(Decision::Deny)
        );
        assert_eq!(
            engine.classify("curl example.com").map(|o| o.decision),
            Some(Decision::Ask)
        );
        assert!(engine.classify("rm -rf /").is_none());
    }

    #[test]
    fn deterministic_layer_is_idempotent() {
        let engine = engine();
        for cmd in ["ls -la", "rm x", "cargo test", "ls | xargs -I{} sh -c 'x'"] {
            assert_eq!(engine.classify(cmd), engine.classify(cmd), "command: {cmd}");
        }
    }
}
