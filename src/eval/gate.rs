use crate::config::Config;
use crate::error::GateError;
use crate::oracle::{Oracle, OracleVerdict};

use super::{Outcome, PolicyEngine};

/// Decision composer: deterministic policy first, oracle only when the
/// policy has no opinion, and a fail-open allow when the oracle cannot answer.
pub struct Gate {
    policy: PolicyEngine,
    oracle: Box<dyn Oracle>,
}

impl Gate {
    pub fn new(policy: PolicyEngine, oracle: Box<dyn Oracle>) -> Self {
        Self { policy, oracle }
    }

    /// Build the policy stage from configuration. Fails only if a rule
    /// pattern does not compile.
    pub fn from_config(config: &Config, oracle: Box<dyn Oracle>) -> Result<Self, GateError> {
        Ok(Self::new(PolicyEngine::from_config(config)?, oracle))
    }

    /// Never fails: a broken rule pattern in `config` is logged and the
    /// default rules are used instead.
    pub fn from_config_or_default(config: &Config, oracle: Box<dyn Oracle>) -> Self {
        Self::new(PolicyEngine::from_config_or_default(config), oracle)
    }

    pub fn decide(&self, command: &str) -> Outcome {
        if command.trim().is_empty() {
            return Outcome::allow_silently();
        }

        if let Some(outcome) = self.policy.classify(command) {
            return outcome;
        }

        match self.oracle.evaluate(command) {
            OracleVerdict::Safe(reason) => Outcome::allow(reason),
            OracleVerdict::Unsafe(reason) => {
                Outcome::deny(format!("Oracle safety check: {reason}"))
            }
            OracleVerdict::Indeterminate(cause) => {
                log::warn!("{cause}, allowing command");
                Outcome::allow(cause.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::OracleUnavailable;
    use crate::eval::Decision;
    use crate::oracle::DisabledOracle;

    /// Oracle answering with a fixed response and counting calls.
    struct Scripted {
        response: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl Oracle for Scripted {
        fn evaluate(&self, _command: &str) -> OracleVerdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            crate::oracle::parse_response(self.response)
        }
    }

    fn gate(response: &'static str) -> (Gate, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let oracle = Scripted {
            response,
            calls: Arc::clone(&calls),
        };
        let gate = Gate::from_config(&Config::default_config(), Box::new(oracle)).unwrap();
        (gate, calls)
    }

    #[test]
    fn deterministic_decisions_skip_oracle() {
        let (gate, calls) = gate("UNSAFE: should not be asked");
        assert_eq!(gate.decide("ls -la").decision, Decision::Allow);
        assert_eq!(gate.decide("rm -rf /tmp/x").decision, Decision::Deny);
        assert_eq!(
            gate.decide("ls | xargs -I{} sh -c 'cat {}'").decision,
            Decision::Ask
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_opinion_consults_oracle_once() {
        let (gate, calls) = gate("SAFE: builds the project");
        let outcome = gate.decide("cargo build");
        assert_eq!(outcome, Outcome::allow("builds the project"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsafe_denies() {
        let (gate, _) = gate("UNSAFE: Inefficient - use fd");
        let outcome = gate.decide("find . -name '*.py' | xargs wc -l");
        assert_eq!(outcome.decision, Decision::Deny);
        assert_eq!(outcome.reason(), "Oracle safety check: Inefficient - use fd");
    }

    #[test]
    fn unparseable_fails_open() {
        let (gate, _) = gate("I am not sure");
        let outcome = gate.decide("cargo publish");
        assert_eq!(outcome.decision, Decision::Allow);
        assert_eq!(outcome.reason(), "unexpected oracle response format");
    }

    #[test]
    fn disabled_oracle_fails_open() {
        let gate = Gate::from_config(&Config::default_config(), Box::new(DisabledOracle)).unwrap();
        let outcome = gate.decide("cargo build");
        assert_eq!(outcome, Outcome::allow(OracleUnavailable::Disabled.to_string()));
    }

    #[test]
    fn broken_overlay_pattern_falls_back_to_default_rules() {
        let mut config = Config::default_config();
        config
            .apply_overlay_str(
                r#"
                [rules]
                replace = true
                [[rules.forbidden]]
                pattern = "[oops"
                reason = "broken"
            "#,
            )
            .unwrap();
        assert!(matches!(
            Gate::from_config(&config, Box::new(DisabledOracle)),
            Err(GateError::InvalidPattern { .. })
        ));

        let calls = Arc::new(AtomicUsize::new(0));
        let oracle = Scripted {
            response: "SAFE: unused",
            calls: Arc::clone(&calls),
        };
        let outcome = Gate::from_config_or_default(&config, Box::new(oracle)).decide("rm x");
        assert_eq!(outcome.decision, Decision::Deny);
        assert!(outcome.reason().starts_with("rm command forbidden"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_command_allowed_silently() {
        let (gate, calls) = gate("UNSAFE: nope");
        assert_eq!(gate.decide("   "), Outcome::allow_silently());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
