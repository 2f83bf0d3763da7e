use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Location of the user overlay, relative to `$HOME`.
const USER_CONFIG_PATH: &str = ".config/cc-shellguard/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub allow: AllowConfig,
    #[serde(default)]
    pub wrappers: WrapperConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    /// Tool name whose calls are gated. Any other tool is allowed untouched.
    #[serde(default)]
    pub tool_name: String,
    /// Rules document shown next to deterministic deny/ask decisions.
    #[serde(default)]
    pub rules_file: String,
    #[serde(default)]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct AllowConfig {
    /// Verbs or two-word verb phrases (e.g. "git status").
    #[serde(default)]
    pub commands: Vec<String>,
}

/// Commands that run their first argument as the real program.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct WrapperConfig {
    #[serde(default)]
    pub transparent: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct RulesConfig {
    #[serde(default)]
    pub forbidden: Vec<RuleConfig>,
    #[serde(default)]
    pub caution: Vec<RuleConfig>,
}

/// A single pattern rule as written in TOML.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleConfig {
    pub pattern: String,
    pub reason: String,
    #[serde(default)]
    pub kind: PatternKind,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Unanchored regular-expression search.
    #[default]
    Regex,
    /// Literal substring search.
    Substring,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct OracleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub program: String,
    /// Extra arguments placed before the prompt and model flags.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub timeout_secs: u64,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    allow: AllowOverlay,
    #[serde(default)]
    wrappers: WrappersOverlay,
    #[serde(default)]
    rules: RulesOverlay,
    #[serde(default)]
    oracle: OracleOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    tool_name: Option<String>,
    rules_file: Option<String>,
    log_level: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct AllowOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    commands: Vec<String>,
    #[serde(default)]
    remove_commands: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct WrappersOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    transparent: Vec<String>,
    #[serde(default)]
    remove_transparent: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RulesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    forbidden: Vec<RuleConfig>,
    #[serde(default)]
    caution: Vec<RuleConfig>,
    /// Pattern texts to drop from the default forbidden rules.
    #[serde(default)]
    remove_forbidden: Vec<String>,
    #[serde(default)]
    remove_caution: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct OracleOverlay {
    enabled: Option<bool>,
    program: Option<String>,
    args: Option<Vec<String>>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list<T: PartialEq>(
    base: &mut Vec<T>,
    add: Vec<T>,
    removed: impl Fn(&T) -> bool,
    replace: bool,
) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !removed(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge the overlay at `path`, or ~/.config/cc-shellguard/config.toml
    ///
    /// A missing default overlay is normal. A missing explicit overlay, or one
    /// that fails to parse, is reported and the defaults are kept.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::default_config();
        let explicit = path.is_some();
        let Some(path) = path.map(Path::to_path_buf).or_else(user_config_path) else {
            return config;
        };
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if explicit {
                    log::warn!("cannot read config {}: {e}", path.display());
                }
                return config;
            }
        };
        if let Err(e) = config.apply_overlay_str(&content) {
            log::warn!("{}: {e}, using defaults", path.display());
        }
        config
    }

    /// Parse an overlay from a TOML string and merge it into this config.
    /// On a parse error the config is left untouched.
    pub fn apply_overlay_str(&mut self, toml_str: &str) -> Result<(), GateError> {
        let overlay: ConfigOverlay = toml::from_str(toml_str)?;
        self.apply_overlay(overlay);
        Ok(())
    }

    /// Rules document path with `~` and `$VARS` expanded.
    pub fn rules_file_path(&self) -> PathBuf {
        let raw = &self.settings.rules_file;
        match shellexpand::full(raw) {
            Ok(expanded) => PathBuf::from(expanded.into_owned()),
            Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        }
    }

    /// Serialize the merged config back to TOML (for `--dump-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        if let Some(v) = s.tool_name {
            self.settings.tool_name = v;
        }
        if let Some(v) = s.rules_file {
            self.settings.rules_file = v;
        }
        if let Some(v) = s.log_level {
            self.settings.log_level = v;
        }

        // Allow-list
        let a = overlay.allow;
        merge_list(
            &mut self.allow.commands,
            a.commands,
            |item| a.remove_commands.contains(item),
            a.replace,
        );

        // Wrappers
        let w = overlay.wrappers;
        merge_list(
            &mut self.wrappers.transparent,
            w.transparent,
            |item| w.remove_transparent.contains(item),
            w.replace,
        );

        // Rules: removal is keyed on the pattern text
        let r = overlay.rules;
        merge_list(
            &mut self.rules.forbidden,
            r.forbidden,
            |rule| r.remove_forbidden.contains(&rule.pattern),
            r.replace,
        );
        merge_list(
            &mut self.rules.caution,
            r.caution,
            |rule| r.remove_caution.contains(&rule.pattern),
            r.replace,
        );

        // Oracle
        let o = overlay.oracle;
        if let Some(v) = o.enabled {
            self.oracle.enabled = v;
        }
        if let Some(v) = o.program {
            self.oracle.program = v;
        }
        if let Some(v) = o.args {
            self.oracle.args = v;
        }
        if let Some(v) = o.model {
            self.oracle.model = v;
        }
        if let Some(v) = o.timeout_secs {
            self.oracle.timeout_secs = v;
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(Path::new(&home).join(USER_CONFIG_PATH))
}
