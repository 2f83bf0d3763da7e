//! Lightweight command classification.
//!
//! This is not a shell parser. It answers two questions conservatively:
//! could this command compose with anything else (pipes, redirects, chaining,
//! substitution), and which program most likely runs first.

/// Substrings whose presence makes a command non-simple.
///
/// Quoting is ignored on purpose: `echo 'a | b'` is not simple.
pub const METACHARACTERS: &[&str] = &["|", ">", "<", "&", ";", "$(", "`"];

/// True iff the command contains none of [`METACHARACTERS`].
pub fn is_simple(command: &str) -> bool {
    !METACHARACTERS.iter().any(|m| command.contains(m))
}

/// Extracts leading verbs, looking through transparent wrappers such as
/// `sudo`, `time` and `env`.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    wrappers: Vec<String>,
}

impl Classifier {
    pub fn new(wrappers: Vec<String>) -> Self {
        Self { wrappers }
    }

    fn is_wrapper(&self, word: &str) -> bool {
        self.wrappers.iter().any(|w| w == word)
    }

    /// Index of the verb within `words`: the word after a leading wrapper,
    /// or the wrapper itself when nothing follows it.
    fn verb_index(&self, words: &[&str]) -> usize {
        match words {
            [first, _, ..] if self.is_wrapper(first) => 1,
            _ => 0,
        }
    }

    /// The program that most likely runs first, or `""` for a blank command.
    ///
    /// `sudo rm -rf x` → `rm`; bare `sudo` → `sudo`.
    pub fn leading_verb<'a>(&self, command: &'a str) -> &'a str {
        let words: Vec<&str> = command.split_whitespace().collect();
        if words.is_empty() {
            return "";
        }
        words[self.verb_index(&words)]
    }

    /// The verb followed by its first argument (`git status`), used for
    /// multi-word allow-list entries. `None` when the verb has no argument.
    pub fn leading_phrase(&self, command: &str) -> Option<String> {
        let words: Vec<&str> = command.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        let idx = self.verb_index(&words);
        let arg = words.get(idx + 1)?;
        Some(format!("{} {}", words[idx], arg))
    }
}
