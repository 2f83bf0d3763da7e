pub mod classify;

pub use classify::{Classifier, METACHARACTERS, is_simple};
