//! Named text inputs: `[key]` placeholders filled from another table.
//!
//! A placeholder may carry modifiers after the key, in this order:
//! `:c=<colour>`, `:cbg=<colour>`, `:t=u` or `:t=l`, and `:[<index>]`.
//! For example `[race:t=u:[1]]` is the second rolled value, uppercased.
//! Colours are accepted for compatibility and ignored.

use std::collections::BTreeMap;

use regex::{Captures, Regex};
use tracing::warn;

/// Rolled values per input key, shared by everything evaluated in one
/// table roll so a key is rolled at most once.
pub type InputValues = BTreeMap<String, Vec<String>>;

/// Case change applied to a substituted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    /// `:t=u`
    Upper,
    /// `:t=l`
    Lower,
}

impl CaseTransform {
    fn apply(self, value: &str) -> String {
        match self {
            Self::Upper => value.to_uppercase(),
            Self::Lower => value.to_lowercase(),
        }
    }
}

/// Modifiers decoded from one placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputModifiers {
    /// Foreground colour name.
    pub colour: Option<String>,
    /// Background colour name.
    pub colour_background: Option<String>,
    /// Case transform.
    pub transform: Option<CaseTransform>,
    /// Which rolled value to use.
    pub index: usize,
}

/// Matcher for one input key's placeholders.
#[derive(Debug, Clone)]
pub struct InputPattern {
    key: String,
    regex: Regex,
}

impl InputPattern {
    /// Build the matcher for `key`. The key is matched literally.
    pub fn new(key: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(
            r"\[{}(?::c=(\w+))?(?::cbg=(\w+))?(?::t=([lu]))?(?::\[(\d+)\])?\]",
            regex::escape(key)
        ))?;
        Ok(Self {
            key: key.to_string(),
            regex,
        })
    }

    /// The input key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true if `text` holds a placeholder for this key.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Decode the modifiers of the first placeholder in `text`.
    pub fn modifiers(&self, text: &str) -> Option<InputModifiers> {
        self.regex.captures(text).map(|caps| Self::decode(&caps))
    }

    fn decode(caps: &Captures<'_>) -> InputModifiers {
        InputModifiers {
            colour: caps.get(1).map(|m| m.as_str().to_string()),
            colour_background: caps.get(2).map(|m| m.as_str().to_string()),
            transform: caps.get(3).map(|m| match m.as_str() {
                "u" => CaseTransform::Upper,
                _ => CaseTransform::Lower,
            }),
            index: caps
                .get(4)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0),
        }
    }

    /// Replace every placeholder for this key with the selected value.
    /// An index past the rolled values substitutes nothing.
    pub fn substitute(&self, text: &str, values: &[String]) -> String {
        self.regex
            .replace_all(text, |caps: &Captures<'_>| {
                let modifiers = Self::decode(caps);
                let Some(value) = values.get(modifiers.index) else {
                    warn!(
                        key = %self.key,
                        index = modifiers.index,
                        rolled = values.len(),
                        "input index out of range"
                    );
                    return String::new();
                };
                match modifiers.transform {
                    Some(transform) => transform.apply(value),
                    None => value.clone(),
                }
            })
            .into_owned()
    }
}
