/*!
 * Key Combinations
 * Canonical `ctrl+alt+shift+meta+key` form for shortcut lookup
 */

use crate::core::errors::ShortcutError;
use crate::core::InlineString;
use crate::runtime::events::KeyInput;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A physical key combination
///
/// Two combinations compare equal whenever they render to the same canonical
/// string, regardless of the order modifiers were reported in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCombo {
    ctrl: bool,
    alt: bool,
    shift: bool,
    meta: bool,
    key: InlineString,
}

/// Lowercase the key name and fold the space bar spellings
fn normalize_key(key: &str) -> InlineString {
    if key == " " {
        return "space".into();
    }
    let lower = key.trim().to_lowercase();
    match lower.as_str() {
        "spacebar" => "space".into(),
        _ => lower.into(),
    }
}

impl KeyCombo {
    pub fn new(key: &str) -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            key: normalize_key(key),
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Combination reported by a keydown
    pub fn from_input(input: &KeyInput) -> Self {
        Self {
            ctrl: input.ctrl,
            alt: input.alt,
            shift: input.shift,
            meta: input.meta,
            key: normalize_key(&input.key),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (self.ctrl, "ctrl+"),
            (self.alt, "alt+"),
            (self.shift, "shift+"),
            (self.meta, "meta+"),
        ];
        for (_, prefix) in modifiers.iter().filter(|(on, _)| *on) {
            f.write_str(prefix)?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = ShortcutError;

    /// Parse `+`-separated modifiers in any order followed by one key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ShortcutError::InvalidCombo(s.into());
        let mut combo = KeyCombo::new("");
        let mut key: Option<&str> = None;

        for part in s.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "" => return Err(invalid()),
                "ctrl" | "control" => combo.ctrl = true,
                "alt" | "option" => combo.alt = true,
                "shift" => combo.shift = true,
                "meta" | "cmd" | "command" | "super" => combo.meta = true,
                _ if key.is_some() => return Err(invalid()),
                _ => key = Some(part),
            }
        }

        combo.key = normalize_key(key.ok_or_else(invalid)?);
        Ok(combo)
    }
}

impl From<&KeyInput> for KeyCombo {
    fn from(input: &KeyInput) -> Self {
        Self::from_input(input)
    }
}

impl Serialize for KeyCombo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyCombo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
