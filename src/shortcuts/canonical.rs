use crate::error::{OrganizerError, Result};
use crate::events::Modifiers;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use super::key_token::{is_modifier_code, KeyToken, ModifierToken};

/// Нормализованная комбинация: модификаторы в порядке Control, Shift, Alt, Meta
/// и ровно одна основная клавиша. Сериализуется как `Control+Shift+KeyN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalShortcut {
    modifiers: Modifiers,
    key: KeyToken,
}

impl CanonicalShortcut {
    pub fn new(modifiers: Modifiers, key: KeyToken) -> Result<Self> {
        if key.is_modifier() {
            return Err(OrganizerError::ModifierKey(key.to_string()));
        }
        Ok(Self { modifiers, key })
    }

    /// Для констант по умолчанию, где клавиша заведомо не модификатор
    pub(crate) const fn from_parts(modifiers: Modifiers, key: KeyToken) -> Self {
        Self { modifiers, key }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn key(&self) -> KeyToken {
        self.key
    }

    pub fn modifier_tokens(&self) -> SmallVec<[ModifierToken; 4]> {
        ModifierToken::CANONICAL_ORDER
            .iter()
            .copied()
            .filter(|token| match token {
                ModifierToken::Control => self.modifiers.ctrl,
                ModifierToken::Shift => self.modifiers.shift,
                ModifierToken::Alt => self.modifiers.alt,
                ModifierToken::Meta => self.modifiers.meta,
            })
            .collect()
    }
}

impl fmt::Display for CanonicalShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.modifier_tokens() {
            write!(f, "{}+", token.as_str())?;
        }
        f.write_str(self.key.as_str())
    }
}

impl FromStr for CanonicalShortcut {
    type Err = OrganizerError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: SmallVec<[&str; 5]> = s.split('+').map(str::trim).collect();
        let (key_part, modifier_parts) = match parts.split_last() {
            Some((key, rest)) if !key.is_empty() => (*key, rest),
            _ => return Err(OrganizerError::InvalidKey(s.to_string())),
        };

        let mut modifiers = Modifiers::new();
        for part in modifier_parts {
            let token = ModifierToken::parse_alias(part)
                .ok_or_else(|| OrganizerError::InvalidKey(format!("{} (в {})", part, s)))?;
            let slot = match token {
                ModifierToken::Control => &mut modifiers.ctrl,
                ModifierToken::Shift => &mut modifiers.shift,
                ModifierToken::Alt => &mut modifiers.alt,
                ModifierToken::Meta => &mut modifiers.meta,
            };
            if *slot {
                return Err(OrganizerError::InvalidKey(format!(
                    "модификатор {} повторяется в {}",
                    token.as_str(),
                    s
                )));
            }
            *slot = true;
        }

        // "Super" одновременно синоним Meta и код клавиши словаря
        let bare_modifier =
            ModifierToken::parse_alias(key_part).is_some() && KeyToken::parse(key_part).is_none();
        if is_modifier_code(key_part) || bare_modifier {
            return Err(OrganizerError::ModifierKey(key_part.to_string()));
        }

        let key = KeyToken::parse_lenient(key_part)
            .ok_or_else(|| OrganizerError::InvalidKey(key_part.to_string()))?;

        CanonicalShortcut::new(modifiers, key)
    }
}

impl Serialize for CanonicalShortcut {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalShortcut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
