use crate::error::OrganizerError;
use crate::events::Modifiers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::canonical::CanonicalShortcut;
use super::key_token::KeyToken;

/// Логическое действие, на которое назначается горячая клавиша.
/// Новый вариант требует правки `default_shortcut` и таблицы диспетчера:
/// оба места используют исчерпывающий `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShortcutAction {
    #[serde(rename = "next")]
    Next,
    #[serde(rename = "prev")]
    Previous,
    #[serde(rename = "click_all")]
    ClickAll,
    #[serde(rename = "click_all_with_delay")]
    ClickAllWithDelay,
}

impl ShortcutAction {
    /// Фиксированный порядок обхода: при совпадении комбинаций выигрывает первое
    pub const ALL: [ShortcutAction; 4] = [
        ShortcutAction::Next,
        ShortcutAction::Previous,
        ShortcutAction::ClickAll,
        ShortcutAction::ClickAllWithDelay,
    ];

    /// Имя ключа в сохранённом состоянии
    pub fn key(&self) -> &'static str {
        match self {
            ShortcutAction::Next => "next",
            ShortcutAction::Previous => "prev",
            ShortcutAction::ClickAll => "click_all",
            ShortcutAction::ClickAllWithDelay => "click_all_with_delay",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.key() == key)
    }

    pub fn default_shortcut(&self) -> CanonicalShortcut {
        let ctrl = Modifiers::new().with_ctrl(true);
        match self {
            ShortcutAction::Next => CanonicalShortcut::from_parts(ctrl.with_shift(true), KeyToken::KEY_N),
            ShortcutAction::Previous => CanonicalShortcut::from_parts(ctrl.with_shift(true), KeyToken::KEY_P),
            ShortcutAction::ClickAll => CanonicalShortcut::from_parts(ctrl.with_alt(true), KeyToken::KEY_C),
            ShortcutAction::ClickAllWithDelay => {
                CanonicalShortcut::from_parts(ctrl.with_alt(true).with_shift(true), KeyToken::KEY_C)
            }
        }
    }
}

impl fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ShortcutAction {
    type Err = OrganizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "previous" => Ok(ShortcutAction::Previous),
            other => Self::from_key(other).ok_or_else(|| {
                OrganizerError::Internal(format!(
                    "Неизвестное действие '{}', ожидается одно из: next, prev, click_all, click_all_with_delay",
                    s
                ))
            }),
        }
    }
}
