use crate::error::{OrganizerError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

use super::action::ShortcutAction;
use super::canonical::CanonicalShortcut;

/// Назначения действие -> комбинация. Отсутствующая запись наследует значение по умолчанию.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortcutBinding {
    entries: HashMap<ShortcutAction, CanonicalShortcut>,
}

impl ShortcutBinding {
    /// Пустые назначения: все действия берут комбинации по умолчанию
    pub fn empty() -> Self {
        Self::default()
    }

    /// Документированные назначения по умолчанию, записанные явно
    #[cfg(test)]
    pub fn defaults() -> Self {
        Self {
            entries: ShortcutAction::ALL
                .into_iter()
                .map(|action| (action, action.default_shortcut()))
                .collect(),
        }
    }

    pub fn get(&self, action: ShortcutAction) -> Option<&CanonicalShortcut> {
        self.entries.get(&action)
    }

    /// Комбинация действия с учётом значения по умолчанию
    pub fn resolve(&self, action: ShortcutAction) -> CanonicalShortcut {
        self.entries
            .get(&action)
            .copied()
            .unwrap_or_else(|| action.default_shortcut())
    }

    pub fn set(&mut self, action: ShortcutAction, shortcut: CanonicalShortcut) -> Option<CanonicalShortcut> {
        self.entries.insert(action, shortcut)
    }

    pub fn unset(&mut self, action: ShortcutAction) -> Option<CanonicalShortcut> {
        self.entries.remove(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Все действия в фиксированном порядке с итоговыми комбинациями
    pub fn resolved(&self) -> impl Iterator<Item = (ShortcutAction, CanonicalShortcut)> + '_ {
        ShortcutAction::ALL
            .into_iter()
            .map(move |action| (action, self.resolve(action)))
    }

    /// Комбинации, назначенные сразу нескольким действиям (в фиксированном порядке)
    pub fn collisions(&self) -> Vec<(CanonicalShortcut, Vec<ShortcutAction>)> {
        let mut groups: Vec<(CanonicalShortcut, Vec<ShortcutAction>)> = Vec::new();
        for (action, shortcut) in self.resolved() {
            match groups.iter_mut().find(|(existing, _)| *existing == shortcut) {
                Some((_, actions)) => actions.push(action),
                None => groups.push((shortcut, vec![action])),
            }
        }
        groups.retain(|(_, actions)| actions.len() > 1);
        groups
    }

    /// Представление для хранилища: объект `{"next": "Control+Shift+KeyN", ...}`
    pub fn to_persisted(&self) -> Value {
        let map: Map<String, Value> = ShortcutAction::ALL
            .into_iter()
            .filter_map(|action| {
                self.entries
                    .get(&action)
                    .map(|shortcut| (action.key().to_string(), Value::String(shortcut.to_string())))
            })
            .collect();
        Value::Object(map)
    }

    /// Разбор сохранённого объекта. Неизвестные ключи пропускаются,
    /// любое нестроковое или неразбираемое значение делает запись повреждённой.
    pub fn from_persisted(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            OrganizerError::MalformedPersistedState(format!("ожидался объект, получено: {}", value))
        })?;

        let mut binding = Self::empty();
        for (key, raw) in map {
            let Some(action) = ShortcutAction::from_key(key) else {
                warn!("Пропускаем неизвестное действие '{}' в сохранённых назначениях", key);
                continue;
            };
            let raw = raw.as_str().ok_or_else(|| {
                OrganizerError::MalformedPersistedState(format!("значение для '{}' не строка: {}", key, raw))
            })?;
            let shortcut = raw.parse::<CanonicalShortcut>().map_err(|e| {
                OrganizerError::MalformedPersistedState(format!("'{}' для '{}': {}", raw, key, e))
            })?;
            binding.set(action, shortcut);
        }

        Ok(binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shortcut(s: &str) -> CanonicalShortcut {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let mut binding = ShortcutBinding::empty();
        binding.set(ShortcutAction::Next, shortcut("Control+KeyX"));

        assert_eq!(binding.resolve(ShortcutAction::Next), shortcut("Control+KeyX"));
        assert_eq!(
            binding.resolve(ShortcutAction::Previous),
            ShortcutAction::Previous.default_shortcut()
        );
    }

    #[test]
    fn test_resolved_keeps_fixed_order() {
        let actions: Vec<ShortcutAction> = ShortcutBinding::defaults().resolved().map(|(a, _)| a).collect();
        assert_eq!(actions, ShortcutAction::ALL.to_vec());
    }

    #[test]
    fn test_collisions() {
        assert!(ShortcutBinding::defaults().collisions().is_empty());

        let mut binding = ShortcutBinding::defaults();
        binding.set(ShortcutAction::Next, shortcut("Control+KeyJ"));
        binding.set(ShortcutAction::Previous, shortcut("Control+KeyJ"));

        let collisions = binding.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0, shortcut("Control+KeyJ"));
        assert_eq!(collisions[0].1, vec![ShortcutAction::Next, ShortcutAction::Previous]);
    }

    #[test]
    fn test_persisted_form() {
        let value = ShortcutBinding::defaults().to_persisted();
        assert_eq!(
            value,
            json!({
                "next": "Control+Shift+KeyN",
                "prev": "Control+Shift+KeyP",
                "click_all": "Control+Alt+KeyC",
                "click_all_with_delay": "Control+Shift+Alt+KeyC",
            })
        );
        assert_eq!(ShortcutBinding::from_persisted(&value).unwrap(), ShortcutBinding::defaults());
    }

    #[test]
    fn test_from_persisted_accepts_partial_and_legacy() {
        let binding = ShortcutBinding::from_persisted(&json!({
            "next": "CommandOrControl+Shift+N",
            "unknown_action": "Control+KeyZ",
        }))
        .unwrap();

        assert_eq!(binding.get(ShortcutAction::Next), Some(&shortcut("Control+Shift+KeyN")));
        assert_eq!(binding.get(ShortcutAction::Previous), None);
    }

    #[test]
    fn test_from_persisted_rejects_malformed() {
        for value in [json!([1, 2]), json!({"next": 5}), json!({"prev": "Control+Bogus"}), json!("text")] {
            assert!(matches!(
                ShortcutBinding::from_persisted(&value),
                Err(OrganizerError::MalformedPersistedState(_))
            ));
        }
    }
}
