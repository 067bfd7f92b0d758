use crate::error::{OrganizerError, Result};
#[cfg(test)]
use crate::events::KeyState;
use crate::shortcuts::CanonicalShortcut;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use super::r#trait::{HotkeyBackend, HotkeyCallback};

/// Операция над бэкендом в порядке вызова
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    Register(String),
    Unregister(String),
    UnregisterAll,
}

/// Бэкенд без обращения к ОС: хранит обработчики в памяти и умеет
/// имитировать срабатывание и занятость комбинации другим процессом.
///
/// Учёт повторяет GlobalHotkeyBackend: при неудачном снятии обработчик
/// заглушается (`None`), но комбинация остаётся занятой до `unregister_all`.
#[derive(Default)]
pub struct DryRunHotkeyBackend {
    hooks: DashMap<String, Option<HotkeyCallback>>,
    occupied: DashSet<String>,
    refuse_release: DashSet<String>,
    ops: Mutex<Vec<BackendOp>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl DryRunHotkeyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn enter(&self, op: BackendOp) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.ops.lock().push(op);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl DryRunHotkeyBackend {
    /// Каждая операция будет "занимать" указанное время
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Имитировать комбинацию, занятую другим процессом
    pub fn occupy(&self, shortcut: &str) {
        self.occupied.insert(shortcut.to_string());
    }

    /// Имитировать отказ ОС снять комбинацию по одной; `unregister_all` проходит
    pub fn refuse_release(&self, shortcut: &str) {
        self.refuse_release.insert(shortcut.to_string());
    }

    /// Имитировать срабатывание; `false`, если обработчика нет
    pub fn fire(&self, shortcut: &str, state: KeyState) -> bool {
        let callback = self.hooks.get(shortcut).and_then(|entry| entry.value().clone());
        match callback {
            Some(callback) => {
                callback(state);
                true
            }
            None => false,
        }
    }

    /// Комбинации, которые ОС считала бы занятыми
    pub fn live_hooks(&self) -> Vec<String> {
        let mut hooks: Vec<String> = self.hooks.iter().map(|entry| entry.key().clone()).collect();
        hooks.sort();
        hooks
    }

    pub fn ops(&self) -> Vec<BackendOp> {
        self.ops.lock().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().clear();
    }

    /// Наибольшее число одновременно выполнявшихся операций
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HotkeyBackend for DryRunHotkeyBackend {
    async fn register(&self, shortcut: &CanonicalShortcut, on_event: HotkeyCallback) -> Result<()> {
        let key = shortcut.to_string();
        self.enter(BackendOp::Register(key.clone())).await;

        let result = if self.occupied.contains(&key) || self.hooks.contains_key(&key) {
            Err(OrganizerError::HotkeyConflict(key))
        } else {
            info!("[DRY RUN] Регистрация глобальной клавиши {}", key);
            self.hooks.insert(key, Some(on_event));
            Ok(())
        };

        self.leave();
        result
    }

    async fn unregister(&self, shortcut: &CanonicalShortcut) -> Result<()> {
        let key = shortcut.to_string();
        self.enter(BackendOp::Unregister(key.clone())).await;

        let result = if !self.hooks.contains_key(&key) {
            Ok(())
        } else if self.refuse_release.contains(&key) {
            if let Some(mut entry) = self.hooks.get_mut(&key) {
                *entry.value_mut() = None;
            }
            warn!("[DRY RUN] ОС не отпустила {}", key);
            Err(OrganizerError::Registration(key))
        } else {
            self.hooks.remove(&key);
            info!("[DRY RUN] Снятие глобальной клавиши {}", key);
            Ok(())
        };

        self.leave();
        result
    }

    async fn unregister_all(&self) -> Result<()> {
        self.enter(BackendOp::UnregisterAll).await;
        self.hooks.clear();
        self.leave();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn shortcut(s: &str) -> CanonicalShortcut {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_register_fire_unregister() {
        let backend = DryRunHotkeyBackend::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        backend
            .register(&shortcut("Control+KeyJ"), Arc::new(move |_| flag.store(true, Ordering::SeqCst)))
            .await
            .unwrap();
        assert_eq!(backend.live_hooks(), vec!["Control+KeyJ".to_string()]);
        assert!(backend.fire("Control+KeyJ", KeyState::Pressed));
        assert!(fired.load(Ordering::SeqCst));

        backend.unregister(&shortcut("Control+KeyJ")).await.unwrap();
        backend.unregister(&shortcut("Control+KeyJ")).await.unwrap();
        assert!(!backend.fire("Control+KeyJ", KeyState::Pressed));
        assert_eq!(
            backend.ops(),
            vec![
                BackendOp::Register("Control+KeyJ".into()),
                BackendOp::Unregister("Control+KeyJ".into()),
                BackendOp::Unregister("Control+KeyJ".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_occupied_and_duplicate_are_conflicts() {
        let backend = DryRunHotkeyBackend::new();
        backend.occupy("Control+KeyQ");

        let result = backend.register(&shortcut("Control+KeyQ"), Arc::new(|_| {})).await;
        assert!(matches!(result, Err(OrganizerError::HotkeyConflict(_))));

        backend.register(&shortcut("Alt+KeyQ"), Arc::new(|_| {})).await.unwrap();
        let result = backend.register(&shortcut("Alt+KeyQ"), Arc::new(|_| {})).await;
        assert!(matches!(result, Err(OrganizerError::HotkeyConflict(_))));
        assert_eq!(backend.live_hooks(), vec!["Alt+KeyQ".to_string()]);
    }

    #[tokio::test]
    async fn test_refused_release_stays_held_until_unregister_all() {
        let backend = DryRunHotkeyBackend::new();
        backend.refuse_release("Control+KeyJ");
        backend.register(&shortcut("Control+KeyJ"), Arc::new(|_| {})).await.unwrap();

        let result = backend.unregister(&shortcut("Control+KeyJ")).await;
        assert!(matches!(result, Err(OrganizerError::Registration(_))));

        // Обработчик заглушён, но комбинация всё ещё занята
        assert!(!backend.fire("Control+KeyJ", KeyState::Pressed));
        assert_eq!(backend.live_hooks(), vec!["Control+KeyJ".to_string()]);
        let again = backend.register(&shortcut("Control+KeyJ"), Arc::new(|_| {})).await;
        assert!(matches!(again, Err(OrganizerError::HotkeyConflict(_))));

        backend.unregister_all().await.unwrap();
        assert!(backend.live_hooks().is_empty());
    }
}
