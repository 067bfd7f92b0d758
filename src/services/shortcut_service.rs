use crate::shortcuts::ShortcutBinding;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::focus_tracker::FocusTracker;
use super::registrar::HotkeyRegistrar;
use super::store::ShortcutStore;

/// Единственная точка упорядочивания: собирает изменения назначений и фокуса
/// и передаёт регистратору только реально новые пары (назначения, фокус).
pub struct ShortcutService {
    store: Arc<ShortcutStore>,
    focus: Arc<FocusTracker>,
    registrar: Arc<HotkeyRegistrar>,
    reload_interval: Duration,
}

impl ShortcutService {
    pub fn new(
        store: Arc<ShortcutStore>,
        focus: Arc<FocusTracker>,
        registrar: Arc<HotkeyRegistrar>,
        reload_interval: Duration,
    ) -> Self {
        Self {
            store,
            focus,
            registrar,
            reload_interval,
        }
    }

    /// Работает до сигнала `shutdown` (или закрытия его отправителя),
    /// после чего снимает все глобальные клавиши.
    pub async fn run(&self, mut shutdown: oneshot::Receiver<()>) {
        self.store.load().await;
        let mut bindings = self.store.subscribe();
        let mut focus = self.focus.subscribe();

        let mut applied: Option<(ShortcutBinding, bool)> = None;
        let binding = bindings.borrow_and_update().clone();
        let focused = *focus.borrow_and_update();
        self.apply(&mut applied, binding, focused).await;

        let mut reload = tokio::time::interval(self.reload_interval);
        reload.set_missed_tick_behavior(MissedTickBehavior::Skip);
        reload.tick().await;

        info!("ShortcutService запущен");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Получен сигнал остановки");
                    break;
                }
                changed = bindings.changed() => {
                    if changed.is_err() {
                        warn!("Канал назначений закрыт");
                        break;
                    }
                }
                changed = focus.changed() => {
                    if changed.is_err() {
                        warn!("Канал фокуса закрыт");
                        break;
                    }
                }
                _ = reload.tick() => {
                    // Изменения, сделанные другим процессом, придут через канал назначений
                    self.store.load().await;
                    continue;
                }
            }

            let binding = bindings.borrow_and_update().clone();
            let focused = *focus.borrow_and_update();
            self.apply(&mut applied, binding, focused).await;
        }

        self.registrar.shutdown().await;
        info!("ShortcutService остановлен");
    }

    async fn apply(&self, applied: &mut Option<(ShortcutBinding, bool)>, binding: ShortcutBinding, focused: bool) {
        if applied.as_ref() == Some(&(binding.clone(), focused)) {
            debug!("Назначения и фокус не изменились, перерегистрация не нужна");
            return;
        }

        for (shortcut, actions) in binding.collisions() {
            warn!("Комбинация {} назначена нескольким действиям: {:?}", shortcut, actions);
        }

        let state = self.registrar.reconcile(&binding, focused).await;
        debug!("Регистратор в состоянии {:?}", state);
        *applied = Some((binding, focused));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeyState;
    use crate::services::dispatcher::test_support::RecordingCommands;
    use crate::services::dispatcher::ActionDispatcher;
    use crate::services::hotkey_backend::DryRunHotkeyBackend;
    use crate::services::store::{KeyValueStore, MemoryStore, DEFAULT_STORAGE_KEY};
    use crate::shortcuts::{CanonicalShortcut, ShortcutAction};
    use serde_json::json;

    struct Harness {
        kv: Arc<MemoryStore>,
        store: Arc<ShortcutStore>,
        focus: Arc<FocusTracker>,
        backend: Arc<DryRunHotkeyBackend>,
        calls: tokio::sync::mpsc::UnboundedReceiver<(ShortcutAction, Option<u64>)>,
        shutdown: Option<oneshot::Sender<()>>,
        task: tokio::task::JoinHandle<()>,
    }

    fn start(initially_active: bool) -> Harness {
        let kv = Arc::new(MemoryStore::new());
        let store = Arc::new(ShortcutStore::new(kv.clone(), DEFAULT_STORAGE_KEY));
        let focus = Arc::new(FocusTracker::new(initially_active));
        let backend = Arc::new(DryRunHotkeyBackend::new());
        let (commands, calls) = RecordingCommands::new(false);
        let dispatcher = Arc::new(ActionDispatcher::new(Arc::new(commands)));
        let registrar = Arc::new(HotkeyRegistrar::new(backend.clone(), dispatcher));

        let service = ShortcutService::new(store.clone(), focus.clone(), registrar, Duration::from_millis(20));
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move { service.run(rx).await });

        Harness {
            kv,
            store,
            focus,
            backend,
            calls,
            shutdown: Some(tx),
            task,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("условие не выполнилось за отведённое время");
    }

    fn shortcut(s: &str) -> CanonicalShortcut {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_focus_gates_registration() {
        let mut harness = start(true);
        let backend = harness.backend.clone();
        wait_until(|| backend.live_hooks().len() == 4).await;

        harness.focus.notify(false);
        wait_until(|| backend.live_hooks().is_empty()).await;

        harness.focus.notify(true);
        wait_until(|| backend.live_hooks().len() == 4).await;

        harness.shutdown.take().unwrap().send(()).unwrap();
        harness.task.await.unwrap();
        assert!(backend.live_hooks().is_empty());
    }

    #[tokio::test]
    async fn test_rebind_replaces_hook() {
        let harness = start(true);
        let backend = harness.backend.clone();
        wait_until(|| backend.live_hooks().len() == 4).await;

        harness
            .store
            .update(ShortcutAction::Next, shortcut("Control+KeyX"))
            .await
            .unwrap();
        wait_until(|| backend.live_hooks().contains(&"Control+KeyX".to_string())).await;

        assert!(!backend.live_hooks().contains(&"Control+Shift+KeyN".to_string()));
        assert_eq!(backend.live_hooks().len(), 4);
    }

    #[tokio::test]
    async fn test_unchanged_reload_does_not_reregister() {
        let harness = start(true);
        let backend = harness.backend.clone();
        wait_until(|| backend.live_hooks().len() == 4).await;
        backend.clear_ops();

        // Несколько периодов перечитывания одного и того же
        tokio::time::sleep(Duration::from_millis(100)).await;
        harness.store.load().await;
        harness.focus.notify(true);

        assert!(backend.ops().is_empty());
    }

    #[tokio::test]
    async fn test_external_write_is_picked_up() {
        let harness = start(true);
        let backend = harness.backend.clone();
        wait_until(|| backend.live_hooks().len() == 4).await;

        harness
            .kv
            .set(DEFAULT_STORAGE_KEY, json!({"click_all": "Alt+KeyK"}))
            .await
            .unwrap();
        wait_until(|| backend.live_hooks().contains(&"Alt+KeyK".to_string())).await;
        assert!(!backend.live_hooks().contains(&"Control+Alt+KeyC".to_string()));
    }

    #[tokio::test]
    async fn test_starts_inactive_without_focus() {
        let harness = start(false);
        let backend = harness.backend.clone();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(backend.live_hooks().is_empty());

        harness.focus.notify(true);
        wait_until(|| backend.live_hooks().len() == 4).await;
    }

    #[tokio::test]
    async fn test_default_shortcut_focuses_next_window_once() {
        let mut harness = start(true);
        let backend = harness.backend.clone();
        wait_until(|| backend.live_hooks().len() == 4).await;

        assert!(backend.fire("Control+Shift+KeyN", KeyState::Pressed));
        assert!(backend.fire("Control+Shift+KeyN", KeyState::Released));

        let call = tokio::time::timeout(Duration::from_secs(1), harness.calls.recv())
            .await
            .unwrap();
        assert_eq!(call, Some((ShortcutAction::Next, None)));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(harness.calls.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shared_shortcut_fires_first_action_only() {
        let mut harness = start(true);
        let backend = harness.backend.clone();
        wait_until(|| backend.live_hooks().len() == 4).await;

        harness
            .kv
            .set(DEFAULT_STORAGE_KEY, json!({"next": "Control+KeyJ", "prev": "Control+KeyJ"}))
            .await
            .unwrap();
        wait_until(|| {
            let hooks = backend.live_hooks();
            hooks.len() == 3 && hooks.contains(&"Control+KeyJ".to_string())
        })
        .await;

        assert!(backend.fire("Control+KeyJ", KeyState::Pressed));
        let call = tokio::time::timeout(Duration::from_secs(1), harness.calls.recv())
            .await
            .unwrap();
        assert_eq!(call, Some((ShortcutAction::Next, None)));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(harness.calls.try_recv().is_err());
    }
}
