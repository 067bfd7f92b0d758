use crate::events::KeyState;
use crate::shortcuts::{CanonicalShortcut, ShortcutAction, ShortcutBinding};
use crate::trace_if_enabled;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::dispatcher::ActionDispatcher;
use super::hotkey_backend::{HotkeyBackend, HotkeyCallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrarState {
    /// Ни одной зарегистрированной комбинации
    Inactive,
    /// По одной комбинации на действие
    Active,
}

/// Хук, которым владеет регистратор
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredHook {
    pub shortcut: CanonicalShortcut,
    pub action: ShortcutAction,
}

struct RegistrarInner {
    state: RegistrarState,
    hooks: Vec<RegisteredHook>,
}

/// Приводит набор глобальных клавиш в ОС к паре (назначения, фокус).
///
/// Все переходы выполняются под одним мьютексом, поэтому циклы снятия и
/// регистрации никогда не перемешиваются. Каждая перерегистрация полная:
/// сначала снимаются все свои хуки, потом регистрируются заново.
pub struct HotkeyRegistrar {
    backend: Arc<dyn HotkeyBackend>,
    dispatcher: Arc<ActionDispatcher>,
    inner: Mutex<RegistrarInner>,
}

impl HotkeyRegistrar {
    pub fn new(backend: Arc<dyn HotkeyBackend>, dispatcher: Arc<ActionDispatcher>) -> Self {
        Self {
            backend,
            dispatcher,
            inner: Mutex::new(RegistrarInner {
                state: RegistrarState::Inactive,
                hooks: Vec::new(),
            }),
        }
    }

    /// Перейти в состояние, соответствующее назначениям и фокусу
    pub async fn reconcile(&self, binding: &ShortcutBinding, focused: bool) -> RegistrarState {
        let mut inner = self.inner.lock().await;

        if focused {
            self.activate(&mut inner, binding).await;
        } else {
            self.teardown(&mut inner).await;
        }

        inner.state
    }

    async fn activate(&self, inner: &mut RegistrarInner, binding: &ShortcutBinding) {
        self.teardown(inner).await;

        let mut registered = 0usize;
        for (action, shortcut) in binding.resolved() {
            // Первое действие в фиксированном порядке забирает общую комбинацию
            if let Some(owner) = inner.hooks.iter().find(|hook| hook.shortcut == shortcut) {
                warn!(
                    "Комбинация {} уже назначена действию {}, действие {} без горячей клавиши",
                    shortcut, owner.action, action
                );
                continue;
            }

            match self.backend.register(&shortcut, self.callback_for(action)).await {
                Ok(()) => {
                    debug!("Зарегистрирована {} -> {}", shortcut, action);
                    inner.hooks.push(RegisteredHook { shortcut, action });
                    registered += 1;
                }
                Err(e) => {
                    error!("Не удалось зарегистрировать {} для {}: {}", shortcut, action, e);
                }
            }
        }

        inner.state = RegistrarState::Active;
        info!(
            "Глобальные клавиши активны: {} из {}",
            registered,
            ShortcutAction::ALL.len()
        );
    }

    fn callback_for(&self, action: ShortcutAction) -> HotkeyCallback {
        let dispatcher = Arc::clone(&self.dispatcher);
        Arc::new(move |state| {
            if state == KeyState::Pressed {
                dispatcher.dispatch(action);
            } else {
                trace_if_enabled!("Игнорируем {:?} для {}", state, action);
            }
        })
    }

    /// Снять все свои хуки. Безопасно вызывать повторно.
    async fn teardown(&self, inner: &mut RegistrarInner) {
        let mut failed = false;

        for hook in inner.hooks.drain(..) {
            if let Err(e) = self.backend.unregister(&hook.shortcut).await {
                warn!("Не удалось снять {} ({}): {}", hook.shortcut, hook.action, e);
                failed = true;
            }
        }

        if failed {
            if let Err(e) = self.backend.unregister_all().await {
                error!("unregister_all после частичной ошибки: {}", e);
            }
        }

        if inner.state == RegistrarState::Active {
            info!("Глобальные клавиши сняты");
        }
        inner.state = RegistrarState::Inactive;
    }

    /// Полное снятие перед завершением процесса
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        self.teardown(&mut inner).await;

        if let Err(e) = self.backend.unregister_all().await {
            error!("unregister_all при завершении: {}", e);
        }
    }

    #[cfg(test)]
    pub async fn state(&self) -> RegistrarState {
        self.inner.lock().await.state
    }

    #[cfg(test)]
    pub async fn live_hooks(&self) -> Vec<RegisteredHook> {
        self.inner.lock().await.hooks.clone()
    }
}
