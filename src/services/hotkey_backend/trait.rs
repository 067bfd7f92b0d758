use crate::error::Result;
use crate::events::KeyState;
use crate::shortcuts::CanonicalShortcut;
use std::sync::Arc;

/// Обработчик срабатывания: вызывается из потока ОС на нажатие и отпускание
pub type HotkeyCallback = Arc<dyn Fn(KeyState) + Send + Sync>;

/// Регистрация глобальных горячих клавиш на уровне ОС
#[async_trait::async_trait]
pub trait HotkeyBackend: Send + Sync {
    /// Зарегистрировать комбинацию; ошибка `HotkeyConflict`, если она уже занята
    async fn register(&self, shortcut: &CanonicalShortcut, on_event: HotkeyCallback) -> Result<()>;

    /// Снять регистрацию; снятие несуществующей не является ошибкой
    async fn unregister(&self, shortcut: &CanonicalShortcut) -> Result<()>;

    /// Снять всё, что бэкенд ещё считает занятым, в том числе комбинации,
    /// которые ОС раньше отказалась отпустить
    async fn unregister_all(&self) -> Result<()>;
}

/// Factory function to create an appropriate hotkey backend based on the dry_run flag
pub fn create_hotkey_backend(dry_run: bool) -> Result<Arc<dyn HotkeyBackend>> {
    if dry_run {
        Ok(Arc::new(super::dry_run::DryRunHotkeyBackend::new()))
    } else {
        Ok(Arc::new(super::global::GlobalHotkeyBackend::new()?))
    }
}
