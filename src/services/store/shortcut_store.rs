use crate::error::Result;
use crate::shortcuts::{CanonicalShortcut, ShortcutAction, ShortcutBinding};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use super::kv::KeyValueStore;

pub const DEFAULT_STORAGE_KEY: &str = "shortcuts";

/// Текущие назначения горячих клавиш поверх хранилища ключ-значение.
///
/// Изменения публикуются через `watch`, так что подписчик видит только
/// последнее значение и не получает уведомлений о повторной записи того же.
pub struct ShortcutStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    current: watch::Sender<ShortcutBinding>,
    update_lock: Mutex<()>,
}

impl ShortcutStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (current, _) = watch::channel(ShortcutBinding::empty());
        Self {
            backend,
            key: key.into(),
            current,
            update_lock: Mutex::new(()),
        }
    }

    /// Прочитать назначения. Отсутствие, пустой объект или повреждённые данные
    /// дают пустой набор, то есть все действия на комбинациях по умолчанию;
    /// ошибка наружу не уходит.
    ///
    /// Чтение и публикация идут под тем же замком, что и запись, иначе
    /// медленное чтение опубликовало бы набор старше только что сохранённого.
    pub async fn load(&self) -> ShortcutBinding {
        let _guard = self.update_lock.lock().await;

        let binding = self.read_or_empty().await;
        self.publish(binding.clone());
        binding
    }

    async fn read_or_empty(&self) -> ShortcutBinding {
        match self.read_persisted().await {
            Ok(Some(binding)) => binding,
            Ok(None) => ShortcutBinding::empty(),
            Err(e) => {
                warn!("Сохранённые назначения повреждены ({}), используются значения по умолчанию", e);
                ShortcutBinding::empty()
            }
        }
    }

    async fn read_persisted(&self) -> Result<Option<ShortcutBinding>> {
        let Some(value) = self.backend.get(&self.key).await? else {
            return Ok(None);
        };
        let binding = ShortcutBinding::from_persisted(&value)?;
        Ok((!binding.is_empty()).then_some(binding))
    }

    /// Заменить назначение одного действия и сохранить весь набор целиком.
    /// Набор перечитывается из хранилища, так что запись другого процесса не теряется.
    pub async fn update(&self, action: ShortcutAction, shortcut: CanonicalShortcut) -> Result<ShortcutBinding> {
        let _guard = self.update_lock.lock().await;

        let mut next = self.read_or_empty().await;
        let previous = next.set(action, shortcut);
        self.persist(&next).await?;

        info!(
            "Назначение {} изменено: {} -> {}",
            action,
            previous.map(|s| s.to_string()).unwrap_or_else(|| "по умолчанию".to_string()),
            shortcut
        );
        self.publish(next.clone());
        Ok(next)
    }

    /// Убрать явное назначение, действие вернётся к комбинации по умолчанию
    pub async fn reset(&self, action: ShortcutAction) -> Result<ShortcutBinding> {
        let _guard = self.update_lock.lock().await;

        let mut next = self.read_or_empty().await;
        next.unset(action);
        self.persist(&next).await?;

        info!("Назначение {} сброшено на {}", action, action.default_shortcut());
        self.publish(next.clone());
        Ok(next)
    }

    async fn persist(&self, binding: &ShortcutBinding) -> Result<()> {
        self.backend.set(&self.key, binding.to_persisted()).await
    }

    fn publish(&self, binding: ShortcutBinding) {
        self.current.send_if_modified(|current| {
            if *current == binding {
                false
            } else {
                *current = binding;
                true
            }
        });
    }

    #[cfg(test)]
    pub fn current(&self) -> ShortcutBinding {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ShortcutBinding> {
        self.current.subscribe()
    }
}
