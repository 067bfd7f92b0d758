use crate::debug_if_enabled;
use crate::error::Result;
use crate::shortcuts::ShortcutAction;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info};

use super::window_commands::WindowCommands;

/// Задержка между окнами для ClickAllWithDelay
pub const CLICK_ALL_DELAY_MS: u64 = 100;

/// Счётчики по действию
#[derive(Debug, Default)]
pub struct DispatchStats {
    pub dispatched: AtomicU64,
    pub failed: AtomicU64,
}

/// Запускает внешнюю операцию для сработавшего действия.
///
/// `dispatch` не ждёт завершения: операция уходит в задачу tokio, поэтому поток ОС,
/// вызвавший обработчик, не блокируется. Ошибки пишутся в лог и счётчики,
/// повторов нет.
pub struct ActionDispatcher {
    commands: Arc<dyn WindowCommands>,
    runtime: Handle,
    stats: Arc<DashMap<ShortcutAction, Arc<DispatchStats>>>,
}

impl ActionDispatcher {
    /// Должен вызываться внутри runtime tokio: запоминает его `Handle`
    pub fn new(commands: Arc<dyn WindowCommands>) -> Self {
        Self::with_runtime(commands, Handle::current())
    }

    pub fn with_runtime(commands: Arc<dyn WindowCommands>, runtime: Handle) -> Self {
        Self {
            commands,
            runtime,
            stats: Arc::new(DashMap::new()),
        }
    }

    pub fn dispatch(&self, action: ShortcutAction) {
        let commands = Arc::clone(&self.commands);
        let stats = self.stats_for(action);
        stats.dispatched.fetch_add(1, Ordering::Relaxed);

        debug_if_enabled!("Диспетчеризация действия {}", action);
        self.runtime.spawn(async move {
            match Self::execute(commands.as_ref(), action).await {
                Ok(()) => info!("Действие {} выполнено", action),
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    error!(action = %action, "Действие не выполнено: {}", e);
                }
            }
        });
    }

    /// Таблица действий: по одному вызову внешней операции на действие
    async fn execute(commands: &dyn WindowCommands, action: ShortcutAction) -> Result<()> {
        match action {
            ShortcutAction::Next => commands.focus_next_window().await,
            ShortcutAction::Previous => commands.focus_previous_window().await,
            ShortcutAction::ClickAll => commands.click_all_windows().await,
            ShortcutAction::ClickAllWithDelay => commands.click_all_windows_with_delay(CLICK_ALL_DELAY_MS).await,
        }
    }

    fn stats_for(&self, action: ShortcutAction) -> Arc<DispatchStats> {
        Arc::clone(self.stats.entry(action).or_default().value())
    }

    /// Итог по действиям, пишется при завершении
    pub fn log_summary(&self) {
        for action in ShortcutAction::ALL {
            let (dispatched, failed) = self.stats(action);
            if dispatched > 0 {
                info!(action = %action, dispatched, failed, "Итог диспетчеризации");
            }
        }
    }

    /// (запущено, неудачно) для действия
    pub fn stats(&self, action: ShortcutAction) -> (u64, u64) {
        self.stats
            .get(&action)
            .map(|entry| {
                (
                    entry.dispatched.load(Ordering::Relaxed),
                    entry.failed.load(Ordering::Relaxed),
                )
            })
            .unwrap_or((0, 0))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingCommands;
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_each_action_calls_one_operation() {
        let (commands, mut rx) = RecordingCommands::new(false);
        let dispatcher = ActionDispatcher::new(Arc::new(commands));

        for action in ShortcutAction::ALL {
            dispatcher.dispatch(action);
            let call = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
            let expected_delay = (action == ShortcutAction::ClickAllWithDelay).then_some(CLICK_ALL_DELAY_MS);
            assert_eq!(call, (action, expected_delay));
        }
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_propagated() {
        let (commands, mut rx) = RecordingCommands::new(true);
        let dispatcher = ActionDispatcher::new(Arc::new(commands));

        dispatcher.dispatch(ShortcutAction::ClickAll);
        dispatcher.dispatch(ShortcutAction::ClickAll);
        for _ in 0..2 {
            tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        }

        // Счётчик ошибок обновляется после вызова операции
        for _ in 0..50 {
            if dispatcher.stats(ShortcutAction::ClickAll).1 == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(dispatcher.stats(ShortcutAction::ClickAll), (2, 2));
        assert_eq!(dispatcher.stats(ShortcutAction::Next), (0, 0));

        // Итог читает те же счётчики и не сбрасывает их
        dispatcher.log_summary();
        assert_eq!(dispatcher.stats(ShortcutAction::ClickAll), (2, 2));
    }

    #[test]
    fn test_dispatch_from_foreign_thread() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (commands, mut rx) = RecordingCommands::new(false);
        let dispatcher = Arc::new(ActionDispatcher::with_runtime(Arc::new(commands), runtime.handle().clone()));

        // Как поток ОС: вызов вне runtime не блокируется
        let worker = Arc::clone(&dispatcher);
        std::thread::spawn(move || worker.dispatch(ShortcutAction::Previous))
            .join()
            .unwrap();

        let call = runtime.block_on(async {
            tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap()
        });
        assert_eq!(call, Some((ShortcutAction::Previous, None)));
    }
}
