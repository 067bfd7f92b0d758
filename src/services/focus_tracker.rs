use crate::events::FocusEvent;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Сводит уведомления о фокусе к одному флагу "глобальные клавиши активны".
///
/// Хранит только последнее значение. Повтор текущего значения ничего не меняет
/// и не будит подписчиков.
pub struct FocusTracker {
    state: watch::Sender<bool>,
}

impl FocusTracker {
    pub fn new(initially_active: bool) -> Self {
        let (state, _) = watch::channel(initially_active);
        Self { state }
    }

    /// Применить уведомление, вернуть `true`, если значение изменилось
    pub fn notify(&self, focused: bool) -> bool {
        self.state.send_if_modified(|current| {
            if *current == focused {
                false
            } else {
                *current = focused;
                true
            }
        })
    }

    pub fn is_active(&self) -> bool {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Потребитель входящего потока уведомлений; завершается, когда все отправители закрыты
    pub async fn run(&self, mut events: mpsc::Receiver<FocusEvent>) {
        info!("FocusTracker запущен (активен: {})", self.is_active());

        while let Some(event) = events.recv().await {
            if self.notify(event.focused) {
                info!("Глобальные клавиши {}: {}", if event.focused { "включены" } else { "выключены" }, event);
            } else {
                debug!("Повторное уведомление о фокусе проигнорировано: {}", event);
            }
        }

        info!("Поток уведомлений о фокусе закрыт");
    }
}
