use crate::config::FocusConfig;
use crate::error::{OrganizerError, Result};
use crate::events::{FocusEvent, WindowInfo};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::probe::WindowProbe;
use super::r#trait::WindowDetectorTrait;

/// Пауза, если ни один способ определения окна не работает
const PROBE_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Решает, держит ли фокус панель управления или управляемое окно
#[derive(Debug, Clone)]
pub struct FocusMatcher {
    panel_title: Option<String>,
    patterns: Vec<String>,
}

impl FocusMatcher {
    pub fn new(panel_title: Option<String>, patterns: Vec<String>) -> Self {
        Self { panel_title, patterns }
    }

    pub fn from_config(config: &FocusConfig) -> Self {
        Self::new(config.panel_title.clone(), config.window_title_patterns.clone())
    }

    pub fn is_relevant(&self, window: &WindowInfo) -> bool {
        let is_panel = self
            .panel_title
            .as_deref()
            .is_some_and(|panel| window.matches_pattern(panel));
        is_panel || window.matches_any_pattern(&self.patterns)
    }
}

/// Отправляет уведомление только при смене значения фокуса
pub(super) struct FocusEmitter {
    matcher: FocusMatcher,
    sender: mpsc::Sender<FocusEvent>,
    last_window: Option<WindowInfo>,
    last_focused: Option<bool>,
}

impl FocusEmitter {
    pub(super) fn new(matcher: FocusMatcher, sender: mpsc::Sender<FocusEvent>) -> Self {
        Self {
            matcher,
            sender,
            last_window: None,
            last_focused: None,
        }
    }

    pub(super) async fn observe(&mut self, window: WindowInfo) -> Result<()> {
        if self.last_window.as_ref() == Some(&window) {
            return Ok(());
        }

        debug!("Смена активного окна на: {}", window);
        let focused = self.matcher.is_relevant(&window);
        self.last_window = Some(window.clone());

        if self.last_focused == Some(focused) {
            return Ok(());
        }
        self.last_focused = Some(focused);

        self.sender
            .send(FocusEvent::new(focused, Some(window)))
            .await
            .map_err(|_| OrganizerError::Internal("Канал уведомлений о фокусе закрыт".to_string()))
    }
}

/// Опрашивает активное окно рабочим способом и переопределяет способ, если он перестал работать
pub struct RealWindowDetector {
    polling_interval: Duration,
    emitter: FocusEmitter,
    probe: Option<WindowProbe>,
}

impl RealWindowDetector {
    pub fn new(config: &FocusConfig, sender: mpsc::Sender<FocusEvent>) -> Self {
        info!("Инициализация RealWindowDetector");
        Self {
            polling_interval: config.polling_interval(),
            emitter: FocusEmitter::new(FocusMatcher::from_config(config), sender),
            probe: None,
        }
    }

    async fn detect_probe() -> Option<WindowProbe> {
        info!("Определяем рабочий способ детекции окон...");
        for probe in WindowProbe::ALL {
            match probe.active_window().await {
                Ok(_) => {
                    info!("Используем {}", probe);
                    return Some(probe);
                }
                Err(e) => debug!("{} не работает: {}", probe, e),
            }
        }
        None
    }

    pub async fn run(mut self) -> Result<()> {
        info!("RealWindowDetector запущен, интервал {:?}", self.polling_interval);

        let mut ticker = interval(self.polling_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let probe = match self.probe {
                Some(probe) => probe,
                None => match Self::detect_probe().await {
                    Some(probe) => {
                        self.probe = Some(probe);
                        probe
                    }
                    None => {
                        error!("Ни один способ не работает. Приостанавливаем детекцию на {:?}", PROBE_RETRY_DELAY);
                        tokio::time::sleep(PROBE_RETRY_DELAY).await;
                        continue;
                    }
                },
            };

            match probe.active_window().await {
                Ok(window) => self.emitter.observe(window).await?,
                Err(e) => {
                    warn!("Способ {} перестал работать: {}. Переопределяем...", probe, e);
                    self.probe = None;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl WindowDetectorTrait for RealWindowDetector {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run().await
    }
}

/// Режим `always`: глобальные клавиши активны независимо от окна
pub struct AlwaysFocusedDetector {
    sender: mpsc::Sender<FocusEvent>,
}

impl AlwaysFocusedDetector {
    pub fn new(sender: mpsc::Sender<FocusEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait::async_trait]
impl WindowDetectorTrait for AlwaysFocusedDetector {
    async fn run(self: Box<Self>) -> Result<()> {
        info!("Детекция фокуса отключена, глобальные клавиши всегда активны");
        self.sender
            .send(FocusEvent::new(true, None))
            .await
            .map_err(|_| OrganizerError::Internal("Канал уведомлений о фокусе закрыт".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FocusMatcher {
        FocusMatcher::new(Some("Organizer".to_string()), vec!["- Beta".to_string()])
    }

    #[test]
    fn test_matcher_panel_and_targets() {
        let matcher = matcher();
        assert!(matcher.is_relevant(&WindowInfo::new("Organizer")));
        assert!(matcher.is_relevant(&WindowInfo::new("Hero - beta")));
        assert!(!matcher.is_relevant(&WindowInfo::new("Browser")));

        let no_panel = FocusMatcher::new(None, Vec::new());
        assert!(!no_panel.is_relevant(&WindowInfo::new("Organizer")));
    }

    #[tokio::test]
    async fn test_emitter_sends_only_on_focus_change() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut emitter = FocusEmitter::new(matcher(), tx);

        emitter.observe(WindowInfo::new("Hero - Beta")).await.unwrap();
        emitter.observe(WindowInfo::new("Hero - Beta")).await.unwrap();
        // Другое управляемое окно: фокус не изменился
        emitter.observe(WindowInfo::new("Mage - Beta")).await.unwrap();
        emitter.observe(WindowInfo::new("Browser")).await.unwrap();
        emitter.observe(WindowInfo::new("Organizer")).await.unwrap();
        drop(emitter);

        let mut values = Vec::new();
        while let Some(event) = rx.recv().await {
            values.push(event.focused);
        }
        assert_eq!(values, vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_closed_channel_is_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut emitter = FocusEmitter::new(matcher(), tx);
        assert!(emitter.observe(WindowInfo::new("Browser")).await.is_err());
    }

    #[tokio::test]
    async fn test_always_mode_sends_single_true() {
        let (tx, mut rx) = mpsc::channel(1);
        Box::new(AlwaysFocusedDetector::new(tx)).run().await.unwrap();

        assert!(rx.recv().await.unwrap().focused);
        assert!(rx.recv().await.is_none());
    }
}
