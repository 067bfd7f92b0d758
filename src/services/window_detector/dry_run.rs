use crate::config::FocusConfig;
use crate::error::Result;
use crate::events::{FocusEvent, WindowInfo};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::info;

use super::r#trait::WindowDetectorTrait;
use super::window_detector::{FocusEmitter, FocusMatcher};

const FAKE_WINDOWS: [&str; 4] = ["Organizer", "Hero - Beta", "Browser - dry_run", "Mage - Beta"];

pub struct DryRunDetector {
    emitter: FocusEmitter,
    period: Duration,
}

impl DryRunDetector {
    pub fn new(config: &FocusConfig, sender: mpsc::Sender<FocusEvent>) -> Self {
        // Панель эмуляции всегда считается своей, даже если panel_title не задан
        let panel = config.panel_title.clone().or_else(|| Some(FAKE_WINDOWS[0].to_string()));
        Self {
            emitter: FocusEmitter::new(FocusMatcher::new(panel, config.window_title_patterns.clone()), sender),
            period: Duration::from_secs(10),
        }
    }

    #[cfg(test)]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

#[async_trait::async_trait]
impl WindowDetectorTrait for DryRunDetector {
    async fn run(mut self: Box<Self>) -> Result<()> {
        info!("Dry-run режим - WindowDetector работает в режиме эмуляции");

        let mut ticker = interval(self.period);
        for title in FAKE_WINDOWS.iter().cycle() {
            ticker.tick().await;

            let fake_window = WindowInfo::new(*title).with_class("DryRun");
            info!("Dry-run: эмулируем смену окна на: {}", fake_window);
            self.emitter.observe(fake_window).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cycles_focus_until_receiver_closes() {
        let (tx, mut rx) = mpsc::channel(1);
        let detector = DryRunDetector::new(&FocusConfig::default(), tx).with_period(Duration::from_millis(1));
        let task = tokio::spawn(Box::new(detector).run());

        let mut values = Vec::new();
        for _ in 0..3 {
            values.push(rx.recv().await.unwrap().focused);
        }
        drop(rx);

        assert_eq!(values, vec![true, false, true]);
        assert!(task.await.unwrap().is_err());
    }
}
