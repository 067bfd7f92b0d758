use crate::error::{OrganizerError, Result};
use crate::events::{Modifiers, RawKeyEvent};
use crate::shortcuts::{CanonicalShortcut, CaptureOutcome, ShortcutCapture};
use std::sync::Arc;
use tracing::info;

use super::r#trait::KeyboardListenerTrait;

/// Захват без устройства: прогоняет заранее заданную последовательность нажатий
pub struct DryRunKeyboardListener {
    script: Vec<RawKeyEvent>,
}

impl DryRunKeyboardListener {
    pub fn new() -> Self {
        let ctrl = Modifiers::new().with_ctrl(true);
        Self::with_script(vec![
            RawKeyEvent::new(ctrl, "ControlLeft"),
            RawKeyEvent::new(ctrl.with_shift(true), "ShiftLeft"),
            RawKeyEvent::new(ctrl.with_shift(true), "KeyJ"),
        ])
    }

    pub fn with_script(script: Vec<RawKeyEvent>) -> Self {
        info!("Инициализация DryRunKeyboardListener");
        Self { script }
    }
}

#[async_trait::async_trait]
impl KeyboardListenerTrait for DryRunKeyboardListener {
    async fn capture(self: Box<Self>, capture: Arc<ShortcutCapture>) -> Result<CanonicalShortcut> {
        info!("Dry-run режим - эмулируем нажатия для захвата");
        capture.begin();

        for event in &self.script {
            match capture.handle(event) {
                CaptureOutcome::Captured(shortcut) => {
                    info!("Dry-run: захвачено {}", shortcut);
                    return Ok(shortcut);
                }
                CaptureOutcome::Consumed => info!("Dry-run: поглощено {}", event),
                CaptureOutcome::Passthrough => break,
            }
        }

        capture.cancel();
        Err(OrganizerError::Internal(
            "Последовательность закончилась без основной клавиши".to_string(),
        ))
    }
}
