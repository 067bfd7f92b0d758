use crate::config::CaptureConfig;
use crate::error::Result;
use crate::shortcuts::{CanonicalShortcut, ShortcutCapture};
use std::sync::Arc;

/// Trait for keyboard listeners that can run in different modes
#[async_trait::async_trait]
pub trait KeyboardListenerTrait {
    /// Включить захват и дождаться основной клавиши; всё, что пришло до неё, поглощается
    async fn capture(self: Box<Self>, capture: Arc<ShortcutCapture>) -> Result<CanonicalShortcut>;
}

/// Factory function to create an appropriate keyboard listener based on the dry_run flag
pub fn create_keyboard_listener(
    config: &CaptureConfig,
    dry_run: bool,
) -> Result<Box<dyn KeyboardListenerTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_keyboard_listener::DryRunKeyboardListener::new()))
    } else {
        Ok(Box::new(super::keyboard_listener::RealKeyboardListener::new(config)?))
    }
}
