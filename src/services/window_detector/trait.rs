use crate::config::FocusConfig;
use crate::error::Result;
use crate::events::FocusEvent;
use tokio::sync::mpsc;

/// Trait for window detectors that can run in different modes
#[async_trait::async_trait]
pub trait WindowDetectorTrait {
    /// Run the window detector
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate window detector based on the dry_run flag
/// and `focus.detection_mode`
pub fn create_window_detector(
    config: &FocusConfig,
    sender: mpsc::Sender<FocusEvent>,
    dry_run: bool,
) -> Result<Box<dyn WindowDetectorTrait + Send>> {
    if dry_run {
        return Ok(Box::new(super::dry_run::DryRunDetector::new(config, sender)));
    }

    match config.detection_mode.as_str() {
        "always" => Ok(Box::new(super::window_detector::AlwaysFocusedDetector::new(sender))),
        _ => Ok(Box::new(super::window_detector::RealWindowDetector::new(config, sender))),
    }
}
