use crate::error::{OrganizerError, Result};
use crate::events::WindowInfo;
use tracing::debug;

use super::probe::run_command;

/// KDE Wayland: id активного окна, затем его заголовок и класс
pub async fn active_window() -> Result<WindowInfo> {
    let window_id = run_command("kdotool", &["getactivewindow"]).await?;
    debug!("kdotool получил window_id: '{}'", window_id);

    let title = run_command("kdotool", &["getwindowname", &window_id]).await?;
    if title.is_empty() {
        return Err(OrganizerError::ServiceUnavailable("kdotool вернул пустое название".to_string()));
    }

    // Класс не обязателен для сопоставления
    let class = run_command("kdotool", &["getwindowclassname", &window_id])
        .await
        .unwrap_or_default();

    Ok(WindowInfo::new(title).with_class(class))
}
