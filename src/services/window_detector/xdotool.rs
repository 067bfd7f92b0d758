use crate::error::Result;
use crate::events::WindowInfo;
use tracing::debug;

use super::probe::run_command;

pub async fn active_window() -> Result<WindowInfo> {
    debug!("Попытка получить активное окно через xdotool");
    let title = run_command("xdotool", &["getactivewindow", "getwindowname"]).await?;

    let class = match run_command("xdotool", &["getactivewindow", "getwindowclassname"]).await {
        Ok(class) => class,
        Err(e) => {
            debug!("Не удалось получить класс окна: {}", e);
            String::new()
        }
    };

    Ok(WindowInfo::new(title).with_class(class))
}
