use crate::error::{OrganizerError, Result};
use crate::events::WindowInfo;
use std::fmt;
use tokio::process::Command;

use super::{kdotool, sway, wmctrl, xdotool};

/// Способ узнать активное окно
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowProbe {
    Kdotool,
    Xdotool,
    Wmctrl,
    Sway,
}

impl WindowProbe {
    /// Порядок проверки при определении рабочего способа
    pub const ALL: [WindowProbe; 4] = [
        WindowProbe::Kdotool,
        WindowProbe::Xdotool,
        WindowProbe::Wmctrl,
        WindowProbe::Sway,
    ];

    pub async fn active_window(self) -> Result<WindowInfo> {
        match self {
            WindowProbe::Kdotool => kdotool::active_window().await,
            WindowProbe::Xdotool => xdotool::active_window().await,
            WindowProbe::Wmctrl => wmctrl::active_window().await,
            WindowProbe::Sway => sway::active_window().await,
        }
    }
}

impl fmt::Display for WindowProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowProbe::Kdotool => "kdotool",
            WindowProbe::Xdotool => "xdotool",
            WindowProbe::Wmctrl => "wmctrl",
            WindowProbe::Sway => "swaymsg",
        };
        f.write_str(name)
    }
}

/// Запустить утилиту и вернуть её stdout без концевых пробелов
pub(super) async fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| OrganizerError::ServiceUnavailable(format!("{} не найден: {}", program, e)))?;

    if !output.status.success() {
        return Err(OrganizerError::ServiceUnavailable(format!(
            "{} {} вернул ошибку: {}",
            program,
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
