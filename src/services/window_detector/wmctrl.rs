use crate::error::{OrganizerError, Result};
use crate::events::WindowInfo;

use super::probe::run_command;

/// `wmctrl -lx` не помечает активное окно, поэтому id берётся из `xprop`
pub async fn active_window() -> Result<WindowInfo> {
    let root = run_command("xprop", &["-root", "_NET_ACTIVE_WINDOW"]).await?;
    let active_id = parse_active_id(&root)
        .ok_or_else(|| OrganizerError::ServiceUnavailable(format!("xprop: неожиданный ответ '{}'", root)))?;

    let listing = run_command("wmctrl", &["-lx"]).await?;
    listing
        .lines()
        .filter_map(parse_window_line)
        .find(|(id, _)| *id == active_id)
        .map(|(_, window)| window)
        .ok_or_else(|| OrganizerError::ServiceUnavailable("Активное окно не найдено в списке wmctrl".to_string()))
}

/// `_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00007`
fn parse_active_id(output: &str) -> Option<u64> {
    let hex = output.rsplit('#').next()?.trim();
    parse_hex(hex).filter(|id| *id != 0)
}

fn parse_hex(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16).ok()
}

/// `0x03a00007  0 client.Client  host  Title with spaces`
fn parse_window_line(line: &str) -> Option<(u64, WindowInfo)> {
    let mut rest = line.trim_start();
    let mut fields = [""; 4];

    for field in fields.iter_mut() {
        let end = rest.find(char::is_whitespace)?;
        *field = &rest[..end];
        rest = rest[end..].trim_start();
    }

    let id = parse_hex(fields[0])?;
    // WM_CLASS выводится как instance.Class
    let class = fields[2].rsplit('.').next().unwrap_or(fields[2]);
    Some((id, WindowInfo::new(rest.trim_end()).with_class(class)))
}
