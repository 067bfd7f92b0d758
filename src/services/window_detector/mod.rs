//! WindowDetector: источник уведомлений о фокусе.
//!
//! Модуль только определяет активное окно и решает, относится ли оно к панели
//! управления или к управляемым окнам. Результат уходит в канал `FocusEvent`,
//! дальше им распоряжается FocusTracker.

mod dry_run;
mod kdotool;
mod probe;
mod sway;
mod r#trait;
mod window_detector;
mod wmctrl;
mod xdotool;

pub use self::r#trait::create_window_detector;
