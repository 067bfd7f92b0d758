//! HotkeyBackend: регистрация глобальных клавиш в ОС.
//!
//! Модуль ничего не знает о действиях и фокусе. Он только связывает строку
//! комбинации с обработчиком; решения о том, что и когда регистрировать,
//! принимает HotkeyRegistrar.

mod dry_run;
mod global;
mod r#trait;

#[cfg(test)]
pub use self::dry_run::{BackendOp, DryRunHotkeyBackend};
pub use self::r#trait::{create_hotkey_backend, HotkeyBackend, HotkeyCallback};
