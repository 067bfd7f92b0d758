//! Модель горячих клавиш: словарь кодов, каноническая запись комбинации,
//! назначения по действиям и нормализация сырых нажатий.

pub mod action;
pub mod binding;
pub mod canonical;
pub mod key_token;
pub mod normalizer;

pub use action::ShortcutAction;
pub use binding::ShortcutBinding;
pub use canonical::CanonicalShortcut;
pub use normalizer::{CaptureOutcome, ShortcutCapture};
