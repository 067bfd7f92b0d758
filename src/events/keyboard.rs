use serde::{Deserialize, Serialize};
use std::fmt;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl KeyState {
    /// Значение поля `value` у evdev-события
    pub fn from_evdev_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }
}

/// Модификаторы клавиш
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.shift && !self.alt && !self.meta
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(4);
        if self.ctrl { parts.push("ctrl"); }
        if self.shift { parts.push("shift"); }
        if self.alt { parts.push("alt"); }
        if self.meta { parts.push("meta"); }
        if parts.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

/// Сырое нажатие клавиши: флаги модификаторов и физический код
/// (`KeyN`, `Digit1`, `ControlLeft`...). Код не обязан входить в словарь.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub modifiers: Modifiers,
    pub code: String,
    pub timestamp: std::time::Instant,
}

impl RawKeyEvent {
    pub fn new(modifiers: Modifiers, code: impl Into<String>) -> Self {
        Self {
            modifiers,
            code: code.into(),
            timestamp: std::time::Instant::now(),
        }
    }
}

impl fmt::Display for RawKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({}ms)",
            self.code,
            self.modifiers,
            self.timestamp.elapsed().as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_creation() {
        let modifiers = Modifiers::new().with_ctrl(true).with_shift(true);

        assert!(modifiers.ctrl);
        assert!(modifiers.shift);
        assert!(!modifiers.alt);
        assert!(!modifiers.meta);
        assert!(!modifiers.is_empty());
    }

    #[test]
    fn test_modifiers_display() {
        assert_eq!(Modifiers::new().to_string(), "none");
        let modifiers = Modifiers::new().with_meta(true).with_ctrl(true);
        assert_eq!(modifiers.to_string(), "ctrl+meta");
    }

    #[test]
    fn test_key_state_from_evdev_value() {
        assert_eq!(KeyState::from_evdev_value(1), Some(KeyState::Pressed));
        assert_eq!(KeyState::from_evdev_value(0), Some(KeyState::Released));
        assert_eq!(KeyState::from_evdev_value(2), Some(KeyState::Repeat));
        assert_eq!(KeyState::from_evdev_value(7), None);
    }
}
