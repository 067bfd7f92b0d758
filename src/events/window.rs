use serde::{Deserialize, Serialize};
use std::fmt;

/// Информация об окне
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
}

impl WindowInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Проверить, соответствует ли окно паттерну (регистронезависимо)
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        if pattern.is_empty() {
            return false;
        }
        let pattern_lower = pattern.to_lowercase();
        self.title.to_lowercase().contains(&pattern_lower)
            || self.class.to_lowercase().contains(&pattern_lower)
    }

    /// Проверить, соответствует ли окно любому из паттернов.
    /// Пустой список означает "ни одно окно не управляется".
    pub fn matches_any_pattern(&self, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| self.matches_pattern(pattern))
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

/// Уведомление о смене фокуса: `focused == true`, когда фокус у панели
/// управления или у одного из управляемых окон.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub focused: bool,
    pub window: Option<WindowInfo>,
    pub timestamp: std::time::Instant,
}

impl FocusEvent {
    pub fn new(focused: bool, window: Option<WindowInfo>) -> Self {
        Self {
            focused,
            window,
            timestamp: std::time::Instant::now(),
        }
    }
}

impl fmt::Display for FocusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.window {
            Some(window) => write!(f, "focused={} {}", self.focused, window),
            None => write!(f, "focused={}", self.focused),
        }
    }
}
