use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Закрытый словарь физических кодов клавиш (W3C `KeyboardEvent.code`).
/// Коды модификаторов входят в словарь, но не могут быть последней клавишей.
static VALID_KEYS: &[&str] = &[
    // Символы и пунктуация
    "Backquote", "Backslash", "BracketLeft", "BracketRight",
    "Comma", "Digit0", "Digit1", "Digit2", "Digit3", "Digit4",
    "Digit5", "Digit6", "Digit7", "Digit8", "Digit9", "Equal",
    "Minus", "Period", "Quote", "Semicolon", "Slash",

    // Буквы (A-Z)
    "KeyA", "KeyB", "KeyC", "KeyD", "KeyE", "KeyF", "KeyG", "KeyH",
    "KeyI", "KeyJ", "KeyK", "KeyL", "KeyM", "KeyN", "KeyO", "KeyP",
    "KeyQ", "KeyR", "KeyS", "KeyT", "KeyU", "KeyV", "KeyW", "KeyX",
    "KeyY", "KeyZ",

    // Управляющие
    "AltLeft", "AltRight", "CapsLock", "ContextMenu", "ControlLeft",
    "ControlRight", "Enter", "MetaLeft", "MetaRight", "ShiftLeft",
    "ShiftRight", "Space", "Tab", "Escape", "Backspace",

    // Стрелки
    "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight",

    // Навигация
    "End", "Home", "Insert", "PageUp", "PageDown", "Delete",

    // Цифровой блок
    "NumLock", "Numpad0", "Numpad1", "Numpad2", "Numpad3", "Numpad4",
    "Numpad5", "Numpad6", "Numpad7", "Numpad8", "Numpad9",
    "NumpadAdd", "NumpadSubtract", "NumpadMultiply", "NumpadDivide",
    "NumpadDecimal", "NumpadEnter", "NumpadEqual", "NumpadComma",
    "NumpadParenLeft", "NumpadParenRight", "NumpadBackspace",
    "NumpadClear", "NumpadClearEntry", "NumpadHash", "NumpadStar",

    // Функциональные
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10",
    "F11", "F12", "F13", "F14", "F15", "F16", "F17", "F18", "F19",
    "F20", "F21", "F22", "F23", "F24", "F25", "F26", "F27", "F28",
    "F29", "F30", "F31", "F32", "F33", "F34", "F35",

    // Мультимедиа и браузер
    "BrowserBack", "BrowserFavorites", "BrowserForward", "BrowserHome",
    "BrowserRefresh", "BrowserSearch", "BrowserStop", "MediaPlayPause",
    "MediaStop", "MediaTrackNext", "MediaTrackPrevious", "AudioVolumeMute",
    "AudioVolumeUp", "AudioVolumeDown",

    // Системные
    "PrintScreen", "ScrollLock", "Pause", "Power", "Eject", "Sleep",
    "WakeUp", "Hyper", "Super", "Turbo", "Abort", "Resume", "Suspend",

    // Международные раскладки
    "IntlBackslash", "IntlRo", "IntlYen", "Lang1", "Lang2", "Lang3",
    "Lang4", "Lang5", "NonConvert", "Convert", "KanaMode", "Hiragana",
    "Katakana", "Zenkaku", "Hankaku",

    // Прочее
    "Fn", "FnLock", "Help", "Props", "Select", "Undo", "Redo", "Cut",
    "Copy", "Paste", "Find", "Open",
];

/// Коды, обозначающие сами модификаторы
static MODIFIER_CODES: &[&str] = &[
    "ControlLeft", "ControlRight", "ShiftLeft", "ShiftRight",
    "AltLeft", "AltRight", "MetaLeft", "MetaRight", "OSLeft", "OSRight",
    "Control", "Shift", "Alt", "Meta", "Command",
];

static KEY_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| VALID_KEYS.iter().copied().collect());

// Регистронезависимый поиск для старых форматов ("SPACE", "f5", "keyn")
static KEY_BY_LOWERCASE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    VALID_KEYS
        .iter()
        .map(|&key| (key.to_lowercase(), key))
        .collect()
});

/// Код клавиши из закрытого словаря
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyToken(&'static str);

impl KeyToken {
    pub const KEY_C: KeyToken = KeyToken("KeyC");
    pub const KEY_N: KeyToken = KeyToken("KeyN");
    pub const KEY_P: KeyToken = KeyToken("KeyP");

    /// Точное совпадение с кодом словаря
    pub fn parse(code: &str) -> Option<Self> {
        KEY_SET.get(code).map(|&key| KeyToken(key))
    }

    /// Разбор с поддержкой старых записей: `N` -> `KeyN`, `1` -> `Digit1`,
    /// любой регистр для остальных кодов.
    pub fn parse_lenient(code: &str) -> Option<Self> {
        if let Some(token) = Self::parse(code) {
            return Some(token);
        }

        let mut chars = code.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                return Self::parse(&format!("Key{}", c.to_ascii_uppercase()));
            }
            if c.is_ascii_digit() {
                return Self::parse(&format!("Digit{}", c));
            }
        }

        KEY_BY_LOWERCASE
            .get(&code.to_lowercase())
            .map(|&key| KeyToken(key))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_modifier(&self) -> bool {
        is_modifier_code(self.0)
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Является ли код клавишей-модификатором (с учётом голых `Control`/`Command`)
pub fn is_modifier_code(code: &str) -> bool {
    MODIFIER_CODES.contains(&code)
}

/// Модификатор в канонической записи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModifierToken {
    Control,
    Shift,
    Alt,
    Meta,
}

impl ModifierToken {
    /// Фиксированный порядок вывода
    pub const CANONICAL_ORDER: [ModifierToken; 4] = [
        ModifierToken::Control,
        ModifierToken::Shift,
        ModifierToken::Alt,
        ModifierToken::Meta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModifierToken::Control => "Control",
            ModifierToken::Shift => "Shift",
            ModifierToken::Alt => "Alt",
            ModifierToken::Meta => "Meta",
        }
    }

    /// Каноническое имя и старые синонимы
    pub fn parse_alias(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "control" | "ctrl" | "commandorcontrol" | "cmdorctrl" => Some(ModifierToken::Control),
            "shift" => Some(ModifierToken::Shift),
            "alt" | "option" => Some(ModifierToken::Alt),
            "meta" | "super" | "cmd" | "command" => Some(ModifierToken::Meta),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_parse() {
        assert_eq!(KeyToken::parse("KeyN"), Some(KeyToken::KEY_N));
        assert_eq!(KeyToken::parse("F35").map(|k| k.as_str()), Some("F35"));
        assert_eq!(KeyToken::parse("keyn"), None);
        assert_eq!(KeyToken::parse("F36"), None);
        assert_eq!(KeyToken::parse("Unidentified"), None);
    }

    #[test]
    fn test_lenient_parse() {
        assert_eq!(KeyToken::parse_lenient("N"), Some(KeyToken::KEY_N));
        assert_eq!(KeyToken::parse_lenient("c"), Some(KeyToken::KEY_C));
        assert_eq!(KeyToken::parse_lenient("7").map(|k| k.as_str()), Some("Digit7"));
        assert_eq!(KeyToken::parse_lenient("SPACE").map(|k| k.as_str()), Some("Space"));
        assert_eq!(KeyToken::parse_lenient("arrowup").map(|k| k.as_str()), Some("ArrowUp"));
        assert_eq!(KeyToken::parse_lenient("?"), None);
    }

    #[test]
    fn test_modifier_detection() {
        assert!(KeyToken::parse("ControlLeft").is_some_and(|k| k.is_modifier()));
        assert!(KeyToken::parse("MetaRight").is_some_and(|k| k.is_modifier()));
        assert!(!KeyToken::KEY_N.is_modifier());
        assert!(is_modifier_code("Command"));
        assert!(!is_modifier_code("CapsLock"));
    }

    #[test]
    fn test_modifier_aliases() {
        assert_eq!(ModifierToken::parse_alias("Ctrl"), Some(ModifierToken::Control));
        assert_eq!(ModifierToken::parse_alias("CommandOrControl"), Some(ModifierToken::Control));
        assert_eq!(ModifierToken::parse_alias("OPTION"), Some(ModifierToken::Alt));
        assert_eq!(ModifierToken::parse_alias("Super"), Some(ModifierToken::Meta));
        assert_eq!(ModifierToken::parse_alias("KeyA"), None);
    }

    #[test]
    fn test_vocabulary_has_no_duplicates() {
        assert_eq!(KEY_SET.len(), VALID_KEYS.len());
    }
}
