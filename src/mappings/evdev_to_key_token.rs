use evdev::KeyCode;

/// Преобразование evdev::KeyCode в физические коды словаря (`KeyN`, `Digit1`, `ControlLeft`...)
pub struct EvdevToKeyToken;

impl EvdevToKeyToken {
    /// Код словаря для клавиши; `None`, если клавиша в словарь не входит
    pub fn translate(key: KeyCode) -> Option<&'static str> {
        let token = match key {
            // Буквенные клавиши
            KeyCode::KEY_A => "KeyA",
            KeyCode::KEY_B => "KeyB",
            KeyCode::KEY_C => "KeyC",
            KeyCode::KEY_D => "KeyD",
            KeyCode::KEY_E => "KeyE",
            KeyCode::KEY_F => "KeyF",
            KeyCode::KEY_G => "KeyG",
            KeyCode::KEY_H => "KeyH",
            KeyCode::KEY_I => "KeyI",
            KeyCode::KEY_J => "KeyJ",
            KeyCode::KEY_K => "KeyK",
            KeyCode::KEY_L => "KeyL",
            KeyCode::KEY_M => "KeyM",
            KeyCode::KEY_N => "KeyN",
            KeyCode::KEY_O => "KeyO",
            KeyCode::KEY_P => "KeyP",
            KeyCode::KEY_Q => "KeyQ",
            KeyCode::KEY_R => "KeyR",
            KeyCode::KEY_S => "KeyS",
            KeyCode::KEY_T => "KeyT",
            KeyCode::KEY_U => "KeyU",
            KeyCode::KEY_V => "KeyV",
            KeyCode::KEY_W => "KeyW",
            KeyCode::KEY_X => "KeyX",
            KeyCode::KEY_Y => "KeyY",
            KeyCode::KEY_Z => "KeyZ",

            // Цифровые клавиши
            KeyCode::KEY_1 => "Digit1",
            KeyCode::KEY_2 => "Digit2",
            KeyCode::KEY_3 => "Digit3",
            KeyCode::KEY_4 => "Digit4",
            KeyCode::KEY_5 => "Digit5",
            KeyCode::KEY_6 => "Digit6",
            KeyCode::KEY_7 => "Digit7",
            KeyCode::KEY_8 => "Digit8",
            KeyCode::KEY_9 => "Digit9",
            KeyCode::KEY_0 => "Digit0",

            // Пунктуация
            KeyCode::KEY_GRAVE => "Backquote",
            KeyCode::KEY_BACKSLASH => "Backslash",
            KeyCode::KEY_LEFTBRACE => "BracketLeft",
            KeyCode::KEY_RIGHTBRACE => "BracketRight",
            KeyCode::KEY_COMMA => "Comma",
            KeyCode::KEY_EQUAL => "Equal",
            KeyCode::KEY_MINUS => "Minus",
            KeyCode::KEY_DOT => "Period",
            KeyCode::KEY_APOSTROPHE => "Quote",
            KeyCode::KEY_SEMICOLON => "Semicolon",
            KeyCode::KEY_SLASH => "Slash",

            // Модификаторы (только как флаги, но код нужен для распознавания)
            KeyCode::KEY_LEFTCTRL => "ControlLeft",
            KeyCode::KEY_RIGHTCTRL => "ControlRight",
            KeyCode::KEY_LEFTSHIFT => "ShiftLeft",
            KeyCode::KEY_RIGHTSHIFT => "ShiftRight",
            KeyCode::KEY_LEFTALT => "AltLeft",
            KeyCode::KEY_RIGHTALT => "AltRight",
            KeyCode::KEY_LEFTMETA => "MetaLeft",
            KeyCode::KEY_RIGHTMETA => "MetaRight",

            // Управляющие
            KeyCode::KEY_CAPSLOCK => "CapsLock",
            KeyCode::KEY_COMPOSE => "ContextMenu",
            KeyCode::KEY_ENTER => "Enter",
            KeyCode::KEY_SPACE => "Space",
            KeyCode::KEY_TAB => "Tab",
            KeyCode::KEY_ESC => "Escape",
            KeyCode::KEY_BACKSPACE => "Backspace",

            // Стрелки и навигация
            KeyCode::KEY_UP => "ArrowUp",
            KeyCode::KEY_DOWN => "ArrowDown",
            KeyCode::KEY_LEFT => "ArrowLeft",
            KeyCode::KEY_RIGHT => "ArrowRight",
            KeyCode::KEY_END => "End",
            KeyCode::KEY_HOME => "Home",
            KeyCode::KEY_INSERT => "Insert",
            KeyCode::KEY_PAGEUP => "PageUp",
            KeyCode::KEY_PAGEDOWN => "PageDown",
            KeyCode::KEY_DELETE => "Delete",

            // Цифровой блок
            KeyCode::KEY_NUMLOCK => "NumLock",
            KeyCode::KEY_KP0 => "Numpad0",
            KeyCode::KEY_KP1 => "Numpad1",
            KeyCode::KEY_KP2 => "Numpad2",
            KeyCode::KEY_KP3 => "Numpad3",
            KeyCode::KEY_KP4 => "Numpad4",
            KeyCode::KEY_KP5 => "Numpad5",
            KeyCode::KEY_KP6 => "Numpad6",
            KeyCode::KEY_KP7 => "Numpad7",
            KeyCode::KEY_KP8 => "Numpad8",
            KeyCode::KEY_KP9 => "Numpad9",
            KeyCode::KEY_KPPLUS => "NumpadAdd",
            KeyCode::KEY_KPMINUS => "NumpadSubtract",
            KeyCode::KEY_KPASTERISK => "NumpadMultiply",
            KeyCode::KEY_KPSLASH => "NumpadDivide",
            KeyCode::KEY_KPDOT => "NumpadDecimal",
            KeyCode::KEY_KPENTER => "NumpadEnter",
            KeyCode::KEY_KPEQUAL => "NumpadEqual",
            KeyCode::KEY_KPCOMMA => "NumpadComma",
            KeyCode::KEY_KPLEFTPAREN => "NumpadParenLeft",
            KeyCode::KEY_KPRIGHTPAREN => "NumpadParenRight",

            // Функциональные клавиши
            KeyCode::KEY_F1 => "F1",
            KeyCode::KEY_F2 => "F2",
            KeyCode::KEY_F3 => "F3",
            KeyCode::KEY_F4 => "F4",
            KeyCode::KEY_F5 => "F5",
            KeyCode::KEY_F6 => "F6",
            KeyCode::KEY_F7 => "F7",
            KeyCode::KEY_F8 => "F8",
            KeyCode::KEY_F9 => "F9",
            KeyCode::KEY_F10 => "F10",
            KeyCode::KEY_F11 => "F11",
            KeyCode::KEY_F12 => "F12",
            KeyCode::KEY_F13 => "F13",
            KeyCode::KEY_F14 => "F14",
            KeyCode::KEY_F15 => "F15",
            KeyCode::KEY_F16 => "F16",
            KeyCode::KEY_F17 => "F17",
            KeyCode::KEY_F18 => "F18",
            KeyCode::KEY_F19 => "F19",
            KeyCode::KEY_F20 => "F20",
            KeyCode::KEY_F21 => "F21",
            KeyCode::KEY_F22 => "F22",
            KeyCode::KEY_F23 => "F23",
            KeyCode::KEY_F24 => "F24",

            // Мультимедиа и браузер
            KeyCode::KEY_BACK => "BrowserBack",
            KeyCode::KEY_BOOKMARKS => "BrowserFavorites",
            KeyCode::KEY_FORWARD => "BrowserForward",
            KeyCode::KEY_HOMEPAGE => "BrowserHome",
            KeyCode::KEY_REFRESH => "BrowserRefresh",
            KeyCode::KEY_SEARCH => "BrowserSearch",
            KeyCode::KEY_STOP => "BrowserStop",
            KeyCode::KEY_PLAYPAUSE => "MediaPlayPause",
            KeyCode::KEY_STOPCD => "MediaStop",
            KeyCode::KEY_NEXTSONG => "MediaTrackNext",
            KeyCode::KEY_PREVIOUSSONG => "MediaTrackPrevious",
            KeyCode::KEY_MUTE => "AudioVolumeMute",
            KeyCode::KEY_VOLUMEUP => "AudioVolumeUp",
            KeyCode::KEY_VOLUMEDOWN => "AudioVolumeDown",

            // Системные
            KeyCode::KEY_SYSRQ => "PrintScreen",
            KeyCode::KEY_SCROLLLOCK => "ScrollLock",
            KeyCode::KEY_PAUSE => "Pause",
            KeyCode::KEY_POWER => "Power",
            KeyCode::KEY_EJECTCD => "Eject",
            KeyCode::KEY_SLEEP => "Sleep",
            KeyCode::KEY_WAKEUP => "WakeUp",

            // Международные раскладки
            KeyCode::KEY_102ND => "IntlBackslash",
            KeyCode::KEY_RO => "IntlRo",
            KeyCode::KEY_YEN => "IntlYen",
            KeyCode::KEY_HANGEUL => "Lang1",
            KeyCode::KEY_HANJA => "Lang2",
            KeyCode::KEY_KATAKANA => "Katakana",
            KeyCode::KEY_HIRAGANA => "Hiragana",
            KeyCode::KEY_HENKAN => "Convert",
            KeyCode::KEY_MUHENKAN => "NonConvert",
            KeyCode::KEY_KATAKANAHIRAGANA => "KanaMode",
            KeyCode::KEY_ZENKAKUHANKAKU => "Zenkaku",

            // Прочее
            KeyCode::KEY_FN => "Fn",
            KeyCode::KEY_HELP => "Help",
            KeyCode::KEY_PROPS => "Props",
            KeyCode::KEY_SELECT => "Select",
            KeyCode::KEY_UNDO => "Undo",
            KeyCode::KEY_REDO => "Redo",
            KeyCode::KEY_CUT => "Cut",
            KeyCode::KEY_COPY => "Copy",
            KeyCode::KEY_PASTE => "Paste",
            KeyCode::KEY_FIND => "Find",
            KeyCode::KEY_OPEN => "Open",

            _ => return None,
        };

        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::key_token::KeyToken;

    #[test]
    fn test_common_keys() {
        assert_eq!(EvdevToKeyToken::translate(KeyCode::KEY_N), Some("KeyN"));
        assert_eq!(EvdevToKeyToken::translate(KeyCode::KEY_1), Some("Digit1"));
        assert_eq!(EvdevToKeyToken::translate(KeyCode::KEY_KPPLUS), Some("NumpadAdd"));
        assert_eq!(EvdevToKeyToken::translate(KeyCode::KEY_LEFTCTRL), Some("ControlLeft"));
        assert_eq!(EvdevToKeyToken::translate(KeyCode::BTN_LEFT), None);
    }

    #[test]
    fn test_every_translation_is_in_vocabulary() {
        for code in 0u16..0x300 {
            if let Some(token) = EvdevToKeyToken::translate(KeyCode::new(code)) {
                assert!(KeyToken::parse(token).is_some(), "{} -> {}", code, token);
            }
        }
    }
}
