use crate::debug_if_enabled;
use crate::error::{OrganizerError, Result};
use crate::events::RawKeyEvent;
use std::sync::atomic::{AtomicBool, Ordering};

use super::canonical::CanonicalShortcut;
use super::key_token::{is_modifier_code, KeyToken};

/// Превратить сырое нажатие в каноническую комбинацию.
///
/// Код должен входить в закрытый словарь, а модификаторы допустимы только
/// как флаги события. Модификаторы выводятся в порядке Control, Shift, Alt, Meta
/// независимо от того, в каком порядке были нажаты.
pub fn normalize(event: &RawKeyEvent) -> Result<CanonicalShortcut> {
    if is_modifier_code(&event.code) {
        return Err(OrganizerError::ModifierKey(event.code.clone()));
    }

    let key = KeyToken::parse(&event.code)
        .ok_or_else(|| OrganizerError::InvalidKey(event.code.clone()))?;

    CanonicalShortcut::new(event.modifiers, key)
}

/// Результат обработки нажатия в режиме захвата
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Захват не активен, событие идёт дальше
    Passthrough,
    /// Событие поглощено, захват продолжается
    Consumed,
    /// Получена основная клавиша, захват завершён
    Captured(CanonicalShortcut),
}

/// Флаг режима захвата комбинации.
///
/// Пока захват активен, каждое событие поглощается до прихода основной
/// (не модификатора) клавиши из словаря, после чего режим выключается сам.
#[derive(Debug, Default)]
pub struct ShortcutCapture {
    active: AtomicBool,
}

impl ShortcutCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn handle(&self, event: &RawKeyEvent) -> CaptureOutcome {
        if !self.is_active() {
            return CaptureOutcome::Passthrough;
        }

        match normalize(event) {
            Ok(shortcut) => {
                // Завершает захват только тот, кто первым сбросил флаг
                if self
                    .active
                    .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    CaptureOutcome::Captured(shortcut)
                } else {
                    CaptureOutcome::Passthrough
                }
            }
            Err(e) => {
                debug_if_enabled!("Захват: событие {} поглощено ({})", event, e);
                CaptureOutcome::Consumed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Modifiers;

    fn event(modifiers: Modifiers, code: &str) -> RawKeyEvent {
        RawKeyEvent::new(modifiers, code)
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for code in ["", "Unidentified", "keyn", "F36", "Numpad10", "KeyNN"] {
            let result = normalize(&event(Modifiers::new().with_ctrl(true), code));
            assert!(matches!(result, Err(OrganizerError::InvalidKey(_))), "code {:?}", code);
        }
    }

    #[test]
    fn test_modifier_codes_rejected_as_terminal() {
        for code in ["ControlLeft", "ShiftRight", "AltLeft", "MetaRight", "Control", "Command"] {
            let result = normalize(&event(Modifiers::new().with_shift(true), code));
            assert!(matches!(result, Err(OrganizerError::ModifierKey(_))), "code {:?}", code);
        }
    }

    #[test]
    fn test_modifier_order_is_fixed() {
        let flags = [
            Modifiers::new().with_meta(true).with_alt(true).with_shift(true).with_ctrl(true),
            Modifiers::new().with_ctrl(true).with_shift(true).with_alt(true).with_meta(true),
        ];
        for modifiers in flags {
            let shortcut = normalize(&event(modifiers, "KeyN")).unwrap();
            assert_eq!(shortcut.to_string(), "Control+Shift+Alt+Meta+KeyN");
        }

        let shortcut = normalize(&event(Modifiers::new().with_alt(true).with_ctrl(true), "F5")).unwrap();
        assert_eq!(shortcut.to_string(), "Control+Alt+F5");
    }

    #[test]
    fn test_bare_key_is_accepted() {
        let shortcut = normalize(&event(Modifiers::new(), "Digit4")).unwrap();
        assert_eq!(shortcut.to_string(), "Digit4");
    }

    #[test]
    fn test_normalized_form_is_stable() {
        let shortcut = normalize(&event(Modifiers::new().with_shift(true).with_ctrl(true), "NumpadAdd")).unwrap();
        let serialized = shortcut.to_string();
        let reparsed: CanonicalShortcut = serialized.parse().unwrap();
        assert_eq!(reparsed.to_string(), serialized);
    }

    #[test]
    fn test_capture_passthrough_when_inactive() {
        let capture = ShortcutCapture::new();
        assert_eq!(
            capture.handle(&event(Modifiers::new(), "KeyA")),
            CaptureOutcome::Passthrough
        );
    }

    #[test]
    fn test_capture_consumes_until_terminal_key() {
        let capture = ShortcutCapture::new();
        capture.begin();

        let ctrl = Modifiers::new().with_ctrl(true);
        assert_eq!(capture.handle(&event(ctrl, "ControlLeft")), CaptureOutcome::Consumed);
        assert_eq!(capture.handle(&event(ctrl, "Unidentified")), CaptureOutcome::Consumed);
        assert!(capture.is_active());

        let outcome = capture.handle(&event(ctrl.with_shift(true), "KeyJ"));
        assert_eq!(
            outcome,
            CaptureOutcome::Captured("Control+Shift+KeyJ".parse().unwrap())
        );
        assert!(!capture.is_active());

        // После завершения события снова проходят насквозь
        assert_eq!(capture.handle(&event(ctrl, "KeyK")), CaptureOutcome::Passthrough);
    }

    #[test]
    fn test_capture_cancel() {
        let capture = ShortcutCapture::new();
        capture.begin();
        capture.cancel();
        assert_eq!(capture.handle(&event(Modifiers::new(), "KeyA")), CaptureOutcome::Passthrough);
    }
}
