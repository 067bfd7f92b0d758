use crate::events::Modifiers;
use evdev::KeyCode;

const LEFT: u8 = 0b01;
const RIGHT: u8 = 0b10;

/// Нажатые модификаторы; левая и правая клавиши учитываются отдельно,
/// чтобы отпускание одной не сбрасывало флаг, пока держится другая.
#[derive(Debug, Default)]
pub struct ModifierState {
    ctrl: u8,
    shift: u8,
    alt: u8,
    meta: u8,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_modifiers(&self) -> Modifiers {
        Modifiers::new()
            .with_ctrl(self.ctrl != 0)
            .with_shift(self.shift != 0)
            .with_alt(self.alt != 0)
            .with_meta(self.meta != 0)
    }

    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        let (slot, side) = match key {
            KeyCode::KEY_LEFTCTRL => (&mut self.ctrl, LEFT),
            KeyCode::KEY_RIGHTCTRL => (&mut self.ctrl, RIGHT),
            KeyCode::KEY_LEFTSHIFT => (&mut self.shift, LEFT),
            KeyCode::KEY_RIGHTSHIFT => (&mut self.shift, RIGHT),
            KeyCode::KEY_LEFTALT => (&mut self.alt, LEFT),
            KeyCode::KEY_RIGHTALT => (&mut self.alt, RIGHT),
            KeyCode::KEY_LEFTMETA => (&mut self.meta, LEFT),
            KeyCode::KEY_RIGHTMETA => (&mut self.meta, RIGHT),
            _ => return,
        };

        if pressed {
            *slot |= side;
        } else {
            *slot &= !side;
        }
    }
}
