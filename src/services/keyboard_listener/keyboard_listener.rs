use crate::config::CaptureConfig;
use crate::error::{OrganizerError, Result};
use crate::events::{KeyState, RawKeyEvent};
use crate::mappings::EvdevToKeyToken;
use crate::shortcuts::{CanonicalShortcut, CaptureOutcome, ShortcutCapture};
use crate::utils::DeviceFinder;
use crate::debug_if_enabled;
use evdev::{Device, EventType, InputEvent, KeyCode};
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::modifier_state::ModifierState;
use super::r#trait::KeyboardListenerTrait;

/// Код для клавиш, которых нет в словаре: такое нажатие поглощается и захват продолжается
const UNIDENTIFIED: &str = "Unidentified";

/// Захват комбинации с реальной клавиатуры.
///
/// Устройство захватывается эксклюзивно, поэтому нажатия во время захвата не
/// доходят ни до одного другого приложения. Захват снимается в `Drop`.
pub struct RealKeyboardListener {
    device: Device,
    modifier_state: ModifierState,
}

impl RealKeyboardListener {
    pub fn new(config: &CaptureConfig) -> Result<Self> {
        info!("Инициализация RealKeyboardListener");

        let device_path = DeviceFinder::find_keyboard_device(&config.device_path)?;

        let mut device = Device::open(&device_path).map_err(|e| {
            OrganizerError::DeviceNotFound(format!("Не удалось открыть устройство {:?}: {}", device_path, e))
        })?;

        match device.grab() {
            Ok(_) => Self::log_grabbed_device(&device),
            Err(e) => {
                Self::log_grab_error(&device_path, &e);
                return Err(OrganizerError::Permission(format!(
                    "Не удалось захватить устройство эксклюзивно: {}",
                    e
                )));
            }
        }

        Ok(Self {
            device,
            modifier_state: ModifierState::new(),
        })
    }

    fn capture_blocking(&mut self, capture: &ShortcutCapture) -> Result<CanonicalShortcut> {
        capture.begin();
        info!("Нажмите комбинацию клавиш...");

        loop {
            let events: Vec<InputEvent> = self.device.fetch_events()?.collect();

            for event in events {
                let Some(raw) = self.to_raw_event(&event) else {
                    continue;
                };

                match capture.handle(&raw) {
                    CaptureOutcome::Captured(shortcut) => return Ok(shortcut),
                    CaptureOutcome::Consumed => debug_if_enabled!("Поглощено: {}", raw),
                    CaptureOutcome::Passthrough => {
                        return Err(OrganizerError::Internal("Захват отменён".to_string()));
                    }
                }
            }
        }
    }

    /// Нажатие в виде сырого события; отпускания и повторы только обновляют модификаторы
    fn to_raw_event(&mut self, event: &InputEvent) -> Option<RawKeyEvent> {
        if event.event_type() != EventType::KEY {
            return None;
        }

        let key = KeyCode::new(event.code());
        let state = KeyState::from_evdev_value(event.value())?;
        if state == KeyState::Repeat {
            return None;
        }

        self.modifier_state.update_key(key, state == KeyState::Pressed);
        if state != KeyState::Pressed {
            return None;
        }

        let code = EvdevToKeyToken::translate(key).unwrap_or(UNIDENTIFIED);
        Some(RawKeyEvent::new(self.modifier_state.to_modifiers(), code))
    }

    fn log_grabbed_device(device: &Device) {
        info!("Устройство: {}", device.name().unwrap_or("Unknown"));
        info!("Физический путь: {:?}", device.physical_path());
        info!("Устройство захвачено эксклюзивно");
    }

    fn log_grab_error(device_path: &Path, e: &Error) {
        warn!("Не удалось захватить устройство {}: {}", device_path.display(), e);
        warn!("Попробуйте:");
        warn!("1. Добавить пользователя в группу input: sudo usermod -a -G input $USER");
        warn!("2. Перезайти в систему после добавления в группу");
        warn!("3. Указать устройство явно в [capture] device_path");
    }
}

#[async_trait::async_trait]
impl KeyboardListenerTrait for RealKeyboardListener {
    async fn capture(self: Box<Self>, capture: Arc<ShortcutCapture>) -> Result<CanonicalShortcut> {
        let mut listener = self;
        let guard = Arc::clone(&capture);

        // fetch_events блокирует поток, поэтому чтение идёт вне runtime
        let result = tokio::task::spawn_blocking(move || listener.capture_blocking(&capture))
            .await
            .map_err(|e| OrganizerError::Internal(format!("Поток захвата завершился аварийно: {}", e)))?;

        guard.cancel();
        result
    }
}

impl Drop for RealKeyboardListener {
    fn drop(&mut self) {
        info!("Освобождение захваченного устройства");
        if let Err(e) = self.device.ungrab() {
            error!("Не удалось освободить устройство: {}", e);
        }
    }
}
