use crate::error::{OrganizerError, Result};
use evdev::KeyCode;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Признаки устройств, которые только похожи на клавиатуру
const NON_KEYBOARD_HINTS: [&str; 4] = ["mouse", "deathadder", "touchpad", "trackpoint"];

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти клавиатуру для захвата: явный путь или автопоиск при `auto`
    pub fn find_keyboard_device(device_path: &str) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                OrganizerError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        info!("Начинаем автопоиск клавиатурного устройства...");

        if let Some(device) = Self::find_by_id() {
            info!("Найдено устройство по ID: {:?}", device);
            return Ok(device);
        }

        if let Some(device) = Self::find_by_event_devices()? {
            info!("Найдено устройство среди event устройств: {:?}", device);
            return Ok(device);
        }

        OrganizerError::device_not_found(
            "Не удалось найти клавиатуру. Убедитесь, что пользователь добавлен в группу 'input'",
        )
    }

    /// Приоритет ссылки из /dev/input/by-id; `None`, если это не клавиатура
    fn by_id_priority(name: &str) -> Option<u32> {
        let lower = name.to_lowercase();
        if !lower.contains("event") || !(lower.contains("kbd") || lower.contains("keyboard")) {
            return None;
        }
        if NON_KEYBOARD_HINTS.iter().any(|hint| lower.contains(hint)) {
            return None;
        }

        Some(if lower.ends_with("event-kbd") {
            100
        } else if lower.contains("keyboard") {
            50
        } else {
            10
        })
    }

    fn find_by_id() -> Option<PathBuf> {
        let entries = fs::read_dir("/dev/input/by-id")
            .map_err(|e| debug!("/dev/input/by-id недоступна: {}", e))
            .ok()?;

        let mut candidates: Vec<(PathBuf, u32)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let name = path.file_name()?.to_str()?.to_string();
                let priority = Self::by_id_priority(&name)?;
                Self::is_keyboard_device(&path).then_some((path, priority))
            })
            .collect();

        candidates.sort_by(|a, b| b.1.cmp(&a.1));
        candidates.into_iter().next().map(|(path, _)| path)
    }

    fn find_by_event_devices() -> Result<Option<PathBuf>> {
        let entries = fs::read_dir("/dev/input")
            .map_err(|e| OrganizerError::Permission(format!("Нет доступа к /dev/input: {}", e)))?;

        let mut event_devices: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("event"))
            })
            .collect();
        event_devices.sort();

        Ok(event_devices.into_iter().find(|path| Self::is_keyboard_device(path)))
    }

    fn is_keyboard_device(device_path: &Path) -> bool {
        let device = match evdev::Device::open(device_path) {
            Ok(device) => device,
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                return false;
            }
        };

        let device_name = device.name().unwrap_or("Unknown").to_lowercase();
        if NON_KEYBOARD_HINTS.iter().any(|hint| device_name.contains(hint)) {
            debug!("Исключаем устройство {:?} ({})", device_path, device_name);
            return false;
        }

        // У настоящей клавиатуры есть буквы, пробел, Enter и много других клавиш
        let has_keys = device.supported_keys().is_some_and(|keys| {
            keys.contains(KeyCode::KEY_A)
                && keys.contains(KeyCode::KEY_SPACE)
                && keys.contains(KeyCode::KEY_ENTER)
                && keys.iter().count() > 20
        });

        debug!("Устройство {:?} ({}) клавиатура: {}", device_path, device_name, has_keys);
        has_keys
    }
}
