use crate::error::{OrganizerError, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const INPUT_DIR: &str = "/dev/input";

/// Захват с клавиатуры требует чтения /dev/input
pub fn check_capture_permissions() -> Result<()> {
    info!("Проверка прав доступа к {}...", INPUT_DIR);
    check_input_devices_access(Path::new(INPUT_DIR))?;
    warn_if_root();
    Ok(())
}

fn check_input_devices_access(input_dir: &Path) -> Result<()> {
    if !input_dir.exists() {
        return Err(OrganizerError::Permission(format!(
            "Директория {} не существует",
            input_dir.display()
        )));
    }

    fs::read_dir(input_dir).map_err(|e| {
        OrganizerError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            input_dir.display(),
            e
        ))
    })?;

    info!("Доступ к {} подтвержден", input_dir.display());
    Ok(())
}

fn warn_if_root() {
    match std::env::var("USER") {
        // Глобальные клавиши и команды окон должны работать в сессии пользователя
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Для захвата достаточно группы 'input': sudo usermod -a -G input $USER");
        }
        Ok(user) => info!("Приложение запущено от имени пользователя: {}", user),
        Err(_) => warn!("Не удалось определить пользователя"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_dir_is_permission_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_input_devices_access(&dir.path().join("absent"));
        assert!(matches!(result, Err(OrganizerError::Permission(_))));
    }

    #[test]
    fn test_readable_dir_passes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_input_devices_access(dir.path()).is_ok());
    }
}
