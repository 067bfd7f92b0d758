use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::services::store::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub focus: FocusConfig,
    pub commands: CommandsConfig,
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub key: String,
    pub reload_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FocusConfig {
    pub detection_mode: String,
    pub polling_interval_ms: u64,
    pub window_title_patterns: Vec<String>,
    #[serde(default)]
    pub panel_title: Option<String>,
    pub initially_active: bool,
}

/// Команды хоста в виде argv; `{delay_ms}` подставляется для click_all_with_delay
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommandsConfig {
    #[serde(default)]
    pub next: Vec<String>,
    #[serde(default)]
    pub previous: Vec<String>,
    #[serde(default)]
    pub click_all: Vec<String>,
    #[serde(default)]
    pub click_all_with_delay: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    pub device_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("organizer-state.json"),
            key: DEFAULT_STORAGE_KEY.to_string(),
            reload_interval_ms: 1000,
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            detection_mode: "polling".to_string(),
            polling_interval_ms: 500,
            window_title_patterns: vec!["- Beta".to_string()],
            panel_title: None,
            initially_active: true,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_path: "auto".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_interval_ms)
    }
}

impl FocusConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

impl Config {
    /// Значения по умолчанию, затем TOML-файл (если есть), затем переменные `ORGANIZER_*`
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("ORGANIZER_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация хранилища
        if self.storage.key.trim().is_empty() {
            anyhow::bail!("storage.key не может быть пустым");
        }

        if self.storage.reload_interval_ms < 100 {
            anyhow::bail!("reload_interval_ms должно быть минимум 100");
        }

        // Валидация настроек фокуса
        match self.focus.detection_mode.as_str() {
            "polling" | "always" => {}
            _ => anyhow::bail!("Неверный режим детекции фокуса: {}", self.focus.detection_mode),
        }

        if self.focus.polling_interval_ms < 100 {
            anyhow::bail!("polling_interval_ms должно быть минимум 100");
        }

        // Незаданная команда допустима, пустое имя программы нет
        for (name, argv) in [
            ("next", &self.commands.next),
            ("previous", &self.commands.previous),
            ("click_all", &self.commands.click_all),
            ("click_all_with_delay", &self.commands.click_all_with_delay),
        ] {
            if argv.first().is_some_and(|program| program.trim().is_empty()) {
                anyhow::bail!("Пустое имя программы в commands.{}", name);
            }
        }

        if self.capture.device_path.is_empty() {
            anyhow::bail!("capture.device_path не может быть пустым");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.key, "shortcuts");
        assert_eq!(config.focus.polling_interval(), Duration::from_millis(500));
        assert!(config.focus.initially_active);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.focus.window_title_patterns, vec!["- Beta".to_string()]);
        assert!(config.commands.next.is_empty());
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("organizer.toml");
        std::fs::write(
            &path,
            r#"
[focus]
polling_interval_ms = 250
panel_title = "Organizer"

[commands]
next = ["organizer-ctl", "focus", "next"]
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.focus.polling_interval_ms, 250);
        assert_eq!(config.focus.panel_title.as_deref(), Some("Organizer"));
        assert_eq!(config.focus.detection_mode, "polling");
        assert_eq!(config.commands.next, vec!["organizer-ctl", "focus", "next"]);
        assert!(config.commands.previous.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.focus.detection_mode = "dbus".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.focus.polling_interval_ms = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.reload_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.commands.click_all = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
