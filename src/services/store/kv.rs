use crate::error::{OrganizerError, Result};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Долговременное хранилище ключ-значение.
/// Чтение и запись одного ключа атомарны: `get` никогда не видит частичную запись.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// JSON-файл с объектом верхнего уровня `{ key: value, ... }`.
/// Запись идёт во временный файл с последующим переименованием.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Хранилище назначений: {}", path.display());
        Self {
            path,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(path: &Path) -> Result<Option<Map<String, Value>>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OrganizerError::Io(e)),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(Some(map)),
            other => Err(OrganizerError::MalformedPersistedState(format!(
                "{}: ожидался JSON-объект, получено {}",
                path.display(),
                other
            ))),
        }
    }

    fn write_object(path: &Path, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(map)?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(Self::read_object(&self.path)?.and_then(|mut map| map.remove(key)))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // Повреждённый файл перезаписывается, а не блокирует сохранение
        let mut map = match Self::read_object(&self.path) {
            Ok(map) => map.unwrap_or_default(),
            Err(e) => {
                debug!("Не удалось прочитать {}: {}, начинаем с пустого объекта", self.path.display(), e);
                Map::new()
            }
        };
        map.insert(key.to_string(), value);
        Self::write_object(&self.path, &map)?;

        debug!("Ключ '{}' сохранён в {}", key, self.path.display());
        Ok(())
    }
}

/// Хранилище в памяти: сухой запуск не пишет на диск, тесты не трогают файлы
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
