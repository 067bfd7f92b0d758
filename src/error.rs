use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Неподдерживаемая клавиша: {0}")]
    InvalidKey(String),

    #[error("Модификатор не может быть основной клавишей: {0}")]
    ModifierKey(String),

    #[error("Повреждённое сохранённое состояние: {0}")]
    MalformedPersistedState(String),

    #[error("Комбинация уже занята: {0}")]
    HotkeyConflict(String),

    #[error("Ошибка регистрации горячей клавиши: {0}")]
    Registration(String),

    #[error("Ошибка выполнения действия {action}: {reason}")]
    DispatchFailure { action: String, reason: String },

    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl OrganizerError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(OrganizerError::DeviceNotFound(msg.into()))
    }

    pub fn dispatch_failure(action: impl ToString, reason: impl Into<String>) -> Self {
        OrganizerError::DispatchFailure {
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
