use crate::error::{OrganizerError, Result};
use crate::events::KeyState;
use crate::shortcuts::CanonicalShortcut;
use crate::trace_if_enabled;
use dashmap::DashMap;
use global_hotkey::hotkey::{Code, HotKey, Modifiers as HotKeyModifiers};
use global_hotkey::{Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::sync::{mpsc, Arc};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use super::r#trait::{HotkeyBackend, HotkeyCallback};

type Reply = oneshot::Sender<std::result::Result<(), HotkeyError>>;

enum Request {
    Register(HotKey, Reply),
    Unregister(HotKey, Reply),
}

/// Что бэкенд считает зарегистрированным в ОС.
///
/// Обработчик убирается сразу при снятии, а сама комбинация остаётся в таблице,
/// пока ОС не подтвердит снятие. Так `unregister_all` может повторить попытку
/// для комбинации, которую ОС отказалась отпустить.
#[derive(Default)]
struct HotkeyTable {
    registered: DashMap<String, HotKey>,
    callbacks: Arc<DashMap<u32, HotkeyCallback>>,
}

impl HotkeyTable {
    fn is_held(&self, key: &str) -> bool {
        self.registered.contains_key(key)
    }

    /// Обработчик ставится до регистрации, чтобы не потерять первое нажатие
    fn prepare(&self, hotkey: HotKey, on_event: HotkeyCallback) {
        self.callbacks.insert(hotkey.id(), on_event);
    }

    fn confirm_registered(&self, key: String, hotkey: HotKey) {
        self.registered.insert(key, hotkey);
    }

    fn abort_register(&self, hotkey: HotKey) {
        self.callbacks.remove(&hotkey.id());
    }

    /// Заглушить комбинацию перед снятием; `None`, если её нет
    fn silence(&self, key: &str) -> Option<HotKey> {
        let hotkey = *self.registered.get(key)?.value();
        self.callbacks.remove(&hotkey.id());
        Some(hotkey)
    }

    fn confirm_released(&self, key: &str) {
        self.registered.remove(key);
    }

    fn held_keys(&self) -> Vec<String> {
        self.registered.iter().map(|entry| entry.key().clone()).collect()
    }
}

/// Глобальные клавиши через `global-hotkey`.
///
/// `GlobalHotKeyManager` живёт в собственном потоке и получает запросы по каналу,
/// события от ОС читает отдельный поток и раздаёт их обработчикам по id.
pub struct GlobalHotkeyBackend {
    requests: mpsc::Sender<Request>,
    table: HotkeyTable,
}

impl GlobalHotkeyBackend {
    pub fn new() -> Result<Self> {
        info!("Инициализация GlobalHotkeyBackend");

        let (requests, rx) = mpsc::channel::<Request>();
        let (init_tx, init_rx) = mpsc::channel::<std::result::Result<(), String>>();

        std::thread::Builder::new()
            .name("hotkey-manager".to_string())
            .spawn(move || Self::manager_loop(rx, init_tx))?;

        init_rx
            .recv()
            .map_err(|_| OrganizerError::Internal("Поток менеджера клавиш завершился при запуске".to_string()))?
            .map_err(OrganizerError::Registration)?;

        let table = HotkeyTable::default();
        let event_callbacks = Arc::clone(&table.callbacks);
        std::thread::Builder::new()
            .name("hotkey-events".to_string())
            .spawn(move || Self::event_loop(event_callbacks))?;

        Ok(Self { requests, table })
    }

    fn manager_loop(rx: mpsc::Receiver<Request>, init_tx: mpsc::Sender<std::result::Result<(), String>>) {
        let manager = match GlobalHotKeyManager::new() {
            Ok(manager) => {
                let _ = init_tx.send(Ok(()));
                manager
            }
            Err(e) => {
                let _ = init_tx.send(Err(format!("Не удалось создать GlobalHotKeyManager: {}", e)));
                return;
            }
        };

        for request in rx {
            match request {
                Request::Register(hotkey, reply) => {
                    let _ = reply.send(manager.register(hotkey));
                }
                Request::Unregister(hotkey, reply) => {
                    let _ = reply.send(manager.unregister(hotkey));
                }
            }
        }

        debug!("Поток менеджера клавиш завершён");
    }

    fn event_loop(callbacks: Arc<DashMap<u32, HotkeyCallback>>) {
        let receiver = GlobalHotKeyEvent::receiver();
        while let Ok(event) = receiver.recv() {
            let state = if event.state == HotKeyState::Pressed {
                KeyState::Pressed
            } else {
                KeyState::Released
            };

            // Обработчик клонируется, чтобы не держать блокировку DashMap во время вызова
            let callback = callbacks.get(&event.id).map(|entry| Arc::clone(entry.value()));
            match callback {
                Some(callback) => callback(state),
                None => trace_if_enabled!("Событие для неизвестной клавиши id={}", event.id),
            }
        }
        error!("Канал событий global-hotkey закрыт");
    }

    async fn call(&self, make: impl FnOnce(Reply) -> Request) -> std::result::Result<(), HotkeyError> {
        let (reply, response) = oneshot::channel();
        if self.requests.send(make(reply)).is_err() {
            return Err(HotkeyError::FailedToRegister("поток менеджера клавиш недоступен".to_string()));
        }
        response
            .await
            .unwrap_or_else(|_| Err(HotkeyError::FailedToRegister("поток менеджера клавиш не ответил".to_string())))
    }
}

/// Перевести каноническую комбинацию в `HotKey`
pub fn to_hotkey(shortcut: &CanonicalShortcut) -> Result<HotKey> {
    let modifiers = shortcut.modifiers();
    let mut mods = HotKeyModifiers::empty();
    if modifiers.ctrl {
        mods |= HotKeyModifiers::CONTROL;
    }
    if modifiers.shift {
        mods |= HotKeyModifiers::SHIFT;
    }
    if modifiers.alt {
        mods |= HotKeyModifiers::ALT;
    }
    if modifiers.meta {
        mods |= HotKeyModifiers::META;
    }

    let code: Code = shortcut.key().as_str().parse().map_err(|_| {
        OrganizerError::InvalidKey(format!("{} не поддерживается global-hotkey", shortcut.key()))
    })?;

    Ok(HotKey::new((!mods.is_empty()).then_some(mods), code))
}

#[async_trait::async_trait]
impl HotkeyBackend for GlobalHotkeyBackend {
    async fn register(&self, shortcut: &CanonicalShortcut, on_event: HotkeyCallback) -> Result<()> {
        let key = shortcut.to_string();
        if self.table.is_held(&key) {
            return Err(OrganizerError::HotkeyConflict(key));
        }

        let hotkey = to_hotkey(shortcut)?;
        self.table.prepare(hotkey, on_event);

        match self.call(|reply| Request::Register(hotkey, reply)).await {
            Ok(()) => {
                self.table.confirm_registered(key, hotkey);
                Ok(())
            }
            Err(e) => {
                self.table.abort_register(hotkey);
                if matches!(e, HotkeyError::AlreadyRegistered(_)) {
                    Err(OrganizerError::HotkeyConflict(key))
                } else {
                    Err(OrganizerError::Registration(format!("{}: {}", key, e)))
                }
            }
        }
    }

    async fn unregister(&self, shortcut: &CanonicalShortcut) -> Result<()> {
        let key = shortcut.to_string();
        let Some(hotkey) = self.table.silence(&key) else {
            return Ok(());
        };

        self.call(|reply| Request::Unregister(hotkey, reply))
            .await
            .map_err(|e| OrganizerError::Registration(format!("{}: {}", key, e)))?;
        self.table.confirm_released(&key);
        Ok(())
    }

    async fn unregister_all(&self) -> Result<()> {
        let mut failures = Vec::new();

        for key in self.table.held_keys() {
            let Some(hotkey) = self.table.silence(&key) else {
                continue;
            };
            match self.call(|reply| Request::Unregister(hotkey, reply)).await {
                Ok(()) => self.table.confirm_released(&key),
                Err(e) => failures.push(format!("{}: {}", key, e)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(OrganizerError::Registration(failures.join("; ")))
        }
    }
}
