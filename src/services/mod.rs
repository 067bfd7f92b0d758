pub mod dispatcher;
pub mod focus_tracker;
pub mod hotkey_backend;
pub mod keyboard_listener;
pub mod registrar;
pub mod shortcut_service;
pub mod store;
pub mod window_commands;
pub mod window_detector;

pub use dispatcher::ActionDispatcher;
pub use focus_tracker::FocusTracker;
pub use hotkey_backend::create_hotkey_backend;
pub use keyboard_listener::create_keyboard_listener;
pub use registrar::HotkeyRegistrar;
pub use shortcut_service::ShortcutService;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, ShortcutStore};
pub use window_commands::create_window_commands;
pub use window_detector::create_window_detector;
