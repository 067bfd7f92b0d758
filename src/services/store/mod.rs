mod kv;
mod shortcut_store;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use shortcut_store::{ShortcutStore, DEFAULT_STORAGE_KEY};
