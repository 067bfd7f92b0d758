pub mod keyboard;
pub mod window;

pub use keyboard::{KeyState, Modifiers, RawKeyEvent};
pub use window::{FocusEvent, WindowInfo};
