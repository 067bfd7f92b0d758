pub mod evdev_to_key_token;

pub use evdev_to_key_token::EvdevToKeyToken;
