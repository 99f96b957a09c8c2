//! Per-user console settings storage.
//!
//! Console properties live under a per-user `Console` key. Each console title
//! gets its own subkey; the bare `Console` key holds the global settings.
//! Storage is abstracted behind [`Hive`], with [`MemoryHive`] as an in-memory
//! implementation.
//!
//! Per-title keys only hold the values that differ from the built-in
//! defaults, so a title inherits any later change of a default.

#![no_std]

extern crate alloc;

mod hive;
mod key;
mod settings;
mod store;

pub use self::{
    hive::{Hive, HiveError, MemoryHive, MemoryKey, Value},
    key::{CONSOLE_KEY, SYSTEM_ROOT_VARIABLE, console_key_name, settings_key_path},
    settings::{
        ConsoleSettings, Coord, DEFAULT_COLOR_TABLE, DEFAULT_POPUP_ATTRIBUTES,
        DEFAULT_SCREEN_ATTRIBUTES, FACE_NAME_LENGTH,
    },
    store::{HiveSettingsStore, SettingsError, SettingsStore, load_settings},
};
