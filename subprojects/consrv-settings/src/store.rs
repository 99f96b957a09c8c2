//! Reading and writing console settings through a [`Hive`].

use alloc::{format, string::String};

use crate::{
    hive::{Hive, HiveError, Value},
    key::settings_key_path,
    settings::{ConsoleSettings, Coord},
};

/// Value names.
mod names {
    pub const COLOR_TABLE_PREFIX: &str = "ColorTable";
    pub const HISTORY_BUFFER_SIZE: &str = "HistoryBufferSize";
    pub const NUMBER_OF_HISTORY_BUFFERS: &str = "NumberOfHistoryBuffers";
    pub const HISTORY_NO_DUP: &str = "HistoryNoDup";
    pub const FULL_SCREEN: &str = "FullScreen";
    pub const QUICK_EDIT: &str = "QuickEdit";
    pub const INSERT_MODE: &str = "InsertMode";
    pub const SCREEN_BUFFER_SIZE: &str = "ScreenBufferSize";
    pub const WINDOW_SIZE: &str = "WindowSize";
    pub const CURSOR_SIZE: &str = "CursorSize";
    pub const SCREEN_COLORS: &str = "ScreenColors";
    pub const POPUP_COLORS: &str = "PopupColors";
    pub const FACE_NAME: &str = "FaceName";
    pub const FONT_FAMILY: &str = "FontFamily";
    pub const FONT_SIZE: &str = "FontSize";
    pub const FONT_WEIGHT: &str = "FontWeight";
    pub const WINDOW_POSITION: &str = "WindowPosition";
}

/// Persistent store of console settings.
pub trait SettingsStore {
    /// Overlays the stored settings of `title` onto `settings`.
    ///
    /// Values that are not stored leave the corresponding field untouched.
    fn read_settings(
        &mut self,
        settings: &mut ConsoleSettings,
        title: &str,
        owner: &str,
    ) -> Result<(), SettingsError>;

    /// Stores `settings` for `title`, creating the key if needed.
    ///
    /// An empty title writes every value to the global key. Otherwise only
    /// values that differ from the defaults are kept.
    fn write_settings(
        &mut self,
        settings: &ConsoleSettings,
        title: &str,
        owner: &str,
    ) -> Result<(), SettingsError>;
}

/// Error returned by [`SettingsStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No settings are stored for the title.
    #[error("no settings stored under {0}")]
    NotFound(String),
    /// The underlying storage failed.
    #[error("settings storage failed")]
    Hive(#[source] HiveError),
}

/// [`SettingsStore`] backed by a [`Hive`].
pub struct HiveSettingsStore<H> {
    hive: H,
    system_root: String,
}

impl<H: Hive> HiveSettingsStore<H> {
    /// Creates a store. `system_root` is the system directory, e.g.
    /// `C:\ReactOS`, used to shorten key names.
    pub fn new(hive: H, system_root: impl Into<String>) -> Self {
        Self {
            hive,
            system_root: system_root.into(),
        }
    }

    /// Returns the underlying hive.
    #[inline]
    pub fn hive(&self) -> &H {
        &self.hive
    }

    /// Consumes the store, returning the hive.
    #[inline]
    pub fn into_hive(self) -> H {
        self.hive
    }
}

impl<H: Hive> SettingsStore for HiveSettingsStore<H> {
    fn read_settings(
        &mut self,
        settings: &mut ConsoleSettings,
        title: &str,
        owner: &str,
    ) -> Result<(), SettingsError> {
        let path = settings_key_path(title, &self.system_root);
        let key = match self.hive.open_key(owner, &path, false) {
            Ok(key) => key,
            Err(HiveError::KeyNotFound(_)) => return Err(SettingsError::NotFound(path)),
            Err(err) => return Err(SettingsError::Hive(err)),
        };

        for (name, value) in self.hive.values(&key).map_err(SettingsError::Hive)? {
            if !apply_value(settings, &name, &value) {
                tracing::debug!(%name, ?value, "ignoring console setting");
            }
        }

        Ok(())
    }

    fn write_settings(
        &mut self,
        settings: &ConsoleSettings,
        title: &str,
        owner: &str,
    ) -> Result<(), SettingsError> {
        let path = settings_key_path(title, &self.system_root);
        let key = self
            .hive
            .open_key(owner, &path, true)
            .map_err(SettingsError::Hive)?;

        let mut writer = Writer {
            hive: &mut self.hive,
            key: &key,
            global: title.is_empty(),
        };
        let defaults = ConsoleSettings::default();

        for (idx, (&color, &default)) in settings.colors.iter().zip(&defaults.colors).enumerate() {
            let name = format!("{}{:02}", names::COLOR_TABLE_PREFIX, idx);
            writer.dword(&name, color, default)?;
        }

        writer.dword(
            names::HISTORY_BUFFER_SIZE,
            settings.history_buffer_size,
            defaults.history_buffer_size,
        )?;
        writer.dword(
            names::NUMBER_OF_HISTORY_BUFFERS,
            settings.number_of_history_buffers,
            defaults.number_of_history_buffers,
        )?;
        writer.flag(names::HISTORY_NO_DUP, settings.history_no_dup, defaults.history_no_dup)?;
        writer.flag(names::FULL_SCREEN, settings.full_screen, defaults.full_screen)?;
        writer.flag(names::QUICK_EDIT, settings.quick_edit, defaults.quick_edit)?;
        writer.flag(names::INSERT_MODE, settings.insert_mode, defaults.insert_mode)?;
        writer.dword(
            names::SCREEN_BUFFER_SIZE,
            settings.screen_buffer_size.to_u32(),
            defaults.screen_buffer_size.to_u32(),
        )?;
        writer.dword(
            names::WINDOW_SIZE,
            settings.window_size.to_u32(),
            defaults.window_size.to_u32(),
        )?;
        writer.dword(names::CURSOR_SIZE, settings.cursor_size, defaults.cursor_size)?;
        writer.dword(
            names::SCREEN_COLORS,
            settings.screen_attributes.into(),
            defaults.screen_attributes.into(),
        )?;
        writer.dword(
            names::POPUP_COLORS,
            settings.popup_attributes.into(),
            defaults.popup_attributes.into(),
        )?;
        writer.string(names::FACE_NAME, &settings.face_name, &defaults.face_name)?;
        writer.dword(names::FONT_FAMILY, settings.font_family, defaults.font_family)?;
        writer.dword(names::FONT_SIZE, settings.font_size, defaults.font_size)?;
        writer.dword(names::FONT_WEIGHT, settings.font_weight, defaults.font_weight)?;

        if settings.auto_position {
            writer.remove(names::WINDOW_POSITION)?;
        } else {
            writer.put(
                names::WINDOW_POSITION,
                Value::Dword(settings.window_origin.to_u32()),
            )?;
        }

        Ok(())
    }
}

/// Returns default settings overlaid with the stored ones.
///
/// When nothing can be read for `title`, the defaults are written back so
/// the key exists next time. Storage failures are logged, never returned.
pub fn load_settings<S: SettingsStore + ?Sized>(
    store: &mut S,
    title: &str,
    owner: &str,
) -> ConsoleSettings {
    let mut settings = ConsoleSettings::default();

    if let Err(err) = store.read_settings(&mut settings, title, owner) {
        tracing::debug!(%err, "writing default console settings");
        if let Err(err) = store.write_settings(&settings, title, owner) {
            tracing::warn!(%err, "failed to store default console settings");
        }
    }

    settings
}

/// Applies one stored value. Returns `false` for unknown names and
/// mismatched types.
fn apply_value(settings: &mut ConsoleSettings, name: &str, value: &Value) -> bool {
    if name == names::FACE_NAME {
        let Some(face) = value.as_str() else {
            return false;
        };
        settings.set_face_name(face);
        return true;
    }

    let Some(dword) = value.as_dword() else {
        return false;
    };

    if let Some(index) = name.strip_prefix(names::COLOR_TABLE_PREFIX) {
        return match index.parse::<usize>() {
            Ok(idx) if idx < settings.colors.len() => {
                settings.colors[idx] = dword;
                true
            }
            _ => false,
        };
    }

    match name {
        names::HISTORY_BUFFER_SIZE => settings.history_buffer_size = dword,
        names::NUMBER_OF_HISTORY_BUFFERS => settings.number_of_history_buffers = dword,
        names::HISTORY_NO_DUP => settings.history_no_dup = dword != 0,
        names::FULL_SCREEN => settings.full_screen = dword != 0,
        names::QUICK_EDIT => settings.quick_edit = dword != 0,
        names::INSERT_MODE => settings.insert_mode = dword != 0,
        names::SCREEN_BUFFER_SIZE => settings.screen_buffer_size = Coord::from_u32(dword),
        names::WINDOW_SIZE => settings.window_size = Coord::from_u32(dword),
        names::CURSOR_SIZE => settings.set_cursor_size(dword),
        names::SCREEN_COLORS => settings.screen_attributes = dword as u16,
        names::POPUP_COLORS => settings.popup_attributes = dword as u16,
        names::FONT_FAMILY => settings.font_family = dword,
        names::FONT_SIZE => settings.font_size = dword,
        names::FONT_WEIGHT => settings.font_weight = dword,
        names::WINDOW_POSITION => settings.set_window_position(Coord::from_u32(dword)),
        _ => return false,
    }
    true
}

/// Writes values, skipping defaults unless the global key is targeted.
struct Writer<'a, H: Hive> {
    hive: &'a mut H,
    key: &'a H::Key,
    global: bool,
}

impl<H: Hive> Writer<'_, H> {
    fn dword(&mut self, name: &str, value: u32, default: u32) -> Result<(), SettingsError> {
        if self.global || value != default {
            self.put(name, Value::Dword(value))
        } else {
            self.remove(name)
        }
    }

    fn flag(&mut self, name: &str, value: bool, default: bool) -> Result<(), SettingsError> {
        self.dword(name, value.into(), default.into())
    }

    fn string(&mut self, name: &str, value: &str, default: &str) -> Result<(), SettingsError> {
        if self.global || value != default {
            self.put(name, Value::String(value.into()))
        } else {
            self.remove(name)
        }
    }

    fn put(&mut self, name: &str, value: Value) -> Result<(), SettingsError> {
        self.hive
            .set(self.key, name, value)
            .map_err(SettingsError::Hive)
    }

    fn remove(&mut self, name: &str) -> Result<(), SettingsError> {
        self.hive.delete(self.key, name).map_err(SettingsError::Hive)
    }
}
