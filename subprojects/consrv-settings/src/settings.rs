//! Console settings and their built-in defaults.

use alloc::string::String;

/// Default 16-entry color table, as `0x00BBGGRR` values.
pub const DEFAULT_COLOR_TABLE: [u32; 16] = [
    0x0000_0000, // black
    0x0080_0000, // blue
    0x0000_8000, // green
    0x0080_8000, // cyan
    0x0000_0080, // red
    0x0080_0080, // magenta
    0x0000_8080, // brown
    0x00C0_C0C0, // light gray
    0x0080_8080, // dark gray
    0x00FF_0000, // light blue
    0x0000_FF00, // light green
    0x00FF_FF00, // light cyan
    0x0000_00FF, // light red
    0x00FF_00FF, // light magenta
    0x0000_FFFF, // yellow
    0x00FF_FFFF, // white
];

/// Default screen attributes: light gray on black.
pub const DEFAULT_SCREEN_ATTRIBUTES: u16 = 0x07;

/// Default popup attributes: magenta on white.
pub const DEFAULT_POPUP_ATTRIBUTES: u16 = 0xF5;

/// Maximum face name length, in characters.
pub const FACE_NAME_LENGTH: usize = 31;

const DEFAULT_CURSOR_SIZE: u32 = 25;
const MAX_CURSOR_SIZE: u32 = 100;

/// A pair of 16-bit coordinates, stored as one `u32` (x in the low word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    #[inline]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Unpacks a stored value.
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self {
            x: value as u16,
            y: (value >> 16) as u16,
        }
    }

    /// Packs the pair for storage.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        ((self.y as u32) << 16) | self.x as u32
    }
}

/// Properties of a console window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Color table
    pub colors: [u32; 16],
    /// Commands kept per history buffer
    pub history_buffer_size: u32,
    /// Number of history buffers
    pub number_of_history_buffers: u32,
    /// Discard duplicate history entries
    pub history_no_dup: bool,
    /// Start in full screen mode
    pub full_screen: bool,
    /// Mouse selection without entering mark mode
    pub quick_edit: bool,
    /// Insert rather than overwrite typed characters
    pub insert_mode: bool,
    /// Screen buffer size in character cells
    pub screen_buffer_size: Coord,
    /// Window size in character cells
    pub window_size: Coord,
    /// Cursor size, in percent of the cell height
    pub cursor_size: u32,
    /// Screen text attributes
    pub screen_attributes: u16,
    /// Popup text attributes
    pub popup_attributes: u16,
    /// Font face name
    pub face_name: String,
    /// Font family
    pub font_family: u32,
    /// Font size
    pub font_size: u32,
    /// Font weight
    pub font_weight: u32,
    /// Let the window manager place the window
    pub auto_position: bool,
    /// Window origin, used when `auto_position` is off
    pub window_origin: Coord,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLOR_TABLE,
            history_buffer_size: 50,
            number_of_history_buffers: 4,
            history_no_dup: false,
            full_screen: false,
            quick_edit: false,
            insert_mode: true,
            screen_buffer_size: Coord::new(80, 300),
            window_size: Coord::new(80, 25),
            cursor_size: DEFAULT_CURSOR_SIZE,
            screen_attributes: DEFAULT_SCREEN_ATTRIBUTES,
            popup_attributes: DEFAULT_POPUP_ATTRIBUTES,
            face_name: String::from("Fixedsys"),
            font_family: 0,
            font_size: 0,
            font_weight: 0,
            auto_position: true,
            window_origin: Coord::default(),
        }
    }
}

impl ConsoleSettings {
    /// Sets the cursor size, clamped to 100 percent.
    #[inline]
    pub fn set_cursor_size(&mut self, size: u32) {
        self.cursor_size = size.min(MAX_CURSOR_SIZE);
    }

    /// Sets the face name, truncated to [`FACE_NAME_LENGTH`] characters.
    pub fn set_face_name(&mut self, name: &str) {
        self.face_name.clear();
        self.face_name
            .extend(name.chars().take(FACE_NAME_LENGTH));
    }

    /// Places the window at `origin` and turns automatic placement off.
    #[inline]
    pub fn set_window_position(&mut self, origin: Coord) {
        self.auto_position = false;
        self.window_origin = origin;
    }
}
