//! Registry key names of console settings.

use alloc::string::String;

/// Root key of all console settings.
pub const CONSOLE_KEY: &str = "Console";

/// Replaces the system root directory at the start of a title.
pub const SYSTEM_ROOT_VARIABLE: &str = "%SystemRoot%";

/// Derives the subkey name of a console title.
///
/// A title starting with `system_root` (compared case-insensitively) gets the
/// prefix replaced by [`SYSTEM_ROOT_VARIABLE`], so the key survives a different
/// install location. Backslashes become underscores.
pub fn console_key_name(title: &str, system_root: &str) -> String {
    let mut name = String::with_capacity(title.len() + SYSTEM_ROOT_VARIABLE.len());

    let rest = match title.get(..system_root.len()) {
        Some(prefix) if !system_root.is_empty() && prefix.eq_ignore_ascii_case(system_root) => {
            name.push_str(SYSTEM_ROOT_VARIABLE);
            &title[system_root.len()..]
        }
        _ => title,
    };
    name.push_str(rest);

    name.replace('\\', "_")
}

/// Returns the key path of a console title, relative to the user's hive.
///
/// An empty title addresses the global settings.
pub fn settings_key_path(title: &str, system_root: &str) -> String {
    let mut path = String::from(CONSOLE_KEY);
    if !title.is_empty() {
        path.push('\\');
        path.push_str(&console_key_name(title, system_root));
    }
    path
}
