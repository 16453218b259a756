//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::{color_to_string, Config};

impl Config {
    /// Render the config as a commented TOML file that parses back to `self`
    pub fn to_toml(&self) -> String {
        format!(
            r##"# chatview configuration

# Width of the nickname column
nick_col_width = {nick}

# Channel list on the left (when disabled, buffers are shown as tabs at the bottom)
chan_col_enabled = {chan_enabled}
chan_col_width = {chan_width}  # 6 to 24

# Member list on the right
member_col_enabled = {member_enabled}
member_col_width = {member_width}  # 6 to 24

# Wrap messages at this width on wide terminals (0 = use the full width)
text_max_width = {text_max}

# Capture mouse clicks and wheel (CHATVIEW_NO_MOUSE=1 overrides)
mouse = {mouse}

# Set the window title and send desktop notifications through the terminal
local_integrations = {local}

# Colors: "#rrggbb", "ansi:N", a 256-color index, or "default"
[colors]
status = "{status}"
prompt = "{prompt}"
unread = "{unread}"
nicks = "{nicks}"  # base, extended, fixed (CHATVIEW_NICK_COLORS overrides)
# Used by the fixed nick scheme
nicks_self = "{nicks_self}"
nicks_others = "{nicks_others}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to the in-app log buffer)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"  # CHATVIEW_LOG_DIR overrides
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"##,
            nick = self.nick_col_width,
            chan_enabled = self.chan_col_enabled,
            chan_width = self.chan_col_width,
            member_enabled = self.member_col_enabled,
            member_width = self.member_col_width,
            text_max = self.text_max_width,
            mouse = self.mouse,
            local = self.local_integrations,
            status = color_to_string(self.colors.status),
            prompt = color_to_string(self.colors.prompt),
            unread = color_to_string(self.colors.unread),
            nicks = self.colors.nicks.as_str(),
            nicks_self = color_to_string(self.colors.nicks_self),
            nicks_others = color_to_string(self.colors.nicks_others),
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            // forward slashes keep Windows paths valid inside a basic string
            log_file_dir = self.logging.file_dir.display().to_string().replace('\\', "/"),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
