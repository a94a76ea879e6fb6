//! Unicode UI icon constants.
//!
//! Uses a BMP-only "safe" subset for broad font coverage (no emoji fonts needed).

pub const ICON_MENU: &str = "☰";
pub const ICON_INFO: &str = "ℹ";
pub const ICON_IMAGE: &str = "▨";
pub const ICON_PALETTE: &str = "◐";
pub const ICON_SIDE_TOGGLE: &str = "⟷";
pub const ICON_ROTATE_CCW: &str = "↺";
pub const ICON_ROTATE_CW: &str = "↻";
pub const ICON_INVERT: &str = "◑";
pub const ICON_FIT: &str = "▣";
pub const ICON_UNDO: &str = "↶";
pub const ICON_REDO: &str = "↷";
pub const ICON_DOWNLOAD: &str = "⇩";
pub const ICON_HISTORY: &str = "☷";
pub const ICON_ADD: &str = "✚";
pub const ICON_REMOVE: &str = "✖";
