//! Data preparation: raw rows -> windowed series with anchors.
//!
//! - date index + typed values (`normalize`)
//! - monthly means broadcast onto days (`aggregate`)
//! - display window + anchor policies (`window`)

pub mod aggregate;
pub mod normalize;
pub mod window;

pub use aggregate::{apply_monthly_means, monthly_means};
pub use normalize::normalize;
pub use window::{AnchorPolicy, CalendarOffset, PositionalOffset, YEAR_AGO_ROWS, apply_window, select_anchors};
