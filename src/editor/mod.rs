//! Host-agnostic editing sessions over the menu and widget stores.
//!
//! An editor owns one store plus the current selection and turns user
//! gestures into store calls. Prompts go through [`Dialogs`](crate::host::Dialogs),
//! passed in per call so the host can own its terminal or window in between.

pub mod menu;
pub mod widget;

pub use menu::{MenuDetail, MenuEditor};
pub use widget::{WidgetDetail, WidgetEditor};

pub(crate) const CONFIRM_HEADING: u32 = 30112;
pub(crate) const CONFIRM_DELETE: u32 = 30113;
pub(crate) const UNSET_LABEL: u32 = 30116;

/// One line of the list an editor shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    /// Secondary text: action type for menu items, widget kind for widgets.
    pub detail: String,
    pub visible: bool,
    pub has_children: bool,
}

/// Step `value` forward or backward through `0..count`, wrapping at both ends.
/// An unset `-1` steps to the first entry going forward.
pub(crate) fn cycle(value: i32, count: usize, forward: bool) -> i32 {
    if count == 0 {
        return -1;
    }
    let count = count as i32;
    let step = if forward { 1 } else { -1 };
    (value + step).rem_euclid(count)
}

/// Move a list cursor one step, wrapping around.
pub(crate) fn step_cursor(cursor: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (cursor + 1) % len
    } else if cursor == 0 {
        len - 1
    } else {
        cursor - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(-1, 11, true), 0);
        assert_eq!(cycle(-1, 11, false), 9);
        assert_eq!(cycle(10, 11, true), 0);
        assert_eq!(cycle(0, 3, false), 2);
        assert_eq!(cycle(0, 0, true), -1);
    }

    #[test]
    fn cursor_wraps_like_a_list() {
        assert_eq!(step_cursor(0, 3, false), 2);
        assert_eq!(step_cursor(2, 3, true), 0);
        assert_eq!(step_cursor(0, 0, true), 0);
    }
}
