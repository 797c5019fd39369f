//! Horizontally scrolling category strip.
//!
//! The strip is wider than the terminal, so it can be panned by dragging
//! with the mouse and scrolls itself to keep the active category centered.
//! Positions are terminal cells relative to the strip's left edge. Pointer
//! handling is a two-state machine ([`DragState`]) that is independent of
//! where the events come from; keyboard selection goes through the same
//! [`select`](CategoryStrip::select) path as clicks.

use crate::feed::ALL_CATEGORIES;
use crate::util::display_width;
use std::time::{Duration, Instant};

/// Cumulative horizontal displacement (cells) above which a press becomes a
/// drag.
pub const DRAG_THRESHOLD: u16 = 3;

/// Scroll cells per cell of pointer movement.
pub const DRAG_MULTIPLIER: i32 = 2;

/// After a real drag, a click arriving within this window is swallowed.
pub const CLICK_GRACE: Duration = Duration::from_millis(100);

/// Blank cells between two options.
pub const OPTION_GAP: u16 = 1;

/// Horizontal padding on each side of a label.
const OPTION_PADDING: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    /// Sent to the API (`"all"` for no filter).
    pub value: String,
    pub label: String,
}

impl CategoryOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    fn span(&self) -> u16 {
        let width = u16::try_from(display_width(&self.label)).unwrap_or(u16::MAX);
        width.saturating_add(OPTION_PADDING * 2)
    }
}

/// "All" followed by every category the service files articles under.
pub fn default_categories() -> Vec<CategoryOption> {
    let mut options = vec![CategoryOption::new(ALL_CATEGORIES, "All")];
    options.extend(
        [
            "Learning",
            "Startup",
            "Tech News",
            "Products & Ideas",
            "Engineering blogs",
            "Machine Learning",
            "Design",
            "Psychology",
            "Neuroscience",
            "Science",
            "Marketing",
            "Others",
        ]
        .into_iter()
        .map(|c| CategoryOption::new(c, c)),
    );
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        start_x: u16,
        start_scroll: u16,
        /// Displacement has exceeded [`DRAG_THRESHOLD`] at some point.
        moved: bool,
    },
}

#[derive(Debug)]
pub struct CategoryStrip {
    options: Vec<CategoryOption>,
    selected: usize,
    scroll: u16,
    viewport: u16,
    drag: DragState,
    suppress_click_until: Option<Instant>,
    /// Scroll offset the centering animation is heading for.
    target_scroll: Option<u16>,
}

impl Default for CategoryStrip {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

impl CategoryStrip {
    pub fn new(options: Vec<CategoryOption>) -> Self {
        Self {
            options,
            selected: 0,
            scroll: 0,
            viewport: 0,
            drag: DragState::Idle,
            suppress_click_until: None,
            target_scroll: None,
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Record the rendered width. Re-centers the active option if the
    /// resize hid it.
    pub fn set_viewport(&mut self, width: u16) {
        if width == self.viewport {
            return;
        }
        self.viewport = width;
        self.scroll = self.scroll.min(self.max_scroll());
        self.target_scroll = self.target_scroll.map(|t| t.min(self.max_scroll()));
        self.ensure_visible();
    }

    pub fn content_width(&self) -> u16 {
        let spans: u16 = self
            .options
            .iter()
            .fold(0u16, |acc, o| acc.saturating_add(o.span()));
        let gaps = OPTION_GAP.saturating_mul(self.options.len().saturating_sub(1) as u16);
        spans.saturating_add(gaps)
    }

    pub fn max_scroll(&self) -> u16 {
        self.content_width().saturating_sub(self.viewport)
    }

    /// `(start, width)` of option `index` in content coordinates.
    pub fn option_bounds(&self, index: usize) -> Option<(u16, u16)> {
        let mut x = 0u16;
        for (i, option) in self.options.iter().enumerate() {
            let span = option.span();
            if i == index {
                return Some((x, span));
            }
            x = x.saturating_add(span).saturating_add(OPTION_GAP);
        }
        None
    }

    /// Option under viewport column `x`, if any (gaps hit nothing).
    pub fn hit_test(&self, x: u16) -> Option<usize> {
        let content_x = self.scroll.saturating_add(x);
        (0..self.options.len()).find(|&i| {
            self.option_bounds(i)
                .is_some_and(|(start, span)| content_x >= start && content_x < start + span)
        })
    }

    // ========================================================================
    // Pointer state machine
    // ========================================================================

    /// Idle → Dragging. Cancels any running centering animation.
    pub fn pointer_down(&mut self, x: u16) {
        self.target_scroll = None;
        self.drag = DragState::Dragging {
            start_x: x,
            start_scroll: self.scroll,
            moved: false,
        };
    }

    pub fn pointer_move(&mut self, x: u16) {
        let DragState::Dragging {
            start_x,
            start_scroll,
            moved,
        } = self.drag
        else {
            return;
        };
        let delta = i32::from(x) - i32::from(start_x);
        let moved = moved || delta.unsigned_abs() > u32::from(DRAG_THRESHOLD);
        let offset = i32::from(start_scroll) - delta * DRAG_MULTIPLIER;
        self.scroll = offset.clamp(0, i32::from(self.max_scroll())) as u16;
        self.drag = DragState::Dragging {
            start_x,
            start_scroll,
            moved,
        };
    }

    /// Dragging → Idle. Returns true if the gesture was a real drag, in
    /// which case the next click within [`CLICK_GRACE`] is suppressed.
    pub fn pointer_up(&mut self, now: Instant) -> bool {
        let was_drag = matches!(self.drag, DragState::Dragging { moved: true, .. });
        self.drag = DragState::Idle;
        if was_drag {
            self.suppress_click_until = Some(now + CLICK_GRACE);
        }
        was_drag
    }

    /// Handle a click at viewport column `x`. Returns the newly selected
    /// category value, or `None` if the click was swallowed, missed, or hit
    /// the active option.
    pub fn click(&mut self, x: u16, now: Instant) -> Option<String> {
        if let Some(until) = self.suppress_click_until.take() {
            if now <= until {
                tracing::trace!("Click suppressed after drag");
                return None;
            }
        }
        let index = self.hit_test(x)?;
        self.select(index).then(|| self.options[index].value.clone())
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Make `index` active. Returns whether the selection changed.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.options.len() || index == self.selected {
            return false;
        }
        self.selected = index;
        self.ensure_visible();
        true
    }

    /// Select by value (e.g. restoring the persisted category).
    pub fn select_value(&mut self, value: &str) -> bool {
        match self
            .options
            .iter()
            .position(|o| o.value.eq_ignore_ascii_case(value))
        {
            Some(index) => self.select(index),
            None => false,
        }
    }

    pub fn next(&mut self) -> Option<String> {
        let index = self.selected + 1;
        self.select(index).then(|| self.selected_value().to_string())
    }

    pub fn prev(&mut self) -> Option<String> {
        let index = self.selected.checked_sub(1)?;
        self.select(index).then(|| self.selected_value().to_string())
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_value(&self) -> &str {
        self.options
            .get(self.selected)
            .map_or(ALL_CATEGORIES, |o| o.value.as_str())
    }

    pub fn options(&self) -> &[CategoryOption] {
        &self.options
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    // ========================================================================
    // Auto-centering
    // ========================================================================

    fn is_fully_visible(&self, index: usize) -> bool {
        match self.option_bounds(index) {
            Some((start, span)) => {
                start >= self.scroll && start + span <= self.scroll.saturating_add(self.viewport)
            }
            None => true,
        }
    }

    /// Start centering the active option if it is clipped.
    fn ensure_visible(&mut self) {
        if self.viewport == 0 || self.is_fully_visible(self.selected) {
            return;
        }
        if let Some((start, span)) = self.option_bounds(self.selected) {
            let center = i32::from(start) + i32::from(span) / 2 - i32::from(self.viewport) / 2;
            let target = center.clamp(0, i32::from(self.max_scroll())) as u16;
            self.target_scroll = Some(target);
        }
    }

    /// Advance the centering animation one step. Returns true if the scroll
    /// offset changed.
    pub fn tick(&mut self) -> bool {
        let Some(target) = self.target_scroll else {
            return false;
        };
        let distance = i32::from(target) - i32::from(self.scroll);
        if distance == 0 {
            self.target_scroll = None;
            return false;
        }
        // Halve the remaining distance each tick, at least one cell.
        let step = if distance.abs() <= 1 {
            distance
        } else {
            distance / 2
        };
        self.scroll = (i32::from(self.scroll) + step) as u16;
        if self.scroll == target {
            self.target_scroll = None;
        }
        true
    }

    pub fn is_animating(&self) -> bool {
        self.target_scroll.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(width: u16) -> CategoryStrip {
        let mut s = CategoryStrip::default();
        s.set_viewport(width);
        s
    }

    fn settle(s: &mut CategoryStrip) {
        while s.tick() {}
    }

    #[test]
    fn layout_spans_and_gaps() {
        let s = strip(40);
        // "All" + padding
        assert_eq!(s.option_bounds(0), Some((0, 5)));
        // "Learning" starts after "All" and one gap.
        assert_eq!(s.option_bounds(1), Some((6, 10)));
        assert_eq!(s.hit_test(0), Some(0));
        assert_eq!(s.hit_test(5), None);
        assert_eq!(s.hit_test(6), Some(1));
        assert!(s.content_width() > 40);
    }

    #[test]
    fn click_selects_without_drag() {
        let mut s = strip(40);
        let now = Instant::now();
        s.pointer_down(7);
        s.pointer_move(8);
        assert!(!s.pointer_up(now));
        assert_eq!(s.click(7, now).as_deref(), Some("Learning"));
        assert_eq!(s.selected_value(), "Learning");
        assert_eq!(s.click(7, now), None);
    }

    #[test]
    fn drag_pans_with_multiplier_and_clamps() {
        let mut s = strip(40);
        s.pointer_down(30);
        s.pointer_move(20);
        assert_eq!(s.scroll(), 20);
        assert!(matches!(s.drag_state(), DragState::Dragging { moved: true, .. }));
        s.pointer_move(35);
        assert_eq!(s.scroll(), 0);
        s.pointer_move(0);
        assert_eq!(s.scroll(), 60.min(s.max_scroll()));
    }

    #[test]
    fn drag_suppresses_next_click_within_grace() {
        let mut s = strip(40);
        let now = Instant::now();
        s.pointer_down(20);
        s.pointer_move(10);
        assert!(s.pointer_up(now));
        assert_eq!(s.click(10, now + Duration::from_millis(50)), None);
        assert_eq!(s.selected(), 0);

        // The flag is consumed: the next tap selects.
        let x = s.option_bounds(3).map(|(start, _)| start - s.scroll()).unwrap();
        assert!(s.click(x, now + Duration::from_millis(60)).is_some());
    }

    #[test]
    fn suppression_expires_after_grace() {
        let mut s = strip(40);
        let now = Instant::now();
        s.pointer_down(20);
        s.pointer_move(15);
        s.pointer_up(now);
        let x = s.option_bounds(2).map(|(start, _)| start - s.scroll()).unwrap();
        assert!(s.click(x, now + CLICK_GRACE + Duration::from_millis(1)).is_some());
    }

    #[test]
    fn small_wobble_is_not_a_drag() {
        let mut s = strip(40);
        s.pointer_down(10);
        s.pointer_move(13);
        s.pointer_move(7);
        assert!(!s.pointer_up(Instant::now()));
    }

    #[test]
    fn keyboard_selection_centers_offscreen_option() {
        let mut s = strip(30);
        let last = s.options().len() - 1;
        assert!(s.select(last));
        assert!(s.is_animating());
        settle(&mut s);
        assert_eq!(s.scroll(), s.max_scroll());
        assert!(s.is_fully_visible(last));

        assert!(s.select(5));
        settle(&mut s);
        let (start, span) = s.option_bounds(5).unwrap();
        let center = start + span / 2;
        let view_center = s.scroll() + 15;
        assert!(center.abs_diff(view_center) <= 1);
    }

    #[test]
    fn pointer_down_cancels_animation() {
        let mut s = strip(30);
        s.select(10);
        assert!(s.tick());
        s.pointer_down(5);
        assert!(!s.is_animating());
        assert!(!s.tick());
    }

    #[test]
    fn next_prev_and_select_value() {
        let mut s = strip(200);
        assert_eq!(s.prev(), None);
        assert_eq!(s.next().as_deref(), Some("Learning"));
        assert_eq!(s.prev().as_deref(), Some("all"));
        assert!(s.select_value("Science"));
        assert!(!s.select_value("Science"));
        assert!(!s.select_value("Nope"));
        assert!(!s.is_animating());
    }
}
