//! Integration tests for the category strip: drag-to-scroll, tap-to-select
//! and the centering animation, driven the way the mouse handler drives it.

use proptest::prelude::*;
use std::time::{Duration, Instant};
use techflow::strip::{default_categories, CategoryStrip, DragState, CLICK_GRACE};

fn strip(viewport: u16) -> CategoryStrip {
    let mut strip = CategoryStrip::new(default_categories());
    strip.set_viewport(viewport);
    strip
}

/// Viewport column at the middle of option `index` at the current scroll.
fn column_of(strip: &CategoryStrip, index: usize) -> u16 {
    let (start, width) = strip.option_bounds(index).unwrap();
    start + width / 2 - strip.scroll()
}

fn settle(strip: &mut CategoryStrip) {
    for _ in 0..64 {
        if !strip.tick() {
            break;
        }
    }
}

#[test]
fn tap_selects_the_option_under_the_pointer() {
    let mut strip = strip(200);
    let now = Instant::now();
    let x = column_of(&strip, 2);

    strip.pointer_down(x);
    assert!(!strip.pointer_up(now));
    assert_eq!(strip.click(x, now).as_deref(), Some("Startup"));
    assert_eq!(strip.selected(), 2);
}

#[test]
fn drag_scrolls_and_swallows_the_following_click() {
    let mut strip = strip(40);
    let now = Instant::now();

    strip.pointer_down(30);
    strip.pointer_move(20);
    assert!(matches!(
        strip.drag_state(),
        DragState::Dragging { moved: true, .. }
    ));
    assert_eq!(strip.scroll(), 20);

    assert!(strip.pointer_up(now));
    assert_eq!(strip.click(20, now + Duration::from_millis(50)), None);
    assert_eq!(strip.selected(), 0);

    // The grace window only covers one click.
    let x = column_of(&strip, 3);
    let later = now + CLICK_GRACE + Duration::from_millis(50);
    assert!(strip.click(x, later).is_some());
}

#[test]
fn small_jitter_is_still_a_tap() {
    let mut strip = strip(200);
    let now = Instant::now();
    let x = column_of(&strip, 1);

    strip.pointer_down(x);
    strip.pointer_move(x + 2);
    assert!(!strip.pointer_up(now));
    assert_eq!(strip.click(x, now).as_deref(), Some("Learning"));
}

#[test]
fn keyboard_selection_centers_a_clipped_option() {
    let mut strip = strip(40);
    let last = strip.options().len() - 1;
    for _ in 0..last {
        strip.next();
    }
    assert!(strip.is_animating());
    settle(&mut strip);

    let (start, width) = strip.option_bounds(last).unwrap();
    assert!(start >= strip.scroll());
    assert!(start + width <= strip.scroll() + 40);
    assert_eq!(strip.selected_value(), "Others");
}

#[test]
fn pointer_down_cancels_centering() {
    let mut strip = strip(40);
    for _ in 0..6 {
        strip.next();
    }
    assert!(strip.is_animating());
    strip.pointer_down(10);
    assert!(!strip.is_animating());
    assert!(!strip.tick());
}

proptest! {
    /// Dragging can never scroll outside `[0, max_scroll]`.
    #[test]
    fn drag_stays_in_bounds(
        viewport in 10u16..120,
        start in 0u16..120,
        moves in prop::collection::vec(0u16..200, 1..20),
    ) {
        let mut strip = strip(viewport);
        strip.pointer_down(start);
        for x in moves {
            strip.pointer_move(x);
            prop_assert!(strip.scroll() <= strip.max_scroll());
        }
        strip.pointer_up(Instant::now());
        prop_assert_eq!(strip.drag_state(), DragState::Idle);
    }

    /// Hit testing agrees with the option layout at any scroll offset.
    #[test]
    fn hit_test_matches_bounds(viewport in 20u16..100, index in 0usize..13) {
        let mut strip = strip(viewport);
        strip.select(index);
        settle(&mut strip);
        let (start, width) = strip.option_bounds(index).unwrap();
        let mid = start + width / 2;
        prop_assume!(mid >= strip.scroll() && mid < strip.scroll() + viewport);
        prop_assert_eq!(strip.hit_test(mid - strip.scroll()), Some(index));
    }
}
