use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Terminal column width of `s`.
///
/// CJK characters and most emoji occupy two columns; combining marks occupy
/// none. Layout code must use this instead of `str::len`.
///
/// ```
/// use techflow::util::display_width;
///
/// assert_eq!(display_width("Rust"), 4);
/// assert_eq!(display_width("你好"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Byte offset of the longest prefix of `s` that fits in `width` columns.
fn prefix_end(s: &str, width: usize) -> usize {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            return idx;
        }
        used += w;
    }
    s.len()
}

/// Truncates `s` to at most `max_width` columns, appending `...` when text
/// is cut.
///
/// Widths of three columns or fewer cannot hold a character plus the
/// ellipsis, so the plain prefix is returned instead. Borrowed when nothing
/// is cut.
///
/// ```
/// use techflow::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("你好世界", 7), "你好...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width <= ELLIPSIS_WIDTH {
        return Cow::Owned(s[..prefix_end(s, max_width)].to_string());
    }
    let end = prefix_end(s, max_width - ELLIPSIS_WIDTH);
    Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
}

/// Truncates or right-pads `s` with spaces so it occupies exactly `width`
/// columns. Used for fixed-width cells such as category chips.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let truncated = truncate_to_width(s, width);
    let used = display_width(&truncated);
    let mut out = String::with_capacity(truncated.len() + width.saturating_sub(used));
    out.push_str(&truncated);
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

fn is_stripped_control(b: u8) -> bool {
    b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
}

/// Removes terminal control characters and ANSI escape sequences.
///
/// Article titles, summaries and chat responses come from a remote service
/// and are written straight into the terminal, so CSI (`ESC [ ... final`),
/// OSC (`ESC ] ... BEL` or `ESC ] ... ESC \`) and bare `ESC` are dropped
/// along with C0 controls and DEL. Tab, LF and CR survive.
///
/// Clean input (the common case) is returned borrowed after a single byte
/// scan.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if !bytes.iter().any(|&b| b == 0x1b || is_stripped_control(b)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            0x1b => {
                i += 1;
                match bytes.get(i) {
                    Some(b'[') => {
                        i += 1;
                        while let Some(&c) = bytes.get(i) {
                            i += 1;
                            if (0x40..=0x7e).contains(&c) {
                                break;
                            }
                        }
                    }
                    Some(b']') => {
                        i += 1;
                        while let Some(&c) = bytes.get(i) {
                            if c == 0x07 {
                                i += 1;
                                break;
                            }
                            if c == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                                i += 2;
                                break;
                            }
                            i += 1;
                        }
                    }
                    _ => {}
                }
            }
            b if is_stripped_control(b) => i += 1,
            _ => {
                let start = i;
                while i < bytes.len() && bytes[i] != 0x1b && !is_stripped_control(bytes[i]) {
                    i += 1;
                }
                // Only ASCII bytes end a run, so the slice stays on char boundaries.
                out.push_str(&s[start..i]);
            }
        }
    }
    Cow::Owned(out)
}
