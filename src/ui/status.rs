use crate::app::{App, Focus, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC cancel | ENTER search now")
    } else {
        Cow::Borrowed(hints(app))
    };

    let paragraph = Paragraph::new(text).style(app.theme.status_bar);
    f.render_widget(paragraph, area);
}

/// Static keybinding hints for the current view and focus.
fn hints(app: &App) -> &'static str {
    match app.view {
        View::Feed => match app.focus {
            Focus::Chat => "[Enter]send [Ctrl+p]suggest [Ctrl+l]clear [Esc]back [?]help",
            Focus::Categories => "[h/l]category [Tab]articles [/]search [c]hat [?]help [q]uit",
            Focus::Articles => {
                "[Enter]read [/]search [[/]]category [b]ookmark [c]hat [s]ummary [t]rending [B]ookmarks [q]uit"
            }
        },
        View::Reader => "[Esc]back [j/k]scroll [Ctrl+d/u]page [s]ummary [b]ookmark [o]pen [c]hat",
        View::Bookmarks => "[Enter]read [d]elete [r]efresh [o]pen [Esc]back",
        View::Trending => "[j/k]scroll [r]efresh [Esc]back",
    }
}
