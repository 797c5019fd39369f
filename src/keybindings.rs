//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, not match arms, so users can remap any action from
//! the `[keybindings]` table of config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    CycleFocus,
    Back,
    Select,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    NextCategory,
    PrevCategory,
    LoadMore,
    Refresh,
    Retry,
    DismissError,
    ToggleBookmark,
    OpenInBrowser,
    OpenChat,
    Summarize,
    SendMessage,
    ClearChat,
    InsertSuggestion,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ExitReader,
    ViewBookmarks,
    ViewTrending,
    RemoveBookmark,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::CycleFocus => "Cycle panel focus",
            Self::Back => "Go back / dismiss",
            Self::Select => "Select / open",
            Self::EnterSearch => "Enter search mode",
            Self::ExitSearch => "Exit search mode",
            Self::CommitSearch => "Search now",
            Self::NextCategory => "Next category",
            Self::PrevCategory => "Previous category",
            Self::LoadMore => "Load more articles",
            Self::Refresh => "Refresh",
            Self::Retry => "Retry failed request",
            Self::DismissError => "Dismiss error",
            Self::ToggleBookmark => "Toggle bookmark",
            Self::OpenInBrowser => "Open in browser",
            Self::OpenChat => "Toggle AI chat",
            Self::Summarize => "Summarize article",
            Self::SendMessage => "Send chat message",
            Self::ClearChat => "Clear chat history",
            Self::InsertSuggestion => "Insert suggested prompt",
            Self::ScrollDown => "Scroll down one line",
            Self::ScrollUp => "Scroll up one line",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::ExitReader => "Exit reader view",
            Self::ViewBookmarks => "View bookmarks",
            Self::ViewTrending => "View trending",
            Self::RemoveBookmark => "Remove bookmark",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Categories,
    ArticleList,
    Search,
    Chat,
    Reader,
    Bookmarks,
    Trending,
}

impl Context {
    /// Heading used by the help overlay.
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Categories => "Categories",
            Self::ArticleList => "Articles",
            Self::Search => "Search",
            Self::Chat => "Chat",
            Self::Reader => "Reader",
            Self::Bookmarks => "Bookmarks",
            Self::Trending => "Trending",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let rest = rest.trim();
        if rest.chars().count() == 1 {
            let c = rest.chars().next()?;
            return Some(KeySpec::ctrl(c));
        }
        return None;
    }

    // Named keys (case-insensitive)
    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::char(' ')),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = n.parse::<u8>() {
            if (1..=12).contains(&n) {
                return Some(KeySpec::plain(KeyCode::F(n)));
            }
            return None;
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// that miss in the active context fall back to `Global`.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings for help screen enumeration
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    /// Create a registry with the default bindings.
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action as A;
        use Context as C;

        // === Global ===
        self.bind(C::Global, KeySpec::char('q'), A::Quit);
        self.bind(C::Global, KeySpec::char('j'), A::NavDown);
        self.bind(C::Global, KeySpec::plain(KeyCode::Down), A::NavDown);
        self.bind(C::Global, KeySpec::char('k'), A::NavUp);
        self.bind(C::Global, KeySpec::plain(KeyCode::Up), A::NavUp);
        self.bind(C::Global, KeySpec::plain(KeyCode::Tab), A::CycleFocus);
        self.bind(C::Global, KeySpec::plain(KeyCode::Esc), A::Back);
        self.bind(C::Global, KeySpec::plain(KeyCode::Enter), A::Select);
        self.bind(C::Global, KeySpec::char('/'), A::EnterSearch);
        self.bind(C::Global, KeySpec::char(']'), A::NextCategory);
        self.bind(C::Global, KeySpec::char('['), A::PrevCategory);
        self.bind(C::Global, KeySpec::char('n'), A::LoadMore);
        self.bind(C::Global, KeySpec::char('r'), A::Refresh);
        self.bind(C::Global, KeySpec::char('R'), A::Retry);
        self.bind(C::Global, KeySpec::char('x'), A::DismissError);
        self.bind(C::Global, KeySpec::char('b'), A::ToggleBookmark);
        self.bind(C::Global, KeySpec::char('o'), A::OpenInBrowser);
        self.bind(C::Global, KeySpec::char('c'), A::OpenChat);
        self.bind(C::Global, KeySpec::char('s'), A::Summarize);
        self.bind(C::Global, KeySpec::char('B'), A::ViewBookmarks);
        self.bind(C::Global, KeySpec::char('t'), A::ViewTrending);
        self.bind(C::Global, KeySpec::char('T'), A::CycleTheme);
        self.bind(C::Global, KeySpec::char('?'), A::ShowHelp);

        // === Category strip ===
        self.bind(C::Categories, KeySpec::plain(KeyCode::Left), A::PrevCategory);
        self.bind(C::Categories, KeySpec::char('h'), A::PrevCategory);
        self.bind(C::Categories, KeySpec::plain(KeyCode::Right), A::NextCategory);
        self.bind(C::Categories, KeySpec::char('l'), A::NextCategory);

        // === Search mode ===
        self.bind(C::Search, KeySpec::plain(KeyCode::Esc), A::ExitSearch);
        self.bind(C::Search, KeySpec::plain(KeyCode::Enter), A::CommitSearch);

        // === Chat input ===
        self.bind(C::Chat, KeySpec::plain(KeyCode::Enter), A::SendMessage);
        self.bind(C::Chat, KeySpec::ctrl('l'), A::ClearChat);
        self.bind(C::Chat, KeySpec::ctrl('p'), A::InsertSuggestion);
        self.bind(C::Chat, KeySpec::ctrl('x'), A::DismissError);
        self.bind(C::Chat, KeySpec::plain(KeyCode::Esc), A::Back);

        // === Reader view ===
        self.bind(C::Reader, KeySpec::char('q'), A::Quit);
        self.bind(C::Reader, KeySpec::plain(KeyCode::Esc), A::ExitReader);
        self.bind(C::Reader, KeySpec::char('j'), A::ScrollDown);
        self.bind(C::Reader, KeySpec::plain(KeyCode::Down), A::ScrollDown);
        self.bind(C::Reader, KeySpec::char('k'), A::ScrollUp);
        self.bind(C::Reader, KeySpec::plain(KeyCode::Up), A::ScrollUp);
        self.bind(C::Reader, KeySpec::ctrl('d'), A::PageDown);
        self.bind(C::Reader, KeySpec::ctrl('u'), A::PageUp);

        // === Bookmarks view ===
        self.bind(C::Bookmarks, KeySpec::char('d'), A::RemoveBookmark);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "load_more").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted so that conflicting overrides resolve the same way every run.
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let action = match parse_action_name(action_name) {
                Some(a) => a,
                None => {
                    warnings.push(format!("Unknown action '{}', ignoring", action_name));
                    continue;
                }
            };

            let key = match parse_key_string(key_str) {
                Some(k) => k,
                None => {
                    warnings.push(format!(
                        "Cannot parse key '{}' for action '{}', ignoring",
                        key_str, action_name
                    ));
                    continue;
                }
            };

            let mut contexts_for_action: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts_for_action.contains(ctx) {
                    contexts_for_action.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            // Re-bind in the same contexts with the new key
            for ctx in contexts_for_action {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// Look up a binding in `context` only, without the Global fallback.
    ///
    /// Text inputs use this so that plain characters reach the input.
    pub fn context_action(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        self.lookup
            .get(&(context, KeySpec::new(code, modifiers)))
            .copied()
    }

    /// First key bound to `action` in any context, formatted for hints.
    pub fn key_hint(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "cycle_focus" | "cyclefocus" | "tab" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "select" | "enter" => Some(Action::Select),
        "enter_search" | "entersearch" | "search" => Some(Action::EnterSearch),
        "exit_search" | "exitsearch" => Some(Action::ExitSearch),
        "commit_search" | "commitsearch" => Some(Action::CommitSearch),
        "next_category" | "nextcategory" => Some(Action::NextCategory),
        "prev_category" | "prevcategory" => Some(Action::PrevCategory),
        "load_more" | "loadmore" | "more" => Some(Action::LoadMore),
        "refresh" => Some(Action::Refresh),
        "retry" => Some(Action::Retry),
        "dismiss_error" | "dismisserror" | "dismiss" => Some(Action::DismissError),
        "toggle_bookmark" | "togglebookmark" | "bookmark" => Some(Action::ToggleBookmark),
        "open_in_browser" | "openinbrowser" | "open" => Some(Action::OpenInBrowser),
        "open_chat" | "openchat" | "chat" => Some(Action::OpenChat),
        "summarize" | "summary" => Some(Action::Summarize),
        "send_message" | "sendmessage" | "send" => Some(Action::SendMessage),
        "clear_chat" | "clearchat" => Some(Action::ClearChat),
        "insert_suggestion" | "insertsuggestion" | "suggest" => Some(Action::InsertSuggestion),
        "scroll_down" | "scrolldown" => Some(Action::ScrollDown),
        "scroll_up" | "scrollup" => Some(Action::ScrollUp),
        "page_down" | "pagedown" => Some(Action::PageDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "exit_reader" | "exitreader" => Some(Action::ExitReader),
        "view_bookmarks" | "viewbookmarks" | "bookmarks" => Some(Action::ViewBookmarks),
        "view_trending" | "viewtrending" | "trending" => Some(Action::ViewTrending),
        "remove_bookmark" | "removebookmark" | "unbookmark" => Some(Action::RemoveBookmark),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(reg: &KeybindingRegistry, code: KeyCode, ctx: Context) -> Option<Action> {
        reg.action_for_key(code, KeyModifiers::NONE, ctx)
    }

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, KeyCode::Char('q'), Context::Global), Some(Action::Quit));
    }

    #[test]
    fn test_default_nav_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, KeyCode::Char('j'), Context::Global), Some(Action::NavDown));
        assert_eq!(key(&reg, KeyCode::Down, Context::Global), Some(Action::NavDown));
        assert_eq!(key(&reg, KeyCode::Char('k'), Context::Global), Some(Action::NavUp));
        assert_eq!(key(&reg, KeyCode::Up, Context::Global), Some(Action::NavUp));
    }

    #[test]
    fn test_reader_context_overrides_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, KeyCode::Char('j'), Context::Reader), Some(Action::ScrollDown));
        assert_eq!(key(&reg, KeyCode::Esc, Context::Reader), Some(Action::ExitReader));
        // Not bound in Reader, so the Global binding applies
        assert_eq!(
            key(&reg, KeyCode::Char('b'), Context::Reader),
            Some(Action::ToggleBookmark)
        );
    }

    #[test]
    fn test_category_context_arrows() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            key(&reg, KeyCode::Right, Context::Categories),
            Some(Action::NextCategory)
        );
        assert_eq!(
            key(&reg, KeyCode::Char('h'), Context::Categories),
            Some(Action::PrevCategory)
        );
        assert_eq!(key(&reg, KeyCode::Right, Context::ArticleList), None);
    }

    #[test]
    fn test_ctrl_modifiers() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('d'), KeyModifiers::CONTROL, Context::Reader),
            Some(Action::PageDown)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('l'), KeyModifiers::CONTROL, Context::Chat),
            Some(Action::ClearChat)
        );
    }

    #[test]
    fn test_search_context() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, KeyCode::Esc, Context::Search), Some(Action::ExitSearch));
        assert_eq!(key(&reg, KeyCode::Enter, Context::Search), Some(Action::CommitSearch));
    }

    #[test]
    fn test_context_action_skips_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.context_action(KeyCode::Char('q'), KeyModifiers::NONE, Context::Chat),
            None
        );
        assert_eq!(
            reg.context_action(KeyCode::Enter, KeyModifiers::NONE, Context::Chat),
            Some(Action::SendMessage)
        );
    }

    #[test]
    fn test_remove_only_in_bookmarks() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            key(&reg, KeyCode::Char('d'), Context::Bookmarks),
            Some(Action::RemoveBookmark)
        );
        assert_eq!(key(&reg, KeyCode::Char('d'), Context::ArticleList), None);
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, KeyCode::F(12), Context::Global), None);
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(key(&reg, KeyCode::Char('q'), Context::Global), None);
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Quit)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Reader),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("nonexistent_action".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string_named_keys() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("Tab"), Some(KeySpec::plain(KeyCode::Tab)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::char(' ')));
    }

    #[test]
    fn test_parse_key_string_function_keys() {
        assert_eq!(parse_key_string("F1"), Some(KeySpec::plain(KeyCode::F(1))));
        assert_eq!(parse_key_string("F12"), Some(KeySpec::plain(KeyCode::F(12))));
        assert_eq!(parse_key_string("F0"), None);
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("F"), Some(KeySpec::char('F')));
    }

    #[test]
    fn test_parse_key_string_ctrl_and_chars() {
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("q"), Some(KeySpec::char('q')));
        assert_eq!(parse_key_string("]"), Some(KeySpec::char(']')));
        assert_eq!(parse_key_string("qq"), None);
    }

    #[test]
    fn test_all_bindings_cover_every_context() {
        let reg = KeybindingRegistry::new();
        let bindings = reg.all_bindings();
        assert!(bindings.len() >= 30);
        for ctx in [
            Context::Global,
            Context::Categories,
            Context::Search,
            Context::Chat,
            Context::Reader,
            Context::Bookmarks,
        ] {
            assert!(bindings.iter().any(|(c, ..)| *c == ctx), "{:?}", ctx);
        }
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::char('q')), "q");
        assert_eq!(format_key(&KeySpec::ctrl('d')), "Ctrl+d");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Enter)), "Enter");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
        assert_eq!(format_key(&KeySpec::char(' ')), "Space");
    }

    #[test]
    fn test_key_hint() {
        let reg = KeybindingRegistry::new();
        assert_eq!(reg.key_hint(Action::Retry).as_deref(), Some("R"));
        assert_eq!(reg.key_hint(Action::LoadMore).as_deref(), Some("n"));
    }

    #[test]
    fn test_override_preserves_contexts() {
        let mut reg = KeybindingRegistry::new();
        assert_eq!(
            key(&reg, KeyCode::Char('h'), Context::Categories),
            Some(Action::PrevCategory)
        );

        let mut overrides = HashMap::new();
        overrides.insert("prev_category".to_string(), "Left".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        // Bound in Global and Categories before, so both get the new key
        assert_eq!(key(&reg, KeyCode::Left, Context::Global), Some(Action::PrevCategory));
        assert_eq!(
            key(&reg, KeyCode::Left, Context::Categories),
            Some(Action::PrevCategory)
        );
        assert_eq!(key(&reg, KeyCode::Char('['), Context::Global), None);
        assert_eq!(key(&reg, KeyCode::Char('h'), Context::Categories), None);
    }
}
