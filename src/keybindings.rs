//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are context-aware. A key is looked up in the active context first
//! and then in `Global`, so page-specific bindings shadow global ones.
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
    Reload,
    FetchNews,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    PrevCategory,
    NextCategory,
    ClearCategory,
    OpenInBrowser,
    ShowDashboard,
    ShowCategories,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ExitDetail,
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
            Self::Reload => "Reload articles",
            Self::FetchNews => "Fetch latest news on the backend",
            Self::EnterSearch => "Search articles",
            Self::ExitSearch => "Cancel search",
            Self::CommitSearch => "Run search now",
            Self::PrevCategory => "Previous category",
            Self::NextCategory => "Next category",
            Self::ClearCategory => "Clear category filter",
            Self::OpenInBrowser => "Open original article",
            Self::ShowDashboard => "Go to dashboard",
            Self::ShowCategories => "Go to categories",
            Self::ScrollDown => "Scroll down one line",
            Self::ScrollUp => "Scroll up one line",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::ExitDetail => "Back to list",
            Self::ShowHelp => "Show help",
        }
    }

    /// Parse an action name from the `[keybindings]` config table.
    fn from_config_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        let action = match normalized.as_str() {
            "quit" => Self::Quit,
            "navdown" | "down" => Self::NavDown,
            "navup" | "up" => Self::NavUp,
            "cyclefocus" | "focus" => Self::CycleFocus,
            "back" => Self::Back,
            "select" | "enter" => Self::Select,
            "reload" | "refresh" => Self::Reload,
            "fetchnews" | "fetch" => Self::FetchNews,
            "entersearch" | "search" => Self::EnterSearch,
            "exitsearch" => Self::ExitSearch,
            "commitsearch" => Self::CommitSearch,
            "prevcategory" => Self::PrevCategory,
            "nextcategory" => Self::NextCategory,
            "clearcategory" => Self::ClearCategory,
            "openinbrowser" | "open" => Self::OpenInBrowser,
            "showdashboard" | "dashboard" => Self::ShowDashboard,
            "showcategories" | "categories" => Self::ShowCategories,
            "scrolldown" => Self::ScrollDown,
            "scrollup" => Self::ScrollUp,
            "pagedown" => Self::PageDown,
            "pageup" => Self::PageUp,
            "exitdetail" => Self::ExitDetail,
            "showhelp" | "help" => Self::ShowHelp,
            _ => return None,
        };
        Some(action)
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Dashboard,
    Categories,
    Detail,
    Search,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Dashboard => "Dashboard",
            Self::Categories => "Categories",
            Self::Detail => "Article",
            Self::Search => "Search",
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

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right", "Space"
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return match chars.next() {
            None => Some(KeySpec::ctrl(c.to_ascii_lowercase())),
            Some(_) => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix('F')
        .or_else(|| s.strip_prefix('f'))
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
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
// Default Bindings
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    // Global
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ch('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::ch('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Global, KeySpec::ch('r'), Action::Reload),
    (Context::Global, KeySpec::ch('o'), Action::OpenInBrowser),
    (Context::Global, KeySpec::ch('1'), Action::ShowDashboard),
    (Context::Global, KeySpec::ch('2'), Action::ShowCategories),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    // Dashboard only
    (Context::Dashboard, KeySpec::ch('f'), Action::FetchNews),
    (Context::Dashboard, KeySpec::ch('/'), Action::EnterSearch),
    (Context::Dashboard, KeySpec::ch('h'), Action::PrevCategory),
    (Context::Dashboard, KeySpec::plain(KeyCode::Left), Action::PrevCategory),
    (Context::Dashboard, KeySpec::ch('l'), Action::NextCategory),
    (Context::Dashboard, KeySpec::plain(KeyCode::Right), Action::NextCategory),
    (Context::Dashboard, KeySpec::ch('c'), Action::ClearCategory),
    // Categories page
    (Context::Categories, KeySpec::ch('h'), Action::PrevCategory),
    (Context::Categories, KeySpec::plain(KeyCode::Left), Action::PrevCategory),
    (Context::Categories, KeySpec::ch('l'), Action::NextCategory),
    (Context::Categories, KeySpec::plain(KeyCode::Right), Action::NextCategory),
    (Context::Categories, KeySpec::ch('c'), Action::ClearCategory),
    // Article detail
    (Context::Detail, KeySpec::ch('b'), Action::ExitDetail),
    (Context::Detail, KeySpec::plain(KeyCode::Esc), Action::ExitDetail),
    (Context::Detail, KeySpec::ch('j'), Action::ScrollDown),
    (Context::Detail, KeySpec::plain(KeyCode::Down), Action::ScrollDown),
    (Context::Detail, KeySpec::ch('k'), Action::ScrollUp),
    (Context::Detail, KeySpec::plain(KeyCode::Up), Action::ScrollUp),
    (Context::Detail, KeySpec::ctrl('d'), Action::PageDown),
    (Context::Detail, KeySpec::ctrl('u'), Action::PageUp),
    // Search input
    (Context::Search, KeySpec::plain(KeyCode::Esc), Action::ExitSearch),
    (Context::Search, KeySpec::plain(KeyCode::Enter), Action::CommitSearch),
];

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        if let Some(previous) = self.lookup.insert((context, key), action) {
            self.bindings
                .retain(|(c, k, a)| !(*c == context && *k == key && *a == previous));
        }
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names ("quit", "fetch_news"); values are key
    /// strings ("q", "Ctrl+d", "F5"). An override replaces every default key
    /// for that action, in every context the action was bound in.
    ///
    /// Returns a warning per unrecognized action name or unparseable key.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = Action::from_config_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key, trying `context` first and then Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);
        self.lookup.get(&(context, key)).copied().or_else(|| {
            if context == Context::Global {
                None
            } else {
                self.lookup.get(&(Context::Global, key)).copied()
            }
        })
    }

    /// All bindings for the help screen, in registration order.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }

    /// Display string of the first key bound to `action`, for footer hints.
    pub fn key_hint(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
