/// Application interaction modes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Browse mode — directory listing navigation.
    #[default]
    Browse,
    /// A context menu is open over the listing.
    Menu,
    /// A modal alert waits to be dismissed.
    Alert,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Browse => "BROWSE",
            Mode::Menu => "MENU",
            Mode::Alert => "ALERT",
        }
    }
}
