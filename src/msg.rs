use crossterm::event::{KeyEvent, MouseEvent};
use std::path::PathBuf;

/// All possible messages that drive state transitions.
#[derive(Debug)]
#[allow(dead_code)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// The terminal window regained focus.
    Activated,

    // -- Host requests from the menu core
    Reveal(PathBuf),
    Alert(String),

    // -- File system
    FileChanged(PathBuf),
}
