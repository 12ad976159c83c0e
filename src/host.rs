//! Capabilities the host hands to the menu core, and the implementations this
//! binary ships with.
//!
//! The core never reaches for global state: it asks a [`TargetResolver`] where
//! the user clicked, reports through [`Alerts`], reveals through
//! [`FileBrowser`] and spawns through [`TerminalLauncher`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::sync::mpsc;

use anyhow::Result;

use crate::error::CreatorError;
use crate::model::config::TerminalConfig;
use crate::msg::Msg;

/// Answers "which directory is this invocation about". Read once per action.
pub trait TargetResolver {
    fn targeted_directory(&self) -> Option<PathBuf>;
}

/// Selects and reveals a path in the file browser.
pub trait FileBrowser {
    fn reveal_and_select(&self, path: &Path);
}

/// User-visible error reporting.
pub trait Alerts {
    fn show_error(&self, message: &str);
}

/// Spawns a terminal rooted at a directory without waiting for it.
pub trait TerminalLauncher {
    fn launch(&self, dir: &Path) -> Result<(), CreatorError>;
}

/// Whether the menu integration is currently allowed to run.
pub trait ExtensionStatusProvider {
    fn is_enabled(&self) -> bool;
    /// Hand the user over to whatever manages the integration.
    fn open_settings(&self) -> Result<()>;
}

/// Target directory shared between the browser UI and the menu core.
///
/// The UI writes it right before dispatching a menu action.
#[derive(Debug, Clone, Default)]
pub struct TargetSlot(Rc<RefCell<Option<PathBuf>>>);

impl TargetSlot {
    pub fn set(&self, target: Option<PathBuf>) {
        *self.0.borrow_mut() = target;
    }
}

impl TargetResolver for TargetSlot {
    fn targeted_directory(&self) -> Option<PathBuf> {
        self.0.borrow().clone()
    }
}

/// Target given up front, e.g. from the command line.
#[derive(Debug, Clone)]
pub struct FixedTarget(pub Option<PathBuf>);

impl TargetResolver for FixedTarget {
    fn targeted_directory(&self) -> Option<PathBuf> {
        self.0.as_ref().filter(|dir| dir.is_dir()).cloned()
    }
}

/// Forwards reveal requests to the UI event loop.
#[derive(Debug, Clone)]
pub struct ChannelBrowser(pub mpsc::Sender<Msg>);

impl FileBrowser for ChannelBrowser {
    fn reveal_and_select(&self, path: &Path) {
        if self.0.send(Msg::Reveal(path.to_path_buf())).is_err() {
            tracing::warn!("reveal dropped, event loop gone: {}", path.display());
        }
    }
}

/// Forwards alerts to the UI event loop, which shows them as a modal.
#[derive(Debug, Clone)]
pub struct ChannelAlerts(pub mpsc::Sender<Msg>);

impl Alerts for ChannelAlerts {
    fn show_error(&self, message: &str) {
        if self.0.send(Msg::Alert(message.to_string())).is_err() {
            tracing::warn!("alert dropped, event loop gone: {message}");
        }
    }
}

/// Plain stdout/stderr rendition for one-shot CLI commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console;

impl FileBrowser for Console {
    fn reveal_and_select(&self, path: &Path) {
        println!("{}", path.display());
    }
}

impl Alerts for Console {
    fn show_error(&self, message: &str) {
        eprintln!("newfile: {message}");
    }
}

/// Runs the configured terminal program with `{dir}` substituted in its args.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(config: &TerminalConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    fn args_for(&self, dir: &Path) -> Vec<String> {
        let dir = dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{dir}", &dir))
            .collect()
    }
}

impl TerminalLauncher for CommandLauncher {
    fn launch(&self, dir: &Path) -> Result<(), CreatorError> {
        // The child is detached on drop; only the spawn itself can fail here.
        Command::new(&self.program)
            .args(self.args_for(dir))
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| CreatorError::ProcessLaunchFailure {
                program: self.program.clone(),
                source,
            })
    }
}

/// Integration flag backed by the presence of a marker file.
///
/// "Opening settings" flips the flag, since this binary is its own
/// extension manager.
#[derive(Debug, Clone)]
pub struct FlagFileStatus {
    path: PathBuf,
}

impl FlagFileStatus {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        if enabled {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, b"")?;
        } else if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        tracing::info!(
            "integration {} ({})",
            if enabled { "enabled" } else { "disabled" },
            self.path.display()
        );
        Ok(())
    }
}

impl ExtensionStatusProvider for FlagFileStatus {
    fn is_enabled(&self) -> bool {
        self.path.is_file()
    }

    fn open_settings(&self) -> Result<()> {
        self.set_enabled(!self.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn target_slot_is_shared_between_clones() {
        let slot = TargetSlot::default();
        let reader = slot.clone();
        assert_eq!(reader.targeted_directory(), None);

        slot.set(Some(PathBuf::from("/tmp/x")));
        assert_eq!(reader.targeted_directory(), Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn fixed_target_rejects_missing_directories() {
        let temp = tempdir().unwrap();
        let present = FixedTarget(Some(temp.path().to_path_buf()));
        let missing = FixedTarget(Some(temp.path().join("nope")));

        assert_eq!(present.targeted_directory(), Some(temp.path().to_path_buf()));
        assert_eq!(missing.targeted_directory(), None);
        assert_eq!(FixedTarget(None).targeted_directory(), None);
    }

    #[test]
    fn channel_capabilities_forward_messages() {
        let (tx, rx) = mpsc::channel();
        ChannelBrowser(tx.clone()).reveal_and_select(Path::new("/tmp/x/New File.md"));
        ChannelAlerts(tx).show_error("boom");

        assert!(matches!(rx.recv().unwrap(), Msg::Reveal(p) if p == Path::new("/tmp/x/New File.md")));
        assert!(matches!(rx.recv().unwrap(), Msg::Alert(m) if m == "boom"));
    }

    #[test]
    fn command_launcher_substitutes_directory() {
        let launcher = CommandLauncher::new(&TerminalConfig {
            program: "open".to_string(),
            args: vec!["-a".to_string(), "Terminal".to_string(), "{dir}".to_string()],
        });

        assert_eq!(
            launcher.args_for(Path::new("/tmp/x")),
            ["-a", "Terminal", "/tmp/x"]
        );
    }

    #[test]
    fn command_launcher_reports_spawn_failure() {
        let temp = tempdir().unwrap();
        let launcher = CommandLauncher::new(&TerminalConfig {
            program: "definitely-not-a-terminal-binary".to_string(),
            args: Vec::new(),
        });

        let err = launcher.launch(temp.path()).unwrap_err();
        assert!(matches!(err, CreatorError::ProcessLaunchFailure { .. }));
        assert!(err.to_string().contains("definitely-not-a-terminal-binary"));
    }

    #[test]
    fn flag_file_toggles_through_settings() {
        let temp = tempdir().unwrap();
        let status = FlagFileStatus::new(temp.path().join("state").join("enabled"));
        assert!(!status.is_enabled());

        status.open_settings().unwrap();
        assert!(status.is_enabled());

        status.open_settings().unwrap();
        assert!(!status.is_enabled());

        // Disabling twice is not an error.
        status.set_enabled(false).unwrap();
    }
}
