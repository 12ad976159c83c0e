use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::CreatorError;
use crate::host::{Alerts, FileBrowser, TargetResolver, TerminalLauncher};
use crate::model::config::CollisionPolicy;
use crate::model::menu::{Menu, MenuAction, MenuItem, MenuKind};
use crate::model::template::{TemplateCatalog, TemplateIcon};

pub const NEW_FILE_TITLE: &str = "New File";
pub const TERMINAL_TITLE: &str = "Terminal";
pub const TERMINAL_TOOL_TIP: &str = "Open Terminal in current directory";

/// Host-provided capabilities the creator works through.
pub struct Capabilities {
    pub target: Box<dyn TargetResolver>,
    pub browser: Box<dyn FileBrowser>,
    pub alerts: Box<dyn Alerts>,
    pub terminal: Box<dyn TerminalLauncher>,
}

/// Builds the "New File" context menu and carries out its entries.
///
/// Stateless between invocations: every menu build and every action reads the
/// target directory afresh and touches nothing else.
pub struct MenuFileCreator {
    catalog: TemplateCatalog,
    collision: CollisionPolicy,
    caps: Capabilities,
}

impl MenuFileCreator {
    pub fn new(collision: CollisionPolicy, caps: Capabilities) -> Self {
        Self {
            catalog: TemplateCatalog,
            collision,
            caps,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Only the container background gets a menu; every other site gets none.
    pub fn build_menu(&self, kind: MenuKind) -> Option<Menu> {
        if kind != MenuKind::ContainerBackground {
            return None;
        }

        let mut submenu = Menu::default();
        for (index, template) in self.catalog.templates().iter().enumerate() {
            submenu.push(
                MenuItem::action(template.display_name, MenuAction::CreateFromTemplate(index))
                    .with_icon(template.icon),
            );
        }

        let mut menu = Menu::default();
        menu.push(MenuItem::parent(NEW_FILE_TITLE, submenu));
        menu.push(
            MenuItem::action(TERMINAL_TITLE, MenuAction::OpenTerminal)
                .with_icon(Some(TemplateIcon::Terminal))
                .with_tool_tip(TERMINAL_TOOL_TIP),
        );
        Some(menu)
    }

    /// Route a chosen menu entry to its handler. Failures have already been
    /// reported to the user by the time this returns.
    pub fn dispatch(&self, action: MenuAction) {
        match action {
            MenuAction::CreateFromTemplate(index) => {
                let _ = self.create_file_from_template(index);
            }
            MenuAction::OpenTerminal => {
                let _ = self.open_current_directory_in_terminal();
            }
        }
    }

    /// Write the template at `index` into the targeted directory and reveal it.
    ///
    /// `index` must come from a menu built by [`Self::build_menu`].
    pub fn create_file_from_template(&self, index: usize) -> Result<PathBuf, CreatorError> {
        let Some(dir) = self.caps.target.targeted_directory() else {
            tracing::warn!("no target directory for template {index}");
            let err = CreatorError::TargetUnresolved;
            self.caps.alerts.show_error(&err.to_string());
            return Err(err);
        };

        let templates = self.catalog.templates();
        let template = &templates[index];
        let file_name = template.target_file_name();

        tracing::info!("creating {file_name} in {}", dir.display());

        match write_atomic(&dir, &file_name, template.content, self.collision) {
            Ok(path) => {
                tracing::info!("created {}", path.display());
                self.caps.browser.reveal_and_select(&path);
                Ok(path)
            }
            Err(err) => {
                tracing::error!("failed to create {file_name}: {err}");
                self.caps.alerts.show_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Spawn a terminal in the targeted directory. Without a target this is a
    /// silent no-op and yields `Ok(None)`.
    pub fn open_current_directory_in_terminal(&self) -> Result<Option<PathBuf>, CreatorError> {
        let Some(dir) = self.caps.target.targeted_directory() else {
            tracing::info!("no target directory, terminal not opened");
            return Ok(None);
        };

        match self.caps.terminal.launch(&dir) {
            Ok(()) => {
                tracing::info!("terminal opened in {}", dir.display());
                Ok(Some(dir))
            }
            Err(err) => {
                tracing::error!("{err}");
                self.caps.alerts.show_error(&err.to_string());
                Err(err)
            }
        }
    }
}

/// Write `content` to `dir/name` through a temp file in the same directory, so
/// readers never observe a half-written file.
///
/// `Overwrite` renames over an existing file. `Fail` links the temp file into
/// place, which refuses to clobber.
fn write_atomic(
    dir: &Path,
    name: &str,
    content: &str,
    collision: CollisionPolicy,
) -> Result<PathBuf, CreatorError> {
    let path = dir.join(name);
    let tmp = dir.join(format!(".{name}.{}.tmp", std::process::id()));

    let staged = (|| -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    })();

    if let Err(source) = staged {
        let _ = fs::remove_file(&tmp);
        return Err(CreatorError::WriteFailure { path, source });
    }

    let placed = match collision {
        CollisionPolicy::Overwrite => fs::rename(&tmp, &path),
        CollisionPolicy::Fail => place_without_clobber(&tmp, &path, content),
    };

    // After a rename the temp name is already gone.
    let _ = fs::remove_file(&tmp);

    match placed {
        Ok(()) => Ok(path),
        Err(source)
            if collision == CollisionPolicy::Fail
                && source.kind() == io::ErrorKind::AlreadyExists =>
        {
            Err(CreatorError::AlreadyExists { path })
        }
        Err(source) => Err(CreatorError::WriteFailure { path, source }),
    }
}

/// Hard-link `tmp` to `path`, failing if `path` exists. Filesystems without
/// hard links (FAT, exFAT, some network mounts) get an exclusive create
/// instead, which still refuses to clobber but is not atomic.
fn place_without_clobber(tmp: &Path, path: &Path, content: &str) -> io::Result<()> {
    match fs::hard_link(tmp, path) {
        Err(err) if links_unsupported(&err) => {
            tracing::debug!(
                "hard links unsupported ({err}), creating {} directly",
                path.display()
            );
            write_new(path, content)
        }
        other => other,
    }
}

fn links_unsupported(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
    )
}

fn write_new(path: &Path, content: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}
