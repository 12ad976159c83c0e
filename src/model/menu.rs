use crate::model::template::TemplateIcon;

/// Where the host is about to show a context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// Right-click on empty space inside a directory.
    ContainerBackground,
    /// Right-click on one or more entries.
    Items,
    #[allow(dead_code)] // the terminal host has no sidebar
    Sidebar,
    #[allow(dead_code)] // the terminal host has no toolbar
    Toolbar,
}

/// What a menu entry does when chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Stamp out the template at this catalog index.
    CreateFromTemplate(usize),
    OpenTerminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: String,
    pub icon: Option<TemplateIcon>,
    pub tool_tip: Option<String>,
    /// Leaf entries carry an action, parents carry a submenu.
    pub action: Option<MenuAction>,
    pub submenu: Option<Menu>,
}

impl MenuItem {
    pub fn action(title: impl Into<String>, action: MenuAction) -> Self {
        Self {
            title: title.into(),
            icon: None,
            tool_tip: None,
            action: Some(action),
            submenu: None,
        }
    }

    pub fn parent(title: impl Into<String>, submenu: Menu) -> Self {
        Self {
            title: title.into(),
            icon: None,
            tool_tip: None,
            action: None,
            submenu: Some(submenu),
        }
    }

    pub fn with_icon(mut self, icon: Option<TemplateIcon>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_tool_tip(mut self, tip: impl Into<String>) -> Self {
        self.tool_tip = Some(tip.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn push(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, idx: usize) -> Option<&MenuItem> {
        self.items.get(idx)
    }
}

/// Cursor state for an open context menu in the host UI.
#[derive(Debug, Clone)]
pub struct OpenMenu {
    pub menu: Menu,
    pub selected: usize,
    /// Index of the top-level entry whose submenu is expanded, plus the
    /// selection inside that submenu.
    pub submenu: Option<(usize, usize)>,
}

impl OpenMenu {
    pub fn new(menu: Menu) -> Self {
        Self {
            menu,
            selected: 0,
            submenu: None,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        match self.submenu.as_mut() {
            Some((parent, child)) => {
                let len = self
                    .menu
                    .get(*parent)
                    .and_then(|item| item.submenu.as_ref())
                    .map_or(0, Menu::len);
                *child = clamp_index(*child, delta, len);
            }
            None => {
                self.selected = clamp_index(self.selected, delta, self.menu.len());
            }
        }
    }

    /// Expand the selected entry's submenu. Returns false for leaf entries.
    pub fn open_submenu(&mut self) -> bool {
        if self.submenu.is_some() {
            return false;
        }

        let has_children = self
            .menu
            .get(self.selected)
            .is_some_and(|item| item.submenu.as_ref().is_some_and(|m| m.len() > 0));
        if has_children {
            self.submenu = Some((self.selected, 0));
        }
        has_children
    }

    /// Collapse the expanded submenu. Returns false when already at top level.
    pub fn close_submenu(&mut self) -> bool {
        self.submenu.take().is_some()
    }

    pub fn highlighted(&self) -> Option<&MenuItem> {
        match self.submenu {
            Some((parent, child)) => self
                .menu
                .get(parent)
                .and_then(|item| item.submenu.as_ref())
                .and_then(|submenu| submenu.get(child)),
            None => self.menu.get(self.selected),
        }
    }

    pub fn highlighted_action(&self) -> Option<MenuAction> {
        self.highlighted().and_then(|item| item.action)
    }
}

fn clamp_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    let max = len.saturating_sub(1) as isize;
    (current as isize + delta).clamp(0, max) as usize
}
