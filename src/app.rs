use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::creator::{Capabilities, MenuFileCreator};
use crate::host::{
    ChannelAlerts, ChannelBrowser, CommandLauncher, ExtensionStatusProvider, FlagFileStatus,
    TargetSlot,
};
use crate::model::config::AppConfig;
use crate::model::file_tree::{FileTree, Row};
use crate::model::menu::{Menu, MenuKind, OpenMenu};
use crate::model::mode::Mode;
use crate::msg::Msg;

/// A full-screen program driven by [`Msg`]s.
pub trait Screen {
    fn update(&mut self, msg: Msg) -> Result<()>;
    fn view(&mut self, frame: &mut Frame);
    fn should_quit(&self) -> bool;
}

/// The file browser hosting the "New File" context menu.
pub struct App {
    pub mode: Mode,
    pub file_tree: FileTree,
    creator: MenuFileCreator,
    target: TargetSlot,
    status: Box<dyn ExtensionStatusProvider>,
    integration_enabled: bool,
    open_menu: Option<OpenMenu>,
    alert: Option<String>,
    notifications: VecDeque<String>,
    list_area: Rect,
    list_top: usize,
    watcher: Option<RecommendedWatcher>,
    watched: Option<PathBuf>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig, event_tx: mpsc::Sender<Msg>) -> Result<Self> {
        let start_dir = std::fs::canonicalize(config.start_dir())?;
        let file_tree = FileTree::new(start_dir, config.general.show_hidden)?;

        let target = TargetSlot::default();
        let creator = MenuFileCreator::new(
            config.create.collision,
            Capabilities {
                target: Box::new(target.clone()),
                browser: Box::new(ChannelBrowser(event_tx.clone())),
                alerts: Box::new(ChannelAlerts(event_tx.clone())),
                terminal: Box::new(CommandLauncher::new(&config.terminal)),
            },
        );
        let status = FlagFileStatus::new(config.flag_file());
        let integration_enabled = status.is_enabled();
        let watcher = spawn_file_watcher(event_tx.clone());

        tracing::info!("monitoring {}", file_tree.dir().display());

        let mut app = Self {
            mode: Mode::Browse,
            file_tree,
            creator,
            target,
            status: Box::new(status),
            integration_enabled,
            open_menu: None,
            alert: None,
            notifications: VecDeque::new(),
            list_area: Rect::default(),
            list_top: 0,
            watcher,
            watched: None,
            should_quit: false,
        };
        app.sync_watch();
        Ok(app)
    }

    /// Keep the watcher pointed at the directory on screen.
    fn sync_watch(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };

        let dir = self.file_tree.dir();
        if self.watched.as_deref() == Some(dir) {
            return;
        }

        if let Some(old) = self.watched.take() {
            let _ = watcher.unwatch(&old);
        }

        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => self.watched = Some(dir.to_path_buf()),
            Err(err) => tracing::warn!("failed to watch {}: {err}", dir.display()),
        }
    }

    fn push_notification(&mut self, message: String) {
        self.notifications.push_back(message);
        while self.notifications.len() > 8 {
            self.notifications.pop_front();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match self.mode {
            Mode::Browse => self.handle_key_browse(key),
            Mode::Menu => self.handle_key_menu(key),
            Mode::Alert => {
                self.alert = None;
                self.mode = Mode::Browse;
                Ok(())
            }
        }
    }

    fn handle_key_browse(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.file_tree.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.file_tree.move_selection(-1),
            KeyCode::Char('G') | KeyCode::End => self.file_tree.select_background(),
            KeyCode::Char('g') | KeyCode::Home => self.file_tree.selected = 0,
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                self.file_tree.enter_selected()?;
            }
            KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => self.file_tree.go_up()?,
            KeyCode::Char('r') => self.file_tree.refresh()?,
            KeyCode::Char('m') => self.open_context_menu(),
            _ => {}
        }

        Ok(())
    }

    fn handle_key_menu(&mut self, key: KeyEvent) -> Result<()> {
        let Some(menu) = self.open_menu.as_mut() else {
            self.mode = Mode::Browse;
            return Ok(());
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => menu.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => menu.move_selection(-1),
            KeyCode::Char('l') | KeyCode::Right => {
                menu.open_submenu();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                menu.close_submenu();
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                if !menu.close_submenu() {
                    self.close_context_menu();
                }
            }
            KeyCode::Enter => {
                if !menu.open_submenu() {
                    self.activate_highlighted();
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let MouseEventKind::Down(button) = mouse.kind else {
            return;
        };

        if self.mode != Mode::Browse {
            if button == MouseButton::Left {
                self.close_context_menu();
            }
            return;
        }

        let Some(row) = self.row_at(mouse.column, mouse.row) else {
            return;
        };
        self.file_tree.selected = row;

        if button == MouseButton::Right {
            self.open_context_menu();
        }
    }

    /// Listing row under a screen cell. Anything below the last entry is the
    /// background row.
    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = self.list_area.inner(ratatui::layout::Margin::new(1, 1));
        let inside = column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        if !inside {
            return None;
        }

        let idx = self.list_top + (row - inner.y) as usize;
        Some(idx.min(self.file_tree.row_count() - 1))
    }

    fn open_context_menu(&mut self) {
        let kind = match self.file_tree.selected_row() {
            Row::Background => MenuKind::ContainerBackground,
            Row::Entry(_) => MenuKind::Items,
        };

        match self.creator.build_menu(kind) {
            Some(menu) => {
                self.open_menu = Some(OpenMenu::new(menu));
                self.mode = Mode::Menu;
            }
            None => tracing::debug!("no menu for {kind:?}"),
        }
    }

    fn close_context_menu(&mut self) {
        self.open_menu = None;
        if self.mode == Mode::Menu {
            self.mode = Mode::Browse;
        }
    }

    fn activate_highlighted(&mut self) {
        let action = self
            .open_menu
            .as_ref()
            .and_then(OpenMenu::highlighted_action);
        self.close_context_menu();

        let Some(action) = action else {
            return;
        };

        // The directory on screen is the target, but only while the
        // integration is switched on.
        self.integration_enabled = self.status.is_enabled();
        let target = self
            .integration_enabled
            .then(|| self.file_tree.dir().to_path_buf());
        self.target.set(target);

        self.creator.dispatch(action);
        self.target.set(None);
    }

    fn reveal(&mut self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if parent != self.file_tree.dir() {
                self.file_tree.change_dir(parent.to_path_buf())?;
            } else {
                self.file_tree.refresh()?;
            }
        }

        if self.file_tree.select_path(&path) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.push_notification(format!("created {name}"));
        }
        Ok(())
    }

    fn handle_file_changed(&mut self, path: PathBuf) -> Result<()> {
        if path.parent() != Some(self.file_tree.dir()) {
            return Ok(());
        }

        let selected = match self.file_tree.selected_row() {
            Row::Entry(node) => Some(node.path.clone()),
            Row::Background => None,
        };

        self.file_tree.refresh()?;
        match selected {
            Some(path) => {
                self.file_tree.select_path(&path);
            }
            None => self.file_tree.select_background(),
        }
        Ok(())
    }

    fn render_listing(&mut self, frame: &mut Frame, area: Rect) {
        self.list_area = area;
        let height = area.height.saturating_sub(2) as usize;
        let selected = self.file_tree.selected;

        if selected < self.list_top {
            self.list_top = selected;
        } else if height > 0 && selected >= self.list_top + height {
            self.list_top = selected + 1 - height;
        }

        let selected_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut lines: Vec<Line> = self
            .file_tree
            .nodes
            .iter()
            .enumerate()
            .skip(self.list_top)
            .take(height)
            .map(|(idx, node)| {
                let (marker, color) = if node.is_dir {
                    ("▸ ", Color::Blue)
                } else {
                    ("  ", Color::Gray)
                };
                let style = if idx == selected {
                    selected_style
                } else {
                    Style::default().fg(color)
                };
                Line::from(Span::styled(format!("{marker}{}", node.name), style))
            })
            .collect();

        let background = self.file_tree.nodes.len();
        if background >= self.list_top && background < self.list_top + height {
            let style = if selected == background {
                selected_style
            } else {
                Style::default().fg(Color::DarkGray)
            };
            lines.push(Line::from(Span::styled("  ·  (empty space)", style)));
        }

        let title = format!(" {} ", self.file_tree.dir().display());
        let listing = Paragraph::new(lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        );
        frame.render_widget(listing, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Browse => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Mode::Menu => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Mode::Alert => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let mode_span = Span::styled(format!(" {} ", self.mode.label()), mode_style);

        let integration = if self.integration_enabled {
            Span::styled(" integration on ", Style::default().fg(Color::Green).bg(Color::DarkGray))
        } else {
            Span::styled(" integration off ", Style::default().fg(Color::Yellow).bg(Color::DarkGray))
        };

        let hint = match self.mode {
            Mode::Browse => "m/right-click: menu  enter: open  h: up  q: quit",
            Mode::Menu => "enter: choose  esc: close",
            Mode::Alert => "any key: dismiss",
        };
        let last = self
            .notifications
            .back()
            .map(|n| format!(" | {n}"))
            .unwrap_or_default();

        let info = Span::styled(
            format!(" {hint}{last} "),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let bar = Line::from(vec![mode_span, integration, info]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_menu_overlay(&self, frame: &mut Frame) {
        let Some(open) = self.open_menu.as_ref() else {
            return;
        };

        let inner = self.list_area.inner(ratatui::layout::Margin::new(1, 1));
        let anchor_y = inner.y + self.file_tree.selected.saturating_sub(self.list_top) as u16;
        let top_area = menu_rect(&open.menu, inner.x + 4, anchor_y, frame.area());

        let top_selected = open.submenu.map_or(open.selected, |(parent, _)| parent);
        render_menu(frame, &open.menu, top_selected, open.submenu.is_none(), top_area);

        if let Some((parent, child)) = open.submenu {
            if let Some(submenu) = open.menu.get(parent).and_then(|item| item.submenu.as_ref()) {
                let sub_area = menu_rect(
                    submenu,
                    top_area.x + top_area.width,
                    top_area.y + parent as u16,
                    frame.area(),
                );
                render_menu(frame, submenu, child, true, sub_area);
            }
        }

        if let Some(tip) = open.highlighted().and_then(|item| item.tool_tip.as_ref()) {
            let tip_area = Rect {
                x: top_area.x,
                y: (top_area.y + top_area.height).min(frame.area().height.saturating_sub(1)),
                width: (tip.len() as u16 + 2).min(frame.area().width),
                height: 1,
            };
            frame.render_widget(Clear, tip_area);
            frame.render_widget(
                Paragraph::new(format!(" {tip} "))
                    .style(Style::default().fg(Color::Black).bg(Color::Gray)),
                tip_area,
            );
        }
    }

    fn render_alert_overlay(&self, frame: &mut Frame) {
        let Some(message) = self.alert.as_ref() else {
            return;
        };

        let area = centered_rect(60, 25, frame.area());
        frame.render_widget(Clear, area);

        let body = Paragraph::new(message.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(" Error ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .style(Style::default().bg(Color::Rgb(15, 15, 24))),
            );
        frame.render_widget(body, area);
    }
}

impl Screen for App {
    fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key)?,
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Resize(_, _) => {}
            Msg::Activated => self.integration_enabled = self.status.is_enabled(),
            Msg::Reveal(path) => self.reveal(path)?,
            Msg::Alert(message) => {
                self.close_context_menu();
                self.alert = Some(message);
                self.mode = Mode::Alert;
            }
            Msg::FileChanged(path) => self.handle_file_changed(path)?,
        }

        self.sync_watch();
        Ok(())
    }

    fn view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // listing
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.render_listing(frame, chunks[0]);
        self.render_status_bar(frame, chunks[1]);

        if self.mode == Mode::Menu {
            self.render_menu_overlay(frame);
        } else if self.mode == Mode::Alert {
            self.render_alert_overlay(frame);
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// File watcher emitting FileChanged for create/modify/remove events.
fn spawn_file_watcher(tx: mpsc::Sender<Msg>) -> Option<RecommendedWatcher> {
    let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
        Ok(event) => {
            if matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                for path in event.paths {
                    if tx.send(Msg::FileChanged(path)).is_err() {
                        return;
                    }
                }
            }
        }
        Err(err) => {
            tracing::warn!("file watcher error: {err}");
        }
    });

    match watcher {
        Ok(w) => Some(w),
        Err(err) => {
            tracing::warn!("failed to initialize file watcher: {err}");
            None
        }
    }
}

fn menu_rect(menu: &Menu, x: u16, y: u16, bounds: Rect) -> Rect {
    let widest = menu
        .items
        .iter()
        .map(|item| item.title.chars().count() + 6)
        .max()
        .unwrap_or(10) as u16;
    let width = (widest + 2).min(bounds.width);
    let height = (menu.len() as u16 + 2).min(bounds.height);

    Rect {
        x: x.min(bounds.width.saturating_sub(width)),
        y: y.min(bounds.height.saturating_sub(height)),
        width,
        height,
    }
}

fn render_menu(frame: &mut Frame, menu: &Menu, selected: usize, active: bool, area: Rect) {
    frame.render_widget(Clear, area);

    let lines: Vec<Line> = menu
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let glyph = item.icon.map_or("  ", |icon| icon.glyph());
            let arrow = if item.submenu.is_some() { " ›" } else { "" };
            let style = match (idx == selected, active) {
                (true, true) => Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                (true, false) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(Color::White),
            };
            Line::from(Span::styled(format!("{glyph} {}{arrow}", item.title), style))
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Rgb(15, 15, 24))),
    );
    frame.render_widget(widget, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
