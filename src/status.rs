//! Companion window telling the user whether the menu integration is on.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{Screen, centered_rect};
use crate::host::ExtensionStatusProvider;
use crate::msg::Msg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Close,
    Toggle,
}

pub struct StatusWindow {
    provider: Box<dyn ExtensionStatusProvider>,
    /// `None` until the first activation poll.
    enabled: Option<bool>,
    focused: Button,
    buttons: [Rect; 2],
    error: Option<String>,
    should_quit: bool,
}

impl StatusWindow {
    pub fn new(provider: Box<dyn ExtensionStatusProvider>) -> Self {
        Self {
            provider,
            enabled: None,
            focused: Button::Toggle,
            buttons: [Rect::default(); 2],
            error: None,
            should_quit: false,
        }
    }

    fn poll(&mut self) {
        let enabled = self.provider.is_enabled();
        tracing::debug!("integration enabled: {enabled}");
        self.enabled = Some(enabled);
    }

    fn press(&mut self, button: Button) {
        match button {
            Button::Close => self.should_quit = true,
            Button::Toggle => {
                self.error = match self.provider.open_settings() {
                    Ok(()) => None,
                    Err(err) => {
                        tracing::error!("failed to open integration settings: {err}");
                        Some(err.to_string())
                    }
                };
                self.poll();
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.focused = match self.focused {
                    Button::Close => Button::Toggle,
                    Button::Toggle => Button::Close,
                };
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.press(self.focused),
            _ => {}
        }
    }

    fn button_label(&self, button: Button) -> &'static str {
        match button {
            Button::Close => "Close App",
            Button::Toggle if self.enabled == Some(true) => "Disable Extension",
            Button::Toggle => "Enable Extension",
        }
    }

    fn render_button(&self, frame: &mut Frame, button: Button, area: Rect) {
        let style = if self.focused == button {
            Style::default()
                .fg(Color::White)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::White).bg(Color::Black)
        };

        frame.render_widget(
            Paragraph::new(self.button_label(button))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL))
                .style(style),
            area,
        );
    }
}

impl Screen for StatusWindow {
    fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Mouse(mouse) => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                    let hit = [Button::Close, Button::Toggle]
                        .into_iter()
                        .zip(self.buttons)
                        .find(|(_, area)| {
                            mouse.column >= area.x
                                && mouse.column < area.x + area.width
                                && mouse.row >= area.y
                                && mouse.row < area.y + area.height
                        });
                    if let Some((button, _)) = hit {
                        self.focused = button;
                        self.press(button);
                    }
                }
            }
            Msg::Activated => self.poll(),
            Msg::Resize(_, _) | Msg::Reveal(_) | Msg::Alert(_) | Msg::FileChanged(_) => {}
        }

        Ok(())
    }

    fn view(&mut self, frame: &mut Frame) {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);

        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));
        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Min(4),    // status
                Constraint::Length(3), // buttons
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            "New File Creator",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(title, rows[0]);

        let (glyph, glyph_style, headline, detail) = match self.enabled {
            Some(true) => (
                "✔",
                Style::default().fg(Color::Blue),
                "Extension is enabled",
                "You can close this host application.",
            ),
            Some(false) => (
                "⚠",
                Style::default().fg(Color::Rgb(255, 165, 0)),
                "Extension is disabled",
                "You won't be able to use the extension until you enable it.",
            ),
            None => ("…", Style::default().fg(Color::DarkGray), "", ""),
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(glyph, glyph_style.add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(Span::styled(
                headline,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
        ];
        if let Some(err) = self.error.as_ref() {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            rows[1],
        );

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        self.buttons = [buttons[0], buttons[1]];
        self.render_button(frame, Button::Close, buttons[0]);
        self.render_button(frame, Button::Toggle, buttons[1]);
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FlagFileStatus;
    use crossterm::event::KeyModifiers;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn status_is_unknown_until_activation() {
        let temp = tempdir().unwrap();
        let mut window = StatusWindow::new(Box::new(FlagFileStatus::new(temp.path().join("flag"))));
        assert_eq!(window.enabled, None);

        window.update(Msg::Activated).unwrap();
        assert_eq!(window.enabled, Some(false));
        assert_eq!(window.button_label(Button::Toggle), "Enable Extension");
    }

    #[test]
    fn toggle_button_flips_integration() {
        let temp = tempdir().unwrap();
        let flag = temp.path().join("flag");
        let mut window = StatusWindow::new(Box::new(FlagFileStatus::new(flag.clone())));
        window.update(Msg::Activated).unwrap();

        window.update(key(KeyCode::Enter)).unwrap();
        assert!(flag.is_file());
        assert_eq!(window.enabled, Some(true));
        assert_eq!(window.button_label(Button::Toggle), "Disable Extension");

        window.update(key(KeyCode::Enter)).unwrap();
        assert!(!flag.exists());
        assert_eq!(window.enabled, Some(false));
    }

    #[test]
    fn browser_messages_leave_window_untouched() {
        let temp = tempdir().unwrap();
        let mut window = StatusWindow::new(Box::new(FlagFileStatus::new(temp.path().join("flag"))));

        window.update(Msg::Resize(80, 24)).unwrap();
        window.update(Msg::Reveal(temp.path().join("x"))).unwrap();
        window.update(Msg::Alert("boom".to_string())).unwrap();
        window.update(Msg::FileChanged(temp.path().join("x"))).unwrap();

        assert_eq!(window.enabled, None);
        assert!(window.error.is_none());
        assert!(!window.should_quit());
    }

    #[test]
    fn close_button_quits() {
        let temp = tempdir().unwrap();
        let mut window = StatusWindow::new(Box::new(FlagFileStatus::new(temp.path().join("flag"))));

        window.update(key(KeyCode::Tab)).unwrap();
        assert!(!window.should_quit());
        window.update(key(KeyCode::Enter)).unwrap();
        assert!(window.should_quit());
    }
}
