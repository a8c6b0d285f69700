use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{HelpEntry, HelpSection};
use crate::ui::theme::Theme;

const WIDTH: u16 = 52;

pub struct HelpContent<'a> {
    pub entries: &'a [HelpEntry],
    /// Role shown in the title; admin-only keys are marked when it cannot signal.
    pub role: &'static str,
    pub can_signal: bool,
    pub gpu_note: Option<&'a str>,
}

/// Centered overlay listing keys grouped by section, with the role gate and
/// any sensor notes underneath.
pub fn render(frame: &mut Frame, area: Rect, content: &HelpContent, theme: &Theme) {
    let lines = help_lines(content, theme);

    let width = WIDTH.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);

    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Keys ({}) ", content.role),
            Style::default()
                .fg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(overlay);

    frame.render_widget(block, overlay);
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme.surface_bg)),
        inner,
    );
}

fn help_lines<'a>(content: &HelpContent<'a>, theme: &Theme) -> Vec<Line<'a>> {
    let key_style = Style::default()
        .fg(theme.pill_key_fg)
        .bg(theme.pill_key_bg)
        .add_modifier(Modifier::BOLD);
    let heading = Style::default()
        .fg(theme.text_primary)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let locked = Style::default()
        .fg(theme.text_secondary)
        .add_modifier(Modifier::DIM);

    let mut lines = Vec::new();
    for section in HelpSection::ALL {
        let mut entries = content
            .entries
            .iter()
            .filter(|e| e.section == section)
            .peekable();
        if entries.peek().is_none() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(format!(" {}", section.title()), heading)));

        for entry in entries {
            let denied = entry.admin_only && !content.can_signal;
            let action = if denied {
                Span::styled(format!("  {} (admin only)", entry.action), locked)
            } else {
                Span::styled(
                    format!("  {}", entry.action),
                    Style::default().fg(theme.pill_desc_fg),
                )
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:>7} ", entry.key), key_style),
                action,
            ]));
        }
    }

    if let Some(note) = content.gpu_note {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(" GPU n/a: {note}"),
            Style::default().fg(theme.text_secondary),
        )));
    }
    lines
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horiz] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    horiz
}
