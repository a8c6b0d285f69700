use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::format::truncate_unicode;
use crate::reconcile::ProcessView;
use crate::ui::theme::Theme;

const NAME_WIDTH: usize = 30;
const USER_WIDTH: usize = 12;

pub const COLUMNS: [&str; 6] = ["PID", "NAME", "USER", "CPU%", "MEM%", "STATUS"];

/// Draws one view as a table. Only the focused view highlights its selection.
pub fn render(frame: &mut Frame, area: Rect, view: &ProcessView, focused: bool, theme: &Theme) {
    let border = if focused {
        theme.focus_border
    } else {
        theme.overlay_border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ({}) ", view.title(), view.rows().len()),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let header = Row::new(COLUMNS.map(Cell::from)).style(
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    );

    let rows = view.rows().iter().map(|row| {
        Row::new(vec![
            Cell::from(row.pid.to_string()),
            Cell::from(truncate_unicode(&row.name, NAME_WIDTH)),
            Cell::from(truncate_unicode(&row.owner, USER_WIDTH)),
            Cell::from(format!("{:.1}", row.cpu_percent)),
            Cell::from(format!("{:.1}", row.memory_percent)),
            Cell::from(row.status.label()),
        ])
        .style(
            Style::default()
                .fg(theme.severity_color(row.severity))
                .bg(theme.row_bg(row.parity)),
        )
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Min(12),
        Constraint::Length(USER_WIDTH as u16),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    if focused {
        state.select(view.selected_ordinal());
    }
    frame.render_stateful_widget(table, area, &mut state);
}
