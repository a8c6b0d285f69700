pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let metrics = app.poller.sampler().snapshot();
    let info = header::HeaderInfo {
        operator: &app.operator,
        role: app.role.label(),
        sort_label: app.sort_mode().label(),
        process_count: app.poller.process_count(),
        gpu_note: app.gpu_note.as_deref(),
    };
    header::render(frame, chunks[0], &metrics, &info, &app.theme);

    let views = app.poller.views();
    if !views.is_empty() {
        let tables = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, views.len() as u32); views.len()])
            .split(chunks[1]);
        for (index, (view, area)) in views.iter().zip(tables.iter()).enumerate() {
            process_table::render(frame, *area, view, index == app.focus, &app.theme);
        }
    }

    statusbar::render(
        frame,
        chunks[2],
        app.input_mode,
        &app.filter_text,
        app.status_message.as_ref(),
        app.sampling_error.as_deref(),
        &app.theme,
    );

    // Help overlay, rendered last to appear on top
    if app.show_help() {
        let entries = app.help_entries();
        let content = help::HelpContent {
            entries: &entries,
            role: app.role.label(),
            can_signal: app.role.can_signal(),
            gpu_note: app.gpu_note.as_deref(),
        };
        help::render(frame, frame.area(), &content, &app.theme);
    }
}
