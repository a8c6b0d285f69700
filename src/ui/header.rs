use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline};

use crate::system::history::{MetricKind, MetricsSnapshot};
use crate::ui::theme::Theme;

/// Percentages are stored as hundredths so the sparkline keeps two decimals.
const SPARK_SCALE: f32 = 100.0;
const SPARK_MAX: u64 = 100 * 100;

pub struct HeaderInfo<'a> {
    pub operator: &'a str,
    pub role: &'a str,
    pub sort_label: &'a str,
    pub process_count: usize,
    /// Set when no GPU sensor could be negotiated.
    pub gpu_note: Option<&'a str>,
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    metrics: &MetricsSnapshot,
    info: &HeaderInfo<'_>,
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_branding(frame, rows[0], info, theme);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(rows[1]);

    for (slot, kind) in panels.iter().zip(MetricKind::ALL) {
        render_metric(frame, *slot, metrics, kind, info.gpu_note, theme);
    }
}

fn render_branding(frame: &mut Frame, area: Rect, info: &HeaderInfo<'_>, theme: &Theme) {
    let secondary = Style::default().fg(theme.text_secondary);
    let line = Line::from(vec![
        Span::styled(
            " procwatch ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("{} ({})", info.operator, info.role), secondary),
        Span::raw("  "),
        Span::styled(format!("Sort: {}", info.sort_label), secondary),
        Span::raw("  "),
        Span::styled(format!("Procs: {}", info.process_count), secondary),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_metric(
    frame: &mut Frame,
    area: Rect,
    metrics: &MetricsSnapshot,
    kind: MetricKind,
    gpu_note: Option<&str>,
    theme: &Theme,
) {
    let window = metrics.get(kind);
    let unavailable = kind.is_gpu() && gpu_note.is_some();

    let title = if unavailable {
        format!(" {} n/a ", kind.label())
    } else {
        let latest = window.and_then(|w| w.latest()).unwrap_or(0.0);
        format!(" {} {:.0}% ", kind.label(), latest)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let data: Vec<u64> = window
        .map(|w| {
            w.samples
                .iter()
                .map(|v| (v.clamp(0.0, 100.0) * SPARK_SCALE) as u64)
                .collect()
        })
        .unwrap_or_default();

    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .max(SPARK_MAX)
        .style(Style::default().fg(theme.chart_color(kind)));

    frame.render_widget(sparkline, area);
}
