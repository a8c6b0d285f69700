use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::config::{Config, KeybindsConfig, OperatorRole, parse_key};
use crate::poller::Poller;
use crate::reconcile::{ProcessView, SortMode};
use crate::system::lifecycle::{
    CommandOutcome, LifecycleCommand, LifecycleCommandRunner, Requester, authorize,
};
use crate::ui::theme::{ColorSupport, SeverityOverrides, Theme, resolve_color_support};

const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub ok: bool,
    created: Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, ok: bool) -> Self {
        StatusMessage {
            text: text.into(),
            ok,
            created: Instant::now(),
        }
    }

    fn expired(&self) -> bool {
        self.created.elapsed() >= STATUS_TTL
    }
}

impl From<&CommandOutcome> for StatusMessage {
    fn from(outcome: &CommandOutcome) -> Self {
        StatusMessage::new(outcome.message(), outcome.ok)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub terminate: KeyCode,
    pub pause: KeyCode,
    pub filter: KeyCode,
    pub switch_table: KeyCode,
    pub cycle_sort: KeyCode,
    pub cycle_theme: KeyCode,
    pub refresh: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            terminate: parse_key(&kb.terminate).unwrap_or(KeyCode::Char('x')),
            pause: parse_key(&kb.pause).unwrap_or(KeyCode::Char('p')),
            filter: parse_key(&kb.filter).unwrap_or(KeyCode::Char('/')),
            switch_table: parse_key(&kb.switch_table).unwrap_or(KeyCode::Tab),
            cycle_sort: parse_key(&kb.cycle_sort).unwrap_or(KeyCode::Char('s')),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        use HelpSection::{Lifecycle, Navigation, Tables};
        vec![
            HelpEntry::new(Navigation, "↑↓".to_string(), "Move selection"),
            HelpEntry::new(Navigation, key_label(self.switch_table), "Switch table"),
            HelpEntry::new(Navigation, key_label(self.help), "Toggle help"),
            HelpEntry::new(Navigation, key_label(self.quit), "Quit"),
            HelpEntry::new(Navigation, "Ctrl+C".to_string(), "Quit (always)"),
            HelpEntry::new(Tables, key_label(self.filter), "Filter by name or user"),
            HelpEntry::new(Tables, key_label(self.cycle_sort), "Cycle sort mode"),
            HelpEntry::new(Tables, key_label(self.cycle_theme), "Cycle theme"),
            HelpEntry::new(Tables, key_label(self.refresh), "Refresh now"),
            HelpEntry::new(Lifecycle, key_label(self.terminate), "Terminate process").restricted(),
            HelpEntry::new(Lifecycle, key_label(self.pause), "Pause process").restricted(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpSection {
    Navigation,
    Tables,
    Lifecycle,
}

impl HelpSection {
    pub const ALL: [HelpSection; 3] = [
        HelpSection::Navigation,
        HelpSection::Tables,
        HelpSection::Lifecycle,
    ];

    pub fn title(self) -> &'static str {
        match self {
            HelpSection::Navigation => "Navigation",
            HelpSection::Tables => "Tables",
            HelpSection::Lifecycle => "Process control",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub section: HelpSection,
    pub key: String,
    pub action: &'static str,
    /// Denied for viewers.
    pub admin_only: bool,
}

impl HelpEntry {
    fn new(section: HelpSection, key: String, action: &'static str) -> Self {
        HelpEntry {
            section,
            key,
            action,
            admin_only: false,
        }
    }

    fn restricted(mut self) -> Self {
        self.admin_only = true;
        self
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub poller: Poller,
    runner: LifecycleCommandRunner,
    pub role: OperatorRole,
    pub operator: String,
    /// Index of the view that owns keyboard selection.
    pub focus: usize,
    pub input_mode: InputMode,
    pub filter_text: String,
    pub status_message: Option<StatusMessage>,
    pub theme: Theme,
    pub color_support: ColorSupport,
    severity_overrides: SeverityOverrides,
    pub keybinds: ResolvedKeybinds,
    pub gpu_note: Option<String>,
    pub sampling_error: Option<String>,
}

impl App {
    pub fn new(
        config: &Config,
        poller: Poller,
        runner: LifecycleCommandRunner,
        gpu_note: Option<String>,
    ) -> Self {
        let color_support = resolve_color_support(&config.general.color_support);
        let severity_overrides = SeverityOverrides::from_config(&config.colors);
        let theme = Theme::from_config(&config.colors.theme, &severity_overrides, color_support);
        let operator = config.operator.resolved_name();
        let runner = runner.with_requester(Requester::new(&operator, config.operator.role));

        App {
            running: true,
            poller,
            runner,
            role: config.operator.role,
            operator,
            focus: 0,
            input_mode: InputMode::Normal,
            filter_text: String::new(),
            status_message: None,
            theme,
            color_support,
            severity_overrides,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            gpu_note,
            sampling_error: None,
        }
    }

    pub fn on_metrics_tick(&mut self) {
        self.poller.metrics_cycle();
        self.expire_status();
    }

    pub fn on_table_tick(&mut self) {
        let cycle = self.poller.table_cycle();

        // Newest outcome wins the status bar.
        if let Some(outcome) = cycle.outcomes.last() {
            self.status_message = Some(StatusMessage::from(outcome));
        }

        match cycle.result {
            Ok(_) => self.sampling_error = None,
            Err(err) => self.sampling_error = Some(err.to_string()),
        }

        self.ensure_selection();
        self.expire_status();
    }

    pub fn focused_view(&self) -> Option<&ProcessView> {
        self.poller.view(self.focus)
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.focused_view().and_then(|v| v.selected_pid())
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Filter => self.map_key_filter(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Arrow keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::Esc if !self.filter_text.is_empty() => return Action::ClearFilter,
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.filter {
            return Action::EnterFilterMode;
        }
        if code == kb.terminate {
            return self.selected_pid().map_or(Action::None, Action::Terminate);
        }
        if code == kb.pause {
            return self.selected_pid().map_or(Action::None, Action::Pause);
        }
        if code == kb.switch_table {
            return Action::SwitchTable;
        }
        if code == kb.cycle_sort {
            return Action::CycleSortMode;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_filter(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::ClearFilter,
            KeyCode::Enter => Action::ExitFilterMode,
            KeyCode::Backspace => {
                let mut text = self.filter_text.clone();
                text.pop();
                Action::UpdateFilter(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.filter_text.clone();
                text.push(c);
                Action::UpdateFilter(text)
            }
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::Terminate(pid) => self.request(LifecycleCommand::Terminate, pid),
            Action::Pause(pid) => self.request(LifecycleCommand::Pause, pid),
            Action::EnterFilterMode => {
                self.input_mode = InputMode::Filter;
            }
            Action::ExitFilterMode => {
                self.input_mode = InputMode::Normal;
            }
            Action::ClearFilter => {
                self.filter_text.clear();
                self.input_mode = InputMode::Normal;
                self.poller.set_filter_text("");
                self.ensure_selection();
            }
            Action::UpdateFilter(text) => {
                self.poller.set_filter_text(&text);
                self.filter_text = text;
                self.ensure_selection();
            }
            Action::SwitchTable => {
                let count = self.poller.views().len().max(1);
                self.focus = (self.focus + 1) % count;
                self.ensure_selection();
            }
            Action::CycleSortMode => {
                let next = self.poller.sort().next();
                self.poller.set_sort(next);
            }
            Action::CycleTheme => {
                self.theme = self
                    .theme
                    .next(&self.severity_overrides, self.color_support);
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::Refresh => {
                self.on_metrics_tick();
                self.on_table_tick();
            }
            Action::None => {}
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        self.poller.sort()
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<HelpEntry> {
        self.keybinds.help_entries()
    }

    /// Role gate plus audit trail in front of the command runner.
    fn request(&mut self, command: LifecycleCommand, pid: u32) {
        if let Err(denied) = authorize(self.runner.requester(), command, pid) {
            self.status_message = Some(StatusMessage::new(denied, false));
            return;
        }

        self.runner.submit(command, pid);
        self.status_message = Some(StatusMessage::new(
            format!("Sending {command} to PID {pid}"),
            true,
        ));
    }

    fn navigate(&mut self, direction: Direction) {
        let Some(view) = self.poller.view_mut(self.focus) else {
            return;
        };
        match direction {
            Direction::Up => view.select_previous(),
            Direction::Down => view.select_next(),
        }
    }

    fn ensure_selection(&mut self) {
        if let Some(view) = self.poller.view_mut(self.focus)
            && view.selected_ordinal().is_none()
        {
            view.select_next();
        }
    }

    fn expire_status(&mut self) {
        if self.status_message.as_ref().is_some_and(StatusMessage::expired) {
            self.status_message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::poller::{ALL_VIEW, RUNNING_VIEW, default_views};
    use crate::system::collector::MetricSource;
    use crate::system::history::{MetricKind, MetricSampler};
    use crate::system::lifecycle::SignalSink;
    use crate::system::process::{ProcessRecord, ProcessStatus};
    use crate::system::signal::SignalError;
    use crate::system::snapshot::SamplingError;

    struct FixedMetrics;

    impl MetricSource for FixedMetrics {
        fn sample(&mut self, kind: MetricKind) -> f32 {
            if kind.is_gpu() { 0.0 } else { 25.0 }
        }
    }

    struct AcceptingSink;

    impl SignalSink for AcceptingSink {
        fn send(&self, _pid: u32, _command: LifecycleCommand) -> Result<(), SignalError> {
            Ok(())
        }
    }

    fn records() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord::new(10, "bash").with_status(ProcessStatus::Running),
            ProcessRecord::new(11, "cron").with_status(ProcessStatus::Sleeping),
            ProcessRecord::new(12, "awk").with_status(ProcessStatus::Running),
        ]
    }

    fn make_app(role: OperatorRole) -> App {
        let mut config = Config::default();
        config.operator.role = role;
        config.operator.name = Some("tester".to_string());
        config.general.color_support = "truecolor".to_string();

        let (runner, completions) = LifecycleCommandRunner::new(Arc::new(AcceptingSink));
        let mut poller = Poller::new(
            Box::new(FixedMetrics),
            Box::new(|| Ok::<_, SamplingError>(records())),
            Arc::new(MetricSampler::new(10)),
            default_views(),
        );
        poller.attach_completions(completions);
        App::new(&config, poller, runner, None)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn table_tick_selects_first_row_of_focused_view() {
        let mut app = make_app(OperatorRole::Viewer);
        app.on_table_tick();
        assert_eq!(app.focus, RUNNING_VIEW);
        assert_eq!(app.selected_pid(), Some(12));
        assert_eq!(app.poller.view(ALL_VIEW).unwrap().rows().len(), 3);
    }

    #[tokio::test]
    async fn navigation_stays_within_focused_view() {
        let mut app = make_app(OperatorRole::Viewer);
        app.on_table_tick();
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid(), Some(10));
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid(), Some(10));

        app.dispatch(Action::SwitchTable);
        assert_eq!(app.focus, ALL_VIEW);
        assert_eq!(app.selected_pid(), Some(12));
        app.dispatch(Action::SwitchTable);
        assert_eq!(app.focus, RUNNING_VIEW);
        assert_eq!(app.selected_pid(), Some(10));
    }

    #[tokio::test]
    async fn viewer_is_denied_terminate() {
        let mut app = make_app(OperatorRole::Viewer);
        app.on_table_tick();
        let action = app.map_key(key(KeyCode::Char('x')));
        assert_eq!(action, Action::Terminate(12));
        app.dispatch(action);
        let status = app.status_message.as_ref().unwrap();
        assert!(!status.ok);
        assert!(status.text.contains("Permission denied"));
    }

    #[tokio::test]
    async fn admin_command_outcome_reaches_status_bar() {
        let mut app = make_app(OperatorRole::Admin);
        app.on_table_tick();
        app.dispatch(Action::Pause(12));
        assert_eq!(app.status_message.as_ref().unwrap().text, "Sending pause to PID 12");

        // Give the blocking worker a chance to post its outcome.
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.on_table_tick();
            if app.status_message.as_ref().unwrap().text.starts_with("Sent") {
                break;
            }
        }
        let status = app.status_message.as_ref().unwrap();
        assert!(status.ok);
        assert_eq!(status.text, "Sent pause to PID 12");
    }

    #[tokio::test]
    async fn filter_narrows_both_views() {
        let mut app = make_app(OperatorRole::Viewer);
        app.on_table_tick();
        app.dispatch(Action::EnterFilterMode);
        for c in "cr".chars() {
            let action = app.map_key(key(KeyCode::Char(c)));
            app.dispatch(action);
        }
        assert_eq!(app.filter_text, "cr");
        assert!(app.poller.view(RUNNING_VIEW).unwrap().rows().is_empty());
        assert_eq!(app.poller.view(ALL_VIEW).unwrap().rows().len(), 1);

        app.dispatch(app.map_key(key(KeyCode::Esc)));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.poller.view(ALL_VIEW).unwrap().rows().len(), 3);
    }

    #[tokio::test]
    async fn sampling_error_is_surfaced_and_rows_kept() {
        let mut config = Config::default();
        config.general.color_support = "mono".to_string();
        let (runner, _completions) = LifecycleCommandRunner::new(Arc::new(AcceptingSink));
        let mut calls = 0;
        let poller = Poller::new(
            Box::new(FixedMetrics),
            Box::new(move || {
                calls += 1;
                if calls == 1 {
                    Ok::<_, SamplingError>(records())
                } else {
                    Err(SamplingError::EmptyEnumeration)
                }
            }),
            Arc::new(MetricSampler::new(10)),
            default_views(),
        );
        let mut app = App::new(&config, poller, runner, None);

        app.on_table_tick();
        assert!(app.sampling_error.is_none());
        app.on_table_tick();
        assert!(app.sampling_error.is_some());
        assert_eq!(app.poller.view(ALL_VIEW).unwrap().rows().len(), 3);
        assert_eq!(app.theme.name, "mono");
    }

    #[tokio::test]
    async fn cycle_sort_reorders_rows() {
        let mut app = make_app(OperatorRole::Viewer);
        app.on_table_tick();
        assert_eq!(app.sort_mode(), SortMode::Name);
        app.dispatch(Action::CycleSortMode);
        assert_eq!(app.sort_mode(), SortMode::Cpu);
    }

    #[tokio::test]
    async fn default_keybinds() {
        let app = make_app(OperatorRole::Viewer);
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.map_key(key(KeyCode::Tab)), Action::SwitchTable);
        assert_eq!(app.map_key(key(KeyCode::Char('/'))), Action::EnterFilterMode);
        assert_eq!(app.map_key(key(KeyCode::Char('s'))), Action::CycleSortMode);
        assert_eq!(app.map_key(key(KeyCode::Up)), Action::Navigate(Direction::Up));
        // Nothing selected yet.
        assert_eq!(app.map_key(key(KeyCode::Char('x'))), Action::None);
        assert_eq!(
            app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[tokio::test]
    async fn help_mode_blocks_other_keys() {
        let mut app = make_app(OperatorRole::Viewer);
        app.dispatch(Action::ToggleHelp);
        assert!(app.show_help());
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Action::None);
        assert_eq!(app.map_key(key(KeyCode::Esc)), Action::ToggleHelp);
        assert_eq!(
            app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }
}
