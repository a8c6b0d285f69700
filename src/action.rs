#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    Terminate(u32),
    Pause(u32),
    EnterFilterMode,
    ExitFilterMode,
    ClearFilter,
    UpdateFilter(String),
    SwitchTable,
    CycleSortMode,
    CycleTheme,
    ToggleHelp,
    Refresh,
    None,
}
