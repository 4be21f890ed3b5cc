//! Encoder-driven mode and menu state machine.
//!
//! One [`ControlFrame`] per UI tick goes through [`ModeMachine::handle`].
//!
//! ```text
//!                 hold > long press
//!   ┌────────┐ ───────────────────▶ ┌───────────┐
//!   │ normal │                      │ selecting │  rotate: cycle mode (wraps)
//!   └────────┘ ◀─────────────────── └───────────┘
//!      │            release
//!      │ normal, by mode:
//!      │   Scope    rotate: change style/source/zoom   press: next option
//!      │   Params   rotate: move selection (clamped)   press: toggle tweaking
//!      │            tweaking + rotate: ParamAdjust
//!      │   Menu     rotate: provisional app (wraps)    press: schedule load
//!      │   Console  (display only)
//! ```
//!
//! A hold past the super-long threshold schedules a reload of the running
//! app, once per hold.
//!
//! Loads are never performed here. The machine records a one-shot request
//! that the main loop takes on its next iteration, after the tick that saw
//! the press has finished.

use crate::mode::{Mode, ModeSet};
use crate::scope::ScopeSettings;

/// Encoder input accumulated over one UI tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFrame {
    /// Net detents turned
    pub increment: i32,
    /// A short-press edge occurred
    pub released: bool,
    /// Longest hold seen during the tick, 0 when the switch stayed up
    pub held_ms: u32,
}

/// Hold durations that change behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressThresholds {
    /// Enter mode selection
    pub long_ms: u32,
    /// Reload the running app
    pub super_long_ms: u32,
}

impl Default for PressThresholds {
    fn default() -> Self {
        Self {
            long_ms: 250,
            super_long_ms: 2000,
        }
    }
}

/// Which scope option rotation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeOption {
    /// Layout
    Style,
    /// Inputs or outputs
    Source,
    /// Samples per column
    #[default]
    Zoom,
}

impl ScopeOption {
    fn next(self) -> Self {
        match self {
            Self::Style => Self::Source,
            Self::Source => Self::Zoom,
            Self::Zoom => Self::Style,
        }
    }

    /// Short label for the scope overlay.
    pub fn label(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Source => "src",
            Self::Zoom => "zoom",
        }
    }
}

/// Request to nudge a parameter through its adjustment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamAdjust {
    /// Parameter index
    pub index: usize,
    /// Detents turned
    pub delta: i32,
}

/// UI state. Main loop only.
#[derive(Debug, Clone)]
pub struct ModeMachine {
    modes: ModeSet,
    mode: Mode,
    selecting: bool,
    thresholds: PressThresholds,
    reload_fired: bool,

    app_count: usize,
    app_selected: usize,
    app_selecting: usize,
    load_scheduled: Option<usize>,

    scope: ScopeSettings,
    scope_option: ScopeOption,
    inputs_available: bool,

    param_count: usize,
    param_selected: usize,
    tweaking: bool,
}

impl ModeMachine {
    /// Machine for `app_count` installed apps, starting on app 0 in the
    /// default mode.
    pub fn new(app_count: usize, inputs_available: bool, thresholds: PressThresholds) -> Self {
        let modes = ModeSet::new(app_count > 1);
        Self {
            mode: modes.default_mode(),
            modes,
            selecting: false,
            thresholds,
            reload_fired: false,
            app_count,
            app_selected: 0,
            app_selecting: 0,
            load_scheduled: None,
            scope: ScopeSettings::default(),
            scope_option: ScopeOption::default(),
            inputs_available,
            param_count: 0,
            param_selected: 0,
            tweaking: false,
        }
    }

    /// Advance by one UI tick.
    ///
    /// Returns a parameter adjustment when the encoder turned while tweaking.
    pub fn handle(&mut self, frame: ControlFrame) -> Option<ParamAdjust> {
        if frame.held_ms == 0 {
            self.reload_fired = false;
        }
        if frame.held_ms > self.thresholds.long_ms && !self.selecting {
            self.selecting = true;
            self.tweaking = false;
        }
        if frame.held_ms > self.thresholds.super_long_ms && !self.reload_fired {
            self.reload_fired = true;
            self.load_scheduled = Some(self.app_selected);
        }

        if self.selecting {
            if frame.increment != 0 {
                let next = self.modes.step(self.mode, frame.increment);
                self.enter(next);
            }
            if frame.released {
                self.selecting = false;
            }
            return None;
        }

        match self.mode {
            Mode::Scope => {
                self.turn_scope(frame.increment);
                if frame.released {
                    self.scope_option = self.scope_option.next();
                }
                None
            }
            Mode::Params => self.handle_params(frame),
            Mode::Menu => {
                if frame.increment != 0 {
                    self.app_selecting = wrap(self.app_selecting, frame.increment, self.app_count);
                }
                if frame.released && self.app_selecting != self.app_selected {
                    self.load_scheduled = Some(self.app_selecting);
                }
                None
            }
            Mode::Console => None,
        }
    }

    fn turn_scope(&mut self, increment: i32) {
        if increment == 0 {
            return;
        }
        match self.scope_option {
            ScopeOption::Style => self.scope.style = self.scope.style.step(increment),
            ScopeOption::Source => {
                self.scope.source = self.scope.source.step(increment, self.inputs_available);
            }
            ScopeOption::Zoom => self.scope.zoom = self.scope.zoom.step(increment),
        }
    }

    fn handle_params(&mut self, frame: ControlFrame) -> Option<ParamAdjust> {
        let mut adjust = None;
        if frame.increment != 0 {
            if self.tweaking {
                adjust = Some(ParamAdjust {
                    index: self.param_selected,
                    delta: frame.increment,
                });
            } else {
                self.param_selected = clamp(self.param_selected, frame.increment, self.param_count);
            }
        }
        if frame.released && self.param_count > 0 {
            self.tweaking = !self.tweaking;
        }
        adjust
    }

    fn enter(&mut self, mode: Mode) {
        if mode == Mode::Menu {
            self.app_selecting = self.app_selected;
        }
        self.tweaking = false;
        self.mode = mode;
    }

    /// Take the pending load request, if any. One-shot.
    pub fn take_scheduled_load(&mut self) -> Option<usize> {
        self.load_scheduled.take()
    }

    /// Record that app `index` is now running with `param_count` parameters.
    ///
    /// Returns to the default mode and resets the parameter cursor.
    pub fn app_loaded(&mut self, index: usize, param_count: usize) {
        self.app_selected = index;
        self.app_selecting = index;
        self.param_count = param_count;
        self.param_selected = 0;
        self.tweaking = false;
        self.mode = self.modes.default_mode();
    }

    /// Active mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether rotation currently changes mode.
    pub fn selecting(&self) -> bool {
        self.selecting
    }

    /// Index of the running app.
    pub fn app_selected(&self) -> usize {
        self.app_selected
    }

    /// Provisional app index in the menu.
    pub fn app_selecting(&self) -> usize {
        self.app_selecting
    }

    /// Current scope options.
    pub fn scope_settings(&self) -> ScopeSettings {
        self.scope
    }

    /// Scope option the encoder changes.
    pub fn scope_option(&self) -> ScopeOption {
        self.scope_option
    }

    /// Highlighted parameter.
    pub fn param_selected(&self) -> usize {
        self.param_selected
    }

    /// Whether rotation adjusts the highlighted parameter.
    pub fn tweaking(&self) -> bool {
        self.tweaking
    }

    /// Modes available on this build.
    pub fn modes(&self) -> &ModeSet {
        &self.modes
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_possible_truncation)] // Safety: app tables are tiny
fn wrap(at: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (at as i64)
        .wrapping_add(i64::from(delta))
        .rem_euclid(len as i64) as usize
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_possible_truncation)] // Safety: parameter tables are tiny
fn clamp(at: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (at as i64)
        .saturating_add(i64::from(delta))
        .clamp(0, len as i64 - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopeSource, ScopeStyle, Zoom};

    fn turn(increment: i32) -> ControlFrame {
        ControlFrame {
            increment,
            ..ControlFrame::default()
        }
    }

    fn hold(held_ms: u32) -> ControlFrame {
        ControlFrame {
            held_ms,
            ..ControlFrame::default()
        }
    }

    fn release() -> ControlFrame {
        ControlFrame {
            released: true,
            ..ControlFrame::default()
        }
    }

    fn machine(apps: usize) -> ModeMachine {
        ModeMachine::new(apps, true, PressThresholds::default())
    }

    #[test]
    fn test_hold_then_rotate_moves_mode_two_positions() {
        let mut m = machine(3);
        assert_eq!(m.mode(), Mode::Scope);
        m.handle(hold(300));
        assert!(m.selecting());
        m.handle(turn(1));
        m.handle(turn(1));
        assert_eq!(m.mode(), Mode::Console);
        m.handle(release());
        assert!(!m.selecting());
        assert_eq!(m.mode(), Mode::Console);
        assert_eq!(m.take_scheduled_load(), None);
        assert_eq!(m.app_selected(), 0);
    }

    #[test]
    fn test_mode_cycle_wraps() {
        let mut m = machine(1);
        m.handle(hold(300));
        m.handle(turn(-1));
        assert_eq!(m.mode(), Mode::Console);
        m.handle(turn(1));
        assert_eq!(m.mode(), Mode::Scope);
    }

    #[test]
    fn test_short_hold_is_not_selecting() {
        let mut m = machine(1);
        m.handle(hold(200));
        assert!(!m.selecting());
    }

    #[test]
    fn test_menu_commit_only_when_selection_differs() {
        let mut m = machine(3);
        m.handle(hold(300));
        m.handle(turn(-1));
        m.handle(release());
        assert_eq!(m.mode(), Mode::Menu);

        m.handle(release());
        assert_eq!(m.take_scheduled_load(), None);

        m.handle(turn(-1));
        assert_eq!(m.app_selecting(), 2);
        m.handle(release());
        assert_eq!(m.take_scheduled_load(), Some(2));
        assert_eq!(m.take_scheduled_load(), None);
        // nothing loads until the main loop reports it
        assert_eq!(m.app_selected(), 0);

        m.app_loaded(2, 4);
        assert_eq!(m.app_selected(), 2);
        assert_eq!(m.mode(), Mode::Scope);
    }

    #[test]
    fn test_entering_menu_resets_provisional_selection() {
        let mut m = machine(3);
        m.handle(hold(300));
        m.handle(turn(3));
        m.handle(release());
        m.handle(turn(1));
        assert_eq!(m.app_selecting(), 1);
        m.handle(hold(300));
        m.handle(turn(1));
        m.handle(turn(-1));
        assert_eq!(m.app_selecting(), 0);
    }

    #[test]
    fn test_scope_option_cursor() {
        let mut m = machine(1);
        m.handle(turn(1));
        assert_eq!(m.scope_settings().zoom, Zoom::DEFAULT.step(1));
        m.handle(release());
        assert_eq!(m.scope_option(), ScopeOption::Style);
        m.handle(turn(1));
        assert_eq!(m.scope_settings().style, ScopeStyle::Split);
        m.handle(release());
        m.handle(turn(1));
        assert_eq!(m.scope_settings().source, ScopeSource::Inputs);
    }

    #[test]
    fn test_params_select_clamps_and_tweak_forwards() {
        let mut m = machine(1);
        m.app_loaded(0, 3);
        m.handle(hold(300));
        m.handle(turn(1));
        m.handle(release());
        assert_eq!(m.mode(), Mode::Params);

        m.handle(turn(10));
        assert_eq!(m.param_selected(), 2);
        m.handle(turn(-10));
        assert_eq!(m.param_selected(), 0);

        m.handle(release());
        assert!(m.tweaking());
        assert_eq!(
            m.handle(turn(-2)),
            Some(ParamAdjust { index: 0, delta: -2 })
        );
        assert_eq!(m.param_selected(), 0);
        m.handle(release());
        assert!(!m.tweaking());
    }

    #[test]
    fn test_params_without_params_never_tweaks() {
        let mut m = machine(1);
        m.handle(hold(300));
        m.handle(turn(1));
        m.handle(release());
        m.handle(release());
        assert!(!m.tweaking());
        assert_eq!(m.handle(turn(1)), None);
    }

    #[test]
    fn test_super_long_hold_reloads_once_per_hold() {
        let mut m = machine(2);
        m.handle(hold(300));
        m.handle(hold(2100));
        assert_eq!(m.take_scheduled_load(), Some(0));
        m.handle(hold(2500));
        assert_eq!(m.take_scheduled_load(), None);
        m.handle(release());
        m.handle(hold(0));
        m.handle(hold(2100));
        assert_eq!(m.take_scheduled_load(), Some(0));
    }
}
