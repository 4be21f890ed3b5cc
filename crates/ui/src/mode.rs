//! Operating modes and the order the encoder cycles through them.

use heapless::Vec;

/// Operating mode shown on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Oscilloscope of inputs or outputs
    Scope,
    /// Parameter list of the running app
    Params,
    /// Log lines
    Console,
    /// App selection (multi-app builds only)
    Menu,
}

impl Mode {
    /// Short label for the mode-select overlay.
    pub fn label(self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::Params => "params",
            Self::Console => "console",
            Self::Menu => "menu",
        }
    }
}

/// The modes available on this build, in cycling order.
///
/// Cycling wraps at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSet {
    modes: Vec<Mode, 4>,
}

impl ModeSet {
    /// Scope, Params, Console, plus Menu when more than one app is installed.
    pub fn new(multi_app: bool) -> Self {
        let mut modes = Vec::new();
        // These pushes always succeed: four modes at most, capacity is 4.
        modes.push(Mode::Scope).ok();
        modes.push(Mode::Params).ok();
        modes.push(Mode::Console).ok();
        if multi_app {
            modes.push(Mode::Menu).ok();
        }
        Self { modes }
    }

    /// Mode entered at startup and after an app swap.
    pub fn default_mode(&self) -> Mode {
        Mode::Scope
    }

    /// Whether `mode` is part of this build.
    pub fn contains(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Always `false`; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Mode `delta` positions after `from`, wrapping.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)] // Safety: len <= 4
    pub fn step(&self, from: Mode, delta: i32) -> Mode {
        let len = self.modes.len() as i32;
        let at = self.modes.iter().position(|m| *m == from).unwrap_or(0) as i32;
        let next = at.wrapping_add(delta).rem_euclid(len.max(1));
        self.modes.get(next as usize).copied().unwrap_or(from)
    }

    /// Modes in cycling order.
    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        self.modes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_app_has_no_menu() {
        let set = ModeSet::new(false);
        assert_eq!(set.len(), 3);
        assert!(!set.contains(Mode::Menu));
    }

    #[test]
    fn test_step_wraps_both_ways() {
        let set = ModeSet::new(true);
        assert_eq!(set.step(Mode::Scope, 1), Mode::Params);
        assert_eq!(set.step(Mode::Menu, 1), Mode::Scope);
        assert_eq!(set.step(Mode::Scope, -1), Mode::Menu);
        assert_eq!(set.step(Mode::Params, 6), Mode::Menu);
    }
}
