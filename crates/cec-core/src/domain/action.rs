//! Output actions replayed onto the host's virtual input device.
//!
//! One remote key resolves to an ordered list of [`OutputAction`]s.  Each
//! action is either a keyboard action (a Linux input key code plus a phase)
//! or a pointer action (a click or a relative move); a single action never
//! mixes the two.

use std::fmt;

/// Which part of a keystroke a keyboard action emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    /// Key down immediately followed by key up.
    Press,
    /// Key down only; the key stays held until a matching `Up`.
    Down,
    /// Key up only.
    Up,
}

impl fmt::Display for KeyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyPhase::Press => "press",
            KeyPhase::Down => "down",
            KeyPhase::Up => "up",
        })
    }
}

/// Pointer button that a click action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Side,
}

/// Axis of a relative pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// A pointer directive.  Exactly one is carried per pointer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    LeftClick,
    RightClick,
    MiddleClick,
    SideClick,
    /// Relative horizontal move; positive values move right.
    MoveX(i32),
    /// Relative vertical move; positive values move down.
    MoveY(i32),
}

/// One step of a mapped key's output sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputAction {
    /// A keyboard event for a Linux input key code (`KEY_*` from
    /// `linux/input-event-codes.h`).
    Key { code: u16, phase: KeyPhase },
    /// A pointer click or move.
    Pointer(PointerAction),
}

impl OutputAction {
    pub fn press(code: u16) -> Self {
        OutputAction::Key { code, phase: KeyPhase::Press }
    }

    pub fn down(code: u16) -> Self {
        OutputAction::Key { code, phase: KeyPhase::Down }
    }

    pub fn up(code: u16) -> Self {
        OutputAction::Key { code, phase: KeyPhase::Up }
    }
}

impl From<PointerAction> for OutputAction {
    fn from(action: PointerAction) -> Self {
        OutputAction::Pointer(action)
    }
}

impl fmt::Display for OutputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputAction::Key { code, phase } => write!(f, "key {phase} {code}"),
            OutputAction::Pointer(PointerAction::LeftClick) => f.write_str("left click"),
            OutputAction::Pointer(PointerAction::RightClick) => f.write_str("right click"),
            OutputAction::Pointer(PointerAction::MiddleClick) => f.write_str("middle click"),
            OutputAction::Pointer(PointerAction::SideClick) => f.write_str("side click"),
            OutputAction::Pointer(PointerAction::MoveX(delta)) => write!(f, "move x {delta:+}"),
            OutputAction::Pointer(PointerAction::MoveY(delta)) => write!(f, "move y {delta:+}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_constructors_set_phase() {
        assert_eq!(OutputAction::press(30), OutputAction::Key { code: 30, phase: KeyPhase::Press });
        assert_eq!(OutputAction::down(31), OutputAction::Key { code: 31, phase: KeyPhase::Down });
        assert_eq!(OutputAction::up(32), OutputAction::Key { code: 32, phase: KeyPhase::Up });
    }

    #[test]
    fn test_display_is_human_readable() {
        assert_eq!(OutputAction::press(30).to_string(), "key press 30");
        assert_eq!(OutputAction::from(PointerAction::MoveY(-12)).to_string(), "move y -12");
        assert_eq!(OutputAction::from(PointerAction::MoveX(3)).to_string(), "move x +3");
        assert_eq!(OutputAction::from(PointerAction::RightClick).to_string(), "right click");
    }
}
