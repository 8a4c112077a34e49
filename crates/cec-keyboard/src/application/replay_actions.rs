//! ActionReplayer: plays a mapped action sequence on the virtual output device.
//!
//! This use case sits at the application layer and delegates to an
//! [`OutputDevice`] for OS-level event injection.  The uinput implementation
//! and a recording double live in the infrastructure layer.

use cec_core::{Axis, KeyPhase, OutputAction, PointerAction, PointerButton};
use thiserror::Error;
use tracing::trace;

/// Error type for output device operations.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output device I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("output device is closed")]
    Closed,
    #[error("platform error: {0}")]
    Platform(String),
}

/// A virtual keyboard and pointer that accepts synthetic input.
///
/// Each call must be flushed to the OS with a synchronisation report before
/// it returns, so events become visible in the order they were emitted.
#[cfg_attr(test, mockall::automock)]
pub trait OutputDevice: Send {
    /// Emits a key down immediately followed by the matching key up.
    fn key_press(&mut self, code: u16) -> Result<(), OutputError>;

    /// Emits a key down.
    fn key_down(&mut self, code: u16) -> Result<(), OutputError>;

    /// Emits a key up.
    fn key_up(&mut self, code: u16) -> Result<(), OutputError>;

    /// Clicks a pointer button (press then release).
    fn pointer_click(&mut self, button: PointerButton) -> Result<(), OutputError>;

    /// Moves the pointer by `delta` along `axis`.
    fn pointer_move(&mut self, axis: Axis, delta: i32) -> Result<(), OutputError>;

    /// Destroys the virtual device.  Further calls return [`OutputError::Closed`].
    fn close(&mut self) -> Result<(), OutputError>;
}

impl<T: OutputDevice + ?Sized> OutputDevice for Box<T> {
    fn key_press(&mut self, code: u16) -> Result<(), OutputError> {
        (**self).key_press(code)
    }

    fn key_down(&mut self, code: u16) -> Result<(), OutputError> {
        (**self).key_down(code)
    }

    fn key_up(&mut self, code: u16) -> Result<(), OutputError> {
        (**self).key_up(code)
    }

    fn pointer_click(&mut self, button: PointerButton) -> Result<(), OutputError> {
        (**self).pointer_click(button)
    }

    fn pointer_move(&mut self, axis: Axis, delta: i32) -> Result<(), OutputError> {
        (**self).pointer_move(axis, delta)
    }

    fn close(&mut self) -> Result<(), OutputError> {
        (**self).close()
    }
}

/// An action that the output device refused.
#[derive(Debug, Error)]
#[error("failed to emit {action}: {source}")]
pub struct ReplayError {
    pub action: OutputAction,
    #[source]
    pub source: OutputError,
}

/// Replays action sequences on an [`OutputDevice`], strictly in order.
pub struct ActionReplayer<D> {
    device: D,
}

impl<D: OutputDevice> ActionReplayer<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Emits every action in `actions`, stopping at the first failure.
    ///
    /// Returns the number of actions emitted.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] naming the action the device rejected.  Actions
    /// after it are not attempted.
    pub fn replay(&mut self, actions: &[OutputAction]) -> Result<usize, ReplayError> {
        for action in actions {
            trace!(%action, "emitting");
            self.emit(action)
                .map_err(|source| ReplayError { action: *action, source })?;
        }
        Ok(actions.len())
    }

    fn emit(&mut self, action: &OutputAction) -> Result<(), OutputError> {
        match *action {
            OutputAction::Key { code, phase: KeyPhase::Press } => self.device.key_press(code),
            OutputAction::Key { code, phase: KeyPhase::Down } => self.device.key_down(code),
            OutputAction::Key { code, phase: KeyPhase::Up } => self.device.key_up(code),
            OutputAction::Pointer(PointerAction::MoveX(delta)) => {
                self.device.pointer_move(Axis::X, delta)
            }
            OutputAction::Pointer(PointerAction::MoveY(delta)) => {
                self.device.pointer_move(Axis::Y, delta)
            }
            OutputAction::Pointer(PointerAction::LeftClick) => {
                self.device.pointer_click(PointerButton::Left)
            }
            OutputAction::Pointer(PointerAction::RightClick) => {
                self.device.pointer_click(PointerButton::Right)
            }
            OutputAction::Pointer(PointerAction::MiddleClick) => {
                self.device.pointer_click(PointerButton::Middle)
            }
            OutputAction::Pointer(PointerAction::SideClick) => {
                self.device.pointer_click(PointerButton::Side)
            }
        }
    }

    /// Closes the underlying device.
    pub fn close(&mut self) -> Result<(), OutputError> {
        self.device.close()
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{predicate::eq, Sequence};

    #[test]
    fn test_replay_emits_actions_in_declaration_order() {
        // Arrange
        let mut device = MockOutputDevice::new();
        let mut seq = Sequence::new();
        device.expect_key_down().with(eq(29)).times(1).in_sequence(&mut seq).returning(|_| Ok(()));
        device.expect_key_press().with(eq(46)).times(1).in_sequence(&mut seq).returning(|_| Ok(()));
        device.expect_key_up().with(eq(29)).times(1).in_sequence(&mut seq).returning(|_| Ok(()));
        let mut replayer = ActionReplayer::new(device);

        // Act
        let emitted = replayer
            .replay(&[OutputAction::down(29), OutputAction::press(46), OutputAction::up(29)])
            .expect("replay must succeed");

        // Assert
        assert_eq!(emitted, 3);
    }

    #[test]
    fn test_replay_routes_pointer_actions() {
        // Arrange
        let mut device = MockOutputDevice::new();
        let mut seq = Sequence::new();
        device
            .expect_pointer_click()
            .with(eq(PointerButton::Right))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        device
            .expect_pointer_move()
            .with(eq(Axis::X), eq(-5))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        device
            .expect_pointer_move()
            .with(eq(Axis::Y), eq(12))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let mut replayer = ActionReplayer::new(device);

        // Act
        let result = replayer.replay(&[
            PointerAction::RightClick.into(),
            PointerAction::MoveX(-5).into(),
            PointerAction::MoveY(12).into(),
        ]);

        // Assert
        assert_eq!(result.expect("replay must succeed"), 3);
    }

    #[test]
    fn test_replay_maps_each_click_to_its_button() {
        // Arrange
        let mut device = MockOutputDevice::new();
        let mut seq = Sequence::new();
        for button in [
            PointerButton::Left,
            PointerButton::Right,
            PointerButton::Middle,
            PointerButton::Side,
        ] {
            device
                .expect_pointer_click()
                .with(eq(button))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }
        let mut replayer = ActionReplayer::new(device);

        // Act
        let result = replayer.replay(&[
            PointerAction::LeftClick.into(),
            PointerAction::RightClick.into(),
            PointerAction::MiddleClick.into(),
            PointerAction::SideClick.into(),
        ]);

        // Assert
        assert_eq!(result.expect("replay must succeed"), 4);
    }

    #[test]
    fn test_replay_stops_at_first_failure() {
        // Arrange
        let mut device = MockOutputDevice::new();
        device.expect_key_press().with(eq(30)).times(1).returning(|_| Ok(()));
        device
            .expect_key_press()
            .with(eq(31))
            .times(1)
            .returning(|_| Err(OutputError::Platform("injected failure".to_string())));
        device.expect_key_press().with(eq(32)).never();
        let mut replayer = ActionReplayer::new(device);

        // Act
        let err = replayer
            .replay(&[OutputAction::press(30), OutputAction::press(31), OutputAction::press(32)])
            .unwrap_err();

        // Assert
        assert_eq!(err.action, OutputAction::press(31));
        assert!(matches!(err.source, OutputError::Platform(_)));
        assert!(err.to_string().contains("key press 31"));
    }

    #[test]
    fn test_replay_empty_sequence_emits_nothing() {
        let device = MockOutputDevice::new();
        let mut replayer = ActionReplayer::new(device);

        assert_eq!(replayer.replay(&[]).expect("empty replay must succeed"), 0);
    }

    #[test]
    fn test_close_delegates_to_device() {
        let mut device = MockOutputDevice::new();
        device.expect_close().times(1).returning(|| Ok(()));
        let mut replayer = ActionReplayer::new(device);

        assert!(replayer.close().is_ok());
    }

    #[test]
    fn test_boxed_device_forwards_calls() {
        // Arrange
        let mut device = MockOutputDevice::new();
        device.expect_key_down().with(eq(42)).times(1).returning(|_| Ok(()));
        let boxed: Box<dyn OutputDevice> = Box::new(device);
        let mut replayer = ActionReplayer::new(boxed);

        // Act / Assert
        assert_eq!(replayer.replay(&[OutputAction::down(42)]).expect("replay must succeed"), 1);
    }
}
