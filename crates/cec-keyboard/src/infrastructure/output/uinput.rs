//! Linux uinput virtual keyboard and mouse via `evdev`.
//!
//! # What is uinput? (for beginners)
//!
//! `/dev/uinput` lets a user-space process create an input device that the
//! kernel treats exactly like real hardware.  Events written to it are
//! delivered to X11, Wayland compositors and the console alike, so the
//! bridge works without a desktop session.
//!
//! Every write is a batch of events terminated by a `SYN_REPORT`, which tells
//! readers the batch is complete.  `evdev`'s [`VirtualDevice::emit`] appends
//! that report for us, so a key press is two emits (down, then up) and each
//! half is visible on its own.
//!
//! # Permissions
//!
//! The process needs write access to `/dev/uinput`, usually via root or the
//! `input` group.  Without it, [`UinputDevice::create`] fails with an I/O
//! error.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};
use tracing::{debug, info};

use cec_core::{Axis, PointerButton};

use crate::application::replay_actions::{OutputDevice, OutputError};

/// Name the virtual device registers under.
pub const DEVICE_NAME: &str = "cec-keyboard";

/// Highest key code registered on the virtual keyboard (`KEY_MAX`).
const KEY_CODE_MAX: u16 = 0x2ff;

const KEY_RELEASED: i32 = 0;
const KEY_PRESSED: i32 = 1;

/// A uinput keyboard that also reports relative pointer motion and buttons.
pub struct UinputDevice {
    device: Option<VirtualDevice>,
}

impl UinputDevice {
    /// Creates the virtual device with every key code and both pointer axes.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] if `/dev/uinput` cannot be opened or the
    /// device cannot be registered.
    pub fn create() -> Result<Self, OutputError> {
        let mut keys = AttributeSet::<Key>::new();
        for code in 1..=KEY_CODE_MAX {
            keys.insert(Key::new(code));
        }
        let mut axes = AttributeSet::<RelativeAxisType>::new();
        axes.insert(RelativeAxisType::REL_X);
        axes.insert(RelativeAxisType::REL_Y);

        let device = VirtualDeviceBuilder::new()?
            .name(DEVICE_NAME)
            .with_keys(&keys)?
            .with_relative_axes(&axes)?
            .build()?;
        info!(name = DEVICE_NAME, "uinput device created");
        Ok(Self { device: Some(device) })
    }

    fn emit(&mut self, events: &[InputEvent]) -> Result<(), OutputError> {
        let device = self.device.as_mut().ok_or(OutputError::Closed)?;
        device.emit(events)?;
        Ok(())
    }

    fn key(&mut self, code: u16, value: i32) -> Result<(), OutputError> {
        self.emit(&[InputEvent::new(EventType::KEY, code, value)])
    }
}

fn button_key(button: PointerButton) -> Key {
    match button {
        PointerButton::Left => Key::BTN_LEFT,
        PointerButton::Right => Key::BTN_RIGHT,
        PointerButton::Middle => Key::BTN_MIDDLE,
        PointerButton::Side => Key::BTN_SIDE,
    }
}

fn axis_code(axis: Axis) -> RelativeAxisType {
    match axis {
        Axis::X => RelativeAxisType::REL_X,
        Axis::Y => RelativeAxisType::REL_Y,
    }
}

impl OutputDevice for UinputDevice {
    fn key_press(&mut self, code: u16) -> Result<(), OutputError> {
        self.key(code, KEY_PRESSED)?;
        self.key(code, KEY_RELEASED)
    }

    fn key_down(&mut self, code: u16) -> Result<(), OutputError> {
        self.key(code, KEY_PRESSED)
    }

    fn key_up(&mut self, code: u16) -> Result<(), OutputError> {
        self.key(code, KEY_RELEASED)
    }

    fn pointer_click(&mut self, button: PointerButton) -> Result<(), OutputError> {
        let code = button_key(button).code();
        self.key(code, KEY_PRESSED)?;
        self.key(code, KEY_RELEASED)
    }

    fn pointer_move(&mut self, axis: Axis, delta: i32) -> Result<(), OutputError> {
        self.emit(&[InputEvent::new(EventType::RELATIVE, axis_code(axis).0, delta)])
    }

    fn close(&mut self) -> Result<(), OutputError> {
        if self.device.take().is_some() {
            debug!(name = DEVICE_NAME, "uinput device destroyed");
        }
        Ok(())
    }
}
