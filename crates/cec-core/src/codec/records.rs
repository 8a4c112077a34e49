//! Structured mapping records, as read from a YAML or TOML config file.
//!
//! ```yaml
//! adapter: ttyACM
//! name: Keyboard
//! type: recording
//! mappings:
//!   - cecCode: 0
//!     actions:
//!       - keyboard: { type: press, code: 28 }
//!   - cecCode: 113
//!     actions:
//!       - mouse: { leftClick: {} }
//!   - cecCode: 1
//!     actions:
//!       - mouse: { moveY: -10 }
//! ```
//!
//! The serde types mirror the file layout one-to-one and carry no validation.
//! [`build_table`] and [`ConfigRecord::into_parts`] perform the checks and
//! report the offending mapping/action index.

use serde::{Deserialize, Serialize};

use super::MappingError;
use crate::domain::action::{KeyPhase, OutputAction, PointerAction};
use crate::domain::device::{DeviceSettings, DeviceType};
use crate::domain::event::RemoteCode;
use crate::domain::mapping::{MappingEntry, MappingTable, TableError};

/// Top-level config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Adapter selector (substring of the adapter path or comm port).
    #[serde(default)]
    pub adapter: String,
    /// OSD name announced on the CEC bus.
    #[serde(default)]
    pub name: String,
    /// Logical CEC device type.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub mappings: Vec<MappingRecord>,
}

/// One `mappings[]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    /// Signed so that negative codes can be reported instead of failing to parse.
    pub cec_code: i64,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

/// One action slot.  Exactly one of `keyboard` / `mouse` must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<KeyboardRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse: Option<MouseRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardRecord {
    /// `press`, `down` or `up`.  Kept as text so that unknown values can be
    /// reported with their position.
    #[serde(rename = "type")]
    pub phase: String,
    /// Linux input key code.
    pub code: u16,
}

/// Pointer directives.  Exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_click: Option<Click>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_click: Option<Click>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_click: Option<Click>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_click: Option<Click>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_y: Option<i32>,
}

/// Marker for click directives, written as an empty map (`leftClick: {}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {}

impl MouseRecord {
    /// Returns every directive that is set, with its config name.
    fn directives(&self) -> Vec<(&'static str, PointerAction)> {
        let mut set = Vec::with_capacity(1);
        if self.left_click.is_some() {
            set.push(("leftClick", PointerAction::LeftClick));
        }
        if self.right_click.is_some() {
            set.push(("rightClick", PointerAction::RightClick));
        }
        if self.middle_click.is_some() {
            set.push(("middleClick", PointerAction::MiddleClick));
        }
        if self.side_click.is_some() {
            set.push(("sideClick", PointerAction::SideClick));
        }
        if let Some(delta) = self.move_x {
            set.push(("moveX", PointerAction::MoveX(delta)));
        }
        if let Some(delta) = self.move_y {
            set.push(("moveY", PointerAction::MoveY(delta)));
        }
        set
    }
}

fn parse_phase(phase: &str) -> Option<KeyPhase> {
    match phase {
        "press" => Some(KeyPhase::Press),
        "down" => Some(KeyPhase::Down),
        "up" => Some(KeyPhase::Up),
        _ => None,
    }
}

/// Converts one action slot, checking that it holds exactly one directive.
fn convert_action(
    action: &ActionRecord,
    index: usize,
    code: RemoteCode,
    action_index: usize,
) -> Result<OutputAction, MappingError> {
    match (&action.keyboard, &action.mouse) {
        (Some(_), Some(_)) => Err(MappingError::AmbiguousAction { index, code, action_index }),
        (None, None) => Err(MappingError::EmptyAction { index, code, action_index }),
        (Some(keyboard), None) => {
            let phase = parse_phase(&keyboard.phase).ok_or_else(|| MappingError::InvalidKeyPhase {
                index,
                code,
                action_index,
                phase: keyboard.phase.clone(),
            })?;
            Ok(OutputAction::Key { code: keyboard.code, phase })
        }
        (None, Some(mouse)) => {
            let directives = mouse.directives();
            match directives.as_slice() {
                [] => Err(MappingError::NoPointerDirective { index, code, action_index }),
                [(_, pointer)] => Ok(OutputAction::Pointer(*pointer)),
                many => Err(MappingError::MultiplePointerDirectives {
                    index,
                    code,
                    action_index,
                    directives: many.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", "),
                }),
            }
        }
    }
}

/// Validates the records in declaration order and builds a table.
///
/// # Errors
///
/// Returns the first [`MappingError`] found.  Checks per mapping run in this
/// order: code range, duplicate code, empty action list, then each action.
pub fn build_table(records: &[MappingRecord]) -> Result<MappingTable, MappingError> {
    let mut builder = MappingTable::builder();

    for (index, record) in records.iter().enumerate() {
        let code = RemoteCode::try_from(record.cec_code)
            .map_err(|_| MappingError::InvalidCode { index, code: record.cec_code })?;

        if builder.contains(code) {
            return Err(TableError::DuplicateCode { index, code }.into());
        }
        if record.actions.is_empty() {
            return Err(TableError::NoActions { index, code }.into());
        }

        let actions = record
            .actions
            .iter()
            .enumerate()
            .map(|(action_index, action)| convert_action(action, index, code, action_index))
            .collect::<Result<Vec<_>, _>>()?;

        builder.push(MappingEntry::new(code, actions))?;
    }

    Ok(builder.build())
}

impl ConfigRecord {
    /// Splits the record into device settings and a validated mapping table.
    ///
    /// # Errors
    ///
    /// See [`build_table`].
    pub fn into_parts(self) -> Result<(DeviceSettings, MappingTable), MappingError> {
        let table = build_table(&self.mappings)?;
        let settings = DeviceSettings {
            adapter: self.adapter,
            name: self.name,
            device_type: self.device_type,
        };
        Ok((settings, table))
    }
}
