//! The action codec: turns mapping declarations into a [`MappingTable`].
//!
//! Two input forms are accepted:
//!
//! - **`grammar`** – the compact command-line form
//!   `CODE=tag:keycode(,tag:keycode)*`, e.g. `5=p:30,h:31`.
//! - **`records`** – the structured form read from a YAML or TOML config
//!   file, which can also express pointer actions.
//!
//! Both forms validate eagerly and fail on the first problem; a partially
//! built table is never returned.
//!
//! [`MappingTable`]: crate::domain::mapping::MappingTable

use thiserror::Error;

use crate::domain::event::RemoteCode;
use crate::domain::mapping::TableError;

pub mod grammar;
pub mod records;

pub use grammar::{parse_entry, parse_mappings, GrammarError};
pub use records::{ActionRecord, Click, ConfigRecord, KeyboardRecord, MappingRecord, MouseRecord};

/// Configuration error raised while building a mapping table.
///
/// `index` is the zero-based position of the mapping declaration and
/// `action_index` the position of the action within it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapping at index {index}: {source}")]
    Grammar {
        index: usize,
        #[source]
        source: GrammarError,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("invalid CEC code {code} at index {index}, must be a non-negative integer")]
    InvalidCode { index: usize, code: i64 },

    #[error("both keyboard and mouse actions defined for CEC key code {code} at index {index}, action index {action_index}")]
    AmbiguousAction {
        index: usize,
        code: RemoteCode,
        action_index: usize,
    },

    #[error("no keyboard or mouse actions defined for CEC key code {code} at index {index}, action index {action_index}")]
    EmptyAction {
        index: usize,
        code: RemoteCode,
        action_index: usize,
    },

    #[error("no mouse actions defined for CEC key code {code} at index {index}, action index {action_index}")]
    NoPointerDirective {
        index: usize,
        code: RemoteCode,
        action_index: usize,
    },

    #[error("multiple mouse actions defined for CEC key code {code} at index {index}, action index {action_index}: {directives}")]
    MultiplePointerDirectives {
        index: usize,
        code: RemoteCode,
        action_index: usize,
        directives: String,
    },

    #[error("invalid keyboard action type '{phase}' for CEC key code {code} at index {index}, action index {action_index}")]
    InvalidKeyPhase {
        index: usize,
        code: RemoteCode,
        action_index: usize,
        phase: String,
    },
}
