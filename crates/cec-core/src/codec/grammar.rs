//! Compact mapping grammar used by the `--mapping` command-line flag.
//!
//! ```text
//! entry   = code "=" action ("," action)*
//! action  = tag ":" keycode
//! tag     = "p" | "d" | "u" | "h"
//! ```
//!
//! | Tag | Meaning                                               |
//! |-----|-------------------------------------------------------|
//! | `p` | press (key down + key up)                             |
//! | `d` | key down                                              |
//! | `u` | key up                                                |
//! | `h` | hold: key down now, key up after every other action   |
//!
//! Hold expansion is a two-pass build.  The first pass emits every primary
//! action in declaration order, with `h` contributing its key down.  The
//! deferred key ups are then appended, last hold first, so nested holds
//! release like a modifier chord: `h:29,h:42,p:30` yields
//! `down 29, down 42, press 30, up 42, up 29`.

use thiserror::Error;

use super::MappingError;
use crate::domain::action::OutputAction;
use crate::domain::event::RemoteCode;
use crate::domain::mapping::{MappingEntry, MappingTable};

/// A malformed token in a single grammar entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("invalid mapping format (expected CODE=TAG:KEYCODE,...): '{0}'")]
    MalformedEntry(String),

    #[error("invalid CEC key code '{0}', must be a non-negative integer")]
    InvalidCode(String),

    #[error("invalid action format (expected TAG:KEYCODE): '{0}'")]
    MalformedAction(String),

    #[error("invalid key code in action '{0}', must be an integer between 0 and 65535")]
    InvalidKeyCode(String),

    #[error("unknown action tag '{0}', must be one of p, d, u, h")]
    UnknownTag(String),
}

/// Parses one grammar entry such as `5=p:30,h:31`.
///
/// # Errors
///
/// Returns a [`GrammarError`] describing the first malformed token.
pub fn parse_entry(input: &str) -> Result<MappingEntry, GrammarError> {
    let trimmed = input.trim();
    let (code_part, actions_part) = trimmed
        .split_once('=')
        .filter(|(_, rest)| !rest.contains('='))
        .ok_or_else(|| GrammarError::MalformedEntry(input.to_string()))?;

    let code: RemoteCode = code_part
        .trim()
        .parse()
        .map_err(|_| GrammarError::InvalidCode(code_part.trim().to_string()))?;

    let mut actions = Vec::new();
    let mut deferred = Vec::new();

    for token in actions_part.split(',') {
        let token = token.trim();
        let (tag, value) = token
            .split_once(':')
            .filter(|(_, value)| !value.contains(':'))
            .ok_or_else(|| GrammarError::MalformedAction(token.to_string()))?;

        let key: u16 = value
            .trim()
            .parse()
            .map_err(|_| GrammarError::InvalidKeyCode(token.to_string()))?;

        match tag.trim() {
            "p" => actions.push(OutputAction::press(key)),
            "d" => actions.push(OutputAction::down(key)),
            "u" => actions.push(OutputAction::up(key)),
            "h" => {
                actions.push(OutputAction::down(key));
                deferred.push(OutputAction::up(key));
            }
            other => return Err(GrammarError::UnknownTag(other.to_string())),
        }
    }

    actions.extend(deferred.into_iter().rev());
    Ok(MappingEntry::new(code, actions))
}

/// Parses every grammar entry and builds a table from them.
///
/// # Errors
///
/// Returns [`MappingError::Grammar`] for a malformed entry and
/// [`MappingError::Table`] for duplicate codes.
pub fn parse_mappings<I, S>(inputs: I) -> Result<MappingTable, MappingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = MappingTable::builder();
    for (index, input) in inputs.into_iter().enumerate() {
        let entry = parse_entry(input.as_ref())
            .map_err(|source| MappingError::Grammar { index, source })?;
        builder.push(entry)?;
    }
    Ok(builder.build())
}
