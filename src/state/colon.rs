//! Colon commands.
//!
//! A command line is a command name followed by arguments separated by whitespace. The
//! name may be abbreviated to any prefix that picks out a single command. Numeric
//! arguments are expressions (see [`crate::expr`]) where `$` is the current effective
//! address.
//!
//! | Command | Arguments | Effect |
//! |---|---|---|
//! | `beep` | | ring the bell |
//! | `goto` | `expr` (hex) | jump to an effective address |
//! | `patch` | `hex [size]` (hex) | overwrite `size` bytes at the offset with `hex`, repeated |
//! | `print` | `expr` (hex) | show the value in hex and decimal |
//! | `set` | `name=expr ...` | change a variable; no arguments lists them |
//! | `write` | `file size` (hex) | copy `size` bytes at the offset into `file` |
//!
//! State changes happen here. File I/O is returned as a [`ColonEffect`] for the caller to
//! carry out against the open source.

use crate::config::loader::parse_flag;
use crate::expr::{evaluate, EvalContext};
use crate::model::{CommandError, Pattern};
use crate::state::app_state::AppState;
use crate::state::navigation::MoveTag;
use crate::state::view_config::{ViewConfig, MAX_COLUMNS};
use std::path::PathBuf;

/// Command names, sorted.
pub const COMMANDS: [&str; 6] = ["beep", "goto", "patch", "print", "set", "write"];

/// Work left for the caller after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColonEffect {
    /// Nothing further.
    None,
    /// Ring the terminal bell.
    Beep,
    /// Copy `len` bytes at `offset` into a new file at `path`.
    Export {
        /// Destination file.
        path: PathBuf,
        /// First byte to copy.
        offset: u64,
        /// Bytes to copy.
        len: u64,
    },
    /// Overwrite `len` bytes at `offset` with `data`, repeated.
    Patch {
        /// First byte to overwrite.
        offset: u64,
        /// Bytes to overwrite.
        len: u64,
        /// Fill pattern.
        data: Pattern,
    },
}

/// Find the command `name` abbreviates.
///
/// # Errors
///
/// [`CommandError::Unknown`] if nothing matches, [`CommandError::Ambiguous`] if several do.
pub fn resolve(name: &str) -> Result<&'static str, CommandError> {
    let matches: Vec<&'static str> = COMMANDS
        .iter()
        .copied()
        .filter(|c| c.starts_with(name))
        .collect();
    match matches.as_slice() {
        [] => Err(CommandError::Unknown(name.to_string())),
        [only] => Ok(*only),
        many => Err(CommandError::Ambiguous {
            name: name.to_string(),
            candidates: many.join(", "),
        }),
    }
}

/// Run one command line against `state`.
///
/// A blank line does nothing. On error the state is unchanged.
///
/// # Errors
///
/// Returns [`CommandError`] for unknown commands, bad arguments, failed expressions,
/// out-of-range offsets, and writes while writing is disabled.
pub fn run_command(state: &mut AppState, line: &str) -> Result<ColonEffect, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(ColonEffect::None);
    };
    let args: Vec<&str> = words.collect();

    match resolve(name)? {
        "beep" => Ok(ColonEffect::Beep),
        "goto" => goto(state, &args),
        "patch" => patch(state, &args),
        "print" => print(state, &args),
        "set" => set(state, &args),
        "write" => write(state, &args),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn one_arg<'a>(command: &'static str, args: &[&'a str]) -> Result<&'a str, CommandError> {
    match args {
        [arg] => Ok(*arg),
        [] => Err(CommandError::InvalidArguments {
            command,
            reason: "need one argument".to_string(),
        }),
        _ => Err(CommandError::InvalidArguments {
            command,
            reason: format!("need one argument, got {}", args.len()),
        }),
    }
}

fn eval(state: &AppState, text: &str, radix: u32) -> Result<i64, CommandError> {
    Ok(evaluate(text, &EvalContext::new(radix, state.here()))?)
}

fn eval_size(state: &AppState, command: &'static str, text: &str) -> Result<u64, CommandError> {
    let value = eval(state, text, 16)?;
    u64::try_from(value).map_err(|_| CommandError::InvalidArguments {
        command,
        reason: format!("negative size {value}"),
    })
}

fn goto(state: &mut AppState, args: &[&str]) -> Result<ColonEffect, CommandError> {
    let address = eval(state, one_arg("goto", args)?, 16)?;
    let offset = state.view.offset_for_address(address, state.file_size())?;
    state.nav.jump(offset, MoveTag::Goto)?;
    Ok(ColonEffect::None)
}

/// `0x1f (31)`; negative values keep their sign.
pub fn format_value(value: i64) -> String {
    if value < 0 {
        format!("-0x{:x} ({value})", value.unsigned_abs())
    } else {
        format!("0x{value:x} ({value})")
    }
}

fn print(state: &mut AppState, args: &[&str]) -> Result<ColonEffect, CommandError> {
    let value = eval(state, one_arg("print", args)?, 16)?;
    state.set_message(format_value(value));
    Ok(ColonEffect::None)
}

/// Variables `set` understands, with the radix their values default to.
const VARIABLES: [(&str, u32); 6] = [
    ("cols", 10),
    ("base", 16),
    ("baseMult", 16),
    ("pageSize", 10),
    ("allowWrite", 0),
    ("dedup", 0),
];

fn set(state: &mut AppState, args: &[&str]) -> Result<ColonEffect, CommandError> {
    if args.is_empty() {
        state.set_message(describe_variables(&state.view));
        return Ok(ColonEffect::None);
    }

    let mut view = state.view.clone();
    for arg in args {
        let Some((name, value)) = arg.split_once('=') else {
            return Err(CommandError::InvalidArguments {
                command: "set",
                reason: format!("expected name=value, got {arg:?}"),
            });
        };
        set_variable(state, &mut view, name.trim(), value.trim())?;
    }
    state.view = view;
    state.sync_skips();
    Ok(ColonEffect::None)
}

fn set_variable(
    state: &AppState,
    view: &mut ViewConfig,
    name: &str,
    value: &str,
) -> Result<(), CommandError> {
    let Some((canonical, radix)) = VARIABLES
        .iter()
        .copied()
        .find(|(v, _)| v.eq_ignore_ascii_case(name))
    else {
        return Err(CommandError::UnknownVariable(name.to_string()));
    };
    let invalid = || CommandError::InvalidValue {
        name: canonical.to_string(),
        value: value.to_string(),
    };

    match canonical {
        "allowWrite" => view.allow_write = parse_flag(value).ok_or_else(invalid)?,
        "dedup" => view.dedup = parse_flag(value).ok_or_else(invalid)?,
        _ => {
            let number = eval(state, value, radix)?;
            match canonical {
                "cols" => {
                    view.columns = u64::try_from(number)
                        .ok()
                        .filter(|&cols| cols <= MAX_COLUMNS)
                        .ok_or_else(invalid)?;
                }
                "base" => view.base = number,
                "baseMult" if number == 0 => return Err(invalid()),
                "baseMult" => view.base_mult = number,
                "pageSize" => view.page_size = u64::try_from(number).map_err(|_| invalid())?,
                _ => return Err(CommandError::UnknownVariable(name.to_string())),
            }
        }
    }
    Ok(())
}

/// One-line listing of every `set` variable.
pub fn describe_variables(view: &ViewConfig) -> String {
    format!(
        "cols={} base={:#x} baseMult={:#x} pageSize={} allowWrite={} dedup={}",
        view.columns, view.base, view.base_mult, view.page_size, view.allow_write, view.dedup
    )
}

fn write(state: &mut AppState, args: &[&str]) -> Result<ColonEffect, CommandError> {
    let [file, size] = args else {
        return Err(CommandError::InvalidArguments {
            command: "write",
            reason: format!("need a file name and a size, got {} arguments", args.len()),
        });
    };
    let len = eval_size(state, "write", size)?;
    if len == 0 {
        return Err(CommandError::InvalidArguments {
            command: "write",
            reason: "size must be positive".to_string(),
        });
    }
    Ok(ColonEffect::Export {
        path: PathBuf::from(file),
        offset: state.offset(),
        len,
    })
}

fn patch(state: &mut AppState, args: &[&str]) -> Result<ColonEffect, CommandError> {
    let (hex, size) = match args {
        [hex] => (*hex, None),
        [hex, size] => (*hex, Some(*size)),
        _ => {
            return Err(CommandError::InvalidArguments {
                command: "patch",
                reason: format!("need data and an optional size, got {} arguments", args.len()),
            })
        }
    };
    if !state.view.allow_write {
        return Err(CommandError::WriteDisabled);
    }
    let data = Pattern::from_hex(hex)?;
    let len = match size {
        Some(size) => eval_size(state, "patch", size)?,
        None => data.len() as u64,
    };
    let offset = state.offset();
    if len == 0 || offset.checked_add(len).is_none_or(|end| end > state.file_size()) {
        return Err(CommandError::InvalidArguments {
            command: "patch",
            reason: format!("{len:#x} bytes at {offset:#x} do not fit in the file"),
        });
    }
    Ok(ColonEffect::Patch { offset, len, data })
}

#[cfg(test)]
#[path = "colon_tests.rs"]
mod tests;
