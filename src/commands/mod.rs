/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `account`: login, signup, logout, password reset and `whoami`
- `issues`: list, show, create, update and delete issues
- `dashboard`: the summary snapshot

Handlers are thin: they convert arguments, call the auth service or the
issue service, and render the result as a table or as JSON.
*/

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::error::{IssueDeskError, Result};
use crate::issues::Badge;

pub mod account;
pub mod dashboard;
pub mod issues;

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns `IssueDeskError::Unknown` if serialization fails
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| IssueDeskError::Unknown(format!("Failed to encode output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Parse a `#rgb` or `#rrggbb` color into its components.
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() {
        return None;
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Render `text` in `hex`, falling back to plain text for a bad color.
pub(crate) fn paint(text: &str, hex: &str) -> ColoredString {
    match hex_rgb(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

/// Render a badge label in its color.
pub(crate) fn paint_badge(badge: &Badge) -> ColoredString {
    paint(badge.label, badge.color).bold()
}

/// Resolve a secret given as a flag or through the environment.
pub(crate) fn require_secret(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(secret) if !secret.is_empty() => Ok(secret),
        _ => Err(IssueDeskError::Validation(format!(
            "{} is required (pass it as a flag or set ISSUEDESK_PASSWORD)",
            what
        ))),
    }
}
