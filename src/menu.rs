// src/menu.rs

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::warn;

use crate::profile::FALLBACK_SELECTION;

/// Outcome of reading the user's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(String),
    /// Input unusable; the fallback profile was selected.
    Fallback(String),
}

impl Selection {
    pub fn name(&self) -> &str {
        match self {
            Selection::Chosen(n) | Selection::Fallback(n) => n,
        }
    }
}

/// Map one line of input to an option. Only `1..=options.len()` is accepted.
pub fn parse_choice(input: &str, options: &[&str]) -> Selection {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Selection::Chosen(options[n - 1].to_string()),
        _ => {
            warn!(input = input.trim(), "invalid menu choice");
            Selection::Fallback(FALLBACK_SELECTION.to_string())
        }
    }
}

/// Route a `--select` value: a number is a menu index (out of range falls
/// back), anything else is taken as a profile name. `None` means prompt.
pub fn select(raw: Option<&str>, options: &[&str]) -> Option<Selection> {
    let raw = raw?.trim();
    if raw.parse::<usize>().is_ok() {
        Some(parse_choice(raw, options))
    } else {
        Some(Selection::Chosen(raw.to_string()))
    }
}

/// Print the numbered options to `out`, read one line from `input`.
/// EOF and undecodable bytes count as invalid input.
pub fn prompt<R: BufRead, W: Write>(options: &[&str], input: &mut R, out: &mut W) -> Result<Selection> {
    writeln!(out, "Available options:")?;
    for (i, name) in options.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, name)?;
    }
    write!(out, "\nChoose the number of the country/component to analyse: ")?;
    out.flush()?;

    let mut buf = Vec::new();
    input
        .read_until(b'\n', &mut buf)
        .context("reading menu choice")?;
    let line = String::from_utf8_lossy(&buf);

    let sel = parse_choice(&line, options);
    if let Selection::Fallback(name) = &sel {
        writeln!(out, "Invalid choice. Selecting {} by default.", name)?;
    }
    Ok(sel)
}
