//! # Output
//!
//! Plain `name: value` lines, one per secret.

use super::mapping::ResultMapping;
use std::io::{self, Write};

/// Write every entry as `"<name>: <value>"` and flush
///
/// Values are written verbatim; a value containing newlines spans several lines.
pub fn emit<W: Write + ?Sized>(mapping: &ResultMapping, out: &mut W) -> io::Result<usize> {
    for (name, value) in mapping.iter() {
        writeln!(out, "{name}: {value}")?;
    }
    out.flush()?;
    Ok(mapping.len())
}
