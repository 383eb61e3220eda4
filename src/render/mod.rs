//! Terminal rendering of diff reports
//!
//! The engine produces plain data; everything about presentation lives
//! here. Long output goes through the minus pager when stdout is an
//! interactive terminal.

pub mod terminal;

use derive_new::new;
use minus::Pager;
use std::io::{self, Write};

/// Adapts the minus pager to `std::io::Write`.
///
/// minus accepts content through `push_str` rather than implementing the
/// standard writer traits, so this wrapper lets rendering code target
/// `dyn Write` and stay unaware of whether it is paged.
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl PagerWriter {
    pub fn pager(&self) -> &Pager {
        &self.pager
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(s).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
