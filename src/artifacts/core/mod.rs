//! Output plumbing shared by the commands
//!
//! Commands write into a `Box<dyn Write>`; when paging is on that writer is
//! a [`PagerWriter`] feeding a `minus` pager that is shown once the command
//! finishes.

use derive_new::new;
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::{self, Write};

/// `Write` adapter for the minus pager
///
/// The pager only accepts `&str`, so bytes are decoded as UTF-8. A multi-byte
/// character split across two `write` calls is held back until it completes.
///
/// ## Usage
///
/// ```ignore
/// let pager = Pager::new();
/// let mut writer = PagerWriter::new(pager.clone());
/// writeln!(writer, "* | abc1234 Some commit")?;
/// show_pager(pager)?;
/// ```
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
    #[new(default)]
    pending: Vec<u8>,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        let valid_up_to = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            // `error_len() == None` means the input ended mid-character.
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                self.pending.clear();
                return Err(io::Error::new(io::ErrorKind::InvalidData, e));
            }
        };

        let tail = self.pending.split_off(valid_up_to);
        let text = String::from_utf8(std::mem::replace(&mut self.pending, tail))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(text).map_err(io::Error::other)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Whether output should go through the pager
pub fn should_page(disabled: bool) -> bool {
    !disabled && io::stdout().is_terminal()
}

/// Block until the user quits the pager
pub fn show_pager(pager: Pager) -> anyhow::Result<()> {
    minus::page_all(pager)?;
    Ok(())
}
