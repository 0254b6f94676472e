//! Log sink that also shows every record on the terminal.

use std::io::{self, Write};

/// Writes to `inner` and copies whatever was accepted to `mirror`
#[derive(Debug)]
pub struct Echo<W, M> {
    inner: W,
    mirror: M,
}

impl<W: Write, M: Write> Echo<W, M> {
    /// Wrap `inner`, mirroring into `mirror`
    pub fn new(inner: W, mirror: M) -> Self {
        Self { inner, mirror }
    }
}

impl<W: Write, M: Write> Write for Echo<W, M> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        // Mirror errors never fail the log write.
        let _ = self.mirror.write_all(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.mirror.flush();
        self.inner.flush()
    }
}
