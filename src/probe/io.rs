//! Caller streams exposed to the driver as [`ByteSource`]s.
//!
//! The driver calls these synchronously while it opens and scans the input.
//! I/O errors never escape: a failed read reports 0 bytes and a failed seek
//! reports -1. The caller's stream is only borrowed and is never closed here.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use tracing::debug;

use crate::ports::{ByteSource, SeekWhence};

/// Default size of the driver-side read buffer
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// A readable, seekable caller stream
pub struct SeekableSource<'r, R> {
    inner: &'r mut R,
}

impl<'r, R: Read + Seek> SeekableSource<'r, R> {
    pub fn new(inner: &'r mut R) -> Self {
        Self { inner }
    }

    /// Total length, restoring the current position afterwards
    fn length(&mut self) -> io::Result<u64> {
        let current = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        if end != current {
            self.inner.seek(SeekFrom::Start(current))?;
        }
        Ok(end)
    }

    fn try_seek(&mut self, offset: i64, whence: SeekWhence) -> io::Result<u64> {
        match whence {
            SeekWhence::Size => self.length(),
            SeekWhence::Start => {
                let offset = u64::try_from(offset)
                    .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "negative absolute offset"))?;
                self.inner.seek(SeekFrom::Start(offset))
            }
            SeekWhence::Current => self.inner.seek(SeekFrom::Current(offset)),
            SeekWhence::End => self.inner.seek(SeekFrom::End(offset)),
        }
    }
}

impl<R: Read + Seek> ByteSource for SeekableSource<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        read_swallowing(self.inner, buf)
    }

    fn seek(&mut self, offset: i64, whence: SeekWhence) -> i64 {
        match self.try_seek(offset, whence) {
            Ok(position) => i64::try_from(position).unwrap_or(-1),
            Err(e) => {
                debug!(error = %e, offset, ?whence, "seek on caller stream failed");
                -1
            }
        }
    }
}

/// A read-only caller stream such as a pipe; every seek fails
pub struct ForwardOnlySource<'r, R> {
    inner: &'r mut R,
}

impl<'r, R: Read> ForwardOnlySource<'r, R> {
    pub fn new(inner: &'r mut R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ForwardOnlySource<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        read_swallowing(self.inner, buf)
    }

    fn seek(&mut self, _offset: i64, _whence: SeekWhence) -> i64 {
        -1
    }
}

fn read_swallowing<R: Read>(reader: &mut R, buf: &mut [u8]) -> usize {
    loop {
        match reader.read(buf) {
            Ok(read) => return read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "read from caller stream failed");
                return 0;
            }
        }
    }
}
