// Custom AVIOContext reading from a borrowed ByteSource

use std::os::raw::{c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::slice;

use ffmpeg_next::ffi;

use crate::error::{AvProbeError, AvResult};
use crate::ports::{ByteSource, SeekWhence};

/// AVIOContext whose callbacks forward to a [`ByteSource`].
///
/// Must outlive any container it is attached to.
pub struct LibavIo<'s> {
    ctx: *mut ffi::AVIOContext,
    opaque: *mut &'s mut dyn ByteSource,
}

impl<'s> LibavIo<'s> {
    pub(super) fn new(source: &'s mut dyn ByteSource, buffer_size: usize) -> AvResult<Self> {
        let size = c_int::try_from(buffer_size)
            .map_err(|_| AvProbeError::validation(format!("I/O buffer size {} is too large", buffer_size)))?;

        // SAFETY: plain allocation, checked for null below
        let buffer = unsafe { ffi::av_malloc(buffer_size) } as *mut u8;
        if buffer.is_null() {
            return Err(AvProbeError::allocation("avio buffer"));
        }

        let opaque = Box::into_raw(Box::new(source));

        // SAFETY: buffer was allocated with av_malloc; opaque stays valid until Drop
        let ctx = unsafe {
            ffi::avio_alloc_context(
                buffer,
                size,
                0,
                opaque as *mut c_void,
                Some(read_packet),
                None,
                Some(seek),
            )
        };
        if ctx.is_null() {
            // SAFETY: both were created above and nothing else references them
            unsafe {
                ffi::av_free(buffer as *mut c_void);
                drop(Box::from_raw(opaque));
            }
            return Err(AvProbeError::allocation("avio_alloc_context"));
        }

        Ok(Self { ctx, opaque })
    }

    pub(super) fn as_ptr(&mut self) -> *mut ffi::AVIOContext {
        self.ctx
    }
}

impl Drop for LibavIo<'_> {
    fn drop(&mut self) {
        // SAFETY: the buffer may have been reallocated by libavformat, so it is
        // freed through the context before the context itself
        unsafe {
            if !self.ctx.is_null() {
                ffi::av_freep(&mut (*self.ctx).buffer as *mut *mut u8 as *mut c_void);
                ffi::avio_context_free(&mut self.ctx);
            }
            drop(Box::from_raw(self.opaque));
        }
    }
}

unsafe extern "C" fn read_packet(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int {
    if opaque.is_null() || buf.is_null() || buf_size <= 0 {
        return ffi::AVERROR_EOF;
    }
    let source = &mut *(opaque as *mut &mut dyn ByteSource);
    let buffer = slice::from_raw_parts_mut(buf, buf_size as usize);

    let read = panic::catch_unwind(AssertUnwindSafe(|| source.read(buffer))).unwrap_or(0);
    if read == 0 {
        ffi::AVERROR_EOF
    } else {
        read.min(buf_size as usize) as c_int
    }
}

unsafe extern "C" fn seek(opaque: *mut c_void, offset: i64, whence: c_int) -> i64 {
    if opaque.is_null() {
        return -1;
    }
    let source = &mut *(opaque as *mut &mut dyn ByteSource);

    let whence = if whence & ffi::AVSEEK_SIZE as c_int != 0 {
        SeekWhence::Size
    } else {
        match whence & !(ffi::AVSEEK_FORCE as c_int) {
            0 => SeekWhence::Start,
            1 => SeekWhence::Current,
            2 => SeekWhence::End,
            _ => return -1,
        }
    };

    panic::catch_unwind(AssertUnwindSafe(|| source.seek(offset, whence))).unwrap_or(-1)
}
