//! Reader helpers: guarded exact reads and scoped stream repositioning.

use std::io;
use std::io::Read as _;
use std::io::{Seek, SeekFrom};
use std::ops::{Deref, DerefMut};

/// Adds `read_exact_vec`
pub(crate) trait ReadExt {
    fn read_exact_vec(&mut self, vec: &mut Vec<u8>, len: usize) -> io::Result<()>;
}

impl<R: io::Read> ReadExt for R {
    fn read_exact_vec(&mut self, vec: &mut Vec<u8>, len: usize) -> io::Result<()> {
        let initial_len = vec.len();
        vec.try_reserve(len)?;
        match self.take(len as u64).read_to_end(vec) {
            Ok(read) if read == len => Ok(()),
            fail => {
                vec.truncate(initial_len);
                Err(fail.err().unwrap_or(io::ErrorKind::UnexpectedEof.into()))
            }
        }
    }
}

/// Allocate a `Vec` with the given capacity, returning an error instead of
/// aborting on allocation failure. Header fields are attacker controlled, so
/// large buffer sizes must never abort the process.
pub(crate) fn vec_try_with_capacity<T>(
    capacity: usize,
) -> Result<Vec<T>, std::collections::TryReserveError> {
    let mut vec = Vec::new();
    vec.try_reserve(capacity)?;
    Ok(vec)
}

/// Scoped mark/reset over a seekable reader.
///
/// Records the stream position on construction and seeks back to it when
/// dropped, on every exit path including early returns and propagated IO
/// faults. This lets a probe read ahead without corrupting the position for
/// the next probe over the same stream.
pub(crate) struct StreamGuard<'a, R: Seek> {
    inner: &'a mut R,
    mark: u64,
}

impl<'a, R: Seek> StreamGuard<'a, R> {
    pub(crate) fn mark(inner: &'a mut R) -> io::Result<Self> {
        let mark = inner.stream_position()?;
        Ok(Self { inner, mark })
    }
}

impl<R: Seek> Drop for StreamGuard<'_, R> {
    fn drop(&mut self) {
        // Nothing useful can be done about a failing restore seek in drop.
        let _ = self.inner.seek(SeekFrom::Start(self.mark));
    }
}

impl<R: Seek> Deref for StreamGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.inner
    }
}

impl<R: Seek> DerefMut for StreamGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn read_exact_vec_truncates_on_eof() {
        let mut r = Cursor::new([1u8, 2, 3]);
        let mut vec = vec![9u8];
        let err = r.read_exact_vec(&mut vec, 4).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(vec, [9]);
    }

    #[test]
    fn guard_restores_position_on_drop() {
        let mut r = Cursor::new([0u8; 8]);
        r.set_position(3);
        {
            let mut guard = StreamGuard::mark(&mut r).unwrap();
            let mut byte = [0u8; 2];
            guard.read_exact(&mut byte).unwrap();
            assert_eq!(guard.stream_position().unwrap(), 5);
        }
        assert_eq!(r.position(), 3);
    }
}
