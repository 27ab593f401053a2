use std::io;

/// A byte stream from the receiver with a short read timeout.
///
/// Implementations must return `Ok(0)` when nothing arrived within the timeout,
/// errors are reserved for a lost or broken connection.
pub trait ByteSource {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Drops data the receiver sent while nobody was listening.
    fn discard_buffered(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_bytes(buf)
    }

    fn discard_buffered(&mut self) -> io::Result<()> {
        (**self).discard_buffered()
    }
}

/// Opens the receiver connection. Called at startup and again whenever a
/// capture is requested while no connection is held.
pub trait PortProvider {
    type Port: ByteSource;

    fn acquire(&mut self) -> io::Result<Self::Port>;
}

/// Feeds any reader, such as a recorded NMEA capture, in chunks of at most
/// `chunk` bytes.
pub struct ReaderSource<R> {
    inner: R,
    chunk: usize,
}

impl<R: io::Read> ReaderSource<R> {
    pub fn new(inner: R, chunk: usize) -> Self {
        Self {
            inner,
            chunk: chunk.max(1),
        }
    }
}

impl<R: io::Read> ByteSource for ReaderSource<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.chunk);
        match self.inner.read(&mut buf[..len]) {
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_source_chunks() {
        let mut src = ReaderSource::new(&b"$GNRMC,1"[..], 3);
        let mut buf = [0u8; 16];
        assert_eq!(src.read_bytes(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"$GN");
        assert_eq!(src.read_bytes(&mut buf).unwrap(), 3);
        assert_eq!(src.read_bytes(&mut buf).unwrap(), 2);
        assert_eq!(src.read_bytes(&mut buf).unwrap(), 0);
    }
}
