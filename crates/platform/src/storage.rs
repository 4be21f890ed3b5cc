//! Storage abstraction for removable media
//!
//! The runtime only ever reads: open, read, seek, eof, close. No writes,
//! no directory listing.

/// File system access
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;
    /// File type
    type File: File<Error = Self::Error>;

    /// Open file for reading
    fn open(&mut self, path: &str) -> Result<Self::File, Self::Error>;

    /// Release a file handle
    fn close(&mut self, file: Self::File);
}

/// Sequential byte source with seeking
pub trait File {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read from current position, returning 0 at end of file
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Seek to absolute position
    fn seek(&mut self, pos: u64) -> Result<u64, Self::Error>;

    /// Current read position
    fn position(&self) -> u64;

    /// True once the read position has reached the end
    fn eof(&self) -> bool;
}
