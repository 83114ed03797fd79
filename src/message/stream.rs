//! Capability-gated byte stream used as message body storage.
//!
//! # Responsibilities
//! - Wrap an in-memory buffer, a file, or a non-seekable pipe
//! - Derive readable/writable/seekable once from the open mode and resource kind
//! - Check the relevant capability before every read, write and seek
//!
//! # Design Decisions
//! - Operations take `&self`; the resource sits behind a mutex so one stream can be
//!   shared (via `Arc`) between message values that carry the same body
//! - `detach` hands the resource out and leaves the stream unusable
//! - Cached size is refreshed after each write

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::message::error::{MessageError, MessageResult};

/// Anything usable as a sequential, non-seekable stream resource.
pub trait Pipe: Read + Write + Send {}

impl<T: Read + Write + Send> Pipe for T {}

/// Underlying handle of a [`Stream`].
pub enum Resource {
    Memory(Cursor<Vec<u8>>),
    File(File),
    Pipe(Box<dyn Pipe>),
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Memory(cursor) => write!(f, "Memory({} bytes)", cursor.get_ref().len()),
            Resource::File(file) => write!(f, "File({file:?})"),
            Resource::Pipe(_) => write!(f, "Pipe"),
        }
    }
}

/// An fopen-style access mode such as `"rb"` or `"w+b"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMode {
    raw: String,
    kind: char,
    plus: bool,
}

impl OpenMode {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_readable(&self) -> bool {
        self.kind == 'r' || self.plus
    }

    pub fn is_writable(&self) -> bool {
        self.kind != 'r' || self.plus
    }

    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable());
        match self.kind {
            'w' => options.write(true).create(true).truncate(true),
            'a' => options.append(true).create(true),
            'x' => options.write(true).create_new(true),
            'c' => options.write(true).create(true),
            _ => options.write(self.plus),
        };
        options
    }
}

impl FromStr for OpenMode {
    type Err = MessageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut chars = raw.chars();
        let kind = match chars.next() {
            Some(c @ ('r' | 'w' | 'a' | 'x' | 'c')) => c,
            _ => return Err(MessageError::Stream(format!("The mode {raw} is not valid."))),
        };
        let rest = chars.as_str();
        if !rest.chars().all(|c| matches!(c, '+' | 'b' | 't')) {
            return Err(MessageError::Stream(format!("The mode {raw} is not valid.")));
        }
        Ok(Self {
            raw: raw.to_string(),
            kind,
            plus: rest.contains('+'),
        })
    }
}

/// Operations a stream supports, fixed when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub readable: bool,
    pub writable: bool,
    pub seekable: bool,
}

#[derive(Debug)]
struct State {
    resource: Option<Resource>,
    size: Option<u64>,
    eof: bool,
}

/// A byte stream with a fixed capability set.
#[derive(Debug)]
pub struct Stream {
    mode: OpenMode,
    capabilities: Capabilities,
    uri: Option<PathBuf>,
    state: Mutex<State>,
}

impl Stream {
    /// Open an empty in-memory stream.
    pub fn temp(mode: &str) -> MessageResult<Self> {
        let mode: OpenMode = mode.parse()?;
        Ok(Self::build(mode, Resource::Memory(Cursor::new(Vec::new())), None, true, Some(0)))
    }

    /// Readable, writable and seekable in-memory stream positioned at the start of `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let size = bytes.len() as u64;
        let mode = OpenMode {
            raw: "r+b".to_string(),
            kind: 'r',
            plus: true,
        };
        Self::build(mode, Resource::Memory(Cursor::new(bytes)), None, true, Some(size))
    }

    /// Open a file on disk.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> MessageResult<Self> {
        let path = path.as_ref();
        let mode: OpenMode = mode.parse()?;
        let file = mode.open_options().open(path).map_err(|e| {
            MessageError::Stream(format!("The {} resource is not valid: {e}", path.display()))
        })?;
        let size = file.metadata().map(|m| m.len()).ok();
        Ok(Self::build(mode, Resource::File(file), Some(path.to_path_buf()), true, size))
    }

    /// Wrap a sequential resource; the stream is never seekable and has no known size.
    pub fn pipe(pipe: impl Pipe + 'static, mode: &str) -> MessageResult<Self> {
        let mode: OpenMode = mode.parse()?;
        Ok(Self::build(mode, Resource::Pipe(Box::new(pipe)), None, false, None))
    }

    fn build(
        mode: OpenMode,
        resource: Resource,
        uri: Option<PathBuf>,
        seekable: bool,
        size: Option<u64>,
    ) -> Self {
        let capabilities = Capabilities {
            readable: mode.is_readable(),
            writable: mode.is_writable(),
            seekable,
        };
        Self {
            mode,
            capabilities,
            uri,
            state: Mutex::new(State {
                resource: Some(resource),
                size,
                eof: false,
            }),
        }
    }

    pub fn mode(&self) -> &OpenMode {
        &self.mode
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_readable(&self) -> bool {
        self.capabilities.readable
    }

    pub fn is_writable(&self) -> bool {
        self.capabilities.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.capabilities.seekable
    }

    /// Filesystem path backing this stream, if any.
    pub fn uri(&self) -> Option<&Path> {
        self.uri.as_deref()
    }

    /// Cached byte count; `None` once detached or for pipes.
    pub fn size(&self) -> Option<u64> {
        self.lock().size
    }

    pub fn eof(&self) -> bool {
        let state = self.lock();
        state.eof || state.resource.is_none()
    }

    pub fn tell(&self) -> MessageResult<u64> {
        let mut state = self.lock();
        match attached(&mut state)? {
            Resource::Memory(cursor) => Ok(cursor.position()),
            Resource::File(file) => file.stream_position().map_err(MessageError::StreamIo),
            Resource::Pipe(_) => Err(MessageError::Stream(
                "The read/write pointer for the stream could not be located.".into(),
            )),
        }
    }

    pub fn seek(&self, pos: SeekFrom) -> MessageResult<u64> {
        if !self.capabilities.seekable {
            return Err(MessageError::Stream("The current stream is not seekable.".into()));
        }
        let mut state = self.lock();
        let offset = match attached(&mut state)? {
            Resource::Memory(cursor) => cursor.seek(pos),
            Resource::File(file) => file.seek(pos),
            Resource::Pipe(_) => {
                return Err(MessageError::Stream("The current stream is not seekable.".into()))
            }
        }
        .map_err(MessageError::StreamIo)?;
        state.eof = false;
        Ok(offset)
    }

    pub fn rewind(&self) -> MessageResult<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Read up to `length` bytes; a short read marks end of stream.
    pub fn read(&self, length: usize) -> MessageResult<Vec<u8>> {
        if !self.capabilities.readable || length == 0 {
            return Err(MessageError::Stream(
                "The current stream is empty or is not readable.".into(),
            ));
        }
        let mut state = self.lock();
        let mut buf = Vec::with_capacity(length.min(64 * 1024));
        let limit = length as u64;
        let read = match attached(&mut state)? {
            Resource::Memory(cursor) => cursor.take(limit).read_to_end(&mut buf),
            Resource::File(file) => file.take(limit).read_to_end(&mut buf),
            Resource::Pipe(pipe) => pipe.take(limit).read_to_end(&mut buf),
        };
        read.map_err(MessageError::StreamIo)?;
        if buf.len() < length {
            state.eof = true;
        }
        Ok(buf)
    }

    /// Everything from the current position to the end.
    pub fn contents(&self) -> MessageResult<Vec<u8>> {
        if !self.capabilities.readable {
            return Err(MessageError::Stream("The current stream is not readable.".into()));
        }
        let mut state = self.lock();
        let mut buf = Vec::new();
        let read = match attached(&mut state)? {
            Resource::Memory(cursor) => cursor.read_to_end(&mut buf),
            Resource::File(file) => file.read_to_end(&mut buf),
            Resource::Pipe(pipe) => pipe.read_to_end(&mut buf),
        };
        read.map_err(MessageError::StreamIo)?;
        state.eof = true;
        Ok(buf)
    }

    pub fn write(&self, data: &[u8]) -> MessageResult<usize> {
        if !self.capabilities.writable {
            return Err(MessageError::Stream("Stream is not writable.".into()));
        }
        let append = self.mode.kind == 'a';
        let mut state = self.lock();
        let size = match attached(&mut state)? {
            Resource::Memory(cursor) => {
                if append {
                    cursor.seek(SeekFrom::End(0)).map_err(MessageError::StreamIo)?;
                }
                cursor.write_all(data).map_err(MessageError::StreamIo)?;
                Some(cursor.get_ref().len() as u64)
            }
            Resource::File(file) => {
                file.write_all(data).map_err(MessageError::StreamIo)?;
                file.metadata().map(|m| m.len()).ok()
            }
            Resource::Pipe(pipe) => {
                pipe.write_all(data).map_err(MessageError::StreamIo)?;
                None
            }
        };
        if size.is_some() {
            state.size = size;
        }
        Ok(data.len())
    }

    /// Rewind and read the whole stream, lossily decoded. Empty when that is not possible.
    pub fn to_string_lossy(&self) -> String {
        if !self.capabilities.seekable || !self.capabilities.readable {
            return String::new();
        }
        self.rewind()
            .and_then(|_| self.contents())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }

    /// Take the resource out; every later operation fails.
    pub fn detach(&self) -> Option<Resource> {
        let mut state = self.lock();
        state.size = None;
        state.resource.take()
    }

    /// Release the resource. Calling it again is a no-op.
    pub fn close(&self) {
        drop(self.detach());
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn attached(state: &mut State) -> MessageResult<&mut Resource> {
    state
        .resource
        .as_mut()
        .ok_or_else(|| MessageError::Stream("The stream has been detached.".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_capabilities() {
        let cases = [
            ("r", true, false),
            ("rb", true, false),
            ("r+", true, true),
            ("w", false, true),
            ("wb", false, true),
            ("w+b", true, true),
            ("a", false, true),
            ("a+", true, true),
            ("x+", true, true),
            ("c", false, true),
        ];
        for (raw, readable, writable) in cases {
            let mode: OpenMode = raw.parse().unwrap();
            assert_eq!(mode.is_readable(), readable, "{raw}");
            assert_eq!(mode.is_writable(), writable, "{raw}");
        }
        assert!("q".parse::<OpenMode>().is_err());
        assert!("rz".parse::<OpenMode>().is_err());
    }

    #[test]
    fn test_capability_enforcement() {
        let read_only = Stream::temp("r").unwrap();
        assert!(matches!(read_only.write(b"x"), Err(MessageError::Stream(_))));

        let write_only = Stream::temp("w").unwrap();
        assert!(matches!(write_only.read(4), Err(MessageError::Stream(_))));
        assert!(write_only.contents().is_err());

        let pipe_read = Stream::pipe(Cursor::new(b"abc".to_vec()), "r").unwrap();
        let pipe_write = Stream::pipe(Cursor::new(Vec::new()), "w").unwrap();
        assert!(pipe_read.seek(SeekFrom::Start(0)).is_err());
        assert!(pipe_write.seek(SeekFrom::Start(0)).is_err());
        assert!(pipe_read.write(b"x").is_err());
        assert_eq!(pipe_read.read(8).unwrap(), b"abc");
    }

    #[test]
    fn test_write_read_and_size() {
        let stream = Stream::temp("w+b").unwrap();
        assert_eq!(stream.size(), Some(0));

        assert_eq!(stream.write(b"hello ").unwrap(), 6);
        stream.write(b"world").unwrap();
        assert_eq!(stream.size(), Some(11));

        stream.rewind().unwrap();
        assert_eq!(stream.read(5).unwrap(), b"hello");
        assert_eq!(stream.tell().unwrap(), 5);
        assert!(!stream.eof());
        assert_eq!(stream.read(100).unwrap(), b" world");
        assert!(stream.eof());
        assert!(stream.read(0).is_err());

        assert_eq!(stream.to_string_lossy(), "hello world");
    }

    #[test]
    fn test_append_mode_writes_at_end() {
        let stream = Stream::temp("a+").unwrap();
        stream.write(b"one").unwrap();
        stream.rewind().unwrap();
        stream.write(b"two").unwrap();
        assert_eq!(stream.to_string_lossy(), "onetwo");
    }

    #[test]
    fn test_detach_and_close() {
        let stream = Stream::from_bytes("payload");
        let resource = stream.detach();
        assert!(matches!(resource, Some(Resource::Memory(_))));
        assert!(stream.detach().is_none());
        assert!(stream.read(1).is_err());
        assert!(stream.tell().is_err());
        assert!(stream.eof());
        assert_eq!(stream.size(), None);

        let other = Stream::from_bytes("x");
        other.close();
        other.close();
        assert!(other.write(b"y").is_err());
    }

    #[test]
    fn test_file_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");

        let stream = Stream::open(&path, "w+").unwrap();
        stream.write(b"on disk").unwrap();
        assert_eq!(stream.size(), Some(7));
        assert_eq!(stream.uri(), Some(path.as_path()));
        assert_eq!(stream.to_string_lossy(), "on disk");

        let reader = Stream::open(&path, "rb").unwrap();
        assert!(!reader.is_writable());
        assert_eq!(reader.contents().unwrap(), b"on disk");

        assert!(Stream::open(dir.path().join("missing.txt"), "r").is_err());
    }
}
