//! Uploaded file values.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::message::error::{MessageError, MessageResult};
use crate::message::stream::Stream;

const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Upload outcome reported by the hosting environment.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Ok = 0,
    IniSize = 1,
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    Extension = 8,
}

impl UploadStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(UploadStatus::Ok),
            1 => Some(UploadStatus::IniSize),
            2 => Some(UploadStatus::FormSize),
            3 => Some(UploadStatus::Partial),
            4 => Some(UploadStatus::NoFile),
            6 => Some(UploadStatus::NoTmpDir),
            7 => Some(UploadStatus::CantWrite),
            8 => Some(UploadStatus::Extension),
            _ => None,
        }
    }
}

/// A file received with a request.
///
/// Clones refer to the same upload; once any of them is moved, all are.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    stream: Arc<Stream>,
    size: Option<u64>,
    status: UploadStatus,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    trusted: bool,
    moved: Arc<AtomicBool>,
}

impl UploadedFile {
    /// Only `Ok` and `NoFile` uploads can be represented.
    pub fn new(
        stream: Arc<Stream>,
        size: Option<u64>,
        status: UploadStatus,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> MessageResult<Self> {
        if !matches!(status, UploadStatus::Ok | UploadStatus::NoFile) {
            return Err(MessageError::Upload(format!(
                "The file was not uploaded successfully (code {}).",
                status.code()
            )));
        }
        Ok(Self {
            stream,
            size,
            status,
            client_filename,
            client_media_type,
            trusted: false,
            moved: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag the backing file as a genuine upload artifact written by the host, which
    /// allows `move_to` to relocate it with a rename instead of copying.
    pub fn mark_trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    pub fn stream(&self) -> MessageResult<&Arc<Stream>> {
        if self.status != UploadStatus::Ok {
            return Err(MessageError::Upload("The file was not uploaded successfully.".into()));
        }
        if self.is_moved() {
            return Err(MessageError::Upload("The file has already been moved.".into()));
        }
        Ok(&self.stream)
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    pub fn is_moved(&self) -> bool {
        self.moved.load(Ordering::Acquire)
    }

    /// Relocate the upload to `target`.
    pub fn move_to(&self, target: impl AsRef<Path>) -> MessageResult<()> {
        let target = target.as_ref();
        let stream = self.stream()?;

        if target.as_os_str().is_empty() {
            return Err(MessageError::Upload("Target path must not be empty.".into()));
        }
        let directory = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let writable = fs::metadata(directory)
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false);
        if !writable {
            return Err(MessageError::Upload(format!(
                "The target directory is not writable: {}",
                target.display()
            )));
        }

        // Claim the move before touching the filesystem; release it again on failure.
        if self
            .moved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(MessageError::Upload("The file has already been moved.".into()));
        }
        if let Err(e) = self.relocate(stream, target) {
            self.moved.store(false, Ordering::Release);
            return Err(e);
        }
        Ok(())
    }

    fn relocate(&self, stream: &Stream, target: &Path) -> MessageResult<()> {
        match stream.uri() {
            Some(source) if self.trusted => {
                fs::rename(source, target).map_err(MessageError::UploadIo)?;
                tracing::debug!(from = %source.display(), to = %target.display(), "Upload relocated");
            }
            _ => {
                copy_stream(stream, target)?;
                tracing::debug!(to = %target.display(), "Upload copied");
            }
        }
        Ok(())
    }
}

fn copy_stream(stream: &Stream, target: &Path) -> MessageResult<()> {
    let upload_err = |e: MessageError| MessageError::Upload(e.to_string());

    let mut destination = File::create(target).map_err(MessageError::UploadIo)?;
    if stream.is_seekable() {
        stream.rewind().map_err(upload_err)?;
    }
    while !stream.eof() {
        let chunk = stream.read(COPY_CHUNK_SIZE).map_err(upload_err)?;
        if chunk.is_empty() {
            break;
        }
        destination.write_all(&chunk).map_err(MessageError::UploadIo)?;
    }
    destination.flush().map_err(MessageError::UploadIo)
}
