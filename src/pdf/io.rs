//! Where PDFs are read from and written to
//!
//! Inputs are resolved once at the API boundary: a file is read fully into
//! memory before any work starts, so a failed operation never leaves a
//! half-written output behind. File outputs are written to a temporary file
//! in the destination directory and renamed over the destination.

use std::io::Write;
use std::path::{Path, PathBuf};
use lopdf::Document;
use tempfile::NamedTempFile;
use crate::error::{Error, Result, SourceRole};

const MEMORY_ORIGIN: &str = "<memory>";

/// A PDF to read: a file on disk or bytes already in memory
#[derive(Debug, Clone)]
pub enum PdfSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

impl PdfSource {
    /// Human-readable origin used in error messages
    pub fn origin(&self) -> String {
        match self {
            PdfSource::File(path) => path.display().to_string(),
            PdfSource::Memory(_) => MEMORY_ORIGIN.to_string(),
        }
    }

    /// Load the document, reporting failures against `role`
    pub fn load(&self, role: SourceRole) -> Result<Document> {
        match self {
            PdfSource::File(path) => {
                let bytes = read_file(path, role)?;
                parse_document(&bytes, role, &self.origin())
            }
            PdfSource::Memory(bytes) => parse_document(bytes, role, MEMORY_ORIGIN),
        }
    }

    /// Load the document and require at least one page
    pub fn load_with_pages(&self, role: SourceRole) -> Result<Document> {
        let doc = self.load(role)?;
        require_pages(doc, role, &self.origin())
    }
}

impl From<PathBuf> for PdfSource {
    fn from(path: PathBuf) -> Self {
        PdfSource::File(path)
    }
}

impl From<&Path> for PdfSource {
    fn from(path: &Path) -> Self {
        PdfSource::File(path.to_path_buf())
    }
}

impl From<&str> for PdfSource {
    fn from(path: &str) -> Self {
        PdfSource::File(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for PdfSource {
    fn from(bytes: Vec<u8>) -> Self {
        PdfSource::Memory(bytes)
    }
}

impl From<&[u8]> for PdfSource {
    fn from(bytes: &[u8]) -> Self {
        PdfSource::Memory(bytes.to_vec())
    }
}

/// Where a finished PDF goes: a file path or any writer
pub enum PdfSink<'a> {
    File(PathBuf),
    Writer(&'a mut dyn Write),
}

impl PdfSink<'_> {
    /// Deliver the complete PDF bytes
    pub fn write_pdf(self, bytes: &[u8]) -> Result<()> {
        match self {
            PdfSink::File(path) => write_atomically(&path, bytes),
            PdfSink::Writer(writer) => {
                writer.write_all(bytes)?;
                writer.flush()?;
                Ok(())
            }
        }
    }
}

impl From<PathBuf> for PdfSink<'_> {
    fn from(path: PathBuf) -> Self {
        PdfSink::File(path)
    }
}

impl From<&Path> for PdfSink<'_> {
    fn from(path: &Path) -> Self {
        PdfSink::File(path.to_path_buf())
    }
}

impl From<&str> for PdfSink<'_> {
    fn from(path: &str) -> Self {
        PdfSink::File(PathBuf::from(path))
    }
}

impl<'a, W: Write> From<&'a mut W> for PdfSink<'a> {
    fn from(writer: &'a mut W) -> Self {
        PdfSink::Writer(writer)
    }
}

/// A PDF that is read, stamped and overwritten in place
pub enum StampTarget<'a> {
    File(PathBuf),
    Buffer(&'a mut Vec<u8>),
}

impl StampTarget<'_> {
    pub fn origin(&self) -> String {
        match self {
            StampTarget::File(path) => path.display().to_string(),
            StampTarget::Buffer(_) => MEMORY_ORIGIN.to_string(),
        }
    }

    /// Load the current document; it must have at least one page
    pub fn load(&self) -> Result<Document> {
        let role = SourceRole::Target;
        let doc = match self {
            StampTarget::File(path) => {
                let bytes = read_file(path, role)?;
                parse_document(&bytes, role, &self.origin())?
            }
            StampTarget::Buffer(bytes) => parse_document(bytes, role, MEMORY_ORIGIN)?,
        };
        require_pages(doc, role, &self.origin())
    }

    /// Replace the target's content with `bytes`
    pub fn replace(self, bytes: Vec<u8>) -> Result<()> {
        match self {
            StampTarget::File(path) => write_atomically(&path, &bytes),
            StampTarget::Buffer(buffer) => {
                *buffer = bytes;
                Ok(())
            }
        }
    }
}

impl From<PathBuf> for StampTarget<'_> {
    fn from(path: PathBuf) -> Self {
        StampTarget::File(path)
    }
}

impl From<&Path> for StampTarget<'_> {
    fn from(path: &Path) -> Self {
        StampTarget::File(path.to_path_buf())
    }
}

impl From<&str> for StampTarget<'_> {
    fn from(path: &str) -> Self {
        StampTarget::File(PathBuf::from(path))
    }
}

impl<'a> From<&'a mut Vec<u8>> for StampTarget<'a> {
    fn from(buffer: &'a mut Vec<u8>) -> Self {
        StampTarget::Buffer(buffer)
    }
}

fn read_file(path: &Path, role: SourceRole) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| Error::NotFound {
        role,
        origin: path.display().to_string(),
        source,
    })
}

fn parse_document(bytes: &[u8], role: SourceRole, origin: &str) -> Result<Document> {
    Document::load_mem(bytes).map_err(|source| Error::Malformed {
        role,
        origin: origin.to_string(),
        source,
    })
}

fn require_pages(doc: Document, role: SourceRole, origin: &str) -> Result<Document> {
    if doc.get_pages().is_empty() {
        return Err(Error::NoPages {
            role,
            origin: origin.to_string(),
        });
    }
    Ok(doc)
}

/// Compress and serialize a document
pub fn document_bytes(doc: &mut Document) -> Result<Vec<u8>> {
    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Write `bytes` to `path` through a temporary file in the same directory
///
/// A replaced file keeps its permissions; a new file gets the permissions
/// any newly created file would get.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = std::fs::metadata(path).ok().map(|metadata| metadata.permissions());

    let mut temp = new_temp_file(dir)?;
    if let Some(permissions) = existing {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Temp file created with the default file mode, so the umask applies
#[cfg(unix)]
fn new_temp_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn new_temp_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}
