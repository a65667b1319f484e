//! CSV archiving functionality
//!
//! An [`Archiver`] writes serialisable records as rows of a CSV file inside
//! the session's archive directory. Records are flattened by `csv`, so a
//! record struct should only contain scalar fields.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::fs::File;
use std::path::{Path, PathBuf};
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver {
    path: PathBuf,
    writer: Writer<File>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file {0:?}: {1}")]
    CannotCreate(PathBuf, std::io::Error),

    #[error("Cannot write a record to {0:?}: {1}")]
    CannotWrite(PathBuf, csv::Error),

    #[error("Cannot flush the archive {0:?}: {1}")]
    CannotFlush(PathBuf, std::io::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        Self::create(session.arch_root.join(path))
    }

    /// Create a new archiver writing to the given file, truncating any
    /// existing contents.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();

        let file = File::create(&path)
            .map_err(|e| ArchiveError::CannotCreate(path.clone(), e))?;

        let writer = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self { path, writer })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        self.writer
            .serialize(record)
            .map_err(|e| ArchiveError::CannotWrite(self.path.clone(), e))
    }

    /// Write a raw row of fields, used for headers and records whose length
    /// is only known at runtime.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<(), ArchiveError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(record)
            .map_err(|e| ArchiveError::CannotWrite(self.path.clone(), e))
    }

    /// Flush all pending records to disk.
    pub fn flush(&mut self) -> Result<(), ArchiveError> {
        self.writer
            .flush()
            .map_err(|e| ArchiveError::CannotFlush(self.path.clone(), e))
    }

    /// Path of the underlying archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
