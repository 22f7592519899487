//! Struct archiving functionality
//!
//! Archives are CSV files written under the session's `arch` directory, one
//! record per processing cycle. To add archiving to a module implement the
//! `Archived` trait and give the module an `Archiver` member.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// A default-constructed archiver has no backing file and silently discards
/// records, which allows modules to run without a session (unit tests).
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a CSV record.
///
/// The implementing struct shall have an `Archiver` member which is set up in
/// the struct's `init` function.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver writing to the given path relative to the
    /// session's archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session,
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut arch_path = session.arch_root.clone();
        arch_path.push(path);

        // Create the parent directory and the file itself if needed
        if let Some(parent) = arch_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        File::create(&arch_path)?;

        // Open the file in append mode
        let file = OpenOptions::new().append(true).open(arch_path)?;

        let writer = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self {
            writer: Some(writer),
        })
    }

    /// Serialise a record into the archive.
    ///
    /// Records must be flat structs, the CSV writer cannot handle nesting.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref mut writer) = self.writer {
            writer.serialize(record)?;
            writer.flush()?;
        }

        Ok(())
    }
}
