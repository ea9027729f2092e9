//! Append-only output sinks for retrieved records.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::entrez::SummaryRecord;

/// Column order of the metadata CSV, written once at sink creation.
pub const METADATA_HEADER: [&str; 6] = [
    "Accession",
    "TaxonomyId",
    "Title",
    "Organism",
    "Length",
    "UpdateDate",
];

/// Append-only destination for one kind of retrieved record. A sink is
/// exclusively owned by a single retriever for its lifetime.
pub trait RecordSink<R> {
    fn append(&mut self, record: &R) -> io::Result<()>;
}

/// Writes raw FASTA records verbatim, one per append.
pub struct FastaSink<W: Write> {
    writer: W,
}

impl FastaSink<BufWriter<File>> {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> FastaSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> RecordSink<String> for FastaSink<W> {
    fn append(&mut self, record: &String) -> io::Result<()> {
        self.writer.write_all(record.as_bytes())?;
        if !record.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Fixed-schema CSV sink for metadata rows.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<BufWriter<File>> {
    pub fn create(path: &Path) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> io::Result<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        writer
            .write_record(METADATA_HEADER)
            .map_err(into_io_error)?;
        Ok(Self { writer })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> RecordSink<SummaryRecord> for CsvSink<W> {
    fn append(&mut self, record: &SummaryRecord) -> io::Result<()> {
        self.writer
            .write_record(record.to_row())
            .map_err(into_io_error)
    }
}

fn into_io_error(err: csv::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}
