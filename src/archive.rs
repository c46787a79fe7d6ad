use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::lattice::Lattice;
use crate::symbols::SymbolTable;
use crate::weight::LatticeWeight;

/// One keyed entry of a lattice archive. `symbols` carries the per-record
/// word symbol table unless the whole batch shares one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub lattice: Lattice<LatticeWeight>,
    pub symbols: Option<SymbolTable>,
}

/// Reads records one at a time from a gzipped bincode stream.
pub struct ArchiveReader<R: Read> {
    stream: GzDecoder<R>,
}

impl ArchiveReader<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file = File::open(path.as_ref())
            .map_err(|e| format!("cannot open {}: {}", path.as_ref().display(), e))?;
        Ok(ArchiveReader::from_reader(file))
    }
}

impl<R: Read> ArchiveReader<R> {
    pub fn from_reader(reader: R) -> Self {
        ArchiveReader {
            stream: GzDecoder::new(reader),
        }
    }
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = Result<Record, String>;

    fn next(&mut self) -> Option<Self::Item> {
        match bincode::deserialize_from(&mut self.stream) {
            Ok(record) => Some(Ok(record)),
            Err(e) => match *e {
                bincode::ErrorKind::Io(ref io_err)
                    if io_err.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    None
                }
                _ => Some(Err(format!("malformed lattice record: {}", e))),
            },
        }
    }
}

/// Appends records to a gzipped bincode stream; `finish` completes the
/// archive.
pub struct ArchiveWriter<W: Write> {
    stream: GzEncoder<W>,
}

impl ArchiveWriter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file = File::create(path.as_ref())
            .map_err(|e| format!("cannot create {}: {}", path.as_ref().display(), e))?;
        Ok(ArchiveWriter::from_writer(file))
    }
}

impl<W: Write> ArchiveWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        ArchiveWriter {
            stream: GzEncoder::new(writer, Compression::best()),
        }
    }

    pub fn write(&mut self, record: &Record) -> Result<(), String> {
        bincode::serialize_into(&mut self.stream, record)
            .map_err(|e| format!("cannot write lattice record: {}", e))
    }

    /// Flushes the compressed stream and hands back the underlying writer;
    /// an archive is incomplete without this.
    pub fn finish(self) -> Result<W, String> {
        self.stream
            .finish()
            .map_err(|e| format!("cannot finish lattice archive: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchiveReader, ArchiveWriter, Record};
    use crate::lattice::{Arc, Lattice};
    use crate::symbols::SymbolTable;
    use crate::weight::LatticeWeight;
    use num_traits::One;

    fn record(key: &str) -> Record {
        let mut lattice = Lattice::new(2, 0);
        lattice.add_arc(
            0,
            Arc {
                ilabel: 1,
                olabel: 1,
                weight: LatticeWeight::new(0.5, 1.5),
                target: 1,
            },
        );
        lattice.set_final(1, LatticeWeight::one());

        let mut symbols = SymbolTable::new();
        symbols.add_symbol(String::from("0"), 0);
        symbols.add_symbol(String::from("1"), 1);

        Record {
            key: String::from(key),
            lattice,
            symbols: Some(symbols),
        }
    }

    #[test]
    fn test_round_trip() {
        let records = vec![record("utt-1"), record("utt-2")];

        let mut writer = ArchiveWriter::from_writer(Vec::new());
        for r in &records {
            writer.write(r).unwrap();
        }
        let buffer = writer.finish().unwrap();

        let read: Result<Vec<Record>, String> =
            ArchiveReader::from_reader(buffer.as_slice()).collect();
        assert_eq!(read.unwrap(), records);
    }

    #[test]
    fn test_empty_archive() {
        let buffer = ArchiveWriter::from_writer(Vec::new()).finish().unwrap();
        let mut reader = ArchiveReader::from_reader(buffer.as_slice());
        assert!(reader.next().is_none());
    }
}
