// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead, Read};
use std::path::Path;

use model_builder::ModelBuilder;

use crate::Model;

mod model;
mod model_builder;
mod xml;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Number of bytes needed to tell all supported formats apart.
const MAGIC_LEN: usize = 3;

/// Error which can occur when loading OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the first bytes of a file.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(GZIP_MAGIC) {
            Self::XmlGz
        } else if head.starts_with(BZIP2_MAGIC) {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Additional controls for interpreting OSM data as a [Model].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f64; 4],
}

/// Parse OSM data from a reader into a [Model] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn load_from_io<R: io::Read>(options: &Options, mut reader: R) -> Result<Model, Error> {
    let head = match options.file_format {
        FileFormat::Unknown => read_head(&mut reader)?,
        _ => Vec::default(),
    };

    let format = match options.file_format {
        FileFormat::Unknown => {
            let detected = FileFormat::detect(&head);
            log::debug!("detected file format: {:?}", detected);
            detected
        }
        f => f,
    };

    let b = io::BufReader::new(io::Cursor::new(head).chain(reader));
    match format {
        FileFormat::Unknown | FileFormat::Xml => load_xml(options, b),

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            load_xml(options, io::BufReader::new(d))
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            load_xml(options, io::BufReader::new(d))
        }
    }
}

/// Reads enough leading bytes for [FileFormat::detect], stopping early only at EOF.
fn read_head<R: io::Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut head = vec![0; MAGIC_LEN];
    let mut filled = 0;

    while filled < MAGIC_LEN {
        match reader.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    head.truncate(filled);
    Ok(head)
}

fn load_xml<R: BufRead>(options: &Options, reader: R) -> Result<Model, Error> {
    let r = xml::Reader::from_io(reader);
    Ok(ModelBuilder::new(options).add_features(r)?)
}

/// Parse OSM data from a file at the provided path into a [Model] as per the provided [Options].
pub fn load_from_file<P: AsRef<Path>>(options: &Options, path: P) -> Result<Model, Error> {
    let f = File::open(path)?;
    load_from_io(options, f)
}

/// Parse OSM data from a static buffer into a [Model] as per the provided [Options].
pub fn load_from_buffer(options: &Options, data: &[u8]) -> Result<Model, Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let r = xml::Reader::from_buffer(data);
        Ok(ModelBuilder::new(options).add_features(r)?)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let options = Options {
            file_format: format,
            ..options.clone()
        };
        load_from_io(&options, io::Cursor::new(data))
    }
}
