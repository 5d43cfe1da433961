//! Output bundle: the two PDFs plus a zip holding both under fixed names.

use std::io::{Cursor, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const CV_FILENAME: &str = "Resume.pdf";
pub const COVER_LETTER_FILENAME: &str = "Cover Letter.pdf";
pub const ZIP_FILENAME: &str = "Resume_and_Cover_Letter.zip";

#[derive(Debug, Clone)]
pub struct OutputBundle {
    pub cv_pdf: Vec<u8>,
    pub cover_letter_pdf: Vec<u8>,
    pub zip: Vec<u8>,
}

impl OutputBundle {
    pub fn new(cv_pdf: Vec<u8>, cover_letter_pdf: Vec<u8>) -> Result<Self, ZipError> {
        let zip = build_archive(&cv_pdf, &cover_letter_pdf)?;
        Ok(Self {
            cv_pdf,
            cover_letter_pdf,
            zip,
        })
    }
}

/// Writes both PDFs into an in-memory deflate archive.
pub fn build_archive(cv_pdf: &[u8], cover_letter_pdf: &[u8]) -> Result<Vec<u8>, ZipError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    for (name, bytes) in [(CV_FILENAME, cv_pdf), (COVER_LETTER_FILENAME, cover_letter_pdf)] {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
