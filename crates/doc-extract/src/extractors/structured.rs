//! Word-processor text pull.
//!
//! DOCX files are ZIP archives containing XML files in Open XML format.
//! The body text lives in `word/document.xml` as `w:t` runs inside `w:p`
//! paragraphs.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::{RawText, TextExtractor};
use crate::error::ExtractError;
use shared_types::{DocumentFormat, ExtractionMethod};

const METHOD: ExtractionMethod = ExtractionMethod::StructuredDocument;
const DOCUMENT_PART: &str = "word/document.xml";

pub struct StructuredDocumentExtractor;

impl StructuredDocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StructuredDocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for StructuredDocumentExtractor {
    fn method(&self) -> ExtractionMethod {
        METHOD
    }

    fn extract(&self, data: &[u8], _format: DocumentFormat) -> Result<RawText, ExtractError> {
        let mut archive = ZipArchive::new(Cursor::new(data)).map_err(|e| {
            ExtractError::failed(METHOD, format!("Failed to open DOCX archive: {}", e))
        })?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractError::failed(METHOD, format!("{}: {}", DOCUMENT_PART, e)))?
            .read_to_string(&mut xml)
            .map_err(|e| {
                ExtractError::failed(METHOD, format!("Failed to read {}: {}", DOCUMENT_PART, e))
            })?;

        document_xml_to_text(&xml).map(RawText::new)
    }
}

/// Flatten `word/document.xml` into plain text, one line per paragraph
fn document_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = String::new();

    let mut in_text = false;
    // `w:tab` inside `w:tabs` is a tab-stop definition, not content
    let mut in_tab_stops = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tabs" => in_tab_stops = true,
                b"tab" if !in_tab_stops => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" if !in_tab_stops => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text => {
                let text = t.unescape().map_err(|e| {
                    ExtractError::failed(METHOD, format!("Invalid text run: {}", e))
                })?;
                out.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tabs" => in_tab_stops = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::failed(
                    METHOD,
                    format!(
                        "Malformed {} at position {}: {}",
                        DOCUMENT_PART,
                        reader.buffer_position(),
                        e
                    ),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
