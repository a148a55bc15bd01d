//! Optical recognition backend
//!
//! Images go straight to the OCR engine. PDFs are rasterised one PNG per page
//! first, recognised in page order, and reassembled with a blank line between
//! pages. This is the only slow stage of the pipeline (seconds per page); it
//! runs to completion or failure and is never retried here.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use super::{RawText, TextExtractor};
use crate::config::OcrConfig;
use crate::error::ExtractError;
use shared_types::{DocumentFormat, ExtractionMethod};

const METHOD: ExtractionMethod = ExtractionMethod::OpticalRecognition;

/// Progress notification emitted after each recognised page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionProgress {
    pub page: u32,
    pub total_pages: u32,
    pub percent: u8,
}

impl RecognitionProgress {
    fn after_page(page: u32, total_pages: u32) -> Self {
        let percent = if total_pages == 0 {
            100
        } else {
            ((page as f64 / total_pages as f64) * 100.0).round() as u8
        };
        Self {
            page,
            total_pages,
            percent,
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(RecognitionProgress) + Send + Sync>;

/// Recognises the text in a single encoded image (PNG, JPEG, TIFF, ...)
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn recognize(&self, image: &[u8]) -> Result<String, ExtractError>;
}

/// Renders every page of a PDF to an encoded image, in page order
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, ExtractError>;
}

/// OCR through the `tesseract` command line tool, image piped over stdin
pub struct TesseractCli {
    config: OcrConfig,
}

impl TesseractCli {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
            "--oem".to_string(),
            self.config.engine_mode.to_string(),
            "--psm".to_string(),
            self.config.page_segmentation_mode.to_string(),
        ]
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &[u8]) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.config.tesseract_bin)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ExtractError::failed(
                    METHOD,
                    format!("Failed to run {}: {}", self.config.tesseract_bin, e),
                )
            })?;

        // Feed stdin from a scoped thread while the child's output is drained,
        // so an early exit (bad language pack) is still reaped and reported.
        // Dropping stdin at the end of the writer closes the pipe.
        let stdin = child.stdin.take();
        let (sent, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(image),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let sent = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (sent, output)
        });

        let output = output.map_err(|e| ExtractError::failed(METHOD, e.to_string()))?;

        if !output.status.success() {
            return Err(ExtractError::failed(
                METHOD,
                format!(
                    "tesseract exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        sent.map_err(|e| ExtractError::failed(METHOD, format!("Failed to send image: {}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Rasterises PDFs with Poppler's `pdftoppm` into a scratch directory
pub struct PdftoppmRasterizer {
    bin: String,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            bin: config.pdftoppm_bin.clone(),
            dpi: config.dpi,
        }
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, ExtractError> {
        let io_err = |e: std::io::Error| ExtractError::failed(METHOD, e.to_string());

        let scratch = tempfile::tempdir().map_err(io_err)?;
        let input = scratch.path().join("input.pdf");
        fs::write(&input, pdf).map_err(io_err)?;
        let prefix = scratch.path().join("page");

        let output = Command::new(&self.bin)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                ExtractError::failed(METHOD, format!("Failed to run {}: {}", self.bin, e))
            })?;

        if !output.status.success() {
            return Err(ExtractError::failed(
                METHOD,
                format!(
                    "pdftoppm exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let mut pages = Vec::new();
        for entry in fs::read_dir(scratch.path()).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if let Some(number) = page_number(&path) {
                pages.push((number, path));
            }
        }
        pages.sort_by_key(|(number, _)| *number);

        pages
            .into_iter()
            .map(|(_, path)| fs::read(path).map_err(io_err))
            .collect()
    }
}

/// Page number from pdftoppm output names (`page-1.png`, `page-07.png`)
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}

pub struct OpticalExtractor {
    engine: Box<dyn OcrEngine>,
    rasterizer: Box<dyn PageRasterizer>,
    normalize: bool,
    progress: ProgressCallback,
}

impl OpticalExtractor {
    /// Tesseract + pdftoppm backed extractor
    pub fn new(config: &OcrConfig) -> Self {
        Self::with_backends(
            Box::new(TesseractCli::new(config.clone())),
            Box::new(PdftoppmRasterizer::new(config)),
        )
        .with_normalization(config.normalize)
    }

    pub fn with_backends(engine: Box<dyn OcrEngine>, rasterizer: Box<dyn PageRasterizer>) -> Self {
        Self {
            engine,
            rasterizer,
            normalize: true,
            progress: Arc::new(log_progress),
        }
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Replace the default progress logger
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    fn recognize_pages(&self, pages: &[Vec<u8>]) -> Result<String, ExtractError> {
        let total = pages.len() as u32;
        let mut texts = Vec::with_capacity(pages.len());

        for (index, image) in pages.iter().enumerate() {
            let text = self.engine.recognize(image)?;
            texts.push(if self.normalize {
                normalize_ocr_text(&text)
            } else {
                text
            });
            (self.progress)(RecognitionProgress::after_page(index as u32 + 1, total));
        }

        Ok(texts.join("\n\n"))
    }
}

fn log_progress(progress: RecognitionProgress) {
    debug!(
        page = progress.page,
        total_pages = progress.total_pages,
        "OCR progress: {}%",
        progress.percent
    );
}

impl TextExtractor for OpticalExtractor {
    fn method(&self) -> ExtractionMethod {
        METHOD
    }

    fn extract(&self, data: &[u8], format: DocumentFormat) -> Result<RawText, ExtractError> {
        let pages = match format {
            DocumentFormat::Pdf => {
                let pages = self.rasterizer.rasterize(data)?;
                if pages.is_empty() {
                    return Err(ExtractError::failed(METHOD, "PDF has no pages to recognise"));
                }
                pages
            }
            _ => vec![data.to_vec()],
        };

        info!(
            engine = self.engine.name(),
            pages = pages.len(),
            "Running optical recognition"
        );
        let text = self.recognize_pages(&pages)?;
        Ok(RawText::new(text).with_page_count(pages.len() as u32))
    }
}

lazy_static! {
    static ref HYPHEN_BREAK: Regex = Regex::new(r"(\w)-\n(\w)").unwrap();
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n{2,}").unwrap();
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t]+").unwrap();
}

/// Repair the usual OCR line-wrapping artifacts.
///
/// - `com-\npetition` becomes `competition`
/// - CRLF / CR become LF
/// - single newlines inside a paragraph become spaces
/// - runs of blank lines collapse to one blank line
/// - runs of spaces and tabs collapse to one space
pub fn normalize_ocr_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = HYPHEN_BREAK.replace_all(&text, "$1$2");

    let paragraphs: Vec<String> = PARAGRAPH_BREAK
        .split(&text)
        .map(|p| p.replace('\n', " "))
        .collect();
    let text = paragraphs.join("\n\n");

    HORIZONTAL_SPACE
        .replace_all(&text, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct EchoEngine;

    impl OcrEngine for EchoEngine {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn recognize(&self, image: &[u8]) -> Result<String, ExtractError> {
            Ok(String::from_utf8_lossy(image).into_owned())
        }
    }

    struct FixedPages(Vec<&'static str>);

    impl PageRasterizer for FixedPages {
        fn rasterize(&self, _pdf: &[u8]) -> Result<Vec<Vec<u8>>, ExtractError> {
            Ok(self.0.iter().map(|p| p.as_bytes().to_vec()).collect())
        }
    }

    fn extractor(pages: Vec<&'static str>) -> OpticalExtractor {
        OpticalExtractor::with_backends(Box::new(EchoEngine), Box::new(FixedPages(pages)))
    }

    #[test]
    fn test_normalize_joins_hyphenated_words() {
        assert_eq!(normalize_ocr_text("non-com-\npetition clause"), "non-competition clause");
    }

    #[test]
    fn test_normalize_unwraps_lines_but_keeps_paragraphs() {
        let raw = "The Supplier shall\nindemnify the Buyer.\r\n\r\n\r\nNotices must be\r\nsent by mail.";
        assert_eq!(
            normalize_ocr_text(raw),
            "The Supplier shall indemnify the Buyer.\n\nNotices must be sent by mail."
        );
    }

    #[test]
    fn test_normalize_collapses_spaces_and_trims() {
        assert_eq!(normalize_ocr_text("  a \t\t b   c \n"), "a b c");
    }

    #[test]
    fn test_image_is_recognised_as_single_page() {
        let raw = extractor(vec![])
            .extract(b"This document contains a non-compete clause.", DocumentFormat::Image)
            .unwrap();
        assert_eq!(raw.text, "This document contains a non-compete clause.");
        assert_eq!(raw.page_count, Some(1));
    }

    #[test]
    fn test_pdf_pages_keep_order() {
        let raw = extractor(vec!["first page", "second page", "third page"])
            .extract(b"%PDF-1.7", DocumentFormat::Pdf)
            .unwrap();
        assert_eq!(raw.text, "first page\n\nsecond page\n\nthird page");
        assert_eq!(raw.page_count, Some(3));
    }

    #[test]
    fn test_pdf_without_pages_fails() {
        let err = extractor(vec![])
            .extract(b"%PDF-1.7", DocumentFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, ExtractError::ExtractionFailed { method: METHOD, .. }));
    }

    #[test]
    fn test_progress_reported_per_page() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let record: ProgressCallback = Arc::new(move |p: RecognitionProgress| {
            sink.lock().unwrap().push(p.percent);
        });
        let extractor = extractor(vec!["a", "b", "c", "d"]).with_progress(record);

        extractor.extract(b"%PDF", DocumentFormat::Pdf).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_missing_tesseract_binary_is_extraction_failure() {
        let config = OcrConfig {
            tesseract_bin: "/nonexistent/tesseract-binary".to_string(),
            ..OcrConfig::default()
        };
        let err = TesseractCli::new(config).recognize(b"\x89PNG").unwrap_err();
        assert!(err.to_string().contains("Failed to run"));
    }

    /// Executable shell script standing in for the tesseract binary
    #[cfg(unix)]
    fn fake_tesseract(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-tesseract.sh");
        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(format!("#!/bin/sh\n{}\n", body).as_bytes())
                .unwrap();
            file.sync_all().unwrap();
        }
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn test_early_tesseract_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            tesseract_bin: fake_tesseract(
                dir.path(),
                "echo \"Failed loading language 'xx'\" >&2\nexit 1",
            ),
            ..OcrConfig::default()
        };

        // Large enough to overflow the pipe buffer before the child exits
        let image = vec![0u8; 4 * 1024 * 1024];
        let err = TesseractCli::new(config).recognize(&image).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("tesseract exited with"), "{}", message);
        assert!(message.contains("Failed loading language 'xx'"), "{}", message);
        assert!(!message.contains("Broken pipe"), "{}", message);
    }

    #[cfg(unix)]
    #[test]
    fn test_tesseract_stdout_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            tesseract_bin: fake_tesseract(
                dir.path(),
                "cat > /dev/null\necho 'Notices must be sent by mail.'",
            ),
            ..OcrConfig::default()
        };

        let text = TesseractCli::new(config)
            .recognize(&vec![7u8; 256 * 1024])
            .unwrap();
        assert_eq!(text.trim(), "Notices must be sent by mail.");
    }

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(page_number(&PathBuf::from("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(&PathBuf::from("/tmp/x/page-012.png")), Some(12));
        assert_eq!(page_number(&PathBuf::from("/tmp/x/input.pdf")), None);
        assert_eq!(page_number(&PathBuf::from("/tmp/x/page-a.png")), None);
    }
}
