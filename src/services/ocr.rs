use crate::core::extract::MetricPatterns;
use crate::models::RawOcrMetrics;
use image::DynamicImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised by the screenshot pipeline
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image could not be decoded: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("I/O error during OCR: {0}")]
    Io(#[from] std::io::Error),
}

/// Text recognition backend
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Runs the Tesseract command-line binary
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractEngine {
    pub fn new(executable: impl Into<PathBuf>, language: impl Into<String>, page_segmentation_mode: u8) -> Self {
        Self {
            executable: executable.into(),
            language: language.into(),
            page_segmentation_mode,
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        // Grayscale reads the overlay text more reliably than color
        let gray = image.to_luma8();

        let input = NamedTempFile::with_suffix(".png")?;
        gray.save(input.path()).map_err(|e| OcrError::Engine(format!("failed to write temp image: {}", e)))?;

        let output = Command::new(&self.executable)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .output()
            .map_err(|e| OcrError::Engine(format!("failed to run {}: {}", self.executable.display(), e)))?;

        if !output.status.success() {
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Screenshot → metrics pipeline: decode, recognize, extract
pub struct MetricsExtractor {
    engine: Box<dyn OcrEngine>,
    patterns: MetricPatterns,
}

impl MetricsExtractor {
    pub fn new(engine: Box<dyn OcrEngine>) -> Result<Self, regex::Error> {
        Ok(Self {
            engine,
            patterns: MetricPatterns::new()?,
        })
    }

    /// Extract device metrics from raw image bytes
    ///
    /// Fails only when the bytes are not a decodable image or the OCR
    /// engine cannot run; unmatched fields fall back to defaults.
    pub fn extract(&self, image_bytes: &[u8]) -> Result<RawOcrMetrics, OcrError> {
        let image = image::load_from_memory(image_bytes)?;
        tracing::debug!("Decoded screenshot {}x{}", image.width(), image.height());

        let text = self.engine.recognize(&image)?;
        tracing::debug!("OCR text ({} chars): {:?}", text.len(), text);

        let metrics = self.patterns.extract(&text);

        let defaulted = metrics.defaulted_fields();
        if !defaulted.is_empty() {
            tracing::warn!("OCR fields not found, using defaults: {:?}", defaulted);
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    struct FixedText(&'static str);

    impl OcrEngine for FixedText {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb([255, 255, 255]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_extract_from_image() {
        let extractor = MetricsExtractor::new(Box::new(FixedText("PITCH SPEED 92.1\nTOTAL SPIN 2,175"))).unwrap();
        let metrics = extractor.extract(&png_bytes()).unwrap();
        assert_eq!(metrics.velo.value, 92.1);
        assert_eq!(metrics.spin.value, 2175.0);
        assert!(!metrics.tilt.matched);
    }

    #[test]
    fn test_corrupt_image() {
        let extractor = MetricsExtractor::new(Box::new(FixedText("PITCH SPEED 92.1"))).unwrap();
        let err = extractor.extract(b"definitely not an image").unwrap_err();
        assert!(matches!(err, OcrError::ImageDecode(_)));
    }

    #[test]
    fn test_missing_tesseract_binary() {
        let engine = TesseractEngine::new("/nonexistent/tesseract", "eng", 6);
        let image = image::load_from_memory(&png_bytes()).unwrap();
        let err = engine.recognize(&image).unwrap_err();
        assert!(matches!(err, OcrError::Engine(_)));
    }
}
