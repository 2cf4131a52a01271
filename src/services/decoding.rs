use crate::models::LuminanceBuffer;
use thiserror::Error;

/// Barcode symbologies a decoder can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    QrCode,
    Code128,
}

/// Hints passed to the decoder with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeHints {
    possible_formats: &'static [BarcodeFormat],
}

impl DecodeHints {
    pub const fn new(possible_formats: &'static [BarcodeFormat]) -> Self {
        Self { possible_formats }
    }

    pub fn possible_formats(&self) -> &'static [BarcodeFormat] {
        self.possible_formats
    }

    pub fn allows(&self, format: BarcodeFormat) -> bool {
        self.possible_formats.contains(&format)
    }
}

/// Restricts recognition to QR codes. Every scan attempt uses this.
pub static QR_ONLY_HINTS: DecodeHints = DecodeHints::new(&[BarcodeFormat::QrCode]);

/// One decode attempt over the current frame.
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    luminance: &'a LuminanceBuffer,
    hints: &'a DecodeHints,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(luminance: &'a LuminanceBuffer, hints: &'a DecodeHints) -> Self {
        Self { luminance, hints }
    }

    pub fn luminance(&self) -> &'a LuminanceBuffer {
        self.luminance
    }

    pub fn hints(&self) -> &'a DecodeHints {
        self.hints
    }
}

/// Decode failures.
///
/// `NotFound` and `Unreadable` are the ordinary result of a frame without a
/// usable symbol and are retried. `Fault` is anything else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No QR code found in frame")]
    NotFound,

    #[error("QR code could not be read: {0}")]
    Unreadable(String),

    #[error("Decoder fault: {0}")]
    Fault(String),
}

impl DecodeError {
    /// Whether the scan loop should silently try the next frame
    pub fn is_retryable(&self) -> bool {
        matches!(self, DecodeError::NotFound | DecodeError::Unreadable(_))
    }
}

/// A stateful QR decoder. One instance lives for one scan session.
pub trait QrDecoder {
    fn decode(&mut self, request: &DecodeRequest<'_>) -> Result<String, DecodeError>;
}

/// Creates a fresh decoder every time scanning starts.
pub trait DecoderFactory {
    fn create(&self) -> Box<dyn QrDecoder>;
}

impl<F> DecoderFactory for F
where
    F: Fn() -> Box<dyn QrDecoder>,
{
    fn create(&self) -> Box<dyn QrDecoder> {
        self()
    }
}

/// [`QrDecoder`] backed by `rqrr`.
///
/// `rqrr` binarizes the frame, locates finder patterns and performs the
/// Reed-Solomon corrected decode. The first grid that decodes wins.
#[derive(Debug, Default)]
pub struct RqrrDecoder {
    frames_seen: u64,
}

impl RqrrDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames passed to this decoder so far
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(&mut self, request: &DecodeRequest<'_>) -> Result<String, DecodeError> {
        if !request.hints().allows(BarcodeFormat::QrCode) {
            return Err(DecodeError::NotFound);
        }

        self.frames_seen += 1;
        let luma = request.luminance();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            luma.width(),
            luma.height(),
            |x, y| luma.sample(x, y),
        );

        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return Err(DecodeError::NotFound);
        }

        let mut last_error = None;
        for grid in &grids {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(content),
                Err(e) => last_error = Some(e.to_string()),
            }
        }

        tracing::trace!(
            "Found {} QR grid(s) but none decoded: {:?}",
            grids.len(),
            last_error
        );
        Err(DecodeError::Unreadable(last_error.unwrap_or_default()))
    }
}

/// Factory for [`RqrrDecoder`]
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoderFactory;

impl DecoderFactory for RqrrDecoderFactory {
    fn create(&self) -> Box<dyn QrDecoder> {
        Box::new(RqrrDecoder::new())
    }
}
