//! Parsing and decoding of `data:image/<subtype>;base64,<payload>` URLs.
//!
//! The drawing client exports its canvas as a data URL. The subtype in the
//! header decides the stored file name (`annotation.<subtype>`); the payload
//! is standard base64.

use base64::Engine;

use crate::error::CoreError;

/// Every accepted payload must start with this marker.
pub const IMAGE_DATA_URL_PREFIX: &str = "data:image";

/// Stem of the file name derived from a data URL.
pub const FILE_STEM: &str = "annotation";

/// Characters allowed in a media subtype besides ASCII alphanumerics
/// (RFC 6838 `restricted-name-chars`).
const SUBTYPE_PUNCTUATION: &[char] = &['!', '#', '$', '&', '-', '^', '_', '.', '+'];

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("file data is not an image data URL")]
    NotAnImage,

    #[error("data URL has no ',' separating header and payload")]
    MissingPayload,

    #[error("data URL header has no image subtype")]
    MissingSubtype,

    #[error("data URL image subtype '{0}' contains invalid characters")]
    InvalidSubtype(String),

    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl From<DataUrlError> for CoreError {
    fn from(err: DataUrlError) -> Self {
        match err {
            DataUrlError::Decode(_) => CoreError::Decode(err.to_string()),
            _ => CoreError::InvalidInput(err.to_string()),
        }
    }
}

/// A parsed, not yet decoded, image data URL borrowing from its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDataUrl<'a> {
    /// Media subtype, e.g. `png` for `data:image/png;base64,...`.
    pub subtype: &'a str,
    /// Everything after the first comma.
    pub payload: &'a str,
}

impl<'a> ImageDataUrl<'a> {
    /// Split a data URL into header and payload and extract the subtype.
    ///
    /// The subtype is the header text between the first `/` and the next `/`
    /// or `;`. No base64 decoding happens here.
    pub fn parse(input: &'a str) -> Result<Self, DataUrlError> {
        if !input.starts_with(IMAGE_DATA_URL_PREFIX) {
            return Err(DataUrlError::NotAnImage);
        }

        let (header, payload) = input.split_once(',').ok_or(DataUrlError::MissingPayload)?;

        let after_slash = header
            .split_once('/')
            .map(|(_, rest)| rest)
            .ok_or(DataUrlError::MissingSubtype)?;
        let subtype = after_slash
            .split(&['/', ';'][..])
            .next()
            .unwrap_or_default();

        if subtype.is_empty() {
            return Err(DataUrlError::MissingSubtype);
        }
        if !subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SUBTYPE_PUNCTUATION.contains(&c))
        {
            return Err(DataUrlError::InvalidSubtype(subtype.to_string()));
        }

        Ok(Self { subtype, payload })
    }

    /// File name for the stored image: `annotation.<subtype>`.
    pub fn file_name(&self) -> String {
        format!("{FILE_STEM}.{}", self.subtype)
    }

    /// Decode the payload with the standard base64 alphabet.
    ///
    /// ASCII whitespace (line wrapping) inside the payload is skipped.
    pub fn decode(&self) -> Result<Vec<u8>, DataUrlError> {
        let engine = base64::engine::general_purpose::STANDARD;
        if !self.payload.bytes().any(|b| b.is_ascii_whitespace()) {
            return Ok(engine.decode(self.payload)?);
        }
        let compact: Vec<u8> = self
            .payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        Ok(engine.decode(compact)?)
    }
}

/// A fully decoded image ready to be written to the file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub file_name: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Parse and decode an image data URL in one step.
pub fn decode_image_data_url(input: &str) -> Result<DecodedImage, CoreError> {
    let url = ImageDataUrl::parse(input)?;
    let bytes = url.decode()?;
    Ok(DecodedImage {
        file_name: url.file_name(),
        extension: url.subtype.to_string(),
        bytes,
    })
}

/// Raster formats a browser renders without running embedded content.
const INLINE_IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "webp", "bmp"];

/// Whether a stored file may be served `inline`.
///
/// Anything outside the raster allowlist (notably `svg+xml`, which can carry
/// scripts) must be served as an attachment.
pub fn is_inline_image(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => INLINE_IMAGE_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}

/// Guess a content type for a stored file from its extension.
///
/// Files written by this service always carry an image subtype as their
/// extension, so `image/<ext>` is accurate for them. `jpg` is normalized.
pub fn content_type_for(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, "jpg")) => "image/jpeg".to_string(),
        Some((_, "svg")) => "image/svg+xml".to_string(),
        Some((_, ext)) if !ext.is_empty() => format!("image/{ext}"),
        _ => "application/octet-stream".to_string(),
    }
}
