//! Validation of the base64 screenshot that accompanies a kickoff request.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use image::ImageFormat;

use crate::error::DumpReaderError;

const INVALID_FORMAT: &str =
    "Invalid image format. Please provide a valid base64 encoded image (JPEG, PNG, GIF, etc.)";

// Screenshots arrive from many clients; accept padded and unpadded input alike.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent,),
);

/// Strips a `data:image/<subtype>;base64,` prefix if present.
fn strip_data_url(payload: &str,) -> &str {
    let Some(rest,) = payload.strip_prefix("data:image/",) else {
        return payload;
    };
    match rest.split_once(";base64,",) {
        Some((subtype, data,))
            if !subtype.is_empty() && subtype.bytes().all(|b| b.is_ascii_lowercase(),) =>
        {
            data
        },
        _ => payload,
    }
}

fn detect_format_from_magic_bytes(bytes: &[u8],) -> Option<ImageFormat,> {
    if bytes.starts_with(b"\xff\xd8\xff",) {
        return Some(ImageFormat::Jpeg,);
    }
    if bytes.starts_with(b"\x89PNG",) {
        return Some(ImageFormat::Png,);
    }
    if bytes.starts_with(b"GIF8",) {
        return Some(ImageFormat::Gif,);
    }
    // Any RIFF container is let through, WebP being the common case.
    if bytes.starts_with(b"RIFF",) {
        return Some(ImageFormat::WebP,);
    }
    None
}

/// Decodes `payload` and checks that it starts like a JPEG, PNG, GIF or RIFF
/// (WebP) image. Returns the detected format.
pub fn validate_base64_image(payload: &str,) -> Result<ImageFormat, DumpReaderError,> {
    let data: String = strip_data_url(payload.trim(),)
        .chars()
        .filter(|c| !c.is_ascii_whitespace(),)
        .collect();
    let bytes = LENIENT
        .decode(data.as_bytes(),)
        .map_err(|e| DumpReaderError::InvalidImage(format!("Invalid base64 image data: {}", e),),)?;

    detect_format_from_magic_bytes(&bytes,)
        .ok_or_else(|| DumpReaderError::InvalidImage(INVALID_FORMAT.to_string(),),)
}
