//! QR code encoder

use crate::error::{Error, Result};
use image::{DynamicImage, Luma};
use qrcode::QrCode;

/// Near-black module shade used on printed labels.
const DARK: Luma<u8> = Luma([0x1a]);
const LIGHT: Luma<u8> = Luma([0xff]);

/// QR code encoder
pub struct QrEncoder {
    ecc_level: qrcode::EcLevel,
    module_size: u32,
}

impl QrEncoder {
    /// Create a new QR encoder with high error correction, the level the
    /// labels are printed with so they survive wear.
    pub fn new() -> Self {
        Self {
            ecc_level: qrcode::EcLevel::H,
            module_size: 12,
        }
    }

    /// Create a new QR encoder with a specific error correction level
    pub fn with_ecc_level(ecc_level: qrcode::EcLevel) -> Self {
        Self {
            ecc_level,
            module_size: 12,
        }
    }

    /// Override the rendered size of one QR module in pixels.
    pub fn with_module_size(mut self, module_size: u32) -> Self {
        self.module_size = module_size.max(1);
        self
    }

    /// Encode a string into a QR code image
    pub fn encode(&self, data: &str) -> Result<DynamicImage> {
        let code = QrCode::with_error_correction_level(data, self.ecc_level)
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_size, self.module_size)
            .dark_color(DARK)
            .light_color(LIGHT)
            .build();

        Ok(DynamicImage::ImageLuma8(image))
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}
