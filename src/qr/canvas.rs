//! Canvas composition for printable QR labels
//!
//! Reproduces the label layout: the QR image centered on a white canvas with
//! side padding, a header band on scan codes, a footer band where the
//! identifier label sits, and a thin outer border.

use image::{DynamicImage, Rgb, RgbImage, imageops};

const WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const BORDER: Rgb<u8> = Rgb([0xde, 0xe2, 0xe6]);
const FOOTER_FILL: Rgb<u8> = Rgb([0xf8, 0xf9, 0xfa]);
const FOOTER_OUTLINE: Rgb<u8> = Rgb([0xe9, 0xec, 0xef]);
const HEADER_FILL: Rgb<u8> = Rgb([0xe3, 0xf2, 0xfd]);
const HEADER_OUTLINE: Rgb<u8> = Rgb([0x21, 0x96, 0xf3]);

/// Geometry of the composed label canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    /// Horizontal padding split across both sides of the QR image
    pub side_padding: u32,
    /// Vertical gap above the QR image
    pub top_padding: u32,
    /// Vertical gap below the QR image, holding the footer band
    pub bottom_padding: u32,
    /// Whether to draw the highlighted header band (scan codes only)
    pub header_band: bool,
}

impl CanvasLayout {
    /// Layout for plain label codes: footer band only.
    pub fn label() -> Self {
        Self {
            side_padding: 80,
            top_padding: 40,
            bottom_padding: 80,
            header_band: false,
        }
    }

    /// Layout for scan codes: taller canvas with a header band.
    pub fn scan() -> Self {
        Self {
            side_padding: 80,
            top_padding: 40,
            bottom_padding: 100,
            header_band: true,
        }
    }

    fn canvas_size(&self, qr_width: u32, qr_height: u32) -> (u32, u32) {
        (
            qr_width + self.side_padding,
            qr_height + self.top_padding + self.bottom_padding,
        )
    }
}

/// Compose a rendered QR image onto the label canvas.
pub fn compose(qr: &DynamicImage, layout: &CanvasLayout) -> RgbImage {
    let qr = qr.to_rgb8();
    let (width, height) = layout.canvas_size(qr.width(), qr.height());
    let mut canvas = RgbImage::from_pixel(width, height, WHITE);

    let qr_x = (width - qr.width()) / 2;
    imageops::replace(&mut canvas, &qr, i64::from(qr_x), i64::from(layout.top_padding));

    if layout.header_band {
        let band_width = width * 3 / 5;
        let band_x = (width - band_width) / 2;
        fill_rect(&mut canvas, band_x, 6, band_width, 30, HEADER_FILL);
        stroke_rect(&mut canvas, band_x, 6, band_width, 30, 1, HEADER_OUTLINE);
    }

    // Footer band sits where the identifier label is printed.
    let band_width = width / 2;
    let band_x = (width - band_width) / 2;
    let band_y = height - layout.bottom_padding / 2 - 18;
    fill_rect(&mut canvas, band_x, band_y, band_width, 36, FOOTER_FILL);
    stroke_rect(&mut canvas, band_x, band_y, band_width, 36, 1, FOOTER_OUTLINE);

    stroke_rect(&mut canvas, 0, 0, width, height, 2, BORDER);

    canvas
}

fn fill_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(image.width());
    let y_end = (y + height).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, color);
        }
    }
}

fn stroke_rect(
    image: &mut RgbImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    thickness: u32,
    color: Rgb<u8>,
) {
    fill_rect(image, x, y, width, thickness, color);
    fill_rect(image, x, y + height.saturating_sub(thickness), width, thickness, color);
    fill_rect(image, x, y, thickness, height, color);
    fill_rect(image, x + width.saturating_sub(thickness), y, thickness, height, color);
}
