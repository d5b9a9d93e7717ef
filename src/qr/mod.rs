//! QR code rendering and canvas composition
//!
//! Rendering is split in two: [`QrEncoder`] turns a URL into a raw QR image,
//! and [`canvas`] composes that image onto the padded, bordered layout the
//! printed labels use.

pub mod canvas;
mod encoder;

pub use canvas::CanvasLayout;
pub use encoder::QrEncoder;
