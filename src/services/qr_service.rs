use crate::config::Config;
use crate::errors::ServiceError;
use base64::engine::general_purpose::STANDARD as Base64Engine;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::render::unicode;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// Renders token strings as QR codes.
///
/// The smallest QR version that holds the payload is picked automatically;
/// level and module size are fixed per renderer.
#[derive(Debug, Clone)]
pub struct QrRenderer {
    ec_level: EcLevel,
    module_pixels: u32,
}

impl QrRenderer {
    pub fn new(ec_level: EcLevel, module_pixels: u32) -> Self {
        Self {
            ec_level,
            module_pixels,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ec_level, config.module_pixels)
    }

    /// Encodes `payload` as an 8-bit greyscale PNG with a standard quiet zone.
    pub fn encode(&self, payload: &str) -> Result<Vec<u8>, ServiceError> {
        let code = self.build(payload)?;
        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_pixels, self.module_pixels)
            .quiet_zone(true)
            .build();

        let mut png_bytes = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| ServiceError::Render(e.to_string()))?;

        Ok(png_bytes)
    }

    /// PNG wrapped in standard base64, for JSON responses and wallet passes.
    pub fn encode_base64(&self, payload: &str) -> Result<String, ServiceError> {
        self.encode(payload).map(|png| Base64Engine.encode(png))
    }

    /// Renders for a terminal using half-height block characters.
    pub fn render_text(&self, payload: &str) -> Result<String, ServiceError> {
        let code = self.build(payload)?;
        Ok(code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .quiet_zone(true)
            .build())
    }

    fn build(&self, payload: &str) -> Result<QrCode, ServiceError> {
        QrCode::with_error_correction_level(payload.as_bytes(), self.ec_level).map_err(|e| match e {
            QrError::DataTooLong => ServiceError::EncodingCapacityExceeded {
                len: payload.len(),
            },
            other => ServiceError::Render(other.to_string()),
        })
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::new(EcLevel::M, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    // Sample HS256 token of the same shape the issuer produces
    const SAMPLE_TOKEN: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.\
        eyJzdWIiOiJ1c2VyLTQyIiwiaWF0IjoxNzczNDgwNDEzLCJleHAiOjE3NzM0ODA3MTMsInB1cnBvc2UiOiJkaWdpdGFsX2lkX3FyIiwianRpIjoiOXJXdWFmVzZ0QnE2eVVlY0xDVnNNdyJ9.\
        3Sxo0mVq0m4C0Y6kF4c7m8CW2f9H1mGJ1b1zWkq8l2A";

    fn decode_png(png: &[u8]) -> String {
        let luma = image::load_from_memory(png).unwrap().to_luma8();
        let (w, h) = luma.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            w as usize,
            h as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR code");
        let (_meta, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn test_encode_produces_png() {
        let png = QrRenderer::default().encode(SAMPLE_TOKEN).unwrap();
        assert_eq!(&png[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_png_decodes_to_exact_payload() {
        for level in [EcLevel::M, EcLevel::Q, EcLevel::H] {
            let png = QrRenderer::new(level, 4).encode(SAMPLE_TOKEN).unwrap();
            assert_eq!(decode_png(&png), SAMPLE_TOKEN);
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = QrRenderer::default();
        assert_eq!(
            renderer.encode(SAMPLE_TOKEN).unwrap(),
            renderer.encode(SAMPLE_TOKEN).unwrap()
        );
    }

    #[test]
    fn test_base64_wraps_png() {
        let renderer = QrRenderer::default();
        let encoded = renderer.encode_base64(SAMPLE_TOKEN).unwrap();
        assert_eq!(
            Base64Engine.decode(encoded).unwrap(),
            renderer.encode(SAMPLE_TOKEN).unwrap()
        );
    }

    #[test]
    fn test_module_size_scales_image() {
        let small = image::load_from_memory(&QrRenderer::new(EcLevel::M, 2).encode(SAMPLE_TOKEN).unwrap())
            .unwrap()
            .to_luma8();
        let large = image::load_from_memory(&QrRenderer::new(EcLevel::M, 6).encode(SAMPLE_TOKEN).unwrap())
            .unwrap()
            .to_luma8();
        assert_eq!(large.width(), small.width() * 3);
    }

    #[test]
    fn test_capacity_exceeded() {
        let payload = "x".repeat(3000);
        let err = QrRenderer::default().encode(&payload).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::EncodingCapacityExceeded { len: 3000 }
        ));
    }

    #[test]
    fn test_higher_level_has_less_capacity() {
        // Fits version 40 at M (2331 bytes) but not at H (1273 bytes)
        let payload = "x".repeat(1500);
        assert!(QrRenderer::new(EcLevel::M, 1).encode(&payload).is_ok());
        assert!(matches!(
            QrRenderer::new(EcLevel::H, 1).encode(&payload),
            Err(ServiceError::EncodingCapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_render_text() {
        let text = QrRenderer::default().render_text(SAMPLE_TOKEN).unwrap();
        assert!(text.lines().count() > 10);
        assert!(QrRenderer::default().render_text(&"x".repeat(3000)).is_err());
    }
}
