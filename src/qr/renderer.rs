//! SVG QR renderer producing `data:` URLs

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use super::{ErrorCorrectionLevel, QrError, QrRenderer, QrResult};

const DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

/// Renders addresses as black-on-white SVG QR codes
#[derive(Debug, Clone)]
pub struct SvgQrRenderer {
    pub error_correction: ErrorCorrectionLevel,
    /// Minimum width/height of the image in pixels
    pub min_size: u32,
}

impl Default for SvgQrRenderer {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrectionLevel::M,
            min_size: 200,
        }
    }
}

impl SvgQrRenderer {
    /// Raw SVG document for `data`
    pub fn render_svg(&self, data: &str) -> QrResult<String> {
        if data.is_empty() {
            return Err(QrError::EmptyPayload);
        }
        let max = self.error_correction.max_bytes();
        if data.len() > max {
            return Err(QrError::PayloadTooLarge(data.len(), max));
        }

        let code = QrCode::with_error_correction_level(data.as_bytes(), ec_level(self.error_correction))
            .map_err(|e| QrError::Generation(e.to_string()))?;

        Ok(code
            .render::<svg::Color<'_>>()
            .min_dimensions(self.min_size, self.min_size)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build())
    }
}

impl QrRenderer for SvgQrRenderer {
    fn render(&self, address: &str) -> QrResult<String> {
        let svg = self.render_svg(address)?;
        Ok(format!("{}{}", DATA_URL_PREFIX, BASE64.encode(svg.as_bytes())))
    }
}

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::L => EcLevel::L,
        ErrorCorrectionLevel::M => EcLevel::M,
        ErrorCorrectionLevel::Q => EcLevel::Q,
        ErrorCorrectionLevel::H => EcLevel::H,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "tur1qruhlme44e0rr4wtsvsvkernpc8xx7qg3xmm5l5";

    #[test]
    fn test_render_data_url() {
        let url = SvgQrRenderer::default().render(ADDRESS).unwrap();
        assert!(url.starts_with(DATA_URL_PREFIX));

        let svg = BASE64.decode(&url[DATA_URL_PREFIX.len()..]).unwrap();
        let svg = String::from_utf8(svg).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = SvgQrRenderer::default();
        assert_eq!(renderer.render(ADDRESS).unwrap(), renderer.render(ADDRESS).unwrap());
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(
            SvgQrRenderer::default().render(""),
            Err(QrError::EmptyPayload)
        ));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let renderer = SvgQrRenderer {
            error_correction: ErrorCorrectionLevel::H,
            ..SvgQrRenderer::default()
        };
        let big = "a".repeat(crate::qr::MAX_QR_BYTES_H + 1);
        assert!(matches!(renderer.render(&big), Err(QrError::PayloadTooLarge(_, _))));
    }
}
