//! QR payload rendering for payment URIs.

use qrcode::QrCode;
use qrcode::render::svg;

use crate::error::PayError;

/// Renders a payment URI as an SVG QR code.
///
/// # Errors
///
/// Returns [`PayError::InvalidInput`] if the data exceeds QR capacity.
pub fn render_svg(data: &str) -> Result<String, PayError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| PayError::InvalidInput(format!("payload too large for QR encoding: {e}")))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(256, 256)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_svg_document() {
        let svg = render_svg("solana:BPFLoaderUpgradeab1e11111111111111111111111?amount=1").unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
    }
}
