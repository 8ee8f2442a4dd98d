//! Advance width and side bearing derivation.

use super::CellLayout;
use crate::error::{DefontError, Result};
use crate::types::{Glyph, Outline};

/// Computes horizontal metrics from the cell layout and finished outlines.
#[derive(Debug, Clone, Copy)]
pub struct MetricsComputer {
    layout: CellLayout,
}

impl MetricsComputer {
    pub fn new(layout: CellLayout) -> Self {
        Self { layout }
    }

    /// `(left_pad + cols + right_pad + letterspacing) * cell`, never below
    /// one cell.
    pub fn advance_width(&self, cols: usize) -> i32 {
        let l = &self.layout;
        let cells = l.left_pad + cols as i32 + l.right_pad + l.letterspacing;
        (cells * l.cell).max(l.cell)
    }

    /// Side bearing of an outline: its xMin, or 0 when empty.
    pub fn left_side_bearing(&self, outline: &Outline) -> i32 {
        outline.x_min()
    }

    /// Fill in side bearings for the base glyph and all its layers.
    pub fn apply(&self, glyph: &mut Glyph) {
        glyph.left_side_bearing = self.left_side_bearing(&glyph.outline);
        for layer in &mut glyph.layers {
            layer.left_side_bearing = self.left_side_bearing(&layer.outline);
        }
    }
}

/// Check that every reported side bearing equals its outline's xMin.
pub fn verify_metrics(glyph: &Glyph) -> Result<()> {
    check_bearing(&glyph.name, &glyph.outline, glyph.left_side_bearing)?;
    for layer in &glyph.layers {
        check_bearing(&layer.name, &layer.outline, layer.left_side_bearing)?;
    }
    if glyph.advance_width <= 0 {
        return Err(DefontError::Geometry {
            glyph: glyph.name.clone(),
            message: format!("advance width {} is not positive", glyph.advance_width),
        });
    }
    Ok(())
}

fn check_bearing(name: &str, outline: &Outline, reported: i32) -> Result<()> {
    let expected = outline.x_min();
    if expected != reported {
        return Err(DefontError::Geometry {
            glyph: name.to_string(),
            message: format!(
                "left side bearing {} does not match outline xMin {}",
                reported, expected
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GlyphKey, LayerGlyph, Rect};

    fn layout_85() -> CellLayout {
        CellLayout {
            cell: 85,
            ..CellLayout::default()
        }
    }

    #[test]
    fn test_advance_width() {
        let metrics = MetricsComputer::new(layout_85());
        assert_eq!(metrics.advance_width(5), 595);
        assert_eq!(metrics.advance_width(1), 255);
    }

    #[test]
    fn test_advance_never_below_one_cell() {
        let layout = CellLayout {
            left_pad: 0,
            right_pad: 0,
            letterspacing: -4,
            ..layout_85()
        };
        assert_eq!(MetricsComputer::new(layout).advance_width(1), 85);
    }

    #[test]
    fn test_apply_and_verify() {
        let metrics = MetricsComputer::new(layout_85());
        let mut glyph = Glyph {
            key: GlyphKey::Codepoint(0x41),
            name: "uni0041".to_string(),
            advance_width: 595,
            left_side_bearing: -1,
            outline: Outline::from_rects(vec![Rect::new(255, 0, 340, 85).unwrap()]),
            layers: vec![LayerGlyph {
                name: "uni0041.p0".to_string(),
                palette_index: 0,
                outline: Outline::from_rects(vec![Rect::new(170, 0, 255, 85).unwrap()]),
                left_side_bearing: 0,
            }],
        };

        assert!(verify_metrics(&glyph).is_err());
        metrics.apply(&mut glyph);
        assert_eq!(glyph.left_side_bearing, 255);
        assert_eq!(glyph.layers[0].left_side_bearing, 170);
        assert!(verify_metrics(&glyph).is_ok());
    }

    #[test]
    fn test_mismatched_layer_is_geometry_error() {
        let glyph = Glyph {
            key: GlyphKey::Codepoint(0x41),
            name: "uni0041".to_string(),
            advance_width: 595,
            left_side_bearing: 0,
            outline: Outline::new(),
            layers: vec![LayerGlyph {
                name: "uni0041.p2".to_string(),
                palette_index: 2,
                outline: Outline::from_rects(vec![Rect::new(85, 0, 170, 85).unwrap()]),
                left_side_bearing: 0,
            }],
        };

        match verify_metrics(&glyph) {
            Err(DefontError::Geometry { glyph, .. }) => assert_eq!(glyph, "uni0041.p2"),
            other => panic!("expected geometry error, got {:?}", other),
        }
    }
}
