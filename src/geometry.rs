//! Crop/scale geometry for aspect-ratio reframing.
//!
//! The resolver is a pure leaf: given source dimensions and a
//! [`ReframeSpec`] it derives the crop rectangle and scale target that turn
//! the source into the requested aspect. The crop keeps full source height
//! and only narrows horizontally; which side survives is controlled by the
//! horizontal bias.

use serde::{Deserialize, Serialize};

use crate::error::{ReframeError, ReframeResult};

/// Requested output shape for a reframe pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReframeSpec {
    /// Output width in pixels.
    pub target_width: u32,
    /// Output height in pixels.
    pub target_height: u32,
    /// Normalized horizontal anchor: 0.0 keeps the left edge, 1.0 the
    /// right edge, 0.5 the center. Out-of-range values are clamped.
    pub horizontal_bias: f64,
}

impl Default for ReframeSpec {
    /// 9:16 portrait at 720x1280, center-anchored.
    fn default() -> Self {
        Self {
            target_width: 720,
            target_height: 1280,
            horizontal_bias: 0.5,
        }
    }
}

impl ReframeSpec {
    pub fn validate(&self) -> ReframeResult<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ReframeError::geometry(
                "target width/height must be non-zero",
            ));
        }
        if !self.horizontal_bias.is_finite() {
            return Err(ReframeError::geometry(format!(
                "horizontal bias must be finite, got {}",
                self.horizontal_bias
            )));
        }
        Ok(())
    }

    /// Bias clamped into `[0.0, 1.0]`.
    pub fn clamped_bias(&self) -> f64 {
        self.horizontal_bias.clamp(0.0, 1.0)
    }
}

/// The region of the source frame retained after cropping. Derived only,
/// never user-supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Full resolver output: the crop to apply first, then the scale target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGeometry {
    pub crop: CropRect,
    pub scale_width: u32,
    pub scale_height: u32,
}

/// Derive the crop/scale geometry for one source.
///
/// The crop width is `floor(source_height * target_width / target_height)`,
/// which makes the crop's aspect exactly the target aspect while keeping
/// full source height (no vertical cropping, no letterboxing). The crop is
/// anchored at `round(source_width * bias)` and clamped into the frame.
///
/// Errors with [`ReframeError::Geometry`] when any dimension is zero or
/// when the target aspect needs more width than the source has
/// (`crop_width > source_width`).
///
/// Pure and deterministic: identical inputs always yield identical output.
pub fn resolve(
    source_width: u32,
    source_height: u32,
    spec: &ReframeSpec,
) -> ReframeResult<ResolvedGeometry> {
    if source_width == 0 || source_height == 0 {
        return Err(ReframeError::geometry(
            "source width/height must be non-zero",
        ));
    }
    spec.validate()?;

    let crop_width = u64::from(source_height) * u64::from(spec.target_width)
        / u64::from(spec.target_height);
    if crop_width == 0 {
        return Err(ReframeError::geometry(format!(
            "target aspect {}:{} collapses to a zero-width crop at source height {source_height}",
            spec.target_width, spec.target_height
        )));
    }
    if crop_width > u64::from(source_width) {
        return Err(ReframeError::geometry(format!(
            "source is too narrow for the target aspect: need a {crop_width}px-wide crop \
             but the source is only {source_width}px wide"
        )));
    }
    let crop_width = crop_width as u32;

    let center_x = (f64::from(source_width) * spec.clamped_bias()).round() as i64;
    let max_x = i64::from(source_width - crop_width);
    let x = (center_x - i64::from(crop_width / 2)).clamp(0, max_x) as u32;

    Ok(ResolvedGeometry {
        crop: CropRect {
            x,
            y: 0,
            width: crop_width,
            height: source_height,
        },
        scale_width: spec.target_width,
        scale_height: spec.target_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(width: u32, height: u32, bias: f64) -> ReframeSpec {
        ReframeSpec {
            target_width: width,
            target_height: height,
            horizontal_bias: bias,
        }
    }

    #[test]
    fn portrait_crop_from_landscape_center() {
        let geo = resolve(1920, 1080, &spec(9, 16, 0.5)).unwrap();
        // floor(1080 * 9 / 16) = 607; x = 960 - 303 = 657.
        assert_eq!(
            geo.crop,
            CropRect {
                x: 657,
                y: 0,
                width: 607,
                height: 1080,
            }
        );
        assert_eq!((geo.scale_width, geo.scale_height), (9, 16));
    }

    #[test]
    fn bias_moves_the_crop_window() {
        let geo = resolve(1920, 1080, &spec(9, 16, 0.8)).unwrap();
        // round(1920 * 0.8) = 1536; 1536 - 303 = 1233, within [0, 1313].
        assert_eq!(geo.crop.x, 1233);
    }

    #[test]
    fn bias_is_clamped_not_rejected() {
        let left = resolve(1920, 1080, &spec(9, 16, -4.0)).unwrap();
        assert_eq!(left.crop.x, 0);

        let right = resolve(1920, 1080, &spec(9, 16, 7.5)).unwrap();
        assert_eq!(right.crop.x, 1920 - 607);
    }

    #[test]
    fn too_narrow_source_is_a_geometry_error() {
        // crop_width = floor(1080 * 2200 / 1080) = 2200 > 1920.
        let err = resolve(1920, 1080, &spec(2200, 1080, 0.5)).unwrap_err();
        assert!(matches!(err, ReframeError::Geometry(_)));
    }

    #[test]
    fn degenerate_dimensions_are_geometry_errors() {
        assert!(resolve(0, 1080, &spec(9, 16, 0.5)).is_err());
        assert!(resolve(1920, 0, &spec(9, 16, 0.5)).is_err());
        assert!(resolve(1920, 1080, &spec(0, 16, 0.5)).is_err());
        assert!(resolve(1920, 1080, &spec(9, 0, 0.5)).is_err());
        assert!(resolve(1920, 1080, &spec(9, 16, f64::NAN)).is_err());
    }

    #[test]
    fn crop_always_stays_in_bounds() {
        let sources = [(1920u32, 1080u32), (1280, 720), (640, 480), (608, 1080)];
        let biases = [-1.0, 0.0, 0.25, 0.5, 0.8, 1.0, 2.0];
        for (sw, sh) in sources {
            for bias in biases {
                let geo = resolve(sw, sh, &spec(9, 16, bias)).unwrap();
                assert_eq!(geo.crop.y, 0);
                assert_eq!(geo.crop.height, sh);
                assert!(geo.crop.width <= sw);
                assert!(geo.crop.x + geo.crop.width <= sw, "{sw}x{sh} bias {bias}");
            }
        }
    }

    #[test]
    fn resolver_is_deterministic() {
        let a = resolve(1920, 1080, &spec(9, 16, 0.37)).unwrap();
        let b = resolve(1920, 1080, &spec(9, 16, 0.37)).unwrap();
        assert_eq!(a, b);
    }
}
