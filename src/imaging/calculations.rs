//! Pure calculation functions for canvas dimensions.
//!
//! All functions here are pure and testable without any pixels. Rounding
//! is half-away-from-zero (`f64::round`), which for the non-negative values
//! used here matches half-up.

use super::params::{ShadowParams, SquarePlacement};

/// Padding per side for already-square images, as a fraction of the final size.
pub const DEFAULT_PADDING_RATIO: f64 = 0.25;
/// Minimum padding on any side, as a fraction of the final size.
pub const MIN_PADDING_RATIO: f64 = 0.16;

/// Shadow offset as a percentage of the average dimension.
const SHADOW_OFFSET_PERCENT: f64 = 1.0;
/// Shadow blur as a percentage of the average dimension.
const SHADOW_BLUR_PERCENT: f64 = 2.0;

/// Scale `source` to fit inside a `target × target` square, preserving aspect.
///
/// # Examples
/// ```
/// # use clocktower_icons::imaging::calculations::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((200, 100), 100), (100, 50));
/// assert_eq!(calculate_fit_dimensions((30, 60), 120), (60, 120));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), target: u32) -> (u32, u32) {
    let (w, h) = source;
    if w == 0 || h == 0 {
        return (0, 0);
    }
    let scale = (target as f64 / w as f64).min(target as f64 / h as f64);
    (
        (w as f64 * scale).round() as u32,
        (h as f64 * scale).round() as u32,
    )
}

/// Offset that centers `inner` within `outer`, rounded.
pub fn centered_offset(outer: u32, inner: u32) -> u32 {
    (outer.saturating_sub(inner) as f64 / 2.0).round() as u32
}

/// Placement for `resize_to_square`: the scaled source centered on the target square.
pub fn calculate_square_fit(source: (u32, u32), target: u32) -> ((u32, u32), SquarePlacement) {
    let scaled = calculate_fit_dimensions(source, target);
    let placement = SquarePlacement {
        size: target,
        offset_x: centered_offset(target, scaled.0),
        offset_y: centered_offset(target, scaled.1),
    };
    (scaled, placement)
}

/// Two-tier aspect-ratio padding.
///
/// Square inputs get [`DEFAULT_PADDING_RATIO`] on every side, so the result
/// is twice the input size. Non-square inputs aim for the same average
/// padding; if either axis would end up with less than
/// [`MIN_PADDING_RATIO`] of the final size, the final size is recomputed
/// from that axis alone (horizontal checked first).
pub fn calculate_aspect_padding(width: u32, height: u32) -> SquarePlacement {
    let image_area = 1.0 - 2.0 * DEFAULT_PADDING_RATIO;
    let (w, h) = (width as f64, height as f64);

    if width == height {
        let size = (w / image_area).round();
        let offset = ((size - w) / 2.0).round() as u32;
        return SquarePlacement {
            size: size as u32,
            offset_x: offset,
            offset_y: offset,
        };
    }

    let constrained_area = 1.0 - 2.0 * MIN_PADDING_RATIO;
    let mut size = ((w + h) / (2.0 * image_area)).round();
    let min_padding = MIN_PADDING_RATIO * size;

    if (size - w) / 2.0 < min_padding {
        size = (w / constrained_area).round();
    } else if (size - h) / 2.0 < min_padding {
        size = (h / constrained_area).round();
    }

    SquarePlacement {
        size: size as u32,
        offset_x: ((size - w) / 2.0).round().max(0.0) as u32,
        offset_y: ((size - h) / 2.0).round().max(0.0) as u32,
    }
}

/// Drop-shadow geometry for an image of the given size.
pub fn calculate_shadow_params(width: u32, height: u32) -> ShadowParams {
    let average = (width as f64 + height as f64) / 2.0;
    let offset = (average * SHADOW_OFFSET_PERCENT / 100.0).floor() as u32;
    let blur = (average * SHADOW_BLUR_PERCENT / 100.0).floor() as u32;
    let extra_space = blur * 2 + offset;
    ShadowParams {
        offset,
        blur,
        extra_space,
        origin: (extra_space - offset) / 2,
    }
}
