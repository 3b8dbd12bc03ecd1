// Business rules - orientation classification and render sizing

use crate::domain::model::{Dimensions, Orientation, OrientationInfo, Transform};

/// Classify a track's preferred transform into a display orientation.
///
/// The rotation angle is decomposed from the (a, b) column via `atan2` and
/// rounded to the nearest quarter turn, so scaled or slightly perturbed
/// rotation matrices still classify meaningfully. The four canonical
/// matrices (identity, right, left, down) classify exactly. Degenerate
/// transforms (zero or non-finite rotation column) classify as up/landscape.
pub fn classify_orientation(transform: &Transform) -> OrientationInfo {
    let (a, b) = (transform.a, transform.b);

    if !a.is_finite() || !b.is_finite() || (a == 0.0 && b == 0.0) {
        return OrientationInfo {
            orientation: Orientation::Up,
            is_portrait: false,
        };
    }

    let degrees = b.atan2(a).to_degrees();
    let quarter_turns = ((degrees / 90.0).round() as i64).rem_euclid(4);

    match quarter_turns {
        1 => OrientationInfo {
            orientation: Orientation::Right,
            is_portrait: true,
        },
        2 => OrientationInfo {
            orientation: Orientation::Down,
            is_portrait: false,
        },
        3 => OrientationInfo {
            orientation: Orientation::Left,
            is_portrait: true,
        },
        _ => OrientationInfo {
            orientation: Orientation::Up,
            is_portrait: false,
        },
    }
}

/// Working frame dimensions for the export: the natural size with width and
/// height exchanged when the track displays portrait.
pub fn render_size(natural_size: Dimensions, info: &OrientationInfo) -> Dimensions {
    if info.is_portrait {
        natural_size.swapped()
    } else {
        natural_size
    }
}
