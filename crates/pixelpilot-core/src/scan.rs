//! Row-major pixel search over captured frames.
//!
//! Every search visits candidates top-to-bottom, left-to-right within a
//! row, and reports the first hit. Cost is linear in the clamped region
//! area; the only early exit is first-match termination.

use serde::{Deserialize, Serialize};

use crate::color::{ColorSpec, MultiColorSpec};
use crate::frame::Frame;
use crate::region::{Bounds, Region};

/// A located pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// Find the first pixel matching `spec` inside `region`.
///
/// Returns `None` when the clamped region contains no matching pixel,
/// including when it is empty.
pub fn find_color(frame: &Frame, spec: &ColorSpec, region: Option<&Region>) -> Option<Point> {
    Bounds::clamp(region, frame.width(), frame.height())
        .points()
        .find(|&(x, y)| compare_pixel(frame, x, y, spec))
        .map(|(x, y)| Point { x, y })
}

/// Find the first anchor pixel satisfying a multi-point spec.
///
/// A candidate anchor must match the anchor spec, and the pixel at
/// `(x + dx, y + dy)` for every offset must lie inside the frame and match
/// that offset's spec. Any failing offset rejects the candidate, and the
/// scan resumes at the next row-major position after the anchor; it never
/// skips ahead based on where an offset landed. The returned point is the
/// anchor coordinate, not an offset's.
pub fn find_multi_color(
    frame: &Frame,
    spec: &MultiColorSpec,
    region: Option<&Region>,
) -> Option<Point> {
    Bounds::clamp(region, frame.width(), frame.height())
        .points()
        .find(|&(x, y)| anchor_matches(frame, spec, x, y))
        .map(|(x, y)| Point { x, y })
}

fn anchor_matches(frame: &Frame, spec: &MultiColorSpec, x: u32, y: u32) -> bool {
    if !compare_pixel(frame, x, y, &spec.anchor) {
        return false;
    }
    spec.offsets.iter().all(|offset| {
        let ox = i64::from(x) + i64::from(offset.dx);
        let oy = i64::from(y) + i64::from(offset.dy);
        match (u32::try_from(ox), u32::try_from(oy)) {
            (Ok(ox), Ok(oy)) => compare_pixel(frame, ox, oy, &offset.spec),
            _ => false,
        }
    })
}

/// Check a single pixel against a spec.
///
/// Out-of-bounds coordinates and color mismatches both return `false`; the
/// return value does not distinguish them. A caller that needs to know
/// which happened must check [`Frame::pixel`] first.
pub fn compare_pixel(frame: &Frame, x: u32, y: u32, spec: &ColorSpec) -> bool {
    frame.pixel(x, y).is_some_and(|c| spec.is_match(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, OffsetColor};

    const BLACK: Color = Color::new(0, 0, 0);
    const RED: Color = Color::new(255, 0, 0);
    const GREEN: Color = Color::new(0, 255, 0);

    /// A `width` x `height` frame filled with `background`, with the listed
    /// pixels overridden.
    fn frame_with(
        width: u32,
        height: u32,
        background: Color,
        pixels: &[(u32, u32, Color)],
    ) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[background.r, background.g, background.b]);
        }
        for &(x, y, c) in pixels {
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = c.r;
            data[idx + 1] = c.g;
            data[idx + 2] = c.b;
        }
        Frame::from_rgb(width, height, data).unwrap()
    }

    #[test]
    fn finds_the_only_matching_pixel() {
        let frame = frame_with(10, 10, BLACK, &[(3, 4, RED)]);
        let spec = ColorSpec::exact(RED);
        assert_eq!(find_color(&frame, &spec, None), Some(Point { x: 3, y: 4 }));
        assert_eq!(find_color(&frame, &ColorSpec::exact(GREEN), None), None);
    }

    #[test]
    fn first_match_is_row_major() {
        // (7, 2) comes before (3, 5) because its row is higher.
        let frame = frame_with(10, 10, BLACK, &[(3, 5, RED), (7, 2, RED)]);
        let spec = ColorSpec::exact(RED);
        assert_eq!(find_color(&frame, &spec, None), Some(Point { x: 7, y: 2 }));

        // Same row: the leftmost pixel wins.
        let frame = frame_with(10, 10, BLACK, &[(6, 4, RED), (2, 4, RED)]);
        assert_eq!(find_color(&frame, &spec, None), Some(Point { x: 2, y: 4 }));
    }

    #[test]
    fn tolerance_widens_the_match() {
        let frame = frame_with(4, 4, BLACK, &[(1, 1, Color::new(250, 4, 3))]);
        assert_eq!(find_color(&frame, &ColorSpec::exact(RED), None), None);
        let loose = ColorSpec::new(RED, 5);
        assert_eq!(find_color(&frame, &loose, None), Some(Point { x: 1, y: 1 }));
    }

    #[test]
    fn region_restricts_the_search() {
        let frame = frame_with(10, 10, BLACK, &[(1, 1, RED), (8, 8, RED)]);
        let spec = ColorSpec::exact(RED);
        let region = Region {
            x: 5,
            y: 5,
            width: 5,
            height: 5,
        };
        assert_eq!(
            find_color(&frame, &spec, Some(&region)),
            Some(Point { x: 8, y: 8 })
        );
    }

    #[test]
    fn empty_region_finds_nothing() {
        let frame = frame_with(10, 10, RED, &[]);
        let spec = ColorSpec::exact(RED);
        let outside = Region {
            x: 100,
            y: 100,
            width: 5,
            height: 5,
        };
        assert_eq!(find_color(&frame, &spec, Some(&outside)), None);
        let degenerate = Region {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };
        assert_eq!(find_color(&frame, &spec, Some(&degenerate)), None);
    }

    #[test]
    fn multi_point_rejects_anchor_with_wrong_offset_color() {
        // Anchor color at (5, 5), but (7, 5) is not red; a second, valid
        // anchor at (1, 8) has red at (3, 8).
        let anchor_color = Color::new(10, 20, 30);
        let frame = frame_with(
            10,
            10,
            BLACK,
            &[(5, 5, anchor_color), (1, 8, anchor_color), (3, 8, RED)],
        );
        let spec = MultiColorSpec {
            anchor: ColorSpec::exact(anchor_color),
            offsets: vec![OffsetColor {
                dx: 2,
                dy: 0,
                spec: ColorSpec::exact(RED),
            }],
        };
        assert_eq!(
            find_multi_color(&frame, &spec, None),
            Some(Point { x: 1, y: 8 })
        );
    }

    #[test]
    fn multi_point_not_found_when_no_candidate_survives() {
        let anchor_color = Color::new(10, 20, 30);
        let frame = frame_with(10, 10, BLACK, &[(5, 5, anchor_color)]);
        let spec = MultiColorSpec {
            anchor: ColorSpec::exact(anchor_color),
            offsets: vec![OffsetColor {
                dx: 2,
                dy: 0,
                spec: ColorSpec::exact(RED),
            }],
        };
        assert_eq!(find_multi_color(&frame, &spec, None), None);
    }

    #[test]
    fn multi_point_offset_out_of_bounds_rejects_the_candidate() {
        // Anchor at the right edge; the +2 offset falls off the frame.
        let frame = frame_with(10, 10, BLACK, &[(9, 5, RED)]);
        let spec = MultiColorSpec {
            anchor: ColorSpec::exact(RED),
            offsets: vec![OffsetColor {
                dx: 2,
                dy: 0,
                spec: ColorSpec::exact(RED),
            }],
        };
        assert_eq!(find_multi_color(&frame, &spec, None), None);
    }

    #[test]
    fn multi_point_negative_offsets_work() {
        let anchor_color = Color::new(10, 20, 30);
        let frame = frame_with(10, 10, BLACK, &[(5, 5, anchor_color), (4, 3, GREEN)]);
        let spec = MultiColorSpec {
            anchor: ColorSpec::exact(anchor_color),
            offsets: vec![OffsetColor {
                dx: -1,
                dy: -2,
                spec: ColorSpec::exact(GREEN),
            }],
        };
        assert_eq!(
            find_multi_color(&frame, &spec, None),
            Some(Point { x: 5, y: 5 })
        );
    }

    #[test]
    fn multi_point_without_offsets_is_a_plain_color_search() {
        let frame = frame_with(10, 10, BLACK, &[(3, 4, RED)]);
        let spec = MultiColorSpec {
            anchor: ColorSpec::exact(RED),
            offsets: vec![],
        };
        assert_eq!(
            find_multi_color(&frame, &spec, None),
            Some(Point { x: 3, y: 4 })
        );
    }

    #[test]
    fn compare_pixel_collapses_out_of_bounds_and_mismatch() {
        let frame = frame_with(4, 4, BLACK, &[(1, 1, RED)]);
        let spec = ColorSpec::exact(RED);
        assert!(compare_pixel(&frame, 1, 1, &spec));
        // Wrong color and out-of-bounds are both plain `false`.
        assert!(!compare_pixel(&frame, 0, 0, &spec));
        assert!(!compare_pixel(&frame, 99, 1, &spec));
    }
}
