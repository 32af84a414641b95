//! Rectangular search regions clamped to frame bounds.

use serde::{Deserialize, Serialize};

/// A caller-supplied search rectangle in frame coordinates.
///
/// Regions come from user input (CLI flags, script files) and may reach
/// past the frame or miss it entirely; clamping handles both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A half-open pixel rectangle known to lie inside a frame.
///
/// `x0..x1` and `y0..y1` index valid pixels. An empty rectangle means the
/// requested region and the frame do not intersect; scans over it return
/// not-found without touching the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Bounds {
    /// Clamp `region` against a `width` x `height` frame.
    ///
    /// No region selects the whole frame. A region reaching past an edge is
    /// cut at that edge; one lying entirely outside clamps to an empty
    /// rectangle. Clamping never wraps and never errors.
    pub fn clamp(region: Option<&Region>, width: u32, height: u32) -> Self {
        match region {
            None => Self {
                x0: 0,
                y0: 0,
                x1: width,
                y1: height,
            },
            Some(r) => Self {
                x0: r.x.min(width),
                y0: r.y.min(height),
                x1: r.x.saturating_add(r.width).min(width),
                y1: r.y.saturating_add(r.height).min(height),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Contained coordinates in row-major order: top row first, left to
    /// right within a row.
    ///
    /// The order is part of the search contract, not an implementation
    /// detail: it decides which of several equally matching pixels a scan
    /// reports.
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..self.y1).flat_map(move |y| (x0..x1).map(move |x| (x, y)))
    }
}
