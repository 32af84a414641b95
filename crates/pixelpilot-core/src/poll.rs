//! Bounded-time retry: acquire a frame, probe it, repeat until found or
//! the time budget runs out.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::color::ColorSpec;
use crate::frame::{Frame, FrameSource};
use crate::region::Region;
use crate::scan::{find_color, Point};

/// Poll `source` until `probe` reports a hit or `timeout` elapses.
///
/// Every iteration captures a fresh frame; a frame from an earlier
/// iteration is never re-probed. The elapsed-time check runs after each
/// probe, so at least one acquire-and-probe cycle always happens; a zero
/// timeout still scans once. On a hit the point is returned immediately,
/// without a trailing sleep; otherwise the loop sleeps `interval` (zero
/// means back-to-back captures, limited only by acquisition latency) and
/// retries.
///
/// A failed acquisition counts as "no match this iteration": it is logged
/// and the wait continues, so a transient capture glitch cannot abort an
/// otherwise-valid wait. Expiry returns `None`, the documented negative
/// outcome, not an error.
///
/// The sleep is a real blocking delay. Run long waits on a worker thread;
/// the loop owns all of its state and takes no locks.
pub fn wait_for<S, P>(
    source: &mut S,
    timeout: Duration,
    interval: Duration,
    mut probe: P,
) -> Option<Point>
where
    S: FrameSource,
    P: FnMut(&Frame) -> Option<Point>,
{
    let start = Instant::now();

    loop {
        match source.acquire() {
            Ok(frame) => {
                if let Some(point) = probe(&frame) {
                    debug!(
                        x = point.x,
                        y = point.y,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "probe hit"
                    );
                    return Some(point);
                }
            }
            Err(e) => {
                warn!("frame acquisition failed, treating as no match: {e}");
            }
        }

        if start.elapsed() >= timeout {
            return None;
        }
        std::thread::sleep(interval);
    }
}

/// Wait until a pixel matching `spec` appears inside `region`.
///
/// [`find_color`] plugged into [`wait_for`]; see there for the loop
/// contract.
pub fn wait_for_color<S: FrameSource>(
    source: &mut S,
    spec: &ColorSpec,
    region: Option<&Region>,
    timeout: Duration,
    interval: Duration,
) -> Option<Point> {
    wait_for(source, timeout, interval, |frame| {
        find_color(frame, spec, region)
    })
}
