//! Script playback: interpret recorded actions against a device.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use pixelpilot_core::color::ColorSpec;
use pixelpilot_core::poll::wait_for_color;
use pixelpilot_core::scan::find_color;
use pixelpilot_core::script::{Action, Script};
use tracing::info;

use crate::device::client::DeviceClient;

/// Drag duration for directional swipes recorded without one.
const SWIPE_DURATION: Duration = Duration::from_millis(500);

/// Execute every action of `script` in order, stopping at the first
/// failure.
pub fn run_script(client: &mut DeviceClient, script: &Script) -> Result<()> {
    let label = script.name.as_deref().unwrap_or("script");
    info!(actions = script.actions.len(), "running '{label}'");

    for (index, action) in script.actions.iter().enumerate() {
        run_action(client, action).with_context(|| {
            format!(
                "'{label}': action {} ({}) failed",
                index + 1,
                action_name(action)
            )
        })?;
    }
    Ok(())
}

fn run_action(client: &mut DeviceClient, action: &Action) -> Result<()> {
    match action {
        Action::Tap { x, y } => client.tap(*x, *y)?,
        Action::DoubleTap { x, y } => client.double_tap(*x, *y)?,
        Action::LongPress { x, y, duration_ms } => {
            client.touch_and_hold(*x, *y, Duration::from_millis(*duration_ms))?
        }
        Action::Swipe {
            from_x,
            from_y,
            to_x,
            to_y,
            duration_ms,
        } => client.drag(
            (*from_x, *from_y),
            (*to_x, *to_y),
            Duration::from_millis(*duration_ms),
        )?,
        Action::SwipeDir { direction } => client.swipe_direction(*direction, SWIPE_DURATION)?,
        Action::Home => client.home()?,
        Action::Launch { bundle_id } => client.launch_app(bundle_id)?,
        Action::Terminate { bundle_id } => client.terminate_app(bundle_id)?,
        Action::Sleep { ms } => std::thread::sleep(Duration::from_millis(*ms)),
        Action::WaitColor {
            color,
            tolerance,
            region,
            timeout_ms,
            interval_ms,
        } => {
            let spec = ColorSpec::new(*color, *tolerance);
            let mut source = client.frame_source();
            let found = wait_for_color(
                &mut source,
                &spec,
                region.as_ref(),
                Duration::from_millis(*timeout_ms),
                Duration::from_millis(*interval_ms),
            );
            if found.is_none() {
                bail!("color {color} did not appear within {timeout_ms}ms");
            }
        }
        Action::TapColor {
            color,
            tolerance,
            region,
        } => {
            let spec = ColorSpec::new(*color, *tolerance);
            let frame = client.capture_frame()?;
            match find_color(&frame, &spec, region.as_ref()) {
                Some(point) => client.tap(point.x, point.y)?,
                None => bail!("color {color} not found on screen"),
            }
        }
    }
    Ok(())
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Tap { .. } => "tap",
        Action::DoubleTap { .. } => "double_tap",
        Action::LongPress { .. } => "long_press",
        Action::Swipe { .. } => "swipe",
        Action::SwipeDir { .. } => "swipe_dir",
        Action::Home => "home",
        Action::Launch { .. } => "launch",
        Action::Terminate { .. } => "terminate",
        Action::Sleep { .. } => "sleep",
        Action::WaitColor { .. } => "wait_color",
        Action::TapColor { .. } => "tap_color",
    }
}
