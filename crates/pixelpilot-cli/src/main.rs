//! pixelpilot CLI entry point.

mod args;
mod device;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pixelpilot_core::color::{ColorSpec, MultiColorSpec, OffsetColor};
use pixelpilot_core::poll::wait_for_color;
use pixelpilot_core::scan::{compare_pixel, find_color, find_multi_color, Point};
use pixelpilot_core::script::{Script, SwipeDirection};
use serde::Serialize;
use tracing::error;

use crate::args::{Cli, Commands, Direction};
use crate::device::client::DeviceClient;
use crate::device::runner::run_script;

/// Exit code for a search that legitimately found nothing; errors use 2.
const EXIT_NOT_FOUND: i32 = 1;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    // Examples just prints and exits; no service needed.
    if let Commands::Examples = cli.command {
        println!("{}", args::EXAMPLES_TEXT);
        return Ok(0);
    }

    let mut client = DeviceClient::new(&cli.url)?;

    match cli.command {
        Commands::Status => {
            let info = client
                .device_info()
                .context("device service unreachable")?;
            print_json(&info)?;
        }
        Commands::ScreenSize => {
            let (width, height) = client.screen_size()?;
            print_json(&serde_json::json!({ "width": width, "height": height }))?;
        }
        Commands::Tap(a) => client.tap(a.x, a.y)?,
        Commands::DoubleTap(a) => client.double_tap(a.x, a.y)?,
        Commands::LongPress(a) => {
            client.touch_and_hold(a.x, a.y, Duration::from_millis(a.duration))?
        }
        Commands::Swipe(a) => client.drag(
            (a.from_x, a.from_y),
            (a.to_x, a.to_y),
            Duration::from_millis(a.duration),
        )?,
        Commands::SwipeDir(a) => {
            let direction = match a.direction {
                Direction::Up => SwipeDirection::Up,
                Direction::Down => SwipeDirection::Down,
                Direction::Left => SwipeDirection::Left,
                Direction::Right => SwipeDirection::Right,
            };
            client.swipe_direction(direction, Duration::from_millis(a.duration))?;
        }
        Commands::Home => client.home()?,
        Commands::Launch(a) => client.launch_app(&a.bundle_id)?,
        Commands::Terminate(a) => client.terminate_app(&a.bundle_id)?,
        Commands::Screenshot(a) => match a.output {
            Some(path) => {
                let png = client.screenshot_png()?;
                std::fs::write(&path, png)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("{}", path.display());
            }
            None => println!("{}", client.screenshot_base64()?),
        },
        Commands::Pixel(a) => {
            return match client.pixel_color(a.x, a.y)? {
                Some(color) => {
                    print_json(&serde_json::json!({
                        "x": a.x, "y": a.y, "color": color,
                    }))?;
                    Ok(0)
                }
                None => {
                    print_json(&serde_json::json!({ "found": false }))?;
                    Ok(EXIT_NOT_FOUND)
                }
            };
        }
        Commands::FindColor(a) => {
            let spec = ColorSpec::new(a.color, a.tolerance);
            let frame = client.capture_frame()?;
            return print_point(find_color(&frame, &spec, a.region.as_ref()));
        }
        Commands::FindMulti(a) => {
            let spec = MultiColorSpec {
                anchor: ColorSpec::new(a.color, a.tolerance),
                offsets: a
                    .offsets
                    .iter()
                    .map(|o| OffsetColor {
                        dx: o.dx,
                        dy: o.dy,
                        spec: ColorSpec::new(o.color, a.tolerance),
                    })
                    .collect(),
            };
            let frame = client.capture_frame()?;
            return print_point(find_multi_color(&frame, &spec, a.region.as_ref()));
        }
        Commands::CmpColor(a) => {
            let spec = ColorSpec::new(a.color, a.tolerance);
            let frame = client.capture_frame()?;
            let matched = compare_pixel(&frame, a.x, a.y, &spec);
            print_json(&serde_json::json!({ "match": matched }))?;
            return Ok(if matched { 0 } else { EXIT_NOT_FOUND });
        }
        Commands::WaitColor(a) => {
            let spec = ColorSpec::new(a.color, a.tolerance);
            let mut source = client.frame_source();
            let point = wait_for_color(
                &mut source,
                &spec,
                a.region.as_ref(),
                Duration::from_millis(a.timeout),
                Duration::from_millis(a.interval),
            );
            return print_point(point);
        }
        Commands::FindText(a) => {
            return match client.find_text(&a.text, a.region.as_ref())? {
                Some(hit) => {
                    print_json(&serde_json::json!({
                        "found": true, "text": hit.text, "x": hit.x, "y": hit.y,
                    }))?;
                    Ok(0)
                }
                None => {
                    print_json(&serde_json::json!({ "found": false }))?;
                    Ok(EXIT_NOT_FOUND)
                }
            };
        }
        Commands::Run(a) => {
            let text = std::fs::read_to_string(&a.script)
                .with_context(|| format!("reading {}", a.script.display()))?;
            let script: Script = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", a.script.display()))?;
            run_script(&mut client, &script)?;
        }
        Commands::Examples => unreachable!("handled before client setup"),
    }

    Ok(0)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a search result and map it to the exit code contract.
fn print_point(point: Option<Point>) -> anyhow::Result<i32> {
    match point {
        Some(p) => {
            print_json(&serde_json::json!({ "found": true, "x": p.x, "y": p.y }))?;
            Ok(0)
        }
        None => {
            print_json(&serde_json::json!({ "found": false }))?;
            Ok(EXIT_NOT_FOUND)
        }
    }
}
