//! CLI argument parsing with clap derive macros.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use pixelpilot_core::color::Color;
use pixelpilot_core::region::Region;

const TOLERANCE_HELP: &str = "Per-channel color tolerance (0 = exact) [default: 10]";
const REGION_HELP: &str = "Restrict the search to a sub-rectangle of the screen";

/// Device automation over a screen-control HTTP service.
///
/// Drive a phone screen programmatically: send gestures, capture the
/// framebuffer, and locate colors or pixel patterns in captured frames so
/// scripts can react to on-screen state.
///
/// Exit codes: 0 on success (target found where applicable), 1 when a
/// search legitimately found nothing, 2 on errors.
#[derive(Debug, Parser)]
#[command(name = "pixelpilot", version)]
pub struct Cli {
    /// Base URL of the device automation service
    #[arg(
        short,
        long,
        global = true,
        default_value = "http://localhost:8100",
        value_name = "URL"
    )]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show service connectivity and device info
    Status,

    /// Report the device screen size in points
    ScreenSize,

    /// Tap at a coordinate
    Tap(TapArgs),

    /// Double-tap at a coordinate
    DoubleTap(TapArgs),

    /// Touch and hold at a coordinate
    LongPress(LongPressArgs),

    /// Drag from one coordinate to another
    Swipe(SwipeArgs),

    /// Swipe across the screen in a cardinal direction
    SwipeDir(SwipeDirArgs),

    /// Press the home button
    Home,

    /// Launch an app by bundle id
    Launch(BundleArgs),

    /// Terminate an app by bundle id
    Terminate(BundleArgs),

    /// Capture a screenshot (base64 to stdout, or PNG to a file)
    Screenshot(ScreenshotArgs),

    /// Read the color of one pixel
    Pixel(PixelArgs),

    /// Find the first pixel of a color on screen
    #[command(after_help = "\
The screen is scanned top-to-bottom, left-to-right, and the first matching
pixel wins.

Examples:
  pixelpilot find-color '#FF5500'                 # Exact-ish match (tolerance 10)
  pixelpilot find-color '#FF5500' -t 0            # Exact match
  pixelpilot find-color FF5500 -r 0,100,375,200   # Only search a sub-rectangle")]
    FindColor(FindColorArgs),

    /// Find an anchor color with offset colors around it
    #[command(after_help = "\
Each --offset names a pixel relative to the anchor that must also match:
dx,dy:#RRGGBB. The reported point is the anchor's coordinate.

Examples:
  pixelpilot find-multi '#FF5500' -o 10,0:'#00FF00'
  pixelpilot find-multi '#FF5500' -o 10,0:'#00FF00' -o -4,2:'#0000FF' -t 5")]
    FindMulti(FindMultiArgs),

    /// Compare one pixel against an expected color
    CmpColor(CmpColorArgs),

    /// Wait for a color to appear on screen
    #[command(after_help = "\
Captures a fresh screenshot every interval until the color appears or the
timeout elapses. At least one scan always runs, even with --timeout 0.

Examples:
  pixelpilot wait-color '#FF5500'                    # Up to 10s, every 500ms
  pixelpilot wait-color '#FF5500' -T 3000 -i 100     # Tighter loop
  pixelpilot wait-color '#FF5500' -r 0,0,375,100     # Only watch the top strip")]
    WaitColor(WaitColorArgs),

    /// Find text on screen via the service's text recognition
    FindText(FindTextArgs),

    /// Run a recorded script of actions
    #[command(after_help = "\
The script is a JSON file: {\"name\": …, \"actions\": [{\"action\": \"tap\",
\"x\": 100, \"y\": 200}, …]}. Playback stops at the first failing action.

Example:
  pixelpilot run demo-script.json")]
    Run(RunArgs),

    /// Show an end-to-end usage example
    Examples,
}

#[derive(Debug, clap::Args)]
pub struct TapArgs {
    /// X coordinate in screen points
    pub x: u32,

    /// Y coordinate in screen points
    pub y: u32,
}

#[derive(Debug, clap::Args)]
pub struct LongPressArgs {
    /// X coordinate in screen points
    pub x: u32,

    /// Y coordinate in screen points
    pub y: u32,

    /// Hold duration in milliseconds
    #[arg(long, default_value_t = 1000, value_name = "MS")]
    pub duration: u64,
}

#[derive(Debug, clap::Args)]
pub struct SwipeArgs {
    /// Start X coordinate
    pub from_x: u32,

    /// Start Y coordinate
    pub from_y: u32,

    /// End X coordinate
    pub to_x: u32,

    /// End Y coordinate
    pub to_y: u32,

    /// Swipe duration in milliseconds
    #[arg(long, default_value_t = 500, value_name = "MS")]
    pub duration: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, clap::Args)]
pub struct SwipeDirArgs {
    /// Direction to swipe
    #[arg(value_enum)]
    pub direction: Direction,

    /// Swipe duration in milliseconds
    #[arg(long, default_value_t = 500, value_name = "MS")]
    pub duration: u64,
}

#[derive(Debug, clap::Args)]
pub struct BundleArgs {
    /// App bundle identifier (e.g., com.apple.Preferences)
    pub bundle_id: String,
}

#[derive(Debug, clap::Args)]
pub struct ScreenshotArgs {
    /// Write the PNG here instead of printing base64
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct PixelArgs {
    /// X coordinate in screen points
    pub x: u32,

    /// Y coordinate in screen points
    pub y: u32,
}

#[derive(Debug, clap::Args)]
pub struct FindColorArgs {
    /// Target color (#RRGGBB)
    pub color: Color,

    #[arg(short, long, default_value_t = 10, help = TOLERANCE_HELP)]
    pub tolerance: u8,

    #[arg(short, long, value_parser = parse_region, value_name = "X,Y,W,H", help = REGION_HELP)]
    pub region: Option<Region>,
}

#[derive(Debug, clap::Args)]
pub struct FindMultiArgs {
    /// Anchor color (#RRGGBB)
    pub color: Color,

    /// Offset color in dx,dy:#RRGGBB form; repeatable
    #[arg(
        short,
        long = "offset",
        value_name = "DX,DY:COLOR",
        required = true,
        allow_hyphen_values = true
    )]
    pub offsets: Vec<OffsetArg>,

    #[arg(short, long, default_value_t = 10, help = TOLERANCE_HELP)]
    pub tolerance: u8,

    #[arg(short, long, value_parser = parse_region, value_name = "X,Y,W,H", help = REGION_HELP)]
    pub region: Option<Region>,
}

#[derive(Debug, clap::Args)]
pub struct CmpColorArgs {
    /// X coordinate in screen points
    pub x: u32,

    /// Y coordinate in screen points
    pub y: u32,

    /// Expected color (#RRGGBB)
    pub color: Color,

    #[arg(short, long, default_value_t = 10, help = TOLERANCE_HELP)]
    pub tolerance: u8,
}

#[derive(Debug, clap::Args)]
pub struct WaitColorArgs {
    /// Target color (#RRGGBB)
    pub color: Color,

    #[arg(short, long, default_value_t = 10, help = TOLERANCE_HELP)]
    pub tolerance: u8,

    #[arg(short, long, value_parser = parse_region, value_name = "X,Y,W,H", help = REGION_HELP)]
    pub region: Option<Region>,

    /// Give up after this many milliseconds
    #[arg(short = 'T', long, default_value_t = 10000, value_name = "MS")]
    pub timeout: u64,

    /// Delay between screenshots in milliseconds
    #[arg(short, long, default_value_t = 500, value_name = "MS")]
    pub interval: u64,
}

#[derive(Debug, clap::Args)]
pub struct FindTextArgs {
    /// Text to look for (substring match over recognized text)
    pub text: String,

    #[arg(short, long, value_parser = parse_region, value_name = "X,Y,W,H", help = REGION_HELP)]
    pub region: Option<Region>,
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Script file (JSON)
    pub script: PathBuf,
}

/// An offset color flag: `dx,dy:#RRGGBB`, as recorded by multi-point
/// color picks. The tolerance comes from the command-level flag.
#[derive(Debug, Clone)]
pub struct OffsetArg {
    pub dx: i32,
    pub dy: i32,
    pub color: Color,
}

impl FromStr for OffsetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (position, color) = s
            .split_once(':')
            .ok_or_else(|| format!("expected dx,dy:#RRGGBB, got '{s}'"))?;
        let (dx, dy) = position
            .split_once(',')
            .ok_or_else(|| format!("expected dx,dy before the ':', got '{position}'"))?;
        let dx = dx
            .trim()
            .parse()
            .map_err(|e| format!("bad dx '{dx}': {e}"))?;
        let dy = dy
            .trim()
            .parse()
            .map_err(|e| format!("bad dy '{dy}': {e}"))?;
        let color = color
            .trim()
            .parse()
            .map_err(|e| format!("bad color '{color}': {e}"))?;
        Ok(OffsetArg { dx, dy, color })
    }
}

/// Parse an `x,y,width,height` region flag.
fn parse_region(s: &str) -> Result<Region, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err(format!("expected x,y,width,height, got '{s}'"));
    }
    let mut values = [0u32; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|e| format!("bad region component '{part}': {e}"))?;
    }
    Ok(Region {
        x: values[0],
        y: values[1],
        width: values[2],
        height: values[3],
    })
}

/// End-to-end example text for the `examples` command.
pub const EXAMPLES_TEXT: &str = r#"End-to-end example: open Settings and tap a found target

# 1. Check the service is reachable (run the agent on the device first)
pixelpilot status

# 2. Go to the home screen and open Settings
pixelpilot home
pixelpilot launch com.apple.Preferences

# 3. Wait for the orange "Notifications" icon to render
pixelpilot wait-color '#FF9500' -T 5000 -i 200

# 4. Find it again and tap it
POS=$(pixelpilot find-color '#FF9500')
X=$(echo "$POS" | jq -r '.x')
Y=$(echo "$POS" | jq -r '.y')
pixelpilot tap "$X" "$Y"

# 5. Capture the result
pixelpilot screenshot -o after-tap.png

# Searches exit 1 when the target is absent, so scripts can branch:
pixelpilot find-color '#00FF00' || echo "no green on screen"
"#;
