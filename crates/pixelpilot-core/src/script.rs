//! Recorded action sequences for playback.
//!
//! A script is a JSON document: an optional name plus an ordered list of
//! tagged actions. The CLI interprets the list against a device session,
//! one action at a time, stopping at the first failure. The tag format
//! keeps scripts hand-editable:
//!
//! ```json
//! {
//!   "name": "open settings",
//!   "actions": [
//!     { "action": "home" },
//!     { "action": "launch", "bundle_id": "com.apple.Preferences" },
//!     { "action": "wait_color", "color": "#FF9500",
//!       "timeout_ms": 5000, "interval_ms": 500 },
//!     { "action": "tap", "x": 200, "y": 340 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::region::Region;

/// Direction for a screen-relative swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

/// One recorded step of a device automation script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Tap at an absolute coordinate.
    Tap { x: u32, y: u32 },
    /// Double-tap at an absolute coordinate.
    DoubleTap { x: u32, y: u32 },
    /// Touch and hold.
    LongPress { x: u32, y: u32, duration_ms: u64 },
    /// Drag between two coordinates.
    Swipe {
        from_x: u32,
        from_y: u32,
        to_x: u32,
        to_y: u32,
        duration_ms: u64,
    },
    /// Screen-relative swipe in a cardinal direction.
    SwipeDir { direction: SwipeDirection },
    /// Press the home button.
    Home,
    /// Launch an app by bundle id.
    Launch { bundle_id: String },
    /// Terminate an app by bundle id.
    Terminate { bundle_id: String },
    /// Pause playback.
    Sleep { ms: u64 },
    /// Block until a color appears on screen; fails the run on timeout.
    WaitColor {
        color: Color,
        #[serde(default)]
        tolerance: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<Region>,
        timeout_ms: u64,
        interval_ms: u64,
    },
    /// Find a color on screen and tap it; fails the run when absent.
    TapColor {
        color: Color,
        #[serde(default)]
        tolerance: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<Region>,
    },
}

/// A playable sequence of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_serialize_with_snake_case_tags() {
        let json = serde_json::to_value(Action::Tap { x: 10, y: 20 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "action": "tap", "x": 10, "y": 20 })
        );

        let json = serde_json::to_value(Action::SwipeDir {
            direction: SwipeDirection::Up,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "action": "swipe_dir", "direction": "up" })
        );
    }

    #[test]
    fn wait_color_defaults_apply() {
        let action: Action = serde_json::from_str(
            r##"{ "action": "wait_color", "color": "#ff0000",
                 "timeout_ms": 3000, "interval_ms": 100 }"##,
        )
        .unwrap();
        match action {
            Action::WaitColor {
                color,
                tolerance,
                region,
                timeout_ms,
                interval_ms,
            } => {
                assert_eq!(color, Color::new(255, 0, 0));
                assert_eq!(tolerance, 0);
                assert_eq!(region, None);
                assert_eq!(timeout_ms, 3000);
                assert_eq!(interval_ms, 100);
            }
            other => panic!("expected wait_color, got {other:?}"),
        }
    }

    #[test]
    fn script_round_trips_through_json() {
        let script = Script {
            name: Some("demo".into()),
            actions: vec![
                Action::Home,
                Action::Launch {
                    bundle_id: "com.apple.Preferences".into(),
                },
                Action::WaitColor {
                    color: Color::new(255, 149, 0),
                    tolerance: 10,
                    region: Some(Region {
                        x: 0,
                        y: 100,
                        width: 375,
                        height: 200,
                    }),
                    timeout_ms: 5000,
                    interval_ms: 500,
                },
                Action::TapColor {
                    color: Color::new(255, 149, 0),
                    tolerance: 10,
                    region: None,
                },
                Action::Sleep { ms: 250 },
            ],
        };

        let json = serde_json::to_string_pretty(&script).unwrap();
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
    }

    #[test]
    fn unknown_action_tags_are_rejected() {
        let result: Result<Action, _> =
            serde_json::from_str(r#"{ "action": "teleport", "x": 1, "y": 2 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_color_in_script_is_a_parse_error() {
        let result: Result<Action, _> = serde_json::from_str(
            r##"{ "action": "tap_color", "color": "#GGGGGG" }"##,
        );
        assert!(result.is_err());
    }
}
