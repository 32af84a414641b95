//! Wire types for the device automation service.
//!
//! The service wraps most response payloads in a `{"value": …}` envelope;
//! request bodies are plain JSON objects. Field names follow the service's
//! camelCase convention, not Rust's.

use pixelpilot_core::region::Region;
use serde::{Deserialize, Serialize};

/// Generic `{"value": …}` response envelope.
#[derive(Debug, Deserialize)]
pub struct ValueEnvelope<T> {
    pub value: T,
}

/// Body for `POST /session`.
#[derive(Debug, Serialize)]
pub struct SessionRequest {
    pub capabilities: Capabilities,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub bundle_id: String,
}

/// Response to `POST /session`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Option<String>,
}

/// Value payload of `GET /session/{id}/window/size`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

/// Body for tap-style endpoints (`wda/tap/0`, `wda/doubleTap`).
#[derive(Debug, Serialize)]
pub struct TapBody {
    pub x: u32,
    pub y: u32,
}

/// Body for `POST …/wda/touchAndHold`. Duration is in seconds.
#[derive(Debug, Serialize)]
pub struct TouchAndHoldBody {
    pub x: u32,
    pub y: u32,
    pub duration: f64,
}

/// Body for `POST …/wda/dragFromToForDuration`. Duration is in seconds.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragBody {
    pub from_x: u32,
    pub from_y: u32,
    pub to_x: u32,
    pub to_y: u32,
    pub duration: f64,
}

/// Body for the app launch/terminate endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleBody {
    pub bundle_id: String,
}

/// Value payload of `GET /status` (only the fields we surface).
#[derive(Debug, Default, Deserialize)]
pub struct StatusValue {
    #[serde(default)]
    pub ios: Option<IosInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sdk_version: Option<String>,
}

/// Body for the extended text-recognition endpoint.
#[derive(Debug, Serialize)]
pub struct OcrBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// One recognized text hit, with the center of its bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMatch {
    pub text: String,
    pub x: u32,
    pub y: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_response_reads_camel_case() {
        let resp: SessionResponse =
            serde_json::from_str(r#"{ "sessionId": "ABC-123", "capabilities": {} }"#).unwrap();
        assert_eq!(resp.session_id.as_deref(), Some("ABC-123"));

        // A session-less reply still parses.
        let resp: SessionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.session_id, None);
    }

    #[test]
    fn drag_body_writes_service_field_names() {
        let body = DragBody {
            from_x: 1,
            from_y: 2,
            to_x: 3,
            to_y: 4,
            duration: 0.5,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fromX": 1, "fromY": 2, "toX": 3, "toY": 4, "duration": 0.5
            })
        );
    }

    #[test]
    fn bundle_body_writes_bundle_id_camel_case() {
        let json = serde_json::to_value(&BundleBody {
            bundle_id: "com.apple.Preferences".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "bundleId": "com.apple.Preferences" })
        );
    }

    #[test]
    fn status_value_tolerates_missing_fields() {
        let env: ValueEnvelope<StatusValue> = serde_json::from_str(
            r#"{ "value": { "ios": { "name": "iPhone", "sdkVersion": "17.2" } } }"#,
        )
        .unwrap();
        let ios = env.value.ios.unwrap();
        assert_eq!(ios.name.as_deref(), Some("iPhone"));
        assert_eq!(ios.sdk_version.as_deref(), Some("17.2"));

        let env: ValueEnvelope<StatusValue> =
            serde_json::from_str(r#"{ "value": {} }"#).unwrap();
        assert!(env.value.ios.is_none());
    }

    #[test]
    fn screenshot_envelope_carries_base64_string() {
        let env: ValueEnvelope<String> =
            serde_json::from_str(r#"{ "value": "aGVsbG8=" }"#).unwrap();
        assert_eq!(env.value, "aGVsbG8=");
    }
}
