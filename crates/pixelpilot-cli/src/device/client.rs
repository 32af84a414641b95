//! Blocking HTTP client for the device automation service.
//!
//! One client drives one service instance. A session is created lazily by
//! the first call that needs one; the service's session id and reported
//! screen size are cached on the client. Every network failure is a typed
//! [`DeviceError`] at the call site, so "service unreachable" can never
//! read as "target not on screen".

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pixelpilot_core::color::Color;
use pixelpilot_core::frame::{Frame, FrameError, FrameSource};
use pixelpilot_core::region::Region;
use pixelpilot_core::script::SwipeDirection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::device::protocol::{
    BundleBody, Capabilities, DragBody, IosInfo, OcrBody, SessionRequest, SessionResponse,
    StatusValue, TapBody, TextMatch, TouchAndHoldBody, ValueEnvelope, WindowSize,
};

/// Per-request timeout; long gestures extend it by their own duration.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Screen size assumed until the service reports the real one.
const DEFAULT_SCREEN: (u32, u32) = (375, 667);

/// App used for lazily created sessions when the caller names none.
const DEFAULT_BUNDLE_ID: &str = "com.apple.Preferences";

/// Errors talking to the device service.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to build HTTP client: {0}")]
    Init(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("{endpoint} response carried no session id")]
    NoSession { endpoint: String },
    #[error("screenshot is not decodable: {0}")]
    BadScreenshot(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Device identity and screen geometry, as reported by `GET /status`.
#[derive(Debug, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub os_version: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

/// Client for one device automation service.
pub struct DeviceClient {
    http: reqwest::blocking::Client,
    base_url: String,
    session_id: Option<String>,
    screen: (u32, u32),
}

impl DeviceClient {
    pub fn new(base_url: &str) -> Result<Self, DeviceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DeviceError::Init)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: None,
            screen: DEFAULT_SCREEN,
        })
    }

    // ----- session bootstrap -----

    /// Create a session for `bundle_id`, replacing any existing one, and
    /// refresh the cached screen size.
    pub fn create_session(&mut self, bundle_id: &str) -> Result<(), DeviceError> {
        let body = SessionRequest {
            capabilities: Capabilities {
                bundle_id: bundle_id.to_string(),
            },
        };
        let resp: SessionResponse = self.post_json("/session", &body)?;
        let id = resp.session_id.ok_or_else(|| DeviceError::NoSession {
            endpoint: "/session".into(),
        })?;
        info!(session = %id, "created device session");
        self.session_id = Some(id);
        self.refresh_screen_size();
        Ok(())
    }

    /// Session id, creating a default session on first use.
    fn session(&mut self) -> Result<String, DeviceError> {
        if let Some(id) = &self.session_id {
            return Ok(id.clone());
        }
        self.create_session(DEFAULT_BUNDLE_ID)?;
        self.session_id.clone().ok_or_else(|| DeviceError::NoSession {
            endpoint: "/session".into(),
        })
    }

    /// Best-effort size refresh; keeps the cached size on failure.
    fn refresh_screen_size(&mut self) {
        let Some(id) = self.session_id.clone() else {
            return;
        };
        let path = format!("/session/{id}/window/size");
        match self.get_json::<ValueEnvelope<WindowSize>>(&path) {
            Ok(env) => self.screen = (env.value.width, env.value.height),
            Err(e) => warn!("could not refresh screen size: {e}"),
        }
    }

    /// Current screen size in points, as reported by the service.
    pub fn screen_size(&mut self) -> Result<(u32, u32), DeviceError> {
        self.session()?;
        self.refresh_screen_size();
        Ok(self.screen)
    }

    /// Identity probe; fails when the service is unreachable.
    pub fn device_info(&self) -> Result<DeviceInfo, DeviceError> {
        let env: ValueEnvelope<StatusValue> = self.get_json("/status")?;
        let ios = env.value.ios.unwrap_or_else(IosInfo::default);
        Ok(DeviceInfo {
            name: ios.name.unwrap_or_else(|| "unknown".into()),
            os_version: ios.sdk_version.unwrap_or_else(|| "unknown".into()),
            screen_width: self.screen.0,
            screen_height: self.screen.1,
        })
    }

    // ----- gestures -----

    pub fn tap(&mut self, x: u32, y: u32) -> Result<(), DeviceError> {
        let id = self.session()?;
        self.post_ok(&format!("/session/{id}/wda/tap/0"), &TapBody { x, y }, None)
    }

    pub fn double_tap(&mut self, x: u32, y: u32) -> Result<(), DeviceError> {
        let id = self.session()?;
        self.post_ok(
            &format!("/session/{id}/wda/doubleTap"),
            &TapBody { x, y },
            None,
        )
    }

    pub fn touch_and_hold(&mut self, x: u32, y: u32, hold: Duration) -> Result<(), DeviceError> {
        let id = self.session()?;
        self.post_ok(
            &format!("/session/{id}/wda/touchAndHold"),
            &TouchAndHoldBody {
                x,
                y,
                duration: hold.as_secs_f64(),
            },
            Some(hold),
        )
    }

    pub fn drag(
        &mut self,
        from: (u32, u32),
        to: (u32, u32),
        duration: Duration,
    ) -> Result<(), DeviceError> {
        let id = self.session()?;
        self.post_ok(
            &format!("/session/{id}/wda/dragFromToForDuration"),
            &DragBody {
                from_x: from.0,
                from_y: from.1,
                to_x: to.0,
                to_y: to.1,
                duration: duration.as_secs_f64(),
            },
            Some(duration),
        )
    }

    /// Screen-relative swipe: vertical swipes run along the center column
    /// between 70% and 30% of the height, horizontal ones along the center
    /// row between 80% and 20% of the width.
    pub fn swipe_direction(
        &mut self,
        direction: SwipeDirection,
        duration: Duration,
    ) -> Result<(), DeviceError> {
        self.session()?;
        let (w, h) = self.screen;
        let (from, to) = match direction {
            SwipeDirection::Up => ((w / 2, fraction(h, 0.7)), (w / 2, fraction(h, 0.3))),
            SwipeDirection::Down => ((w / 2, fraction(h, 0.3)), (w / 2, fraction(h, 0.7))),
            SwipeDirection::Left => ((fraction(w, 0.8), h / 2), (fraction(w, 0.2), h / 2)),
            SwipeDirection::Right => ((fraction(w, 0.2), h / 2), (fraction(w, 0.8), h / 2)),
        };
        self.drag(from, to, duration)
    }

    // ----- app lifecycle -----

    pub fn launch_app(&mut self, bundle_id: &str) -> Result<(), DeviceError> {
        let id = self.session()?;
        self.post_ok(
            &format!("/session/{id}/wda/apps/launch"),
            &BundleBody {
                bundle_id: bundle_id.to_string(),
            },
            None,
        )
    }

    pub fn terminate_app(&mut self, bundle_id: &str) -> Result<(), DeviceError> {
        let id = self.session()?;
        self.post_ok(
            &format!("/session/{id}/wda/apps/terminate"),
            &BundleBody {
                bundle_id: bundle_id.to_string(),
            },
            None,
        )
    }

    /// Return to the home screen. Works without a session.
    pub fn home(&self) -> Result<(), DeviceError> {
        self.post_bare("/wda/homescreen")
    }

    // ----- screen capture -----

    /// Capture the screen as the service's base64 PNG string.
    pub fn screenshot_base64(&self) -> Result<String, DeviceError> {
        let env: ValueEnvelope<String> = self.get_json("/screenshot")?;
        Ok(env.value)
    }

    /// Capture the screen as raw PNG bytes.
    pub fn screenshot_png(&self) -> Result<Vec<u8>, DeviceError> {
        let b64 = self.screenshot_base64()?;
        BASE64
            .decode(b64.as_bytes())
            .map_err(|e| DeviceError::BadScreenshot(format!("invalid base64: {e}")))
    }

    /// Capture and decode the screen into an RGB frame for scanning.
    pub fn capture_frame(&self) -> Result<Frame, DeviceError> {
        decode_frame(&self.screenshot_png()?)
    }

    /// Color of one pixel of the current screen; `None` when (x, y) lies
    /// outside the captured frame.
    pub fn pixel_color(&self, x: u32, y: u32) -> Result<Option<Color>, DeviceError> {
        Ok(self.capture_frame()?.pixel(x, y))
    }

    /// Frame source backed by this client's screenshot capture, for use
    /// with the core poll loop.
    pub fn frame_source(&self) -> ScreenSource<'_> {
        ScreenSource { client: self }
    }

    // ----- text recognition (service-side) -----

    /// Text recognition over the current screen. Recognition runs on the
    /// service's extended endpoint; this client only forwards the region
    /// and parses the hits.
    pub fn ocr(&mut self, region: Option<&Region>) -> Result<Vec<TextMatch>, DeviceError> {
        let id = self.session()?;
        let body = OcrBody {
            region: region.copied(),
        };
        let env: ValueEnvelope<Vec<TextMatch>> =
            self.post_json(&format!("/session/{id}/wda/ocr"), &body)?;
        Ok(env.value)
    }

    /// First recognized hit containing `text`.
    pub fn find_text(
        &mut self,
        text: &str,
        region: Option<&Region>,
    ) -> Result<Option<TextMatch>, DeviceError> {
        Ok(self.ocr(region)?.into_iter().find(|m| m.text.contains(text)))
    }

    // ----- request plumbing -----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DeviceError> {
        let url = self.url(path);
        debug!("GET {url}");
        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| transport(path, e))?;
        check_status(path, &resp)?;
        resp.json().map_err(|e| transport(path, e))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeviceError> {
        let url = self.url(path);
        debug!("POST {url}");
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| transport(path, e))?;
        check_status(path, &resp)?;
        resp.json().map_err(|e| transport(path, e))
    }

    /// POST where only the HTTP status matters. `extra_timeout` stretches
    /// the request deadline for gestures that block for their own duration.
    fn post_ok<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        extra_timeout: Option<Duration>,
    ) -> Result<(), DeviceError> {
        let url = self.url(path);
        debug!("POST {url}");
        let mut req = self.http.post(&url).json(body);
        if let Some(extra) = extra_timeout {
            req = req.timeout(REQUEST_TIMEOUT + extra);
        }
        let resp = req.send().map_err(|e| transport(path, e))?;
        check_status(path, &resp)
    }

    fn post_bare(&self, path: &str) -> Result<(), DeviceError> {
        let url = self.url(path);
        debug!("POST {url}");
        let resp = self
            .http
            .post(&url)
            .send()
            .map_err(|e| transport(path, e))?;
        check_status(path, &resp)
    }
}

fn transport(path: &str, source: reqwest::Error) -> DeviceError {
    DeviceError::Transport {
        endpoint: path.to_string(),
        source,
    }
}

fn check_status(path: &str, resp: &reqwest::blocking::Response) -> Result<(), DeviceError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DeviceError::Status {
            endpoint: path.to_string(),
            status,
        })
    }
}

fn fraction(v: u32, f: f64) -> u32 {
    (f64::from(v) * f) as u32
}

/// Decode a PNG screenshot into an RGB frame. Alpha, if present, is
/// discarded before scanning.
fn decode_frame(png: &[u8]) -> Result<Frame, DeviceError> {
    let img = image::load_from_memory(png)
        .map_err(|e| DeviceError::BadScreenshot(e.to_string()))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::from_rgb(width, height, rgb.into_raw())?)
}

/// Adapter exposing screenshot capture as a core [`FrameSource`].
pub struct ScreenSource<'a> {
    client: &'a DeviceClient,
}

impl FrameSource for ScreenSource<'_> {
    fn acquire(&mut self) -> Result<Frame, FrameError> {
        self.client
            .capture_frame()
            .map_err(|e| FrameError::Acquisition(e.to_string()))
    }
}
