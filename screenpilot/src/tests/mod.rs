mod executor_tests;

use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::control::InputController;
use crate::errors::AgentError;
use crate::model::VisionModel;
use crate::prompt::ModelRequest;

// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

pub fn encoded_frame(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// What the mock input layer received, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Move(u32, u32),
    Click(Option<(u32, u32)>),
    DoubleClick,
    RightClick,
    Type(String),
    Press(String),
    HotKey(Vec<String>),
}

/// Records every dispatch; optionally refuses clicks to exercise the
/// continue-on-failure path.
pub struct MockController {
    pub logical: (u32, u32),
    pub frame: Vec<u8>,
    pub fail_clicks: bool,
    calls: Mutex<Vec<Dispatched>>,
}

impl MockController {
    pub fn new(logical: (u32, u32), physical: (u32, u32)) -> Self {
        Self {
            logical,
            frame: encoded_frame(physical.0, physical.1),
            fail_clicks: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_clicks(mut self) -> Self {
        self.fail_clicks = true;
        self
    }

    pub fn calls(&self) -> Vec<Dispatched> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Dispatched) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InputController for MockController {
    fn logical_size(&self) -> Result<(u32, u32), AgentError> {
        Ok(self.logical)
    }

    async fn capture(&self) -> Result<Vec<u8>, AgentError> {
        Ok(self.frame.clone())
    }

    async fn move_mouse(&self, x: u32, y: u32) -> Result<(), AgentError> {
        self.record(Dispatched::Move(x, y));
        Ok(())
    }

    async fn click(&self, position: Option<(u32, u32)>) -> Result<(), AgentError> {
        if self.fail_clicks {
            return Err(AgentError::InputControl("click refused".to_string()));
        }
        self.record(Dispatched::Click(position));
        Ok(())
    }

    async fn double_click(&self) -> Result<(), AgentError> {
        self.record(Dispatched::DoubleClick);
        Ok(())
    }

    async fn right_click(&self) -> Result<(), AgentError> {
        self.record(Dispatched::RightClick);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), AgentError> {
        self.record(Dispatched::Type(text.to_string()));
        Ok(())
    }

    async fn key_press(&self, key: &str) -> Result<(), AgentError> {
        self.record(Dispatched::Press(key.to_string()));
        Ok(())
    }

    async fn hot_key(&self, keys: &[String]) -> Result<(), AgentError> {
        self.record(Dispatched::HotKey(keys.to_vec()));
        Ok(())
    }
}

/// Vision model stub returning a canned response (or a canned failure).
pub struct MockModel {
    response: Result<String, String>,
}

impl MockModel {
    pub fn replying(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl VisionModel for MockModel {
    async fn generate(&self, _request: &ModelRequest) -> Result<String, AgentError> {
        self.response
            .clone()
            .map_err(AgentError::ModelUnavailable)
    }
}
