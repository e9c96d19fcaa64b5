//! Local desktop backend: enigo for synthetic input, xcap for capture.

use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use image::ImageFormat;
use tracing::debug;

use super::InputController;
use crate::errors::AgentError;

/// Controls the local display. Input goes through a single `Enigo` handle
/// behind a mutex: synthetic events are inherently ordered and target the
/// shared input focus, so dispatches must never interleave.
pub struct NativeController {
    enigo: Mutex<Enigo>,
}

impl NativeController {
    pub fn new() -> Result<Self, AgentError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| AgentError::InputControl(format!("cannot initialize input: {e:?}")))?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn with_enigo<T>(
        &self,
        f: impl FnOnce(&mut Enigo) -> Result<T, AgentError>,
    ) -> Result<T, AgentError> {
        let mut enigo = self
            .enigo
            .lock()
            .map_err(|_| AgentError::InputControl("input handle lock poisoned".to_string()))?;
        f(&mut enigo)
    }

    fn primary_monitor() -> Result<xcap::Monitor, AgentError> {
        let monitors = xcap::Monitor::all()
            .map_err(|e| AgentError::InputControl(format!("cannot enumerate monitors: {e}")))?;
        monitors
            .into_iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .ok_or_else(|| AgentError::InputControl("no primary monitor found".to_string()))
    }
}

fn input_err(e: impl std::fmt::Debug) -> AgentError {
    AgentError::InputControl(format!("{e:?}"))
}

/// Map a logical key name onto an enigo key. Single characters fall through
/// as unicode input.
fn map_key(name: &str) -> Result<Key, AgentError> {
    match name.to_lowercase().as_str() {
        "enter" | "return" => Ok(Key::Return),
        "tab" => Ok(Key::Tab),
        "escape" | "esc" => Ok(Key::Escape),
        "backspace" => Ok(Key::Backspace),
        "delete" | "del" => Ok(Key::Delete),
        "space" => Ok(Key::Space),
        "control" | "ctrl" => Ok(Key::Control),
        "shift" => Ok(Key::Shift),
        "alt" | "option" => Ok(Key::Alt),
        "meta" | "command" | "cmd" | "super" | "win" | "windows" => Ok(Key::Meta),
        "up" => Ok(Key::UpArrow),
        "down" => Ok(Key::DownArrow),
        "left" => Ok(Key::LeftArrow),
        "right" => Ok(Key::RightArrow),
        "home" => Ok(Key::Home),
        "end" => Ok(Key::End),
        "pageup" => Ok(Key::PageUp),
        "pagedown" => Ok(Key::PageDown),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok(Key::Unicode(ch)),
                _ => Err(AgentError::InputControl(format!(
                    "unsupported key name: {name}"
                ))),
            }
        }
    }
}

#[async_trait]
impl InputController for NativeController {
    fn logical_size(&self) -> Result<(u32, u32), AgentError> {
        // The display size as the input layer itself sees it, so it is in the
        // same space as move_mouse coordinates by construction.
        let (w, h) = self.with_enigo(|enigo| enigo.main_display().map_err(input_err))?;
        if w <= 0 || h <= 0 {
            return Err(AgentError::InputControl(format!(
                "input layer reported display size {w}x{h}"
            )));
        }
        Ok((w as u32, h as u32))
    }

    async fn capture(&self) -> Result<Vec<u8>, AgentError> {
        let monitor = Self::primary_monitor()?;
        let image = monitor
            .capture_image()
            .map_err(|e| AgentError::InputControl(format!("capture failed: {e}")))?;

        debug!(
            width = image.width(),
            height = image.height(),
            "captured primary monitor"
        );

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| AgentError::InputControl(format!("cannot encode capture: {e}")))?;
        Ok(bytes)
    }

    async fn move_mouse(&self, x: u32, y: u32) -> Result<(), AgentError> {
        self.with_enigo(|enigo| {
            enigo
                .move_mouse(x as i32, y as i32, Coordinate::Abs)
                .map_err(input_err)
        })
    }

    async fn click(&self, position: Option<(u32, u32)>) -> Result<(), AgentError> {
        self.with_enigo(|enigo| {
            if let Some((x, y)) = position {
                enigo
                    .move_mouse(x as i32, y as i32, Coordinate::Abs)
                    .map_err(input_err)?;
            }
            enigo.button(Button::Left, Direction::Click).map_err(input_err)
        })
    }

    async fn double_click(&self) -> Result<(), AgentError> {
        self.with_enigo(|enigo| {
            enigo.button(Button::Left, Direction::Click).map_err(input_err)?;
            enigo.button(Button::Left, Direction::Click).map_err(input_err)
        })
    }

    async fn right_click(&self) -> Result<(), AgentError> {
        self.with_enigo(|enigo| enigo.button(Button::Right, Direction::Click).map_err(input_err))
    }

    async fn type_text(&self, text: &str) -> Result<(), AgentError> {
        self.with_enigo(|enigo| enigo.text(text).map_err(input_err))
    }

    async fn key_press(&self, key: &str) -> Result<(), AgentError> {
        let key = map_key(key)?;
        self.with_enigo(|enigo| enigo.key(key, Direction::Click).map_err(input_err))
    }

    async fn hot_key(&self, keys: &[String]) -> Result<(), AgentError> {
        if keys.is_empty() {
            return Err(AgentError::InvalidArgument("empty hotkey".to_string()));
        }
        let mapped = keys
            .iter()
            .map(|k| map_key(k))
            .collect::<Result<Vec<_>, _>>()?;

        self.with_enigo(|enigo| {
            let (last, modifiers) = mapped.split_last().expect("checked non-empty");
            for key in modifiers {
                enigo.key(*key, Direction::Press).map_err(input_err)?;
            }
            let result = enigo.key(*last, Direction::Click).map_err(input_err);
            // Always release held modifiers, even when the final press failed.
            for key in modifiers.iter().rev() {
                let _ = enigo.key(*key, Direction::Release);
            }
            result
        })
    }
}
