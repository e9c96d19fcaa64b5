//! Reconciles the logical pointer-control space with the physical capture space.
//!
//! The pointer layer addresses the screen in logical points while captures come
//! back in physical pixels, which differ on HiDPI displays. Everything the
//! model sees and everything the input layer receives stays logical; the
//! physical size is used only to derive the drawing scale.

use serde::{Deserialize, Serialize};

use crate::errors::AgentError;

/// Relationship between the logical screen and one physical capture.
///
/// Built once per cycle from a fresh size query and capture, and thrown away
/// with the cycle: display configuration can change between captures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    pub logical_width: u32,
    pub logical_height: u32,
    pub physical_width: u32,
    pub physical_height: u32,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ScreenGeometry {
    /// Derive the geometry for one capture cycle.
    ///
    /// Fails when either size has a zero dimension or when the capture is
    /// smaller than the logical screen: a sub-logical capture means the size
    /// query and the capture disagree about the display, and any coordinate
    /// mapping built on top of it would be unsound.
    pub fn resolve(logical: (u32, u32), physical: (u32, u32)) -> Result<Self, AgentError> {
        let (logical_width, logical_height) = logical;
        let (physical_width, physical_height) = physical;

        if logical_width == 0 || logical_height == 0 {
            return Err(AgentError::Geometry(format!(
                "logical screen size has a zero dimension: {logical_width}x{logical_height}"
            )));
        }
        if physical_width == 0 || physical_height == 0 {
            return Err(AgentError::Geometry(format!(
                "capture has a zero dimension: {physical_width}x{physical_height}"
            )));
        }
        if physical_width < logical_width || physical_height < logical_height {
            return Err(AgentError::Geometry(format!(
                "capture {physical_width}x{physical_height} is smaller than the logical screen {logical_width}x{logical_height}"
            )));
        }

        Ok(Self {
            logical_width,
            logical_height,
            physical_width,
            physical_height,
            scale_x: f64::from(physical_width) / f64::from(logical_width),
            scale_y: f64::from(physical_height) / f64::from(logical_height),
        })
    }

    /// Map a logical point into the physical pixel buffer.
    pub fn to_physical(&self, x: u32, y: u32) -> (f64, f64) {
        (f64::from(x) * self.scale_x, f64::from(y) * self.scale_y)
    }

    /// Whether the display is running at a non-1.0 scale (Retina/HiDPI).
    pub fn is_scaled(&self) -> bool {
        self.scale_x != 1.0 || self.scale_y != 1.0
    }
}
