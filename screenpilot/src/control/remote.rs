//! Capture-only remote display target (VM or container desktop).
//!
//! The remote side is opaque beyond its screenshot endpoint; it serves frames
//! at its own logical resolution, so the geometry for a remote observation is
//! always scale 1.0 with the size taken from the frame itself.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::errors::AgentError;
use crate::geometry::ScreenGeometry;
use crate::observation::Observation;

pub struct RemoteDisplay {
    client: reqwest::Client,
    screenshot_url: String,
}

impl RemoteDisplay {
    /// `base_url` is the display server root, e.g. `http://localhost:55000`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AgentError> {
        if base_url.is_empty() {
            return Err(AgentError::InvalidArgument(
                "remote display base URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::InvalidArgument(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            screenshot_url: format!("{}/screenshot", base_url.trim_end_matches('/')),
        })
    }

    /// Fetch one frame from the remote display.
    #[instrument(skip(self))]
    pub async fn screenshot(&self) -> Result<Vec<u8>, AgentError> {
        let response = self
            .client
            .get(&self.screenshot_url)
            .send()
            .await
            .map_err(|e| AgentError::InputControl(format!("remote screenshot failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::InputControl(format!(
                "remote screenshot returned {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AgentError::InputControl(format!("remote screenshot body: {e}")))?;

        debug!(size = bytes.len(), "remote frame fetched");
        Ok(bytes.to_vec())
    }

    /// Fetch a frame and wrap it as an [`Observation`] with unit scale.
    pub async fn observe(&self) -> Result<Observation, AgentError> {
        let bytes = self.screenshot().await?;
        let (width, height) = image::load_from_memory(&bytes)
            .map(|img| (img.width(), img.height()))
            .map_err(|e| {
                AgentError::Geometry(format!("cannot determine remote display size: {e}"))
            })?;

        let geometry = ScreenGeometry::resolve((width, height), (width, height))?;
        Ok(Observation::new(bytes, geometry))
    }
}
