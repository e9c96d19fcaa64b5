//! Vision-model-driven desktop automation.
//!
//! One cycle runs capture → annotate → model request → parse → filter →
//! execute, strictly sequentially: the display is a shared resource and
//! synthetic input events are inherently ordered. Coordinates are logical
//! everywhere outside the pixel buffer; the physical capture resolution is
//! used only to derive the drawing scale and is never shown to the model or
//! the input layer.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument, warn};

pub mod action;
pub mod annotate;
pub mod config;
pub mod control;
pub mod errors;
pub mod executor;
pub mod geometry;
pub mod model;
pub mod observation;
pub mod prompt;
pub mod safety;
#[cfg(test)]
mod tests;

pub use action::{Action, ActionItem, ActionList, ControlSymbol};
pub use config::AgentConfig;
pub use control::{InputController, NativeController, RemoteDisplay};
pub use errors::AgentError;
pub use executor::{ActionFailure, ExecutionReport, ExecutionState};
pub use geometry::ScreenGeometry;
pub use model::{OpenAiVision, VisionModel};
pub use observation::{AnnotatedObservation, Observation};
pub use safety::{Rejection, RejectionReason};

/// Everything a caller needs to judge one cycle: what was parsed, what the
/// safety filter dropped, how execution ended, and where the frames were
/// persisted. Nothing is swallowed silently: every dropped or failed action
/// appears here.
#[derive(Debug)]
pub struct CycleReport {
    /// Number of actions the parser recognized before filtering.
    pub parsed: usize,
    pub rejections: Vec<Rejection>,
    pub execution: ExecutionReport,
    pub capture_path: Option<PathBuf>,
    pub annotated_path: Option<PathBuf>,
}

impl CycleReport {
    pub fn state(&self) -> ExecutionState {
        self.execution.state
    }
}

/// The main entry point: drives a desktop from natural-language instructions.
pub struct Agent {
    controller: Arc<dyn InputController>,
    model: Arc<dyn VisionModel>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        controller: Arc<dyn InputController>,
        model: Arc<dyn VisionModel>,
        config: AgentConfig,
    ) -> Self {
        Self {
            controller,
            model,
            config,
        }
    }

    /// Convenience constructor wiring the local desktop to an
    /// OpenAI-compatible vision backend.
    pub fn with_openai(config: AgentConfig) -> Result<Self, AgentError> {
        let controller = Arc::new(NativeController::new()?);
        let model = Arc::new(OpenAiVision::new(&config)?);
        Ok(Self::new(controller, model, config))
    }

    /// Capture the current screen and resolve its geometry. Geometry is
    /// recomputed on every call, since display configuration can change
    /// between cycles.
    #[instrument(skip(self))]
    pub async fn observe(&self) -> Result<Observation, AgentError> {
        let logical = self
            .controller
            .logical_size()
            .map_err(|e| AgentError::Geometry(format!("logical size unavailable: {e}")))?;

        let bytes = self.controller.capture().await?;
        let physical = png_dimensions(&bytes)?;

        let geometry = ScreenGeometry::resolve(logical, physical)?;
        info!(
            logical = format!("{}x{}", geometry.logical_width, geometry.logical_height),
            physical = format!("{}x{}", geometry.physical_width, geometry.physical_height),
            scaled = geometry.is_scaled(),
            "observation captured"
        );
        Ok(Observation::new(bytes, geometry))
    }

    /// Run one full cycle against a fresh local observation.
    #[instrument(skip(self, instruction))]
    pub async fn run_cycle(&self, instruction: &str) -> Result<CycleReport, AgentError> {
        let observation = self.observe().await?;
        self.run_cycle_with(observation, instruction).await
    }

    /// Run one cycle against a caller-supplied observation (e.g. from a
    /// [`RemoteDisplay`]). The observation is consumed: it belongs to exactly
    /// this cycle.
    #[instrument(skip(self, observation, instruction))]
    pub async fn run_cycle_with(
        &self,
        observation: Observation,
        instruction: &str,
    ) -> Result<CycleReport, AgentError> {
        let annotated = annotate::annotate_observation(&observation)?;

        let (capture_path, annotated_path) = self.persist_frames(&observation, &annotated);

        let request = prompt::build_request(&annotated, instruction, &self.config);
        let response = self.model.generate(&request).await?;

        let actions = action::parse_response(&response);
        let parsed = actions.len();
        if parsed == 0 {
            // Not an error: the caller may retry with a clarified instruction.
            info!("model response contained no recognizable actions");
        }

        let (accepted, rejections) = safety::filter_actions(actions);
        let execution =
            executor::execute_actions(self.controller.as_ref(), &accepted, &self.config).await;

        info!(
            parsed,
            rejected = rejections.len(),
            dispatched = execution.dispatched,
            state = ?execution.state,
            "cycle finished"
        );

        Ok(CycleReport {
            parsed,
            rejections,
            execution,
            capture_path,
            annotated_path,
        })
    }

    /// Artifact persistence is best-effort: a full disk must not abort an
    /// otherwise healthy cycle.
    fn persist_frames(
        &self,
        observation: &Observation,
        annotated: &AnnotatedObservation,
    ) -> (Option<PathBuf>, Option<PathBuf>) {
        let Some(dir) = &self.config.output_dir else {
            return (None, None);
        };

        let capture_path = observation::write_artifact(
            dir,
            "capture",
            observation.captured_at,
            &observation.image_bytes,
        )
        .map_err(|e| warn!(error = %e, "failed to persist capture"))
        .ok();

        let annotated_path = observation::write_artifact(
            dir,
            "annotated",
            annotated.captured_at,
            &annotated.image_bytes,
        )
        .map_err(|e| warn!(error = %e, "failed to persist annotated frame"))
        .ok();

        (capture_path, annotated_path)
    }
}

/// Header-only dimension probe for the captured frame.
fn png_dimensions(bytes: &[u8]) -> Result<(u32, u32), AgentError> {
    image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AgentError::Geometry(format!("cannot read capture header: {e}")))?
        .into_dimensions()
        .map_err(|e| AgentError::Geometry(format!("cannot determine capture size: {e}")))
}
