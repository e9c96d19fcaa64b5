//! Executes a filtered action list against the input-control layer.
//!
//! Small explicit state machine instead of implicit early termination:
//! control symbols drive the state, everything else dispatches input. One bad
//! action is recorded and skipped, never fatal for the rest of the list.

use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use crate::action::{Action, ActionList, ControlSymbol};
use crate::config::AgentConfig;
use crate::control::InputController;
use crate::errors::AgentError;

/// Terminal condition of one execution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Still inside the list (never returned, only internal).
    Running,
    /// The model declared the task complete (`DONE`).
    Done,
    /// The model declared the task impossible (`FAIL`).
    Failed,
    /// The list ran out without a terminal control symbol; the caller decides
    /// whether to loop with a fresh observation.
    Exhausted,
}

/// A dispatch that the input layer refused. Collected, not raised.
#[derive(Debug, Clone)]
pub struct ActionFailure {
    pub index: usize,
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub state: ExecutionState,
    /// Number of actions actually dispatched to the input layer.
    pub dispatched: usize,
    pub failures: Vec<ActionFailure>,
}

/// Run the list strictly in order. Coordinates pass through to the input
/// layer unchanged; its coordinate space is logical by construction. Each
/// successful dispatch is followed by the settle delay so the target UI can
/// react before the next event.
#[instrument(skip(controller, actions, config), fields(actions = actions.len()))]
pub async fn execute_actions(
    controller: &dyn InputController,
    actions: &ActionList,
    config: &AgentConfig,
) -> ExecutionReport {
    let mut state = ExecutionState::Running;
    let mut dispatched = 0;
    let mut failures = Vec::new();

    for (index, item) in actions.iter().enumerate() {
        match &item.action {
            Action::Control(ControlSymbol::Done) => {
                info!("task reported complete");
                state = ExecutionState::Done;
                break;
            }
            Action::Control(ControlSymbol::Fail) => {
                info!("task reported failed");
                state = ExecutionState::Failed;
                break;
            }
            Action::Control(ControlSymbol::Wait) => {
                debug!("pausing for screen to settle");
                sleep(config.wait_delay).await;
            }
            action => match dispatch(controller, action).await {
                Ok(()) => {
                    dispatched += 1;
                    debug!(index, action = %item.source, "action dispatched");
                    sleep(config.settle_delay).await;
                }
                Err(e) => {
                    error!(index, action = %item.source, error = %e, "action failed, continuing");
                    failures.push(ActionFailure {
                        index,
                        source: item.source.clone(),
                        error: e.to_string(),
                    });
                }
            },
        }
    }

    if state == ExecutionState::Running {
        state = ExecutionState::Exhausted;
    }

    ExecutionReport {
        state,
        dispatched,
        failures,
    }
}

async fn dispatch(controller: &dyn InputController, action: &Action) -> Result<(), AgentError> {
    match action {
        Action::Move { x, y } => controller.move_mouse(*x, *y).await,
        Action::Click { x: Some(x), y: Some(y) } => controller.click(Some((*x, *y))).await,
        Action::Click { .. } => controller.click(None).await,
        Action::DoubleClick => controller.double_click().await,
        Action::RightClick => controller.right_click().await,
        Action::TypeText(text) => controller.type_text(text).await,
        Action::KeyPress(key) => controller.key_press(key).await,
        Action::HotKey(keys) => controller.hot_key(keys).await,
        // Control symbols are handled by the loop above, never dispatched.
        Action::Control(_) => Ok(()),
    }
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionState::Running)
    }
}
