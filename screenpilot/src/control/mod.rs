//! The input-control collaborator seam.
//!
//! Everything behind this trait speaks logical coordinates by construction:
//! the executor hands coordinates through unchanged, and implementations own
//! whatever scaling their platform needs internally.

use async_trait::async_trait;

use crate::errors::AgentError;

pub mod native;
pub mod remote;

pub use native::NativeController;
pub use remote::RemoteDisplay;

/// The common trait every input backend must implement. All coordinates and
/// key names are logical; every primitive reports success or failure.
#[async_trait]
pub trait InputController: Send + Sync {
    /// Size of the pointer-control coordinate space.
    fn logical_size(&self) -> Result<(u32, u32), AgentError>;

    /// Capture the display as PNG bytes at physical resolution.
    async fn capture(&self) -> Result<Vec<u8>, AgentError>;

    async fn move_mouse(&self, x: u32, y: u32) -> Result<(), AgentError>;

    /// Click at a position, or at the current pointer position when `None`.
    async fn click(&self, position: Option<(u32, u32)>) -> Result<(), AgentError>;

    async fn double_click(&self) -> Result<(), AgentError>;

    async fn right_click(&self) -> Result<(), AgentError>;

    async fn type_text(&self, text: &str) -> Result<(), AgentError>;

    async fn key_press(&self, key: &str) -> Result<(), AgentError>;

    async fn hot_key(&self, keys: &[String]) -> Result<(), AgentError>;
}
