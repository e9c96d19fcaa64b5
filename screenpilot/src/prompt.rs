//! Shapes the multimodal request for the vision model.
//!
//! Pure payload assembly: the network round trip lives behind the
//! [`VisionModel`](crate::model::VisionModel) trait. The resolution quoted to
//! the model is always the logical one; quoting the physical capture size
//! here is exactly the class of bug that produces offset clicks on HiDPI
//! displays.

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;

use crate::config::AgentConfig;
use crate::observation::AnnotatedObservation;

/// System instruction describing the closed action vocabulary.
pub const SYSTEM_PROMPT: &str = "\
You are a desktop automation agent. You observe a screenshot of the current \
screen, understand the user's task, and plan the next input actions.

The screenshot is annotated with red reference markers at the four corners \
and the center, each labelled with its coordinate, plus a banner stating the \
screen resolution. All coordinates you output must use that same coordinate \
space.

Available actions (one per line):
- move(x, y)          move the pointer
- click()             click at the current pointer position
- click(x, y)         click at a position
- double_click()      double click at the current pointer position
- right_click()       right click at the current pointer position
- type(\"text\")        type literal text
- press(\"key\")        press a single key, e.g. press(\"enter\")
- hotkey(\"k1\", \"k2\")  press a key combination, e.g. hotkey(\"ctrl\", \"c\")
- DONE                the task is complete
- FAIL                the task cannot be completed
- WAIT                wait for the screen to settle, then continue

Respond with your observation and reasoning first, then a single fenced code \
block containing only action lines. End the block with DONE when the task is \
finished.

Example:
The Submit button is at (340, 520), I will click it.
```
click(x=340, y=520)
DONE
```";

/// OpenAI-style chat completion payload.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Assemble the request for one annotated observation and one instruction.
pub fn build_request(
    observation: &AnnotatedObservation,
    instruction: &str,
    config: &AgentConfig,
) -> ModelRequest {
    let geometry = &observation.geometry;
    let user_text = format!(
        "Task: {instruction}\n\n\
         The screen's logical resolution is {}x{}; valid coordinates are \
         x in [0, {}] and y in [0, {}]. Analyze the current screenshot and \
         plan the next actions.",
        geometry.logical_width,
        geometry.logical_height,
        geometry.logical_width - 1,
        geometry.logical_height - 1,
    );

    let image_b64 = general_purpose::STANDARD.encode(&observation.image_bytes);

    ModelRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: user_text },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/png;base64,{image_b64}"),
                        },
                    },
                ]),
            },
        ],
        temperature: config.temperature,
        max_tokens: config.max_completion_tokens,
    }
}
