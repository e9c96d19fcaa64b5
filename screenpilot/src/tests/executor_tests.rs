//! Executor state machine scenarios against the mock input layer.

use std::time::Duration;

use super::{Dispatched, MockController};
use crate::action::parse_response;
use crate::config::AgentConfig;
use crate::executor::{execute_actions, ExecutionState};

fn fast_config() -> AgentConfig {
    AgentConfig::new("test-key")
        .with_settle_delay(Duration::ZERO)
        .with_wait_delay(Duration::ZERO)
}

#[tokio::test]
async fn wait_and_done_sequence_dispatches_in_order() {
    super::init_tracing();
    let controller = MockController::new((1920, 1080), (1920, 1080));
    let actions = parse_response("```\nclick(10, 10)\nWAIT\nclick(20, 20)\nDONE\n```");

    let report = execute_actions(&controller, &actions, &fast_config()).await;

    assert_eq!(report.state, ExecutionState::Done);
    assert!(report.state.is_terminal());
    assert_eq!(report.dispatched, 2);
    assert!(report.failures.is_empty());
    assert_eq!(
        controller.calls(),
        vec![
            Dispatched::Click(Some((10, 10))),
            Dispatched::Click(Some((20, 20))),
        ]
    );
}

#[tokio::test]
async fn list_without_terminal_symbol_ends_exhausted() {
    let controller = MockController::new((1920, 1080), (1920, 1080));
    let actions = parse_response("```\nclick(10, 10)\n```");

    let report = execute_actions(&controller, &actions, &fast_config()).await;

    assert_eq!(report.state, ExecutionState::Exhausted);
    assert_eq!(report.dispatched, 1);
}

#[tokio::test]
async fn fail_symbol_stops_execution_immediately() {
    let controller = MockController::new((1920, 1080), (1920, 1080));
    let actions = parse_response("```\nmove(5, 5)\nFAIL\nclick(1, 1)\n```");

    let report = execute_actions(&controller, &actions, &fast_config()).await;

    assert_eq!(report.state, ExecutionState::Failed);
    assert_eq!(report.dispatched, 1);
    assert_eq!(controller.calls(), vec![Dispatched::Move(5, 5)]);
}

#[tokio::test]
async fn a_bad_action_is_recorded_and_execution_continues() {
    let controller = MockController::new((1920, 1080), (1920, 1080)).failing_clicks();
    let actions = parse_response("```\nclick(10, 10)\ntype(\"still here\")\nDONE\n```");

    let report = execute_actions(&controller, &actions, &fast_config()).await;

    assert_eq!(report.state, ExecutionState::Done);
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 0);
    assert_eq!(report.failures[0].source, "click(10, 10)");
    assert_eq!(
        controller.calls(),
        vec![Dispatched::Type("still here".to_string())]
    );
}

#[tokio::test]
async fn empty_list_is_exhausted_with_no_dispatches() {
    let controller = MockController::new((1920, 1080), (1920, 1080));
    let actions = parse_response("no actions in this text at all");

    let report = execute_actions(&controller, &actions, &fast_config()).await;

    assert_eq!(report.state, ExecutionState::Exhausted);
    assert_eq!(report.dispatched, 0);
    assert!(controller.calls().is_empty());
}

#[tokio::test]
async fn full_vocabulary_reaches_the_input_layer() {
    let controller = MockController::new((1920, 1080), (1920, 1080));
    let actions = parse_response(
        "```\nmove(1, 2)\nclick()\ndouble_click()\nright_click()\ntype(\"hi\")\npress(\"enter\")\nhotkey(\"ctrl\", \"c\")\nDONE\n```",
    );

    let report = execute_actions(&controller, &actions, &fast_config()).await;

    assert_eq!(report.state, ExecutionState::Done);
    assert_eq!(report.dispatched, 7);
    assert_eq!(
        controller.calls(),
        vec![
            Dispatched::Move(1, 2),
            Dispatched::Click(None),
            Dispatched::DoubleClick,
            Dispatched::RightClick,
            Dispatched::Type("hi".to_string()),
            Dispatched::Press("enter".to_string()),
            Dispatched::HotKey(vec!["ctrl".to_string(), "c".to_string()]),
        ]
    );
}
