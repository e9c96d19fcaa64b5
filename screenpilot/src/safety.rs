//! Syntactic safety gate between the parser and the executor.
//!
//! Defense in depth, not a semantic guarantee: the parser already restricts
//! output to a closed vocabulary, and this layer additionally drops any
//! action whose source line carries a forbidden-operation token (shell or
//! process invocation, code-eval forms). Rejections are collected into a
//! report so the caller can inspect or surface them; they never abort the
//! cycle, and an empty filtered list is legal.

use tracing::warn;

use crate::action::{Action, ActionList};

/// Tokens that mark a line as a process/shell invocation or code evaluation.
/// Matched case-insensitively against the raw source line.
const FORBIDDEN_TOKENS: &[&str] = &[
    "os.",
    "subprocess",
    "eval(",
    "exec(",
    "system(",
    "popen",
    "import ",
    "__import__",
    "sh -c",
    "bash -c",
    "$(",
    "`",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The source line contains a forbidden-operation token.
    ForbiddenToken(String),
}

/// One dropped action, quoted for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub source: String,
    pub reason: RejectionReason,
}

/// Split an [`ActionList`] into the actions allowed to execute and the
/// rejection report. Control symbols pass unconditionally; order of the
/// surviving actions is preserved.
pub fn filter_actions(actions: ActionList) -> (ActionList, Vec<Rejection>) {
    let mut accepted = ActionList::new();
    let mut rejections = Vec::new();

    for item in actions {
        if matches!(item.action, Action::Control(_)) {
            accepted.push(item);
            continue;
        }

        match forbidden_token(&item.source) {
            Some(token) => {
                warn!(line = %item.source, token, "action rejected by safety filter");
                rejections.push(Rejection {
                    source: item.source,
                    reason: RejectionReason::ForbiddenToken(token.to_string()),
                });
            }
            None => accepted.push(item),
        }
    }

    (accepted, rejections)
}

fn forbidden_token(line: &str) -> Option<&'static str> {
    let lowered = line.to_lowercase();
    FORBIDDEN_TOKENS
        .iter()
        .find(|token| lowered.contains(**token))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::parse_response;

    #[test]
    fn shell_invocation_in_typed_text_is_rejected() {
        let list = parse_response("```\ntype(\"nohup sh -c 'rm -rf ~' &\")\nclick(1, 1)\n```");
        let (accepted, rejections) = filter_actions(list);

        assert_eq!(accepted.len(), 1);
        assert!(matches!(
            accepted[0].action,
            Action::Click {
                x: Some(1),
                y: Some(1)
            }
        ));
        assert_eq!(rejections.len(), 1);
        assert_eq!(
            rejections[0].reason,
            RejectionReason::ForbiddenToken("sh -c".to_string())
        );
    }

    #[test]
    fn eval_and_subprocess_tokens_are_rejected() {
        let list = parse_response("```\ntype(\"subprocess.run(['ls'])\")\ntype(\"eval(input())\")\n```");
        let (accepted, rejections) = filter_actions(list);
        assert!(accepted.is_empty());
        assert_eq!(rejections.len(), 2);
    }

    #[test]
    fn control_symbols_pass_unconditionally() {
        let list = parse_response("```\nDONE\nFAIL\nWAIT\n```");
        let (accepted, rejections) = filter_actions(list);
        assert_eq!(accepted.len(), 3);
        assert!(rejections.is_empty());
    }

    #[test]
    fn clean_actions_pass_in_order() {
        let list = parse_response("```\nmove(10, 10)\ntype(\"hello\")\nDONE\n```");
        let (accepted, rejections) = filter_actions(list);
        assert_eq!(accepted.len(), 3);
        assert!(rejections.is_empty());
    }
}
