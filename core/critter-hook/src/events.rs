//! Event handler for coding-assistant hooks.
//!
//! Reads JSON from stdin, parses the hook event, and rewrites the session's
//! status file.
//!
//! ## Event Mapping
//!
//! ```text
//! SessionStart                 → idle
//! UserPromptSubmit             → thinking
//! PreToolUse                   → tools    (planning for plan-mode tools)
//! PostToolUse                  → thinking
//! Notification permission_prompt|elicitation_dialog → waiting
//! Notification idle_prompt     → idle
//! Stop                         → idle     (unless stop_hook_active=true)
//! SubagentStop                 → no change
//! PreCompact                   → thinking
//! SessionEnd                   → removes the status file
//! ```

use std::io::{self, Read};

use chrono::Utc;
use serde::Deserialize;

use critter_core::SessionStatus;

use crate::status_file;

/// Tools whose invocation means the assistant is in plan mode.
const PLAN_MODE_TOOLS: &[&str] = &["ExitPlanMode", "EnterPlanMode"];

/// Raw hook payload as the assistant delivers it on stdin.
#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub stop_hook_active: Option<bool>,
}

/// What one hook event means for the status file.
#[derive(Debug, PartialEq)]
pub enum Disposition {
    Write(SessionStatus),
    Remove,
    Skip,
}

pub fn run(tty: Option<&str>) -> Result<(), String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| format!("Failed to read stdin: {}", e))?;

    if input.trim().is_empty() {
        return Ok(());
    }

    let hook_input: HookInput =
        serde_json::from_str(&input).map_err(|e| format!("Failed to parse hook input: {}", e))?;

    handle_hook_input(hook_input, tty)
}

fn handle_hook_input(hook_input: HookInput, tty: Option<&str>) -> Result<(), String> {
    let session_id = match &hook_input.session_id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => {
            tracing::debug!(
                event = ?hook_input.hook_event_name,
                "Skipping event (missing session_id)"
            );
            return Ok(());
        }
    };

    match dispose(&hook_input) {
        Disposition::Write(status) => {
            let timestamp = Utc::now().timestamp_millis() as f64 / 1000.0;
            status_file::write_status(
                &session_id,
                status,
                timestamp,
                hook_input.cwd.as_deref(),
                tty,
                hook_input.tool_name.as_deref(),
            )?;
            tracing::debug!(session = %session_id, "Status file updated");
            Ok(())
        }
        Disposition::Remove => {
            status_file::remove_status(&session_id);
            tracing::debug!(session = %session_id, "Status file removed");
            Ok(())
        }
        Disposition::Skip => Ok(()),
    }
}

/// Maps a hook event to its status-file disposition.
pub fn dispose(input: &HookInput) -> Disposition {
    let event = match input.hook_event_name.as_deref() {
        Some(name) => name,
        None => return Disposition::Skip,
    };

    match event {
        "SessionStart" => Disposition::Write(SessionStatus::Idle),

        "UserPromptSubmit" => Disposition::Write(SessionStatus::Thinking),

        "PreToolUse" => {
            let planning = input
                .tool_name
                .as_deref()
                .map(|tool| PLAN_MODE_TOOLS.contains(&tool))
                .unwrap_or(false);
            if planning {
                Disposition::Write(SessionStatus::Planning)
            } else {
                Disposition::Write(SessionStatus::Tools)
            }
        }

        "PostToolUse" => Disposition::Write(SessionStatus::Thinking),

        "Notification" => match input.notification_type.as_deref() {
            Some("permission_prompt") | Some("elicitation_dialog") => {
                Disposition::Write(SessionStatus::Waiting)
            }
            Some("idle_prompt") => Disposition::Write(SessionStatus::Idle),
            _ => Disposition::Skip,
        },

        "Stop" => {
            if input.stop_hook_active.unwrap_or(false) {
                Disposition::Skip
            } else {
                Disposition::Write(SessionStatus::Idle)
            }
        }

        "SubagentStop" => Disposition::Skip,

        "PreCompact" => Disposition::Write(SessionStatus::Thinking),

        "SessionEnd" => Disposition::Remove,

        other => {
            tracing::debug!(event_name = %other, "Unhandled event");
            Disposition::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(event: &str) -> HookInput {
        HookInput {
            hook_event_name: Some(event.to_string()),
            session_id: Some("s1".to_string()),
            cwd: Some("/repo".to_string()),
            tool_name: None,
            notification_type: None,
            stop_hook_active: None,
        }
    }

    #[test]
    fn test_session_start_writes_idle() {
        assert_eq!(
            dispose(&input("SessionStart")),
            Disposition::Write(SessionStatus::Idle)
        );
    }

    #[test]
    fn test_user_prompt_writes_thinking() {
        assert_eq!(
            dispose(&input("UserPromptSubmit")),
            Disposition::Write(SessionStatus::Thinking)
        );
    }

    #[test]
    fn test_pre_tool_use_writes_tools() {
        let mut i = input("PreToolUse");
        i.tool_name = Some("Bash".to_string());
        assert_eq!(dispose(&i), Disposition::Write(SessionStatus::Tools));
    }

    #[test]
    fn test_plan_mode_tool_writes_planning() {
        let mut i = input("PreToolUse");
        i.tool_name = Some("ExitPlanMode".to_string());
        assert_eq!(dispose(&i), Disposition::Write(SessionStatus::Planning));
    }

    #[test]
    fn test_post_tool_use_writes_thinking() {
        assert_eq!(
            dispose(&input("PostToolUse")),
            Disposition::Write(SessionStatus::Thinking)
        );
    }

    #[test]
    fn test_permission_notification_writes_waiting() {
        let mut i = input("Notification");
        i.notification_type = Some("permission_prompt".to_string());
        assert_eq!(dispose(&i), Disposition::Write(SessionStatus::Waiting));

        i.notification_type = Some("elicitation_dialog".to_string());
        assert_eq!(dispose(&i), Disposition::Write(SessionStatus::Waiting));
    }

    #[test]
    fn test_idle_prompt_notification_writes_idle() {
        let mut i = input("Notification");
        i.notification_type = Some("idle_prompt".to_string());
        assert_eq!(dispose(&i), Disposition::Write(SessionStatus::Idle));
    }

    #[test]
    fn test_other_notifications_are_skipped() {
        let mut i = input("Notification");
        i.notification_type = Some("auth_success".to_string());
        assert_eq!(dispose(&i), Disposition::Skip);

        i.notification_type = None;
        assert_eq!(dispose(&i), Disposition::Skip);
    }

    #[test]
    fn test_stop_writes_idle_unless_hook_active() {
        assert_eq!(
            dispose(&input("Stop")),
            Disposition::Write(SessionStatus::Idle)
        );

        let mut i = input("Stop");
        i.stop_hook_active = Some(true);
        assert_eq!(dispose(&i), Disposition::Skip);
    }

    #[test]
    fn test_subagent_stop_is_skipped() {
        assert_eq!(dispose(&input("SubagentStop")), Disposition::Skip);
    }

    #[test]
    fn test_pre_compact_writes_thinking() {
        assert_eq!(
            dispose(&input("PreCompact")),
            Disposition::Write(SessionStatus::Thinking)
        );
    }

    #[test]
    fn test_session_end_removes() {
        assert_eq!(dispose(&input("SessionEnd")), Disposition::Remove);
    }

    #[test]
    fn test_unknown_event_is_skipped() {
        assert_eq!(dispose(&input("SomethingNew")), Disposition::Skip);
    }

    #[test]
    fn test_missing_event_name_is_skipped() {
        let mut i = input("Stop");
        i.hook_event_name = None;
        assert_eq!(dispose(&i), Disposition::Skip);
    }
}
