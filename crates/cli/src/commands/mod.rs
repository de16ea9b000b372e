//! Subcommand implementations and the JSON envelope they all print.
//!
//! Every subcommand resolves to a [`CommandResult`]: a process exit code
//! plus a single JSON line (`command`, `status`, `error_class`, `message`)
//! so operators can script against the output.

pub mod doctor;
pub mod migrate;
pub mod seed;

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: render(CommandOutcome {
                command,
                status: "ok",
                error_class: None,
                message: message.into(),
            }),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self {
            exit_code,
            output: render(CommandOutcome {
                command,
                status: "error",
                error_class: Some(error_class),
                message: message.into(),
            }),
        }
    }
}

fn render(outcome: CommandOutcome<'_>) -> String {
    serde_json::to_string(&outcome).unwrap_or_else(|error| {
        serde_json::json!({
            "command": outcome.command,
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}
