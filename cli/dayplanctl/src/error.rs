//! Error handling and display for the CLI.

use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("API error: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an API error from response details.
    pub fn api(
        status: u16,
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
            request_id,
        }
    }
}

/// Hint printed under an error, if there is one.
fn hint(err: &CliError) -> Option<&'static str> {
    match err {
        CliError::Api { code, .. } if code == "task_too_long" => {
            Some("Hint: Allow more days with --days so the task can be split.")
        }
        CliError::Api { code, .. } if code == "task_does_not_fit" => {
            Some("Hint: Each day holds at most 10 hours; raise --days or lower --hours.")
        }
        CliError::Api { status: 404, .. } | CliError::NotFound(_) => {
            Some("Hint: Run `dayplan tasks list` to see task IDs.")
        }
        CliError::Network(_) => {
            Some("Hint: Is the scheduler running? Check --api-url or DAYPLAN_API_URL.")
        }
        _ => None,
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        if let Some(hint) = hint(cli_err) {
            eprintln!("\n{}", hint.yellow());
        }
        if let CliError::Api {
            request_id: Some(request_id),
            ..
        } = cli_err
        {
            eprintln!("\nRequest ID: {}", request_id);
        }
    }
}
