// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics rendered with miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error surfaced at load time.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to merge or deserialize the configuration.
    #[error("failed to load configuration: {message}")]
    #[diagnostic(
        code(tether::config::load),
        help("check tether.toml and TETHER_* environment overrides")
    )]
    Load { message: String },

    /// A semantic constraint failed after deserialization.
    #[error("{message}")]
    #[diagnostic(code(tether::config::validation))]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load {
            message: e.to_string(),
        }
    }
}

/// Render all collected errors to stderr via miette's graphical reporter.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
