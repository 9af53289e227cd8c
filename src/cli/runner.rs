//! CLI runner - drives the job

use crate::cli::commands::Cli;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::pipeline;
use crate::session::Session;
use crate::types::TableReport;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Settings from the config file with command-line overrides applied
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(&self.cli.config)?;

        if let Some(input) = &self.cli.input {
            settings = settings.with_input(input.clone());
        }
        if let Some(output) = &self.cli.output {
            settings = settings.with_output(output.clone());
        }
        if let Some(codec) = self.cli.compression {
            settings = settings.with_compression(codec);
        }

        if settings.output.trim().is_empty() {
            return Err(Error::invalid_value(
                "paths.output",
                "no output location configured (set paths.output or pass --output)",
            ));
        }

        Ok(settings)
    }

    /// Run the song stage, then the log stage
    pub async fn run(&self) -> Result<Vec<TableReport>> {
        let settings = self.settings()?;
        let session = Session::from_settings(&settings);

        let input = session.open(&settings.input)?;
        let output = session.open(&settings.output)?;

        if input.is_cloud() || output.is_cloud() {
            tracing::debug!(
                input_scheme = ?input.scheme(),
                output_scheme = ?output.scheme(),
                "Using object store credentials from the session"
            );
        }
        tracing::info!(
            input = %input,
            output = %output,
            compression = ?session.writer_config().codec(),
            "Starting ETL"
        );
        let start = Instant::now();

        let reports = pipeline::run(&session, &input, &output).await?;

        for report in &reports {
            tracing::info!("{report}");
        }
        tracing::info!(
            tables = reports.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ETL complete"
        );

        Ok(reports)
    }
}
