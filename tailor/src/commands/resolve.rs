use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, OutputFormatter};
use crate::metadata::ExecutionMetadata;
use indicatif::ProgressBar;
use libtailor::transport::Transport;
use libtailor::writer::save_metadata;
use libtailor::{ImageReference, Resolver, TailorError};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// The step a command failed in; decides the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Bad arguments or configuration
    Arguments,
    /// The registry lookup failed
    Resolution,
    /// The result file could not be written
    Write,
}

/// A failed resolve command.
#[derive(Debug)]
pub struct CommandError {
    pub stage: Stage,
    pub source: TailorError,
}

impl CommandError {
    fn new(stage: Stage, source: TailorError) -> Self {
        Self { stage, source }
    }

    /// Resolution errors about the name itself are argument errors.
    fn from_resolution(source: TailorError) -> Self {
        match source {
            TailorError::InvalidReference { .. } => Self::new(Stage::Arguments, source),
            _ => Self::new(Stage::Resolution, source),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.stage {
            Stage::Arguments => 1,
            Stage::Resolution => 2,
            Stage::Write => 3,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::error_chain(&self.source))
    }
}

/// What a successful resolve produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub reference: ImageReference,
    pub image_id: String,
    pub path: PathBuf,
}

/// Handle the resolve command
pub fn handle_resolve(
    ctx: &AppContext,
    formatter: &dyn OutputFormatter,
    input: &str,
) -> Result<(), CommandError> {
    let resolver = Resolver::new(&ctx.config).map_err(|e| CommandError::new(Stage::Arguments, e))?;

    // Log lines would tear through a spinner.
    let spinner = if ctx.verbosity == VerbosityLevel::Normal {
        formatter.spinner(&format!("Resolving {}...", input))
    } else {
        ProgressBar::hidden()
    };
    let result = resolve_and_save(&resolver, input, ctx.output_path());
    spinner.finish_and_clear();

    let resolved = result?;
    formatter.success(&format!(
        "{} -> {} (written to {})",
        resolved.reference,
        resolved.image_id,
        resolved.path.display()
    ));
    Ok(())
}

/// Parses `input`, resolves it and writes the execution metadata to `output`.
pub fn resolve_and_save<T: Transport>(
    resolver: &Resolver<T>,
    input: &str,
    output: &Path,
) -> Result<Resolved, CommandError> {
    let reference: ImageReference = input
        .parse()
        .map_err(|e| CommandError::new(Stage::Arguments, e))?;

    let image = resolver
        .resolve(&reference)
        .map_err(CommandError::from_resolution)?;

    let metadata = ExecutionMetadata::from(&image);
    save_metadata(output, &metadata).map_err(|e| CommandError::new(Stage::Write, e))?;
    info!(path = %output.display(), "execution metadata saved");

    Ok(Resolved {
        reference,
        image_id: image.id,
        path: output.to_path_buf(),
    })
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
