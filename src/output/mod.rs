use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::{Digest, TranscriptText};
use crate::Result;

/// Render a digest in the requested format.
pub fn render_digest(digest: &Digest, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(digest.summary.clone()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(digest)?),
    }
}

/// Render a transcript in the requested format.
pub fn render_transcript(transcript: &TranscriptText, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(transcript.text.clone()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(transcript)?),
    }
}

/// Save rendered output to a file
pub fn save_to_file(content: &str, path: &Path) -> Result<()> {
    fs_err::write(path, content)?;
    Ok(())
}
