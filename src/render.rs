// This file contains the summary renderer, which writes a flattened text report of a parsed document.

use std::io::Write;

use thiserror::Error;

use crate::parser::{ApiMediaType, ApiOperation, SwaggerSpec};
use crate::utils::first_line;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Write the summary of `spec` to `out`, one line at a time.
///
/// Missing optional values are printed as empty strings. Nothing is buffered
/// here, so a failing writer leaves whatever was already written in place.
pub fn render<W: Write>(spec: &SwaggerSpec, out: &mut W) -> Result<()> {
    writeln!(out, "title: {}", spec.title)?;
    writeln!(out, "description: {}", text(&spec.description))?;
    writeln!(out, "version: {}", spec.version)?;
    writeln!(out)?;

    for api_path in &spec.paths {
        for operation in &api_path.operations {
            render_operation(&api_path.path, operation, out)?;
        }
    }

    Ok(())
}

/// Render into an in-memory string
pub fn render_to_string(spec: &SwaggerSpec) -> Result<String> {
    let mut buffer = Vec::new();
    render(spec, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn render_operation<W: Write>(path: &str, operation: &ApiOperation, out: &mut W) -> Result<()> {
    writeln!(out, "path: {}", path)?;
    writeln!(out, "method: {}", operation.method)?;
    writeln!(out, "description: {}", first_line(text(&operation.description)))?;

    if !operation.parameters.is_empty() {
        writeln!(out, "params:")?;
        for param in &operation.parameters {
            writeln!(
                out,
                " - {} | {} | {} | {}",
                param.name,
                param.location,
                text(&param.schema_type),
                first_line(text(&param.description))
            )?;
        }
    }

    if let Some(body) = &operation.request_body {
        write!(out, "body: ")?;
        if body.content.is_empty() {
            writeln!(out)?;
        }
        for media in &body.content {
            render_body_media(media, out)?;
        }
    }

    if !operation.responses.is_empty() {
        writeln!(out, "responses:")?;
        for response in &operation.responses {
            writeln!(
                out,
                " - {} ({})",
                response.status_code,
                first_line(text(&response.description))
            )?;
            for media in &response.content {
                writeln!(out, "   - {}: {}", media.media_type, text(&media.schema_type))?;
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

fn render_body_media<W: Write>(media: &ApiMediaType, out: &mut W) -> Result<()> {
    writeln!(out, "{}", text(&media.schema_type))?;

    if media.schema_type.as_deref() == Some("object") {
        for (name, prop_type) in &media.properties {
            writeln!(out, " - {}: {}", name, text(prop_type))?;
        }
    }

    Ok(())
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
