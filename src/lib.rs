pub mod cli;
pub mod loader;
pub mod parser;
pub mod render;
pub mod server;
pub mod utils;

// Re-export frequently used items for easier access
pub use loader::{validate, LoadError, LoaderConfig, SpecLoader, ValidationError};
pub use parser::SwaggerSpec;
pub use render::{render, render_to_string, RenderError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppError {
    /// Short category name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Input(_) => "input",
            AppError::Load(err) if err.is_input_error() => "input",
            AppError::Load(_) => "load",
            AppError::Validation(_) => "validation",
            AppError::Render(_) => "render",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Load and validate the document at `uri`, then flatten it for rendering
pub async fn load_summary(loader: &SpecLoader, uri: &str) -> Result<SwaggerSpec> {
    let doc = loader.load(uri).await?;
    validate(&doc)?;

    Ok(SwaggerSpec::from(&doc))
}

/// Produce the text summary of the document at `uri`
pub async fn summarize_uri(loader: &SpecLoader, uri: &str) -> Result<String> {
    let spec = load_summary(loader, uri).await?;
    Ok(render_to_string(&spec)?)
}
