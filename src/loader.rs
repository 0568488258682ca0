// This file contains the spec loader: it turns a URI into a resolved, typed OpenAPI document.

pub mod refs;
pub mod source;
pub mod validate;

pub use source::DocumentSource;
pub use validate::{validate, ValidationError};

use std::path::Path;
use std::time::Duration;

use openapi::OpenAPI;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::parser::{parse_openapi_value, ParserError};
use crate::utils::split_fragment;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing uri")]
    MissingUri,

    #[error("invalid uri {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(String),

    #[error("not a local file path: {0}")]
    InvalidPath(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("failed to fetch {location}: {source}")]
    Http {
        location: String,
        source: reqwest::Error,
    },

    #[error("failed to fetch {location}: HTTP {status}")]
    Status {
        location: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to parse {location}: {source}")]
    Parse {
        location: String,
        source: ParserError,
    },

    #[error("invalid reference {reference:?}: {source}")]
    InvalidRef {
        reference: String,
        source: url::ParseError,
    },

    #[error("unresolved reference {reference:?} in {location}")]
    UnresolvedRef { reference: String, location: String },

    #[error("external reference not allowed: {0}")]
    ExternalRefNotAllowed(String),

    #[error("document expands beyond {limit} values when references are inlined")]
    TooLarge { limit: usize },

    #[error("reference resolution did not complete: {0}")]
    Aborted(#[source] tokio::task::JoinError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl LoadError {
    /// Whether the error was caused by the caller's URI rather than the document
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LoadError::MissingUri
                | LoadError::InvalidUri { .. }
                | LoadError::UnsupportedScheme(_)
                | LoadError::InvalidPath(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

pub const DEFAULT_MAX_INLINED_NODES: usize = 1_000_000;

/// Settings shared by every load
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Upper bound for a whole load, external documents included
    pub timeout: Duration,

    /// Whether `$ref`s may point into other documents
    pub allow_external_refs: bool,

    /// Most values the inlined document may hold
    pub max_inlined_nodes: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            timeout: Duration::from_secs(30),
            allow_external_refs: true,
            max_inlined_nodes: DEFAULT_MAX_INLINED_NODES,
        }
    }
}

/// Loads OpenAPI documents from local paths, `file://` URLs and HTTP(S) URLs
#[derive(Debug, Clone)]
pub struct SpecLoader {
    source: DocumentSource,
    config: LoaderConfig,
}

impl SpecLoader {
    pub fn new(config: LoaderConfig) -> Result<Self> {
        Ok(SpecLoader {
            source: DocumentSource::new(config.timeout)?,
            config,
        })
    }

    /// Fetch, resolve and deserialize the document named by `uri`
    #[instrument(skip(self))]
    pub async fn load(&self, uri: &str) -> Result<OpenAPI> {
        let root = parse_uri(uri)?;

        match tokio::time::timeout(self.config.timeout, self.load_url(root)).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout(self.config.timeout)),
        }
    }

    async fn load_url(&self, root: Url) -> Result<OpenAPI> {
        let (root, _) = split_fragment(&root);

        let documents =
            refs::fetch_all(&self.source, &root, self.config.allow_external_refs).await?;
        debug!(documents = documents.len(), "fetched documents");

        // Inlining is CPU-bound and must not stall the timer behind `load`'s timeout
        let limit = self.config.max_inlined_nodes;
        tokio::task::spawn_blocking(move || {
            let resolved = refs::Resolver::new(&documents, limit).resolve(&root)?;

            parse_openapi_value(resolved).map_err(|source| LoadError::Parse {
                location: root.to_string(),
                source,
            })
        })
        .await
        .map_err(LoadError::Aborted)?
    }
}

/// Interpret a user-supplied URI as an HTTP(S) URL, a `file://` URL or a filesystem path
pub fn parse_uri(uri: &str) -> Result<Url> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(LoadError::MissingUri);
    }

    match Url::parse(uri) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => Ok(url),
        // A single-letter scheme is a Windows drive letter
        Ok(url) if url.scheme().len() == 1 => file_url(uri),
        Ok(url) => Err(LoadError::UnsupportedScheme(url.scheme().to_string())),
        Err(url::ParseError::RelativeUrlWithoutBase) => file_url(uri),
        Err(source) => Err(LoadError::InvalidUri {
            uri: uri.to_string(),
            source,
        }),
    }
}

fn file_url(path: &str) -> Result<Url> {
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|source| LoadError::Io {
            location: path.display().to_string(),
            source,
        })?;
        cwd.join(path)
    };

    Url::from_file_path(&absolute)
        .map_err(|()| LoadError::InvalidPath(absolute.display().to_string()))
}
