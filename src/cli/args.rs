use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::loader::LoaderConfig;

#[derive(Debug, Parser)]
#[clap(
    name = "swagger-summary",
    about = "Serve flattened summaries of OpenAPI specifications",
    version
)]
pub struct Args {
    /// Address to listen on
    #[clap(long, value_name = "ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Directory served at the root path
    #[clap(long, value_name = "DIRECTORY", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Seconds allowed for loading a document and everything it references
    #[clap(long, value_name = "SECONDS", default_value = "30")]
    pub timeout: u64,

    /// Reject references that point into other documents
    #[clap(long)]
    pub no_external_refs: bool,

    /// Most values a document may expand to once its references are inlined
    #[clap(long, value_name = "N", default_value = "1000000")]
    pub max_ref_nodes: usize,

    /// Print the summary of URI to stdout and exit instead of serving
    #[clap(long, value_name = "URI")]
    pub render: Option<String>,
}

impl Args {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            timeout: Duration::from_secs(self.timeout),
            allow_external_refs: !self.no_external_refs,
            max_inlined_nodes: self.max_ref_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["swagger-summary"]).unwrap();
        assert_eq!(args.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(args.static_dir, PathBuf::from("./static"));
        assert!(args.render.is_none());

        let config = args.loader_config();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.allow_external_refs);
        assert_eq!(config.max_inlined_nodes, crate::loader::DEFAULT_MAX_INLINED_NODES);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "swagger-summary",
            "--addr",
            "127.0.0.1:9000",
            "--timeout",
            "5",
            "--no-external-refs",
            "--max-ref-nodes",
            "5000",
            "--render",
            "openapi.yaml",
        ])
        .unwrap();

        assert_eq!(args.addr.port(), 9000);
        assert_eq!(args.render.as_deref(), Some("openapi.yaml"));

        let config = args.loader_config();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.allow_external_refs);
        assert_eq!(config.max_inlined_nodes, 5000);
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        assert!(Args::try_parse_from(["swagger-summary", "--addr", "nowhere"]).is_err());
    }
}
