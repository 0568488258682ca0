pub mod helpers;

pub use helpers::{first_line, is_remote_url, split_fragment, status_label};
