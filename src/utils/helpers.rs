// This file contains helper functions shared by the loader and the renderer.

use openapi::StatusCode;
use percent_encoding::percent_decode_str;
use url::Url;

/// Returns the text before the first newline, or the whole string if there is none
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("")
}

/// Whether a URL has to be fetched over the network
pub fn is_remote_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Splits a URL into the document it names and its decoded JSON pointer fragment
pub fn split_fragment(url: &Url) -> (Url, String) {
    let mut document = url.clone();
    document.set_fragment(None);

    // The URL parser percent-encodes fragments; JSON pointers are matched decoded
    let pointer = url
        .fragment()
        .map(|fragment| percent_decode_str(fragment).decode_utf8_lossy().into_owned())
        .unwrap_or_default();
    (document, pointer)
}

/// Formats a response status key the way it is written in a document
pub fn status_label(code: &StatusCode) -> String {
    match code {
        StatusCode::Code(code) => code.to_string(),
        StatusCode::Range(range) => format!("{}XX", range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_truncates_at_newline() {
        assert_eq!(first_line("List pets\nReturns all pets"), "List pets");
        assert_eq!(first_line("single"), "single");
        assert_eq!(first_line(""), "");
        assert_eq!(first_line("\nsecond"), "");
    }

    #[test]
    fn test_split_fragment() {
        let url = Url::parse("http://example.com/spec.yaml#/components/schemas/Pet").unwrap();
        let (document, pointer) = split_fragment(&url);
        assert_eq!(document.as_str(), "http://example.com/spec.yaml");
        assert_eq!(pointer, "/components/schemas/Pet");
    }

    #[test]
    fn test_split_fragment_decodes_percent_escapes() {
        let url = Url::parse("file:///tmp/spec.json#/components/schemas/Pet%20Tag").unwrap();
        let (_, pointer) = split_fragment(&url);
        assert_eq!(pointer, "/components/schemas/Pet Tag");

        let url = Url::parse("file:///tmp/spec.json#/components/schemas/Caf%C3%A9%2").unwrap();
        let (_, pointer) = split_fragment(&url);
        assert_eq!(pointer, "/components/schemas/Café%2");
    }

    #[test]
    fn test_split_fragment_without_fragment() {
        let url = Url::parse("file:///tmp/pet.json").unwrap();
        let (document, pointer) = split_fragment(&url);
        assert_eq!(document.as_str(), "file:///tmp/pet.json");
        assert_eq!(pointer, "");
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(&StatusCode::Code(200)), "200");
        assert_eq!(status_label(&StatusCode::Range(4)), "4XX");
    }

    #[test]
    fn test_is_remote_url() {
        assert!(is_remote_url(&Url::parse("https://example.com/a.json").unwrap()));
        assert!(!is_remote_url(&Url::parse("file:///a.json").unwrap()));
    }
}
