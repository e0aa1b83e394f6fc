//! Utility functions for names and remote locators.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ModelError, ModelResult};

/// Maximum slug length for per-video work directories.
pub const WORK_DIR_SLUG_LEN: usize = 60;

/// Minimum length for a bare string to be taken as a file id.
const RAW_ID_MIN_LEN: usize = 11;

static PATH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid regex"));
static QUERY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").expect("valid regex"));

/// Convert text to a filesystem-safe slug.
///
/// Lowercases, drops everything except word characters, whitespace and
/// hyphens, collapses separator runs into a single `_`, then truncates to
/// `max_len` characters.
///
/// # Examples
/// ```
/// use vclip_models::utils::slugify;
/// assert_eq!(slugify("My Video - Final Cut!", 60), "my_video_final_cut");
/// ```
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_sep = true;
        }
    }

    let truncated: String = slug.chars().take(max_len).collect();
    truncated.trim_end_matches('_').to_string()
}

/// File name without its extension.
pub fn video_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// Extract a remote file id from a share URL or a bare id.
///
/// Supports:
/// - `https://drive.google.com/file/d/FILE_ID/view`
/// - `https://drive.google.com/open?id=FILE_ID`
/// - a bare id: no `/` and longer than 10 characters
///
/// The bare-id fallback accepts any such string, so malformed input can be
/// taken as an id and only fail later at the metadata lookup.
pub fn extract_file_id(input: &str) -> ModelResult<String> {
    let input = input.trim();

    if let Some(caps) = PATH_ID.captures(input) {
        return Ok(caps[1].to_string());
    }
    if let Some(caps) = QUERY_ID.captures(input) {
        return Ok(caps[1].to_string());
    }
    if !input.contains('/') && input.len() >= RAW_ID_MIN_LEN {
        return Ok(input.to_string());
    }

    Err(ModelError::InvalidLocator(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World", 40), "hello_world");
        assert_eq!(slugify("  a -- b __ c  ", 40), "a_b_c");
        assert_eq!(slugify("What's up? (Live)", 40), "whats_up_live");
        assert_eq!(slugify("Ünïcode Títle", 40), "ünïcode_títle");
    }

    #[test]
    fn test_slugify_truncates_without_trailing_separator() {
        assert_eq!(slugify("abcd efgh", 5), "abcd");
        assert_eq!(slugify("abcdefgh", 3), "abc");
    }

    #[test]
    fn test_video_stem() {
        assert_eq!(video_stem("demo.mp4"), "demo");
        assert_eq!(video_stem("my.talk.mov"), "my.talk");
        assert_eq!(video_stem("noext"), "noext");
        assert_eq!(video_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_extract_from_file_url() {
        let url = "https://drive.google.com/file/d/1AbC_dEf-GhIjKlMn/view?usp=sharing";
        assert_eq!(extract_file_id(url).unwrap(), "1AbC_dEf-GhIjKlMn");
    }

    #[test]
    fn test_extract_from_open_url() {
        let url = "https://drive.google.com/open?id=1AbCdEfGhIjKlMn";
        assert_eq!(extract_file_id(url).unwrap(), "1AbCdEfGhIjKlMn");

        let url = "https://drive.google.com/uc?export=download&id=XyZ123456789";
        assert_eq!(extract_file_id(url).unwrap(), "XyZ123456789");
    }

    #[test]
    fn test_extract_raw_id_fallback() {
        assert_eq!(
            extract_file_id("1AbCdEfGhIjKlMnOp").unwrap(),
            "1AbCdEfGhIjKlMnOp"
        );
        // Exactly ten characters is too short to be trusted.
        assert!(extract_file_id("abcdefghij").is_err());
        assert!(extract_file_id("https://example.com/video").is_err());
    }
}
