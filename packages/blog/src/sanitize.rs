//! Filename sanitization for slugs taken from request paths.

use lazy_static::lazy_static;
use regex::Regex;

/// Longest sanitized name, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

lazy_static! {
    static ref ILLEGAL: Regex = Regex::new(r#"[/?<>\\:*|"]"#).unwrap();
    static ref CONTROL: Regex = Regex::new(r"[\x00-\x1f\x80-\x9f]").unwrap();
    static ref RESERVED: Regex = Regex::new(r"^\.+$").unwrap();
    static ref WINDOWS_RESERVED: Regex =
        Regex::new(r"(?i)^(con|prn|aux|nul|com[0-9]|lpt[0-9])(\..*)?$").unwrap();
    static ref WINDOWS_TRAILING: Regex = Regex::new(r"[. ]+$").unwrap();
}

/// Make `input` safe to use as a single file name.
///
/// Path separators, characters reserved on common filesystems and control
/// characters are removed. Names made only of dots, Windows device names and
/// trailing dots or spaces are dropped. The result is truncated to
/// [`MAX_FILENAME_BYTES`] on a character boundary and may be empty.
///
/// ```rust
/// use rsc_blog::sanitize_filename;
///
/// assert_eq!(sanitize_filename("hello-world"), "hello-world");
/// assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
/// assert_eq!(sanitize_filename(".."), "");
/// ```
pub fn sanitize_filename(input: &str) -> String {
    let cleaned = ILLEGAL.replace_all(input, "");
    let cleaned = CONTROL.replace_all(&cleaned, "");
    let cleaned = RESERVED.replace(&cleaned, "");
    let cleaned = WINDOWS_RESERVED.replace(&cleaned, "");
    let cleaned = WINDOWS_TRAILING.replace(&cleaned, "");
    truncate_bytes(&cleaned, MAX_FILENAME_BYTES).to_string()
}

fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_slugs_pass_through() {
        assert_eq!(sanitize_filename("a-post"), "a-post");
        assert_eq!(sanitize_filename("café_2024"), "café_2024");
    }

    #[test]
    fn separators_and_reserved_chars_are_removed() {
        assert_eq!(sanitize_filename("a/b\\c"), "abc");
        assert_eq!(sanitize_filename("what?<is>:this*|\""), "whatisthis");
    }

    #[test]
    fn control_chars_are_removed() {
        assert_eq!(sanitize_filename("a\u{0}b\nc\u{85}"), "abc");
    }

    #[test]
    fn dot_names_are_dropped() {
        assert_eq!(sanitize_filename("."), "");
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn windows_names_are_dropped() {
        assert_eq!(sanitize_filename("con"), "");
        assert_eq!(sanitize_filename("COM1.md"), "");
        assert_eq!(sanitize_filename("console"), "console");
    }

    #[test]
    fn trailing_dots_and_spaces_are_dropped() {
        assert_eq!(sanitize_filename("post. . "), "post");
    }

    #[test]
    fn long_names_are_truncated_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= MAX_FILENAME_BYTES);
        assert_eq!(out.len(), 254);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
