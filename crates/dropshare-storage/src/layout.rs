//! Payload directory layout.
//!
//! ```text
//! {uploads}/{shareId}/000-report.pdf
//! {uploads}/{shareId}/001-фото.jpg
//! ```
//!
//! The three-digit index prefix keeps names unique inside a share even when
//! two uploads sanitize to the same name. The original name is kept verbatim
//! in the share record; the stored name only has to be a safe path component.

use dropshare_core::ShareId;

/// Longest stored name (in bytes) before the index prefix.
const MAX_NAME_BYTES: usize = 200;

/// Used when sanitizing leaves nothing.
const FALLBACK_NAME: &str = "file";

/// Characters rejected by at least one common filesystem.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Directory of a share, relative to the uploads root.
pub fn share_dir(id: &ShareId) -> String {
    id.as_str().to_string()
}

/// Name of the `index`-th payload file.
pub fn stored_file_name(index: usize, original_name: &str) -> String {
    format!("{index:03}-{}", sanitize_file_name(original_name))
}

/// Path of a payload file, relative to the uploads root.
pub fn stored_file_path(id: &ShareId, stored_name: &str) -> String {
    format!("{}/{stored_name}", share_dir(id))
}

/// Reduce an uploaded file name to a safe single path component.
///
/// Unicode letters are kept. Only the last path segment survives, control
/// and reserved characters are dropped, trailing dots and spaces are trimmed,
/// and the result is capped at a char boundary.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && !RESERVED.contains(c))
        .collect();

    let trimmed = cleaned
        .trim_start_matches(' ')
        .trim_end_matches(['.', ' ']);

    let mut end = trimmed.len().min(MAX_NAME_BYTES);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    let capped = &trimmed[..end];

    if capped.is_empty() || capped.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        capped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_unicode() {
        assert_eq!(sanitize_file_name("Отчёт 2024.pdf"), "Отчёт 2024.pdf");
        assert_eq!(sanitize_file_name("写真.jpg"), "写真.jpg");
    }

    #[test]
    fn test_strips_directories_and_reserved() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\a<b>.txt"), "ab.txt");
        assert_eq!(sanitize_file_name("bad\u{0}name\n.txt"), "badname.txt");
    }

    #[test]
    fn test_fallback_for_empty_results() {
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name("dir/"), "file");
        assert_eq!(sanitize_file_name("???"), "file");
    }

    #[test]
    fn test_trailing_dots_trimmed() {
        assert_eq!(sanitize_file_name("name. . "), "name");
    }

    #[test]
    fn test_cap_respects_char_boundary() {
        let long = "ж".repeat(150);
        let out = sanitize_file_name(&long);
        assert!(out.len() <= MAX_NAME_BYTES);
        assert!(out.chars().all(|c| c == 'ж'));
    }

    #[test]
    fn test_stored_name_has_index_prefix() {
        assert_eq!(stored_file_name(0, "a.txt"), "000-a.txt");
        assert_eq!(stored_file_name(12, "a/b.txt"), "012-b.txt");
        let id = ShareId::generate();
        assert_eq!(
            stored_file_path(&id, "000-a.txt"),
            format!("{id}/000-a.txt")
        );
    }
}
