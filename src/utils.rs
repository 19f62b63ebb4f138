//! Link inspection helpers shared by the engine and the downloader

use url::Url;

/// File extensions a link may end in (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".pdf", ".jpg", ".jpeg"];

/// Lowercased extension of the final path segment of `url`, including the dot
///
/// Returns an empty string when the last segment has no dot, mirroring how
/// a trailing slash or a bare host yields no extension at all.
pub fn path_extension(url: &Url) -> String {
    let path = url.path();
    let last_segment = path.rsplit('/').next().unwrap_or(path);

    match last_segment.rfind('.') {
        Some(dot) => last_segment[dot..].to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Whether `link` parses as an absolute URL whose path ends in an allowed extension
///
/// # Examples
///
/// ```
/// use zipfetch::utils::has_allowed_extension;
///
/// assert!(has_allowed_extension("https://example.com/scan.PDF"));
/// assert!(has_allowed_extension("http://h/photo.jpeg?size=large"));
/// assert!(!has_allowed_extension("http://h/setup.exe"));
/// assert!(!has_allowed_extension("not a url.pdf"));
/// ```
pub fn has_allowed_extension(link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => {
            let ext = path_extension(&url);
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        Err(_) => false,
    }
}
