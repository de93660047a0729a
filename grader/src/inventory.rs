//! Site assembly: sorts an archive's entry paths into HTML, CSS, and image buckets.

use tracing::debug;

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];
const CSS_EXTENSIONS: &[&str] = &["css"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// The graded files of one submission, by kind, in archive listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteInventory {
    /// HTML pages (`.html`, `.htm`).
    pub html_files: Vec<String>,
    /// Stylesheets (`.css`).
    pub css_files: Vec<String>,
    /// Images (`.jpg`, `.jpeg`, `.png`, `.gif`).
    pub image_files: Vec<String>,
}

impl SiteInventory {
    /// Classifies entry paths by lower-cased extension.
    ///
    /// Platform artifacts (hidden files, `__MACOSX` resource forks) and
    /// directory entries are skipped; unknown extensions are dropped silently.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inventory = Self::default();
        for path in paths {
            let path = path.as_ref();
            if path.ends_with('/') || is_platform_artifact(path) {
                continue;
            }
            let ext = extension(path);
            if HTML_EXTENSIONS.contains(&ext.as_str()) {
                inventory.html_files.push(path.to_string());
            } else if CSS_EXTENSIONS.contains(&ext.as_str()) {
                inventory.css_files.push(path.to_string());
            } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                inventory.image_files.push(path.to_string());
            }
        }
        debug!(
            html = inventory.html_files.len(),
            css = inventory.css_files.len(),
            images = inventory.image_files.len(),
            "site files sorted"
        );
        inventory
    }

    /// Returns true if some HTML file has `name` as its base filename, ignoring case.
    pub fn has_html_named(&self, name: &str) -> bool {
        contains_base_name(&self.html_files, name)
    }

    /// Returns true if some image file has `name` as its base filename, ignoring case.
    pub fn has_image_named(&self, name: &str) -> bool {
        contains_base_name(&self.image_files, name)
    }
}

/// Final path segment, so `img/Cat.PNG` compares as `Cat.PNG`.
pub fn base_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

fn contains_base_name(files: &[String], name: &str) -> bool {
    files
        .iter()
        .any(|file| base_name(file).eq_ignore_ascii_case(name))
}

fn extension(path: &str) -> String {
    base_name(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn is_platform_artifact(path: &str) -> bool {
    base_name(path).starts_with('.') || path.split('/').any(|segment| segment.starts_with("__"))
}
