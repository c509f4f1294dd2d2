use std::path::{Component, Path};

/// Convert a name segment to a URL-safe slug.
///
/// Lowercases ASCII alphanumerics, turns runs of whitespace, dashes and
/// underscores into single dashes, and drops everything else. Distinct inputs
/// can map to the same slug; the last page written wins, we don't detect
/// collisions.
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Convert a source-relative path into its output slug path.
///
/// Every directory segment is slugged independently so directory boundaries
/// survive, the base name is slugged, and a `.md` extension becomes `.html`.
/// Any other extension passes through (lowercased). Empty input resolves to
/// the empty string.
pub fn resolve(path: &Path) -> String {
    let mut segments: Vec<String> = Vec::new();

    if let Some(dir) = path.parent() {
        for component in dir.components() {
            if let Component::Normal(segment) = component {
                segments.push(slugify(&segment.to_string_lossy()));
            }
        }
    }

    if let Some(stem) = path.file_stem() {
        let mut name = slugify(&stem.to_string_lossy());
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            name.push('.');
            name.push_str(if ext == "md" { "html" } else { &ext });
        }
        segments.push(name);
    }

    segments.join("/")
}
