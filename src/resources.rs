use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::value::{Value, sanitize};

static ANDROID_RES_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^http://schemas\.android\.com/apk/res/([a-zA-Z.:_\-]+)\(0x[a-f0-9]+\)$").unwrap()
});

static ANDROID_RES_AUTO_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^http://schemas\.android\.com/apk/res-auto:([a-zA-Z.:_\-]+)\(0x[a-f0-9]+\)$")
        .unwrap()
});

/// Resolves opaque resource ids against a `aapt dump resources` listing.
///
/// Lookups are plain text searches; a reference that cannot be found is
/// returned unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceResolver<'a> {
    resources: Option<&'a str>,
}

impl<'a> ResourceResolver<'a> {
    pub fn new(resources: Option<&'a str>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> Option<&'a str> {
        self.resources
    }

    /// Rewrites an attribute key given as a full namespace URI.
    ///
    /// `http://schemas.android.com/apk/res/android:title(0x010101e1)` becomes
    /// `android:title`, and `.../apk/res-auto:layout(0x7f0400c2)` becomes
    /// `app:layout`.
    pub fn resolve_key(&self, raw_key: &str) -> String {
        if let Some(caps) = ANDROID_RES_KEY.captures(raw_key) {
            return caps[1].to_string();
        }
        if let Some(caps) = ANDROID_RES_AUTO_KEY.captures(raw_key) {
            return format!("app:{}", &caps[1]);
        }
        raw_key.to_string()
    }

    /// Sanitizes a raw value and replaces `@` and `?` references with their
    /// resource names when a listing is available.
    pub fn resolve_value(&self, raw_value: &str) -> Value {
        let value = sanitize(raw_value);
        let Some(resources) = self.resources else {
            return value;
        };
        let Some(text) = value.as_str() else {
            return value;
        };

        let resolved = if let Some(id) = text.strip_prefix('@') {
            lookup_resource(resources, id).map(|name| format!("@{name}"))
        } else if let Some(id) = text.strip_prefix('?') {
            lookup_style_parent(resources, id).map(|name| format!("?android:{name}"))
        } else {
            return value;
        };

        match resolved {
            Some(name) => Value::String(name),
            None => {
                debug!("Unresolved resource reference: {}", text);
                value
            }
        }
    }

    /// See [`resolve_output_name`].
    pub fn output_name(&self, original_filename: &str) -> String {
        resolve_output_name(original_filename, self.resources)
    }
}

fn lookup_resource(resources: &str, id: &str) -> Option<String> {
    let pattern = format!(r"(?m)^\s{{4}}resource {} (\S+)\r?$", regex::escape(id));
    capture_first(resources, &pattern)
}

fn lookup_style_parent(resources: &str, parent: &str) -> Option<String> {
    let pattern = format!(
        r"(?m)^\s{{4}}resource 0x[a-f0-9]+ ([^\r\n]+?)\r?\n\s{{6}}\(\) \(style\) size=\d+ parent={}(?:\s|$)",
        regex::escape(parent)
    );
    capture_first(resources, &pattern)
}

fn capture_first(haystack: &str, pattern: &str) -> Option<String> {
    // Ids come escaped, so the pattern is always valid.
    let re = Regex::new(pattern).ok()?;
    re.captures(haystack).map(|caps| caps[1].to_string())
}

/// Computes the output file name for a dumped resource.
///
/// The base name gets a `.xml` suffix when it lacks one. If the listing
/// declares an `xml/<name>` resource backed by `res/<file>`, `<name>.xml` is
/// used instead.
pub fn resolve_output_name(original_filename: &str, resources: Option<&str>) -> String {
    let base = Path::new(original_filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(original_filename);

    let filename = if base.ends_with(".xml") {
        base.to_string()
    } else {
        format!("{base}.xml")
    };

    if let Some(resources) = resources {
        let pattern = format!(
            r"(?m)^\s{{4}}resource 0x[a-f0-9]+ xml/([a-zA-Z][a-zA-Z0-9_\-]*)\r?\n\s{{6}}\(\) \(file\) res/{} type=XML",
            regex::escape(&filename)
        );
        if let Some(name) = capture_first(resources, &pattern) {
            return format!("{name}.xml");
        }
    }

    filename
}
