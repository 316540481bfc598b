use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const AGENTS_DIR: &str = "agents";
pub const BLOG_DIR: &str = "blog";
pub const BLOG_POSTS_DIR: &str = "blog/posts";
pub const LANDING_DIR: &str = "landing-pages";

pub const CONFIG_FILE: &str = "agents/config.yaml";
pub const INDEXED_URLS_FILE: &str = "agents/.indexed_urls.json";
pub const CONTENT_TRACKING_FILE: &str = "agents/.content_tracking.json";
pub const ANSWERED_QUESTIONS_FILE: &str = "blog/.answered_questions.json";
pub const DIRECTORY_TRACKING_FILE: &str = "agents/directory_tracking.json";
pub const DIRECTORY_KIT_FILE: &str = "agents/directory_kit.md";

/// Blog filenames are capped at this many bytes before `.html`.
pub const BLOG_SLUG_MAX: usize = 60;
/// Question-article slugs are shorter because they carry a date prefix.
pub const QUESTION_SLUG_MAX: usize = 50;

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn blog_dir(root: &Path) -> PathBuf {
    root.join(BLOG_DIR)
}

pub fn blog_posts_dir(root: &Path) -> PathBuf {
    root.join(BLOG_POSTS_DIR)
}

pub fn blog_page_path(root: &Path, slug: &str) -> PathBuf {
    blog_dir(root).join(format!("{slug}.html"))
}

/// Landing slugs may be nested (`templates/simple-invoice`).
pub fn landing_page_path(root: &Path, slug: &str) -> PathBuf {
    root.join(LANDING_DIR).join(format!("{slug}.html"))
}

pub fn indexed_urls_path(root: &Path) -> PathBuf {
    root.join(INDEXED_URLS_FILE)
}

pub fn content_tracking_path(root: &Path) -> PathBuf {
    root.join(CONTENT_TRACKING_FILE)
}

pub fn answered_questions_path(root: &Path) -> PathBuf {
    root.join(ANSWERED_QUESTIONS_FILE)
}

pub fn directory_tracking_path(root: &Path) -> PathBuf {
    root.join(DIRECTORY_TRACKING_FILE)
}

pub fn directory_kit_path(root: &Path) -> PathBuf {
    root.join(DIRECTORY_KIT_FILE)
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

static NON_ALNUM_RE: OnceLock<Regex> = OnceLock::new();

fn non_alnum_re() -> &'static Regex {
    NON_ALNUM_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Turn a title into a filename-safe slug of at most `max_len` bytes.
///
/// The output only ever contains `[a-z0-9-]`, never starts or ends with `-`
/// and never contains `--`. A `-` left at the end by the length cut is
/// trimmed too, so the result can be shorter than `max_len`.
pub fn slugify(text: &str, max_len: usize) -> String {
    let lower = text.to_lowercase();
    let dashed = non_alnum_re().replace_all(&lower, "-");
    let trimmed = dashed.trim_matches('-');
    // Output is pure ASCII, so byte truncation is char-safe.
    let cut = &trimmed[..trimmed.len().min(max_len)];
    cut.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
