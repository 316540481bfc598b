//! Full HTML document for a generated blog article.

use crate::config::SiteConfig;
use crate::html::{escape_attr, escape_text};
use crate::llm::truncate_chars;
use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const TEMPLATE: &str = include_str!("../templates/blog_page.html");

/// Characters of the title shown in the breadcrumb trail.
const BREADCRUMB_CHARS: usize = 50;

/// The article JSON the long-form model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default = "default_read_time")]
    pub read_time: String,
    #[serde(default)]
    pub content_html: String,
}

fn default_read_time() -> String {
    "5 min read".to_string()
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap())
}

/// JSON string literal that is also safe inside a `<script>` element.
fn json_str(s: &str) -> String {
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

/// Canonical article URL. Pages are served without the `.html` suffix.
pub fn blog_url(site: &SiteConfig, slug: &str) -> String {
    format!("{}/blog/{slug}", site.base())
}

/// Render `article` into the site's blog layout.
///
/// Placeholders are substituted in a single pass, so text inside the
/// generated body is never re-expanded.
pub fn render_blog_page(
    article: &BlogArticle,
    slug: &str,
    site: &SiteConfig,
    today: NaiveDate,
) -> String {
    let title = if article.title.trim().is_empty() {
        "Article"
    } else {
        article.title.trim()
    };
    let breadcrumb = format!("{}...", escape_text(truncate_chars(title, BREADCRUMB_CHARS)));
    let page_url = blog_url(site, slug);

    placeholder_re()
        .replace_all(TEMPLATE, |caps: &Captures| match &caps[1] {
            "TITLE_TEXT" => escape_text(title),
            "TITLE_ATTR" => escape_attr(title),
            "TITLE_JSON" => json_str(title),
            "DESCRIPTION_ATTR" => escape_attr(&article.meta_description),
            "DESCRIPTION_JSON" => json_str(&article.meta_description),
            "SITE_URL" => site.base().to_string(),
            "SITE_NAME" => escape_text(&site.name),
            "SITE_NAME_JSON" => json_str(&site.name),
            "PAGE_URL" => page_url.clone(),
            "DATE_ISO" => today.format("%Y-%m-%d").to_string(),
            "DATE_DISPLAY" => today.format("%B %Y").to_string(),
            "YEAR" => today.year().to_string(),
            "BREADCRUMB" => breadcrumb.clone(),
            "READ_TIME" => escape_text(&article.read_time),
            "CONTENT" => article.content_html.clone(),
            other => format!("{{{{{other}}}}}"),
        })
        .into_owned()
}
