//! Regex-level reads and rewrites of the site's hand-written HTML.
//!
//! Pages are generated from a fixed template, so the patterns here match that
//! template's exact attribute order rather than parsing a DOM.

use chrono::Local;
use regex::{Captures, NoExpand, Regex};
use serde::Serialize;
use std::sync::OnceLock;

macro_rules! cached_regex {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pat).unwrap())
        }
    };
}

cached_regex!(title_re, r"(?s)<title>(.*?)</title>");
cached_regex!(description_re, r#"<meta name="description" content="([^"]*)""#);
cached_regex!(canonical_re, r#"<link rel="canonical" href="([^"]*)""#);
cached_regex!(date_published_re, r#""datePublished":\s*"([\d-]+)""#);
cached_regex!(tag_re, r"<[^>]+>");

cached_regex!(meta_description_attr_re, r#"(<meta name="description" content=")[^"]*(")"#);
cached_regex!(og_title_attr_re, r#"(<meta property="og:title" content=")[^"]*(")"#);
cached_regex!(og_description_attr_re, r#"(<meta property="og:description" content=")[^"]*(")"#);
cached_regex!(twitter_title_attr_re, r#"(<meta name="twitter:title" content=")[^"]*(")"#);
cached_regex!(twitter_description_attr_re, r#"(<meta name="twitter:description" content=")[^"]*(")"#);

/// The head fields the agents read before rewriting a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    /// `YYYY-MM-DD`; today when the page carries no Article schema date.
    pub date_published: String,
}

pub fn extract_meta(html: &str) -> PageMeta {
    let first = |re: &Regex| {
        re.captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };
    PageMeta {
        title: first(title_re()).unwrap_or_default(),
        description: first(description_re()).unwrap_or_default(),
        canonical: first(canonical_re()).unwrap_or_default(),
        date_published: first(date_published_re())
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
    }
}

/// Escape text for an element body.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Remove every tag, leaving the text content.
pub fn strip_tags(s: &str) -> String {
    tag_re().replace_all(s, "").into_owned()
}

fn replace_attr(html: &str, re: &Regex, value: &str) -> String {
    re.replace_all(html, |caps: &Captures| {
        format!("{}{}{}", &caps[1], value, &caps[2])
    })
    .into_owned()
}

/// Rewrite the page title and description everywhere the template repeats
/// them: `<title>`, `meta description`, Open Graph and Twitter cards.
///
/// Only the attribute value or title text changes; the rest of the document
/// is byte-for-byte preserved.
pub fn apply_meta_updates(html: &str, new_title: &str, new_desc: &str) -> String {
    let title_attr = escape_attr(new_title);
    let desc_attr = escape_attr(new_desc);

    let title_tag = format!("<title>{}</title>", escape_text(new_title));
    let out = title_re().replace_all(html, NoExpand(&title_tag)).into_owned();
    let out = replace_attr(&out, meta_description_attr_re(), &desc_attr);
    let out = replace_attr(&out, og_title_attr_re(), &title_attr);
    let out = replace_attr(&out, og_description_attr_re(), &desc_attr);
    let out = replace_attr(&out, twitter_title_attr_re(), &title_attr);
    replace_attr(&out, twitter_description_attr_re(), &desc_attr)
}
