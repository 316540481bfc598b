//! Content engine prompts, response parsing and run reporting.
//!
//! The model calls themselves are made by the caller; this module only
//! builds prompts and interprets replies, so each piece is testable offline.

use crate::blog_page::BlogArticle;
use crate::config::SiteConfig;
use crate::html::escape_text;
use crate::llm::{self, truncate_chars};
use crate::topics::{LandingIdea, LandingKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Long-form article budget.
pub const ARTICLE_MAX_TOKENS: u32 = 6000;
pub const LANDING_MAX_TOKENS: u32 = 5000;
pub const REVIEW_MAX_TOKENS: u32 = 500;
/// Articles reviewed below this score are regenerated once.
pub const REGENERATE_BELOW: f64 = 5.0;
/// Characters of raw reply kept when the article JSON does not parse.
const FALLBACK_BODY_CHARS: usize = 2000;
/// Characters of content sent to the reviewer.
const REVIEW_INPUT_CHARS: usize = 3000;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    #[default]
    Keywords,
    Landing,
    Evergreen,
    Questions,
    Mixed,
}

impl ContentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentMode::Keywords => "keywords",
            ContentMode::Landing => "landing",
            ContentMode::Evergreen => "evergreen",
            ContentMode::Questions => "questions",
            ContentMode::Mixed => "mixed",
        }
    }

    /// Noun phrase used in the run summary.
    pub fn label(self) -> &'static str {
        match self {
            ContentMode::Keywords => "blog articles (keyword-targeted)",
            ContentMode::Landing => "landing pages",
            ContentMode::Evergreen => "evergreen articles",
            ContentMode::Questions => "blog articles (from questions)",
            ContentMode::Mixed => "mixed content",
        }
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keywords" => Ok(ContentMode::Keywords),
            "landing" => Ok(ContentMode::Landing),
            "evergreen" => Ok(ContentMode::Evergreen),
            "questions" => Ok(ContentMode::Questions),
            "mixed" => Ok(ContentMode::Mixed),
            other => Err(format!(
                "unknown mode '{other}': expected keywords, landing, evergreen, questions or mixed"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Blog articles
// ---------------------------------------------------------------------------

pub const ARTICLE_SYSTEM_PROMPT: &str = r#"You are an expert content writer for MakeInvoice.online, a free online invoice generator.

Write a comprehensive, helpful blog post that:
1. Targets the given keyword naturally (use in title, first paragraph, headings)
2. Is 1200-1800 words
3. Provides genuine value - actionable advice, not fluff
4. Uses proper heading structure (H2, H3)
5. Includes bullet points and numbered lists
6. Has a FAQ section with 3-5 questions (for featured snippets)
7. Naturally mentions MakeInvoice.online where relevant (1-2 times max, not forced)
8. Ends with a clear but subtle CTA

IMPORTANT: Return your response as JSON with this exact structure:
{
  "title": "The exact H1 title for the article",
  "meta_description": "A 150-160 character meta description",
  "read_time": "X min read",
  "content_html": "The full article body HTML (no <html>, <head>, <body> tags - just the content with <h2>, <h3>, <p>, <ul>, <li>, etc.)"
}

For content_html, use these HTML patterns:
- <h2 class="text-2xl font-bold text-gray-900 mt-8 mb-4">Heading</h2>
- <h3 class="text-xl font-semibold text-gray-900 mt-6 mb-3">Subheading</h3>
- <p class="text-gray-600 mb-4">Paragraph text</p>
- <ul class="list-disc list-inside text-gray-600 mb-6 space-y-2"><li>Item</li></ul>
- <ol class="list-decimal list-inside text-gray-600 mb-6 space-y-2"><li>Item</li></ol>
- For first answer paragraph: <p class="text-lg text-gray-600 mb-4"><strong>Direct answer:</strong> text here</p>

Include a CTA box in the middle using:
<div class="bg-blue-50 border border-blue-200 rounded-lg p-6 my-8">
  <h3 class="text-lg font-bold text-gray-900 mb-2">Create Your Invoice Now</h3>
  <p class="text-gray-600 mb-4">Use our free invoice generator. Professional templates, no signup required.</p>
  <a href="../" class="inline-block bg-blue-600 text-white font-semibold px-6 py-3 rounded-lg hover:bg-blue-700 transition-colors">Create Free Invoice &rarr;</a>
</div>

Write like a helpful expert, not a salesperson. Return ONLY valid JSON."#;

/// What to write about: a keyword-bank topic or an evergreen title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleTopic {
    pub title: String,
    pub keyword: String,
}

impl ArticleTopic {
    pub fn new(title: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            keyword: keyword.into(),
        }
    }

    /// Evergreen titles double as their own keyword.
    pub fn evergreen(title: &str) -> Self {
        Self::new(title, title.to_lowercase())
    }
}

pub fn article_user_prompt(topic: &ArticleTopic) -> String {
    format!(
        "Write a blog post about: {}\n\
         Target keyword: {}\n\n\
         Remember to be genuinely helpful. The goal is to rank #1 and become a trusted resource.\n\n\
         Return ONLY the JSON object, no other text.",
        topic.title, topic.keyword
    )
}

/// Interpret the article reply. A reply without a parseable JSON object still
/// yields a publishable page built from the raw text.
pub fn parse_article(reply: &str, topic: &ArticleTopic) -> BlogArticle {
    if let Some(article) = llm::parse_embedded::<BlogArticle>(reply) {
        return article;
    }
    tracing::warn!(topic = %topic.title, "article reply was not JSON, using raw text");
    BlogArticle {
        title: topic.title.clone(),
        meta_description: format!(
            "Learn about {} with this comprehensive guide.",
            topic.keyword
        ),
        read_time: "5 min read".to_string(),
        content_html: format!(
            "<p class=\"text-gray-600 mb-4\">{}</p>",
            escape_text(truncate_chars(reply, FALLBACK_BODY_CHARS))
        ),
    }
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

pub const REVIEW_SYSTEM_PROMPT: &str = r#"You are a senior editor. Review this content for:
1. Accuracy
2. Helpfulness
3. SEO optimization
4. Readability
5. Appropriate product mentions (not too salesy)

Return JSON:
{
  "score": 1-10,
  "issues": ["issue1"],
  "approved": true/false
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentReview {
    #[serde(default = "default_review_score")]
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default = "default_true")]
    pub approved: bool,
}

fn default_review_score() -> f64 {
    7.0
}

fn default_true() -> bool {
    true
}

impl Default for ContentReview {
    fn default() -> Self {
        Self {
            score: default_review_score(),
            issues: Vec::new(),
            approved: true,
        }
    }
}

impl ContentReview {
    pub fn needs_regeneration(&self) -> bool {
        self.score < REGENERATE_BELOW
    }
}

/// `content_type` is a noun phrase such as "blog article" or "landing page".
pub fn review_user_prompt(content: &str, content_type: &str) -> String {
    format!(
        "Review this {content_type}:\n\n{}",
        truncate_chars(content, REVIEW_INPUT_CHARS)
    )
}

/// A missing or unparseable review counts as a pass with score 7.
pub fn parse_review(reply: Option<&str>) -> ContentReview {
    reply
        .and_then(llm::parse_embedded::<ContentReview>)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Landing pages
// ---------------------------------------------------------------------------

const INDUSTRY_SYSTEM_PROMPT: &str = r#"You are a conversion copywriter for MakeInvoice.online.

Create a landing page for a specific industry. The page should:
1. Speak directly to that industry's pain points
2. Show you understand their specific invoicing needs
3. Include industry-specific examples
4. Have clear sections: Hero, Pain Points, Features, How It Works, Testimonial (create realistic one), CTA
5. Be persuasive but not pushy

Format as HTML with Tailwind CSS classes (we use Tailwind).
Include proper meta tags and schema markup.
Make it feel custom-built for this industry."#;

const TEMPLATE_SYSTEM_PROMPT: &str = r#"You are a conversion copywriter for MakeInvoice.online.

Create a template-focused landing page. The page should:
1. Showcase the specific invoice template type
2. Explain when to use this type
3. Show what's included
4. Have clear sections: Hero, Template Preview Description, Features, Use Cases, CTA
5. Target people searching for this template type

Format as HTML with Tailwind CSS classes.
Include proper meta tags and schema markup."#;

/// `(system, user)` prompts for a landing page.
pub fn landing_prompts(idea: &LandingIdea) -> (&'static str, String) {
    match idea.kind {
        LandingKind::Industry(industry) => (
            INDUSTRY_SYSTEM_PROMPT,
            format!(
                "Create a landing page for: {}\n\
                 Industry: {industry}\n\
                 URL slug: /{}\n\n\
                 Include specific examples of invoices for {industry} and address their unique needs.",
                idea.title, idea.slug
            ),
        ),
        LandingKind::Template(template_type) => (
            TEMPLATE_SYSTEM_PROMPT,
            format!(
                "Create a landing page for: {}\n\
                 Template type: {template_type}\n\
                 URL slug: /{}",
                idea.title, idea.slug
            ),
        ),
    }
}

/// Landing replies are raw HTML, sometimes fenced.
pub fn landing_html(reply: &str) -> String {
    llm::strip_code_fences(reply)
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Where a created item can be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ContentLocation {
    /// `blog/<slug>.html`, served at `/blog/<slug>`.
    Blog(String),
    /// `landing-pages/<slug>.html`, served at `/<slug>`.
    Landing(String),
    /// A Markdown draft under `blog/posts/`, not yet published.
    Draft(String),
}

impl ContentLocation {
    pub fn live_url(&self, site: &SiteConfig) -> Option<String> {
        match self {
            ContentLocation::Blog(slug) => Some(format!("{}/blog/{slug}", site.base())),
            ContentLocation::Landing(slug) => Some(format!("{}/{slug}", site.base())),
            ContentLocation::Draft(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub score: f64,
    pub location: ContentLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentReport {
    pub mode: ContentMode,
    pub created: Vec<CreatedContent>,
}

impl ContentReport {
    pub fn new(mode: ContentMode) -> Self {
        Self {
            mode,
            created: Vec::new(),
        }
    }

    pub fn message(&self, site: &SiteConfig) -> String {
        let label = self.mode.label();
        if self.created.is_empty() {
            return format!("📭 *Content Engine*\n\nNo new {label} created this run.");
        }

        let mut msg = format!(
            "📝 *Content Engine Complete*\n\nCreated {} {label}:\n\n",
            self.created.len()
        );
        for item in &self.created {
            msg.push_str(&format!("• *{}*\n", item.title));
            if let Some(k) = &item.keyword {
                msg.push_str(&format!("  Keyword: {k}\n"));
            }
            if let Some(s) = &item.source {
                msg.push_str(&format!("  Source: {s}\n"));
            }
            msg.push_str(&format!("  Quality: {}/10\n", item.score));
            match item.location.live_url(site) {
                Some(url) => msg.push_str(&format!("  🔗 [View]({url})\n")),
                None => {
                    if let ContentLocation::Draft(file) = &item.location {
                        msg.push_str(&format!("  File: `{file}`\n"));
                    }
                }
            }
            msg.push('\n');
        }
        msg.push_str("✅ Auto-published to site!");
        msg
    }
}

pub fn missing_key_message() -> String {
    "❌ *Content Engine Error*\n\nANTHROPIC_API_KEY not set".to_string()
}
