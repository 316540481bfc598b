//! FAQPage structured data for blog posts.

use crate::html::{self, PageMeta};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::OnceLock;

/// At most this many Q&As are lifted from an existing FAQ section.
pub const MAX_EXTRACTED_FAQS: usize = 10;
pub const GENERATE_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

fn faq_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?si)<h2[^>]*>.*?(?:Frequently Asked Questions|FAQ).*?</h2>(.*)").unwrap()
    })
}

fn faq_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<h3[^>]*>(.*?)</h3>\s*<p[^>]*>(.*?)</p>").unwrap())
}

fn article_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"("mainEntityOfPage":\s*\{[^}]*"@id":\s*"https://[^"]+?)\.html(")"#).unwrap()
    })
}

pub fn has_faq_schema(html: &str) -> bool {
    html.contains("FAQPage")
}

/// Drop `.html` from the Article schema's `mainEntityOfPage` `@id`.
/// Returns the new document and whether anything changed.
pub fn fix_article_schema_url(html: &str) -> (String, bool) {
    let fixed = article_url_re().replace_all(html, "${1}${2}");
    let changed = fixed != html;
    (fixed.into_owned(), changed)
}

/// Lift `<h3>` question / `<p>` answer pairs that follow the first FAQ `<h2>`.
pub fn extract_faqs(html: &str) -> Vec<Faq> {
    let Some(section) = faq_heading_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return Vec::new();
    };

    faq_pair_re()
        .captures_iter(section)
        .filter_map(|c| {
            let question = html::strip_tags(&c[1]).trim().to_string();
            let answer = html::strip_tags(&c[2]).trim().to_string();
            (!question.is_empty() && !answer.is_empty()).then_some(Faq { question, answer })
        })
        .take(MAX_EXTRACTED_FAQS)
        .collect()
}

/// schema.org `FAQPage` document, pretty-printed.
pub fn faq_schema_json(faqs: &[Faq]) -> String {
    let entities: Vec<_> = faqs
        .iter()
        .map(|f| {
            json!({
                "@type": "Question",
                "name": f.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": f.answer,
                },
            })
        })
        .collect();
    let schema = json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    });
    // Serializing a Value built from strings cannot fail.
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Insert the FAQPage script block before the first `</head>`.
pub fn inject_faq_schema(html: &str, faqs: &[Faq]) -> String {
    let block = format!(
        "\n  <!-- JSON-LD FAQ Schema -->\n  <script type=\"application/ld+json\">\n  {}\n  </script>",
        faq_schema_json(faqs)
    );
    html.replacen("</head>", &format!("{block}\n</head>"), 1)
}

pub fn faq_section_html(faqs: &[Faq]) -> String {
    let esc = |s: &str| s.replace('<', "&lt;").replace('>', "&gt;");
    let mut lines = vec![
        "\n  <!-- FAQ Section (auto-generated) -->".to_string(),
        "  <section class=\"mt-12 mb-8\">".to_string(),
        "    <h2 class=\"text-2xl font-bold text-gray-900 mt-8 mb-4\">Frequently Asked Questions</h2>"
            .to_string(),
    ];
    for f in faqs {
        lines.push(format!(
            "    <h3 class=\"text-xl font-semibold text-gray-900 mt-6 mb-3\">{}</h3>",
            esc(&f.question)
        ));
        lines.push(format!("    <p class=\"text-gray-600 mb-4\">{}</p>", esc(&f.answer)));
    }
    lines.push("  </section>".to_string());
    lines.join("\n")
}

/// Insert a visible FAQ section before `</article>`, or `</main>` when the
/// page has no article element.
pub fn add_faq_section_to_body(html: &str, faqs: &[Faq]) -> String {
    let section = faq_section_html(faqs);
    if html.contains("</article>") {
        html.replacen("</article>", &format!("{section}\n  </article>"), 1)
    } else {
        html.replacen("</main>", &format!("{section}\n  </main>"), 1)
    }
}

pub fn faq_prompt(title: &str, description: &str) -> String {
    format!(
        "Generate 5 frequently asked questions with concise answers for this blog article.\n\n\
         Title: {title}\n\
         Description: {description}\n\n\
         Return ONLY a JSON array:\n\
         [{{\"question\": \"...\", \"answer\": \"...\"}}, ...]\n\n\
         Rules:\n\
         - Questions must be real things users search for\n\
         - Answers: 2-4 sentences, factual and helpful\n\
         - No markdown, no extra text, just valid JSON"
    )
}

/// The Q&A array in a generation reply, minus blank entries. An unusable
/// reply yields nothing.
pub fn parse_generated(reply: &str) -> Vec<Faq> {
    crate::llm::parse_embedded_array::<Faq>(reply)
        .unwrap_or_default()
        .into_iter()
        .filter(|f| !f.question.trim().is_empty() && !f.answer.trim().is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Per-page flow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqOrigin {
    Extracted,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SchemaChange {
    ArticleUrlFixed,
    AlreadyHasSchema,
    SectionGenerated { count: usize },
    SchemaInjected { count: usize, origin: FaqOrigin },
    NoFaqs,
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::ArticleUrlFixed => f.write_str("fixed mainEntityOfPage URL (.html removed)"),
            SchemaChange::AlreadyHasSchema => f.write_str("FAQ schema already present, skipped"),
            SchemaChange::SectionGenerated { count } => {
                write!(f, "generated {count} FAQs and added them to the body")
            }
            SchemaChange::SchemaInjected { count, origin } => {
                let origin = match origin {
                    FaqOrigin::Extracted => "extracted",
                    FaqOrigin::Generated => "generated",
                };
                write!(f, "injected FAQPage schema ({count} Q&As, {origin})")
            }
            SchemaChange::NoFaqs => f.write_str("no FAQs found or generated, schema not injected"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedPage {
    pub html: String,
    pub changes: Vec<SchemaChange>,
    pub modified: bool,
}

impl ProcessedPage {
    pub fn has(&self, pred: impl Fn(&SchemaChange) -> bool) -> bool {
        self.changes.iter().any(pred)
    }
}

/// Run the injector on one document. `generate` is only awaited when the
/// page has no FAQ schema and no FAQ section to lift Q&As from.
pub async fn process_page<F, Fut>(html: &str, generate: F) -> ProcessedPage
where
    F: FnOnce(PageMeta) -> Fut,
    Fut: Future<Output = Vec<Faq>>,
{
    let mut changes = Vec::new();
    let (mut html, fixed) = fix_article_schema_url(html);
    let mut modified = fixed;
    if fixed {
        changes.push(SchemaChange::ArticleUrlFixed);
    }

    if has_faq_schema(&html) {
        changes.push(SchemaChange::AlreadyHasSchema);
        return ProcessedPage {
            html,
            changes,
            modified,
        };
    }

    let mut faqs = extract_faqs(&html);
    let mut origin = FaqOrigin::Extracted;
    if faqs.is_empty() {
        faqs = generate(html::extract_meta(&html)).await;
        if !faqs.is_empty() {
            html = add_faq_section_to_body(&html, &faqs);
            origin = FaqOrigin::Generated;
            changes.push(SchemaChange::SectionGenerated { count: faqs.len() });
        }
    }

    if faqs.is_empty() {
        changes.push(SchemaChange::NoFaqs);
    } else {
        html = inject_faq_schema(&html, &faqs);
        modified = true;
        changes.push(SchemaChange::SchemaInjected {
            count: faqs.len(),
            origin,
        });
    }

    ProcessedPage {
        html,
        changes,
        modified,
    }
}

/// Totals across a run, for the summary notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub files: usize,
    pub injected: usize,
    pub generated: usize,
    pub urls_fixed: usize,
    pub already_had_schema: usize,
}

impl SchemaSummary {
    pub fn record(&mut self, page: &ProcessedPage) {
        self.files += 1;
        if page.has(|c| matches!(c, SchemaChange::SchemaInjected { .. })) {
            self.injected += 1;
        }
        if page.has(|c| matches!(c, SchemaChange::SectionGenerated { .. })) {
            self.generated += 1;
        }
        if page.has(|c| *c == SchemaChange::ArticleUrlFixed) {
            self.urls_fixed += 1;
        }
        if page.has(|c| *c == SchemaChange::AlreadyHasSchema) {
            self.already_had_schema += 1;
        }
    }

    pub fn message(&self) -> String {
        format!(
            "🔧 *Schema Injector Complete*\n\n\
             📄 Files processed: {}\n\
             ✅ FAQ schema injected: {}\n\
             🤖 FAQs generated by Claude: {}\n\
             🔗 mainEntityOfPage URLs fixed: {}\n\
             ⏭ Already had schema: {}",
            self.files, self.injected, self.generated, self.urls_fixed, self.already_had_schema
        )
    }
}
