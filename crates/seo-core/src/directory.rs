//! Directory submission kit: the listing targets, the copy prompt and the
//! Markdown kit that is pasted from when submitting by hand.

use crate::llm;
use crate::tracking::{DirectoryTracking, SubmissionStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const COPY_MAX_TOKENS: u32 = 1024;

// ---------------------------------------------------------------------------
// Product profile
// ---------------------------------------------------------------------------

pub struct Product {
    pub name: &'static str,
    pub url: &'static str,
    pub email: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub target_audience: &'static str,
    pub category: &'static str,
    pub pricing: &'static str,
}

pub const PRODUCT: Product = Product {
    name: "MakeInvoice.online",
    url: "https://www.makeinvoice.online",
    email: "support@makeinvoice.online",
    description: "Free online invoice generator with live preview, PDF download, and customizable templates. No signup required.",
    features: &[
        "100% free to use",
        "No account or signup required",
        "Live preview as you type",
        "Instant PDF download",
        "Customizable templates",
        "Tax calculation built-in",
        "Available in English, German, French, Spanish",
        "Works in any browser",
        "Data stays in your browser, never sent to servers",
    ],
    target_audience: "Freelancers, small business owners, contractors, consultants, entrepreneurs",
    category: "Invoicing / Accounting / Business Tools",
    pricing: "Free (premium plan available)",
};

// ---------------------------------------------------------------------------
// Directories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Dofollow,
    Nofollow,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Dofollow => "dofollow",
            LinkType::Nofollow => "nofollow",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Directory {
    pub name: &'static str,
    /// 1 is highest priority.
    pub tier: u8,
    pub url: &'static str,
    pub submit_url: &'static str,
    /// Domain authority.
    pub da: u8,
    pub link_type: LinkType,
    pub notes: &'static str,
    pub max_tagline: usize,
    pub max_description: usize,
}

const fn dir(
    name: &'static str,
    tier: u8,
    url: &'static str,
    submit_url: &'static str,
    da: u8,
    link_type: LinkType,
    notes: &'static str,
    max_tagline: usize,
    max_description: usize,
) -> Directory {
    Directory {
        name,
        tier,
        url,
        submit_url,
        da,
        link_type,
        notes,
        max_tagline,
        max_description,
    }
}

use LinkType::{Dofollow, Nofollow};

pub const DIRECTORIES: [Directory; 15] = [
    dir(
        "Product Hunt",
        1,
        "https://www.producthunt.com",
        "https://www.producthunt.com/posts/new",
        91,
        Dofollow,
        "Best launched on Tuesday-Thursday. Needs a tagline, description, and thumbnail image. Schedule a launch.",
        60,
        260,
    ),
    dir(
        "AlternativeTo",
        1,
        "https://alternativeto.net",
        "https://alternativeto.net/software/add/",
        80,
        Dofollow,
        "Free listing. Add as alternative to FreshBooks, Wave, Invoice Ninja. Very high referral traffic for tools.",
        70,
        500,
    ),
    dir(
        "G2",
        1,
        "https://www.g2.com",
        "https://sell.g2.com/free-software-listing",
        87,
        Nofollow,
        "Free listing available. High trust signal for B2B. Requires business email.",
        70,
        350,
    ),
    dir(
        "Capterra",
        1,
        "https://www.capterra.com",
        "https://www.capterra.com/vendors/sign-up",
        87,
        Nofollow,
        "Free basic listing. Category: Invoice Management / Billing. High buyer intent traffic.",
        70,
        400,
    ),
    dir(
        "GetApp",
        1,
        "https://www.getapp.com",
        "https://www.getapp.com/add-a-product/",
        77,
        Nofollow,
        "Sister site to Capterra. Same company (Gartner). Free listing, worth submitting separately.",
        70,
        400,
    ),
    dir(
        "SaaSHub",
        2,
        "https://www.saashub.com",
        "https://www.saashub.com/add-software",
        65,
        Dofollow,
        "Free listing. Fast approval. Good for indie tools.",
        60,
        300,
    ),
    dir(
        "Indie Hackers",
        2,
        "https://www.indiehackers.com",
        "https://www.indiehackers.com/products/new",
        72,
        Dofollow,
        "Create a product page. Great community for bootstrappers. Also post in relevant groups.",
        60,
        300,
    ),
    dir(
        "BetaList",
        2,
        "https://betalist.com",
        "https://betalist.com/submit",
        65,
        Dofollow,
        "Free submission. Good for early-stage products. Can take 1-2 weeks for review.",
        60,
        250,
    ),
    dir(
        "Uneed",
        2,
        "https://www.uneed.best",
        "https://www.uneed.best/submit-a-tool",
        45,
        Dofollow,
        "Quick submission. Free. Good for tool directories. Fast approval.",
        60,
        200,
    ),
    dir(
        "SaaSworthy",
        2,
        "https://www.saasworthy.com",
        "https://www.saasworthy.com/add-product",
        58,
        Nofollow,
        "Free listing. Good for SaaS discovery. Category: Invoice Management.",
        70,
        350,
    ),
    dir(
        "Software Advice",
        3,
        "https://www.softwareadvice.com",
        "https://www.softwareadvice.com/app/signup",
        82,
        Nofollow,
        "Gartner-owned (same as Capterra). Free basic listing. Category: Billing & Invoicing.",
        70,
        400,
    ),
    dir(
        "Crozdesk",
        3,
        "https://crozdesk.com",
        "https://crozdesk.com/software/add",
        55,
        Dofollow,
        "Free listing. Good for B2B software discovery.",
        60,
        300,
    ),
    dir(
        "SourceForge",
        3,
        "https://sourceforge.net",
        "https://sourceforge.net/software/add/",
        93,
        Nofollow,
        "Very high DA. Free listing. Category: Billing/Invoicing. Old but still high traffic.",
        60,
        500,
    ),
    dir(
        "Slant",
        3,
        "https://www.slant.co",
        "https://www.slant.co/topics/11323/~best-free-invoice-generators",
        68,
        Dofollow,
        "Add MakeInvoice.online as an option in the 'Best free invoice generators' topic.",
        60,
        200,
    ),
    dir(
        "ToolPilot",
        3,
        "https://www.toolpilot.ai",
        "https://www.toolpilot.ai/submit",
        40,
        Dofollow,
        "AI/web tool directory. Free submission. Fast approval.",
        60,
        200,
    ),
];

/// Case-insensitive lookup so `mark g2` works.
pub fn find_directory(name: &str) -> Option<&'static Directory> {
    DIRECTORIES
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
}

pub fn directory_names() -> impl Iterator<Item = &'static str> {
    DIRECTORIES.iter().map(|d| d.name)
}

// ---------------------------------------------------------------------------
// Submission copy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    pub primary: String,
    pub secondary: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitContent {
    pub tagline: String,
    pub short: String,
    pub medium: String,
    pub long: String,
    pub keywords: Vec<String>,
    pub categories: Categories,
    pub alternatives_to: Vec<String>,
    pub one_liner: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl KitContent {
    /// Copy used when no API key is configured or the model reply is unusable.
    pub fn placeholder() -> Self {
        Self {
            tagline: "Free invoice generator, no signup needed".into(),
            short: "Create professional invoices instantly. Free, no account required. Live preview + PDF download in seconds.".into(),
            medium: "MakeInvoice.online is a free invoice generator for freelancers and small businesses. Create professional invoices with live preview, download as PDF instantly. No signup required, works in any browser.".into(),
            long: "MakeInvoice.online is the easiest way to create professional invoices online. Built for freelancers, contractors, and small business owners who need to invoice clients quickly without expensive software. 100% free, no account needed, instant PDF download. Features include live preview, tax calculation, customizable templates, and support for multiple currencies and languages.".into(),
            keywords: strings(&[
                "free invoice generator",
                "invoice maker",
                "online invoicing",
                "pdf invoice",
                "freelance invoice",
                "small business invoicing",
                "invoice template",
                "create invoice online",
            ]),
            categories: Categories {
                primary: "Invoicing Software".into(),
                secondary: "Accounting Tools".into(),
                tags: strings(&[
                    "freelance",
                    "invoicing",
                    "small business",
                    "pdf",
                    "free tool",
                    "billing",
                ]),
            },
            alternatives_to: strings(&[
                "FreshBooks",
                "Wave",
                "Invoice Ninja",
                "Zoho Invoice",
                "PayPal Invoicing",
            ]),
            one_liner: "Free invoice generator: create & download PDF invoices instantly, no signup required.".into(),
        }
    }
}

pub fn copy_prompt(product: &Product) -> String {
    let features = product
        .features
        .iter()
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"You are an expert at writing software directory submissions that get approved and drive traffic.

Generate submission content for this product:

Product: {name}
URL: {url}
What it does: {description}
Target audience: {audience}
Category: {category}
Pricing: {pricing}
Key features:
{features}

Generate the following content variations. Be specific, benefit-focused, and avoid generic marketing speak.

Return ONLY valid JSON in this exact format:
{{
  "tagline": "One-line value proposition, max 60 chars",
  "short": "150 char description highlighting the key benefit",
  "medium": "300 char description covering what it is, who it's for, and key features",
  "long": "500 char description for detailed listings: full pitch covering features, benefits, and target users",
  "keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5", "keyword6", "keyword7", "keyword8"],
  "categories": {{
    "primary": "Main category (e.g. Invoicing Software)",
    "secondary": "Secondary category (e.g. Accounting Tools)",
    "tags": ["freelance", "invoicing", "small business", "pdf", "free tool"]
  }},
  "alternatives_to": ["FreshBooks", "Wave", "Invoice Ninja", "Zoho Invoice", "PayPal Invoicing"],
  "one_liner": "Tweet-length description under 120 chars"
}}"#,
        name = product.name,
        url = product.url,
        description = product.description,
        audience = product.target_audience,
        category = product.category,
        pricing = product.pricing,
    )
}

/// Parse the model reply, falling back to [`KitContent::placeholder`].
pub fn parse_copy(reply: Option<&str>) -> KitContent {
    match reply.and_then(llm::parse_embedded::<KitContent>) {
        Some(content) => content,
        None => {
            if reply.is_some() {
                tracing::warn!("directory copy reply did not parse, using placeholder copy");
            }
            KitContent::placeholder()
        }
    }
}

// ---------------------------------------------------------------------------
// Markdown kit
// ---------------------------------------------------------------------------

const TIERS: [(u8, &str); 3] = [
    (1, "🔴 Tier 1: High Priority (do these first)"),
    (2, "🟡 Tier 2: Good Value"),
    (3, "🟢 Tier 3: Quick Wins"),
];

pub fn tier_icon(tier: u8) -> &'static str {
    match tier {
        1 => "🔴",
        2 => "🟡",
        _ => "🟢",
    }
}

fn code_block(out: &mut Vec<String>, heading: &str, body: &str) {
    out.push(format!("### {heading}"));
    out.push("```".into());
    out.push(body.to_string());
    out.push("```".into());
    out.push(String::new());
}

pub fn render_kit(content: &KitContent, product: &Product, today: NaiveDate) -> String {
    let mut lines: Vec<String> = vec![
        format!("# {}: Directory Submission Kit", product.name),
        format!("Generated: {}  ", today.format("%B %d, %Y")),
        format!("Email to use: `{}`  ", product.email),
        format!("URL: `{}`", product.url),
        String::new(),
        "---".into(),
        String::new(),
        "## Ready-to-Use Content".into(),
        String::new(),
        "Copy-paste these into any directory form.".into(),
        String::new(),
    ];

    code_block(&mut lines, "Tagline (60 chars)", &content.tagline);
    code_block(&mut lines, "One-liner (120 chars)", &content.one_liner);
    code_block(&mut lines, "Short Description (150 chars)", &content.short);
    code_block(&mut lines, "Medium Description (300 chars)", &content.medium);
    code_block(&mut lines, "Long Description (500 chars)", &content.long);
    code_block(&mut lines, "Keywords / Tags", &content.keywords.join(", "));

    lines.push("### Categories".into());
    lines.push(format!("- **Primary:** {}", content.categories.primary));
    lines.push(format!("- **Secondary:** {}", content.categories.secondary));
    lines.push(format!("- **Tags:** {}", content.categories.tags.join(", ")));
    lines.push(String::new());

    code_block(
        &mut lines,
        "Alternatives To (use when asked)",
        &content.alternatives_to.join(", "),
    );

    lines.extend(
        [
            "---",
            "",
            "## Submission Checklist",
            "",
            "Check off each directory as you submit.",
            "",
        ]
        .map(String::from),
    );

    for (tier, label) in TIERS {
        lines.push(format!("### {label}"));
        lines.push(String::new());
        for d in DIRECTORIES.iter().filter(|d| d.tier == tier) {
            lines.push(format!("#### {}", d.name));
            lines.push("- [ ] **Status:** Not submitted".into());
            lines.push(format!("- **Submit here:** [{0}]({0})", d.submit_url));
            lines.push(format!("- **DA:** {} | **Link:** {}", d.da, d.link_type.as_str()));
            lines.push(format!("- **Note:** {}", d.notes));
            lines.push(String::new());
        }
    }

    lines.extend(
        [
            "---",
            "",
            "## Assets Checklist",
            "",
            "Have these ready before submitting:",
            "",
            "- [ ] Screenshot of the invoice generator (1280x800px)",
            "- [ ] Logo PNG (512x512px, transparent background)",
            "- [ ] Logo PNG (192x192px, for smaller fields)",
            "- [ ] OG image / banner (1200x630px)",
            "",
            "---",
            "",
            "## Tips",
            "",
            "- **ProductHunt:** Launch on Tuesday-Thursday for max exposure. Engage with comments on launch day.",
            "- **AlternativeTo:** Add as alternative to FreshBooks, Wave, Invoice Ninja. This drives traffic from people searching for free alternatives.",
            "- **G2/Capterra:** Ask your first users to leave a review. Even 2-3 reviews boosts visibility significantly.",
            "- **Indie Hackers:** Post a 'Show IH' post about building MakeInvoice, link to the product page.",
            "",
        ]
        .map(String::from),
    );

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Status listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryStatus {
    pub name: &'static str,
    pub tier: u8,
    pub da: u8,
    pub link_type: LinkType,
    pub submit_url: &'static str,
    pub status: SubmissionStatus,
    pub submitted_date: Option<NaiveDate>,
    pub approved_date: Option<NaiveDate>,
    pub backlink_url: Option<String>,
    pub notes: String,
}

/// Every known directory in kit order, joined with its tracked state.
/// Untracked directories read as pending.
pub fn status_rows(tracking: &DirectoryTracking) -> Vec<DirectoryStatus> {
    DIRECTORIES
        .iter()
        .map(|d| {
            let entry = tracking.submissions.get(d.name).cloned().unwrap_or_default();
            DirectoryStatus {
                name: d.name,
                tier: d.tier,
                da: d.da,
                link_type: d.link_type,
                submit_url: d.submit_url,
                status: entry.status,
                submitted_date: entry.submitted_date,
                approved_date: entry.approved_date,
                backlink_url: entry.backlink_url,
                notes: entry.notes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn fifteen_directories_across_three_tiers() {
        assert_eq!(DIRECTORIES.len(), 15);
        for tier in 1..=3 {
            assert_eq!(DIRECTORIES.iter().filter(|d| d.tier == tier).count(), 5);
        }
        let mut names: Vec<_> = directory_names().collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 15);
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_directory("product hunt").unwrap().da, 91);
        assert_eq!(find_directory(" G2 ").unwrap().link_type, LinkType::Nofollow);
        assert!(find_directory("Yahoo Directory").is_none());
    }

    #[test]
    fn prompt_lists_features() {
        let p = copy_prompt(&PRODUCT);
        assert!(p.contains("Product: MakeInvoice.online"));
        assert!(p.contains("- Instant PDF download\n"));
        assert!(p.contains("\"one_liner\""));
    }

    #[test]
    fn parse_copy_reads_embedded_json() {
        let reply = r#"Sure:
{"tagline":"T","short":"S","medium":"M","long":"L","keywords":["a","b"],
 "categories":{"primary":"P","secondary":"Q","tags":["x"]},
 "alternatives_to":["Wave"],"one_liner":"O"}"#;
        let c = parse_copy(Some(reply));
        assert_eq!(c.tagline, "T");
        assert_eq!(c.categories.tags, vec!["x"]);
    }

    #[test]
    fn parse_copy_falls_back() {
        assert_eq!(parse_copy(None), KitContent::placeholder());
        assert_eq!(parse_copy(Some("{\"tagline\": 1}")), KitContent::placeholder());
    }

    #[test]
    fn kit_has_every_section() {
        let kit = render_kit(&KitContent::placeholder(), &PRODUCT, date("2026-03-05"));
        assert!(kit.starts_with("# MakeInvoice.online: Directory Submission Kit\nGenerated: March 05, 2026  \n"));
        assert!(kit.contains("### Tagline (60 chars)\n```\nFree invoice generator, no signup needed\n```"));
        assert!(kit.contains("- **Tags:** freelance, invoicing, small business, pdf, free tool, billing"));
        assert!(kit.contains("## Assets Checklist"));
        assert!(kit.contains("## Tips"));
        for d in &DIRECTORIES {
            assert!(kit.contains(&format!("#### {}\n", d.name)));
        }
        assert_eq!(kit.matches("- [ ] **Status:** Not submitted").count(), 15);
    }

    #[test]
    fn checklist_groups_by_tier() {
        let kit = render_kit(&KitContent::placeholder(), &PRODUCT, date("2026-01-01"));
        let t1 = kit.find("### 🔴 Tier 1").unwrap();
        let t2 = kit.find("### 🟡 Tier 2").unwrap();
        let t3 = kit.find("### 🟢 Tier 3").unwrap();
        assert!(t1 < t2 && t2 < t3);
        let capterra = kit.find("#### Capterra").unwrap();
        let saashub = kit.find("#### SaaSHub").unwrap();
        let slant = kit.find("#### Slant").unwrap();
        assert!(t1 < capterra && capterra < t2);
        assert!(t2 < saashub && saashub < t3);
        assert!(t3 < slant);
        assert!(kit.contains("- **DA:** 93 | **Link:** nofollow"));
    }

    #[test]
    fn status_rows_default_to_pending() {
        let mut t = DirectoryTracking::default();
        t.init(["G2"]);
        t.mark(
            "G2",
            SubmissionStatus::Approved,
            Some("https://g2.com/p".into()),
            None,
            date("2026-02-02"),
        )
        .unwrap();
        let rows = status_rows(&t);
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].name, "Product Hunt");
        assert_eq!(rows[0].status, SubmissionStatus::Pending);
        let g2 = rows.iter().find(|r| r.name == "G2").unwrap();
        assert_eq!(g2.status, SubmissionStatus::Approved);
        assert_eq!(g2.backlink_url.as_deref(), Some("https://g2.com/p"));
    }
}
