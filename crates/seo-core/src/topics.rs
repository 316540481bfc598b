//! Static idea banks for the content engine and untracked-item selection.

use crate::tracking::{ContentKind, ContentTracking};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordTopic {
    pub keyword: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingKind {
    Industry(&'static str),
    Template(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandingIdea {
    /// Path under `landing-pages/`, without `.html`.
    pub slug: &'static str,
    pub title: &'static str,
    pub kind: LandingKind,
}

const fn kw(keyword: &'static str, title: &'static str) -> KeywordTopic {
    KeywordTopic { keyword, title }
}

const fn industry(slug: &'static str, title: &'static str, name: &'static str) -> LandingIdea {
    LandingIdea {
        slug,
        title,
        kind: LandingKind::Industry(name),
    }
}

const fn template(slug: &'static str, title: &'static str, kind: &'static str) -> LandingIdea {
    LandingIdea {
        slug,
        title,
        kind: LandingKind::Template(kind),
    }
}

pub const KEYWORD_TOPICS: &[KeywordTopic] = &[
    kw("freelance invoice template", "Free Freelance Invoice Template (2026)"),
    kw("how to invoice as a freelancer", "How to Invoice as a Freelancer: Complete Guide"),
    kw("invoice payment terms", "Invoice Payment Terms Explained: Net 30, Due on Receipt & More"),
    kw("what to include on an invoice", "What to Include on an Invoice: Essential Checklist"),
    kw("invoice vs receipt", "Invoice vs Receipt: What's the Difference?"),
    kw("how to ask for payment professionally", "How to Ask for Payment Professionally (Email Templates)"),
    kw("late payment email template", "Late Payment Reminder Email Templates That Work"),
    kw("small business invoice", "Small Business Invoice Guide: Templates & Best Practices"),
    kw("consulting invoice template", "Consulting Invoice Template: Free Download & Guide"),
    kw("how to number invoices", "Invoice Numbering: Best Systems for Your Business"),
    kw("invoice due date", "Setting Invoice Due Dates: Best Practices for Getting Paid"),
    kw("proforma invoice", "What is a Proforma Invoice? When and How to Use One"),
    kw("recurring invoice", "Recurring Invoices: How to Set Up Automatic Billing"),
    kw("invoice for services rendered", "How to Create an Invoice for Services Rendered"),
    kw("self employed invoice", "Self-Employed Invoice Template & Tax Tips"),
];

pub const LANDING_IDEAS: &[LandingIdea] = &[
    industry("invoice-generator-for-freelancers", "Invoice Generator for Freelancers", "freelancers"),
    industry("invoice-generator-for-photographers", "Invoice Generator for Photographers", "photographers"),
    industry("invoice-generator-for-consultants", "Invoice Generator for Consultants", "consultants"),
    industry("invoice-generator-for-web-designers", "Invoice Generator for Web Designers", "web designers"),
    industry("invoice-generator-for-contractors", "Invoice Generator for Contractors", "contractors"),
    industry(
        "invoice-generator-for-graphic-designers",
        "Invoice Generator for Graphic Designers",
        "graphic designers",
    ),
    industry("invoice-generator-for-writers", "Invoice Generator for Writers & Copywriters", "writers"),
    industry("invoice-generator-for-developers", "Invoice Generator for Developers", "developers"),
    industry(
        "invoice-generator-for-marketing-agencies",
        "Invoice Generator for Marketing Agencies",
        "marketing agencies",
    ),
    industry("invoice-generator-for-coaches", "Invoice Generator for Coaches & Trainers", "coaches"),
    template("templates/simple-invoice", "Simple Invoice Template", "simple"),
    template("templates/professional-invoice", "Professional Invoice Template", "professional"),
    template("templates/hourly-invoice", "Hourly Invoice Template", "hourly"),
    template("templates/project-invoice", "Project-Based Invoice Template", "project"),
];

pub const EVERGREEN_TOPICS: &[&str] = &[
    "Complete Guide to Getting Paid Faster as a Freelancer",
    "10 Common Invoicing Mistakes (And How to Avoid Them)",
    "How to Handle Clients Who Won't Pay",
    "Tax Deductions Every Freelancer Should Know",
    "Setting Your Freelance Rates: A Data-Driven Guide",
    "How to Create a Professional Invoice in 5 Minutes",
    "Invoice Terms and Conditions: What to Include",
    "Digital vs Paper Invoices: Pros and Cons",
    "How to Track Invoices and Payments Effectively",
    "Building Long-Term Client Relationships Through Professional Invoicing",
];

/// Pick up to `count` keyword topics not yet written. When every topic has
/// been written the keyword history is cleared and the whole bank is
/// eligible again.
pub fn select_keyword_topics<R: Rng + ?Sized>(
    tracking: &mut ContentTracking,
    count: usize,
    rng: &mut R,
) -> Vec<KeywordTopic> {
    let mut available: Vec<KeywordTopic> = KEYWORD_TOPICS
        .iter()
        .copied()
        .filter(|t| !tracking.is_created(ContentKind::Keyword, t.keyword))
        .collect();
    if available.is_empty() {
        tracing::info!("all keyword topics written, starting over");
        tracking.reset(ContentKind::Keyword);
        available = KEYWORD_TOPICS.to_vec();
    }
    available
        .choose_multiple(rng, count.min(available.len()))
        .copied()
        .collect()
}

/// Pick one evergreen title not yet written, resetting when exhausted.
pub fn select_evergreen_topic<R: Rng + ?Sized>(
    tracking: &mut ContentTracking,
    rng: &mut R,
) -> Option<&'static str> {
    let mut available: Vec<&'static str> = EVERGREEN_TOPICS
        .iter()
        .copied()
        .filter(|t| !tracking.is_created(ContentKind::Evergreen, t))
        .collect();
    if available.is_empty() {
        tracing::info!("all evergreen topics written, starting over");
        tracking.reset(ContentKind::Evergreen);
        available = EVERGREEN_TOPICS.to_vec();
    }
    available.choose(rng).copied()
}

/// Pick one landing idea not yet built. Landing pages are never rebuilt, so
/// an exhausted bank yields `None`.
pub fn select_landing_idea<R: Rng + ?Sized>(
    tracking: &ContentTracking,
    rng: &mut R,
) -> Option<LandingIdea> {
    let available: Vec<LandingIdea> = LANDING_IDEAS
        .iter()
        .copied()
        .filter(|p| !tracking.is_created(ContentKind::Landing, p.slug))
        .collect();
    available.choose(rng).copied()
}
