//! Question discovery: find invoicing questions on Reddit and turn the best
//! ones into Markdown article drafts.

use crate::error::{Result, SeoError};
use crate::llm::{self, truncate_chars};
use crate::paths;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub const SUBREDDITS: &[&str] = &[
    "freelance",
    "smallbusiness",
    "Entrepreneur",
    "accounting",
    "selfemployed",
];

pub const SEARCH_KEYWORDS: &[&str] = &[
    "invoice",
    "invoicing",
    "billing client",
    "payment terms",
    "charge client",
];

const QUESTION_WORDS: &[&str] = &["how", "what", "why", "when", "should", "can", "do", "is"];

pub const USER_AGENT: &str = "InvoiceBot/1.0";
const REDDIT_TIMEOUT: Duration = Duration::from_secs(10);
const BODY_CHARS: usize = 500;
/// Questions kept after ranking.
pub const MAX_QUESTIONS: usize = 20;
/// Questions the standalone agent evaluates per run.
pub const PROCESS_PER_RUN: usize = 3;
/// Questions the content engine's `questions` mode evaluates per run.
pub const CONTENT_MODE_PER_RUN: usize = 2;
/// Reviews scoring below this are replaced by the reviewer's revision.
pub const REVISE_BELOW: f64 = 7.0;

pub const EVALUATE_MAX_TOKENS: u32 = 500;
pub const ARTICLE_MAX_TOKENS: u32 = 4096;
pub const REVIEW_MAX_TOKENS: u32 = 5000;

// ---------------------------------------------------------------------------
// Reddit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub source: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub comments: i64,
    pub url: String,
    pub engagement: i64,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    #[serde(default)]
    data: Post,
}

#[derive(Debug, Default, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// A title reads as a question if it has a `?` or starts with a question
/// word. The match is a plain prefix, so "Does", "How's" and "Isn't" count.
pub fn is_question(title: &str) -> bool {
    if title.contains('?') {
        return true;
    }
    let lower = title.trim().to_lowercase();
    QUESTION_WORDS.iter().any(|w| lower.starts_with(w))
}

/// Sort by engagement, drop repeated titles (case-insensitive), keep the top
/// [`MAX_QUESTIONS`].
pub fn rank_questions(mut questions: Vec<Question>) -> Vec<Question> {
    questions.sort_by(|a, b| b.engagement.cmp(&a.engagement));
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .filter(|q| seen.insert(q.title.to_lowercase()))
        .take(MAX_QUESTIONS)
        .collect()
}

pub struct RedditClient {
    base_url: String,
    http: reqwest::Client,
    bearer: Option<String>,
}

impl RedditClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            bearer: None,
        }
    }

    /// Client-credentials login. Failure leaves the client anonymous.
    pub async fn authenticate(&mut self, client_id: &str, client_secret: &str) {
        let url = format!("{}/api/v1/access_token", self.base_url);
        let resp = self
            .http
            .post(&url)
            .basic_auth(client_id, Some(client_secret))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&[("grant_type", "client_credentials")])
            .timeout(REDDIT_TIMEOUT)
            .send()
            .await;
        match resp {
            Ok(r) if r.status().is_success() => match r.json::<TokenResponse>().await {
                Ok(TokenResponse {
                    access_token: Some(token),
                }) => self.bearer = Some(token),
                Ok(_) => tracing::warn!("reddit token response had no access_token"),
                Err(e) => tracing::warn!(error = %e, "reddit token response did not parse"),
            },
            Ok(r) => tracing::warn!(status = r.status().as_u16(), "reddit auth rejected"),
            Err(e) => tracing::warn!(error = %e, "reddit auth failed"),
        }
    }

    async fn search(&self, subreddit: &str, keyword: &str) -> Result<Vec<Question>> {
        let url = format!("{}/r/{subreddit}/search.json", self.base_url);
        let mut req = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("q", keyword),
                ("sort", "new"),
                ("limit", "10"),
                ("t", "month"),
                ("restrict_sr", "true"),
            ])
            .timeout(REDDIT_TIMEOUT);
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SeoError::UpstreamStatus {
                service: "reddit",
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let listing: Listing = resp.json().await?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|c| c.data)
            .filter(|p| is_question(&p.title))
            .map(|p| Question {
                source: format!("r/{subreddit}"),
                body: truncate_chars(&p.selftext, BODY_CHARS).to_string(),
                engagement: p.score + p.num_comments * 2,
                score: p.score,
                comments: p.num_comments,
                url: format!("https://reddit.com{}", p.permalink),
                title: p.title,
            })
            .collect())
    }

    /// Search every subreddit for every keyword and rank the questions found.
    /// A failed search is logged and skipped.
    pub async fn discover(&self) -> Vec<Question> {
        let mut all = Vec::new();
        for sub in SUBREDDITS {
            for kw in SEARCH_KEYWORDS {
                match self.search(sub, kw).await {
                    Ok(found) => all.extend(found),
                    Err(e) => {
                        tracing::warn!(subreddit = *sub, keyword = *kw, error = %e, "reddit search failed")
                    }
                }
            }
        }
        rank_questions(all)
    }
}

// ---------------------------------------------------------------------------
// Evaluation, writing and review
// ---------------------------------------------------------------------------

pub const EVALUATE_SYSTEM_PROMPT: &str = r#"You are an SEO content strategist for MakeInvoice.online, a free invoice generator.
Evaluate if this question is worth writing a blog post about.

Consider:
- Search potential (would people Google this?)
- Relevance to our product (invoice generator)
- Ability to naturally mention our tool
- Competition (is this already well-answered online?)

Return JSON only:
{
  "worth_writing": true/false,
  "reason": "brief explanation",
  "search_potential": "high/medium/low",
  "suggested_title": "SEO-optimized title",
  "target_keywords": ["keyword1", "keyword2"]
}"#;

pub const ARTICLE_SYSTEM_PROMPT: &str = r#"You are an expert content writer for MakeInvoice.online, a free online invoice generator.

Write a comprehensive, helpful blog post that:
1. Directly answers the user's question
2. Is SEO-optimized for the target keywords
3. Includes practical, actionable advice
4. Naturally mentions MakeInvoice.online where relevant (not forced)
5. Uses proper heading structure (H2, H3)
6. Includes a FAQ section at the end with 3-4 related questions
7. Is 1000-1500 words

Format the article in Markdown with:
- Engaging title (H1)
- Meta description (in a comment at top)
- Clear sections with H2 headings
- Bullet points and numbered lists where appropriate
- FAQ section at the end
- Brief author bio mentioning MakeInvoice.online

Do NOT include generic fluff. Every sentence should add value."#;

pub const REVIEW_SYSTEM_PROMPT: &str = r#"You are a senior editor reviewing a blog post for MakeInvoice.online.

Review the article for:
1. Accuracy - Is the information correct?
2. Helpfulness - Does it actually answer the question?
3. SEO - Good title, headings, keyword usage?
4. Readability - Clear, engaging, well-structured?
5. CTA - Natural mention of the product (not too salesy)?
6. Completeness - Are there gaps?

Return JSON:
{
  "approved": true/false,
  "quality_score": 1-10,
  "issues": ["issue1", "issue2"],
  "suggestions": ["suggestion1", "suggestion2"],
  "revised_article": "full revised article if score < 7, otherwise null"
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub worth_writing: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub search_potential: String,
    #[serde(default)]
    pub suggested_title: Option<String>,
    #[serde(default)]
    pub target_keywords: Vec<String>,
}

impl Evaluation {
    fn failed() -> Self {
        Self {
            worth_writing: false,
            reason: "Evaluation failed".to_string(),
            search_potential: String::new(),
            suggested_title: None,
            target_keywords: Vec::new(),
        }
    }

    /// The suggested title, or the question's own title.
    pub fn title_for<'a>(&'a self, question: &'a Question) -> &'a str {
        self.suggested_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&question.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleReview {
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub revised_article: Option<String>,
}

impl ArticleReview {
    fn failed() -> Self {
        Self {
            approved: false,
            quality_score: 0.0,
            issues: vec!["Review failed".to_string()],
            suggestions: Vec::new(),
            revised_article: None,
        }
    }

    /// The revision to publish instead of the draft, if the draft scored low
    /// and the reviewer supplied one.
    pub fn revision(&self) -> Option<&str> {
        if self.quality_score >= REVISE_BELOW {
            return None;
        }
        self.revised_article
            .as_deref()
            .filter(|a| !a.trim().is_empty())
    }
}

pub fn evaluate_user_prompt(q: &Question) -> String {
    format!(
        "Question from {}:\nTitle: {}\nBody: {}\nEngagement: {} (score + comments)",
        q.source, q.title, q.body, q.engagement
    )
}

/// Missing or unparseable evaluations mean "not worth writing".
pub fn parse_evaluation(reply: Option<&str>) -> Evaluation {
    reply
        .and_then(llm::parse_embedded::<Evaluation>)
        .unwrap_or_else(Evaluation::failed)
}

pub fn article_user_prompt(q: &Question, eval: &Evaluation) -> String {
    format!(
        "Write an article based on this question:\n\n\
         Original Question: {}\n\
         Context: {}\n\
         Source: {}\n\n\
         Target Keywords: {}\n\
         Suggested Title: {}\n\n\
         Remember: Be genuinely helpful first. The goal is to become a trusted resource, not to hard-sell our product.",
        q.title,
        q.body,
        q.source,
        eval.target_keywords.join(", "),
        eval.title_for(q)
    )
}

pub fn review_user_prompt(q: &Question, article: &str) -> String {
    format!("Original question: {}\n\nArticle to review:\n{article}", q.title)
}

/// Missing or unparseable reviews score 0 with no revision.
pub fn parse_article_review(reply: Option<&str>) -> ArticleReview {
    reply
        .and_then(llm::parse_embedded::<ArticleReview>)
        .unwrap_or_else(ArticleReview::failed)
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    date: String,
    keywords: &'a [String],
    source: &'a str,
    source_url: &'a str,
    status: &'static str,
}

/// `<YYYY-MM-DD>-<slug>.md`
pub fn draft_filename(title: &str, today: NaiveDate) -> String {
    format!(
        "{}-{}.md",
        today.format("%Y-%m-%d"),
        paths::slugify(title, paths::QUESTION_SLUG_MAX)
    )
}

pub fn render_draft(
    article: &str,
    eval: &Evaluation,
    q: &Question,
    today: NaiveDate,
) -> Result<String> {
    let fm = FrontMatter {
        title: eval.title_for(q),
        date: today.format("%Y-%m-%d").to_string(),
        keywords: &eval.target_keywords,
        source: &q.source,
        source_url: &q.url,
        status: "draft",
    };
    let yaml = serde_yaml::to_string(&fm)?;
    Ok(format!("---\n{yaml}---\n\n{article}"))
}

/// Write a draft under `blog/posts/`; returns the file name.
pub fn save_draft(
    root: &Path,
    article: &str,
    eval: &Evaluation,
    q: &Question,
    today: NaiveDate,
) -> Result<String> {
    let filename = draft_filename(eval.title_for(q), today);
    let content = render_draft(article, eval, q, today)?;
    crate::io::atomic_write(&paths::blog_posts_dir(root).join(&filename), content.as_bytes())?;
    Ok(filename)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftedArticle {
    pub title: String,
    pub file: String,
    pub source: String,
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionsReport {
    pub found: usize,
    pub new: usize,
    pub drafted: Vec<DraftedArticle>,
}

impl QuestionsReport {
    pub fn message(&self) -> String {
        if self.new == 0 {
            return "📭 *Question Discovery Agent*\n\nNo new questions found this week.".to_string();
        }
        if self.drafted.is_empty() {
            return "📭 *Question Discovery Agent*\n\nEvaluated questions but none were worth writing about this week."
                .to_string();
        }
        let mut msg = format!(
            "📝 *Question Discovery Agent*\n\nCreated {} article(s):\n\n",
            self.drafted.len()
        );
        for a in &self.drafted {
            msg.push_str(&format!(
                "• *{}*\n  Source: {} | Quality: {}/10\n  File: `{}`\n\n",
                a.title, a.source, a.quality, a.file
            ));
        }
        msg.push_str("Review and approve the PR to publish.");
        msg
    }
}
