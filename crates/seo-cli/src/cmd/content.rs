use crate::agent::Agent;
use crate::cmd::questions;
use crate::llm::{best_effort, Llm};
use crate::output::print_report;
use anyhow::{Context, Result};
use seo_core::blog_page::render_blog_page;
use seo_core::content::{
    self, ArticleTopic, ContentLocation, ContentMode, ContentReport, ContentReview,
    CreatedContent, ARTICLE_SYSTEM_PROMPT, REVIEW_SYSTEM_PROMPT,
};
use seo_core::io::atomic_write;
use seo_core::paths::{self, slugify, BLOG_SLUG_MAX};
use seo_core::questions::CONTENT_MODE_PER_RUN;
use seo_core::topics;
use seo_core::tracking::{ContentKind, ContentTracking};
use std::path::Path;

/// Keyword articles written per run.
const KEYWORDS_PER_RUN: usize = 2;

pub fn run(root: &Path, mode: ContentMode, json: bool) -> Result<()> {
    let agent = Agent::load(root)?;
    let rt = tokio::runtime::Runtime::new()?;
    let Some(llm) = agent.llm() else {
        rt.block_on(agent.notify(&content::missing_key_message()));
        anyhow::bail!("ANTHROPIC_API_KEY not set");
    };

    tracing::info!(mode = %mode, "content engine starting");
    let engine = Engine {
        agent: &agent,
        llm: &llm,
    };
    let report = rt.block_on(engine.run(mode))?;
    let message = report.message(&agent.config.site);
    rt.block_on(agent.notify(&message));
    print_report(json, &report, &message)
}

struct Engine<'a> {
    agent: &'a Agent,
    llm: &'a Llm,
}

impl Engine<'_> {
    fn root(&self) -> &Path {
        &self.agent.root
    }

    fn load_tracking(&self) -> Result<ContentTracking> {
        ContentTracking::load(self.root()).context("failed to load content tracking")
    }

    fn save_tracking(&self, tracking: &ContentTracking) -> Result<()> {
        tracking
            .save(self.root())
            .context("failed to save content tracking")
    }

    async fn run(&self, mode: ContentMode) -> Result<ContentReport> {
        let mut report = ContentReport::new(mode);
        match mode {
            ContentMode::Keywords => self.keywords(&mut report).await?,
            ContentMode::Evergreen => self.evergreen(&mut report).await?,
            ContentMode::Landing => self.landing(&mut report).await?,
            ContentMode::Questions => self.questions(&mut report).await?,
            ContentMode::Mixed => {
                self.keywords(&mut report).await?;
                self.evergreen(&mut report).await?;
            }
        }
        Ok(report)
    }

    async fn keywords(&self, report: &mut ContentReport) -> Result<()> {
        let mut tracking = self.load_tracking()?;
        let picked =
            topics::select_keyword_topics(&mut tracking, KEYWORDS_PER_RUN, &mut rand::thread_rng());
        for t in picked {
            let topic = ArticleTopic::new(t.title, t.keyword);
            if let Some(created) = self.blog_article(&topic).await? {
                tracking.mark(ContentKind::Keyword, t.keyword);
                self.save_tracking(&tracking)?;
                report.created.push(created);
            }
        }
        Ok(())
    }

    async fn evergreen(&self, report: &mut ContentReport) -> Result<()> {
        let mut tracking = self.load_tracking()?;
        let Some(title) = topics::select_evergreen_topic(&mut tracking, &mut rand::thread_rng())
        else {
            return Ok(());
        };
        let topic = ArticleTopic::evergreen(title);
        if let Some(created) = self.blog_article(&topic).await? {
            tracking.mark(ContentKind::Evergreen, title);
            self.save_tracking(&tracking)?;
            report.created.push(created);
        }
        Ok(())
    }

    async fn landing(&self, report: &mut ContentReport) -> Result<()> {
        let mut tracking = self.load_tracking()?;
        let Some(idea) = topics::select_landing_idea(&tracking, &mut rand::thread_rng()) else {
            tracing::info!("every landing page has been built");
            return Ok(());
        };
        tracing::info!(page = idea.slug, "writing landing page");

        let (system, prompt) = content::landing_prompts(&idea);
        let Some(reply) = best_effort(
            self.llm
                .write(system, prompt, content::LANDING_MAX_TOKENS)
                .await,
            "landing page generation",
        ) else {
            return Ok(());
        };
        let html = content::landing_html(&reply);
        let path = paths::landing_page_path(self.root(), idea.slug);
        atomic_write(&path, html.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;

        let review = self.review(&html, "landing page").await;
        tracking.mark(ContentKind::Landing, idea.slug);
        self.save_tracking(&tracking)?;
        report.created.push(CreatedContent {
            title: idea.title.to_string(),
            keyword: None,
            source: None,
            score: review.score,
            location: ContentLocation::Landing(idea.slug.to_string()),
        });
        Ok(())
    }

    /// Question drafts, falling back to keyword articles when there is
    /// nothing worth writing.
    async fn questions(&self, report: &mut ContentReport) -> Result<()> {
        let found = questions::answer_new(self.agent, self.llm, CONTENT_MODE_PER_RUN).await?;
        if found.drafted.is_empty() {
            tracing::info!("no suitable questions, falling back to keyword articles");
            report.mode = ContentMode::Keywords;
            return self.keywords(report).await;
        }
        report
            .created
            .extend(found.drafted.into_iter().map(|d| CreatedContent {
                title: d.title,
                keyword: None,
                source: Some(d.source),
                score: d.quality,
                location: ContentLocation::Draft(d.file),
            }));
        Ok(())
    }

    async fn review(&self, body: &str, kind: &str) -> ContentReview {
        let reply = best_effort(
            self.llm
                .write(
                    REVIEW_SYSTEM_PROMPT,
                    content::review_user_prompt(body, kind),
                    content::REVIEW_MAX_TOKENS,
                )
                .await,
            "content review",
        );
        content::parse_review(reply.as_deref())
    }

    async fn generate(&self, topic: &ArticleTopic) -> Option<String> {
        best_effort(
            self.llm
                .write(
                    ARTICLE_SYSTEM_PROMPT,
                    content::article_user_prompt(topic),
                    content::ARTICLE_MAX_TOKENS,
                )
                .await,
            "article generation",
        )
    }

    /// Write, review (regenerating once on a poor score) and publish one
    /// article under `blog/`.
    async fn blog_article(&self, topic: &ArticleTopic) -> Result<Option<CreatedContent>> {
        tracing::info!(title = %topic.title, "writing article");
        let Some(reply) = self.generate(topic).await else {
            return Ok(None);
        };
        let mut article = content::parse_article(&reply, topic);

        let review = self.review(&article.content_html, "blog article").await;
        if review.needs_regeneration() {
            tracing::info!(score = review.score, "low review score, regenerating");
            if let Some(reply) = self.generate(topic).await {
                article = content::parse_article(&reply, topic);
            }
        }

        let slug = slugify(&topic.title, BLOG_SLUG_MAX);
        let html = render_blog_page(&article, &slug, &self.agent.config.site, self.agent.today());
        let path = paths::blog_page_path(self.root(), &slug);
        atomic_write(&path, html.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "article published");

        let title = if article.title.trim().is_empty() {
            topic.title.clone()
        } else {
            article.title
        };
        Ok(Some(CreatedContent {
            title,
            keyword: Some(topic.keyword.clone()),
            source: None,
            score: review.score,
            location: ContentLocation::Blog(slug),
        }))
    }
}
