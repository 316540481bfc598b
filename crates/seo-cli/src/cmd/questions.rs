use crate::agent::Agent;
use crate::llm::{best_effort, Llm};
use crate::output::print_report;
use anyhow::{Context, Result};
use seo_core::questions::{
    self, DraftedArticle, Question, QuestionsReport, RedditClient, ARTICLE_SYSTEM_PROMPT,
    EVALUATE_SYSTEM_PROMPT, PROCESS_PER_RUN, REVIEW_SYSTEM_PROMPT,
};
use seo_core::tracking::AnsweredQuestions;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> Result<()> {
    let agent = Agent::load(root)?;
    let llm = agent.require_llm()?;
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(answer_new(&agent, &llm, PROCESS_PER_RUN))?;
    let message = report.message();
    rt.block_on(agent.notify(&message));
    print_report(json, &report, &message)
}

/// Fetch recent questions, ranked by engagement.
async fn discover(agent: &Agent) -> Vec<Question> {
    let mut reddit = RedditClient::new(&agent.config.endpoints.reddit);
    if let (Some(id), Some(secret)) = (
        agent.secrets.reddit_client_id.as_deref(),
        agent.secrets.reddit_client_secret.as_deref(),
    ) {
        reddit.authenticate(id, secret).await;
    }
    reddit.discover().await
}

/// Draft articles for up to `limit` unanswered questions. Questions that
/// are drafted are recorded as answered straight away.
pub(crate) async fn answer_new(agent: &Agent, llm: &Llm, limit: usize) -> Result<QuestionsReport> {
    let found = discover(agent).await;
    tracing::info!(count = found.len(), "questions found");

    let mut answered =
        AnsweredQuestions::load(&agent.root).context("failed to load answered questions")?;
    let fresh: Vec<&Question> = found
        .iter()
        .filter(|q| !answered.contains_title(&q.title))
        .collect();
    tracing::info!(count = fresh.len(), "questions not yet answered");

    let mut report = QuestionsReport {
        found: found.len(),
        new: fresh.len(),
        drafted: Vec::new(),
    };
    for q in fresh.into_iter().take(limit) {
        let Some(drafted) = draft(agent, llm, q).await? else {
            continue;
        };
        answered.insert_title(&q.title);
        answered
            .save(&agent.root)
            .context("failed to save answered questions")?;
        report.drafted.push(drafted);
    }
    Ok(report)
}

/// Evaluate, write, review and save one question. `None` when the question
/// is not worth an article or the article could not be written.
async fn draft(agent: &Agent, llm: &Llm, q: &Question) -> Result<Option<DraftedArticle>> {
    let reply = best_effort(
        llm.write(
            EVALUATE_SYSTEM_PROMPT,
            questions::evaluate_user_prompt(q),
            questions::EVALUATE_MAX_TOKENS,
        )
        .await,
        "question evaluation",
    );
    let eval = questions::parse_evaluation(reply.as_deref());
    if !eval.worth_writing {
        tracing::info!(question = %q.title, reason = %eval.reason, "skipping question");
        return Ok(None);
    }
    tracing::info!(question = %q.title, potential = %eval.search_potential, "writing article");

    let Some(article) = best_effort(
        llm.write(
            ARTICLE_SYSTEM_PROMPT,
            questions::article_user_prompt(q, &eval),
            questions::ARTICLE_MAX_TOKENS,
        )
        .await,
        "article generation",
    ) else {
        return Ok(None);
    };

    let reply = best_effort(
        llm.write(
            REVIEW_SYSTEM_PROMPT,
            questions::review_user_prompt(q, &article),
            questions::REVIEW_MAX_TOKENS,
        )
        .await,
        "article review",
    );
    let review = questions::parse_article_review(reply.as_deref());
    let body = match review.revision() {
        Some(revised) => {
            tracing::info!(score = review.quality_score, "using revised article");
            revised
        }
        None => article.as_str(),
    };

    let file = questions::save_draft(&agent.root, body, &eval, q, agent.today())
        .context("failed to save draft")?;
    tracing::info!(file = %file, "saved draft");
    Ok(Some(DraftedArticle {
        title: eval.title_for(q).to_string(),
        file,
        source: q.source.clone(),
        quality: review.quality_score,
    }))
}
