#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Mock, Server, ServerGuard};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

const SECRET_VARS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "INDEXNOW_KEY",
    "GSC_SERVICE_ACCOUNT_JSON",
    "GSC_SITE_URL",
    "REDDIT_CLIENT_ID",
    "REDDIT_CLIENT_SECRET",
];

const TEST_KEY: &str = include_str!("../../seo-core/testdata/service_account_key.pem");

fn agents(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("seo-agents").unwrap();
    cmd.current_dir(dir.path()).env("SEO_ROOT", dir.path());
    for var in SECRET_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// A site root whose every external endpoint points at `server`.
fn site_with(server: &ServerGuard) -> TempDir {
    let dir = TempDir::new().unwrap();
    let url = server.url();
    std::fs::create_dir_all(dir.path().join("agents")).unwrap();
    std::fs::write(
        dir.path().join("agents/config.yaml"),
        format!(
            "site:\n  url: {url}\n\
             endpoints:\n  anthropic: {url}\n  telegram: {url}\n  indexnow: {url}/indexnow\n  \
             google_ping: {url}/google\n  bing_ping: {url}/bing\n  search_console: {url}\n  \
             google_token: {url}/token\n  reddit: {url}\n"
        ),
    )
    .unwrap();
    dir
}

fn claude_reply(text: &str) -> String {
    json!({
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 10, "output_tokens": 20}
    })
    .to_string()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// directory
// ---------------------------------------------------------------------------

#[test]
fn directory_kit_without_key_uses_placeholder_copy() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .args(["directory", "kit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("15 directories ready"))
        .stdout(predicate::str::contains("Product Hunt"));

    let kit = std::fs::read_to_string(dir.path().join("agents/directory_kit.md")).unwrap();
    assert!(kit.contains("Directory Submission Kit"));
    assert!(kit.contains("Free invoice generator, no signup needed"));
    assert!(kit.contains("Tier 1: High Priority"));

    let tracking = read_json(&dir.path().join("agents/directory_tracking.json"));
    let submissions = tracking["submissions"].as_object().unwrap();
    assert_eq!(submissions.len(), 15);
    assert!(submissions.values().all(|s| s["status"] == "pending"));
}

#[test]
fn directory_kit_keeps_existing_status() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .args(["directory", "mark", "G2", "--status", "approved"])
        .assert()
        .success();
    agents(&dir).args(["directory", "kit"]).assert().success();

    let tracking = read_json(&dir.path().join("agents/directory_tracking.json"));
    assert_eq!(tracking["submissions"]["G2"]["status"], "approved");
}

#[test]
fn directory_mark_then_list() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .args([
            "directory",
            "mark",
            "product hunt",
            "--status",
            "submitted",
            "--notes",
            "launched on a Tuesday",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Product Hunt: submitted"));

    let output = agents(&dir)
        .args(["directory", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows = stdout_json(&output);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 15);
    let ph = rows.iter().find(|r| r["name"] == "Product Hunt").unwrap();
    assert_eq!(ph["status"], "submitted");
    assert_eq!(ph["notes"], "launched on a Tuesday");
    assert!(ph["submitted_date"].is_string());
    assert!(ph["approved_date"].is_null());

    agents(&dir)
        .args(["directory", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("STATUS"))
        .stdout(predicate::str::contains("submitted"));
}

#[test]
fn directory_mark_unknown_name_fails() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .args(["directory", "mark", "Yahoo Directory", "--status", "submitted"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown directory"));
}

#[test]
fn directory_mark_rejects_bad_status() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .args(["directory", "mark", "G2", "--status", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maybe"));
}

// ---------------------------------------------------------------------------
// schema
// ---------------------------------------------------------------------------

const FAQ_PAGE: &str = r#"<html><head>
  <title>Net 30 Explained</title>
  <script type="application/ld+json">
  {"@type": "Article", "mainEntityOfPage": {"@type": "WebPage", "@id": "https://www.makeinvoice.online/blog/net-30.html"}}
  </script>
</head><body><main><article>
  <h2>Frequently Asked Questions</h2>
  <h3>What does net 30 mean?</h3>
  <p>Payment is due 30 days after the invoice date.</p>
</article></main></body></html>"#;

#[test]
fn schema_injects_extracted_faqs() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("blog")).unwrap();
    std::fs::write(dir.path().join("blog/net-30.html"), FAQ_PAGE).unwrap();
    std::fs::write(dir.path().join("blog/index.html"), "<html><head></head></html>").unwrap();

    agents(&dir)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files processed: 1"))
        .stdout(predicate::str::contains("FAQ schema injected: 1"))
        .stdout(predicate::str::contains("mainEntityOfPage URLs fixed: 1"));

    let html = std::fs::read_to_string(dir.path().join("blog/net-30.html")).unwrap();
    assert!(html.contains("FAQPage"));
    assert!(html.contains("What does net 30 mean?"));
    assert!(html.contains(r#""@id": "https://www.makeinvoice.online/blog/net-30""#));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("blog/index.html")).unwrap(),
        "<html><head></head></html>"
    );

    // A second pass finds the schema already in place.
    agents(&dir)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already had schema: 1"));
}

#[test]
fn schema_generates_faqs_with_key() {
    let mut server = Server::new();
    let dir = site_with(&server);
    std::fs::create_dir_all(dir.path().join("blog")).unwrap();
    std::fs::write(
        dir.path().join("blog/late-fees.html"),
        "<html><head><title>Late Fees</title>\n\
         <meta name=\"description\" content=\"Charging late fees\">\n</head>\
         <body><main><article><p>Body</p></article></main></body></html>",
    )
    .unwrap();
    let claude = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 1024})))
        .with_status(200)
        .with_body(claude_reply(
            r#"[{"question": "Can I charge a late fee?", "answer": "Yes, if your terms say so."}]"#,
        ))
        .expect(1)
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["schema", "blog/late-fees.html", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    claude.assert();

    let report = stdout_json(&output);
    assert_eq!(report["files"], 1);
    assert_eq!(report["generated"], 1);
    assert_eq!(report["injected"], 1);

    let html = std::fs::read_to_string(dir.path().join("blog/late-fees.html")).unwrap();
    assert!(html.contains("FAQPage"));
    assert!(html.contains("Can I charge a late fee?"));
}

#[test]
fn schema_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .args(["schema", "blog/nope.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

// ---------------------------------------------------------------------------
// auto-index
// ---------------------------------------------------------------------------

#[test]
fn auto_index_submits_only_new_urls() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let url = server.url();
    let _sitemap = server
        .mock("GET", "/sitemap.xml")
        .with_status(200)
        .with_body(format!(
            "<urlset><url><loc>{url}/</loc></url><url><loc>{url}/blog/net-30</loc></url></urlset>"
        ))
        .create();
    let _google = server
        .mock("GET", "/google/ping")
        .match_query(Matcher::Any)
        .with_status(200)
        .create();
    let _bing = server
        .mock("GET", "/bing/ping")
        .match_query(Matcher::Any)
        .with_status(200)
        .create();
    let indexnow = server
        .mock("POST", "/indexnow")
        .match_body(Matcher::PartialJson(json!({
            "key": "test-key",
            "urlList": [format!("{url}/"), format!("{url}/blog/net-30")]
        })))
        .with_status(202)
        .expect(1)
        .create();
    let telegram = server
        .mock("POST", "/botT/sendMessage")
        .match_body(Matcher::Regex("Auto-Index Agent Complete".into()))
        .with_status(200)
        .expect(2)
        .create();

    let run = |dir: &TempDir| {
        let output = agents(dir)
            .env("INDEXNOW_KEY", "test-key")
            .env("TELEGRAM_BOT_TOKEN", "T")
            .env("TELEGRAM_CHAT_ID", "1")
            .args(["auto-index", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        stdout_json(&output)
    };

    let first = run(&dir);
    assert_eq!(first["total_urls"], 2);
    assert_eq!(first["new_urls"].as_array().unwrap().len(), 2);
    assert_eq!(first["google_ok"], true);
    assert_eq!(first["indexnow"], "accepted");

    let tracked = read_json(&dir.path().join("agents/.indexed_urls.json"));
    assert_eq!(tracked["urls"].as_array().unwrap().len(), 2);

    let second = run(&dir);
    assert_eq!(second["new_urls"].as_array().unwrap().len(), 0);
    assert!(second["indexnow"].is_null());

    indexnow.assert();
    telegram.assert();
}

#[test]
fn auto_index_survives_missing_sitemap() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let _sitemap = server.mock("GET", "/sitemap.xml").with_status(500).create();
    let _pings = server
        .mock("GET", Matcher::Regex("/ping$".into()))
        .match_query(Matcher::Any)
        .with_status(200)
        .create();

    agents(&dir)
        .arg("auto-index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total URLs: 0"));
}

// ---------------------------------------------------------------------------
// content
// ---------------------------------------------------------------------------

#[test]
fn content_without_key_notifies_and_fails() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let telegram = server
        .mock("POST", "/botT/sendMessage")
        .match_body(Matcher::Regex("Content Engine Error".into()))
        .with_status(200)
        .expect(1)
        .create();

    agents(&dir)
        .env("TELEGRAM_BOT_TOKEN", "T")
        .env("TELEGRAM_CHAT_ID", "1")
        .args(["content", "keywords"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
    telegram.assert();
}

#[test]
fn content_rejects_unknown_mode() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .args(["content", "poetry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mode"));
}

#[test]
fn content_keywords_publishes_two_articles() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let article = json!({
        "title": "Generated Article",
        "meta_description": "A helpful guide.",
        "read_time": "6 min read",
        "content_html": "<p class=\"text-gray-600 mb-4\">Helpful body.</p>"
    })
    .to_string();
    let writes = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 6000})))
        .with_status(200)
        .with_body(claude_reply(&article))
        .expect(2)
        .create();
    let reviews = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 500})))
        .with_status(200)
        .with_body(claude_reply(r#"{"score": 8, "issues": [], "approved": true}"#))
        .expect(2)
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["content", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    writes.assert();
    reviews.assert();

    let report = stdout_json(&output);
    assert_eq!(report["mode"], "keywords");
    let created = report["created"].as_array().unwrap();
    assert_eq!(created.len(), 2);
    for item in created {
        assert_eq!(item["score"], 8.0);
        assert_eq!(item["location"]["kind"], "blog");
        let slug = item["location"]["path"].as_str().unwrap();
        let page = std::fs::read_to_string(dir.path().join(format!("blog/{slug}.html"))).unwrap();
        assert!(page.contains("Helpful body."));
    }

    let tracking = read_json(&dir.path().join("agents/.content_tracking.json"));
    assert_eq!(tracking["created_keywords"].as_array().unwrap().len(), 2);
}

#[test]
fn content_landing_writes_page() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let _page = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 5000})))
        .with_status(200)
        .with_body(claude_reply("```html\n<html><body>Landing</body></html>\n```"))
        .create();
    let _review = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 500})))
        .with_status(200)
        .with_body(claude_reply("not json"))
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["content", "landing", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    let created = report["created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["score"], 7.0);
    assert_eq!(created[0]["location"]["kind"], "landing");
    let slug = created[0]["location"]["path"].as_str().unwrap();
    let html =
        std::fs::read_to_string(dir.path().join(format!("landing-pages/{slug}.html"))).unwrap();
    assert_eq!(html.trim(), "<html><body>Landing</body></html>");
}

fn article_reply(title: &str) -> String {
    claude_reply(
        &json!({
            "title": title,
            "meta_description": "A helpful guide.",
            "read_time": "6 min read",
            "content_html": format!("<p>{title} body.</p>")
        })
        .to_string(),
    )
}

#[test]
fn content_regenerates_poorly_reviewed_article() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let writes = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 6000})))
        .with_status(200)
        .with_body(article_reply("Rewritten Article"))
        .expect(4)
        .create();
    let reviews = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 500})))
        .with_status(200)
        .with_body(claude_reply(r#"{"score": 3, "issues": ["thin"], "approved": false}"#))
        .expect(2)
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["content", "keywords", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    // One regeneration per article, no second review.
    writes.assert();
    reviews.assert();

    let report = stdout_json(&output);
    let created = report["created"].as_array().unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|c| c["score"] == 3.0));
}

#[test]
fn content_questions_mode_falls_back_to_keywords() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let reddit = server
        .mock("GET", Matcher::Regex(r"^/r/\w+/search\.json".into()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data": {"children": []}}"#)
        .expect_at_least(1)
        .create();
    let writes = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 6000})))
        .with_status(200)
        .with_body(article_reply("Keyword Article"))
        .expect(2)
        .create();
    let reviews = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 500})))
        .with_status(200)
        .with_body(claude_reply(r#"{"score": 8, "issues": [], "approved": true}"#))
        .expect(2)
        .create();
    let drafts = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 4096})))
        .expect(0)
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["content", "questions", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    reddit.assert();
    writes.assert();
    reviews.assert();
    drafts.assert();

    let report = stdout_json(&output);
    assert_eq!(report["mode"], "keywords");
    let created = report["created"].as_array().unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|c| c["location"]["kind"] == "blog"));
    assert!(!dir.path().join("blog/posts").exists());
}

#[test]
fn content_evergreen_publishes_one_article() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let _write = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 6000})))
        .with_status(200)
        .with_body(article_reply("Evergreen Guide"))
        .expect(1)
        .create();
    let _review = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 500})))
        .with_status(200)
        .with_body(claude_reply(r#"{"score": 9}"#))
        .expect(1)
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["content", "evergreen", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["mode"], "evergreen");
    let created = report["created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["title"], "Evergreen Guide");
    assert_eq!(created[0]["score"], 9.0);

    let tracking = read_json(&dir.path().join("agents/.content_tracking.json"));
    let evergreen = tracking["created_evergreen"].as_array().unwrap();
    assert_eq!(evergreen.len(), 1);
    let title = evergreen[0].as_str().unwrap();
    assert_eq!(created[0]["keyword"], title.to_lowercase());
    assert!(tracking["created_keywords"].as_array().unwrap().is_empty());
}

#[test]
fn content_mixed_writes_keywords_then_evergreen() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let writes = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 6000})))
        .with_status(200)
        .with_body(article_reply("Mixed Article"))
        .expect(3)
        .create();
    let reviews = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 500})))
        .with_status(200)
        .with_body(claude_reply(r#"{"score": 8}"#))
        .expect(3)
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["content", "mixed", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    writes.assert();
    reviews.assert();

    let report = stdout_json(&output);
    assert_eq!(report["mode"], "mixed");
    assert_eq!(report["created"].as_array().unwrap().len(), 3);

    let tracking = read_json(&dir.path().join("agents/.content_tracking.json"));
    assert_eq!(tracking["created_keywords"].as_array().unwrap().len(), 2);
    assert_eq!(tracking["created_evergreen"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// questions
// ---------------------------------------------------------------------------

fn reddit_listing() -> String {
    json!({
        "data": {"children": [
            {"data": {
                "title": "How do I invoice a client who pays late?",
                "selftext": "They are always 60 days behind.",
                "score": 12,
                "num_comments": 4,
                "permalink": "/r/freelance/comments/abc/late/"
            }},
            {"data": {"title": "My new logo", "selftext": "", "score": 50, "num_comments": 1, "permalink": "/r/x/1/"}}
        ]}
    })
    .to_string()
}

#[test]
fn questions_without_key_fails() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .arg("questions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn questions_drafts_article_once() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let _reddit = server
        .mock("GET", Matcher::Regex(r"^/r/\w+/search\.json".into()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(reddit_listing())
        .create();
    let evaluate = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 500})))
        .with_status(200)
        .with_body(claude_reply(
            r#"{"worth_writing": true, "reason": "common", "search_potential": "high",
                "suggested_title": "Invoicing Late Payers", "target_keywords": ["late invoice"]}"#,
        ))
        .expect(1)
        .create();
    let _article = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 4096})))
        .with_status(200)
        .with_body(claude_reply("# Invoicing Late Payers\n\nFirst draft."))
        .create();
    let _review = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 5000})))
        .with_status(200)
        .with_body(claude_reply(
            r##"{"approved": false, "quality_score": 5, "revised_article": "# Invoicing Late Payers\n\nRevised."}"##,
        ))
        .create();

    let output = agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["questions", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    evaluate.assert();

    let report = stdout_json(&output);
    assert_eq!(report["found"], 1);
    assert_eq!(report["new"], 1);
    let drafted = report["drafted"].as_array().unwrap();
    assert_eq!(drafted.len(), 1);
    assert_eq!(drafted[0]["title"], "Invoicing Late Payers");
    assert_eq!(drafted[0]["source"], "r/freelance");

    let file = drafted[0]["file"].as_str().unwrap();
    assert!(file.ends_with("-invoicing-late-payers.md"));
    let draft = std::fs::read_to_string(dir.path().join("blog/posts").join(file)).unwrap();
    assert!(draft.starts_with("---\n"));
    assert!(draft.contains("status: draft"));
    assert!(draft.ends_with("Revised."));

    // The same question is not answered twice.
    agents(&dir)
        .env("ANTHROPIC_API_KEY", "sk-test")
        .arg("questions")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new questions found"));
    evaluate.assert();
}

// ---------------------------------------------------------------------------
// gsc
// ---------------------------------------------------------------------------

const GSC_PAGE: &str = r#"<html><head>
<title>Net 30 Terms</title>
<meta name="description" content="Old description">
</head><body></body></html>"#;

fn service_account() -> String {
    json!({"client_email": "bot@project.iam.gserviceaccount.com", "private_key": TEST_KEY}).to_string()
}

/// Site plus the token, analytics and model mocks; the mocks live as long
/// as the returned handles.
fn gsc_site(server: &mut ServerGuard) -> (TempDir, Vec<Mock>) {
    let dir = site_with(server);
    std::fs::create_dir_all(dir.path().join("blog")).unwrap();
    std::fs::write(dir.path().join("blog/net-30.html"), GSC_PAGE).unwrap();
    let url = server.url();
    let token = server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(r#"{"access_token": "tok", "expires_in": 3600}"#)
        .create();
    let analytics = server
        .mock(
            "POST",
            Matcher::Regex(r"^/webmasters/v3/sites/.+/searchAnalytics/query$".into()),
        )
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(
            json!({"rows": [
                {"keys": [format!("{url}/blog/net-30")], "clicks": 2, "impressions": 120, "ctr": 0.016, "position": 14.2},
                {"keys": [format!("{url}/pricing")], "clicks": 1, "impressions": 900, "ctr": 0.001, "position": 15.0}
            ]})
            .to_string(),
        )
        .create();
    let claude = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 512})))
        .with_status(200)
        .with_body(claude_reply(
            r#"{"title": "Net 30 Payment Terms Explained", "description": "What net 30 means and how to use it."}"#,
        ))
        .create();
    (dir, vec![token, analytics, claude])
}

#[test]
fn gsc_without_service_account_fails() {
    let dir = TempDir::new().unwrap();
    agents(&dir)
        .arg("gsc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GSC_SERVICE_ACCOUNT_JSON"));
}

#[test]
fn gsc_rewrites_page_two_meta() {
    let mut server = Server::new();
    let (dir, _mocks) = gsc_site(&mut server);

    let output = agents(&dir)
        .env("GSC_SERVICE_ACCOUNT_JSON", service_account())
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["gsc", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = stdout_json(&output);
    assert_eq!(report["rows"], 2);
    assert_eq!(report["page2_count"], 1);
    assert_eq!(report["candidates"], 1);
    let change = &report["changes"][0];
    assert_eq!(change["reason"], "page2");
    assert_eq!(change["old_title"], "Net 30 Terms");
    assert_eq!(change["applied"], true);

    let html = std::fs::read_to_string(dir.path().join("blog/net-30.html")).unwrap();
    assert!(html.contains("<title>Net 30 Payment Terms Explained</title>"));
    assert!(html.contains(r#"content="What net 30 means and how to use it.""#));
}

#[test]
fn gsc_report_only_leaves_pages_alone() {
    let mut server = Server::new();
    let (dir, _mocks) = gsc_site(&mut server);

    agents(&dir)
        .env("GSC_SERVICE_ACCOUNT_JSON", service_account())
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["gsc", "--report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("suggested (report only)"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("blog/net-30.html")).unwrap(),
        GSC_PAGE
    );
}

#[test]
fn gsc_without_candidates_reports_healthy_pages() {
    let mut server = Server::new();
    let dir = site_with(&server);
    let url = server.url();
    let _token = server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(r#"{"access_token": "tok", "expires_in": 3600}"#)
        .create();
    let _analytics = server
        .mock(
            "POST",
            Matcher::Regex(r"^/webmasters/v3/sites/.+/searchAnalytics/query$".into()),
        )
        .with_status(200)
        .with_body(
            json!({"rows": [
                {"keys": [format!("{url}/blog/net-30")], "clicks": 40, "impressions": 800, "ctr": 0.05, "position": 3.1},
                {"keys": [format!("{url}/blog/late-fees")], "clicks": 0, "impressions": 20, "ctr": 0.0, "position": 14.0}
            ]})
            .to_string(),
        )
        .create();
    let claude = server
        .mock("POST", "/v1/messages")
        .expect(0)
        .create();

    let output = agents(&dir)
        .env("GSC_SERVICE_ACCOUNT_JSON", service_account())
        .env("ANTHROPIC_API_KEY", "sk-test")
        .args(["gsc", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    claude.assert();

    let report = stdout_json(&output);
    assert_eq!(report["rows"], 2);
    assert_eq!(report["candidates"], 0);
    assert!(report["changes"].as_array().unwrap().is_empty());

    agents(&dir)
        .env("GSC_SERVICE_ACCOUNT_JSON", service_account())
        .arg("gsc")
        .assert()
        .success()
        .stdout(predicate::str::contains("All pages look healthy"));
}
