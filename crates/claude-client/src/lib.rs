//! `claude-client`: thin async driver for the Anthropic Messages API.
//!
//! Every agent in the workspace needs the same thing from Claude: send one
//! system prompt plus one user message, get the first text block back. This
//! crate wraps that exchange with typed request/response structs so callers
//! never touch raw JSON.
//!
//! # Architecture
//!
//! ```text
//! CompletionRequest
//!     │
//!     ▼
//! ClaudeClient      ← POST {base_url}/v1/messages
//!     │                x-api-key / anthropic-version headers
//!     ▼
//! MessagesResponse  ← content blocks; first `text` block is the answer
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use claude_client::{ClaudeClient, CompletionRequest};
//!
//! let client = ClaudeClient::new(api_key, claude_client::DEFAULT_BASE_URL);
//! let text = client
//!     .complete(CompletionRequest::new("claude-haiku-4-5-20251001", "Say hello").max_tokens(64))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{ClaudeClient, DEFAULT_BASE_URL};
pub use error::ClaudeError;
pub use types::{CompletionRequest, ContentBlock, MessagesRequest, MessagesResponse, Usage};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClaudeError>;
