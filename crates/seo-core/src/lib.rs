pub mod blog_page;
pub mod config;
pub mod content;
pub mod directory;
pub mod error;
pub mod faq;
pub mod gsc;
pub mod html;
pub mod indexnow;
pub mod invoice;
pub mod io;
pub mod llm;
pub mod paths;
pub mod questions;
pub mod telegram;
pub mod topics;
pub mod tracking;

pub use error::{Result, SeoError};
