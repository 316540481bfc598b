pub mod auto_index;
pub mod content;
pub mod directory;
pub mod gsc;
pub mod questions;
pub mod schema;
pub mod serve;
