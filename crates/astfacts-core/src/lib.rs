//! Flattens C#, PHP and TypeScript/JavaScript syntax trees into a stream
//! of keyed, language-agnostic facts.

pub mod config;
pub mod error;
pub mod facts;
pub mod parser;
pub mod project;

pub use config::Config;
pub use error::{FactError, WalkError};
pub use facts::{Fact, JsonLinesEmitter, KeyManager};
pub use parser::{FrontEnd, FrontEndRegistry};
pub use project::{parse_project, FileOutcome, ProjectStats, SkipReason};
