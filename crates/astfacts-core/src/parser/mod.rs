//! Language front ends and the shared tree walker.
//!
//! Each language plugs a [`FrontEnd`] into one engine: the front end says
//! how every native tree-sitter node is shaped into facts, and the
//! [`TreeWalker`] applies those instructions uniformly, assigning keys and
//! parent/sibling links.
//!
//! ## Components
//!
//! - `FrontEnd` trait - Grammar, shaper, rename and common-kind tables per language
//! - `FrontEndRegistry` - Resolves front ends by name, alias or extension
//! - `EmitInstructions` / `Shape` - Shaper output
//! - `TreeWalker` - Walks one file's syntax tree and emits its facts
//!
//! ## Supported Languages
//!
//! - C# (`csharp`)
//! - PHP (`php`)
//! - TypeScript/JavaScript (`ts`)

mod csharp;
mod literal;
mod php;
mod registry;
mod shape;
mod traits;
mod treesitter;
mod typescript;
mod walker;

pub use csharp::CSharpFrontEnd;
pub use php::PhpFrontEnd;
pub use registry::FrontEndRegistry;
pub use shape::{EmitInstructions, Shape, Slot};
pub use traits::FrontEnd;
pub use treesitter::{diagnose, parse_tree, Diagnostics};
pub use typescript::TypeScriptFrontEnd;
pub use walker::{SiblingFrame, TreeWalker, WalkStats};
