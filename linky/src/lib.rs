pub mod markup;
pub mod parser;
pub mod section;

pub use markup::{LinkKind, Segment};
pub use parser::{Parser, ParserOptions};
pub use section::{Section, Sections};

/// Name of the implicit start section.
pub const MAIN: &str = "main";
