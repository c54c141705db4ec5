pub mod engine;
pub mod error;
pub mod host;
pub mod link;
pub mod surface;
pub mod tree;

pub use engine::{Activation, Engine, Mode, render};
pub use error::HostError;
pub use link::{LinkBinding, LinkId, LinkState, LinkTable};
pub use surface::{Element, Surface};
pub use tree::{NodeId, PaintOptions, Tree};
