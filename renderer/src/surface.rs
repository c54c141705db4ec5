use std::fmt;

use linky::LinkKind;

use crate::link::LinkId;

/// Something the engine paints into.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// One paragraph of a block-mode render.
    Paragraph,
    /// Follows each paragraph; receives that paragraph's fold expansions.
    UnfoldContainer,
    /// A fold expansion, indented one level.
    Unfolded,
    /// An inline expansion standing where its link used to be.
    InlineSpan,
    Text(String),
    Link {
        id: LinkId,
        kind: LinkKind,
        label: String,
        /// A fold link that has already been activated.
        consumed: bool,
    },
}

/// The capability a host exposes to the engine. Handles identify elements;
/// the engine never inspects the host's tree.
pub trait Surface {
    type Handle: Copy + Eq + fmt::Debug;

    /// Container the entry section is rendered into.
    fn root(&self) -> Self::Handle;

    /// Create a detached element.
    fn create(&mut self, element: Element) -> Self::Handle;

    /// Attach `child` as the last child of `parent`.
    fn append(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Put `new` where `old` is, detaching `old`. The host may reclaim `old`.
    fn replace(&mut self, old: Self::Handle, new: Self::Handle);

    /// Detach `node` from its parent. The host may reclaim it.
    fn remove(&mut self, node: Self::Handle);

    /// Remove every child of `container`.
    fn clear(&mut self, container: Self::Handle);
}
