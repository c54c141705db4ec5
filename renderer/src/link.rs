use std::fmt;

use linky::LinkKind;

/// Identifies a rendered link for the lifetime of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Shown as a link, never activated.
    Active,
    /// A fold link that has been activated. Terminal.
    Consumed,
    /// An inline link whose element has been replaced by its expansion.
    Expanded,
}

/// Everything an activation needs, captured when the link is rendered.
#[derive(Debug, Clone)]
pub struct LinkBinding<H> {
    pub id: LinkId,
    pub kind: LinkKind,
    pub label: String,
    /// Section the link resolves to.
    pub target: String,
    /// The element currently standing for this link: the link itself, or
    /// for an expanded inline link, its span.
    pub element: H,
    /// Where fold expansions from this link's scope are appended.
    pub unfold: H,
    /// Block appended by an activated fold link.
    pub expansion: Option<H>,
    /// The link whose expansion contains this link, if any.
    pub owner: Option<LinkId>,
    pub state: LinkState,
}

/// Links of the current render pass, indexed by id. Retired links (whose
/// element was discarded by an inline re-expansion) leave an empty slot so
/// ids are never reused.
#[derive(Debug, Clone)]
pub struct LinkTable<H> {
    slots: Vec<Option<LinkBinding<H>>>,
}

impl<H> Default for LinkTable<H> {
    fn default() -> Self {
        LinkTable { slots: Vec::new() }
    }
}

impl<H> LinkTable<H> {
    pub fn new() -> Self {
        LinkTable::default()
    }

    /// The id the next inserted link will get.
    pub fn next_id(&self) -> LinkId {
        LinkId(self.slots.len())
    }

    pub fn insert(&mut self, binding: LinkBinding<H>) -> LinkId {
        debug_assert_eq!(binding.id, self.next_id());
        let id = binding.id;
        self.slots.push(Some(binding));
        id
    }

    pub fn get(&self, id: LinkId) -> Option<&LinkBinding<H>> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: LinkId) -> Option<&mut LinkBinding<H>> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    /// Live links in id order.
    pub fn iter(&self) -> impl Iterator<Item = &LinkBinding<H>> {
        self.slots.iter().flatten()
    }

    /// Drop every link rendered inside `owner`'s expansion, including links
    /// inside nested expansions, and hand the retired bindings back.
    pub fn retire_owned_by(&mut self, owner: LinkId) -> Vec<LinkBinding<H>> {
        let mut pending = vec![owner];
        let mut retired = Vec::new();
        while let Some(current) = pending.pop() {
            for slot in self.slots.iter_mut() {
                if slot.as_ref().is_some_and(|b| b.owner == Some(current)) {
                    if let Some(binding) = slot.take() {
                        pending.push(binding.id);
                        retired.push(binding);
                    }
                }
            }
        }
        retired
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(table: &LinkTable<u32>, kind: LinkKind, owner: Option<usize>) -> LinkBinding<u32> {
        LinkBinding {
            id: table.next_id(),
            kind,
            label: "x".into(),
            target: "x".into(),
            element: 0,
            unfold: 0,
            expansion: None,
            owner: owner.map(LinkId),
            state: LinkState::Active,
        }
    }

    #[test]
    fn retiring_follows_nested_owners() {
        let mut table = LinkTable::new();
        for owner in [None, Some(0), Some(1), Some(2), None] {
            let b = binding(&table, LinkKind::Inline, owner);
            table.insert(b);
        }
        assert_eq!(table.len(), 5);

        let retired: Vec<LinkId> = table.retire_owned_by(LinkId(0)).iter().map(|b| b.id).collect();
        assert_eq!(retired, vec![LinkId(1), LinkId(2), LinkId(3)]);
        assert_eq!(table.len(), 2);
        assert!(table.get(LinkId(2)).is_none());

        // Ids of retired links are not handed out again.
        assert_eq!(table.next_id(), LinkId(5));

        table.clear();
        assert!(table.is_empty());
    }
}
