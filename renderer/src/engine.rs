use std::fmt;

use linky::markup::{self, Segment};
use linky::{LinkKind, MAIN, Sections};

use crate::link::{LinkBinding, LinkId, LinkState, LinkTable};
use crate::surface::{Element, Surface};

/// How a section body is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<H> {
    /// Paragraphs, each followed by its own unfold container.
    Block,
    /// One continuous run of text. Fold links found here append into `unfold`.
    Inline { unfold: H },
}

/// Outcome of activating a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The target section was rendered and spliced in.
    Expanded,
    /// The target does not exist. The link was still consumed or replaced.
    Unresolved,
    /// A fold link that was already activated.
    Ignored,
    /// No live link has this id.
    Stale,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Expanded => write!(f, "expanded"),
            Activation::Unresolved => write!(f, "unresolved"),
            Activation::Ignored => write!(f, "ignored"),
            Activation::Stale => write!(f, "stale"),
        }
    }
}

/// Render section `name` into `target`.
///
/// A missing section renders as an empty body. Every link emitted is
/// registered in `links` with `owner` as its owner, so an inline
/// re-expansion can retire what it replaces.
pub fn render<S: Surface>(
    sections: &Sections,
    name: &str,
    mode: Mode<S::Handle>,
    target: S::Handle,
    surface: &mut S,
    links: &mut LinkTable<S::Handle>,
    owner: Option<LinkId>,
) {
    let body = sections.body(name).unwrap_or("");

    match mode {
        Mode::Block => {
            for paragraph in markup::paragraphs(body) {
                let p = surface.create(Element::Paragraph);
                let unfold = surface.create(Element::UnfoldContainer);
                surface.append(target, p);
                surface.append(target, unfold);
                emit_segments(paragraph, p, unfold, surface, links, owner);
            }
        }
        Mode::Inline { unfold } => {
            emit_segments(body, target, unfold, surface, links, owner);
        }
    }
}

fn emit_segments<S: Surface>(
    text: &str,
    parent: S::Handle,
    unfold: S::Handle,
    surface: &mut S,
    links: &mut LinkTable<S::Handle>,
    owner: Option<LinkId>,
) {
    for segment in markup::scan(text) {
        let node = match segment {
            Segment::Text(s) => surface.create(Element::Text(s.to_string())),
            Segment::Link { kind, label } => {
                let id = links.next_id();
                let element = surface.create(Element::Link {
                    id,
                    kind,
                    label: label.to_string(),
                    consumed: false,
                });
                links.insert(LinkBinding {
                    id,
                    kind,
                    label: label.to_string(),
                    target: label.trim().to_string(),
                    element,
                    unfold,
                    expansion: None,
                    owner,
                    state: LinkState::Active,
                });
                element
            }
        };
        surface.append(parent, node);
    }
}

/// A rendered document and the live links inside it.
pub struct Engine<S: Surface> {
    sections: Sections,
    surface: S,
    links: LinkTable<S::Handle>,
}

impl<S: Surface> Engine<S> {
    pub fn new(surface: S) -> Self {
        Engine {
            sections: Sections::new(),
            surface,
            links: LinkTable::new(),
        }
    }

    /// Render `sections` from `main`, discarding everything rendered before.
    pub fn load(&mut self, sections: Sections) {
        self.show(sections, MAIN);
    }

    /// Render `sections` from `entry`, discarding everything rendered before.
    pub fn show(&mut self, sections: Sections, entry: &str) {
        self.sections = sections;
        self.links.clear();
        let root = self.surface.root();
        self.surface.clear(root);
        log::debug!("rendering '{}' ({} sections)", entry, self.sections.len());
        render(
            &self.sections,
            entry,
            Mode::Block,
            root,
            &mut self.surface,
            &mut self.links,
            None,
        );
    }

    /// Resolve one link. Never fails: every outcome is reported, none raised.
    pub fn activate(&mut self, id: LinkId) -> Activation {
        let Engine {
            sections,
            surface,
            links,
        } = self;

        let Some(binding) = links.get_mut(id) else {
            log::debug!("link {} is not live", id);
            return Activation::Stale;
        };

        match binding.kind {
            LinkKind::Fold => {
                if binding.state != LinkState::Active {
                    log::debug!("fold link {} already used", id);
                    return Activation::Ignored;
                }
                binding.state = LinkState::Consumed;

                let disabled = surface.create(Element::Link {
                    id,
                    kind: LinkKind::Fold,
                    label: binding.label.clone(),
                    consumed: true,
                });
                surface.replace(binding.element, disabled);
                binding.element = disabled;

                let target = binding.target.clone();
                let unfold = binding.unfold;
                if !sections.contains(&target) {
                    log::debug!("fold link {}: no section '{}'", id, target);
                    return Activation::Unresolved;
                }

                log::debug!("fold link {}: unfolding '{}'", id, target);
                let block = surface.create(Element::Unfolded);
                binding.expansion = Some(block);
                surface.append(unfold, block);
                render(sections, &target, Mode::Block, block, surface, links, Some(id));
                Activation::Expanded
            }
            LinkKind::Inline => {
                binding.state = LinkState::Expanded;
                let current = binding.element;
                let unfold = binding.unfold;
                let target = binding.target.clone();

                // Fold blocks opened from the old expansion sit outside the
                // span, so they go separately.
                let retired = links.retire_owned_by(id);
                if !retired.is_empty() {
                    log::debug!("inline link {}: retired {} links", id, retired.len());
                }
                for block in retired.iter().filter_map(|b| b.expansion) {
                    surface.remove(block);
                }

                let span = surface.create(Element::InlineSpan);
                render(
                    sections,
                    &target,
                    Mode::Inline { unfold },
                    span,
                    surface,
                    links,
                    Some(id),
                );
                surface.replace(current, span);
                if let Some(binding) = links.get_mut(id) {
                    binding.element = span;
                }

                if sections.contains(&target) {
                    log::debug!("inline link {}: expanded '{}'", id, target);
                    Activation::Expanded
                } else {
                    log::debug!("inline link {}: no section '{}'", id, target);
                    Activation::Unresolved
                }
            }
        }
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn link(&self, id: LinkId) -> Option<&LinkBinding<S::Handle>> {
        self.links.get(id)
    }

    /// Live links in id order.
    pub fn links(&self) -> impl Iterator<Item = &LinkBinding<S::Handle>> {
        self.links.iter()
    }

    /// First link to `target` that has never been activated.
    pub fn find_link(&self, target: &str) -> Option<LinkId> {
        self.links
            .iter()
            .find(|b| b.state == LinkState::Active && b.target == target.trim())
            .map(|b| b.id)
    }
}
