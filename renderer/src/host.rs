//! Collaborators a host wires around the engine: where documents come from,
//! and how a rendered document is captured for sharing.

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::surface::Surface;

/// Value of the `type` field of every shared payload.
pub const PAYLOAD_TYPE: &str = "linky";

/// Shown when no document is given or a stored one cannot be loaded.
pub const DEFAULT_SOURCE: &str = "
// This is a comment. It will not show up in the final output.

This is a [link] to another paragraph. They can also be [recursive], or <inline>.

link: This is another section, and this is [another link]!

another link: Hi there!

recursive: Links can be [recursive]

inline: inline. Like this!
";

/// What gets published when a document is shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePayload {
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw markup text.
    pub data: String,
    /// Image payload, typically a `data:` URL. Empty when capture failed.
    pub image: String,
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub data: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Persistence for shared documents.
pub trait DocumentStore {
    /// `Ok(None)` when nothing is stored under `id`.
    fn fetch(&self, id: &str) -> Result<Option<DocumentRecord>, HostError>;

    /// Store `payload`, returning the id it can be fetched by.
    fn publish(&mut self, payload: &SharePayload) -> Result<String, HostError>;
}

/// Produces an image of a rendered surface.
pub trait Snapshot<S: Surface> {
    fn capture(&mut self, surface: &S) -> Result<String, HostError>;
}

/// Source text for a session: the stored document `id` if there is one and
/// it loads, otherwise [`DEFAULT_SOURCE`].
pub fn load_source(store: &dyn DocumentStore, id: Option<&str>) -> String {
    let Some(id) = id else {
        return DEFAULT_SOURCE.to_string();
    };
    match store.fetch(id) {
        Ok(Some(record)) => {
            log::debug!("loaded document '{}' ({} bytes)", id, record.data.len());
            record.data
        }
        Ok(None) => {
            log::warn!("no document '{}', using the built-in document", id);
            DEFAULT_SOURCE.to_string()
        }
        Err(e) => {
            log::warn!("cannot load document '{}': {}; using the built-in document", id, e);
            DEFAULT_SOURCE.to_string()
        }
    }
}

/// Build the payload for sharing `source`. A failed capture degrades to an
/// empty image.
pub fn share_payload<S: Surface>(
    snapshot: &mut dyn Snapshot<S>,
    surface: &S,
    source: &str,
) -> SharePayload {
    let image = snapshot.capture(surface).unwrap_or_else(|e| {
        log::warn!("{}", e);
        String::new()
    });
    SharePayload {
        kind: PAYLOAD_TYPE.to_string(),
        data: source.to_string(),
        image,
    }
}
