use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use renderer::host::Snapshot;
use renderer::{HostError, PaintOptions, Tree};

/// Captures the painted text of a tree as a `data:` URL.
pub struct TextSnapshot {
    pub options: PaintOptions,
}

impl Snapshot<Tree> for TextSnapshot {
    fn capture(&mut self, surface: &Tree) -> Result<String, HostError> {
        let text = surface.paint(&self.options);
        if text.trim().is_empty() {
            return Err(HostError::Snapshot("nothing rendered".into()));
        }
        Ok(format!("data:text/plain;base64,{}", STANDARD.encode(text)))
    }
}
