//! Content-type precedence for mirrored edits.

use shared_types::{Media, MessageContent};

/// The remote edit applied to every copy of an edited origin message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Replace the body of a text message.
    Text(String),
    /// Replace photo, video or document media together with its caption.
    Media {
        media: Media,
        caption: Option<String>,
    },
    /// Replace only the caption.
    Caption(String),
}

impl EditAction {
    pub fn kind(&self) -> &'static str {
        match self {
            EditAction::Text(_) => "text",
            EditAction::Media { .. } => "media",
            EditAction::Caption(_) => "caption",
        }
    }
}

/// Pick the edit for new content.
///
/// Text first, then editable media, then caption. `None` means the content
/// type cannot be mirrored and every copy is skipped.
pub fn select_edit(content: &MessageContent) -> Option<EditAction> {
    if let Some(text) = content.text.as_ref().filter(|t| !t.is_empty()) {
        return Some(EditAction::Text(text.clone()));
    }
    if let Some(media) = content.media.as_ref().filter(|m| m.is_editable()) {
        return Some(EditAction::Media {
            media: media.clone(),
            caption: content.caption.clone(),
        });
    }
    content.caption.clone().map(EditAction::Caption)
}
