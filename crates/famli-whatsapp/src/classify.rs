//! Inbound message classification

use famli_core::ItemType;

use crate::twilio::IncomingMessage;

/// What an inbound message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Document,
    Location,
}

impl MessageKind {
    /// Item type a message of this kind is stored as
    pub fn item_type(&self) -> ItemType {
        match self {
            MessageKind::Text => ItemType::Note,
            MessageKind::Image => ItemType::Image,
            MessageKind::Audio => ItemType::Audio,
            MessageKind::Document => ItemType::Document,
            MessageKind::Location => ItemType::Location,
        }
    }
}

/// Classify a message. Attachments win over coordinates, coordinates over text.
pub fn classify(message: &IncomingMessage) -> MessageKind {
    if message.num_media > 0 {
        return classify_media(message.media_content_type.as_deref());
    }

    if message.latitude.is_some() && message.longitude.is_some() {
        return MessageKind::Location;
    }

    MessageKind::Text
}

fn classify_media(content_type: Option<&str>) -> MessageKind {
    let Some(parsed) = content_type.and_then(|ct| ct.trim().parse::<mime::Mime>().ok()) else {
        return MessageKind::Document;
    };

    let top = parsed.type_();
    if top == mime::IMAGE {
        MessageKind::Image
    } else if top == mime::AUDIO {
        MessageKind::Audio
    } else {
        MessageKind::Document
    }
}
