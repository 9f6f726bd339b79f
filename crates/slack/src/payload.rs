//! Events API callback bodies.

use serde::Deserialize;

use crate::events::{MessageEvent, SlackEnvelope, SlackEvent};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackPayload {
    UrlVerification { challenge: String },
    EventCallback(EventCallback),
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EventCallback {
    #[serde(default)]
    pub event_id: String,
    pub event: RawEvent,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl SlackPayload {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

impl EventCallback {
    pub fn into_envelope(self) -> SlackEnvelope {
        let event = match (self.event.event_type.as_str(), self.event.channel) {
            ("message", Some(channel_id)) => SlackEvent::Message(MessageEvent {
                channel_id,
                user_id: self.event.user,
                text: self.event.text,
                ts: self.event.ts.unwrap_or_default(),
                subtype: self.event.subtype,
                bot_id: self.event.bot_id,
            }),
            _ => SlackEvent::Unsupported { event_type: self.event.event_type },
        };
        SlackEnvelope { envelope_id: self.event_id, event }
    }
}
