use serde::Serialize;
use slack_morphism::events::SlackEventCallbackBody;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The kind of an inbound platform event, as far as the bots care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// This bot was @-mentioned.
    Mention,
    /// Anything else; ignored.
    Other,
}

/// A single parsed event delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub raw_text: String,
    pub channel_id: String,
    /// The literal mention tag of this bot (`<@U123>`).
    pub sender_bot_tag: String,
}

impl InboundEvent {
    /// Build an inbound event from a Slack event callback body.
    ///
    /// Only `app_mention` bodies produce a [`EventKind::Mention`]; every other
    /// body becomes [`EventKind::Other`] with empty text and channel.
    pub fn from_callback_body(body: &SlackEventCallbackBody, bot_user_id: &str) -> Self {
        let sender_bot_tag = mention_tag(bot_user_id);

        match body {
            SlackEventCallbackBody::AppMention(event) => Self {
                kind: EventKind::Mention,
                raw_text: event.content.text.clone().unwrap_or_default(),
                channel_id: event.channel.0.clone(),
                sender_bot_tag,
            },
            _ => Self {
                kind: EventKind::Other,
                raw_text: String::new(),
                channel_id: String::new(),
                sender_bot_tag,
            },
        }
    }
}

/// Format the Slack mention tag for a user ID.
pub fn mention_tag(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Identifies which fixed template a prompt was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    EmailReply,
    Essay,
}

/// A prompt with its single slot filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub template_id: TemplateId,
    pub variable_value: String,
    pub rendered_text: String,
}

/// Sampling parameters sent with every inference request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_new_tokens: u32,
}

/// A reply to be posted to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub channel_id: String,
    pub text: String,
}

impl OutboundReply {
    pub fn new(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            text: text.into(),
        }
    }
}

/// What a bot does when the inference call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceFailurePolicy {
    /// Log the failure; the user only sees the acknowledgment.
    SilentLog,
    /// Log the failure and post a fallback notice, logging any failure of that post.
    FallbackPostAndLog,
}

// Tests.
