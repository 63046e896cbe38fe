//! Fixed prompt templates, one per bot.

use crate::base::types::{RenderedPrompt, TemplateId};

/// Directive for the email bot.
pub const EMAIL_REPLY_TEMPLATE: &str = "You are a helpful assistant that drafts an {email} reply based on an a new email.";

/// Directive for the essay bot.
pub const ESSAY_TEMPLATE: &str = "I want you to act as an essay writer. You will need to research a given {topic}, formulate a thesis statement, and create a persuasive piece of work that is both informative and engaging. ";

/// Acknowledgment posted as soon as a mention arrives.
pub const ACKNOWLEDGMENT: &str = "Sure, I'll get right on that!";

/// Posted by bots with a fallback policy when generation fails.
pub const INFERENCE_FAILURE_NOTICE: &str = "Sorry, I wasn't able to generate a response this time. Please try again later.";

/// A fixed template with exactly one named slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub id: TemplateId,
    /// Slot name, without braces.
    pub slot: &'static str,
    pub text: &'static str,
}

pub const EMAIL_REPLY: PromptTemplate = PromptTemplate {
    id: TemplateId::EmailReply,
    slot: "email",
    text: EMAIL_REPLY_TEMPLATE,
};

pub const ESSAY: PromptTemplate = PromptTemplate {
    id: TemplateId::Essay,
    slot: "topic",
    text: ESSAY_TEMPLATE,
};

impl PromptTemplate {
    /// Fill the slot with `value`.
    ///
    /// The value is inserted verbatim and never scanned for slots itself, so a
    /// value that happens to contain `{email}` stays as typed.
    pub fn render(&self, value: &str) -> RenderedPrompt {
        let placeholder = format!("{{{}}}", self.slot);

        let rendered_text = match self.text.split_once(&placeholder) {
            Some((before, after)) => format!("{before}{value}{after}"),
            None => self.text.to_string(),
        };

        RenderedPrompt {
            template_id: self.id,
            variable_value: value.to_string(),
            rendered_text,
        }
    }
}

// Tests.
