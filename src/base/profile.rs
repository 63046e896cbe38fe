//! Static per-bot settings.
//!
//! Both bots share all of their code; everything that differs between them
//! (template, sampling parameters, failure handling, HTTP surface, and the
//! environment prefix of their credentials) lives in a [`BotProfile`].

use std::{fmt, net::Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::base::{
    prompts::{self, PromptTemplate},
    types::{GenerationParams, InferenceFailurePolicy},
};

/// Which bot this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    /// Drafts email replies.
    #[default]
    Email,
    /// Writes persuasive essays.
    Essay,
}

impl BotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotKind::Email => "email",
            BotKind::Essay => "essay",
        }
    }

    /// Get the static profile for this bot.
    pub fn profile(&self) -> &'static BotProfile {
        match self {
            BotKind::Email => &EMAIL_PROFILE,
            BotKind::Essay => &ESSAY_PROFILE,
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that distinguishes one bot from the other.
#[derive(Debug)]
pub struct BotProfile {
    /// Prefix of the bot's environment variables (`SLACK_EMAIL_BOT_TOKEN`, ...).
    pub env_prefix: &'static str,
    pub template: PromptTemplate,
    pub generation: GenerationParams,
    pub on_inference_failure: InferenceFailurePolicy,
    /// Path of the Slack events endpoint.
    pub events_path: &'static str,
    pub host: Ipv4Addr,
    pub port: u16,
}

pub static EMAIL_PROFILE: BotProfile = BotProfile {
    env_prefix: "SLACK_EMAIL",
    template: prompts::EMAIL_REPLY,
    generation: GenerationParams {
        temperature: 0.5,
        max_new_tokens: 400,
    },
    on_inference_failure: InferenceFailurePolicy::FallbackPostAndLog,
    events_path: "/generate_email/slack/events",
    host: Ipv4Addr::LOCALHOST,
    port: 3000,
};

pub static ESSAY_PROFILE: BotProfile = BotProfile {
    env_prefix: "SLACK_ESSAY",
    template: prompts::ESSAY,
    generation: GenerationParams {
        temperature: 0.5,
        max_new_tokens: 5000,
    },
    on_inference_failure: InferenceFailurePolicy::SilentLog,
    events_path: "/generate_essay/slack/events",
    host: Ipv4Addr::UNSPECIFIED,
    port: 8000,
};

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::TemplateId;

    #[test]
    fn test_email_profile_constants() {
        let profile = BotKind::Email.profile();

        assert_eq!(profile.template.id, TemplateId::EmailReply);
        assert_eq!(profile.template.slot, "email");
        assert_eq!(profile.generation.temperature, 0.5);
        assert_eq!(profile.generation.max_new_tokens, 400);
        assert_eq!(profile.on_inference_failure, InferenceFailurePolicy::FallbackPostAndLog);
        assert_eq!(profile.events_path, "/generate_email/slack/events");
        assert_eq!(profile.port, 3000);
    }

    #[test]
    fn test_essay_profile_constants() {
        let profile = BotKind::Essay.profile();

        assert_eq!(profile.template.id, TemplateId::Essay);
        assert_eq!(profile.template.slot, "topic");
        assert_eq!(profile.generation.temperature, 0.5);
        assert_eq!(profile.generation.max_new_tokens, 5000);
        assert_eq!(profile.on_inference_failure, InferenceFailurePolicy::SilentLog);
        assert_eq!(profile.events_path, "/generate_essay/slack/events");
        assert_eq!(profile.host, Ipv4Addr::UNSPECIFIED);
        assert_eq!(profile.port, 8000);
    }
}
