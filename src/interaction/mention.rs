//! The mention responder: acknowledge, generate, reply.

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, instrument};

use crate::{
    base::{
        prompts,
        types::{InboundEvent, InferenceFailurePolicy, OutboundReply, Res},
    },
    runtime::Runtime,
};

/// How a mention ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionOutcome {
    /// The generated text was posted.
    Replied,
    /// Generation failed; the failure policy was applied.
    Failed,
}

/// Handles a mention of the bot.
///
/// Spawns the responder on the runtime's task tracker and returns its handle.
/// Errors are logged, never propagated: a failed mention only costs the user
/// the generated reply.
#[instrument(skip_all, fields(channel_id = %event.channel_id))]
pub fn handle_mention(event: InboundEvent, runtime: Runtime) -> JoinHandle<()> {
    let tasks = runtime.tasks.clone();

    tasks.spawn(
        async move {
            // Process the event.
            let result = handle_mention_internal(event, &runtime).await;

            // Log the outcome.
            match result {
                Ok(outcome) => info!("Mention handled: {:?}", outcome),
                Err(err) => error!("Error while handling mention: {:#}", err),
            }
        }
        .in_current_span(),
    )
}

/// Remove every occurrence of `tag` from `raw_text` and trim the result.
///
/// Removal repeats until no tag is left, so text like `<@U1<@U1>>` does not
/// leave a fresh tag behind and applying this twice changes nothing.
pub fn strip_mention(raw_text: &str, tag: &str) -> String {
    let mut text = raw_text.to_string();

    if !tag.is_empty() {
        while text.contains(tag) {
            text = text.replace(tag, "");
        }
    }

    text.trim().to_string()
}

#[instrument(skip_all)]
async fn handle_mention_internal(event: InboundEvent, runtime: &Runtime) -> Res<MentionOutcome> {
    let profile = runtime.config.profile();

    // Replies of one mention must not interleave with another in the same channel.
    let _channel_guard = runtime.channel_locks.lock(&event.channel_id).await;

    let user_message = strip_mention(&event.raw_text, &event.sender_bot_tag);
    debug!("User message is {} bytes.", user_message.len());

    // Acknowledge before generation starts.

    runtime.chat.send_message(&OutboundReply::new(&event.channel_id, prompts::ACKNOWLEDGMENT)).await?;
    debug!("Acknowledged mention.");

    // Render the prompt and generate.

    let prompt = profile.template.render(&user_message);
    info!("Generating with the {:?} template ...", prompt.template_id);

    let generated = runtime.llm.generate(&prompt.rendered_text, profile.generation).await;

    // Reply, or apply the failure policy.

    match generated {
        Ok(text) => {
            runtime.chat.send_message(&OutboundReply::new(&event.channel_id, text)).await?;
            Ok(MentionOutcome::Replied)
        }
        Err(err) => {
            error!("Inference failed: {}", err);

            if profile.on_inference_failure == InferenceFailurePolicy::FallbackPostAndLog {
                let notice = OutboundReply::new(&event.channel_id, prompts::INFERENCE_FAILURE_NOTICE);

                if let Err(post_err) = runtime.chat.send_message(&notice).await {
                    error!("Error sending fallback response: {}", post_err);
                }
            }

            Ok(MentionOutcome::Failed)
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mention_scenarios() {
        assert_eq!(strip_mention("<@U123> draft a reply to my landlord about rent", "<@U123>"), "draft a reply to my landlord about rent");
        assert_eq!(strip_mention("<@U456>   ", "<@U456>"), "");
        assert_eq!(strip_mention("hey <@U1> and again <@U1>!", "<@U1>"), "hey  and again !");
        assert_eq!(strip_mention("  no mention here  ", "<@U1>"), "no mention here");
        assert_eq!(strip_mention("<@U2> someone else", "<@U1>"), "<@U2> someone else");
    }

    #[test]
    fn test_strip_mention_leaves_no_reassembled_tag() {
        assert_eq!(strip_mention("<@U1<@U1>> topic", "<@U1>"), "topic");
    }

    #[test]
    fn test_strip_mention_is_idempotent() {
        let inputs = [
            "",
            "   ",
            "<@U1>",
            "<@U1><@U1>",
            "<@U1<@U1>>",
            "<<@U1>@U1>",
            " <@U1> essay on bees <@U1> ",
            "\t<@U1>\n",
            "plain text",
            "<@U1 > almost",
        ];

        for input in inputs {
            let once = strip_mention(input, "<@U1>");
            let twice = strip_mention(&once, "<@U1>");

            assert_eq!(once, twice, "not idempotent for {input:?}");
            assert!(!once.contains("<@U1>"));
        }
    }
}
