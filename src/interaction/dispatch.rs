use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::{
    base::types::{EventKind, InboundEvent},
    interaction::mention,
    runtime::Runtime,
};

/// Route a parsed event to its handler.
///
/// Mentions are handed to the mention responder, which runs in the background;
/// the returned handle resolves once it is done. Every other event is dropped.
#[instrument(skip_all, fields(kind = ?event.kind))]
pub fn dispatch_event(event: InboundEvent, runtime: &Runtime) -> Option<JoinHandle<()>> {
    match event.kind {
        EventKind::Mention => {
            info!("Received app mention event ...");
            Some(mention::handle_mention(event, runtime.clone()))
        }
        EventKind::Other => {
            debug!("Ignoring event that is not a mention.");
            None
        }
    }
}
