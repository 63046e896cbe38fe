//! Chat service integration for the mention bots.
//!
//! This module provides functionality for interacting with Slack:
//! - Serving the Events API endpoint, with request signatures checked by
//!   slack-morphism's axum events layer
//! - Answering URL verification handshakes
//! - Posting messages to channels
//!
//! It implements the `GenericChatClient` trait for Slack.

use crate::{
    base::{
        config::Config,
        error::PlatformError,
        types::{InboundEvent, OutboundReply, Res, Void},
    },
    interaction,
    runtime::Runtime,
};
use async_trait::async_trait;
use axum::{
    Extension, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{error, info, instrument, warn};

use std::{net::SocketAddr, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub bot_token: SlackApiToken,
    pub client: Arc<FullClient>,
    pub config: Config,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        let result = Self {
            bot_token,
            client,
            config: config.clone(),
        };

        result.verify_identity().await;

        Ok(result)
    }

    /// Check the token against the configured bot user ID.
    ///
    /// Mismatches and failures are only logged: the configured ID stays authoritative.
    async fn verify_identity(&self) {
        let session = self.client.open_session(&self.bot_token);

        match session.auth_test().await {
            Ok(response) if response.user_id.0 == self.config.bot_user_id => {
                info!("Slack bot user ID: {}", response.user_id.0);
            }
            Ok(response) => {
                warn!(
                    "Slack reports bot user ID `{}`, but `{}` is configured; mentions are matched against the configured ID.",
                    response.user_id.0, self.config.bot_user_id
                );
            }
            Err(e) => {
                warn!("{}", PlatformError::Auth(e.to_string()));
            }
        }
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self, runtime: Runtime) -> Void {
        let profile = runtime.config.profile();

        let app = events_router(runtime.clone(), self.client.clone());

        // Serve until Ctrl-C.

        let addr = SocketAddr::from((profile.host, profile.port));
        let tcp_listener = tokio::net::TcpListener::bind(addr).await?;

        info!("Listening for Slack events on http://{}{} ...", addr, profile.events_path);

        axum::serve(tcp_listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        info!("Slack events listener stopped.");

        // Let accepted mentions post their replies before exiting.
        runtime.drain().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, reply: &OutboundReply) -> Result<(), PlatformError> {
        let message = SlackMessageContent::new().with_text(reply.text.clone());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(reply.channel_id.clone()), message);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| PlatformError::PostMessage {
            channel_id: reply.channel_id.clone(),
            message: e.to_string(),
        })?;

        Ok(())
    }
}

// Events listener callbacks for Slack.

/// Build the events router: the profile's events path behind the signature-checking events layer.
pub(crate) fn events_router<H>(runtime: Runtime, client: Arc<slack_morphism::SlackClient<SlackClientHyperConnector<H>>>) -> Router
where
    H: hyper_util::client::legacy::connect::Connect + Clone + Send + Sync + 'static,
{
    let profile = runtime.config.profile();

    let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(client).with_error_handler(handle_listener_error::<SlackClientHyperConnector<H>>));
    let listener = SlackEventsAxumListener::new(listener_environment);
    let signing_secret: SlackSigningSecret = runtime.config.signing_secret.clone().into();

    Router::new()
        .route(
            profile.events_path,
            post(handle_push_event).layer(listener.events_layer(&signing_secret).with_event_extractor(SlackEventsExtractors::push_event())),
        )
        .layer(Extension(runtime))
}

/// Resolves once the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Handles errors raised by the events layer (e.g., bad signatures).
fn handle_listener_error<SCHC>(err: Box<dyn std::error::Error + Send + Sync>, _client: Arc<slack_morphism::SlackClient<SCHC>>, _states: SlackClientEventsUserState) -> StatusCode
where
    SCHC: slack_morphism::SlackClientHttpConnector + Send + Sync,
{
    warn!("Rejected Slack event delivery: {:#?}", err);
    StatusCode::BAD_REQUEST
}

/// Handles verified push events from Slack.
#[instrument(skip_all)]
pub(crate) async fn handle_push_event(Extension(runtime): Extension<Runtime>, Extension(event): Extension<SlackPushEvent>) -> Response {
    match event {
        SlackPushEvent::UrlVerification(url_verification) => {
            info!("Received URL verification request ...");
            url_verification.challenge.into_response()
        }
        SlackPushEvent::EventCallback(event_callback) => {
            let event = InboundEvent::from_callback_body(&event_callback.event, &runtime.config.bot_user_id);

            // The responder runs in the background; Slack only needs a prompt 200.
            let _ = interaction::dispatch::dispatch_event(event, &runtime);

            StatusCode::OK.into_response()
        }
        _ => {
            warn!("Received unhandled push event.");
            StatusCode::OK.into_response()
        }
    }
}

// Tests.
