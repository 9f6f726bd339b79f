//! Slack surface for faqbot.
//!
//! Slack delivers workspace events over the Events API as signed HTTP callbacks.
//!
//! - **Payloads** (`payload`) - wire format of the callback body
//! - **Signatures** (`signature`) - `X-Slack-Signature` verification
//! - **Events** (`events`) - dispatcher plus the message handler that answers questions
//! - **Web API** (`web_api`) - `chat.postMessage` for replies
//! - **Runner** (`runner`) - ties dispatch and reply posting together per envelope
//!
//! ```text
//! POST /slack/events -> SignatureVerifier -> SlackPayload -> EventsApiRunner
//!                                                              |
//!                     chat.postMessage <- Reply <- MessageHandler -> MessageService
//! ```

pub mod events;
pub mod payload;
pub mod runner;
pub mod signature;
pub mod web_api;
