use serde::Serialize;

/// A notification ready to be handed to a transport.
///
/// Transports map this onto their own wire format; nothing here is
/// transport specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    /// Where replies from the site owner should go: the visitor.
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}
