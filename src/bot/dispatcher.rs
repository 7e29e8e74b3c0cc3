//! Sends the canned reply when the radio link is up, then advances state.

use log::{debug, info};

use crate::errors::BotError;
use crate::gateway::{Gateway, Message, MessageId, OutgoingMessage};
use crate::storage::{KeyValueStore, ReplyState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Reply accepted by the gateway and state advanced to this id.
    Sent { id: MessageId, destination: String },
    /// Link down; nothing sent, nothing persisted.
    Deferred,
}

/// Reply to `candidate` with `response` if the radio is available.
///
/// State moves only after the gateway accepts the send. A failed radio check
/// or send leaves the marker alone. A failed save after a confirmed send is
/// still returned as an error, but [`ReplyState`] keeps the id in memory so
/// the candidate is not answered twice.
pub async fn dispatch<G, S>(
    candidate: &Message,
    response: &str,
    gateway: &G,
    state: &ReplyState<S>,
) -> Result<Outcome, BotError>
where
    G: Gateway + ?Sized,
    S: KeyValueStore,
{
    let radio = gateway.radio_status().await?;
    if !radio.radio_status {
        debug!("Radio link unavailable, deferring reply to {}", candidate.id);
        return Ok(Outcome::Deferred);
    }

    let outgoing = OutgoingMessage {
        body: response.to_string(),
        destination: candidate.origin.clone(),
    };
    gateway.send_message(&outgoing).await?;
    info!("Reply to message {} sent to {}", candidate.id, outgoing.destination);

    state.save(&candidate.id)?;

    Ok(Outcome::Sent {
        id: candidate.id.clone(),
        destination: outgoing.destination,
    })
}
