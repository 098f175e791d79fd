//! Relay-facing adapter: lets the gateway drive a [`Receiver`].

use crate::service::Receiver;
use async_trait::async_trait;
use shared_bus::{Delivery, MessageHandler};
use shared_types::RelayError;

#[async_trait]
impl MessageHandler for Receiver {
    async fn on_message(&self, delivery: Delivery) -> Result<(), RelayError> {
        self.handle(&delivery)
            .map(|_| ())
            .map_err(|e| RelayError::Rejected {
                reason: e.to_string(),
            })
    }
}
