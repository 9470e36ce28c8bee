use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::errors::FieldError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SupportTicket {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl SupportTicket {
    /// Both fields are required; whitespace-only counts as empty.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.subject.trim().is_empty() {
            errors.push(FieldError::new("subject", "Subject is required"));
        }
        if self.message.trim().is_empty() {
            errors.push(FieldError::new("message", "Message is required"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TicketReceipt {
    pub reference: Uuid,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("ticket desk rejected the submission: {0}")]
pub struct DeskError(pub String);

/// Where support tickets are filed.
#[async_trait]
pub trait TicketDesk: Send + Sync {
    async fn submit(&self, ticket: SupportTicket) -> Result<TicketReceipt, DeskError>;
}

/// Accepts every ticket after a fixed delay.
pub struct SimulatedDesk {
    delay: Duration,
}

impl SimulatedDesk {
    pub fn new(delay: Duration) -> Self {
        SimulatedDesk { delay }
    }
}

#[async_trait]
impl TicketDesk for SimulatedDesk {
    async fn submit(&self, ticket: SupportTicket) -> Result<TicketReceipt, DeskError> {
        tokio::time::sleep(self.delay).await;
        let receipt = TicketReceipt {
            reference: Uuid::new_v4(),
            submitted_at: Utc::now(),
        };
        info!(
            "Filed support ticket {} ({})",
            receipt.reference,
            ticket.subject.trim()
        );
        Ok(receipt)
    }
}
