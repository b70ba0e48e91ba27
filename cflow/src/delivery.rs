//! Typed aggregation of successful notification deliveries.
//!
//! ```rust
//! use cflow::{Delivery, DeliveryLedger};
//! use ctooling::NotificationChannel;
//!
//! let ledger = DeliveryLedger::new(vec![
//!     Delivery::new(NotificationChannel::Sms, "+15550001"),
//!     Delivery::new(NotificationChannel::WhatsApp, "+15550001"),
//!     Delivery::new(NotificationChannel::Sms, "+15550002"),
//! ]);
//!
//! assert_eq!(ledger.len(), 3);
//! assert_eq!(ledger.count_for("+15550001"), 2);
//! assert!(ledger.delivered_to("+15550002"));
//! assert!(!ledger.delivered_to("+15550003"));
//! ```

use std::collections::BTreeSet;

use ctooling::NotificationChannel;

use crate::ToolCallRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delivery {
    pub channel: NotificationChannel,
    pub recipient: String,
}

impl Delivery {
    pub fn new(channel: NotificationChannel, recipient: impl Into<String>) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
        }
    }
}

/// Successful deliveries of one invocation, in execution order.
///
/// Recipients are compared after trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryLedger {
    deliveries: Vec<Delivery>,
}

impl DeliveryLedger {
    pub fn new(deliveries: Vec<Delivery>) -> Self {
        Self { deliveries }
    }

    /// Collects the delivery of every successful record; failed calls never count.
    pub fn from_records(records: &[ToolCallRecord]) -> Self {
        Self::new(
            records
                .iter()
                .filter(|record| record.is_success())
                .filter_map(|record| record.delivery.clone())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter()
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    pub fn delivered_to(&self, recipient: &str) -> bool {
        self.count_for(recipient) > 0
    }

    pub fn count_for(&self, recipient: &str) -> usize {
        let recipient = recipient.trim();
        self.deliveries
            .iter()
            .filter(|delivery| delivery.recipient.trim() == recipient)
            .count()
    }

    pub fn count_on(&self, channel: NotificationChannel) -> usize {
        self.deliveries
            .iter()
            .filter(|delivery| delivery.channel == channel)
            .count()
    }

    pub fn channels_for(&self, recipient: &str) -> BTreeSet<NotificationChannel> {
        let recipient = recipient.trim();
        self.deliveries
            .iter()
            .filter(|delivery| delivery.recipient.trim() == recipient)
            .map(|delivery| delivery.channel)
            .collect()
    }

    pub fn recipients(&self) -> BTreeSet<&str> {
        self.deliveries
            .iter()
            .map(|delivery| delivery.recipient.trim())
            .collect()
    }
}
