//! Events emitted by transactions, and a bus for observers.

use edao_governance::VotingEvent;
use edao_sale::SaleEvent;
use edao_token::TokenEvent;
use edao_treasury::TreasuryEvent;
use serde::Serialize;

use crate::dao::DaoEvent;

/// An event from any contract, tagged with its source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "contract", content = "event", rename_all = "kebab-case")]
pub enum ChainEvent {
    Dao(DaoEvent),
    Token(TokenEvent),
    Voting(VotingEvent),
    Treasury(TreasuryEvent),
    Sale(SaleEvent),
}

/// Synchronous fan-out bus for events of accepted transactions.
///
/// Listeners run inline while the block is mined; keep them fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&ChainEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ChainEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &ChainEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edao_types::Principal;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn lock_event() -> ChainEvent {
        ChainEvent::Token(TokenEvent::TransferLock { locked: true })
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&lock_event());
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        EventBus::default().emit(&lock_event());
    }

    #[test]
    fn events_serialise_with_their_contract() {
        let event = ChainEvent::Dao(DaoEvent::Execute {
            proposal: Principal::new("ST1D.edp001"),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["contract"], "dao");
        assert_eq!(json["event"]["event"], "execute");
        assert_eq!(json["event"]["proposal"], "ST1D.edp001");
    }
}
