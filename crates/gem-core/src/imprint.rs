//! Two-phase rarity imprint.
//!
//! Phase one commits a request that seeds randomness into the gem's state.
//! Phase two reveals the rarity from the oracle price-history buffers and
//! must not be submitted before the configured delay has elapsed since the
//! request was confirmed. The types make the order explicit: a reveal can
//! only be built from a [`RequestCommitted`].

use std::time::Duration;

use gem_sol::{Address, Signature};
use tokio::time::Instant;

/// A confirmed imprint request, waiting for its reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCommitted {
    pub mint: Address,
    pub request_signature: Signature,
    confirmed_at: Instant,
}

impl RequestCommitted {
    pub(crate) fn new(mint: Address, request_signature: Signature) -> Self {
        Self {
            mint,
            request_signature,
            confirmed_at: Instant::now(),
        }
    }

    pub fn confirmed_at(&self) -> Instant {
        self.confirmed_at
    }

    /// Earliest moment the reveal may be submitted.
    pub fn reveal_at(&self, delay: Duration) -> Instant {
        self.confirmed_at + delay
    }
}

/// Both phases confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revealed {
    pub mint: Address,
    pub request_signature: Signature,
    pub reveal_signature: Signature,
}

impl RequestCommitted {
    pub(crate) fn revealed(self, reveal_signature: Signature) -> Revealed {
        Revealed {
            mint: self.mint,
            request_signature: self.request_signature,
            reveal_signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reveal_time_is_relative_to_confirmation() {
        let committed = RequestCommitted::new(Address::new([1; 32]), Signature::new([2; 64]));
        let delay = Duration::from_secs(20);
        assert_eq!(committed.reveal_at(delay) - committed.confirmed_at(), delay);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(Instant::now() < committed.reveal_at(delay));
    }

    #[test]
    fn revealed_keeps_both_signatures() {
        let committed = RequestCommitted::new(Address::new([1; 32]), Signature::new([2; 64]));
        let revealed = committed.revealed(Signature::new([3; 64]));
        assert_eq!(revealed.request_signature, Signature::new([2; 64]));
        assert_eq!(revealed.reveal_signature, Signature::new([3; 64]));
    }
}
