//! Payment verification and expiry tracking.
//!
//! Each payment request moves through `pending → completed | failed`, or
//! `pending → expired` when the 300-second window elapses unresolved.
//! Terminal states are final: the first terminal transition wins, and a
//! verification result that lands after expiry is discarded.
//!
//! This module never retries ledger queries; a [`PayError::Ledger`] leaves
//! the request untouched and the caller applies its own backoff.

use serde::{Deserialize, Serialize};

use crate::error::PayError;
use crate::request::PaymentRequestService;

/// Lifecycle state of a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No matching ledger activity observed yet.
    Pending,
    /// A transaction carrying the reference executed without error.
    Completed,
    /// A transaction carrying the reference executed with an error.
    Failed,
    /// The validity window elapsed with no resolution.
    Expired,
}

impl PaymentStatus {
    /// Whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl PaymentRequestService {
    /// Returns the current status, applying lazy expiry: a pending request
    /// whose window has elapsed reads as expired.
    ///
    /// # Errors
    ///
    /// Returns [`PayError::RequestNotFound`] for unknown ids.
    pub fn status(&self, transaction_id: &str) -> Result<PaymentStatus, PayError> {
        let mut entry = self
            .requests()
            .get_mut(transaction_id)
            .ok_or_else(|| PayError::RequestNotFound(transaction_id.to_owned()))?;
        if entry.status == PaymentStatus::Pending && entry.expires_at.is_past() {
            entry.status = PaymentStatus::Expired;
        }
        Ok(entry.status)
    }

    /// Queries the ledger for the request's reference and resolves the
    /// status.
    ///
    /// Idempotent on resolved requests: a terminal status is returned
    /// as-is with no ledger query and no visible side effects. Expiry is
    /// checked before querying, so a result arriving after the window is
    /// discarded in favor of `expired`.
    ///
    /// # Errors
    ///
    /// - [`PayError::RequestNotFound`] for unknown ids.
    /// - [`PayError::Ledger`] if the query fails; state is untouched and
    ///   the call is safe to retry.
    pub async fn verify(&self, transaction_id: &str) -> Result<PaymentStatus, PayError> {
        let (reference, expires_at) = {
            let entry = self
                .requests()
                .get(transaction_id)
                .ok_or_else(|| PayError::RequestNotFound(transaction_id.to_owned()))?;
            if entry.status.is_terminal() {
                return Ok(entry.status);
            }
            (entry.reference, entry.expires_at)
        };

        if expires_at.is_past() {
            return Ok(self.transition(transaction_id, PaymentStatus::Expired, None));
        }

        let observed = self.ledger().find_reference(&reference).await?;
        match observed {
            None => Ok(PaymentStatus::Pending),
            Some(status) => {
                let resolved = if status.err.is_none() {
                    PaymentStatus::Completed
                } else {
                    PaymentStatus::Failed
                };
                Ok(self.transition(transaction_id, resolved, Some(status.signature)))
            }
        }
    }

    /// Applies a terminal transition under the entry's exclusive guard.
    /// Only a pending request changes state; whatever terminal state got
    /// there first is returned.
    fn transition(
        &self,
        transaction_id: &str,
        next: PaymentStatus,
        signature: Option<String>,
    ) -> PaymentStatus {
        match self.requests().get_mut(transaction_id) {
            Some(mut entry) => {
                if entry.status == PaymentStatus::Pending {
                    entry.status = next;
                    entry.signature = signature;
                }
                entry.status
            }
            None => next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::MockLedger;
    use crate::registry::TokenRegistry;
    use crate::request::CreatePaymentRequest;
    use solana_pubkey::Pubkey;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn service(ledger: Arc<MockLedger>) -> PaymentRequestService {
        PaymentRequestService::new(
            Arc::new(TokenRegistry::with_defaults()),
            ledger,
            Pubkey::new_unique(),
        )
    }

    fn create_input(amount: &str, token: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            payer: None,
            amount: amount.into(),
            token: token.into(),
            memo: None,
        }
    }

    #[tokio::test]
    async fn test_unmatched_request_stays_pending() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("25", "USDC")).await.unwrap();

        let status = service.verify(&created.request.transaction_id).await.unwrap();
        assert_eq!(status, PaymentStatus::Pending);
        assert_eq!(ledger.reference_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_matching_transaction_completes_request() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("25", "USDC")).await.unwrap();
        let id = &created.request.transaction_id;

        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Pending);

        ledger.record_reference(created.request.reference, None);
        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Completed);

        let stored = service.get(id).unwrap();
        assert!(stored.signature.is_some());
    }

    #[tokio::test]
    async fn test_failed_execution_marks_failed() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("1", "SOL")).await.unwrap();

        ledger.record_reference(created.request.reference, Some("InstructionError"));
        let status = service.verify(&created.request.transaction_id).await.unwrap();
        assert_eq!(status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_verify_is_idempotent_after_resolution() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("25", "USDC")).await.unwrap();
        let id = &created.request.transaction_id;

        ledger.record_reference(created.request.reference, None);
        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Completed);
        let created_at = service.get(id).unwrap().created_at;
        let queries = ledger.reference_queries.load(Ordering::SeqCst);

        // Resolved requests return without touching the ledger.
        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Completed);
        assert_eq!(service.get(id).unwrap().created_at, created_at);
        assert_eq!(ledger.reference_queries.load(Ordering::SeqCst), queries);
    }

    #[tokio::test]
    async fn test_elapsed_window_reads_expired() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("1", "SOL")).await.unwrap();
        let id = &created.request.transaction_id;

        service.force_expiry_window(id);
        assert_eq!(service.status(id).unwrap(), PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn test_late_ledger_match_is_discarded_after_expiry() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("1", "SOL")).await.unwrap();
        let id = &created.request.transaction_id;

        // A matching transaction exists, but the window already elapsed.
        ledger.record_reference(created.request.reference, None);
        service.force_expiry_window(id);

        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Expired);
        // Expired is terminal; later verifies do not resurrect the request.
        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn test_completed_is_not_overridden_by_expiry() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("1", "SOL")).await.unwrap();
        let id = &created.request.transaction_id;

        ledger.record_reference(created.request.reference, None);
        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Completed);

        // The countdown elapsing afterwards does not demote the state.
        service.force_expiry_window(id);
        assert_eq!(service.status(id).unwrap(), PaymentStatus::Completed);
        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_unknown_id_is_request_not_found() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(ledger);
        assert!(matches!(
            service.verify("missing").await,
            Err(PayError::RequestNotFound(_))
        ));
        assert!(matches!(
            service.status("missing"),
            Err(PayError::RequestNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ledger_outage_leaves_state_untouched() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(Arc::clone(&ledger));
        let created = service.create(create_input("1", "SOL")).await.unwrap();
        let id = &created.request.transaction_id;

        ledger.unavailable.store(true, Ordering::SeqCst);
        assert!(matches!(
            service.verify(id).await,
            Err(PayError::Ledger(_))
        ));

        ledger.unavailable.store(false, Ordering::SeqCst);
        assert_eq!(service.verify(id).await.unwrap(), PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_references_are_unique_across_requests() {
        let ledger = Arc::new(MockLedger::new());
        let service = service(ledger);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            let created = service.create(create_input("1", "SOL")).await.unwrap();
            assert!(seen.insert(created.request.reference));
        }
    }
}
