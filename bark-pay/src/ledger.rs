//! Ledger collaborator seam.
//!
//! All ledger interaction goes through [`LedgerClient`], an async trait the
//! payment components receive by injection so tests can substitute an
//! in-memory fake. The RPC-backed implementation lives in [`rpc`] behind the
//! `rpc` feature.
//!
//! No implementation retries on failure; every RPC error surfaces as a
//! [`LedgerError`] and callers own their own backoff policy.

use async_trait::async_trait;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

#[cfg(feature = "rpc")]
pub mod rpc;
#[cfg(feature = "rpc")]
pub use rpc::RpcLedger;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

/// A transient ledger failure, wrapping the underlying RPC error text.
#[derive(Debug, Clone, thiserror::Error)]
#[error("ledger unavailable: {0}")]
pub struct LedgerError(pub String);

/// Outcome of a ledger lookup for a payment reference.
#[derive(Debug, Clone)]
pub struct ReferenceStatus {
    /// Signature of the transaction that included the reference key.
    pub signature: String,
    /// Execution error reported by the ledger, if the transaction failed.
    pub err: Option<String>,
}

/// Asynchronous view of the remote ledger.
///
/// Every method is an independent, cancelable network call with no ordering
/// guarantee relative to other in-flight calls.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The most recent blockhash and its last valid block height.
    async fn latest_blockhash(&self) -> Result<(Hash, u64), LedgerError>;

    /// Whether an account exists on the ledger.
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, LedgerError>;

    /// Lamport balance of an account. Zero if the account does not exist.
    async fn lamport_balance(&self, address: &Pubkey) -> Result<u64, LedgerError>;

    /// Token base-unit balance of a token account. Zero if the account does
    /// not exist.
    async fn token_balance(&self, token_account: &Pubkey) -> Result<u64, LedgerError>;

    /// Minimum lamport balance for rent exemption at the given data size.
    async fn minimum_rent_exempt_balance(&self, data_len: usize) -> Result<u64, LedgerError>;

    /// Submits a signed transaction and waits for confirmation.
    async fn submit_and_confirm(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError>;

    /// Finds the transaction, if any, whose account keys include the given
    /// reference.
    async fn find_reference(
        &self,
        reference: &Pubkey,
    ) -> Result<Option<ReferenceStatus>, LedgerError>;
}
