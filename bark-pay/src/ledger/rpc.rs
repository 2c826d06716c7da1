//! RPC-backed [`LedgerClient`] implementation.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use spl_token::solana_program::program_pack::Pack;

use super::{LedgerClient, LedgerError, ReferenceStatus};

/// A [`LedgerClient`] over a Solana JSON-RPC endpoint.
pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedger")
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}

impl RpcLedger {
    /// Creates a ledger client at `confirmed` commitment.
    #[must_use]
    pub fn new(url: impl ToString) -> Self {
        Self::with_commitment(url, CommitmentConfig::confirmed())
    }

    /// Creates a ledger client with an explicit commitment level.
    #[must_use]
    pub fn with_commitment(url: impl ToString, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.to_string(), commitment),
            commitment,
        }
    }
}

fn rpc_err(err: impl std::fmt::Display) -> LedgerError {
    LedgerError(err.to_string())
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn latest_blockhash(&self) -> Result<(Hash, u64), LedgerError> {
        self.client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(rpc_err)
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, LedgerError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(rpc_err)?;
        Ok(response.value.is_some())
    }

    async fn lamport_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        self.client.get_balance(address).await.map_err(rpc_err)
    }

    async fn token_balance(&self, token_account: &Pubkey) -> Result<u64, LedgerError> {
        let response = self
            .client
            .get_account_with_commitment(token_account, self.commitment)
            .await
            .map_err(rpc_err)?;
        let Some(account) = response.value else {
            return Ok(0);
        };
        let state = spl_token::state::Account::unpack(&account.data)
            .map_err(|e| LedgerError(format!("not a token account: {e}")))?;
        Ok(state.amount)
    }

    async fn minimum_rent_exempt_balance(&self, data_len: usize) -> Result<u64, LedgerError> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(rpc_err)
    }

    async fn submit_and_confirm(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(rpc_err)
    }

    async fn find_reference(
        &self,
        reference: &Pubkey,
    ) -> Result<Option<ReferenceStatus>, LedgerError> {
        let statuses = self
            .client
            .get_signatures_for_address(reference)
            .await
            .map_err(rpc_err)?;
        // The RPC returns newest-first; the oldest entry is the transaction
        // that first satisfied the reference.
        Ok(statuses.last().map(|status| ReferenceStatus {
            signature: status.signature.clone(),
            err: status.err.as_ref().map(|e| format!("{e:?}")),
        }))
    }
}
