//! Wallet collaborator seam.
//!
//! A wallet supplies a connected public key and a signing capability.
//! Signing stays strictly on the wallet's side of this trait; the payment
//! subsystem never sees a private key. [`LocalWallet`] wraps an in-process
//! [`Keypair`] for tests and for operator-held escrow authorities.

use async_trait::async_trait;
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;
use solana_transaction::versioned::VersionedTransaction;

use crate::error::PayError;

/// A connected wallet able to sign transactions.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The wallet's public key.
    fn address(&self) -> Pubkey;

    /// Signs the transaction and returns it with signatures filled in.
    ///
    /// # Errors
    ///
    /// Returns [`PayError::Transaction`] if the wallet declines or fails to
    /// sign.
    async fn sign(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, PayError>;
}

/// A [`WalletSigner`] backed by an in-process keypair.
pub struct LocalWallet {
    keypair: Keypair,
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}

impl LocalWallet {
    /// Wraps an existing keypair.
    #[must_use]
    pub const fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Generates a wallet with a fresh random keypair.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(Keypair::new())
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, PayError> {
        VersionedTransaction::try_new(transaction.message, &[&self.keypair])
            .map_err(|e| PayError::Transaction(format!("signing failed: {e}")))
    }
}
