//! In-memory [`LedgerClient`] fake for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use super::{LedgerClient, LedgerError, ReferenceStatus};

/// An in-memory ledger with scriptable state.
///
/// Accounts, balances, and reference outcomes are plain maps the test
/// mutates directly; `submitted` records every transaction sent through
/// [`LedgerClient::submit_and_confirm`].
#[derive(Debug)]
pub struct MockLedger {
    /// Blockhash returned by `latest_blockhash`.
    pub blockhash: Hash,
    /// Last valid block height returned by `latest_blockhash`.
    pub last_valid_block_height: u64,
    /// Rent-exempt minimum for a zero-data account.
    pub rent_minimum: u64,
    /// Accounts that exist on the fake ledger.
    pub accounts: Mutex<HashSet<Pubkey>>,
    /// Lamport balances.
    pub lamports: Mutex<HashMap<Pubkey, u64>>,
    /// Token account balances in base units.
    pub token_balances: Mutex<HashMap<Pubkey, u64>>,
    /// Reference lookups: reference key -> scripted outcome.
    pub references: Mutex<HashMap<Pubkey, ReferenceStatus>>,
    /// Every transaction submitted through this ledger.
    pub submitted: Mutex<Vec<VersionedTransaction>>,
    /// When set, `submit_and_confirm` fails.
    pub fail_submission: AtomicBool,
    /// When set, every call fails as if the endpoint were down.
    pub unavailable: AtomicBool,
    /// Number of `find_reference` calls observed.
    pub reference_queries: AtomicUsize,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            blockhash: Hash::default(),
            last_valid_block_height: 1_000,
            rent_minimum: 890_880,
            accounts: Mutex::new(HashSet::new()),
            lamports: Mutex::new(HashMap::new()),
            token_balances: Mutex::new(HashMap::new()),
            references: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            fail_submission: AtomicBool::new(false),
            unavailable: AtomicBool::new(false),
            reference_queries: AtomicUsize::new(0),
        }
    }
}

impl MockLedger {
    /// Creates a mock ledger with default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an account as existing.
    pub fn add_account(&self, address: Pubkey) {
        self.accounts.lock().unwrap().insert(address);
    }

    /// Sets a lamport balance (and marks the account as existing).
    pub fn set_lamports(&self, address: Pubkey, balance: u64) {
        self.add_account(address);
        self.lamports.lock().unwrap().insert(address, balance);
    }

    /// Sets a token account balance (and marks the account as existing).
    pub fn set_token_balance(&self, token_account: Pubkey, balance: u64) {
        self.add_account(token_account);
        self.token_balances
            .lock()
            .unwrap()
            .insert(token_account, balance);
    }

    /// Scripts the outcome of a reference lookup.
    pub fn record_reference(&self, reference: Pubkey, err: Option<&str>) {
        self.references.lock().unwrap().insert(
            reference,
            ReferenceStatus {
                signature: Signature::default().to_string(),
                err: err.map(str::to_owned),
            },
        );
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(LedgerError("endpoint unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn latest_blockhash(&self) -> Result<(Hash, u64), LedgerError> {
        self.check_available()?;
        Ok((self.blockhash, self.last_valid_block_height))
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, LedgerError> {
        self.check_available()?;
        Ok(self.accounts.lock().unwrap().contains(address))
    }

    async fn lamport_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        self.check_available()?;
        Ok(self
            .lamports
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0))
    }

    async fn token_balance(&self, token_account: &Pubkey) -> Result<u64, LedgerError> {
        self.check_available()?;
        Ok(self
            .token_balances
            .lock()
            .unwrap()
            .get(token_account)
            .copied()
            .unwrap_or(0))
    }

    async fn minimum_rent_exempt_balance(&self, _data_len: usize) -> Result<u64, LedgerError> {
        self.check_available()?;
        Ok(self.rent_minimum)
    }

    async fn submit_and_confirm(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError> {
        self.check_available()?;
        if self.fail_submission.load(Ordering::SeqCst) {
            return Err(LedgerError("transaction rejected".into()));
        }
        self.submitted.lock().unwrap().push(transaction.clone());
        Ok(Signature::default())
    }

    async fn find_reference(
        &self,
        reference: &Pubkey,
    ) -> Result<Option<ReferenceStatus>, LedgerError> {
        self.check_available()?;
        self.reference_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.references.lock().unwrap().get(reference).cloned())
    }
}
