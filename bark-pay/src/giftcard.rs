//! Escrow-backed gift cards.
//!
//! A purchase moves funds from the buyer into a designated escrow wallet
//! and, only after the transfer confirms, mints a [`GiftCard`] carrying an
//! unguessable 128-bit redemption code. Client-signed purchase
//! transactions are inspected instruction by instruction before
//! submission: the card amount is only ever what the transfer actually
//! deposits with the escrow. Redemption releases exactly the escrowed
//! amount to the redeemer, once: cards are claimed with a compare-and-set
//! before any ledger call, so two concurrent redemptions of the same code
//! can never both move funds.

use std::sync::Arc;

use dashmap::DashMap;
use rand::RngCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use solana_message::compiled_instruction::CompiledInstruction;
use solana_pubkey::Pubkey;
use solana_system_interface::instruction::SystemInstruction;
use solana_transaction::versioned::VersionedTransaction;
use spl_token::instruction::TokenInstruction;

use crate::amount::{parse_amount, to_base_units};
use crate::error::PayError;
use crate::ledger::LedgerClient;
use crate::registry::{TokenDescriptor, TokenRegistry};
use crate::timestamp::UnixTimestamp;
use crate::transfer::{
    TransferBuilder, TransferRequest, UnsignedTransfer, derive_associated_token_account,
    parse_address, transaction_from_base64,
};
use crate::wallet::WalletSigner;

/// Internal redemption state. `Redeeming` claims the card while the escrow
/// release is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum CardState {
    #[default]
    Issued,
    Redeeming,
    Redeemed,
}

/// A redeemable gift card backed by escrowed funds.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    /// Stable identifier.
    pub id: String,
    /// Opaque, unguessable redemption code (128-bit random, base58).
    pub code: String,
    /// Escrowed amount in user units.
    pub amount: Decimal,
    /// Token symbol of the escrowed funds.
    pub token: String,
    /// Wallet that purchased the card.
    #[serde_as(as = "DisplayFromStr")]
    pub purchaser: Pubkey,
    /// Purchase time.
    pub purchased_at: UnixTimestamp,
    /// Wallet that redeemed the card, once redeemed.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_by: Option<Pubkey>,
    /// Redemption time, once redeemed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<UnixTimestamp>,
    #[serde(skip)]
    state: CardState,
}

/// A confirmed purchase or redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardReceipt {
    /// The card after the operation.
    pub card: GiftCard,
    /// Signature of the confirmed transfer.
    pub signature: String,
}

/// Issues and redeems gift cards against an escrow wallet.
pub struct GiftCardVault {
    registry: Arc<TokenRegistry>,
    ledger: Arc<dyn LedgerClient>,
    transfers: TransferBuilder,
    escrow: Arc<dyn WalletSigner>,
    cards: DashMap<String, GiftCard>,
}

impl std::fmt::Debug for GiftCardVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiftCardVault")
            .field("escrow", &self.escrow.address())
            .field("cards", &self.cards.len())
            .finish_non_exhaustive()
    }
}

fn instruction_account(
    keys: &[Pubkey],
    instruction: &CompiledInstruction,
    index: usize,
) -> Option<Pubkey> {
    let key_index = *instruction.accounts.get(index)? as usize;
    keys.get(key_index).copied()
}

fn new_card_id() -> String {
    let mut bytes = [0u8; 8];
    rand::rng().fill_bytes(&mut bytes);
    bs58::encode(bytes).into_string()
}

fn new_redemption_code() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    bs58::encode(bytes).into_string()
}

impl GiftCardVault {
    /// Creates a vault whose escrow authority is the given wallet.
    #[must_use]
    pub fn new(
        registry: Arc<TokenRegistry>,
        ledger: Arc<dyn LedgerClient>,
        escrow: Arc<dyn WalletSigner>,
    ) -> Self {
        let transfers = TransferBuilder::new(Arc::clone(&registry), Arc::clone(&ledger));
        Self {
            registry,
            ledger,
            transfers,
            escrow,
            cards: DashMap::new(),
        }
    }

    /// The escrow authority's address. Buyers fund this account (or its
    /// associated token account) when purchasing a card.
    #[must_use]
    pub fn escrow_address(&self) -> Pubkey {
        self.escrow.address()
    }

    /// Builds the unsigned buyer-to-escrow transfer for a purchase, for a
    /// wallet to sign client-side and hand back to
    /// [`Self::purchase_signed`].
    ///
    /// # Errors
    ///
    /// - [`PayError::InsufficientFunds`] when the buyer's balance does not
    ///   cover the amount.
    /// - [`PayError::Ledger`] when the underlying build fails.
    pub async fn prepare_purchase(
        &self,
        buyer: &str,
        amount: &str,
        token: &str,
    ) -> Result<UnsignedTransfer, PayError> {
        let buyer_address = parse_address(buyer)?;
        let (_, base_units) = self.validate(amount, token)?;
        self.check_balance(&buyer_address, token, base_units).await?;

        self.transfers
            .build(&TransferRequest {
                sender: buyer_address.to_string(),
                recipient: self.escrow.address().to_string(),
                amount: amount.to_owned(),
                token: token.to_owned(),
                memo: None,
                reference: None,
            })
            .await
    }

    /// Purchases a gift card: the buyer's wallet signs a transfer into
    /// escrow, and the card is minted only after the transfer confirms.
    ///
    /// # Errors
    ///
    /// - [`PayError::InsufficientFunds`] when the buyer's balance does not
    ///   cover the amount; checked before building anything.
    /// - [`PayError::Ledger`] when submission fails; nothing is minted.
    pub async fn purchase(
        &self,
        buyer: &dyn WalletSigner,
        amount: &str,
        token: &str,
    ) -> Result<GiftCardReceipt, PayError> {
        let buyer_address = buyer.address();
        let (parsed, _) = self.validate(amount, token)?;

        let unsigned = self
            .prepare_purchase(&buyer_address.to_string(), amount, token)
            .await?;
        let signed = buyer.sign(unsigned.compile()?).await?;
        let signature = self.ledger.submit_and_confirm(&signed).await?;

        Ok(self.mint(buyer_address, parsed, token, signature.to_string()))
    }

    /// Purchase variant for the HTTP dispatcher: the buyer's wallet already
    /// signed the escrow transfer client-side.
    ///
    /// The transaction is inspected before submission: it must carry a
    /// value-moving instruction that pays the escrow (the escrow account
    /// for the native currency, its associated token account for SPL
    /// tokens) exactly the stated amount in base units. A card is never
    /// minted against a transfer that deposits anything else.
    ///
    /// # Errors
    ///
    /// As [`Self::purchase`], plus [`PayError::InvalidInput`] when the
    /// signed transaction payload does not decode or does not fund the
    /// escrow with the stated amount.
    pub async fn purchase_signed(
        &self,
        buyer: &str,
        amount: &str,
        token: &str,
        signed_transaction: &str,
    ) -> Result<GiftCardReceipt, PayError> {
        let buyer_address = parse_address(buyer)?;
        let (parsed, base_units) = self.validate(amount, token)?;
        self.check_balance(&buyer_address, token, base_units).await?;

        let transaction = transaction_from_base64(signed_transaction)?;
        self.verify_escrow_deposit(&transaction, token, base_units)?;
        let signature = self.ledger.submit_and_confirm(&transaction).await?;

        Ok(self.mint(buyer_address, parsed, token, signature.to_string()))
    }

    /// Checks that a client-signed purchase transaction deposits exactly
    /// `base_units` of `token` with the escrow.
    fn verify_escrow_deposit(
        &self,
        transaction: &VersionedTransaction,
        token: &str,
        base_units: u64,
    ) -> Result<(), PayError> {
        let descriptor = self.registry.require(token)?;
        let keys = transaction.message.static_account_keys();

        for instruction in transaction.message.instructions() {
            let program_id = keys.get(instruction.program_id_index as usize);
            match descriptor.mint {
                Some(mint) => {
                    if program_id != Some(&spl_token::id()) {
                        continue;
                    }
                    let Ok(TokenInstruction::TransferChecked { amount, .. }) =
                        TokenInstruction::unpack(&instruction.data)
                    else {
                        continue;
                    };
                    // TransferChecked accounts: source, mint, destination,
                    // authority.
                    let escrow_ata =
                        derive_associated_token_account(&self.escrow.address(), &mint);
                    if instruction_account(keys, instruction, 1) == Some(mint)
                        && instruction_account(keys, instruction, 2) == Some(escrow_ata)
                        && amount == base_units
                    {
                        return Ok(());
                    }
                }
                None => {
                    if program_id != Some(&solana_system_interface::program::ID) {
                        continue;
                    }
                    let Ok(SystemInstruction::Transfer { lamports }) =
                        bincode::deserialize(&instruction.data)
                    else {
                        continue;
                    };
                    if instruction_account(keys, instruction, 1) == Some(self.escrow.address())
                        && lamports == base_units
                    {
                        return Ok(());
                    }
                }
            }
        }

        Err(PayError::InvalidInput(
            "signed transaction does not fund the escrow with the stated amount".into(),
        ))
    }

    /// Redeems a card: releases exactly the escrowed amount to the
    /// redeemer and marks the card redeemed. Single-use.
    ///
    /// # Errors
    ///
    /// - [`PayError::GiftCardNotFound`] for unknown codes.
    /// - [`PayError::AlreadyRedeemed`] if the card was redeemed or another
    ///   redemption of the same code is in flight.
    /// - [`PayError::Ledger`] when the escrow release fails; the card
    ///   returns to issued and no funds moved.
    pub async fn redeem(&self, code: &str, redeemer: &str) -> Result<GiftCardReceipt, PayError> {
        let redeemer = parse_address(redeemer)?;

        // Claim the card under the entry guard. No await happens while the
        // guard is held, and only the claimant proceeds to move funds.
        let (amount, token) = {
            let mut card = self
                .cards
                .get_mut(code)
                .ok_or(PayError::GiftCardNotFound)?;
            match card.state {
                CardState::Redeemed | CardState::Redeeming => {
                    return Err(PayError::AlreadyRedeemed);
                }
                CardState::Issued => card.state = CardState::Redeeming,
            }
            (card.amount, card.token.clone())
        };

        let released = self.release_escrow(&redeemer, amount, &token).await;

        let mut card = self
            .cards
            .get_mut(code)
            .ok_or(PayError::GiftCardNotFound)?;
        match released {
            Ok(signature) => {
                card.state = CardState::Redeemed;
                card.redeemed_by = Some(redeemer);
                card.redeemed_at = Some(UnixTimestamp::now());

                #[cfg(feature = "telemetry")]
                tracing::info!(card = %card.id, redeemer = %redeemer, "gift card redeemed");

                Ok(GiftCardReceipt {
                    card: card.clone(),
                    signature,
                })
            }
            Err(err) => {
                // Release the claim so a later attempt can retry.
                card.state = CardState::Issued;
                Err(err)
            }
        }
    }

    /// Looks up a card by redemption code.
    ///
    /// # Errors
    ///
    /// Returns [`PayError::GiftCardNotFound`] for unknown codes.
    pub fn get(&self, code: &str) -> Result<GiftCard, PayError> {
        self.cards
            .get(code)
            .map(|entry| entry.clone())
            .ok_or(PayError::GiftCardNotFound)
    }

    fn validate(&self, amount: &str, token: &str) -> Result<(Decimal, u64), PayError> {
        let parsed = parse_amount(amount)?;
        let descriptor = self.registry.require(token)?;
        let base_units = to_base_units(parsed, descriptor.decimals)?;
        Ok((parsed, base_units))
    }

    async fn check_balance(
        &self,
        buyer: &Pubkey,
        token: &str,
        required: u64,
    ) -> Result<(), PayError> {
        let descriptor: &TokenDescriptor = self.registry.require(token)?;
        let available = match descriptor.mint {
            None => self.ledger.lamport_balance(buyer).await?,
            Some(mint) => {
                let ata = derive_associated_token_account(buyer, &mint);
                self.ledger.token_balance(&ata).await?
            }
        };
        if available < required {
            return Err(PayError::InsufficientFunds {
                required,
                available,
            });
        }
        Ok(())
    }

    async fn release_escrow(
        &self,
        redeemer: &Pubkey,
        amount: Decimal,
        token: &str,
    ) -> Result<String, PayError> {
        let unsigned = self
            .transfers
            .build(&TransferRequest {
                sender: self.escrow.address().to_string(),
                recipient: redeemer.to_string(),
                amount: amount.to_string(),
                token: token.to_owned(),
                memo: None,
                reference: None,
            })
            .await?;
        let signed = self.escrow.sign(unsigned.compile()?).await?;
        let signature = self.ledger.submit_and_confirm(&signed).await?;
        Ok(signature.to_string())
    }

    fn mint(
        &self,
        purchaser: Pubkey,
        amount: Decimal,
        token: &str,
        signature: String,
    ) -> GiftCardReceipt {
        let card = GiftCard {
            id: new_card_id(),
            code: new_redemption_code(),
            amount,
            token: token.to_owned(),
            purchaser,
            purchased_at: UnixTimestamp::now(),
            redeemed_by: None,
            redeemed_at: None,
            state: CardState::Issued,
        };
        self.cards.insert(card.code.clone(), card.clone());

        #[cfg(feature = "telemetry")]
        tracing::info!(card = %card.id, purchaser = %purchaser, "gift card issued");

        GiftCardReceipt { card, signature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::MockLedger;
    use crate::registry::BARK_MINT;
    use crate::transfer::transaction_to_base64;
    use crate::wallet::LocalWallet;
    use std::sync::atomic::Ordering;

    fn vault(ledger: Arc<MockLedger>, escrow: Arc<LocalWallet>) -> GiftCardVault {
        GiftCardVault::new(Arc::new(TokenRegistry::with_defaults()), ledger, escrow)
    }

    fn fund_buyer(ledger: &MockLedger, buyer: &Pubkey, base_units: u64) {
        let ata = derive_associated_token_account(buyer, &BARK_MINT);
        ledger.set_token_balance(ata, base_units);
    }

    /// Builds, signs, and encodes a transfer the way a browser wallet would.
    async fn signed_transfer(
        ledger: &Arc<MockLedger>,
        buyer: &LocalWallet,
        recipient: &Pubkey,
        amount: &str,
        token: &str,
    ) -> String {
        let registry = Arc::new(TokenRegistry::with_defaults());
        let transfers = TransferBuilder::new(registry, Arc::clone(ledger) as _);
        let unsigned = transfers
            .build(&TransferRequest {
                sender: buyer.address().to_string(),
                recipient: recipient.to_string(),
                amount: amount.into(),
                token: token.into(),
                memo: None,
                reference: None,
            })
            .await
            .unwrap();
        let signed = buyer.sign(unsigned.compile().unwrap()).await.unwrap();
        transaction_to_base64(&signed).unwrap()
    }

    #[tokio::test]
    async fn test_purchase_mints_card_after_confirmed_transfer() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let buyer = LocalWallet::generate();
        fund_buyer(&ledger, &buyer.address(), 1_000_000_000_000);
        // Escrow ATA exists so the purchase needs no provisioning.
        ledger.add_account(derive_associated_token_account(&escrow.address(), &BARK_MINT));

        let vault = vault(Arc::clone(&ledger), escrow);
        let receipt = vault.purchase(&buyer, "500", "BARK").await.unwrap();

        assert_eq!(receipt.card.purchaser, buyer.address());
        assert_eq!(receipt.card.amount, parse_amount("500").unwrap());
        assert!(receipt.card.redeemed_by.is_none());
        assert_eq!(ledger.submitted.lock().unwrap().len(), 1);
        // Codes carry 128 bits of entropy; base58 of 16 bytes is 21-23 chars.
        assert!(receipt.card.code.len() >= 21);
    }

    #[tokio::test]
    async fn test_purchase_rejects_insufficient_balance() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let buyer = LocalWallet::generate();
        fund_buyer(&ledger, &buyer.address(), 1_000);

        let vault = vault(Arc::clone(&ledger), escrow);
        let err = vault.purchase(&buyer, "500", "BARK").await.unwrap_err();

        assert!(matches!(err, PayError::InsufficientFunds { .. }));
        assert!(ledger.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_submission_mints_nothing() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let buyer = LocalWallet::generate();
        fund_buyer(&ledger, &buyer.address(), 1_000_000_000_000);
        ledger.fail_submission.store(true, Ordering::SeqCst);

        let vault = vault(Arc::clone(&ledger), escrow);
        let err = vault.purchase(&buyer, "500", "BARK").await.unwrap_err();

        assert!(matches!(err, PayError::Ledger(_)));
        assert!(vault.cards.is_empty());
    }

    #[tokio::test]
    async fn test_redemption_is_single_use() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let escrow_address = escrow.address();
        let buyer = LocalWallet::generate();
        fund_buyer(&ledger, &buyer.address(), 1_000_000_000_000);
        ledger.add_account(derive_associated_token_account(&escrow_address, &BARK_MINT));

        let vault = vault(Arc::clone(&ledger), escrow);
        let receipt = vault.purchase(&buyer, "500", "BARK").await.unwrap();
        let code = receipt.card.code.clone();

        let redeemer = Pubkey::new_unique();
        ledger.add_account(derive_associated_token_account(&redeemer, &BARK_MINT));
        let redeemed = vault.redeem(&code, &redeemer.to_string()).await.unwrap();
        assert_eq!(redeemed.card.redeemed_by, Some(redeemer));
        assert!(redeemed.card.redeemed_at.is_some());

        // Purchase + redemption: exactly two transfers ever executed.
        assert_eq!(ledger.submitted.lock().unwrap().len(), 2);

        let second = Pubkey::new_unique();
        let err = vault.redeem(&code, &second.to_string()).await.unwrap_err();
        assert!(matches!(err, PayError::AlreadyRedeemed));
        assert_eq!(ledger.submitted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_redeem_unknown_code_is_not_found() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let vault = vault(ledger, escrow);

        let err = vault
            .redeem("nope", &Pubkey::new_unique().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::GiftCardNotFound));
    }

    #[tokio::test]
    async fn test_failed_release_returns_card_to_issued() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let escrow_address = escrow.address();
        let buyer = LocalWallet::generate();
        fund_buyer(&ledger, &buyer.address(), 1_000_000_000_000);
        ledger.add_account(derive_associated_token_account(&escrow_address, &BARK_MINT));

        let vault = vault(Arc::clone(&ledger), escrow);
        let receipt = vault.purchase(&buyer, "500", "BARK").await.unwrap();
        let code = receipt.card.code.clone();

        let redeemer = Pubkey::new_unique();
        ledger.add_account(derive_associated_token_account(&redeemer, &BARK_MINT));

        ledger.fail_submission.store(true, Ordering::SeqCst);
        let err = vault.redeem(&code, &redeemer.to_string()).await.unwrap_err();
        assert!(matches!(err, PayError::Ledger(_)));
        assert!(vault.get(&code).unwrap().redeemed_by.is_none());

        // The claim was released; a retry succeeds and moves the funds once.
        ledger.fail_submission.store(false, Ordering::SeqCst);
        let redeemed = vault.redeem(&code, &redeemer.to_string()).await.unwrap();
        assert_eq!(redeemed.card.amount, parse_amount("500").unwrap());
    }

    #[tokio::test]
    async fn test_purchase_signed_submits_provided_transaction() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let escrow_address = escrow.address();
        let buyer = LocalWallet::generate();
        let buyer_address = buyer.address();
        fund_buyer(&ledger, &buyer_address, 1_000_000_000_000);
        ledger.add_account(derive_associated_token_account(&escrow_address, &BARK_MINT));

        let encoded = signed_transfer(&ledger, &buyer, &escrow_address, "500", "BARK").await;

        let vault = vault(Arc::clone(&ledger), escrow);
        let receipt = vault
            .purchase_signed(&buyer_address.to_string(), "500", "BARK", &encoded)
            .await
            .unwrap();
        assert_eq!(receipt.card.purchaser, buyer_address);
        assert_eq!(ledger.submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_signed_accepts_native_deposit() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let escrow_address = escrow.address();
        let buyer = LocalWallet::generate();
        let buyer_address = buyer.address();
        ledger.set_lamports(buyer_address, 10_000_000_000);
        ledger.add_account(escrow_address);

        let encoded = signed_transfer(&ledger, &buyer, &escrow_address, "2", "SOL").await;

        let vault = vault(Arc::clone(&ledger), escrow);
        let receipt = vault
            .purchase_signed(&buyer_address.to_string(), "2", "SOL", &encoded)
            .await
            .unwrap();
        assert_eq!(receipt.card.token, "SOL");
        assert_eq!(ledger.submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_signed_rejects_transfer_to_other_recipient() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let buyer = LocalWallet::generate();
        let buyer_address = buyer.address();
        fund_buyer(&ledger, &buyer_address, 1_000_000_000_000);

        // The buyer signs a 1-unit transfer back to themselves, then claims
        // it funded a 500-unit card.
        let elsewhere = Pubkey::new_unique();
        ledger.add_account(derive_associated_token_account(&elsewhere, &BARK_MINT));
        let encoded = signed_transfer(&ledger, &buyer, &elsewhere, "1", "BARK").await;

        let vault = vault(Arc::clone(&ledger), escrow);
        let err = vault
            .purchase_signed(&buyer_address.to_string(), "500", "BARK", &encoded)
            .await
            .unwrap_err();

        assert!(matches!(err, PayError::InvalidInput(_)));
        // Nothing was submitted and no card exists to drain the escrow with.
        assert!(ledger.submitted.lock().unwrap().is_empty());
        assert!(vault.cards.is_empty());
    }

    #[tokio::test]
    async fn test_purchase_signed_rejects_amount_mismatch() {
        let ledger = Arc::new(MockLedger::new());
        let escrow = Arc::new(LocalWallet::generate());
        let escrow_address = escrow.address();
        let buyer = LocalWallet::generate();
        let buyer_address = buyer.address();
        fund_buyer(&ledger, &buyer_address, 1_000_000_000_000);
        ledger.add_account(derive_associated_token_account(&escrow_address, &BARK_MINT));

        // Deposits 5 BARK with the escrow but claims a 500-unit card.
        let encoded = signed_transfer(&ledger, &buyer, &escrow_address, "5", "BARK").await;

        let vault = vault(Arc::clone(&ledger), escrow);
        let err = vault
            .purchase_signed(&buyer_address.to_string(), "500", "BARK", &encoded)
            .await
            .unwrap_err();

        assert!(matches!(err, PayError::InvalidInput(_)));
        assert!(ledger.submitted.lock().unwrap().is_empty());
        assert!(vault.cards.is_empty());
    }
}
