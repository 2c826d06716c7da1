//! Unsigned transfer construction.
//!
//! [`TransferBuilder`] turns a validated [`TransferRequest`] into an
//! [`UnsignedTransfer`]: an ordered instruction list anchored to the latest
//! blockhash, ready for a wallet to sign. Native transfers are a single
//! system-program move (preceded by a rent-minimum provisioning transfer
//! when the recipient has no account yet); token transfers are a single
//! `transfer_checked` (preceded by an idempotent create-ATA instruction
//! when the recipient's associated token account is missing).
//!
//! The blockhash anchor has a ledger-defined validity window. If signing is
//! delayed past `last_valid_block_height`, the caller must rebuild.

use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use serde::{Deserialize, Serialize};
use solana_message::v0::Message as MessageV0;
use solana_message::{Hash, VersionedMessage};
use solana_pubkey::{Pubkey, pubkey};
use solana_signature::Signature;
use solana_transaction::Instruction;
use solana_transaction::versioned::VersionedTransaction;
use spl_token::solana_program::instruction::AccountMeta;

use crate::amount::{parse_amount, to_base_units};
use crate::error::PayError;
use crate::ledger::LedgerClient;
use crate::registry::TokenRegistry;

/// Associated Token Account program.
pub const ATA_PROGRAM_ID: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// SPL Memo program.
pub const MEMO_PROGRAM_ID: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// A user's intent to move value.
///
/// Amounts are user-facing decimal strings; addresses are base58. Both are
/// validated before any ledger interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Sender address; also the fee payer.
    pub sender: String,
    /// Recipient address.
    pub recipient: String,
    /// Decimal amount in user units, e.g. `"10.5"`.
    pub amount: String,
    /// Token symbol from the registry, e.g. `"SOL"` or `"BARK"`.
    pub token: String,
    /// Optional memo recorded on-chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Optional reference key attached to the value-moving instruction so
    /// a payment request can be correlated with the transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Pubkey>,
}

/// An ordered instruction list plus its fee payer and blockhash anchor.
#[derive(Debug, Clone)]
pub struct UnsignedTransfer {
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
    /// Account paying transaction fees (the sender).
    pub fee_payer: Pubkey,
    /// Blockhash the transaction is anchored to.
    pub recent_blockhash: Hash,
    /// Height after which the anchor is no longer submittable.
    pub last_valid_block_height: u64,
}

impl UnsignedTransfer {
    /// Compiles into an unsigned v0 transaction with placeholder
    /// signatures for the wallet to replace.
    ///
    /// # Errors
    ///
    /// Returns [`PayError::Transaction`] if message compilation fails.
    pub fn compile(&self) -> Result<VersionedTransaction, PayError> {
        let message =
            MessageV0::try_compile(&self.fee_payer, &self.instructions, &[], self.recent_blockhash)
                .map_err(|e| PayError::Transaction(format!("message compilation failed: {e:?}")))?;
        let message = VersionedMessage::V0(message);
        let signatures =
            vec![Signature::default(); message.header().num_required_signatures as usize];
        Ok(VersionedTransaction {
            signatures,
            message,
        })
    }

    /// Base64 wire form of the compiled transaction, for handing to a
    /// browser wallet.
    ///
    /// # Errors
    ///
    /// Returns [`PayError::Transaction`] if compilation or serialization
    /// fails.
    pub fn to_base64(&self) -> Result<String, PayError> {
        transaction_to_base64(&self.compile()?)
    }
}

/// Encodes a transaction into its base64 wire form.
///
/// # Errors
///
/// Returns [`PayError::Transaction`] if serialization fails.
pub fn transaction_to_base64(transaction: &VersionedTransaction) -> Result<String, PayError> {
    let bytes = bincode::serialize(transaction)
        .map_err(|e| PayError::Transaction(format!("serialization failed: {e}")))?;
    Ok(b64.encode(bytes))
}

/// Decodes a base64-encoded signed transaction received from a wallet.
///
/// # Errors
///
/// Returns [`PayError::InvalidInput`] if the payload is not base64 or not a
/// valid transaction.
pub fn transaction_from_base64(encoded: &str) -> Result<VersionedTransaction, PayError> {
    let bytes = b64
        .decode(encoded)
        .map_err(|e| PayError::InvalidInput(format!("transaction is not base64: {e}")))?;
    bincode::deserialize(&bytes)
        .map_err(|e| PayError::InvalidInput(format!("transaction decoding failed: {e}")))
}

/// Parses a base58 address.
///
/// # Errors
///
/// Returns [`PayError::InvalidAddress`] if decoding fails.
pub fn parse_address(input: &str) -> Result<Pubkey, PayError> {
    Pubkey::from_str(input.trim()).map_err(|_| PayError::InvalidAddress(input.to_owned()))
}

/// Derives the associated token account for an owner and mint.
#[must_use]
pub fn derive_associated_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), spl_token::id().as_ref(), mint.as_ref()],
        &ATA_PROGRAM_ID,
    )
    .0
}

/// Builds an idempotent create-associated-token-account instruction, paid
/// for by `payer`.
#[must_use]
pub fn create_associated_token_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    let ata = derive_associated_token_account(owner, mint);
    Instruction {
        program_id: ATA_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(solana_system_interface::program::ID, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        // CreateIdempotent discriminator byte is 1
        data: vec![1],
    }
}

fn memo_instruction(memo: &str) -> Instruction {
    Instruction {
        program_id: MEMO_PROGRAM_ID,
        accounts: vec![],
        data: memo.as_bytes().to_vec(),
    }
}

/// Builds [`UnsignedTransfer`]s against an injected ledger.
pub struct TransferBuilder {
    registry: Arc<TokenRegistry>,
    ledger: Arc<dyn LedgerClient>,
}

impl std::fmt::Debug for TransferBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferBuilder").finish_non_exhaustive()
    }
}

impl TransferBuilder {
    /// Creates a builder over the given registry and ledger.
    #[must_use]
    pub fn new(registry: Arc<TokenRegistry>, ledger: Arc<dyn LedgerClient>) -> Self {
        Self { registry, ledger }
    }

    /// Constructs an unsigned transfer for the request.
    ///
    /// # Errors
    ///
    /// - [`PayError::InvalidAddress`] / [`PayError::InvalidAmount`] /
    ///   [`PayError::UnknownToken`] on validation failure, before any
    ///   ledger call.
    /// - [`PayError::InsufficientForRentExemption`] when a native transfer
    ///   moves less than the zero-data rent minimum.
    /// - [`PayError::Ledger`] when an RPC call fails; never retried here.
    pub async fn build(&self, request: &TransferRequest) -> Result<UnsignedTransfer, PayError> {
        let sender = parse_address(&request.sender)?;
        let recipient = parse_address(&request.recipient)?;
        let amount = parse_amount(&request.amount)?;
        let descriptor = self.registry.require(&request.token)?;
        let base_units = to_base_units(amount, descriptor.decimals)?;

        let mut instructions = match descriptor.mint {
            None => self.native_instructions(&sender, &recipient, base_units).await?,
            Some(mint) => {
                self.token_instructions(&sender, &recipient, &mint, descriptor.decimals, base_units)
                    .await?
            }
        };

        if let Some(reference) = request.reference {
            // The reference rides the value-moving instruction as a
            // read-only key so it shows up in the transaction's account
            // list for later correlation.
            if let Some(instruction) = instructions.last_mut() {
                instruction
                    .accounts
                    .push(AccountMeta::new_readonly(reference, false));
            }
        }

        if let Some(memo) = request.memo.as_deref() {
            instructions.push(memo_instruction(memo));
        }

        let (recent_blockhash, last_valid_block_height) = self.ledger.latest_blockhash().await?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            sender = %sender,
            token = %request.token,
            base_units,
            instructions = instructions.len(),
            "built unsigned transfer"
        );

        Ok(UnsignedTransfer {
            instructions,
            fee_payer: sender,
            recent_blockhash,
            last_valid_block_height,
        })
    }

    async fn native_instructions(
        &self,
        sender: &Pubkey,
        recipient: &Pubkey,
        lamports: u64,
    ) -> Result<Vec<Instruction>, PayError> {
        let minimum = self.ledger.minimum_rent_exempt_balance(0).await?;
        if lamports < minimum {
            return Err(PayError::InsufficientForRentExemption { minimum, lamports });
        }

        let mut instructions = Vec::with_capacity(2);
        if !self.ledger.account_exists(recipient).await? {
            // Fresh recipient: provision the account with the rent minimum
            // so it persists, then move the requested value.
            instructions.push(solana_system_interface::instruction::transfer(
                sender, recipient, minimum,
            ));
        }
        instructions.push(solana_system_interface::instruction::transfer(
            sender, recipient, lamports,
        ));
        Ok(instructions)
    }

    async fn token_instructions(
        &self,
        sender: &Pubkey,
        recipient: &Pubkey,
        mint: &Pubkey,
        decimals: u8,
        base_units: u64,
    ) -> Result<Vec<Instruction>, PayError> {
        let source = derive_associated_token_account(sender, mint);
        let destination = derive_associated_token_account(recipient, mint);

        let mut instructions = Vec::with_capacity(2);
        if !self.ledger.account_exists(&destination).await? {
            instructions.push(create_associated_token_account(sender, recipient, mint));
        }
        instructions.push(
            spl_token::instruction::transfer_checked(
                &spl_token::id(),
                &source,
                mint,
                &destination,
                sender,
                &[],
                base_units,
                decimals,
            )
            .map_err(|e| PayError::Transaction(format!("transfer encoding failed: {e}")))?,
        );
        Ok(instructions)
    }
}
