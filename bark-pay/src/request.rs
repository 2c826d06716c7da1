//! Payment request issuance.
//!
//! A [`PaymentRequestService`] wraps the transfer builder behind opaque
//! transaction ids. Each request gets a process-unique reference key, a
//! shareable `solana:` URI, an SVG QR payload, and a fixed 300-second
//! validity window tracked by [`crate::verify`].

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::RngCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use solana_pubkey::Pubkey;

use crate::amount::{parse_amount, to_base_units};
use crate::error::PayError;
use crate::ledger::LedgerClient;
use crate::qr;
use crate::registry::TokenRegistry;
use crate::timestamp::UnixTimestamp;
use crate::transfer::{TransferBuilder, TransferRequest, parse_address};
use crate::uri::PaymentUri;
use crate::verify::PaymentStatus;

/// Fixed validity window for payment requests, in seconds.
pub const PAYMENT_REQUEST_TTL_SECS: u64 = 300;

/// A tracked payment request.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Server-assigned opaque id.
    pub transaction_id: String,
    /// Ledger-visible reference key, unique for the process lifetime.
    #[serde_as(as = "DisplayFromStr")]
    pub reference: Pubkey,
    /// Address being paid.
    #[serde_as(as = "DisplayFromStr")]
    pub recipient: Pubkey,
    /// Decimal amount in user units.
    pub amount: Decimal,
    /// Token symbol.
    pub token: String,
    /// Paying wallet, when known at creation time.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Pubkey>,
    /// Display label shown by the paying wallet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Memo recorded on-chain with the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Creation time.
    pub created_at: UnixTimestamp,
    /// Expiry: creation time plus the fixed validity window.
    pub expires_at: UnixTimestamp,
    /// Current lifecycle state.
    pub status: PaymentStatus,
    /// Signature of the resolving transaction, once observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Input for [`PaymentRequestService::create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Paying wallet address, when already connected. Merchant-initiated
    /// requests scanned by a buyer's wallet leave this unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Decimal amount in user units.
    pub amount: String,
    /// Token symbol.
    pub token: String,
    /// Optional on-chain memo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// A freshly created payment request with its shareable encodings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPaymentRequest {
    /// The stored request.
    #[serde(flatten)]
    pub request: PaymentRequest,
    /// Wallet-scannable payment URI.
    pub url: String,
    /// SVG QR rendering of the URI.
    pub qr_svg: String,
    /// Base64 unsigned transfer, pre-built when the payer was known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<String>,
}

/// Issues and stores payment requests.
pub struct PaymentRequestService {
    registry: Arc<TokenRegistry>,
    ledger: Arc<dyn LedgerClient>,
    transfers: TransferBuilder,
    recipient: Pubkey,
    label: Option<String>,
    ttl_secs: u64,
    requests: DashMap<String, PaymentRequest>,
    references: DashMap<Pubkey, String>,
}

impl std::fmt::Debug for PaymentRequestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentRequestService")
            .field("recipient", &self.recipient)
            .field("requests", &self.requests.len())
            .finish_non_exhaustive()
    }
}

fn new_transaction_id() -> String {
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    bs58::encode(bytes).into_string()
}

fn new_reference() -> Pubkey {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    Pubkey::new_from_array(bytes)
}

impl PaymentRequestService {
    /// Creates a service receiving payments at `recipient`.
    #[must_use]
    pub fn new(
        registry: Arc<TokenRegistry>,
        ledger: Arc<dyn LedgerClient>,
        recipient: Pubkey,
    ) -> Self {
        let transfers = TransferBuilder::new(Arc::clone(&registry), Arc::clone(&ledger));
        Self {
            registry,
            ledger,
            transfers,
            recipient,
            label: None,
            ttl_secs: PAYMENT_REQUEST_TTL_SECS,
            requests: DashMap::new(),
            references: DashMap::new(),
        }
    }

    /// Sets the label shown by paying wallets.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Overrides the validity window. Intended for tests; production uses
    /// the fixed [`PAYMENT_REQUEST_TTL_SECS`].
    #[must_use]
    pub const fn with_ttl(mut self, secs: u64) -> Self {
        self.ttl_secs = secs;
        self
    }

    /// The ledger this service queries.
    pub(crate) fn ledger(&self) -> &dyn LedgerClient {
        self.ledger.as_ref()
    }

    pub(crate) const fn requests(&self) -> &DashMap<String, PaymentRequest> {
        &self.requests
    }

    /// Creates and stores a payment request.
    ///
    /// Allocates an opaque transaction id and a reference key checked for
    /// uniqueness against every reference this process has issued. When the
    /// payer is known the underlying transfer is pre-built and returned in
    /// base64; otherwise it is left for the wallet-present flow.
    ///
    /// # Errors
    ///
    /// Validation errors ([`PayError::InvalidAmount`],
    /// [`PayError::UnknownToken`], [`PayError::InvalidAddress`]) surface
    /// before anything is stored; [`PayError::Ledger`] if pre-building the
    /// transfer fails.
    pub async fn create(
        &self,
        input: CreatePaymentRequest,
    ) -> Result<CreatedPaymentRequest, PayError> {
        let amount = parse_amount(&input.amount)?;
        let descriptor = self.registry.require(&input.token)?;
        to_base_units(amount, descriptor.decimals)?;
        let payer = input.payer.as_deref().map(parse_address).transpose()?;

        let transaction_id = loop {
            let id = new_transaction_id();
            if !self.requests.contains_key(&id) {
                break id;
            }
        };
        let reference = loop {
            let candidate = new_reference();
            match self.references.entry(candidate) {
                Entry::Vacant(slot) => {
                    slot.insert(transaction_id.clone());
                    break candidate;
                }
                Entry::Occupied(_) => {}
            }
        };

        let transfer = match payer {
            Some(payer) => {
                let unsigned = self
                    .transfers
                    .build(&TransferRequest {
                        sender: payer.to_string(),
                        recipient: self.recipient.to_string(),
                        amount: input.amount.clone(),
                        token: input.token.clone(),
                        memo: input.memo.clone(),
                        reference: Some(reference),
                    })
                    .await?;
                Some(unsigned.to_base64()?)
            }
            None => None,
        };

        let uri = PaymentUri {
            recipient: self.recipient,
            amount,
            token: descriptor.uri_token(),
            reference,
            label: self.label.clone(),
            memo: input.memo.clone(),
        };
        let url = uri.to_string();
        let qr_svg = qr::render_svg(&url)?;

        let created_at = UnixTimestamp::now();
        let request = PaymentRequest {
            transaction_id: transaction_id.clone(),
            reference,
            recipient: self.recipient,
            amount,
            token: input.token,
            payer,
            label: self.label.clone(),
            memo: input.memo,
            created_at,
            expires_at: created_at + self.ttl_secs,
            status: PaymentStatus::Pending,
            signature: None,
        };
        self.requests.insert(transaction_id, request.clone());

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            transaction_id = %request.transaction_id,
            reference = %request.reference,
            "created payment request"
        );

        Ok(CreatedPaymentRequest {
            request,
            url,
            qr_svg,
            transfer,
        })
    }

    /// Fetches a stored request by transaction id.
    ///
    /// # Errors
    ///
    /// Returns [`PayError::RequestNotFound`] for unknown ids.
    pub fn get(&self, transaction_id: &str) -> Result<PaymentRequest, PayError> {
        self.requests
            .get(transaction_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| PayError::RequestNotFound(transaction_id.to_owned()))
    }

    #[cfg(test)]
    pub(crate) fn force_expiry_window(&self, transaction_id: &str) {
        if let Some(mut entry) = self.requests.get_mut(transaction_id) {
            entry.expires_at = UnixTimestamp::from_secs(0);
        }
    }
}
