//! Axum route handlers for the action dispatcher.
//!
//! Everything goes through `POST /action` with a tagged body:
//!
//! ```json
//! {"action": "createPaymentRequest", "data": {"amount": "25", "token": "USDC"}}
//! ```
//!
//! Responses use a uniform envelope: `{"success": true, "data": …}` on
//! success, `{"success": false, "error": "…"}` with HTTP 400/500 on
//! failure. No internal error escapes unmapped.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use bark_pay::giftcard::GiftCardVault;
use bark_pay::transfer::transaction_from_base64;
use bark_pay::{CreatePaymentRequest, PayError, PaymentRequestService, TransferBuilder, TransferRequest};

use crate::blinks::BlinkStore;
use crate::error::ActionError;

/// Shared application state for the dispatcher.
pub struct AppState {
    /// Transfer construction.
    pub transfers: TransferBuilder,
    /// Payment request issuance and verification.
    pub payments: PaymentRequestService,
    /// Gift card purchase and redemption.
    pub giftcards: GiftCardVault,
    /// Blink record pass-through.
    pub blinks: BlinkStore,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// State handle shared across requests.
pub type DispatcherState = Arc<AppState>;

/// Tagged action request.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    /// Action tag, e.g. `createTransfer`.
    pub action: String,
    /// Action-specific payload.
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyPaymentAction {
    transaction_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrepareGiftCardAction {
    buyer: String,
    amount: String,
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseGiftCardAction {
    buyer: String,
    amount: String,
    token: String,
    signed_transaction: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedeemGiftCardAction {
    code: String,
    redeemer: String,
}

#[derive(Debug, Deserialize)]
struct BlinkIdAction {
    id: String,
}

#[derive(Debug, Deserialize)]
struct BlinkUpdateAction {
    id: String,
    #[serde(default)]
    data: Value,
}

fn parse_payload<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, PayError> {
    serde_json::from_value(data).map_err(|e| PayError::InvalidInput(format!("bad payload: {e}")))
}

fn envelope(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `GET /health` — liveness probe.
pub async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /action` — routes a tagged request to its handler.
///
/// # Errors
///
/// Returns 400 for validation and state errors (including unknown action
/// tags), 500 for ledger or internal failures. Every error is mapped into
/// the `{success, error}` envelope.
pub async fn post_action(
    State(state): State<DispatcherState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<Value>, ActionError> {
    tracing::debug!(action = %request.action, "dispatching action");
    match request.action.as_str() {
        "createTransfer" => {
            let payload: TransferRequest = parse_payload(request.data)?;
            let transfer = state.transfers.build(&payload).await?;
            Ok(envelope(json!({
                "transaction": transfer.to_base64()?,
                "blockhash": transfer.recent_blockhash.to_string(),
                "lastValidBlockHeight": transfer.last_valid_block_height,
            })))
        }
        "createPaymentRequest" => {
            let payload: CreatePaymentRequest = parse_payload(request.data)?;
            let created = state.payments.create(payload).await?;
            Ok(envelope(serde_json::to_value(&created).map_err(|e| {
                PayError::Transaction(format!("response encoding failed: {e}"))
            })?))
        }
        "verifyPayment" => {
            let payload: VerifyPaymentAction = parse_payload(request.data)?;
            let status = state.payments.verify(&payload.transaction_id).await?;
            Ok(envelope(json!({
                "transactionId": payload.transaction_id,
                "status": status,
            })))
        }
        "prepareGiftCardPurchase" => {
            let payload: PrepareGiftCardAction = parse_payload(request.data)?;
            let transfer = state
                .giftcards
                .prepare_purchase(&payload.buyer, &payload.amount, &payload.token)
                .await?;
            Ok(envelope(json!({
                "transaction": transfer.to_base64()?,
                "escrow": state.giftcards.escrow_address().to_string(),
                "blockhash": transfer.recent_blockhash.to_string(),
                "lastValidBlockHeight": transfer.last_valid_block_height,
            })))
        }
        "purchaseGiftCard" => {
            let payload: PurchaseGiftCardAction = parse_payload(request.data)?;
            // Make sure the payload decodes before touching balances.
            transaction_from_base64(&payload.signed_transaction)?;
            let receipt = state
                .giftcards
                .purchase_signed(
                    &payload.buyer,
                    &payload.amount,
                    &payload.token,
                    &payload.signed_transaction,
                )
                .await?;
            Ok(envelope(serde_json::to_value(&receipt).map_err(|e| {
                PayError::Transaction(format!("response encoding failed: {e}"))
            })?))
        }
        "redeemGiftCard" => {
            let payload: RedeemGiftCardAction = parse_payload(request.data)?;
            let receipt = state.giftcards.redeem(&payload.code, &payload.redeemer).await?;
            Ok(envelope(serde_json::to_value(&receipt).map_err(|e| {
                PayError::Transaction(format!("response encoding failed: {e}"))
            })?))
        }
        "createBlink" => {
            let blink = state.blinks.create(request.data);
            Ok(envelope(json!(blink)))
        }
        "getBlink" => {
            let payload: BlinkIdAction = parse_payload(request.data)?;
            let blink = state
                .blinks
                .get(&payload.id)
                .ok_or_else(|| PayError::InvalidInput(format!("unknown blink: {}", payload.id)))?;
            Ok(envelope(json!(blink)))
        }
        "listBlinks" => Ok(envelope(json!(state.blinks.list()))),
        "updateBlink" => {
            let payload: BlinkUpdateAction = parse_payload(request.data)?;
            let blink = state
                .blinks
                .update(&payload.id, payload.data)
                .ok_or_else(|| PayError::InvalidInput(format!("unknown blink: {}", payload.id)))?;
            Ok(envelope(json!(blink)))
        }
        "deleteBlink" => {
            let payload: BlinkIdAction = parse_payload(request.data)?;
            if !state.blinks.delete(&payload.id) {
                return Err(PayError::InvalidInput(format!("unknown blink: {}", payload.id)).into());
            }
            Ok(envelope(json!({ "deleted": payload.id })))
        }
        other => Err(PayError::UnsupportedAction(other.to_owned()).into()),
    }
}

/// Builds the dispatcher router.
pub fn dispatcher_router(state: DispatcherState) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(get_health))
        .route("/action", axum::routing::post(post_action))
        .with_state(state)
}
