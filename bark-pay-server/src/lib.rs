//! BARK payments action dispatcher service.
//!
//! A single `POST /action` endpoint routes tagged requests (`createTransfer`,
//! `createPaymentRequest`, `verifyPayment`, `prepareGiftCardPurchase`,
//! `purchaseGiftCard`, `redeemGiftCard`, plus Blink record CRUD) to the
//! payment components in
//! [`bark_pay`], wrapping every outcome in a uniform
//! `{success, data | error}` envelope.
//!
//! # Modules
//!
//! - [`handlers`] — Axum route handlers and router builder
//! - [`blinks`] — Pass-through Blink record store
//! - [`error`] — HTTP error mapping
//! - [`config`] — Server configuration with environment variable expansion

pub mod blinks;
pub mod config;
pub mod error;
pub mod handlers;

pub use handlers::{AppState, DispatcherState, dispatcher_router};
