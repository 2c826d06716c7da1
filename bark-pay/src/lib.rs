#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Payment construction and verification for the BARK token ecosystem.
//!
//! This crate implements the transfer-building and payment-tracking core of
//! the BARK dApp suite. It assembles unsigned native and SPL token transfers,
//! issues QR-encodable payment requests with a bounded validity window,
//! tracks their resolution against the ledger, and manages escrow-backed
//! gift cards.
//!
//! The crate never holds private keys and never talks to a hard-wired RPC
//! endpoint. Both collaborators are injected:
//!
//! - [`ledger::LedgerClient`] — the remote ledger (Solana RPC, or a fake in
//!   tests), enabled concretely via the `rpc` feature.
//! - [`wallet::WalletSigner`] — a connected wallet that signs transactions
//!   client-side.
//!
//! # Modules
//!
//! - [`registry`] - Static token descriptors (symbol, mint, decimals)
//! - [`amount`] - Human-readable decimal amount conversion
//! - [`transfer`] - Unsigned transfer construction with ATA provisioning
//! - [`request`] - Payment request issuance, URI and QR encoding
//! - [`verify`] - Payment status resolution and expiry enforcement
//! - [`giftcard`] - Escrow-backed, single-use gift cards
//! - [`ledger`] / [`wallet`] - External collaborator seams
//!
//! # Feature Flags
//!
//! - `rpc` - RPC-backed [`ledger::rpc::RpcLedger`] implementation
//! - `telemetry` - Tracing instrumentation
//! - `test-util` - Exposes the in-memory mock ledger for downstream tests

pub mod amount;
pub mod error;
pub mod giftcard;
pub mod ledger;
pub mod qr;
pub mod registry;
pub mod request;
pub mod timestamp;
pub mod transfer;
pub mod uri;
pub mod verify;
pub mod wallet;

pub use error::PayError;
pub use registry::{TokenDescriptor, TokenRegistry};
pub use request::{CreatePaymentRequest, CreatedPaymentRequest, PaymentRequest, PaymentRequestService};
pub use transfer::{TransferBuilder, TransferRequest, UnsignedTransfer};
pub use verify::PaymentStatus;
