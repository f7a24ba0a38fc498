//! Foundation types for the Cellkom Installment Ledger (CIL).
//!
//! This crate provides the monetary, identity, and classification types used
//! throughout the CIL system. Every other CIL crate depends on `cil-types`.
//!
//! # Key Types
//!
//! - [`Amount`] — Whole-rupiah monetary amount with checked bookkeeping ops
//! - [`TransactionId`] — Opaque identifier of the originating transaction
//! - [`PaymentId`] — UUID v7 payment identifier (time-ordered)
//! - [`DebtKind`] — Origin classification of a tracked debt

pub mod amount;
pub mod id;
pub mod kind;

pub use amount::Amount;
pub use id::{PaymentId, TransactionId};
pub use kind::DebtKind;
