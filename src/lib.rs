//! # Chainledger Core
//!
//! A single-node wallet ledger with a tamper-evident, hash-linked block
//! chain and a rule-based contract execution engine.
//!
//! ## Features
//!
//! - **Hash-linked ledger**: append-only blocks, each carrying a SHA-256
//!   content hash chained to its predecessor
//! - **Wallet registry**: random hex addresses, non-negative balances,
//!   credential recovery via phrase
//! - **Atomic transfers**: ordered precondition checks, all-or-nothing
//!   balance application
//! - **Contracts**: funding and transaction rules with multi-party consent,
//!   evaluated deterministically after every ledger mutation
//! - **Derived views**: per-wallet history with balance reconstruction and
//!   a global transaction feed
//!
//! ## Quick Start
//!
//! ```rust
//! use chainledger_core::Chain;
//! use bigdecimal::BigDecimal;
//!
//! let mut chain = Chain::new();
//! let alice = chain.create_wallet().unwrap();
//! let bob = chain.create_wallet().unwrap();
//! chain.transfer(&alice, &bob, BigDecimal::from(30), "rent").unwrap();
//! assert_eq!(chain.balance(&alice).unwrap(), BigDecimal::from(70));
//! ```

pub mod contracts;
pub mod ledger;
pub mod query;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use contracts::*;
pub use ledger::*;
pub use query::*;
pub use traits::*;
pub use types::*;
