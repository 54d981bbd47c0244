//! Ledger module containing block storage, the wallet registry, and the
//! chain session object

pub mod block;
pub mod core;
pub(crate) mod transfer;
pub mod wallet;

pub use block::*;
pub use core::*;
pub use wallet::*;
