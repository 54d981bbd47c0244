//! Core types and data structures for the chain ledger system

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A wallet registered on the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique wallet address (5 random bytes, lowercase hex)
    pub address: String,
    /// Current balance; never negative
    pub balance: BigDecimal,
    /// Optional credential set by the wallet owner
    pub credential: Option<String>,
    /// 12-word recovery phrase used to reset a lost credential
    pub recovery_phrase: String,
    /// When the wallet was created
    pub created_at: NaiveDateTime,
}

impl Wallet {
    /// Create a new wallet with an opening balance
    pub fn new(
        address: String,
        credential: Option<String>,
        recovery_phrase: String,
        starting_balance: BigDecimal,
    ) -> Self {
        Self {
            address,
            balance: starting_balance,
            credential,
            recovery_phrase,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Add an amount to the wallet balance
    pub fn credit(&mut self, amount: &BigDecimal) {
        self.balance += amount;
    }

    /// Remove an amount from the wallet balance, refusing to go negative
    pub fn deduct(&mut self, amount: &BigDecimal) -> ChainResult<()> {
        if self.balance < *amount {
            return Err(ChainError::InsufficientBalance {
                address: self.address.clone(),
                available: self.balance.clone(),
                required: amount.clone(),
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Whether the wallet can cover the given amount
    pub fn can_cover(&self, amount: &BigDecimal) -> bool {
        self.balance >= *amount
    }
}

/// A single value transfer between two wallets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub sender: String,
    pub receiver: String,
    pub amount: BigDecimal,
    pub memo: String,
    pub timestamp: NaiveDateTime,
}

impl TransferRecord {
    /// Create a new transfer record timestamped now
    pub fn new(sender: String, receiver: String, amount: BigDecimal, memo: String) -> Self {
        Self {
            sender,
            receiver,
            amount,
            memo,
            timestamp: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Whether a wallet sent or received a given transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

/// The event recorded inside a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockRecord {
    /// A user-initiated transfer between two wallets
    Transfer(TransferRecord),
    /// A transfer executed by the contract engine on behalf of a signer
    ContractTransfer {
        contract: String,
        transfer: TransferRecord,
    },
    /// A wallet consenting to a contract
    ContractSigned {
        contract: String,
        signer: String,
        signed_at: NaiveDateTime,
    },
}

impl BlockRecord {
    /// The transfer carried by this record, if any (user or contract-executed)
    pub fn transfer_details(&self) -> Option<&TransferRecord> {
        match self {
            BlockRecord::Transfer(transfer)
            | BlockRecord::ContractTransfer { transfer, .. } => Some(transfer),
            BlockRecord::ContractSigned { .. } => None,
        }
    }

    /// The transfer carried by this record, only if user-initiated
    pub fn user_transfer(&self) -> Option<&TransferRecord> {
        match self {
            BlockRecord::Transfer(transfer) => Some(transfer),
            _ => None,
        }
    }
}

/// One immutable entry of the hash-linked ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain; genesis is 0
    pub index: u64,
    /// When the block was appended
    pub timestamp: NaiveDateTime,
    /// Payload label, e.g. `"Block 3"`
    pub payload: String,
    /// Content hash of the preceding block; `"0"` for genesis
    pub previous_hash: String,
    /// The event this block records; `None` only for genesis
    pub record: Option<BlockRecord>,
    /// SHA-256 content hash over (timestamp, payload, previous hash, record)
    pub hash: String,
}

/// Contract classification determining how the engine evaluates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    /// Fires once when a watched wallet reaches a funding goal
    Funding,
    /// Fires whenever the latest ledger transfer matches a pattern
    Transaction,
    /// Never auto-evaluated; inspected manually only
    Other,
}

/// Typed, named-field conditions per contract kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContractTerms {
    /// When wallet `target` reaches `goal`, every signer sends `individual`
    /// to `receiver`. Fires exactly once.
    Funding {
        target: String,
        goal: BigDecimal,
        individual: BigDecimal,
        receiver: String,
    },
    /// When `from` transfers at least `threshold` to `to`, every signer
    /// sends `individual` to `receiver`. May fire repeatedly.
    Transaction {
        from: String,
        to: String,
        threshold: BigDecimal,
        individual: BigDecimal,
        receiver: String,
    },
    /// Free-form conditions, checked manually outside the engine
    Other { notes: String },
}

impl ContractTerms {
    /// The kind these terms belong to
    pub fn kind(&self) -> ContractKind {
        match self {
            ContractTerms::Funding { .. } => ContractKind::Funding,
            ContractTerms::Transaction { .. } => ContractKind::Transaction,
            ContractTerms::Other { .. } => ContractKind::Other,
        }
    }

    /// Whether the engine evaluates these terms automatically
    pub fn is_auto_evaluated(&self) -> bool {
        !matches!(self, ContractTerms::Other { .. })
    }
}

/// Lifecycle state of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    /// Created, no signer yet
    Draft,
    /// At least one signer; eligible for evaluation
    Active,
    /// Funding contract that has fired; terminal
    Executed,
    /// Deleted by consent or administratively; terminal
    Deleted,
}

impl ContractStatus {
    /// Terminal states accept no further mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractStatus::Executed | ContractStatus::Deleted)
    }
}

/// A named rule bound to consenting wallets, auto-evaluated after every
/// ledger mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique name, `"SC"` followed by 5 random bytes in hex
    pub name: String,
    /// Wallet that created the contract
    pub creator: String,
    /// Typed trigger conditions and action parameters
    pub terms: ContractTerms,
    /// Wallets that have consented, in signing order; no duplicates
    pub signers: Vec<String>,
    /// Lifecycle state
    pub status: ContractStatus,
    /// When the contract was created
    pub created_at: NaiveDateTime,
}

impl Contract {
    /// Create a new contract in `Draft` state with no signers
    pub fn new(name: String, creator: String, terms: ContractTerms) -> Self {
        Self {
            name,
            creator,
            terms,
            signers: Vec::new(),
            status: ContractStatus::Draft,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Whether the given wallet has already signed
    pub fn has_signed(&self, address: &str) -> bool {
        self.signers.iter().any(|signer| signer == address)
    }

    /// The kind of this contract
    pub fn kind(&self) -> ContractKind {
        self.terms.kind()
    }
}

/// Tuning knobs for a chain session
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Opening balance for wallets created without an explicit amount
    pub starting_balance: BigDecimal,
    /// Bounded retries when allocating a fresh wallet address
    pub address_attempts: u32,
    /// Bounded retries when allocating a fresh contract name
    pub contract_name_attempts: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            starting_balance: BigDecimal::from(100),
            address_attempts: 5,
            contract_name_attempts: 5,
        }
    }
}

/// Errors that can occur in the chain ledger system
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("transfer amount must be positive")]
    InvalidAmount,
    #[error("sender and receiver must be different wallets")]
    SameAccount,
    #[error("wallet not found: {0}")]
    UnknownAccount(String),
    #[error("contract not found: {0}")]
    UnknownContract(String),
    #[error("insufficient balance in wallet {address}: available {available}, required {required}")]
    InsufficientBalance {
        address: String,
        available: BigDecimal,
        required: BigDecimal,
    },
    #[error("contract can only be deleted with the consent of all signers")]
    RequiresUnanimousConsent,
    #[error("wallet {0} has already signed this contract")]
    DuplicateSigner(String),
    #[error("contract {0} is no longer active")]
    ContractNotActive(String),
    #[error("could not allocate an unused wallet address")]
    AddressExhausted,
    #[error("could not allocate an unused contract name")]
    ContractNameExhausted,
    #[error("validation error: {0}")]
    Validation(String),
}

impl ChainError {
    /// Coarse classification of the error
    pub fn class(&self) -> ErrorClass {
        match self {
            ChainError::InvalidAmount | ChainError::SameAccount | ChainError::Validation(_) => {
                ErrorClass::Validation
            }
            ChainError::UnknownAccount(_) | ChainError::UnknownContract(_) => ErrorClass::NotFound,
            ChainError::InsufficientBalance { .. }
            | ChainError::RequiresUnanimousConsent
            | ChainError::DuplicateSigner(_)
            | ChainError::ContractNotActive(_) => ErrorClass::State,
            ChainError::AddressExhausted | ChainError::ContractNameExhausted => {
                ErrorClass::Resource
            }
        }
    }
}

/// Failure taxonomy for [`ChainError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    State,
    Resource,
}

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduct_refuses_to_go_negative() {
        let mut wallet = Wallet::new(
            "ab01cd23ef".to_string(),
            None,
            "word ".repeat(12).trim().to_string(),
            BigDecimal::from(10),
        );

        let err = wallet.deduct(&BigDecimal::from(11)).unwrap_err();
        assert!(matches!(err, ChainError::InsufficientBalance { .. }));
        assert_eq!(wallet.balance, BigDecimal::from(10));

        wallet.deduct(&BigDecimal::from(10)).unwrap();
        assert_eq!(wallet.balance, BigDecimal::from(0));
    }

    #[test]
    fn record_accessors_distinguish_user_and_contract_transfers() {
        let transfer = TransferRecord::new(
            "aaaaaaaaaa".to_string(),
            "bbbbbbbbbb".to_string(),
            BigDecimal::from(5),
            "x".to_string(),
        );

        let user = BlockRecord::Transfer(transfer.clone());
        assert!(user.user_transfer().is_some());
        assert!(user.transfer_details().is_some());

        let by_contract = BlockRecord::ContractTransfer {
            contract: "SCab01cd23ef".to_string(),
            transfer,
        };
        assert!(by_contract.user_transfer().is_none());
        assert!(by_contract.transfer_details().is_some());

        let signed = BlockRecord::ContractSigned {
            contract: "SCab01cd23ef".to_string(),
            signer: "aaaaaaaaaa".to_string(),
            signed_at: chrono::Utc::now().naive_utc(),
        };
        assert!(signed.transfer_details().is_none());
    }

    #[test]
    fn contract_status_terminality() {
        assert!(!ContractStatus::Draft.is_terminal());
        assert!(!ContractStatus::Active.is_terminal());
        assert!(ContractStatus::Executed.is_terminal());
        assert!(ContractStatus::Deleted.is_terminal());
    }

    #[test]
    fn error_classes_follow_taxonomy() {
        assert_eq!(ChainError::InvalidAmount.class(), ErrorClass::Validation);
        assert_eq!(
            ChainError::UnknownAccount("ab".into()).class(),
            ErrorClass::NotFound
        );
        assert_eq!(
            ChainError::RequiresUnanimousConsent.class(),
            ErrorClass::State
        );
        assert_eq!(ChainError::AddressExhausted.class(), ErrorClass::Resource);
    }
}
