//! Validator seams for transfer and contract admission
//!
//! The core precondition pipeline (existence, distinctness, positivity,
//! coverage) is fixed; these traits let callers layer additional admission
//! rules on top without touching it.

use bigdecimal::BigDecimal;

use crate::types::*;

/// Maximum memo length accepted by the default validator
pub const MAX_MEMO_LEN: usize = 500;

/// Admission rules applied to a transfer before the precondition pipeline
pub trait TransferValidator: Send + Sync {
    /// Validate a transfer request before it touches any balance
    fn validate_transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: &BigDecimal,
        memo: &str,
    ) -> ChainResult<()>;
}

/// Admission rules applied to contract terms before a contract is created
pub trait ContractValidator: Send + Sync {
    /// Validate contract terms before admission
    fn validate_terms(&self, terms: &ContractTerms) -> ChainResult<()>;
}

/// Default transfer validator: bounds the memo length
pub struct DefaultTransferValidator;

impl TransferValidator for DefaultTransferValidator {
    fn validate_transfer(
        &self,
        _sender: &str,
        _receiver: &str,
        _amount: &BigDecimal,
        memo: &str,
    ) -> ChainResult<()> {
        if memo.len() > MAX_MEMO_LEN {
            return Err(ChainError::Validation(format!(
                "memo cannot exceed {MAX_MEMO_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Default contract validator: bounds free-form notes on `Other` terms
pub struct DefaultContractValidator;

impl ContractValidator for DefaultContractValidator {
    fn validate_terms(&self, terms: &ContractTerms) -> ChainResult<()> {
        if let ContractTerms::Other { notes } = terms {
            if notes.len() > MAX_MEMO_LEN {
                return Err(ChainError::Validation(format!(
                    "contract notes cannot exceed {MAX_MEMO_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validator_bounds_memo_length() {
        let validator = DefaultTransferValidator;
        let long_memo = "m".repeat(MAX_MEMO_LEN + 1);
        let err = validator
            .validate_transfer("a", "b", &BigDecimal::from(1), &long_memo)
            .unwrap_err();
        assert!(matches!(err, ChainError::Validation(_)));

        validator
            .validate_transfer("a", "b", &BigDecimal::from(1), "short memo")
            .unwrap();
    }
}
