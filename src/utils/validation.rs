//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(amount: &BigDecimal) -> ChainResult<()> {
    if *amount <= BigDecimal::from(0) {
        return Err(ChainError::InvalidAmount);
    }
    Ok(())
}

/// Validate that a string has the shape of a wallet address: 10 lowercase
/// hex characters
pub fn validate_address_format(address: &str) -> ChainResult<()> {
    let well_formed = address.len() == 10
        && address
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if !well_formed {
        return Err(ChainError::Validation(format!(
            "'{address}' is not a valid wallet address"
        )));
    }
    Ok(())
}

/// Validate a transfer memo: bounded and non-empty
pub fn validate_memo(memo: &str) -> ChainResult<()> {
    if memo.trim().is_empty() {
        return Err(ChainError::Validation("memo cannot be empty".to_string()));
    }
    if memo.len() > MAX_MEMO_LEN {
        return Err(ChainError::Validation(format!(
            "memo cannot exceed {MAX_MEMO_LEN} characters"
        )));
    }
    Ok(())
}

/// Strict transfer validator: well-formed addresses and a non-empty memo
pub struct StrictTransferValidator;

impl TransferValidator for StrictTransferValidator {
    fn validate_transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: &BigDecimal,
        memo: &str,
    ) -> ChainResult<()> {
        validate_address_format(sender)?;
        validate_address_format(receiver)?;
        validate_positive_amount(amount)?;
        validate_memo(memo)
    }
}

/// Strict contract validator: referenced addresses well-formed, notes
/// non-empty on `Other` terms
pub struct StrictContractValidator;

impl ContractValidator for StrictContractValidator {
    fn validate_terms(&self, terms: &ContractTerms) -> ChainResult<()> {
        match terms {
            ContractTerms::Funding {
                target, receiver, ..
            } => {
                validate_address_format(target)?;
                validate_address_format(receiver)
            }
            ContractTerms::Transaction {
                from, to, receiver, ..
            } => {
                validate_address_format(from)?;
                validate_address_format(to)?;
                validate_address_format(receiver)
            }
            ContractTerms::Other { notes } => {
                if notes.trim().is_empty() {
                    return Err(ChainError::Validation(
                        "contract notes cannot be empty".to_string(),
                    ));
                }
                if notes.len() > MAX_MEMO_LEN {
                    return Err(ChainError::Validation(format!(
                        "contract notes cannot exceed {MAX_MEMO_LEN} characters"
                    )));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_format_checks_length_and_alphabet() {
        validate_address_format("ab01cd23ef").unwrap();
        assert!(validate_address_format("AB01CD23EF").is_err());
        assert!(validate_address_format("ab01cd23e").is_err());
        assert!(validate_address_format("ab01cd23ez").is_err());
    }

    #[test]
    fn strict_validator_rejects_empty_memo() {
        let validator = StrictTransferValidator;
        let err = validator
            .validate_transfer("ab01cd23ef", "ff01cd23ef", &BigDecimal::from(1), "  ")
            .unwrap_err();
        assert!(matches!(err, ChainError::Validation(_)));
    }
}
