//! Transfer precondition pipeline and atomic balance application

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::ledger::wallet::WalletRegistry;
use crate::types::*;

/// Check the fixed transfer preconditions in order; the first violation
/// wins: sender exists, receiver exists, sender differs from receiver,
/// amount is positive, sender balance covers the amount.
pub(crate) fn check_preconditions(
    registry: &WalletRegistry,
    sender: &str,
    receiver: &str,
    amount: &BigDecimal,
) -> ChainResult<()> {
    if !registry.contains(sender) {
        return Err(ChainError::UnknownAccount(sender.to_string()));
    }
    if !registry.contains(receiver) {
        return Err(ChainError::UnknownAccount(receiver.to_string()));
    }
    if sender == receiver {
        return Err(ChainError::SameAccount);
    }
    if *amount <= BigDecimal::from(0) {
        return Err(ChainError::InvalidAmount);
    }
    if !registry.get(sender)?.can_cover(amount) {
        let wallet = registry.get(sender)?;
        return Err(ChainError::InsufficientBalance {
            address: sender.to_string(),
            available: wallet.balance.clone(),
            required: amount.clone(),
        });
    }
    Ok(())
}

/// Validate a user transfer and apply it atomically to both balances.
/// On any precondition failure neither balance changes.
pub(crate) fn prepare_and_apply(
    registry: &mut WalletRegistry,
    sender: &str,
    receiver: &str,
    amount: &BigDecimal,
    memo: &str,
) -> ChainResult<TransferRecord> {
    check_preconditions(registry, sender, receiver, amount)?;

    // All preconditions hold; debit and credit cannot fail past this point
    registry.get_mut(sender)?.deduct(amount)?;
    registry.get_mut(receiver)?.credit(amount);

    debug!(sender = %sender, receiver = %receiver, amount = %amount, "transfer applied");

    Ok(TransferRecord::new(
        sender.to_string(),
        receiver.to_string(),
        amount.clone(),
        memo.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_two_wallets() -> (WalletRegistry, String, String) {
        let mut registry = WalletRegistry::new();
        let a = registry.create(BigDecimal::from(100), None, 5).unwrap();
        let b = registry.create(BigDecimal::from(100), None, 5).unwrap();
        (registry, a, b)
    }

    #[test]
    fn applies_debit_and_credit_atomically() {
        let (mut registry, a, b) = registry_with_two_wallets();
        let record =
            prepare_and_apply(&mut registry, &a, &b, &BigDecimal::from(30), "x").unwrap();

        assert_eq!(registry.get(&a).unwrap().balance, BigDecimal::from(70));
        assert_eq!(registry.get(&b).unwrap().balance, BigDecimal::from(130));
        assert_eq!(record.sender, a);
        assert_eq!(record.receiver, b);
        assert_eq!(record.amount, BigDecimal::from(30));
    }

    #[test]
    fn first_precondition_violation_wins() {
        let (mut registry, a, b) = registry_with_two_wallets();

        // Unknown sender reported before anything else, even with a bad amount
        let err = prepare_and_apply(&mut registry, "ffffffffff", &b, &BigDecimal::from(0), "x")
            .unwrap_err();
        assert!(matches!(err, ChainError::UnknownAccount(addr) if addr == "ffffffffff"));

        // Same account reported before the amount check
        let err =
            prepare_and_apply(&mut registry, &a, &a, &BigDecimal::from(0), "x").unwrap_err();
        assert!(matches!(err, ChainError::SameAccount));

        // Amount check before the balance check
        let err =
            prepare_and_apply(&mut registry, &a, &b, &BigDecimal::from(0), "x").unwrap_err();
        assert!(matches!(err, ChainError::InvalidAmount));
    }

    #[test]
    fn failed_transfer_leaves_balances_untouched() {
        let (mut registry, a, b) = registry_with_two_wallets();

        let err =
            prepare_and_apply(&mut registry, &a, &b, &BigDecimal::from(101), "x").unwrap_err();
        assert!(matches!(err, ChainError::InsufficientBalance { .. }));
        assert_eq!(registry.get(&a).unwrap().balance, BigDecimal::from(100));
        assert_eq!(registry.get(&b).unwrap().balance, BigDecimal::from(100));
    }

    #[test]
    fn balances_are_conserved() {
        let (mut registry, a, b) = registry_with_two_wallets();
        let before = registry.total_balance();
        prepare_and_apply(&mut registry, &a, &b, &BigDecimal::from(42), "x").unwrap();
        assert_eq!(registry.total_balance(), before);
    }
}
