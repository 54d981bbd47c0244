//! Contract table: naming, storage, and terms admission checks

use bigdecimal::BigDecimal;
use rand::Rng;
use std::collections::BTreeMap;

use crate::ledger::wallet::WalletRegistry;
use crate::types::*;

const NAME_PREFIX: &str = "SC";
const NAME_BYTES: usize = 5;

impl ContractTerms {
    /// Check that the terms refer to existing wallets and carry a positive
    /// per-signer amount. `Other` terms are free-form and never checked here.
    pub fn validate(&self, registry: &WalletRegistry) -> ChainResult<()> {
        match self {
            ContractTerms::Funding {
                target,
                individual,
                receiver,
                ..
            } => {
                registry.get(target)?;
                registry.get(receiver)?;
                require_positive(individual)
            }
            ContractTerms::Transaction {
                from,
                to,
                individual,
                receiver,
                ..
            } => {
                registry.get(from)?;
                registry.get(to)?;
                registry.get(receiver)?;
                require_positive(individual)
            }
            ContractTerms::Other { .. } => Ok(()),
        }
    }
}

fn require_positive(amount: &BigDecimal) -> ChainResult<()> {
    if *amount <= BigDecimal::from(0) {
        return Err(ChainError::InvalidAmount);
    }
    Ok(())
}

/// Table owning all contracts, keyed by name. Iteration order is the name
/// order, which keeps evaluation passes deterministic.
#[derive(Debug, Clone, Default)]
pub struct ContractTable {
    contracts: BTreeMap<String, Contract>,
}

impl ContractTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            contracts: BTreeMap::new(),
        }
    }

    /// Generate an unused contract name, retrying a bounded number of times
    /// before failing with `ContractNameExhausted`
    pub(crate) fn allocate_name(&self, attempts: u32) -> ChainResult<String> {
        let mut rng = rand::thread_rng();
        for _ in 0..attempts {
            let mut bytes = [0u8; NAME_BYTES];
            rng.fill(&mut bytes[..]);
            let name = format!("{NAME_PREFIX}{}", hex::encode(bytes));
            if !self.contracts.contains_key(&name) {
                return Ok(name);
            }
        }
        Err(ChainError::ContractNameExhausted)
    }

    /// Store a contract under its name
    pub(crate) fn insert(&mut self, contract: Contract) {
        self.contracts.insert(contract.name.clone(), contract);
    }

    /// Look up a contract without raising on absence
    pub fn lookup(&self, name: &str) -> Option<&Contract> {
        self.contracts.get(name)
    }

    /// Get a contract, failing with `UnknownContract` if absent
    pub fn get(&self, name: &str) -> ChainResult<&Contract> {
        self.contracts
            .get(name)
            .ok_or_else(|| ChainError::UnknownContract(name.to_string()))
    }

    /// Get a contract mutably, failing with `UnknownContract` if absent
    pub(crate) fn get_mut(&mut self, name: &str) -> ChainResult<&mut Contract> {
        self.contracts
            .get_mut(name)
            .ok_or_else(|| ChainError::UnknownContract(name.to_string()))
    }

    /// Iterate over all contracts in name order
    pub fn iter(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.values()
    }

    /// Names of contracts the engine should consider: active and of an
    /// auto-evaluated kind
    pub(crate) fn active_auto_names(&self) -> Vec<String> {
        self.contracts
            .values()
            .filter(|contract| {
                contract.status == ContractStatus::Active && contract.terms.is_auto_evaluated()
            })
            .map(|contract| contract.name.clone())
            .collect()
    }

    /// Number of contracts ever created, terminal ones included
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether the table holds no contracts
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_names_carry_prefix() {
        let table = ContractTable::new();
        let name = table.allocate_name(5).unwrap();
        assert!(name.starts_with(NAME_PREFIX));
        assert_eq!(name.len(), NAME_PREFIX.len() + NAME_BYTES * 2);
    }

    #[test]
    fn terms_validation_requires_known_wallets() {
        let mut registry = WalletRegistry::new();
        let a = registry.create(BigDecimal::from(100), None, 5).unwrap();

        let terms = ContractTerms::Funding {
            target: a.clone(),
            goal: BigDecimal::from(150),
            individual: BigDecimal::from(10),
            receiver: "ffffffffff".to_string(),
        };
        assert!(matches!(
            terms.validate(&registry),
            Err(ChainError::UnknownAccount(_))
        ));

        let terms = ContractTerms::Funding {
            target: a.clone(),
            goal: BigDecimal::from(150),
            individual: BigDecimal::from(0),
            receiver: a.clone(),
        };
        assert!(matches!(
            terms.validate(&registry),
            Err(ChainError::InvalidAmount)
        ));

        let terms = ContractTerms::Other {
            notes: "manual review".to_string(),
        };
        assert!(terms.validate(&registry).is_ok());
    }

    #[test]
    fn only_active_auto_contracts_are_evaluated() {
        let mut table = ContractTable::new();

        let mut funding = Contract::new(
            "SC01".to_string(),
            "creator".to_string(),
            ContractTerms::Funding {
                target: "t".to_string(),
                goal: BigDecimal::from(1),
                individual: BigDecimal::from(1),
                receiver: "r".to_string(),
            },
        );
        funding.status = ContractStatus::Active;
        table.insert(funding);

        let mut other = Contract::new(
            "SC02".to_string(),
            "creator".to_string(),
            ContractTerms::Other {
                notes: "manual".to_string(),
            },
        );
        other.status = ContractStatus::Active;
        table.insert(other);

        table.insert(Contract::new(
            "SC03".to_string(),
            "creator".to_string(),
            ContractTerms::Funding {
                target: "t".to_string(),
                goal: BigDecimal::from(1),
                individual: BigDecimal::from(1),
                receiver: "r".to_string(),
            },
        ));

        assert_eq!(table.active_auto_names(), vec!["SC01".to_string()]);
    }
}
