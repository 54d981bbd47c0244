//! Wallet registry, address allocation, and credential recovery

use bigdecimal::BigDecimal;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::info;

use crate::types::*;

const ADDRESS_BYTES: usize = 5;
const PHRASE_WORDS: usize = 12;

/// Word pool for recovery phrases
const PHRASE_WORDLIST: &[&str] = &[
    "after", "air", "always", "angry", "apple", "bad", "ball", "banana", "bed", "before", "big",
    "bird", "book", "car", "cat", "choices", "close", "cold", "cry", "day", "dog", "drink",
    "early", "earth", "eat", "excuse", "family", "fast", "feel", "fire", "first", "fish", "food",
    "friend", "good", "goodbye", "happy", "hat", "hate", "hear", "hello", "help", "here", "hot",
    "house", "hungry", "jump", "last", "late", "laugh", "learn", "love", "luck", "maybe", "month",
    "moon", "never", "new", "next", "night", "no", "now", "old", "open", "options", "play",
    "please", "run", "sad", "see", "sit", "sleep", "slow", "small", "smile", "soon", "sorry",
    "stand", "star", "start", "stop", "sun", "talk", "thank", "then", "there", "thirsty", "time",
    "tired", "touch", "tree", "walk", "water", "week", "welcome", "work", "year", "yes", "you",
    "young",
];

/// Registry owning all wallet records and balances. Mutated only through
/// the chain's transaction processor and contract engine.
#[derive(Debug, Clone, Default)]
pub struct WalletRegistry {
    wallets: HashMap<String, Wallet>,
}

impl WalletRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            wallets: HashMap::new(),
        }
    }

    /// Register a new wallet with a freshly allocated address. Retries
    /// address generation a bounded number of times before failing with
    /// `AddressExhausted`.
    pub fn create(
        &mut self,
        starting_balance: BigDecimal,
        credential: Option<String>,
        attempts: u32,
    ) -> ChainResult<String> {
        if starting_balance < BigDecimal::from(0) {
            return Err(ChainError::InvalidAmount);
        }

        let mut rng = rand::thread_rng();
        for _ in 0..attempts {
            let address = random_address(&mut rng);
            if self.wallets.contains_key(&address) {
                continue;
            }
            let phrase = random_phrase(&mut rng);
            let wallet = Wallet::new(
                address.clone(),
                credential.clone(),
                phrase,
                starting_balance.clone(),
            );
            self.wallets.insert(address.clone(), wallet);
            info!(address = %address, "wallet created");
            return Ok(address);
        }
        Err(ChainError::AddressExhausted)
    }

    /// Whether a wallet with the given address exists
    pub fn contains(&self, address: &str) -> bool {
        self.wallets.contains_key(address)
    }

    /// Look up a wallet without raising on absence
    pub fn lookup(&self, address: &str) -> Option<&Wallet> {
        self.wallets.get(address)
    }

    /// Get a wallet, failing with `UnknownAccount` if absent
    pub fn get(&self, address: &str) -> ChainResult<&Wallet> {
        self.wallets
            .get(address)
            .ok_or_else(|| ChainError::UnknownAccount(address.to_string()))
    }

    /// Get a wallet mutably, failing with `UnknownAccount` if absent
    pub fn get_mut(&mut self, address: &str) -> ChainResult<&mut Wallet> {
        self.wallets
            .get_mut(address)
            .ok_or_else(|| ChainError::UnknownAccount(address.to_string()))
    }

    /// Remove a wallet from the registry. Subsequent operations referencing
    /// the address fail with `UnknownAccount`.
    pub fn remove(&mut self, address: &str) -> ChainResult<Wallet> {
        let wallet = self
            .wallets
            .remove(address)
            .ok_or_else(|| ChainError::UnknownAccount(address.to_string()))?;
        info!(address = %address, "wallet deleted");
        Ok(wallet)
    }

    /// Check a credential against the one stored for the wallet
    pub fn verify_credential(&self, address: &str, credential: &str) -> ChainResult<bool> {
        let wallet = self.get(address)?;
        Ok(wallet.credential.as_deref() == Some(credential))
    }

    /// Replace the wallet's credential
    pub fn change_credential(
        &mut self,
        address: &str,
        credential: Option<String>,
    ) -> ChainResult<()> {
        let wallet = self.get_mut(address)?;
        wallet.credential = credential;
        Ok(())
    }

    /// Reset a lost credential after checking the recovery phrase
    pub fn recover(
        &mut self,
        address: &str,
        phrase: &str,
        new_credential: Option<String>,
    ) -> ChainResult<()> {
        let wallet = self.get_mut(address)?;
        if wallet.recovery_phrase != phrase {
            return Err(ChainError::Validation(
                "recovery phrase does not match".to_string(),
            ));
        }
        wallet.credential = new_credential;
        info!(address = %address, "wallet credential recovered");
        Ok(())
    }

    /// Iterate over all wallets in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Wallet> {
        self.wallets.values()
    }

    /// Number of registered wallets
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    /// Whether the registry holds no wallets
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Sum of all wallet balances
    pub fn total_balance(&self) -> BigDecimal {
        self.wallets.values().map(|wallet| &wallet.balance).sum()
    }
}

fn random_address(rng: &mut impl Rng) -> String {
    let mut bytes = [0u8; ADDRESS_BYTES];
    rng.fill(&mut bytes[..]);
    hex::encode(bytes)
}

fn random_phrase(rng: &mut impl Rng) -> String {
    let words: Vec<&str> = (0..PHRASE_WORDS)
        .filter_map(|_| PHRASE_WORDLIST.choose(rng).copied())
        .collect();
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_allocates_hex_address_and_opening_balance() {
        let mut registry = WalletRegistry::new();
        let address = registry
            .create(BigDecimal::from(100), None, 5)
            .unwrap();

        assert_eq!(address.len(), ADDRESS_BYTES * 2);
        assert!(address.chars().all(|c| c.is_ascii_hexdigit()));

        let wallet = registry.get(&address).unwrap();
        assert_eq!(wallet.balance, BigDecimal::from(100));
        assert_eq!(wallet.recovery_phrase.split(' ').count(), PHRASE_WORDS);
    }

    #[test]
    fn create_rejects_negative_opening_balance() {
        let mut registry = WalletRegistry::new();
        let err = registry
            .create(BigDecimal::from(-1), None, 5)
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidAmount));
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_address_fails_lookup() {
        let registry = WalletRegistry::new();
        let err = registry.get("ffffffffff").unwrap_err();
        assert!(matches!(err, ChainError::UnknownAccount(_)));
        assert!(registry.lookup("ffffffffff").is_none());
    }

    #[test]
    fn recover_requires_matching_phrase() {
        let mut registry = WalletRegistry::new();
        let address = registry
            .create(BigDecimal::from(100), Some("old".to_string()), 5)
            .unwrap();

        let err = registry
            .recover(&address, "wrong phrase", Some("new".to_string()))
            .unwrap_err();
        assert!(matches!(err, ChainError::Validation(_)));
        assert!(registry.verify_credential(&address, "old").unwrap());

        let phrase = registry.get(&address).unwrap().recovery_phrase.clone();
        registry
            .recover(&address, &phrase, Some("new".to_string()))
            .unwrap();
        assert!(registry.verify_credential(&address, "new").unwrap());
    }

    #[test]
    fn removed_wallet_is_no_longer_eligible() {
        let mut registry = WalletRegistry::new();
        let address = registry.create(BigDecimal::from(100), None, 5).unwrap();
        registry.remove(&address).unwrap();
        assert!(matches!(
            registry.get(&address),
            Err(ChainError::UnknownAccount(_))
        ));
    }

    #[test]
    fn total_balance_sums_all_wallets() {
        let mut registry = WalletRegistry::new();
        registry.create(BigDecimal::from(100), None, 5).unwrap();
        registry.create(BigDecimal::from(50), None, 5).unwrap();
        assert_eq!(registry.total_balance(), BigDecimal::from(150));
    }
}
