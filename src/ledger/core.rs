//! Chain session object coordinating wallets, blocks, and contracts
//!
//! `Chain` is the sole mutation entry point: every mutating operation takes
//! `&mut self`, which serialises writers by construction, and every
//! successful ledger append schedules one contract evaluation pass that
//! completes before the mutating call returns.

use bigdecimal::BigDecimal;
use tracing::info;

use crate::contracts::engine;
use crate::contracts::terms::ContractTable;
use crate::ledger::block::{BlockLedger, LedgerIntegrityReport};
use crate::ledger::transfer;
use crate::ledger::wallet::WalletRegistry;
use crate::traits::*;
use crate::types::*;

/// A single-node chain session owning the wallet registry, the block
/// ledger, and the contract table
pub struct Chain {
    pub(crate) config: ChainConfig,
    pub(crate) wallets: WalletRegistry,
    pub(crate) ledger: BlockLedger,
    pub(crate) contracts: ContractTable,
    transfer_validator: Box<dyn TransferValidator>,
    contract_validator: Box<dyn ContractValidator>,
    /// Evaluation passes scheduled by appends but not yet run
    pending_passes: usize,
    /// Guards against nested pass loops while a pass is executing
    evaluating: bool,
}

impl Chain {
    /// Create a chain session with default configuration
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    /// Create a chain session with the given configuration
    pub fn with_config(config: ChainConfig) -> Self {
        Self {
            config,
            wallets: WalletRegistry::new(),
            ledger: BlockLedger::new(),
            contracts: ContractTable::new(),
            transfer_validator: Box::new(DefaultTransferValidator),
            contract_validator: Box::new(DefaultContractValidator),
            pending_passes: 0,
            evaluating: false,
        }
    }

    /// Create a chain session with custom validators
    pub fn with_validators(
        config: ChainConfig,
        transfer_validator: Box<dyn TransferValidator>,
        contract_validator: Box<dyn ContractValidator>,
    ) -> Self {
        Self {
            transfer_validator,
            contract_validator,
            ..Self::with_config(config)
        }
    }

    // Wallet operations

    /// Create a wallet with the configured starting balance
    pub fn create_wallet(&mut self) -> ChainResult<String> {
        let starting_balance = self.config.starting_balance.clone();
        self.create_wallet_with_balance(starting_balance)
    }

    /// Create a wallet with an explicit opening balance
    pub fn create_wallet_with_balance(&mut self, initial: BigDecimal) -> ChainResult<String> {
        self.wallets
            .create(initial, None, self.config.address_attempts)
    }

    /// Create a wallet with an opening balance and a credential
    pub fn create_wallet_with_credential(
        &mut self,
        initial: BigDecimal,
        credential: Option<String>,
    ) -> ChainResult<String> {
        self.wallets
            .create(initial, credential, self.config.address_attempts)
    }

    /// Current balance of a wallet
    pub fn balance(&self, address: &str) -> ChainResult<BigDecimal> {
        Ok(self.wallets.get(address)?.balance.clone())
    }

    /// Full wallet record, recovery phrase included. Callers are expected
    /// to show the phrase to the owner once and not persist it elsewhere.
    pub fn wallet(&self, address: &str) -> ChainResult<&Wallet> {
        self.wallets.get(address)
    }

    /// Check a credential against the one stored for the wallet
    pub fn verify_credential(&self, address: &str, credential: &str) -> ChainResult<bool> {
        self.wallets.verify_credential(address, credential)
    }

    /// Replace a wallet's credential
    pub fn change_credential(
        &mut self,
        address: &str,
        credential: Option<String>,
    ) -> ChainResult<()> {
        self.wallets.change_credential(address, credential)
    }

    /// Reset a lost credential after checking the recovery phrase
    pub fn recover_wallet(
        &mut self,
        address: &str,
        phrase: &str,
        new_credential: Option<String>,
    ) -> ChainResult<()> {
        self.wallets.recover(address, phrase, new_credential)
    }

    /// Remove a wallet from the registry. The ledger keeps its history;
    /// future operations referencing the address fail with `UnknownAccount`
    /// and contracts treat it as a per-signer breach.
    pub fn delete_wallet(&mut self, address: &str) -> ChainResult<()> {
        self.wallets.remove(address)?;
        Ok(())
    }

    // Transfer operations

    /// Transfer an amount between two wallets.
    ///
    /// Validates preconditions in order (first violation wins), applies the
    /// debit and credit atomically, appends a block, and runs the contract
    /// evaluation passes to completion before returning the appended block.
    /// The pluggable validator runs after the fixed pipeline, so it can only
    /// add failure modes, never reorder the built-in ones.
    pub fn transfer(
        &mut self,
        sender: &str,
        receiver: &str,
        amount: BigDecimal,
        memo: &str,
    ) -> ChainResult<Block> {
        transfer::check_preconditions(&self.wallets, sender, receiver, &amount)?;
        self.transfer_validator
            .validate_transfer(sender, receiver, &amount, memo)?;
        let record =
            transfer::prepare_and_apply(&mut self.wallets, sender, receiver, &amount, memo)?;
        let block = self.append_record(BlockRecord::Transfer(record));
        self.drain_evaluation_passes();
        Ok(block)
    }

    // Contract operations

    /// Create a contract in `Draft` state with no signers, returning its
    /// generated name
    pub fn create_contract(
        &mut self,
        creator: &str,
        terms: ContractTerms,
    ) -> ChainResult<String> {
        self.wallets.get(creator)?;
        self.contract_validator.validate_terms(&terms)?;
        terms.validate(&self.wallets)?;

        let name = self
            .contracts
            .allocate_name(self.config.contract_name_attempts)?;
        let contract = Contract::new(name.clone(), creator.to_string(), terms);
        info!(contract = %name, creator = %creator, kind = ?contract.kind(), "contract created");
        self.contracts.insert(contract);
        Ok(name)
    }

    /// Record a wallet's consent to a contract. The first signer moves the
    /// contract from `Draft` to `Active`. Signing appends a block and so
    /// triggers an evaluation pass.
    pub fn sign_contract(&mut self, address: &str, name: &str) -> ChainResult<()> {
        self.wallets.get(address)?;

        let contract = self.contracts.get_mut(name)?;
        if contract.status.is_terminal() {
            return Err(ChainError::ContractNotActive(name.to_string()));
        }
        if contract.has_signed(address) {
            return Err(ChainError::DuplicateSigner(address.to_string()));
        }
        contract.signers.push(address.to_string());
        if contract.status == ContractStatus::Draft {
            contract.status = ContractStatus::Active;
        }
        info!(contract = %name, signer = %address, "contract signed");

        self.append_record(BlockRecord::ContractSigned {
            contract: name.to_string(),
            signer: address.to_string(),
            signed_at: chrono::Utc::now().naive_utc(),
        });
        self.drain_evaluation_passes();
        Ok(())
    }

    /// Delete a contract.
    ///
    /// An administrative request (`requester == None`) only succeeds while
    /// the contract has no signers. A requester must be an existing wallet;
    /// they may cancel their own Draft before anyone signs, or delete as the
    /// sole signer; with more than one signer deletion requires unanimous
    /// consent and fails.
    pub fn delete_contract(&mut self, name: &str, requester: Option<&str>) -> ChainResult<()> {
        if let Some(address) = requester {
            self.wallets.get(address)?;
        }
        let contract = self.contracts.get(name)?;
        if contract.status.is_terminal() {
            return Err(ChainError::ContractNotActive(name.to_string()));
        }

        let allowed = match requester {
            None => contract.signers.is_empty(),
            Some(address) => match contract.signers.len() {
                0 => contract.creator == address,
                1 => contract.signers[0] == address,
                _ => false,
            },
        };
        if !allowed {
            return Err(ChainError::RequiresUnanimousConsent);
        }

        self.contracts.get_mut(name)?.status = ContractStatus::Deleted;
        info!(contract = %name, "contract deleted");
        Ok(())
    }

    /// Full record of a single contract
    pub fn contract_status(&self, name: &str) -> ChainResult<Contract> {
        Ok(self.contracts.get(name)?.clone())
    }

    /// All contracts ever created, terminal ones included, in name order
    pub fn list_contracts(&self) -> Vec<Contract> {
        self.contracts.iter().cloned().collect()
    }

    // Ledger access

    /// Read-only ordered snapshot of all blocks, genesis first
    pub fn blocks(&self) -> &[Block] {
        self.ledger.blocks()
    }

    /// Recompute all hashes and links of the ledger
    pub fn verify_integrity(&self) -> LedgerIntegrityReport {
        self.ledger.verify()
    }

    // Internal append/evaluation plumbing

    /// Append a block for the given record and schedule one evaluation pass
    pub(crate) fn append_record(&mut self, record: BlockRecord) -> Block {
        let payload = format!("Block {}", self.ledger.len());
        let block = self.ledger.append(payload, Some(record)).clone();
        self.pending_passes += 1;
        block
    }

    /// Run scheduled evaluation passes until none remain. Appends made by
    /// contract execution schedule further passes, which are processed here
    /// sequentially instead of nesting.
    fn drain_evaluation_passes(&mut self) {
        if self.evaluating {
            return;
        }
        self.evaluating = true;
        while self.pending_passes > 0 {
            self.pending_passes -= 1;
            engine::run_pass(self);
        }
        self.evaluating = false;
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}
