//! Contract evaluation pass and per-signer execution

use bigdecimal::BigDecimal;
use tracing::{debug, info, warn};

use crate::ledger::core::Chain;
use crate::types::*;

/// Run one evaluation pass over all active auto-evaluated contracts.
///
/// A pass is scheduled for every successful ledger append and passes run
/// sequentially, never nested: transfers executed here append further
/// blocks, and each of those appends schedules its own later pass. The
/// trigger for Transaction contracts is the record of the block whose
/// append scheduled this pass, captured before any contract acts.
pub(crate) fn run_pass(chain: &mut Chain) {
    let trigger_record = chain.ledger.tip().record.clone();
    // Only direct user transfers act as triggers; a contract's own payouts
    // must not re-trigger contracts
    let trigger_transfer = trigger_record
        .as_ref()
        .and_then(|record| record.user_transfer());

    for name in chain.contracts.active_auto_names() {
        let Some(contract) = chain.contracts.lookup(&name) else {
            continue;
        };
        if contract.status != ContractStatus::Active {
            continue;
        }

        match contract.terms.clone() {
            ContractTerms::Funding {
                target,
                goal,
                individual,
                receiver,
            } => {
                let triggered = chain
                    .wallets
                    .lookup(&target)
                    .is_some_and(|wallet| wallet.balance >= goal);
                if !triggered {
                    continue;
                }

                let signers = contract.signers.clone();
                execute_signer_transfers(chain, &name, &signers, &individual, &receiver);

                // Funding contracts fire exactly once
                if let Ok(contract) = chain.contracts.get_mut(&name) {
                    contract.status = ContractStatus::Executed;
                }
                info!(contract = %name, "funding contract executed");
            }
            ContractTerms::Transaction {
                from,
                to,
                threshold,
                individual,
                receiver,
            } => {
                let triggered = trigger_transfer.is_some_and(|transfer| {
                    transfer.sender == from
                        && transfer.receiver == to
                        && transfer.amount >= threshold
                });
                if !triggered {
                    continue;
                }

                let signers = contract.signers.clone();
                execute_signer_transfers(chain, &name, &signers, &individual, &receiver);
                // Stays active and may fire again on a later qualifying transfer
                info!(contract = %name, "transaction contract executed");
            }
            ContractTerms::Other { .. } => {}
        }
    }
}

/// Move `individual` from every signer to `receiver`, appending one
/// contract-transfer block per signer.
///
/// A signer that is missing or cannot cover the amount is a breach of
/// contract: it is logged, skipped, and transfers already applied for other
/// signers are not rolled back.
fn execute_signer_transfers(
    chain: &mut Chain,
    name: &str,
    signers: &[String],
    individual: &BigDecimal,
    receiver: &str,
) {
    for signer in signers {
        let deducted = chain
            .wallets
            .get_mut(signer)
            .and_then(|wallet| wallet.deduct(individual));
        if let Err(err) = deducted {
            warn!(contract = %name, signer = %signer, %err, "breach of contract; signer skipped");
            continue;
        }

        match chain.wallets.get_mut(receiver) {
            Ok(wallet) => wallet.credit(individual),
            Err(err) => {
                // Receiver wallet is gone; restore the signer and skip
                if let Ok(wallet) = chain.wallets.get_mut(signer) {
                    wallet.credit(individual);
                }
                warn!(contract = %name, receiver = %receiver, %err, "breach of contract; receiver missing");
                continue;
            }
        }

        let transfer = TransferRecord::new(
            signer.clone(),
            receiver.to_string(),
            individual.clone(),
            format!("contract {name}"),
        );
        chain.append_record(BlockRecord::ContractTransfer {
            contract: name.to_string(),
            transfer,
        });
        debug!(contract = %name, signer = %signer, receiver = %receiver, amount = %individual, "contract transfer applied");
    }
}
