//! End-to-end wallet and contract walkthrough

use bigdecimal::BigDecimal;
use chainledger_core::{Chain, ContractStatus, ContractTerms};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔗 Chainledger Core - Wallet Workflow Example\n");

    let mut chain = Chain::new();

    // 1. Open some wallets
    println!("👛 Opening wallets...");
    let alice = chain.create_wallet()?;
    let bob = chain.create_wallet()?;
    let carol = chain.create_wallet()?;
    for address in [&alice, &bob, &carol] {
        println!("  ✓ {} opened with balance {}", address, chain.balance(address)?);
    }
    println!();

    // 2. Move funds around
    println!("💸 Transferring funds...");
    chain.transfer(&alice, &bob, BigDecimal::from(30), "rent")?;
    println!("  ✓ {} -> {}: 30 (rent)", alice, bob);
    chain.transfer(&bob, &carol, BigDecimal::from(45), "groceries")?;
    println!("  ✓ {} -> {}: 45 (groceries)", bob, carol);
    println!();

    // 3. Set up a funding contract: once Carol reaches 160, every signer
    //    chips in 10 for Alice
    println!("📜 Creating a funding contract...");
    let contract = chain.create_contract(
        &bob,
        ContractTerms::Funding {
            target: carol.clone(),
            goal: BigDecimal::from(160),
            individual: BigDecimal::from(10),
            receiver: alice.clone(),
        },
    )?;
    chain.sign_contract(&bob, &contract)?;
    println!("  ✓ Contract {} signed by {}", contract, bob);

    // This transfer pushes Carol past the goal and fires the contract
    chain.transfer(&alice, &carol, BigDecimal::from(20), "loan")?;
    let status = chain.contract_status(&contract)?.status;
    println!(
        "  ✓ Contract {} is now {:?}",
        contract,
        status
    );
    assert_eq!(status, ContractStatus::Executed);
    println!();

    // 4. Inspect balances and history
    println!("📊 Final balances:");
    for summary in chain.wallets_overview() {
        println!(
            "  {}: {} ({} transfers)",
            summary.address, summary.balance, summary.transfer_count
        );
    }
    println!();

    println!("🧾 History for {}:", alice);
    for entry in chain.wallet_history(&alice) {
        println!(
            "  block {} [{:?}] {} -> {}: {} (balance after: {})",
            entry.block_index,
            entry.direction,
            entry.sender,
            entry.receiver,
            entry.amount,
            entry.balance_after
        );
    }
    println!();

    // 5. Verify the hash chain end to end
    println!("🔍 Verifying ledger integrity...");
    let report = chain.verify_integrity();
    if report.is_valid {
        println!("  ✅ {} blocks, all hashes and links valid", report.block_count);
    } else {
        println!("  ❌ Integrity check failed:");
        for issue in &report.issues {
            println!("    - {}", issue);
        }
    }

    println!("\n🎉 Example completed successfully!");
    Ok(())
}
