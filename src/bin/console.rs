//! Console front-end
//!
//! Interactive menu over one in-memory banking service. A login gate comes
//! first; the single-letter menu mirrors the other two front-ends.

use std::io::{self, Write};
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use corebank::domain::PayoffOutcome;
use corebank::service::Bank;
use corebank::Config;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let config = Config::from_env()?;
    let mut bank = Bank::with_policy(config.policy());

    loop {
        if bank.active_customer().is_err() {
            println!("\nWelcome! Choose an option:");
            println!("  [r] Register customer");
            println!("  [l] Log in");
            println!("  [q] Quit");
            match prompt("Option: ")?.as_str() {
                "r" => register_customer(&mut bank)?,
                "l" => login(&mut bank)?,
                "q" => break,
                _ => println!("Invalid option!"),
            }
            continue;
        }

        match menu()?.as_str() {
            "d" => deposit(&mut bank)?,
            "w" => withdraw(&mut bank)?,
            "s" => statement(&bank),
            "na" => new_account(&mut bank),
            "ra" => remove_account(&mut bank)?,
            "la" => list_accounts(&bank),
            "nc" => register_customer(&mut bank)?,
            "ln" => loan_menu(&mut bank)?,
            "pi" => pay_installment(&mut bank),
            "po" => payoff_loan(&mut bank),
            "lo" => bank.logout(),
            "q" => break,
            _ => println!("Invalid option!"),
        }
    }

    println!("Leaving the system. Goodbye!");
    Ok(())
}

fn menu() -> Result<String> {
    println!("\n========================= MENU =========================");
    println!("  [d]   Deposit");
    println!("  [w]   Withdraw");
    println!("  [s]   Statement");
    println!("  [na]  New account");
    println!("  [ra]  Remove account");
    println!("  [la]  List accounts");
    println!("  [nc]  New customer");
    println!("  [ln]  Simulate/contract loan");
    println!("  [pi]  Pay loan installment");
    println!("  [po]  Pay off loan");
    println!("  [lo]  Log out");
    println!("  [q]   Quit");
    prompt("Option: ")
}

/// Read one trimmed line. EOF behaves like quitting.
fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok("q".to_string());
    }
    Ok(line.trim().to_string())
}

fn prompt_amount(label: &str) -> Result<Option<Decimal>> {
    let raw = prompt(label)?;
    let parsed = Decimal::from_str(&raw.replace(',', ".")).ok();
    if parsed.is_none() {
        println!("Invalid number: {raw}");
    }
    Ok(parsed)
}

fn register_customer(bank: &mut Bank) -> Result<()> {
    let national_id = prompt("National id (numbers only): ")?;
    let name = prompt("Full name: ")?;
    let birth_date = prompt("Birth date (dd/mm/yyyy): ")?;
    let Ok(birth_date) = NaiveDate::parse_from_str(&birth_date, "%d/%m/%Y") else {
        println!("Invalid birth date: {birth_date}");
        return Ok(());
    };
    let address = prompt("Address (street, number - district - city/state): ")?;

    match bank.register_customer(name, national_id, birth_date, address) {
        Ok(()) => println!("Customer registered successfully!"),
        Err(err) => println!("Operation failed: {err}"),
    }
    Ok(())
}

fn login(bank: &mut Bank) -> Result<()> {
    let national_id = prompt("National id (numbers only): ")?;
    match bank.login(&national_id) {
        Ok(customer) => println!("Logged in as {}.", customer.name()),
        Err(err) => println!("Operation failed: {err}"),
    }
    Ok(())
}

fn deposit(bank: &mut Bank) -> Result<()> {
    let Some(amount) = prompt_amount("Deposit amount: ")? else {
        return Ok(());
    };
    match bank.deposit(amount) {
        Ok(balance) => println!("Deposit made successfully! New balance: {balance:.2}"),
        Err(err) => println!("Operation failed: {err}"),
    }
    Ok(())
}

fn withdraw(bank: &mut Bank) -> Result<()> {
    let Some(amount) = prompt_amount("Withdrawal amount: ")? else {
        return Ok(());
    };
    match bank.withdraw(amount) {
        Ok(balance) => println!("Withdrawal made successfully! New balance: {balance:.2}"),
        Err(err) => println!("Operation failed: {err}"),
    }
    Ok(())
}

fn statement(bank: &Bank) {
    match bank.statement() {
        Ok(statement) => {
            println!("\n======================= STATEMENT =======================");
            if statement.entries.is_empty() {
                println!("No transactions recorded.");
            }
            for entry in &statement.entries {
                println!(
                    "{} - {}: {:.2}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.kind,
                    entry.amount
                );
            }
            println!("\nBalance: {:.2}", statement.balance);
            println!("=========================================================");
        }
        Err(err) => println!("Operation failed: {err}"),
    }
}

fn new_account(bank: &mut Bank) {
    match bank.open_account() {
        Ok(account) => println!(
            "Account created successfully! Number: {}, branch: {}",
            account.number, account.branch
        ),
        Err(err) => println!("Operation failed: {err}"),
    }
}

fn remove_account(bank: &mut Bank) -> Result<()> {
    let raw = prompt("Account number to remove: ")?;
    let Ok(number) = raw.parse::<u32>() else {
        println!("Invalid account number: {raw}");
        return Ok(());
    };
    match bank.remove_account(number) {
        Ok(()) => println!("Account {number} removed successfully!"),
        Err(err) => println!("Operation failed: {err}"),
    }
    Ok(())
}

fn list_accounts(bank: &Bank) {
    match bank.list_accounts() {
        Ok(accounts) => {
            for account in accounts {
                println!("{}", "=".repeat(56));
                println!("Branch:  {}", account.branch);
                println!("Number:  {}", account.number);
                println!("Balance: {:.2}", account.balance);
            }
        }
        Err(err) => println!("Operation failed: {err}"),
    }
}

fn loan_menu(bank: &mut Bank) -> Result<()> {
    let Some(principal) = prompt_amount("Loan amount: ")? else {
        return Ok(());
    };
    let raw = prompt("Number of installments: ")?;
    let Ok(installments) = raw.parse::<u32>() else {
        println!("Invalid number: {raw}");
        return Ok(());
    };
    let Some(rate) = prompt_amount("Monthly interest rate (e.g. 0.02 for 2%): ")? else {
        return Ok(());
    };

    match bank.simulate_loan(principal, installments, rate) {
        Ok(quote) => {
            println!("Loan simulation:");
            println!("Total: {:.2}", quote.total);
            println!("{} installments of {:.2}", installments, quote.installment);
        }
        Err(err) => {
            println!("Operation failed: {err}");
            return Ok(());
        }
    }

    if prompt("Contract this loan? (y/n): ")? == "y" {
        match bank.contract_loan(principal, installments, rate) {
            Ok(summary) => {
                println!("Loan contracted successfully!");
                println!(
                    "Amount of {:.2} deposited into the account.",
                    summary.principal
                );
                println!(
                    "Total: {:.2} in {} installments of {:.2}",
                    summary.total, summary.installment_count, summary.installment_amount
                );
            }
            Err(err) => println!("Operation failed: {err}"),
        }
    }
    Ok(())
}

fn pay_installment(bank: &mut Bank) {
    match bank.pay_installment() {
        Ok(status) => {
            println!(
                "Installment paid successfully! Installments paid: {}/{}",
                status.installments_paid, status.installment_count
            );
            println!("Outstanding balance: {:.2}", status.outstanding);
        }
        Err(err) => println!("Operation failed: {err}"),
    }
}

fn payoff_loan(bank: &mut Bank) {
    match bank.payoff_loan() {
        Ok(PayoffOutcome::Settled(status)) => {
            println!("Loan paid off successfully! Total settled: {:.2}", status.total);
            match bank.balance() {
                Ok(balance) => println!("Balance after payoff: {balance:.2}"),
                Err(err) => println!("Operation failed: {err}"),
            }
        }
        Ok(PayoffOutcome::Partial { debited, remaining }) => {
            if debited > Decimal::ZERO {
                println!(
                    "Debited {debited:.2} from the balance. Still {remaining:.2} left to pay off."
                );
            } else {
                println!("Insufficient funds to pay off the loan.");
            }
        }
        Err(err) => println!("Operation failed: {err}"),
    }
}
