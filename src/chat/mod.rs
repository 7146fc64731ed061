//! Chat-command front-end
//!
//! Interprets one chat message against a banking service: slash commands
//! first, then keyword intents for bare text, then a static guidance reply.
//! Amounts accept a decimal comma or point. Used by both the chat REPL
//! binary and the HTTP /chat endpoint.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::PayoffOutcome;
use crate::service::Bank;

pub fn help_text() -> &'static str {
    "Available commands:\n\
     /help - show this help\n\
     /register <national_id> \"<full name>\" <dd/mm/yyyy> \"<address>\" - register a customer\n\
     /login <national_id> - authenticate\n\
     /logout - end the session\n\
     /open_account - open an account\n\
     /accounts - list your accounts\n\
     /remove_account <number> - remove an emptied account\n\
     /balance - show the balance\n\
     /statement - show the statement\n\
     /deposit <amount> - make a deposit\n\
     /withdraw <amount> - make a withdrawal\n\
     /simulate_loan <amount> <installments> <rate> - quote a loan\n\
     /contract_loan <amount> <installments> <rate> - contract and deposit the principal\n\
     /pay_installment - pay one loan installment\n\
     /payoff_loan - settle the loan\n\
     /exit - leave the chat"
}

/// Interpret one message and answer with human-readable text.
pub fn interpret(bank: &mut Bank, input: &str) -> String {
    let text = input.trim();
    if text.is_empty() {
        return guidance();
    }

    let tokens = tokenize(text);
    if let Some(first) = tokens.first() {
        // Commands work with or without the leading slash.
        let command = first.trim_start_matches('/').to_lowercase();
        if let Some(reply) = dispatch(bank, &command, &tokens[1..]) {
            return reply;
        }
    }

    if let Some(reply) = keyword_intent(bank, text) {
        return reply;
    }

    guidance()
}

fn guidance() -> String {
    "I can only help with banking commands. Type /help to see the options.".to_string()
}

// =========================================================================
// Slash commands
// =========================================================================

fn dispatch(bank: &mut Bank, command: &str, args: &[String]) -> Option<String> {
    let reply = match command {
        "help" => help_text().to_string(),

        "register" => {
            if args.len() < 4 {
                return Some(
                    "Usage: /register <national_id> \"<full name>\" <dd/mm/yyyy> \"<address>\""
                        .to_string(),
                );
            }
            let Some(birth_date) = parse_date(&args[2]) else {
                return Some(format!("Invalid birth date: {} (expected dd/mm/yyyy)", args[2]));
            };
            match bank.register_customer(&*args[1], &*args[0], birth_date, &*args[3]) {
                Ok(()) => format!(
                    "Customer registered: {} ({}). Log in with /login {}.",
                    args[1], args[0], args[0]
                ),
                Err(err) => err.to_string(),
            }
        }

        "login" => {
            let Some(id) = args.first() else {
                return Some("Usage: /login <national_id>".to_string());
            };
            match bank.login(id) {
                Ok(customer) => format!(
                    "Logged in as {} ({}).",
                    customer.name(),
                    customer.national_id()
                ),
                Err(err) => err.to_string(),
            }
        }

        "logout" => {
            bank.logout();
            "Logged out.".to_string()
        }

        "open_account" | "new_account" => match bank.open_account() {
            Ok(account) => format!(
                "Account opened. Branch {}, number {}.",
                account.branch, account.number
            ),
            Err(err) => err.to_string(),
        },

        "accounts" | "list_accounts" => render_accounts(bank),

        "remove_account" => {
            let Some(number) = args.first().and_then(|raw| raw.parse::<u32>().ok()) else {
                return Some("Usage: /remove_account <number>".to_string());
            };
            match bank.remove_account(number) {
                Ok(()) => format!("Account {number} removed."),
                Err(err) => err.to_string(),
            }
        }

        "balance" => render_balance(bank),

        "statement" => render_statement(bank),

        "deposit" => {
            let Some(amount) = args.first().and_then(|raw| parse_amount(raw)) else {
                return Some("Usage: /deposit <amount>".to_string());
            };
            match bank.deposit(amount) {
                Ok(balance) => format!("Deposited {amount:.2}. Current balance: {balance:.2}."),
                Err(err) => err.to_string(),
            }
        }

        "withdraw" => {
            let Some(amount) = args.first().and_then(|raw| parse_amount(raw)) else {
                return Some("Usage: /withdraw <amount>".to_string());
            };
            match bank.withdraw(amount) {
                Ok(balance) => format!("Withdrew {amount:.2}. Current balance: {balance:.2}."),
                Err(err) => err.to_string(),
            }
        }

        "simulate_loan" => {
            let Some((principal, installments, rate)) = loan_args(args) else {
                return Some("Usage: /simulate_loan <amount> <installments> <rate>".to_string());
            };
            render_simulation(bank, principal, installments, rate)
        }

        "contract_loan" => {
            let Some((principal, installments, rate)) = loan_args(args) else {
                return Some("Usage: /contract_loan <amount> <installments> <rate>".to_string());
            };
            match bank.contract_loan(principal, installments, rate) {
                Ok(summary) => format!(
                    "Loan contracted. Principal {:.2} deposited; total owed {:.2} in {} installments of {:.2}.",
                    summary.principal,
                    summary.total,
                    summary.installment_count,
                    summary.installment_amount
                ),
                Err(err) => err.to_string(),
            }
        }

        "pay_installment" => match bank.pay_installment() {
            Ok(status) => format!(
                "Installment paid ({}/{}). Outstanding balance: {:.2}.",
                status.installments_paid, status.installment_count, status.outstanding
            ),
            Err(err) => err.to_string(),
        },

        "payoff_loan" => match bank.payoff_loan() {
            Ok(PayoffOutcome::Settled(_)) => "Loan settled in full.".to_string(),
            Ok(PayoffOutcome::Partial { debited, remaining }) => {
                if debited > Decimal::ZERO {
                    format!(
                        "Debited {debited:.2} from the balance. Still {remaining:.2} left to settle."
                    )
                } else {
                    format!("Insufficient funds to settle the loan. Outstanding: {remaining:.2}.")
                }
            }
            Err(err) => err.to_string(),
        },

        _ => return None,
    };
    Some(reply)
}

fn loan_args(args: &[String]) -> Option<(Decimal, u32, Decimal)> {
    if args.len() < 3 {
        return None;
    }
    let principal = parse_amount(&args[0])?;
    let installments = args[1].parse::<u32>().ok()?;
    let rate = parse_amount(&args[2])?;
    Some((principal, installments, rate))
}

// =========================================================================
// Keyword intents
// =========================================================================

fn keyword_intent(bank: &mut Bank, text: &str) -> Option<String> {
    let lower = text.to_lowercase();

    if lower.contains("balance") {
        return Some(render_balance(bank));
    }
    if lower.contains("statement") || lower.contains("history") {
        return Some(render_statement(bank));
    }
    if (lower.contains("list") || lower.contains("show")) && lower.contains("account") {
        return Some(render_accounts(bank));
    }
    if lower.contains("deposit") {
        if let Some(amount) = extract_numbers(&lower).into_iter().next() {
            return Some(match bank.deposit(amount) {
                Ok(balance) => format!("Deposited {amount:.2}. Current balance: {balance:.2}."),
                Err(err) => err.to_string(),
            });
        }
    }
    if lower.contains("withdraw") {
        if let Some(amount) = extract_numbers(&lower).into_iter().next() {
            return Some(match bank.withdraw(amount) {
                Ok(balance) => format!("Withdrew {amount:.2}. Current balance: {balance:.2}."),
                Err(err) => err.to_string(),
            });
        }
    }
    if lower.contains("simul") && lower.contains("loan") {
        let numbers = extract_numbers(&lower);
        if numbers.len() >= 3 {
            let installments = numbers[1].to_u32()?;
            return Some(render_simulation(bank, numbers[0], installments, numbers[2]));
        }
    }

    None
}

// =========================================================================
// Rendering
// =========================================================================

fn render_balance(bank: &Bank) -> String {
    match bank.balance() {
        Ok(balance) => format!("Current balance: {balance:.2}."),
        Err(err) => err.to_string(),
    }
}

fn render_statement(bank: &Bank) -> String {
    match bank.statement() {
        Ok(statement) => {
            if statement.entries.is_empty() {
                return format!(
                    "No transactions yet. Current balance: {:.2}.",
                    statement.balance
                );
            }
            let mut lines = vec!["Statement:".to_string()];
            for entry in &statement.entries {
                lines.push(format!(
                    "{} - {}: {:.2}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.kind,
                    entry.amount
                ));
            }
            lines.push(format!("Current balance: {:.2}.", statement.balance));
            lines.join("\n")
        }
        Err(err) => err.to_string(),
    }
}

fn render_accounts(bank: &Bank) -> String {
    match bank.list_accounts() {
        Ok(accounts) => {
            if accounts.is_empty() {
                return "You have no accounts. Open one with /open_account.".to_string();
            }
            let mut lines = vec!["Your accounts:".to_string()];
            for account in accounts {
                lines.push(format!(
                    "Branch {}, number {}, balance {:.2}",
                    account.branch, account.number, account.balance
                ));
            }
            lines.join("\n")
        }
        Err(err) => err.to_string(),
    }
}

fn render_simulation(bank: &Bank, principal: Decimal, installments: u32, rate: Decimal) -> String {
    match bank.simulate_loan(principal, installments, rate) {
        Ok(quote) => format!(
            "Simulation: total {:.2} in {} installments of {:.2}.",
            quote.total, installments, quote.installment
        ),
        Err(err) => err.to_string(),
    }
}

// =========================================================================
// Parsing
// =========================================================================

/// Whitespace tokenizer with double-quoted groups.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.trim().replace(',', ".")).ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}

/// Pull numeric literals out of free text, accepting a decimal comma.
fn extract_numbers(text: &str) -> Vec<Decimal> {
    let mut numbers = Vec::new();
    let mut current = String::new();

    let mut flush = |buffer: &mut String| {
        let trimmed = buffer.trim_matches(|c| c == '.' || c == ',');
        if !trimmed.is_empty() {
            if let Some(value) = parse_amount(trimmed) {
                numbers.push(value);
            }
        }
        buffer.clear();
    };

    for ch in text.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            current.push(ch);
        } else {
            flush(&mut current);
        }
    }
    flush(&mut current);
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use rust_decimal_macros::dec;

    fn bank_with_account() -> Bank {
        let mut bank = Bank::new();
        bank.register_customer(
            "Ana Souza",
            "111",
            NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            "12 Baker St",
        )
        .unwrap();
        bank.login("111").unwrap();
        bank.open_account().unwrap();
        bank
    }

    #[test]
    fn tokenize_respects_quotes() {
        let tokens = tokenize(r#"/register 111 "Ana Souza" 12/04/1990 "12 Baker St""#);
        assert_eq!(
            tokens,
            vec!["/register", "111", "Ana Souza", "12/04/1990", "12 Baker St"]
        );
    }

    #[test]
    fn extract_numbers_handles_commas() {
        assert_eq!(
            extract_numbers("deposit 100,50 into account 2"),
            vec![dec!(100.50), dec!(2)]
        );
        assert_eq!(extract_numbers("no numbers here."), Vec::<Decimal>::new());
    }

    #[test]
    fn slash_commands_drive_the_bank() {
        let mut bank = bank_with_account();

        let reply = interpret(&mut bank, "/deposit 250");
        assert!(reply.contains("250.00"), "{reply}");
        assert_eq!(bank.balance().unwrap(), dec!(250));

        let reply = interpret(&mut bank, "/withdraw 100");
        assert!(reply.contains("150.00"), "{reply}");
    }

    #[test]
    fn commands_work_without_slash() {
        let mut bank = bank_with_account();
        interpret(&mut bank, "deposit 80");
        assert_eq!(bank.balance().unwrap(), dec!(80));
    }

    #[test]
    fn register_command_creates_customer() {
        let mut bank = Bank::new();
        let reply = interpret(
            &mut bank,
            r#"/register 222 "Bruno Lima" 30/01/1985 "34 Elm St""#,
        );
        assert!(reply.contains("Bruno Lima"), "{reply}");

        let reply = interpret(&mut bank, "/login 222");
        assert!(reply.contains("Logged in"), "{reply}");
    }

    #[test]
    fn keyword_intents() {
        let mut bank = bank_with_account();
        interpret(&mut bank, "/deposit 500");

        let reply = interpret(&mut bank, "what is my balance?");
        assert!(reply.contains("500.00"), "{reply}");

        let reply = interpret(&mut bank, "please withdraw 120 for me");
        assert!(reply.contains("380.00"), "{reply}");

        let reply = interpret(&mut bank, "simulate a loan of 5000 in 12 payments at 0.02");
        assert!(reply.contains("6200.00"), "{reply}");
        assert!(reply.contains("516.67"), "{reply}");
    }

    #[test]
    fn errors_become_messages() {
        let mut bank = bank_with_account();
        let reply = interpret(&mut bank, "/withdraw 50");
        assert_eq!(
            reply,
            DomainError::InsufficientFunds {
                requested: dec!(50),
                available: dec!(0),
            }
            .to_string()
        );
    }

    #[test]
    fn unknown_text_gets_guidance() {
        let mut bank = Bank::new();
        let reply = interpret(&mut bank, "tell me about the weather");
        assert!(reply.contains("/help"), "{reply}");
    }
}
