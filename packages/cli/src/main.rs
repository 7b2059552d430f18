//! `spool` — SecurePool command-line interface.
//!
//! Two ways to use it:
//!
//! - **`session`**: an interactive prompt. Create an account once, then
//!   issue any number of pool, claim, and vote commands signed by it. The
//!   account lives only as long as the session.
//! - **one-shot subcommands** (`create-pool`, `join-pool`, `submit-claim`,
//!   `vote`): create a fresh account, optionally fund it from the faucet,
//!   and run a single action.
//!
//! Exit codes: 0 success, 1 confirmed failure, 2 setup error, 3 outcome
//! unknown (the transaction may still be applied).

use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use securepool_agent_core::Session;
use securepool_client::{ActionOutcome, BlockingActions, ClientConfig, InsuranceActions};

/// spool — SecurePool micro-insurance CLI
#[derive(Parser)]
#[command(name = "spool", version, about, long_about = None)]
struct Cli {
    /// Ledger REST API base URL.
    #[arg(long, env = "SPOOL_NODE_URL", global = true)]
    node_url: Option<String>,

    /// Faucet base URL, used by `--fund` and the `fund` session command.
    #[arg(long, env = "SPOOL_FAUCET_URL", global = true)]
    faucet_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session. Type `help` at the prompt for commands.
    Session,

    /// Create a new insurance pool.
    CreatePool {
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        premium: i128,
        #[arg(long, allow_negative_numbers = true)]
        coverage: i128,
        /// Fund the fresh account with this many octas first.
        #[arg(long, value_name = "OCTAS")]
        fund: Option<i128>,
    },

    /// Join an existing pool.
    JoinPool {
        #[arg(long, allow_negative_numbers = true)]
        pool_id: i128,
        #[arg(long, value_name = "OCTAS")]
        fund: Option<i128>,
    },

    /// File a claim against a pool.
    SubmitClaim {
        #[arg(long, allow_negative_numbers = true)]
        pool_id: i128,
        #[arg(long, allow_negative_numbers = true)]
        amount: i128,
        #[arg(long)]
        description: String,
        #[arg(long, value_name = "OCTAS")]
        fund: Option<i128>,
    },

    /// Vote on an open claim.
    Vote {
        #[arg(long, allow_negative_numbers = true)]
        claim_id: i128,
        /// Approve the claim. Without this flag the vote is a rejection.
        #[arg(long)]
        approve: bool,
        #[arg(long, value_name = "OCTAS")]
        fund: Option<i128>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "securepool_client=info,spool=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().unwrap_or_else(|e| fatal(&e.to_string()));
    if let Some(url) = cli.node_url {
        config.node_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = cli.faucet_url {
        config.faucet_url = Some(url.trim_end_matches('/').to_string());
    }
    tracing::debug!("spool: ledger {} module {}", config.node_url, config.module);

    let actions = InsuranceActions::from_config(Arc::new(Session::new()), &config)
        .unwrap_or_else(|e| fatal(&e.to_string()));
    let actions = BlockingActions::new(actions)
        .unwrap_or_else(|e| fatal(&format!("failed to start runtime: {e}")));

    let outcome = match cli.command {
        Command::Session => {
            run_session(&actions);
            return;
        }
        Command::CreatePool {
            name,
            premium,
            coverage,
            fund,
        } => one_shot(&actions, fund, |a| a.create_pool(&name, premium, coverage)),
        Command::JoinPool { pool_id, fund } => one_shot(&actions, fund, |a| a.join_pool(pool_id)),
        Command::SubmitClaim {
            pool_id,
            amount,
            description,
            fund,
        } => one_shot(&actions, fund, |a| a.submit_claim(pool_id, amount, &description)),
        Command::Vote {
            claim_id,
            approve,
            fund,
        } => one_shot(&actions, fund, |a| a.vote_on_claim(claim_id, approve)),
    };

    report(&outcome);
    process::exit(exit_code(&outcome));
}

/// Create an account, fund it if asked, then run `action`.
fn one_shot(
    actions: &BlockingActions,
    fund: Option<i128>,
    action: impl FnOnce(&BlockingActions) -> ActionOutcome,
) -> ActionOutcome {
    let created = actions.create_identity();
    if !created.success {
        return created;
    }
    print_account(actions);

    if let Some(amount) = fund {
        let funded = actions.fund_account(amount);
        if !funded.success {
            return funded;
        }
        println!("funded with {amount} octas");
    }
    action(actions)
}

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

const HELP: &str = "\
commands:
  account                              create a new account (replaces any current one)
  whoami                               show the current account address
  fund <octas>                         fund the current account from the faucet
  create-pool <premium> <coverage> <name...>
  join <pool_id>
  claim <pool_id> <amount> <description...>
  vote <claim_id> yes|no
  help
  quit";

fn run_session(actions: &BlockingActions) {
    println!("spool session; type `help` for commands");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };

        let outcome = match command {
            "quit" | "exit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            "whoami" => {
                print_account(actions);
                continue;
            }
            "account" => {
                let outcome = actions.create_identity();
                if outcome.success {
                    print_account(actions);
                }
                outcome
            }
            _ => match parse_session_command(command, rest) {
                Ok(SessionCommand::Fund(amount)) => actions.fund_account(amount),
                Ok(SessionCommand::CreatePool(premium, coverage, name)) => {
                    actions.create_pool(&name, premium, coverage)
                }
                Ok(SessionCommand::Join(pool_id)) => actions.join_pool(pool_id),
                Ok(SessionCommand::Claim(pool_id, amount, description)) => {
                    actions.submit_claim(pool_id, amount, &description)
                }
                Ok(SessionCommand::Vote(claim_id, approve)) => {
                    actions.vote_on_claim(claim_id, approve)
                }
                Err(msg) => {
                    eprintln!("{msg}");
                    continue;
                }
            },
        };
        report(&outcome);
    }
}

#[derive(Debug, PartialEq)]
enum SessionCommand {
    Fund(i128),
    CreatePool(i128, i128, String),
    Join(i128),
    Claim(i128, i128, String),
    Vote(i128, bool),
}

fn parse_session_command(command: &str, args: &[&str]) -> Result<SessionCommand, String> {
    match (command, args) {
        ("fund", [amount]) => Ok(SessionCommand::Fund(number("octas", amount)?)),
        ("create-pool", [premium, coverage, name @ ..]) => Ok(SessionCommand::CreatePool(
            number("premium", premium)?,
            number("coverage", coverage)?,
            name.join(" "),
        )),
        ("join", [pool_id]) => Ok(SessionCommand::Join(number("pool_id", pool_id)?)),
        ("claim", [pool_id, amount, description @ ..]) => Ok(SessionCommand::Claim(
            number("pool_id", pool_id)?,
            number("amount", amount)?,
            description.join(" "),
        )),
        ("vote", [claim_id, choice]) => {
            let approve = match *choice {
                "yes" | "approve" => true,
                "no" | "reject" => false,
                other => return Err(format!("vote must be yes or no, got {other:?}")),
            };
            Ok(SessionCommand::Vote(number("claim_id", claim_id)?, approve))
        }
        ("fund" | "create-pool" | "join" | "claim" | "vote", _) => {
            Err(format!("wrong arguments for {command}; type `help`"))
        }
        _ => Err(format!("unknown command {command:?}; type `help`")),
    }
}

fn number(field: &str, raw: &str) -> Result<i128, String> {
    raw.parse::<i128>()
        .map_err(|_| format!("{field} must be a whole number, got {raw:?}"))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_account(actions: &BlockingActions) {
    match actions.session().identity() {
        Some(identity) => println!("account {}", identity.address()),
        None => println!("no account yet; run `account` first"),
    }
}

fn report(outcome: &ActionOutcome) {
    if outcome.success {
        match &outcome.tx_hash {
            Some(hash) => println!("ok: {hash}"),
            None => println!("ok"),
        }
        return;
    }
    let kind = outcome
        .kind
        .map(|k| k.to_string())
        .unwrap_or_else(|| "error".into());
    eprintln!(
        "{kind}: {}",
        outcome.reason.as_deref().unwrap_or("unknown failure")
    );
}

fn exit_code(outcome: &ActionOutcome) -> i32 {
    if outcome.success {
        0
    } else if outcome.unknown_outcome {
        3
    } else {
        1
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("spool: {msg}");
    process::exit(2);
}
