//! Policy Ledger CLI
//!
//! Command-line front end over the ledger library: manage clients, policies
//! and payments, check balances and run reports.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use policy_ledger::model::Client;
use policy_ledger::{
    ClientPatch, Ledger, LedgerConfig, LoadMode, PolicyPatch, Report, ReportKind, SharedClock,
    SystemClock,
};

#[derive(Debug, Parser)]
#[command(name = "policy-ledger", version, about = "Insurance client, policy and premium ledger")]
struct Cli {
    /// JSON config file (data_dir, file names, load_mode)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding clients.txt, policies.txt and payments.txt
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Fail on malformed records instead of loading them as empty entries
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Client management
    #[command(subcommand)]
    Client(ClientCommand),

    /// Policy management
    #[command(subcommand)]
    Policy(PolicyCommand),

    /// Premium payments
    #[command(subcommand)]
    Payment(PaymentCommand),

    /// Balance, months paid and next due date of a policy
    Status {
        policy_id: String,
        #[arg(long)]
        json: bool,
    },

    /// Ledger-wide reports
    Report(ReportArgs),
}

#[derive(Debug, Subcommand)]
enum ClientCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    Show {
        id: u32,
    },
    /// Case-insensitive name search
    Search {
        keyword: String,
    },
    /// Omitted fields keep their current value
    Update {
        id: u32,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        age: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// Refused while the client has policies
    Delete {
        id: u32,
    },
}

#[derive(Debug, Subcommand)]
enum PolicyCommand {
    Add {
        #[arg(long)]
        client: u32,
        #[arg(long = "type")]
        policy_type: String,
        #[arg(long)]
        premium: f64,
        #[arg(long)]
        months: u32,
        /// YYYY-MM-DD; today if omitted or invalid
        #[arg(long, default_value = "")]
        start: String,
    },
    Show {
        policy_id: String,
    },
    List,
    ForClient {
        client_id: u32,
    },
    /// Omitted fields keep their current value
    Update {
        policy_id: String,
        #[arg(long = "type", default_value = "")]
        policy_type: String,
        #[arg(long, default_value = "")]
        premium: String,
        #[arg(long, default_value = "")]
        months: String,
        #[arg(long, default_value = "")]
        start: String,
    },
    /// Refused while the policy has payments
    Delete {
        policy_id: String,
    },
}

#[derive(Debug, Subcommand)]
enum PaymentCommand {
    Record {
        policy_id: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// YYYY-MM-DD; today if omitted or invalid
        #[arg(long, default_value = "")]
        date: String,
    },
    History {
        policy_id: String,
    },
}

#[derive(Debug, Args)]
struct ReportArgs {
    #[command(subcommand)]
    kind: ReportCommand,

    /// Also write the rows to this CSV file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum ReportCommand {
    Clients,
    Policies,
    /// Policies ending within the next N months
    Expiring {
        #[arg(long)]
        months: i32,
    },
    /// Policies with premium still owed
    Unpaid,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LedgerConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if cli.strict {
        config.load_mode = LoadMode::Strict;
    }

    let clock: SharedClock = Rc::new(SystemClock);
    let mut ledger = Ledger::open(&config, clock)
        .with_context(|| format!("opening ledger in {}", config.data_dir.display()))?;

    match cli.command {
        Command::Client(cmd) => run_client(&mut ledger, cmd),
        Command::Policy(cmd) => run_policy(&mut ledger, cmd),
        Command::Payment(cmd) => run_payment(&mut ledger, cmd),
        Command::Status { policy_id, json } => run_status(&ledger, &policy_id, json),
        Command::Report(args) => run_report(&ledger, args),
    }
}

fn print_client(c: &Client) {
    println!("{} | {} | Age {} | {} | {}", c.id, c.name, c.age, c.contact, c.address);
}

fn run_client(ledger: &mut Ledger, cmd: ClientCommand) -> anyhow::Result<()> {
    match cmd {
        ClientCommand::Add { name, age, contact, address } => {
            let client = ledger.add_client(&name, age, &contact, &address)?;
            println!("Client added with ID: {}", client.id);
        }
        ClientCommand::Show { id } => match ledger.client(id) {
            Some(c) => print_client(c),
            None => bail!("client {} not found", id),
        },
        ClientCommand::Search { keyword } => {
            let matches = ledger.find_clients_by_name(&keyword);
            if matches.is_empty() {
                println!("No matches.");
            }
            for c in matches {
                print_client(c);
            }
        }
        ClientCommand::Update { id, name, age, contact, address } => {
            let patch = ClientPatch { name, age, contact, address };
            ledger.update_client(id, &patch)?;
            println!("Client {} updated.", id);
        }
        ClientCommand::Delete { id } => {
            ledger.remove_client(id)?;
            println!("Client {} deleted.", id);
        }
    }
    Ok(())
}

fn run_policy(ledger: &mut Ledger, cmd: PolicyCommand) -> anyhow::Result<()> {
    match cmd {
        PolicyCommand::Add { client, policy_type, premium, months, start } => {
            let policy = ledger.add_policy(client, &policy_type, premium, months, &start)?;
            println!("Policy created: {} (start {})", policy.policy_id, policy.start_date);
        }
        PolicyCommand::Show { policy_id } => match ledger.policy(&policy_id) {
            Some(p) => println!(
                "{} | {} | Premium {} | Months {} | Client {} ({}) | Start {}",
                p.policy_id,
                p.policy_type,
                p.monthly_premium,
                p.duration_months,
                p.client_id,
                ledger.client_name(p.client_id),
                p.start_date
            ),
            None => bail!("policy {} not found", policy_id),
        },
        PolicyCommand::List => print_report(&ReportKind::AllPolicies.generate(ledger)),
        PolicyCommand::ForClient { client_id } => {
            let policies = ledger.policies_for_client(client_id);
            if policies.is_empty() {
                println!("No policies for client {}.", client_id);
            }
            for p in policies {
                println!(
                    "{} | {} | Premium {} | Months {} | Start {}",
                    p.policy_id, p.policy_type, p.monthly_premium, p.duration_months, p.start_date
                );
            }
        }
        PolicyCommand::Update { policy_id, policy_type, premium, months, start } => {
            let patch = PolicyPatch {
                policy_type,
                premium,
                duration_months: months,
                start_date: start,
            };
            ledger.update_policy(&policy_id, &patch)?;
            println!("Policy {} updated.", policy_id);
        }
        PolicyCommand::Delete { policy_id } => {
            ledger.remove_policy(&policy_id)?;
            println!("Policy {} deleted.", policy_id);
        }
    }
    Ok(())
}

fn run_payment(ledger: &mut Ledger, cmd: PaymentCommand) -> anyhow::Result<()> {
    match cmd {
        PaymentCommand::Record { policy_id, amount, date } => {
            let payment = ledger.record_payment(&policy_id, amount, &date)?;
            println!(
                "Payment of {} recorded on {} for {}",
                payment.amount, payment.date, policy_id
            );
        }
        PaymentCommand::History { policy_id } => {
            if ledger.policy(&policy_id).is_none() {
                bail!("policy {} not found", policy_id);
            }
            let history = ledger.payment_history(&policy_id);
            if history.is_empty() {
                println!("No payments.");
                return Ok(());
            }
            println!("{:<12} | Amount", "Date");
            for payment in history {
                println!("{:<12} | {}", payment.date, payment.amount);
            }
        }
    }
    Ok(())
}

fn run_status(ledger: &Ledger, policy_id: &str, json: bool) -> anyhow::Result<()> {
    let status = ledger.statement(policy_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let s = &status.statement;
    println!("== Policy Status ==");
    println!("Client: {} - {}", s.client_id, status.client_name);
    println!(
        "Type: {} | Premium: {} | Duration: {} | Start: {}",
        s.policy_type, s.monthly_premium, s.duration_months, s.start_date
    );
    println!("Total Due (full term): {}", s.total_due);
    println!("Total Paid: {}", s.total_paid);
    println!("Months Paid (approx): {} / {}", s.months_paid, s.duration_months);
    match (&s.next_due_date, s.no_due_reason()) {
        (Some(due), _) => println!("Next Due Date: {}", due),
        (None, Some(reason)) => println!("Next Due Date: N/A ({})", reason),
        (None, None) => println!("Next Due Date: N/A"),
    }
    println!("Remaining Balance: {}", s.remaining_balance);
    Ok(())
}

fn run_report(ledger: &Ledger, args: ReportArgs) -> anyhow::Result<()> {
    let kind = match args.kind {
        ReportCommand::Clients => ReportKind::AllClients,
        ReportCommand::Policies => ReportKind::AllPolicies,
        ReportCommand::Expiring { months } => ReportKind::ExpiringWithin { months },
        ReportCommand::Unpaid => ReportKind::UnpaidPremiums,
    };
    let report = kind.generate(ledger);

    if args.json {
        serde_json::to_writer_pretty(io::stdout(), &report)?;
        println!();
    } else {
        print_report(&report);
    }

    if let Some(path) = args.csv {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        report
            .write_csv(file)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("\nReport written to: {}", path.display());
    }
    Ok(())
}

fn print_report(report: &Report) {
    match report {
        Report::Clients { rows } => {
            println!("{:<8}{:<22}{:<6}{:<15}Address", "ID", "Name", "Age", "Contact");
            for c in rows {
                println!("{:<8}{:<22}{:<6}{:<15}{}", c.id, c.name, c.age, c.contact, c.address);
            }
        }
        Report::Policies { rows } => {
            println!(
                "{:<10}{:<8}{:<12}{:<12}{:<10}{:<12}",
                "PolicyID", "Client", "Type", "Premium", "Months", "Start"
            );
            for p in rows {
                println!(
                    "{:<10}{:<8}{:<12}{:<12}{:<10}{:<12}",
                    p.policy_id,
                    p.client_id,
                    p.policy_type,
                    p.monthly_premium,
                    p.duration_months,
                    p.start_date
                );
            }
        }
        Report::Expiring { window_end, rows } => {
            println!("Window End: {}", window_end);
            println!("{:<10}{:<8}{:<22}{:<12}", "PolicyID", "Client", "ClientName", "EndDate");
            for r in rows {
                println!(
                    "{:<10}{:<8}{:<22}{:<12}",
                    r.policy_id,
                    r.client_id,
                    r.client_name,
                    r.end_date.to_string()
                );
            }
        }
        Report::Unpaid { rows } => {
            println!("{:<8}{:<22}{:<12}{:<12}", "Client", "Name", "PolicyID", "Remaining");
            for r in rows {
                println!(
                    "{:<8}{:<22}{:<12}{:<12}",
                    r.client_id, r.client_name, r.policy_id, r.remaining
                );
            }
        }
    }
}
