use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use mollie_ideal::application::engine::PaymentEngine;
use mollie_ideal::application::gateway::GatewayClient;
use mollie_ideal::config::{
    ENV_ENDPOINT, ENV_MAX_ATTEMPTS, ENV_PARTNER_ID, ENV_PROFILE_KEY, ENV_REPORT_URL,
    ENV_RETURN_URL, ENV_REVERSE_URLS, ENV_SITE_URL, ENV_TIMEOUT_SECS, GatewaySettings,
};
use mollie_ideal::domain::bank::BankId;
use mollie_ideal::domain::payment::{Amount, Description, PaymentRecord};
use mollie_ideal::domain::ports::PaymentStoreBox;
use mollie_ideal::infrastructure::http::HttpTransport;
use mollie_ideal::infrastructure::in_memory::InMemoryPaymentStore;
use mollie_ideal::interfaces::csv::payment_writer::PaymentWriter;
use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Start and verify iDEAL payments through the Mollie XML gateway", long_about = None)]
struct Cli {
    #[command(flatten)]
    gateway: GatewayArgs,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Command-line overrides for the `MOLLIE_*` environment settings.
#[derive(Args)]
struct GatewayArgs {
    /// Partner id issued by the gateway [env: MOLLIE_PARTNER_ID]
    #[arg(long, global = true)]
    partner_id: Option<String>,

    /// Optional website profile key [env: MOLLIE_PROFILE_KEY]
    #[arg(long, global = true)]
    profile_key: Option<String>,

    /// Report callback URL, or a route with --reverse-urls [env: MOLLIE_REPORT_URL]
    #[arg(long, global = true)]
    report_url: Option<String>,

    /// Consumer return URL, or a route with --reverse-urls [env: MOLLIE_RETURN_URL]
    #[arg(long, global = true)]
    return_url: Option<String>,

    /// Resolve callback URLs as routes on the site URL [env: MOLLIE_REVERSE_URLS]
    #[arg(long, global = true)]
    reverse_urls: bool,

    /// Base URL of the implementing site [env: MOLLIE_IMPLEMENTING_SITE_URL]
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// Gateway endpoint [env: MOLLIE_ENDPOINT]
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// HTTP timeout per attempt, in seconds [env: MOLLIE_TIMEOUT_SECS]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Attempts before giving up on empty gateway responses [env: MOLLIE_MAX_ATTEMPTS]
    #[arg(long, global = true)]
    max_attempts: Option<usize>,
}

impl GatewayArgs {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            ENV_PARTNER_ID => self.partner_id.clone(),
            ENV_PROFILE_KEY => self.profile_key.clone(),
            ENV_REPORT_URL => self.report_url.clone(),
            ENV_RETURN_URL => self.return_url.clone(),
            ENV_REVERSE_URLS => self.reverse_urls.then(|| "true".to_string()),
            ENV_SITE_URL => self.site_url.clone(),
            ENV_ENDPOINT => self.endpoint.clone(),
            ENV_TIMEOUT_SECS => self.timeout_secs.map(|secs| secs.to_string()),
            ENV_MAX_ATTEMPTS => self.max_attempts.map(|n| n.to_string()),
            _ => None,
        }
    }

    fn settings(&self) -> Result<GatewaySettings> {
        GatewaySettings::from_env_with(|key| self.get(key)).into_diagnostic()
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a payment and print the bank redirect URL
    Initiate {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        amount: Decimal,
        /// Four-digit iDEAL bank code
        #[arg(long)]
        bank: String,
        #[arg(long)]
        description: String,
    },
    /// Check whether a payment has been made
    Check {
        #[arg(long, conflicts_with = "transaction_id", required_unless_present = "transaction_id")]
        id: Option<u64>,
        #[arg(long)]
        transaction_id: Option<String>,
    },
    /// List the banks the gateway currently offers
    Banks,
    /// Print all stored payments as CSV
    List,
}

fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = mollie_ideal::infrastructure::rocksdb::RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryPaymentStore::new()))
        }
        None => Ok(Box::new(InMemoryPaymentStore::new())),
    }
}

fn build_engine(args: &GatewayArgs, store: PaymentStoreBox) -> Result<PaymentEngine> {
    let settings = args.settings()?;
    let transport = HttpTransport::new(&settings).into_diagnostic()?;
    let gateway = GatewayClient::from_settings(Box::new(transport), &settings);
    Ok(PaymentEngine::new(store, gateway, settings))
}

/// `paid` or `not paid`, followed by the stored gateway status.
fn check_summary(paid: bool, record: &PaymentRecord) -> String {
    let status = record.status().map(|s| s.as_str()).unwrap_or("unknown");
    format!("{}\t{status}", if paid { "paid" } else { "not paid" })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.db_path)?;

    match cli.command {
        Command::List => {
            let payments = store.get_all().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = PaymentWriter::new(stdout.lock());
            writer.write_payments(payments).into_diagnostic()?;
        }
        Command::Initiate {
            id,
            amount,
            bank,
            description,
        } => {
            // Local input is validated before anything touches the network.
            let mut record = PaymentRecord::new(
                id,
                Amount::new(amount).into_diagnostic()?,
                bank.parse::<BankId>().into_diagnostic()?,
                Description::new(description).into_diagnostic()?,
            );
            let engine = build_engine(&cli.gateway, store)?;
            engine.create(record.clone()).await.into_diagnostic()?;
            let url = engine.initiate(&mut record).await.into_diagnostic()?;
            println!("{}", record.transaction_id().unwrap_or_default());
            println!("{url}");
        }
        Command::Check { id, transaction_id } => {
            let engine = build_engine(&cli.gateway, store)?;
            let mut record = match (id, transaction_id) {
                (Some(id), _) => engine.load(id).await,
                (None, Some(tx)) => engine.find_by_transaction(&tx).await,
                (None, None) => return Err(miette::miette!("Either --id or --transaction-id is required")),
            }
            .into_diagnostic()?;
            let paid = engine.check_status(&mut record).await.into_diagnostic()?;
            println!("{}", check_summary(paid, &record));
        }
        Command::Banks => {
            let engine = build_engine(&cli.gateway, store)?;
            for bank in engine.bank_list().await.into_diagnostic()? {
                println!("{}\t{}", bank.bank_id, bank.bank_name);
            }
        }
    }

    Ok(())
}
