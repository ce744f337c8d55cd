//! phrase-wallet: recover a checksum word, inspect and spend a phrase wallet.
//!
//! The phrase is read from `WORDS` (environment or `.env`); network and
//! endpoint come from `MAINNET`, `ESPLORA_URL`, `FEE_SATS`.

use std::env;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use phrase_wallet::{
    english_wordlist, resolve_checksum_word, Phrase, WalletConfig, WalletManager,
};

#[derive(Parser)]
#[command(name = "phrase-wallet")]
#[command(version, about = "Recover a checksum word and send Bitcoin from a phrase")]
struct Cli {
    /// Use mainnet instead of testnet (overrides MAINNET).
    #[arg(long, global = true)]
    mainnet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover the 12th word from the first 11 words of WORDS.
    Resolve,
    /// Show the wallet address.
    Address,
    /// Query the address balance.
    Balance,
    /// Send a transaction.
    Send(SendArgs),
}

#[derive(Args)]
struct SendArgs {
    /// Recipient address.
    #[arg(short, long)]
    to: String,

    /// Amount to send in sats.
    #[arg(short, long)]
    amount: u64,

    /// Fixed fee in sats (default: FEE_SATS or 1000).
    #[arg(short, long)]
    fee: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = WalletConfig::from_env();
    if cli.mainnet && !config.is_mainnet() {
        config = WalletConfig::new(true).with_env_overrides();
    }

    let words = env::var("WORDS").unwrap_or_default();

    match cli.command {
        Commands::Resolve => resolve(&words),
        Commands::Address => address(config, &words),
        Commands::Balance => balance(config, &words).await,
        Commands::Send(args) => send(config, &words, args).await,
    }
}

fn load_phrase(words: &str) -> Result<Phrase> {
    Phrase::parse(words, english_wordlist()).context("Invalid recovery phrase in WORDS")
}

fn resolve(words: &str) -> Result<()> {
    let eleven: Vec<&str> = words.split_whitespace().take(11).collect();
    let word = resolve_checksum_word(&eleven, english_wordlist())
        .context("Failed to recover checksum word")?;
    println!("New: {}", word);
    Ok(())
}

fn address(config: WalletConfig, words: &str) -> Result<()> {
    let phrase = load_phrase(words)?;
    if let Some(word) = phrase.resolved_word() {
        println!("New: {}", word);
    }
    let wallet = WalletManager::new(config, &phrase)?;
    println!("Addr: {}", wallet.address());
    Ok(())
}

async fn balance(config: WalletConfig, words: &str) -> Result<()> {
    let phrase = load_phrase(words)?;
    let wallet = WalletManager::new(config, &phrase)?;
    println!("Addr: {}", wallet.address());

    let balance = wallet.balance().await.context("Failed to query balance")?;
    println!(
        "{} - {} [{}]",
        balance.funded_sats, balance.spent_sats, balance.tx_count
    );
    println!("Balance: {} sats", balance.balance_sats());
    Ok(())
}

async fn send(mut config: WalletConfig, words: &str, args: SendArgs) -> Result<()> {
    if let Some(fee) = args.fee {
        config.fee_sats = fee;
    }

    let phrase = load_phrase(words)?;
    let wallet = WalletManager::new(config, &phrase)?;
    println!("Sending {} sats to {}...", args.amount, args.to);

    let receipt = wallet
        .send(&args.to, args.amount)
        .await
        .with_context(|| format!("Failed to send {} sats to {}", args.amount, args.to))?;

    println!("Transaction broadcasted!");
    println!("TXID: {}", receipt.txid);
    Ok(())
}
