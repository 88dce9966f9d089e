use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use carchain_ledger::{
    Block, Durability, Ledger, LedgerError, LedgerReader, LedgerWriter, LoadOutcome,
};
use carchain_server::{CarchainServer, ServerConfig};
use carchain_store::FileChainStore;
use carchain_types::{SubjectId, TelemetryRecord};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Submit(args) => cmd_submit(&open(&config)?, args, format),
        Command::History(args) => cmd_history(&read_only(&config)?, args, format),
        Command::Verify => cmd_verify(&config, format),
        Command::Status => cmd_status(&read_only(&config)?, format),
        Command::Dump => cmd_dump(&read_only(&config)?, format),
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(chain) = &cli.chain {
        config.chain_path = chain.clone();
    }
    if let Command::Serve(ServeArgs { bind: Some(bind) }) = &cli.command {
        config.bind_addr = *bind;
    }
    Ok(config)
}

/// Open the chain file for reading. It is never repaired or rewritten.
fn inspect(config: &ServerConfig) -> Result<Ledger, LedgerError> {
    let store = FileChainStore::new(&config.chain_path)?;
    Ledger::open_existing(store)
}

fn read_only(config: &ServerConfig) -> anyhow::Result<Ledger> {
    inspect(config).with_context(|| format!("reading {}", config.chain_path.display()))
}

/// Open the chain file for appending, starting over if it is absent or rejected.
fn open(config: &ServerConfig) -> anyhow::Result<Ledger> {
    let (ledger, outcome) = CarchainServer::new(config.clone())
        .open_ledger()
        .with_context(|| format!("opening {}", config.chain_path.display()))?;
    if let LoadOutcome::Corrupted { reason } = &outcome {
        eprintln!(
            "{} {} was rejected ({reason}); started a fresh chain",
            "warning:".yellow().bold(),
            config.chain_path.display()
        );
    }
    Ok(ledger)
}

fn cmd_serve(config: ServerConfig, _args: ServeArgs) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(CarchainServer::new(config).serve())?;
    Ok(())
}

fn cmd_submit(ledger: &Ledger, args: SubmitArgs, format: OutputFormat) -> anyhow::Result<()> {
    let subject = SubjectId::new(args.car_id.trim())?;
    let record: TelemetryRecord =
        serde_json::from_str(&args.record).context("parsing telemetry record")?;
    let receipt = ledger.append(subject, record)?;

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "block": receipt.block,
                "persisted": receipt.is_persisted(),
            }))?
        );
        return Ok(());
    }
    println!(
        "{} Block {} appended",
        "✓".green().bold(),
        format!("#{}", receipt.block.index()).yellow()
    );
    println!("  Hash: {}", receipt.block.hash().to_string().cyan());
    if let Durability::Volatile { reason } = &receipt.durability {
        println!("  {} not persisted: {reason}", "!".red().bold());
    }
    Ok(())
}

fn cmd_history(ledger: &Ledger, args: HistoryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let subject = SubjectId::new(args.car_id.trim())?;
    let history = ledger.history(&subject, args.date)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }
    if history.is_empty() {
        println!("No records for {}.", subject.to_string().bold());
        return Ok(());
    }
    for block in &history {
        print_block(block);
    }
    println!("{} record(s) for {}", history.len(), subject.to_string().bold());
    Ok(())
}

fn cmd_verify(config: &ServerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (valid, length, reason) = match inspect(config) {
        Ok(ledger) => {
            let status = ledger.status()?;
            (status.valid, Some(status.size), None)
        }
        Err(LedgerError::Corrupted { reason }) => (false, None, Some(reason)),
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", config.chain_path.display()))
        }
    };

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "valid": valid,
                "chain_length": length,
                "reason": reason,
            }))?
        );
    } else if valid {
        println!("{} Chain integrity verified", "✓".green().bold());
        println!("  Blocks: {}", length.unwrap_or_default().to_string().bold());
    } else {
        println!("{} Chain integrity check failed", "✗".red().bold());
        if let Some(reason) = &reason {
            println!("  Reason: {}", reason.red());
        }
    }

    if !valid {
        anyhow::bail!(
            "chain verification failed for {}",
            config.chain_path.display()
        );
    }
    Ok(())
}

fn cmd_status(ledger: &Ledger, format: OutputFormat) -> anyhow::Result<()> {
    let status = ledger.status()?;

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "blockchain_size": status.size,
                "genesis_block": status.genesis,
                "latest_block": status.latest,
                "is_valid": status.valid,
            }))?
        );
        return Ok(());
    }
    println!("Blocks: {}", status.size.to_string().bold());
    println!("Genesis: {}", status.genesis.hash().short_hex().cyan());
    println!(
        "Latest: {} {}",
        format!("#{}", status.latest.index()).yellow(),
        status.latest.hash().short_hex().cyan()
    );
    let integrity = if status.valid { "✓".green() } else { "✗".red() };
    println!("Integrity: {integrity}");
    Ok(())
}

fn cmd_dump(ledger: &Ledger, format: OutputFormat) -> anyhow::Result<()> {
    let blocks = ledger.blocks()?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }
    for block in &blocks {
        print_block(block);
    }
    Ok(())
}

fn print_block(block: &Block) {
    println!(
        "{}  {}  {}",
        format!("#{}", block.index()).yellow().bold(),
        block.hash().short_hex().dimmed(),
        block.timestamp()
    );
    match block.payload().record() {
        Some(record) => {
            let car = block.payload().subject().map(|s| s.to_string()).unwrap_or_default();
            println!("  Car: {}", car.bold());
            println!(
                "  Engine: {}  Fault: {}  Mileage: {}",
                if record.engine_on { "on".green() } else { "off".dimmed() },
                if record.fault { "yes".red() } else { "no".green() },
                record.mileage
            );
        }
        None => println!("  {}", "genesis".dimmed()),
    }
}
