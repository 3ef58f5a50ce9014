mod bootstrap;

use anyhow::Result;
use casting_client::{ContractHandle, SessionManager};
use casting_core::settings::Settings;
use casting_runtime::{DatasetView, ViewPhase};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("casting-ledger v{} starting", env!("CARGO_PKG_VERSION"));

    // Startup failures (no wallet runtime, rejected authorization) block
    // everything and are surfaced directly to the user.
    let manager = match SessionManager::from_settings(&settings) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    tracing::info!("requesting wallet authorization (approve the prompt in your wallet)");
    let session = match manager.connect().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let contract = ContractHandle::new(session);

    let mut view = DatasetView::new();
    view.load_snapshot(&contract).await;
    print_snapshot(&view);

    tokio::select! {
        result = command_loop(&contract, &mut view) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            Ok(())
        }
    }
}

/// Read commands from stdin until EOF or `quit`.
///
/// - an integer: look up that logical index
/// - `push <temperature> <humidity>`: append a reading
/// - `reload`: re-run the snapshot load
/// - `quit` / `q`: exit
async fn command_loop(contract: &ContractHandle, view: &mut DatasetView) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt().await?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input.split_whitespace().collect::<Vec<_>>().as_slice() {
            [] => {}
            ["quit"] | ["q"] | ["exit"] => break,
            ["reload"] => {
                view.load_snapshot(contract).await;
                print_snapshot(view);
            }
            ["push", temperature, humidity] => match contract.push_data(temperature, humidity).await {
                Ok(tx) => println!("submitted: {tx}"),
                Err(e) => println!("push failed: {e}"),
            },
            [raw] => match raw.parse::<i64>() {
                Ok(index) => {
                    run_lookup(contract, view, index).await;
                }
                Err(_) => println!("unrecognised command: {input}"),
            },
            _ => println!("unrecognised command: {input}"),
        }
        prompt().await?;
    }

    Ok(())
}

/// One user-triggered index lookup, rendered the way the lookup card shows
/// it: a rejected index is reported immediately, a failed fetch shows
/// nothing.
async fn run_lookup(contract: &ContractHandle, view: &mut DatasetView, index: i64) {
    match view.lookup_by_index(contract, index).await {
        Ok(()) => match view.last_lookup() {
            Some(result) => {
                println!("Entry {}:", result.requested_index);
                println!("  Temperature: {}", result.entry.temperature);
                println!("  Humidity:    {}", result.entry.humidity);
            }
            None => println!("no entry available for index {index}"),
        },
        Err(e) => println!("{e}"),
    }
}

fn print_snapshot(view: &DatasetView) {
    if view.phase() == ViewPhase::Degraded {
        println!("(snapshot load failed; showing last known state)");
    }
    println!("Total entries: {}", view.total_entries());
    match view.latest_entry() {
        Some(entry) => {
            println!("Latest entry:");
            println!("  Temperature: {}", entry.temperature);
            println!("  Humidity:    {}", entry.humidity);
        }
        None => println!("Latest entry: (none)"),
    }
}

async fn prompt() -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await?;
    Ok(())
}
