use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use listener_rs::view::{truncate_string, FeedbackDriver, ListenerView};
use listener_rs::{
    logging, Command, CommandOutcome, HttpCatalog, ListenerConfig, SessionCoordinator,
    SessionState, SimulatedEngine,
};

const TITLE_WIDTH: usize = 32;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _log_guard = match logging::init_logging(&ListenerConfig::log_dir_from_env()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== Listener Starting ===");

    let config = ListenerConfig::from_env();
    tracing::debug!(?config, "Configuration");

    // No audio device here: the simulated engine provides the playback clock
    let engine = Arc::new(SimulatedEngine::with_clock(config.progress_tick));
    let coordinator = SessionCoordinator::new(engine);
    let source = HttpCatalog::new(&config)?;

    println!("Loading songs from {} ...", config.catalog_url);

    // Load in the background so a hung request only blocks the session
    let coordinator_for_boot = coordinator.clone();
    let boot = tokio::spawn(async move {
        match coordinator_for_boot.bootstrap(&source).await {
            Ok(()) => {
                let session = coordinator_for_boot.snapshot().await;
                println!("{} songs loaded. Type 'l' to list them.", session.track_count());
            }
            Err(e) => println!("{}", SessionCoordinator::format_error(&e)),
        }
    });

    let feedback = tokio::spawn(run_feedback(coordinator.clone(), config.clone()));

    let res = run_console(&coordinator, &config).await;

    if let Err(e) = coordinator.shutdown().await {
        tracing::warn!(error = %e, "Shutdown reported an error");
    }
    boot.abort();
    for joined in futures::future::join_all([boot, feedback]).await {
        if let Err(e) = joined {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "Background task ended abnormally");
            }
        }
    }

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Listener shutting down");
    Ok(())
}

/// Print a toast whenever buffering starts while playing
async fn run_feedback(coordinator: SessionCoordinator, config: ListenerConfig) {
    let mut updates = coordinator.subscribe();
    let mut driver = FeedbackDriver::new(config.rotation_period, config.toast_duration);

    while updates.changed().await.is_ok() {
        let session = updates.borrow_and_update().clone();
        if session.state == SessionState::Closed {
            break;
        }
        if let Some(toast) = driver.observe(&session).toast {
            println!("  ({})", toast.message);
        }
    }
}

async fn run_console(coordinator: &SessionCoordinator, config: &ListenerConfig) -> Result<()> {
    println!("Commands: p play/pause, n next, b previous, <number> select, l list, s status, q quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            if !line.trim().is_empty() {
                println!("Unknown command: {}", line.trim());
            }
            continue;
        };

        let outcome = match coordinator.handle_command(command).await {
            Ok(outcome) => outcome,
            Err(e) => {
                println!("{}", SessionCoordinator::format_error(&e));
                continue;
            }
        };

        let view = ListenerView::project(&coordinator.snapshot().await, config.rotation_period);
        match outcome {
            CommandOutcome::ShowStatus => println!("{}", view.status_line()),
            CommandOutcome::ShowList => print_list(&view),
            CommandOutcome::Quit => break,
        }
    }

    Ok(())
}

fn print_list(view: &ListenerView) {
    if view.rows.is_empty() {
        println!(" (no songs)");
        return;
    }
    for row in &view.rows {
        let marker = if row.is_current { '*' } else { ' ' };
        println!(
            "{}{:>4}  {:<width$}  {}   {}",
            marker,
            row.index + 1,
            truncate_string(&row.title, TITLE_WIDTH),
            row.artist,
            row.duration,
            width = TITLE_WIDTH
        );
    }
}
