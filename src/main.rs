use std::future::Future;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::future::join_all;
use tokio::io::{AsyncBufReadExt, BufReader};

use sanguine::banner::{BannerInfo, print_banner, print_session_summary};
use sanguine::consts::{DEFAULT_FAILURE_RATE, DEFAULT_LATENCY_MS};
use sanguine::events::Event;
use sanguine::fault::{FaultInjector, FaultPlan};
use sanguine::item::ViewItem;
use sanguine::server::{self, AppState};
use sanguine::session::{Outcome, Session};
use sanguine::spinner::Spinner;
use sanguine::store::sqlite::SqliteStore;
use sanguine::store::{MemoryStore, Store};
use sanguine::transport::Transport;
use sanguine::transport::http::HttpTransport;
use sanguine::transport::stub::StubTransport;

#[derive(Parser)]
#[command(name = "sanguine", version, about = "Believe first, reconcile later.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Simulated network latency in milliseconds
    #[arg(short, long, global = true, default_value_t = DEFAULT_LATENCY_MS)]
    latency_ms: u64,

    /// Probability that a simulated mutation fails (0.0 to 1.0)
    #[arg(short, long, global = true, default_value_t = DEFAULT_FAILURE_RATE)]
    failure_rate: f64,

    /// SQLite path backing the local store (ephemeral in-memory if omitted)
    #[arg(short, long, global = true)]
    db: Option<String>,

    /// Start the local store empty instead of seeded
    #[arg(long, global = true, default_value_t = false)]
    no_seed: bool,

    /// Base URL of a remote items server (e.g. http://127.0.0.1:3000)
    #[arg(short, long)]
    remote: Option<String>,

    /// Run a single command and exit (e.g. --run "add Buy milk")
    #[arg(long)]
    run: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Host the items API over HTTP
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Fire overlapping mutations and watch their completions race
    Demo {
        /// How many items to add on top of toggling every seeded one
        #[arg(short, long, default_value_t = 3)]
        count: usize,
    },
}

fn build_store(db: &Option<String>, no_seed: bool) -> anyhow::Result<(Arc<dyn Store>, String)> {
    let (store, label): (Arc<dyn Store>, String) = match db {
        Some(path) => (Arc::new(SqliteStore::open(path)?), path.clone()),
        None if no_seed => (Arc::new(MemoryStore::new()), "ephemeral".to_string()),
        None => (
            Arc::new(MemoryStore::seeded()),
            "ephemeral (seeded)".to_string(),
        ),
    };
    Ok((store, label))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let latency = Duration::from_millis(cli.latency_ms);

    if let Some(command) = &cli.command {
        match command {
            Command::Serve { addr } => {
                let (store, _) = build_store(&cli.db, cli.no_seed)?;
                let state = Arc::new(AppState {
                    store,
                    latency,
                    faults: Arc::new(FaultInjector::new(FaultPlan::Random(cli.failure_rate))),
                });
                return server::serve(*addr, state).await;
            }
            Command::Demo { count } => return run_demo(&cli, *count).await,
        }
    }

    // Wire up the transport: a remote server, or the local simulated one.
    let (transport, transport_label, store_label): (Box<dyn Transport>, String, String) =
        match &cli.remote {
            Some(url) => (
                Box::new(HttpTransport::new(url.clone())),
                url.clone(),
                "remote".to_string(),
            ),
            None => {
                let (store, store_label) = build_store(&cli.db, cli.no_seed)?;
                let faults = Arc::new(FaultInjector::new(FaultPlan::Random(cli.failure_rate)));
                (
                    Box::new(StubTransport::new(store, latency, faults)),
                    "local stub".to_string(),
                    store_label,
                )
            }
        };

    let (latency_label, faults_label) = if cli.remote.is_some() {
        ("server-side".to_string(), "server-side".to_string())
    } else {
        (
            format!("{}ms", cli.latency_ms),
            format!("random {:.0}%", cli.failure_rate * 100.0),
        )
    };

    print_banner(&BannerInfo {
        transport: &transport_label,
        store: &store_label,
        latency: &latency_label,
        faults: &faults_label,
    });

    let session = Session::new(transport);

    // First paint comes from the authoritative list.
    let spinner = Spinner::start("fetching");
    let first = session.refresh().await;
    spinner.stop().await;
    match first {
        Ok(view) => print_view(&view),
        Err(e) => eprintln!("fetch failed: {e}"),
    }

    // Single command mode
    if let Some(line) = cli.run {
        execute(&session, line.trim()).await;
        print_session_summary(session.stats());
        return Ok(());
    }

    println!("\ntype `help` for commands");

    // REPL — async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nsanguine> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        execute(&session, input).await;
    }

    print_session_summary(session.stats());
    Ok(())
}

async fn execute(session: &Session, input: &str) {
    let (verb, rest) = match input.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (input, ""),
    };

    match verb {
        "help" => print_help(),
        "list" => print_view(&session.view()),
        "stats" => {
            let stats = session.stats();
            println!(
                "  {} confirmed, {} rolled back, {} rejected",
                stats.confirmed, stats.rolled_back, stats.rejected
            );
        }
        "refresh" => {
            let spinner = Spinner::start("fetching");
            let result = session.refresh().await;
            spinner.stop().await;
            match result {
                Ok(view) => print_view(&view),
                Err(e) => eprintln!("fetch failed: {e}"),
            }
        }
        "add" => settle(session, session.add(rest)).await,
        "toggle" => match rest.parse::<i64>() {
            Ok(id) => settle(session, session.toggle(id)).await,
            Err(_) => eprintln!("usage: toggle <id>"),
        },
        "edit" => match rest.split_once(' ') {
            Some((id, text)) => match id.parse::<i64>() {
                Ok(id) => settle(session, session.update(id, text.trim())).await,
                Err(_) => eprintln!("usage: edit <id> <text>"),
            },
            None => eprintln!("usage: edit <id> <text>"),
        },
        "rm" => match rest.parse::<i64>() {
            Ok(id) => settle(session, session.delete(id)).await,
            Err(_) => eprintln!("usage: rm <id>"),
        },
        _ => eprintln!("unknown command: {verb} (try `help`)"),
    }
}

/// Drive a mutation to settlement. The future is polled once up front: that
/// runs the optimistic apply to the transport's first suspension, so the
/// pending entry is painted before the server has answered.
async fn settle<F>(session: &Session, fut: F)
where
    F: Future<Output = Outcome>,
{
    let mut fut = Box::pin(fut);
    let outcome = match futures::poll!(fut.as_mut()) {
        Poll::Ready(outcome) => outcome,
        Poll::Pending => {
            print_view(&session.view());
            let spinner = Spinner::start("settling");
            let outcome = fut.as_mut().await;
            spinner.stop().await;
            outcome
        }
    };

    match outcome {
        Outcome::Confirmed => {
            println!("confirmed:");
            print_view(&session.view());
        }
        Outcome::RolledBack { error } => {
            eprintln!("rolled back: {error}");
            print_view(&session.view());
        }
        Outcome::Rejected { error } => eprintln!("rejected: {error}"),
    }
}

/// Fire a burst of overlapping mutations against the local stub and watch
/// completions race. Later settlements win; the final view is whatever the
/// server confirmed last.
async fn run_demo(cli: &Cli, count: usize) -> anyhow::Result<()> {
    let (store, _) = build_store(&cli.db, cli.no_seed)?;
    let faults = Arc::new(FaultInjector::new(FaultPlan::Random(cli.failure_rate)));
    let latency = Duration::from_millis(cli.latency_ms);
    let session = Session::new(Box::new(StubTransport::new(store, latency, faults)));

    session.refresh().await?;
    println!("starting from:");
    print_view(&session.view());

    let mut rx = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                Event::Confirmed { action } => println!("  ✓ {action}"),
                Event::RolledBack { action, error } => println!("  ✗ {action}: {error}"),
            }
        }
    });

    let texts: Vec<String> = (1..=count).map(|i| format!("Demo item number {i}")).collect();
    let ids: Vec<i64> = session.authoritative().iter().map(|i| i.id).collect();

    let mut in_flight: Vec<Pin<Box<dyn Future<Output = Outcome> + '_>>> = Vec::new();
    for text in &texts {
        in_flight.push(Box::pin(session.add(text)));
    }
    for id in &ids {
        in_flight.push(Box::pin(session.toggle(*id)));
    }

    // One poll each gets every optimistic entry on screen before anything
    // settles.
    for fut in &mut in_flight {
        let _ = futures::poll!(fut.as_mut());
    }
    println!("\n{} mutations in flight:", in_flight.len());
    print_view(&session.view());

    println!();
    let outcomes = join_all(in_flight).await;
    let confirmed = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Confirmed))
        .count();

    println!("\nsettled ({confirmed}/{} confirmed):", outcomes.len());
    print_view(&session.view());

    printer.abort();
    print_session_summary(session.stats());
    Ok(())
}

fn print_view(view: &[ViewItem]) {
    if view.is_empty() {
        println!("  (no items)");
        return;
    }
    for v in view {
        let mark = if v.item.completed { "x" } else { " " };
        // Placeholder ids are noise; show them as `?` until the server
        // hands out the real one.
        let id = if v.item.id < 0 {
            "?".to_string()
        } else {
            v.item.id.to_string()
        };
        let saving = if v.pending { "  (saving…)" } else { "" };
        println!("  [{mark}] {id:>3}  {}{saving}", v.item.text);
    }
}

fn print_help() {
    println!("  list              show the current view");
    println!("  add <text>        add an item, optimistically");
    println!("  toggle <id>       flip an item's completed state");
    println!("  edit <id> <text>  rewrite an item's text");
    println!("  rm <id>           remove an item");
    println!("  refresh           re-pull the authoritative list");
    println!("  stats             mutation tally so far");
    println!("  quit              leave");
}
