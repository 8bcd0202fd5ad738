//! Wallshift CLI - rotate wallpapers across displays.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use console::style;
use tokio::sync::watch;
use tracing::{error, info};

use wsh::cli::{Cli, Commands, ConfigArgs, CurrentArgs, ListArgs, ListCommands, SetArgs, WatchArgs};
use wsh::config::{Config, Overrides};
use wsh::engine;
use wsh::error::{Result, WshError};
use wsh::logging;
use wsh::session::Session;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }

    logging::init_logging(cli.use_json(), cli.verbose, cli.quiet);

    if let Err(e) = run(&cli).await {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => cmd_set(cli, &SetArgs::default()).await,
        Some(Commands::Set(args)) => cmd_set(cli, args).await,
        Some(Commands::Watch(args)) => cmd_watch(cli, args).await,
        Some(Commands::Current(args)) => cmd_current(cli, args),
        Some(Commands::View(args)) => cmd_view(cli, args),
        Some(Commands::Blacklist(args)) => cmd_blacklist(cli, args).await,
        Some(Commands::List(args)) => cmd_list(cli, args),
        Some(Commands::Config(args)) => cmd_config(cli, args),
        Some(Commands::Completions(args)) => cmd_completions(args),
    }
}

/// Load the config file and merge CLI overrides over it.
fn load_config(cli: &Cli, overrides: Overrides) -> Result<Config> {
    let cfg = Config::load(cli.config.as_deref())?.merge(overrides);
    cfg.validate()?;
    Ok(cfg)
}

fn base_overrides(cli: &Cli) -> Overrides {
    Overrides {
        display: cli.display.clone(),
        ..Default::default()
    }
}

/// Resolve the display reference for single-display commands: an explicit
/// argument wins, then the global flag, then the session's first display.
fn resolve_reference(session: &Session, explicit: Option<&str>, cli: &Cli) -> Result<String> {
    if let Some(reference) = explicit {
        return Ok(reference.to_string());
    }
    if let Some(reference) = &cli.display {
        return Ok(reference.clone());
    }
    session
        .displays()
        .first()
        .map(|d| d.index.to_string())
        .ok_or_else(|| WshError::DisplayNotFound {
            display: "0".to_string(),
        })
}

// === Commands ===

async fn cmd_set(cli: &Cli, args: &SetArgs) -> Result<()> {
    let cfg = load_config(
        cli,
        Overrides {
            sources: args.sources.clone(),
            display: cli.display.clone(),
            interval: args.interval,
            ignore_history: args.ignore_history,
            no_track: args.no_track,
        },
    )?;

    let persistent = cfg.interval > 0 && !args.once;
    let session = Arc::new(Session::new(cfg)?);

    session.rotate_now(None).await?;
    report_current(cli, &session);

    if persistent {
        run_schedule(session).await?;
    }
    Ok(())
}

async fn cmd_watch(cli: &Cli, args: &WatchArgs) -> Result<()> {
    let mut overrides = base_overrides(cli);
    overrides.interval = args.interval;
    let cfg = load_config(cli, overrides)?;

    let session = Arc::new(Session::new(cfg)?);

    // First rotation happens immediately; later ones follow the ticker.
    if let Err(e) = session.rotate_now(None).await {
        error!(error = %e, "initial rotation failed");
    }

    run_schedule(session).await
}

/// Drive the engine until an interrupt arrives.
async fn run_schedule(session: Arc<Session>) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine::run(session, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("interrupt received; shutting down");
    let _ = shutdown_tx.send(true);

    engine_task
        .await
        .map_err(|e| WshError::Other(format!("engine task failed: {e}")))?
}

fn cmd_current(cli: &Cli, args: &CurrentArgs) -> Result<()> {
    let session = Session::new(load_config(cli, base_overrides(cli))?)?;
    let reference = resolve_reference(&session, args.target.as_deref(), cli)?;
    let path = session.current_wallpaper(&reference)?;

    if cli.use_json() {
        println!(
            "{}",
            serde_json::json!({ "display": reference, "path": path })
        );
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_view(cli: &Cli, args: &CurrentArgs) -> Result<()> {
    let session = Session::new(load_config(cli, base_overrides(cli))?)?;
    let reference = resolve_reference(&session, args.target.as_deref(), cli)?;
    let path = session.current_wallpaper(&reference)?;
    session.view(&path)
}

async fn cmd_blacklist(cli: &Cli, args: &CurrentArgs) -> Result<()> {
    let session = Session::new(load_config(cli, base_overrides(cli))?)?;
    let reference = resolve_reference(&session, args.target.as_deref(), cli)?;
    session.blacklist(&reference).await
}

fn cmd_list(cli: &Cli, args: &ListArgs) -> Result<()> {
    let session = Session::new(load_config(cli, base_overrides(cli))?)?;

    match &args.command {
        ListCommands::Ls { name: None } => {
            let names = session.list_names()?;
            if cli.use_json() {
                println!("{}", serde_json::to_string_pretty(&names).unwrap_or_default());
            } else {
                println!("{}", style(format!("Lists ({})", names.len())).bold());
                for name in names {
                    println!("{name}");
                }
            }
        }
        ListCommands::Ls { name: Some(name) } => {
            let list = session.read_list(name)?;
            if cli.use_json() {
                println!("{}", serde_json::to_string_pretty(&list).unwrap_or_default());
            } else {
                println!("{}", style(format!("{name} ({})", list.len())).bold());
                for image in list {
                    println!("{}", image.path.display());
                }
            }
        }
        ListCommands::Add { name, image } => {
            let path = match image {
                Some(path) => path.clone(),
                None => {
                    let reference = resolve_reference(&session, None, cli)?;
                    session.current_wallpaper(&reference)?
                }
            };
            session.add_to_list(name, &path)?;
            if !cli.quiet {
                println!("added {} to {name}", path.display());
            }
        }
    }
    Ok(())
}

fn cmd_config(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    if args.path {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(Config::default_path);
        println!("{}", path.display());
        return Ok(());
    }

    let cfg = load_config(cli, base_overrides(cli))?;
    if cli.use_json() {
        println!("{}", serde_json::to_string_pretty(&cfg).unwrap_or_default());
    } else {
        let yaml = serde_yaml::to_string(&cfg).map_err(|e| WshError::ConfigParse(e.to_string()))?;
        print!("{yaml}");
    }
    Ok(())
}

fn cmd_completions(args: &wsh::cli::CompletionsArgs) -> Result<()> {
    clap_complete::generate(args.shell, &mut Cli::command(), "wsh", &mut io::stdout());
    Ok(())
}

// === Output helpers ===

/// Best-effort report of what each display now shows.
fn report_current(cli: &Cli, session: &Session) {
    let displays = session.displays();

    if cli.use_json() {
        let entries: Vec<serde_json::Value> = displays
            .iter()
            .map(|d| {
                let path = session
                    .current_wallpaper(&d.index.to_string())
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                serde_json::json!({ "display": d.key(), "name": d.name, "path": path })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).unwrap_or_default()
        );
        return;
    }

    if cli.quiet {
        return;
    }
    for d in &displays {
        if let Ok(path) = session.current_wallpaper(&d.index.to_string()) {
            println!("{} {}", style(format!("{}:", d.name)).green(), path.display());
        }
    }
}

fn output_error(cli: &Cli, err: &WshError) {
    if cli.use_json() {
        let payload = serde_json::json!({
            "error": err.to_string(),
            "recoverable": err.is_user_recoverable(),
            "suggestion": err.suggestion(),
        });
        eprintln!("{payload}");
        return;
    }

    eprintln!("{} {err}", style("error:").red().bold());
    if let Some(suggestion) = err.suggestion() {
        eprintln!("  {} {suggestion}", style("hint:").yellow());
    }
}
