use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};

use chrono::NaiveDate;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::shell::{decode_line, Flow, Session};
use crate::io::config_io;
use crate::logging;
use crate::model::clock::{Clock, FixedClock, SystemClock};
use crate::ops::store::TaskStore;
use crate::ops::view;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let config = config_io::load_config(cli.config.as_deref(), &cwd)?;

    if let Err(e) = logging::init(&logging::directive(cli.verbose, &config.log.level)) {
        eprintln!("warning: {}", e);
    }

    match config_io::config_source(cli.config.as_deref(), &cwd) {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config file"),
        None => tracing::debug!("no config file, using defaults"),
    }

    let store = TaskStore::from_config(&config)?;
    let clock: Box<dyn Clock> = match cli.today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    tracing::info!(tasks = store.len(), filter = %store.filter(), today = %clock.today(), "store ready");

    match cli.command {
        None | Some(Commands::Shell) => cmd_shell(Session::new(store, clock, cli.json)),
        Some(Commands::Run(args)) => cmd_run(Session::new(store, clock, cli.json), args),
        Some(Commands::List(args)) => cmd_list(&store, clock.today(), args, cli.json),
        Some(Commands::Stats) => cmd_stats(&store, clock.today(), cli.json),
    }
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

fn cmd_shell(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if interactive {
        writeln!(out, "taskdeck {} - type `help` for commands", env!("CARGO_PKG_VERSION"))?;
    }
    let mut input = stdin.lock();
    let mut buf = Vec::new();
    loop {
        if interactive {
            write!(out, "td> ")?;
            out.flush()?;
        }
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        match decode_line(&buf).and_then(|line| session.execute(line, &mut out)) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            // The shell reports and carries on
            Err(e) => {
                out.flush()?;
                eprintln!("{}", e.render());
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn cmd_run(mut session: Session, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader: Box<dyn BufRead> = if args.script.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.script)
            .map_err(|e| format!("cannot open script '{}': {}", args.script.display(), e))?;
        Box::new(BufReader::new(file))
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut buf = Vec::new();
    let mut failures = 0usize;
    for n in 1usize.. {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        match decode_line(&buf).and_then(|line| session.execute(line, &mut out)) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                out.flush()?;
                eprintln!("line {}: {}", n, e.render());
                failures += 1;
                if !args.keep_going {
                    break;
                }
            }
        }
    }
    out.flush()?;

    if failures > 0 {
        return Err(format!("{} line(s) failed", failures).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// One-shot read commands
// ---------------------------------------------------------------------------

fn cmd_list(store: &TaskStore, today: NaiveDate, args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = args.filter.unwrap_or(store.filter());
    let searched = view::by_search(store.tasks(), args.search.as_deref().unwrap_or(""));
    let tasks = view::by_filter(searched, filter, today);

    if json {
        let items: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t, today)).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_task_list(&tasks, today) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_stats(store: &TaskStore, today: NaiveDate, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stats = view::stats(store.tasks(), today);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats_to_json(&stats))?);
    } else {
        println!("{}", format_stats(&stats));
    }
    Ok(())
}
