// Vipère: Time-Travel Credential Reconstruction with State Visualization

use std::io;
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vipere::engine::constants::DEFAULT_SNAPSHOT_LIMIT;
use vipere::engine::Engine;
use vipere::program::fixture::credentials_program;
use vipere::program::source::ProgramSource;
use vipere::program::Program;
use vipere::ui::App;

#[derive(Parser, Debug)]
#[command(name = "vipere", version, about = "Reconstruct the credential string step by step")]
struct Cli {
    /// JSON code object to run instead of the built-in `get_credentials`
    #[arg(long)]
    program: Option<PathBuf>,

    /// Print the trace and result instead of opening the TUI
    #[arg(long)]
    plain: bool,

    /// Memory budget for the snapshot history, in bytes
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_LIMIT)]
    snapshot_limit: usize,
}

fn load_program(path: Option<&PathBuf>) -> Result<Program, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading code object");
            Ok(ProgramSource::from_path(path)?.to_program()?)
        }
        None => Ok(credentials_program()?),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vipere=info")),
        )
        .with_writer(io::stderr)
        .init();

    let program = match load_program(cli.program.as_ref()) {
        Ok(program) => program,
        Err(e) => {
            error!("failed to load program: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        instructions = program.code.len(),
        consts = program.consts.len(),
        "program decoded"
    );

    // Run execution to build history
    let mut engine = Engine::new(program, cli.snapshot_limit);
    let outcome = engine.run();

    if cli.plain {
        for line in engine.trace().get_output() {
            println!("{}", line);
        }
        if let Err(e) = outcome {
            eprintln!("Runtime error: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let run_error = match outcome {
        Ok(_) => {
            info!(snapshots = engine.total_snapshots(), "execution completed");
            None
        }
        Err(e) => {
            warn!("runtime error: {}; entering TUI with partial history", e);
            Some(e)
        }
    };

    // Rewind to the beginning for TUI
    if let Err(e) = engine.rewind_to_start() {
        warn!("failed to rewind to start: {}", e);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(engine, run_error);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
