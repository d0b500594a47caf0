mod app;
mod config;
mod dispatch;
mod editor;
mod event;
mod host;
mod link;
mod logging;
mod picker;
mod search;
mod ui;
mod vault;
mod workspace;

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use crossterm::{
    cursor::SetCursorStyle,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::Config;
use event::run_app;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("linkwise {}", VERSION);
    println!("A terminal note editor with link-aware rename and move");
    println!();
    println!("USAGE:");
    println!("    linkwise [OPTIONS] [PATH]");
    println!();
    println!("ARGUMENTS:");
    println!("    [PATH]           Open a file or folder directly");
    println!("                     - If PATH is a folder, opens it as the vault");
    println!("                     - If PATH is a .md file, opens it and its parent folder");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!("    -c, --config     Print config file path");
    println!("    -d, --dir        Print notes directory path");
    println!("    -l, --log        Print log file path");
    println!("    --reset          Reset config to defaults");
    println!();
    println!("COMMANDS:");
    let config = Config::load();
    for command in dispatch::Command::ALL {
        println!("    {:<16} {} ({})", config.keys.binding_for(command), command.name(), command.id());
    }
    println!();
    println!("ENVIRONMENT:");
    println!("    {}      Log filter, e.g. 'debug' or 'linkwise=trace'", logging::LOG_ENV);
}

fn reset_config() {
    let config_path = Config::config_path();

    println!("Resetting linkwise configuration...");
    println!();

    if config_path.exists() {
        match fs::remove_file(&config_path) {
            Ok(_) => println!("  Deleted: {}", config_path.display()),
            Err(e) => eprintln!("  Failed to remove config: {}", e),
        }
    } else {
        println!("  Config file not found (skipped)");
    }

    let _config = Config::load_or_create();
    println!("  Created: {}", config_path.display());
    println!();
    println!("Reset complete! Configuration restored to v{} defaults.", VERSION);
}

fn resolve_path(path_str: &str) -> Option<PathBuf> {
    let expanded = shellexpand::tilde(path_str).to_string();
    let path = PathBuf::from(&expanded);
    let absolute = if path.is_absolute() {
        path
    } else {
        env::current_dir().ok()?.join(path)
    };

    absolute.canonicalize().ok().or(Some(absolute))
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut initial_path: Option<PathBuf> = None;

    if args.len() > 1 {
        match args[1].as_str() {
            "-v" | "--version" => {
                println!("linkwise {}", VERSION);
                return Ok(());
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-c" | "--config" => {
                println!("{}", Config::config_path().display());
                return Ok(());
            }
            "-d" | "--dir" => {
                println!("{}", Config::load().notes_path().display());
                return Ok(());
            }
            "-l" | "--log" => {
                println!("{}", logging::log_path().display());
                return Ok(());
            }
            "--reset" => {
                reset_config();
                return Ok(());
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Run 'linkwise --help' for usage information");
                return Ok(());
            }
            path_arg => match resolve_path(path_arg) {
                Some(path) if path.exists() => initial_path = Some(path),
                Some(path) => {
                    eprintln!("Path does not exist: {}", path.display());
                    return Ok(());
                }
                None => {
                    eprintln!("Invalid path: {}", path_arg);
                    return Ok(());
                }
            },
        }
    }

    let config = Config::load_or_create();
    let _log_guard = logging::init(&config.log_level);

    let mut app = App::new_with_path(config, initial_path)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetCursorStyle::SteadyBar)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), SetCursorStyle::DefaultUserShape, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}
