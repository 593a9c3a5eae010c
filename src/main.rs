//! stepform - Main entry point
//!
//! Parses the command line, sets up logging and runs the interactive form,
//! the headless check or the template writer.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::{debug, error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::stdout;
use std::path::{Path, PathBuf};

use stepform::app::App;
use stepform::cli::{Cli, Commands};
use stepform::error;
use stepform::form::{FormDefinition, FormValues};
use stepform::session::FormSession;
use stepform::settings::Settings;
use stepform::sink::JsonFileSink;

/// Initialize the logger with appropriate settings.
///
/// The interactive form owns the terminal: without a log file only warnings
/// and errors get through.
fn init_logger(log_file: Option<&Path>, interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    use env_logger::{Builder, Target};
    use std::io::Write;

    let level = if interactive && log_file.is_none() {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };

    let mut builder = Builder::from_default_env();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env(); // Allows RUST_LOG env var to override

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .map_err(|e| error::general_error(format!("Failed to open log file {:?}: {}", path, e)))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Main application entry point
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    let interactive = matches!(cli.command, None | Some(Commands::Run { .. }));

    init_logger(cli.log_file.as_deref(), interactive)?;
    info!("stepform starting up");
    debug!("CLI arguments parsed");

    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::default(),
    };
    if let Some(navigation) = cli.command.as_ref().and_then(Commands::navigation_override) {
        debug!("Navigation overridden on the command line: {}", navigation);
        settings.navigation = navigation;
    }

    match cli.command {
        Some(Commands::Run { form, output, .. }) => {
            run_tui(form.as_deref(), output, settings)?;
        }
        Some(Commands::Check { form, responses }) => {
            let accepted = run_check(form.as_deref(), responses.as_deref(), settings)?;
            if !accepted {
                std::process::exit(1);
            }
        }
        Some(Commands::Template { output }) => {
            run_template(output.as_deref())?;
        }
        None => {
            info!("No command specified, launching the form");
            run_tui(None, PathBuf::from("submission.json"), settings)?;
        }
    }

    Ok(())
}

/// Load a definition from file, or the built-in one, and validate it
fn load_definition(path: Option<&Path>) -> Result<FormDefinition, Box<dyn std::error::Error>> {
    let definition = match path {
        Some(path) => {
            info!("Loading form definition from {:?}", path);
            FormDefinition::load_from_file(path)?
        }
        None => FormDefinition::builtin(),
    };
    definition.validate()?;
    Ok(definition)
}

/// Run the interactive form
fn run_tui(
    form: Option<&Path>,
    output: PathBuf,
    settings: Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let definition = load_definition(form)?;
    let session = FormSession::new(definition, settings);
    let sink = JsonFileSink::new(output);

    debug!("Initializing terminal for TUI mode");
    enable_raw_mode()
        .map_err(|e| error::general_error(format!("Failed to enable raw mode: {}", e)))?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)
        .map_err(|e| error::general_error(format!("Failed to enter alternate screen: {}", e)))?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| error::general_error(format!("Failed to create terminal: {}", e)))?;

    let mut app = App::new(session, Box::new(sink));
    let result = app.run(&mut terminal);

    // Cleanup terminal (always attempt cleanup, even if app failed)
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);

    if let Err(ref e) = result {
        error!("Form exited with error: {}", e);
    }
    result
}

/// Replay a submission of saved responses. Returns whether it was accepted.
fn run_check(
    form: Option<&Path>,
    responses: Option<&Path>,
    settings: Settings,
) -> Result<bool, Box<dyn std::error::Error>> {
    let definition = load_definition(form)?;
    let values = match responses {
        Some(path) => FormValues::load_from_file(path)?,
        None => FormValues::new(),
    };
    let session = FormSession::with_values(definition, settings, &values)?;

    let mut issues = 0;
    for step in 0..session.wizard().total() as i32 {
        let report = session.validate_step(step, settings.phone_policy.navigation);
        let title = session
            .definition()
            .section(step)
            .map(|s| s.title.as_str())
            .unwrap_or("?");
        for issue in &report.issues {
            issues += 1;
            println!("✗ [{}] {}: {}", title, issue.field, issue.message);
        }
    }

    let transition = session.submit();
    for notice in transition.notices() {
        println!("! {}", notice);
    }

    match transition.submission() {
        Some(submission) => {
            info!("Check passed");
            println!(
                "✓ Submission accepted ({} values)",
                submission.values.len()
            );
            Ok(true)
        }
        None => {
            warn!("Check failed with {} field issues", issues);
            eprintln!("✗ Submission would be blocked");
            Ok(false)
        }
    }
}

/// Write the built-in definition as JSON
fn run_template(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let definition = FormDefinition::builtin();
    match output {
        Some(path) => {
            definition.save_to_file(path)?;
            info!("Template written to {:?}", path);
            println!("✓ Form template written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&definition)?),
    }
    Ok(())
}
