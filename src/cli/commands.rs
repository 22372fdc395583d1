//! Command dispatch

use std::io::{self, Read};
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{from_json, render, run_script, to_json, EditorService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{expand_path, global_config_path, OutputFormat, Settings};
use crate::domain::WorkflowTree;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run {
            script,
            from,
            format,
        }) => {
            let settings = load_settings(cli)?;
            cmd_run(&settings, script, from.as_deref(), format.unwrap_or(settings.output))
        }
        Some(Commands::New { format }) => {
            let settings = load_settings(cli)?;
            print_tree(&WorkflowTree::new(), format.unwrap_or(settings.output))
        }
        Some(Commands::Render { input, format }) => {
            let settings = load_settings(cli)?;
            cmd_render(input, format.unwrap_or(settings.output))
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(&load_settings(cli)?),
            ConfigCommands::Path => cmd_config_path(cli),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "rsflow", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let config_file = cli.config.as_deref().map(expand_path);
    Ok(Settings::load(config_file.as_deref())?)
}

/// Read a file, or stdin for `-`.
fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io("read stdin", e))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| CliError::io(format!("read {}", path.display()), e))
}

fn print_tree(tree: &WorkflowTree, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Tree => output::info(&render(tree)),
        OutputFormat::Json => output::info(&to_json(tree)?),
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_run(
    settings: &Settings,
    script: &Path,
    from: Option<&Path>,
    format: OutputFormat,
) -> CliResult<()> {
    if script == Path::new("-") && from == Some(Path::new("-")) {
        return Err(CliError::InvalidArgs(
            "script and --from cannot both read stdin".to_string(),
        ));
    }

    let initial = match from {
        Some(path) => from_json(&read_input(path)?)?,
        None => WorkflowTree::new(),
    };
    let source = read_input(script)?;
    debug!("cmd_run: {} bytes of script", source.len());

    let mut editor = EditorService::from_settings_with_tree(settings, initial);
    let report = run_script(&mut editor, &source)?;
    if report.at_boundary > 0 {
        output::warning(&format!(
            "{} undo/redo step(s) hit the history edge",
            report.at_boundary
        ));
    }

    print_tree(editor.current(), format)?;

    let history = editor.history();
    output::status(&format!(
        "{} step(s): {} committed, {} unchanged, {} moved; snapshot {}/{}",
        report.steps,
        report.committed,
        report.unchanged,
        report.moved,
        history.cursor() + 1,
        history.len()
    ));
    Ok(())
}

#[instrument]
fn cmd_render(input: &Path, format: OutputFormat) -> CliResult<()> {
    let tree = from_json(&read_input(input)?)?;
    debug!("cmd_render: {} node(s)", tree.node_count());
    print_tree(&tree, format)
}

fn cmd_config_show(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(cli: &Cli) -> CliResult<()> {
    output::header("Config files");
    match global_config_path() {
        Some(path) => output::detail(&format!(
            "global: {} ({})",
            path.display(),
            if path.exists() { "found" } else { "not found" }
        )),
        None => output::detail("global: unavailable (no home directory)"),
    }
    if let Some(path) = cli.config.as_deref().map(expand_path) {
        output::detail(&format!(
            "explicit: {} ({})",
            path.display(),
            if path.exists() { "found" } else { "not found" }
        ));
    }
    output::detail("environment: RSFLOW_* (e.g. RSFLOW_HISTORY__MAX_ENTRIES)");
    Ok(())
}
