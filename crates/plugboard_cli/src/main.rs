//! `plugboard` command-line entry point.
//!
//! # Responsibility
//! - Collect `--extension-arg` values into one namespace tree.
//! - Render the tree with a formatter resolved by name from the registry.

mod format;

use clap::Parser;
use format::{register_builtin_formatters, NamespaceFormatter};
use log::info;
use plugboard_core::{
    create_args, default_log_level, global_registry, init_logging, ExtensionRegistry, Namespace,
};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "plugboard",
    version,
    about = "Build a nested namespace from key=value extension arguments"
)]
struct Cli {
    /// Extension argument in `key=value` or `key.sub=value` form; repeatable.
    #[arg(short = 'x', long = "extension-arg", value_name = "KEY=VALUE")]
    extension_args: Vec<String>,

    /// Output formatter name.
    #[arg(long, default_value = "json")]
    format: String,

    /// Print the registered formatter names and exit.
    #[arg(long)]
    list_formats: bool,

    /// trace|debug|info|warn|error
    #[arg(long, env = "PLUGBOARD_LOG")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long)]
    log_dir: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<String, String> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, cli.log_dir.as_deref())?;
    info!(
        "event=cli_start module=cli status=ok core_version={} args={}",
        plugboard_core::core_version(),
        cli.extension_args.len()
    );

    let mut registry = global_registry();
    execute(&cli, &mut registry)
}

/// Runs one command against `registry`, returning the text to print.
fn execute(cli: &Cli, registry: &mut ExtensionRegistry) -> Result<String, String> {
    register_builtin_formatters(registry).map_err(|err| err.to_string())?;
    if cli.list_formats {
        let names = registry
            .registered_view::<dyn NamespaceFormatter>()
            .map_err(|err| err.to_string())?
            .names();
        return Ok(format!("{}\n", names.join("\n")));
    }
    let formatter = registry
        .load::<dyn NamespaceFormatter>(&cli.format)
        .map_err(|err| err.to_string())?;

    let mut root = Namespace::new();
    create_args(&cli.extension_args, &mut root).map_err(|err| err.to_string())?;
    let mut rendered = formatter.render(&root)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::{execute, Cli};
    use clap::Parser;
    use plugboard_core::ExtensionRegistry;

    fn execute_args(args: &[&str]) -> Result<String, String> {
        let cli = Cli::try_parse_from(args).expect("valid command line");
        let mut registry = ExtensionRegistry::new();
        execute(&cli, &mut registry)
    }

    #[test]
    fn parses_repeated_extension_args() {
        let cli = Cli::try_parse_from([
            "plugboard",
            "-x",
            "a.b=1",
            "--extension-arg",
            "a.c=2",
            "--format",
            "tree",
        ])
        .expect("valid command line");
        assert_eq!(cli.extension_args, vec!["a.b=1", "a.c=2"]);
        assert_eq!(cli.format, "tree");
        assert!(!cli.list_formats);
    }

    #[test]
    fn defaults_to_json_format() {
        let cli = Cli::try_parse_from(["plugboard"]).expect("no arguments");
        assert_eq!(cli.format, "json");
        assert!(cli.extension_args.is_empty());
        assert!(cli.log_dir.is_none());
    }

    #[test]
    fn list_formats_prints_registered_names() {
        let output = execute_args(&["plugboard", "--list-formats"]).expect("list formats");
        assert_eq!(output, "json\ntree\n");
    }

    #[test]
    fn renders_extension_args_as_json() {
        let output =
            execute_args(&["plugboard", "-x", "a.b=1", "-x", "a.c=2"]).expect("json output");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value, serde_json::json!({"a": {"b": "1", "c": "2"}}));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn conflicting_paths_fail_with_segment() {
        let err = execute_args(&["plugboard", "-x", "a.b=1", "-x", "a=2"])
            .expect_err("conflict must fail");
        assert!(err.contains("conflicting"), "unexpected error: {err}");
        assert!(err.contains("`a`"), "unexpected error: {err}");
    }

    #[test]
    fn unknown_format_lists_available_formatters() {
        let err = execute_args(&["plugboard", "--format", "yaml"])
            .expect_err("unknown format must fail");
        assert!(err.contains("`yaml`"), "unexpected error: {err}");
        assert!(err.contains("options are: [json, tree]"), "unexpected error: {err}");
    }

    #[test]
    fn invalid_extension_arg_is_reported() {
        let err = execute_args(&["plugboard", "-x", "1a=x"]).expect_err("invalid syntax");
        assert!(err.contains("1a=x"), "unexpected error: {err}");
    }
}
