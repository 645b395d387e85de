use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cmdar_core::{
    Action, ArgumentContext, CommandTree, Dispatch, NodeId, Outcome, Parameter, Resolution,
};
use cmdar_definition::CommandDefinition;
use cmdar_help::render_help;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CMDAR_LOG";

/// Output formats for resolution reports.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "cmdar")]
#[command(about = "Inspect and exercise declarative command-line definitions")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more definition files (YAML or JSON).
    Validate(ValidateArgs),
    /// Resolve arguments against a definition and print what was parsed.
    Resolve(ResolveArgs),
    /// Print the help page of a command in a definition.
    Help(HelpArgs),
    /// List every command with the aliases of its parameters.
    Aliases(AliasesArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition files to check.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Definition file (.yaml, .yml or .json).
    #[arg(long, short)]
    definition: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Also invoke the command actions; a command whose `help` flag is
    /// enabled stops the invocation.
    #[arg(long)]
    run: bool,
    /// Exit with an error when the resolution produced warnings.
    #[arg(long)]
    strict: bool,
    /// Arguments to resolve, after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Definition file (.yaml, .yml or .json).
    #[arg(long, short)]
    definition: PathBuf,
    /// Sub-command path below the root, e.g. `remote add`.
    path: Vec<String>,
}

#[derive(Debug, Args)]
struct AliasesArgs {
    /// Definition file (.yaml, .yml or .json).
    #[arg(long, short)]
    definition: PathBuf,
}

/// Serialized result of `cmdar resolve`.
#[derive(Debug, Serialize)]
struct ResolveReport<'a> {
    resolution: &'a Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    dispatch: Option<Dispatch>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Help(args) => run_help(args),
        Command::Aliases(args) => run_aliases(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_tree(path: &Path) -> Result<CommandTree, String> {
    let definition = CommandDefinition::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    definition
        .build_tree()
        .map_err(|err| format!("'{}': {err}", path.display()))
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut commands = 0;
    for path in &args.inputs {
        let tree = load_tree(path)?;
        for warning in tree.declaration_warnings() {
            eprintln!("warning: {}: {warning}", path.display());
        }
        commands += tree.nodes().count();
        debug!(path = %path.display(), "definition is valid");
    }
    println!(
        "Validated {} definition file(s) with {} command(s).",
        args.inputs.len(),
        commands
    );
    Ok(())
}

/// Logs every invocation; stops when the command's `help` flag is enabled.
struct EchoAction;

impl Action for EchoAction {
    fn on_usage(&self, context: &ArgumentContext) -> Outcome {
        info!(command = context.identifier(), "action invoked");
        if context.is_flag_enabled("help") {
            Outcome::Stop
        } else {
            Outcome::Continue
        }
    }
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let definition = CommandDefinition::load(&args.definition)
        .map_err(|err| format!("Failed to load '{}': {err}", args.definition.display()))?;

    let (resolution, dispatch) = if args.run {
        let echo: Arc<dyn Action> = Arc::new(EchoAction);
        let tree = definition
            .build_tree_with(&|_: &CommandDefinition| Some(Arc::clone(&echo)))
            .map_err(|err| err.to_string())?;
        let (resolution, dispatch) = tree.run(&args.tokens);
        (resolution, Some(dispatch))
    } else {
        let tree = definition.build_tree().map_err(|err| err.to_string())?;
        (tree.resolve(&args.tokens), None)
    };

    let report = ResolveReport {
        resolution: &resolution,
        dispatch,
    };
    let raw = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|err| format!("Failed to serialize resolution: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&report)
            .map_err(|err| format!("Failed to serialize resolution: {err}"))?,
        CliOutputFormat::Text => render_report(&report),
    };
    println!("{}", raw.trim_end());

    if args.strict && resolution.has_warnings() {
        let count = resolution.warnings().count();
        return Err(format!("resolution produced {count} warning(s)"));
    }
    Ok(())
}

fn render_report(report: &ResolveReport<'_>) -> String {
    let mut out = String::new();
    for context in report.resolution.contexts() {
        out.push_str(&format!("{}\n", context.path().join(" ")));
        let flags: Vec<&str> = context.enabled_flags().collect();
        if !flags.is_empty() {
            out.push_str(&format!("  flags: {}\n", flags.join(", ")));
        }
        if !context.values().is_empty() {
            out.push_str(&format!("  values: {}\n", context.values().join(" ")));
        }
        for option in context.option_names() {
            let values = context.values_of(option).unwrap_or_default();
            out.push_str(&format!("  --{option}: {}\n", values.join(" ")));
        }
        if !context.unrecognized().is_empty() {
            out.push_str(&format!(
                "  unrecognized: {}\n",
                context.unrecognized().join(" ")
            ));
        }
        for warning in context.warnings() {
            out.push_str(&format!("  warning: {warning}\n"));
        }
    }
    if let Some(dispatch) = &report.dispatch {
        out.push_str(&format!("invoked: {}\n", dispatch.invoked.join(", ")));
        if let Some(stopped_by) = &dispatch.stopped_by {
            out.push_str(&format!("stopped by: {stopped_by}\n"));
        }
    }
    out
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let tree = load_tree(&args.definition)?;
    let id = tree
        .find_path(&args.path)
        .ok_or_else(|| format!("Unknown command '{}'", args.path.join(" ")))?;
    print!("{}", render_help(&tree, id));
    Ok(())
}

fn run_aliases(args: AliasesArgs) -> Result<(), String> {
    let tree = load_tree(&args.definition)?;
    print!("{}", render_alias_table(&tree, tree.root()));
    Ok(())
}

fn render_alias_table(tree: &CommandTree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut out = format!("{}\n", tree.path_names(id).join(" "));
    for parameter in node.parameters() {
        match parameter {
            Parameter::Positional(positional) => {
                out.push_str(&format!("  <{}>\n", positional.name()));
            }
            Parameter::Option(_) | Parameter::Flag(_) => {
                let aliases: Vec<&str> = parameter
                    .aliases()
                    .map(|set| set.iter().collect())
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  {:<6} {}: {}\n",
                    parameter.kind().to_string(),
                    parameter.name(),
                    aliases.join(" ")
                ));
            }
        }
    }
    for &child in node.children() {
        out.push_str(&render_alias_table(tree, child));
    }
    out
}
