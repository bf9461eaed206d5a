//! The `swatch` command line.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use swatch::{ColorMode, Fragment, ProjectConfig, Recipe, RecipeRegistry, Selection, StyleMap, Tokens};

use crate::output::{self, Format};
use crate::seed;
use crate::server::{self, AppState};
use crate::settings::Settings;
use crate::sink::{ErrorSink, TracingSink};
use crate::store::TodoStore;

#[derive(Debug, Parser)]
#[command(name = "swatch", version, about = "Component style recipes and the todo demo service")]
pub struct Cli {
    /// Project directory holding swatch.yaml
    #[arg(long, short = 'C', global = true, default_value = ".")]
    pub project: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate recipes, tokens and the token references in recipes
    Check,
    /// List the available recipes
    List,
    /// Resolve a recipe for a selection
    Resolve(ResolveArgs),
    /// Look up design tokens
    Token(TokenArgs),
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Replace all todos with the seed data
    Seed(SeedArgs),
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Recipe name
    pub recipe: String,

    /// Axis selection, e.g. --set size=sm --set wcagLevel=AAA
    #[arg(long = "set", value_name = "AXIS=VALUE")]
    pub set: Vec<String>,

    /// Print only this slot
    #[arg(long)]
    pub slot: Option<String>,

    /// Substitute token values
    #[arg(long)]
    pub expand: bool,

    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,
}

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token path such as colors.blue.400; lists every token when omitted
    pub path: Option<String>,

    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Overrides SWATCH_HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Overrides SWATCH_PORT
    #[arg(long)]
    pub port: Option<u16>,

    /// Overrides DATABASE_URL
    #[arg(long)]
    pub database_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Overrides DATABASE_URL
    #[arg(long)]
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Light,
    Dark,
    /// Follow the operating system
    Auto,
}

impl ModeArg {
    pub fn color_mode(self) -> ColorMode {
        match self {
            ModeArg::Light => ColorMode::Light,
            ModeArg::Dark => ColorMode::Dark,
            ModeArg::Auto => ColorMode::detect(),
        }
    }
}

/// Runs a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Check => check(&load_project(&cli.project)?),
        Command::List => list(&load_project(&cli.project)?),
        Command::Resolve(args) => resolve(&load_project(&cli.project)?, &args),
        Command::Token(args) => token(&load_project(&cli.project)?, &args),
        Command::Serve(args) => serve(&load_project(&cli.project)?, args).await,
        Command::Seed(args) => seed(args).await,
    }
}

fn load_project(dir: &std::path::Path) -> anyhow::Result<ProjectConfig> {
    ProjectConfig::load_or_default(dir)
        .with_context(|| format!("loading project in {}", dir.display()))
}

fn fragment_maps(fragment: &Fragment) -> Vec<&StyleMap> {
    match fragment {
        Fragment::Flat(map) => vec![map],
        Fragment::Slotted(slots) => slots.values().collect(),
    }
}

/// Dangling inline token references anywhere in `recipe`.
pub fn recipe_references(recipe: &Recipe, tokens: &Tokens) -> Vec<String> {
    let mut fragments = vec![recipe.base()];
    for axis in recipe.axes() {
        fragments.extend(axis.values().filter_map(|value| axis.fragment(value)));
    }
    fragments.extend(recipe.compound_variants().iter().map(|c| c.css()));

    let mut missing: Vec<String> = Vec::new();
    for map in fragments.into_iter().flat_map(fragment_maps) {
        for reference in tokens.unresolved_references(map) {
            if !missing.contains(&reference) {
                missing.push(reference);
            }
        }
    }
    missing
}

/// Collects every problem in the project's recipes and tokens.
pub fn check_project(project: &ProjectConfig) -> Vec<String> {
    let mut problems = Vec::new();

    let registry = project
        .registry()
        .map_err(|e| problems.push(e.to_string()))
        .ok();
    let tokens = project
        .tokens()
        .map_err(|e| problems.push(e.to_string()))
        .ok();

    if let Some(tokens) = &tokens {
        if let Err(e) = tokens.validate() {
            problems.push(e.to_string());
        }
    }
    if let (Some(registry), Some(tokens)) = (&registry, &tokens) {
        for recipe in registry.iter() {
            for reference in recipe_references(recipe, tokens) {
                problems.push(format!(
                    "recipe '{}': unresolved token reference '{{{}}}'",
                    recipe.name(),
                    reference
                ));
            }
        }
    }
    problems
}

/// Hands each problem to `sink` as a warning.
pub fn report_problems(problems: &[String], sink: &dyn ErrorSink) {
    for problem in problems {
        sink.warning(problem, Some("recipes"), "startup check");
    }
}

fn check(project: &ProjectConfig) -> anyhow::Result<ExitCode> {
    let problems = check_project(project);
    if problems.is_empty() {
        output::line(output::ok("all recipes and tokens are valid"));
        return Ok(ExitCode::SUCCESS);
    }
    for problem in &problems {
        output::line(format!("{} {}", output::fail("error:"), problem));
    }
    tracing::warn!(count = problems.len(), "check failed");
    Ok(ExitCode::FAILURE)
}

fn list(project: &ProjectConfig) -> anyhow::Result<ExitCode> {
    let registry = project.registry()?;
    for recipe in registry.iter() {
        let source = registry
            .source(recipe.name())
            .map(|s| s.to_string())
            .unwrap_or_default();
        output::line(format!("{} {}", output::heading(recipe.name()), output::dim(&source)));
        if let Some(description) = recipe.description() {
            output::line(format!("  {description}"));
        }
        if recipe.is_slotted() {
            output::line(format!("  slots: {}", recipe.slots().join(", ")));
        }
        for axis in recipe.axes() {
            let values: Vec<&str> = axis.values().collect();
            let default = recipe
                .defaults()
                .get(axis.name())
                .map(|d| format!(" (default {d})"))
                .unwrap_or_default();
            output::line(format!("  {}: {}{}", axis.name(), values.join(" | "), default));
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    recipe: &'a str,
    selection: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<ColorMode>,
    styles: Fragment,
}

fn resolve(project: &ProjectConfig, args: &ResolveArgs) -> anyhow::Result<ExitCode> {
    let registry: RecipeRegistry = project.registry()?;
    let recipe = registry.get(&args.recipe)?;
    let selection = Selection::parse_pairs(&args.set)?;
    let resolved = recipe.resolve(&selection)?;

    let mut styles = match &args.slot {
        Some(slot) => match resolved.slot(slot) {
            Some(map) => Fragment::Flat(map.clone()),
            None if !recipe.is_slotted() => bail!("recipe '{}' has no slots", recipe.name()),
            None => bail!(
                "recipe '{}' has no slot '{}' (slots: {})",
                recipe.name(),
                slot,
                recipe.slots().join(", ")
            ),
        },
        None => resolved.styles().clone(),
    };

    let mode = if args.expand {
        let mode = args.mode.color_mode();
        let tokens = project.tokens()?;
        styles = match styles {
            Fragment::Flat(map) => Fragment::Flat(tokens.expand_style(&map, mode)),
            Fragment::Slotted(slots) => Fragment::Slotted(
                slots
                    .into_iter()
                    .map(|(slot, map)| {
                        let expanded = tokens.expand_style(&map, mode);
                        (slot, expanded)
                    })
                    .collect(),
            ),
        };
        Some(mode)
    } else {
        None
    };

    output::emit(
        &ResolveOutput {
            recipe: resolved.recipe(),
            selection: resolved.selection(),
            mode,
            styles,
        },
        args.format,
    )?;
    Ok(ExitCode::SUCCESS)
}

fn token(project: &ProjectConfig, args: &TokenArgs) -> anyhow::Result<ExitCode> {
    let tokens = project.tokens()?;
    let mode = args.mode.color_mode();
    match &args.path {
        Some(path) => output::line(tokens.resolve(path, mode)?),
        None => {
            for path in tokens.paths() {
                let value = tokens
                    .resolve(path, mode)
                    .unwrap_or_else(|e| format!("<{e}>"));
                output::line(format!("{path} {}", output::dim(&value)));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn open_store(url: &str) -> anyhow::Result<TodoStore> {
    let store = TodoStore::connect(url)
        .await
        .with_context(|| format!("opening database {url}"))?;
    store.migrate().await?;
    Ok(store)
}

async fn serve(project: &ProjectConfig, args: ServeArgs) -> anyhow::Result<ExitCode> {
    let mut settings = Settings::from_env()?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }
    let addr = settings.bind_addr()?;

    let store = open_store(&settings.database_url).await?;
    let registry = project.registry()?;
    tracing::info!(recipes = registry.len(), "recipes loaded");

    let sink = TracingSink::new().shared();
    report_problems(&check_project(project), sink.as_ref());

    let state = AppState::new(store, registry, settings, sink);
    server::serve(state, addr).await?;
    Ok(ExitCode::SUCCESS)
}

async fn seed(args: SeedArgs) -> anyhow::Result<ExitCode> {
    let mut settings = Settings::from_env()?;
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }
    let sink = TracingSink::new();

    let store = match open_store(&settings.database_url).await {
        Ok(store) => store,
        Err(e) => {
            sink.error(&format!("{e:#}"), Some("seed"), "opening database");
            return Ok(ExitCode::FAILURE);
        }
    };

    let result = seed::run(&store, &sink).await;
    store.close().await;
    Ok(match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSink {
        warnings: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ErrorSink for RecordingSink {
        fn error(&self, _error: &dyn fmt::Display, _component: Option<&str>, _info: &str) {}

        fn warning(&self, message: &str, component: Option<&str>, _trace: &str) {
            self.warnings
                .lock()
                .unwrap()
                .push((message.to_string(), component.map(str::to_string)));
        }

        fn unhandled(&self, _reason: &str) {}
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from([
            "swatch", "resolve", "button", "--set", "size=sm", "--set", "wcagLevel=AAA",
            "--expand", "--mode", "dark", "--format", "yaml",
        ])
        .unwrap();
        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.recipe, "button");
        assert_eq!(args.set, vec!["size=sm", "wcagLevel=AAA"]);
        assert!(args.expand);
        assert_eq!(args.mode, ModeArg::Dark);
        assert_eq!(args.format, Format::Yaml);
    }

    #[test]
    fn test_parse_global_project() {
        let cli = Cli::try_parse_from(["swatch", "list", "-C", "/tmp/app"]).unwrap();
        assert_eq!(cli.project, PathBuf::from("/tmp/app"));
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["swatch", "token", "--mode", "sepia"]).is_err());
    }

    #[test]
    fn test_builtin_project_checks_clean() {
        let dir = TempDir::new().unwrap();
        let project = ProjectConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(check_project(&project), Vec::<String>::new());
    }

    #[test]
    fn test_check_reports_dangling_reference() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("recipes")).unwrap();
        fs::write(
            dir.path().join("recipes/badge.yaml"),
            "className: badge\nbase:\n  border: 1px solid {colors.brand}\n",
        )
        .unwrap();
        fs::write(dir.path().join("swatch.yaml"), "recipes: recipes\n").unwrap();

        let project = ProjectConfig::load_or_default(dir.path()).unwrap();
        let problems = check_project(&project);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("colors.brand"));
    }

    #[test]
    fn test_check_reports_broken_recipe() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("recipes")).unwrap();
        fs::write(
            dir.path().join("recipes/badge.yaml"),
            "className: badge\nvariants:\n  size:\n    sm: {}\ndefaultVariants:\n  size: xl\n",
        )
        .unwrap();
        fs::write(dir.path().join("swatch.yaml"), "recipes: recipes\n").unwrap();

        let project = ProjectConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(check_project(&project).len(), 1);
    }

    #[test]
    fn test_problems_are_reported_as_warnings() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("recipes")).unwrap();
        fs::write(
            dir.path().join("recipes/badge.yaml"),
            "className: badge\nbase:\n  outline: 1px solid {colors.brand}\n",
        )
        .unwrap();
        fs::write(dir.path().join("swatch.yaml"), "recipes: recipes\n").unwrap();

        let project = ProjectConfig::load_or_default(dir.path()).unwrap();
        let sink = RecordingSink::default();
        report_problems(&check_project(&project), &sink);

        let warnings = sink.warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].0.contains("colors.brand"));
        assert_eq!(warnings[0].1.as_deref(), Some("recipes"));
    }

    #[tokio::test]
    async fn test_seed_fails_when_database_cannot_open() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("missing/todos.db").display());
        let code = seed(SeedArgs {
            database_url: Some(url),
        })
        .await
        .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }
}
