//! Command-line interface.
//!
//! Every subcommand implements [`Command`] and is registered in a
//! [`CommandRegistry`], which builds the `clap` interface, loads the layered
//! configuration and dispatches to the selected command.
//!
//! # Examples
//!
//! ```rust
//! use clap::{ArgMatches, Command as ClapCommand};
//! use std::process::ExitCode;
//! use std::sync::Arc;
//! use stiletto_cli::{Command, CommandRegistry, Context};
//!
//! struct VersionCommand;
//!
//! impl Command for VersionCommand {
//!     fn command() -> ClapCommand {
//!         ClapCommand::new("version").about("Prints the version")
//!     }
//!
//!     async fn main(_ctx: Arc<Context>, _matches: ArgMatches) -> ExitCode {
//!         println!("{}", env!("CARGO_PKG_VERSION"));
//!         ExitCode::SUCCESS
//!     }
//! }
//!
//! let mut registry = CommandRegistry::default();
//! registry.add_command::<VersionCommand>();
//! assert!(registry.has_command::<VersionCommand>());
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::ffi::OsString;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use stiletto::Markers;
use tracing::{error, info};

use crate::{Config, Output, OutputConfig, RoundReport, SymbolUniverse, Tracing, run_rounds};

/// State shared by every command.
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub config: Config,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

/// A subcommand of the `stiletto` binary.
///
/// A command describes its own `clap` interface and runs with the shared
/// [`Context`] once the registry has loaded the configuration and installed
/// tracing. Commands that do not override [`Command::main`] fail.
///
/// # Examples
///
/// ```rust
/// use clap::{Arg, ArgMatches, Command as ClapCommand};
/// use std::process::ExitCode;
/// use std::sync::Arc;
/// use stiletto_cli::{Command, Context};
///
/// struct ListCommand;
///
/// impl Command for ListCommand {
///     fn command() -> ClapCommand {
///         ClapCommand::new("list")
///             .about("Lists the configured markers")
///             .arg(Arg::new("verbose").long("verbose").num_args(0))
///     }
///
///     async fn main(ctx: Arc<Context>, _matches: ArgMatches) -> ExitCode {
///         match ctx.config.section::<stiletto::Markers>() {
///             Ok(markers) => {
///                 println!("{}", markers.module);
///                 ExitCode::SUCCESS
///             }
///             Err(_) => ExitCode::FAILURE,
///         }
///     }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Defines the subcommand's name and arguments.
    ///
    /// # Returns
    ///
    /// A `clap::Command` whose name selects this subcommand on the command line.
    fn command() -> clap::Command
    where
        Self: Sized;

    /// Runs the subcommand with its parsed arguments.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared state holding the effective configuration
    /// * `matches` - Parsed arguments of this subcommand
    ///
    /// # Returns
    ///
    /// The process exit code. The default implementation returns
    /// `ExitCode::FAILURE`.
    fn main(
        ctx: Arc<Context>,
        matches: ArgMatches,
    ) -> impl std::future::Future<Output = ExitCode> + Send {
        let _ = (ctx, matches);
        async move { ExitCode::FAILURE }
    }
}

#[async_trait]
trait DynCommand: Send + Sync {
    fn command(&self) -> clap::Command;

    async fn main(&self, ctx: Arc<Context>, matches: ArgMatches) -> ExitCode;
}

#[async_trait]
impl<T> DynCommand for T
where
    T: Command,
{
    fn command(&self) -> clap::Command {
        T::command()
    }

    async fn main(&self, ctx: Arc<Context>, matches: ArgMatches) -> ExitCode {
        T::main(ctx, matches).await
    }
}

struct CommandWrapper<T>(PhantomData<fn() -> T>)
where
    T: Command;

impl<T> Command for CommandWrapper<T>
where
    T: Command,
{
    fn command() -> clap::Command
    where
        Self: Sized,
    {
        T::command()
    }

    async fn main(ctx: Arc<Context>, matches: ArgMatches) -> ExitCode {
        T::main(ctx, matches).await
    }
}

/// Registered subcommands.
///
/// Commands are keyed by type, so registering the same command twice keeps a
/// single entry. [`CommandRegistry::run_main`] is the whole entry point of the
/// binary: it parses the arguments, loads the configuration, installs tracing
/// and dispatches to the selected subcommand.
///
/// # Examples
///
/// ```rust
/// use stiletto_cli::{CommandRegistry, GenerateCommand};
///
/// let registry = CommandRegistry::with_defaults();
/// assert_eq!(registry.len(), 3);
/// assert!(registry.has_command::<GenerateCommand>());
///
/// let cli = registry.build_cli();
/// assert!(cli.find_subcommand("check").is_some());
/// ```
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<TypeId, Box<dyn DynCommand>>,
}

impl CommandRegistry {
    /// A registry holding `generate`, `check` and `config`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.add_command::<GenerateCommand>();
        registry.add_command::<CheckCommand>();
        registry.add_command::<ConfigCommand>();
        registry
    }

    /// Registers a command, replacing any previous registration of `T`.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The command type to register.
    ///
    /// # Returns
    ///
    /// The registry, for chaining further registrations.
    pub fn add_command<T>(&mut self) -> &mut Self
    where
        T: Command + 'static,
    {
        let type_id = TypeId::of::<T>();
        self.commands
            .insert(type_id, Box::new(CommandWrapper::<T>(PhantomData)));
        self
    }

    /// Checks if a command type has been registered.
    ///
    /// # Returns
    ///
    /// Returns `true` if `T` is registered, `false` otherwise.
    pub fn has_command<T>(&self) -> bool
    where
        T: Command + 'static,
    {
        self.commands.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level interface with every registered subcommand.
    ///
    /// Subcommands are sorted by name. The global `--config` and repeated
    /// `--config-override` options are added here.
    pub fn build_cli(&self) -> clap::Command {
        let mut subcommands: Vec<_> = self.commands.values().map(|v| v.command()).collect();
        subcommands.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        clap::Command::new("stiletto")
            .about("Generates dependency-injection provider modules")
            .subcommand_required(true)
            .arg(
                Arg::new("config")
                    .long("config")
                    .short('c')
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("config-override")
                    .long("config-override")
                    .short('o')
                    .value_parser(value_parser!(PathBuf))
                    .action(ArgAction::Append),
            )
            .subcommands(subcommands)
    }

    /// Dispatches to the subcommand selected in `matches`.
    pub async fn run_command(&self, ctx: Arc<Context>, mut matches: ArgMatches) -> ExitCode {
        let Some((name, matches)) = matches.remove_subcommand() else {
            eprintln!("No command given");
            return ExitCode::FAILURE;
        };
        let Some(command) = self
            .commands
            .values()
            .find(|v| v.command().get_name() == name)
        else {
            eprintln!("Unknown command {name}");
            return ExitCode::FAILURE;
        };
        command.main(ctx, matches).await
    }

    /// Parses `args`, loads the configuration, installs tracing and runs the
    /// selected subcommand.
    ///
    /// # Arguments
    ///
    /// * `args` - Command-line arguments, starting with the binary name
    ///
    /// # Returns
    ///
    /// The exit code of the subcommand, or `ExitCode::FAILURE` if the
    /// arguments, the configuration or the tracing setup are invalid. Help and
    /// version requests print and return `ExitCode::SUCCESS`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use stiletto_cli::CommandRegistry;
    ///
    /// # async fn example() {
    /// let code = CommandRegistry::with_defaults()
    ///     .run_main(["stiletto", "check", "--input", "universe.json"])
    ///     .await;
    /// # let _ = code;
    /// # }
    /// ```
    pub async fn run_main<I, T>(&self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.build_cli().try_get_matches_from(args) {
            Ok(v) => v,
            Err(err) => {
                let _ = err.print();
                return if err.use_stderr() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                };
            }
        };
        let config_path = matches.get_one::<PathBuf>("config");
        let config_overrides = matches
            .get_many::<PathBuf>("config-override")
            .unwrap_or_default();
        let config = match Config::load(config_path, config_overrides).await {
            Ok(v) => v,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = Tracing::build(&config) {
            eprintln!("Cannot setup tracing: {err}");
            return ExitCode::FAILURE;
        }
        self.run_command(Arc::new(Context::new(config)), matches)
            .await
    }
}

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .short('i')
        .help("JSON file describing the declarations to process")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
}

fn markers(ctx: &Context) -> Option<Markers> {
    match ctx.config.section::<Markers>() {
        Ok(v) => Some(v),
        Err(err) => {
            eprintln!("Invalid markers config: {err}");
            None
        }
    }
}

/// Processes every input and prints the outcome.
///
/// Returns `false` if any input could not be read or reported an error.
async fn process_inputs(matches: &ArgMatches, markers: &Markers, output: &Output) -> bool {
    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("input")
        .unwrap_or_default()
        .cloned()
        .collect();
    let mut success = true;
    for path in inputs {
        let universe = match SymbolUniverse::parse_file(&path).await {
            Ok(v) => v,
            Err(err) => {
                error!(input = %path.display(), "{err}");
                eprintln!("{err}");
                success = false;
                continue;
            }
        };
        let report = run_rounds(&universe, markers, output);
        print_report(output, &report);
        info!(
            input = %path.display(),
            files = report.files.len(),
            errors = report.error_count(),
            "Processed input"
        );
        success &= !report.has_errors();
    }
    success
}

fn print_report(output: &Output, report: &RoundReport) {
    for diagnostic in &report.diagnostics {
        println!("{diagnostic}");
    }
    for file in &report.files {
        match output {
            Output::Directory(root) => {
                println!("wrote {}", root.join(&file.relative_path).display())
            }
            Output::Memory => println!("would write {}", file.relative_path.display()),
        }
    }
}

/// Generates modules into the output directory.
pub struct GenerateCommand;

impl Command for GenerateCommand {
    fn command() -> clap::Command {
        clap::Command::new("generate")
            .about("Generates provider modules")
            .arg(input_arg())
            .arg(
                Arg::new("output")
                    .long("output")
                    .short('d')
                    .help("Directory receiving the generated sources")
                    .value_parser(value_parser!(PathBuf)),
            )
    }

    async fn main(ctx: Arc<Context>, matches: ArgMatches) -> ExitCode {
        let Some(markers) = markers(&ctx) else {
            return ExitCode::FAILURE;
        };
        let directory = match matches.get_one::<PathBuf>("output") {
            Some(v) => Some(v.clone()),
            None => match ctx.config.section::<OutputConfig>() {
                Ok(v) => v.directory,
                Err(err) => {
                    eprintln!("Invalid output config: {err}");
                    return ExitCode::FAILURE;
                }
            },
        };
        let Some(directory) = directory else {
            eprintln!("No output directory, pass --output or set output.directory");
            return ExitCode::FAILURE;
        };
        if process_inputs(&matches, &markers, &Output::Directory(directory)).await {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Validates the inputs without writing anything.
pub struct CheckCommand;

impl Command for CheckCommand {
    fn command() -> clap::Command {
        clap::Command::new("check")
            .about("Validates declarations and lists the modules that would be generated")
            .arg(input_arg())
    }

    async fn main(ctx: Arc<Context>, matches: ArgMatches) -> ExitCode {
        let Some(markers) = markers(&ctx) else {
            return ExitCode::FAILURE;
        };
        if process_inputs(&matches, &markers, &Output::Memory).await {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Prints the effective configuration.
pub struct ConfigCommand;

impl Command for ConfigCommand {
    fn command() -> clap::Command {
        clap::Command::new("config").about("Prints the effective configuration")
    }

    async fn main(ctx: Arc<Context>, _matches: ArgMatches) -> ExitCode {
        match effective_config(&ctx.config).and_then(|v| v.to_json_pretty()) {
            Ok(v) => {
                println!("{v}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        }
    }
}

/// The configuration with defaults filled in for the generator sections.
pub fn effective_config(config: &Config) -> Result<Config, crate::StdError> {
    let mut effective = config.clone();
    effective.set("markers", config.section::<Markers>()?)?;
    effective.set("output", config.section::<OutputConfig>()?)?;
    Ok(effective)
}
