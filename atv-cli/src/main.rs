//! Command-line interface for ATV configuration documents
//!
//! Usage:
//!   atv check `<file>`                                  - Parse and validate a document
//!   atv inspect `<file>`                                - Print the parsed document as JSON
//!   atv migrate `<file>` --target `<version>`           - Migrate a document to a schema version
//!   atv merge [`<base>`] [--override `<file>`] [...]    - Merge a site override onto a base document
//!
//! Log output goes to stderr and is controlled by `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use atv::{Dialect, File, Version};
use atv_config::ServiceConfig;
use clap::{Arg, ArgMatches, Command};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("atv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for checking, migrating and merging ATV configuration documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check")
                .about("Parse a document and check its structure")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parsed document as JSON")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate a document to another schema version")
                .arg(file_arg())
                .arg(target_arg().required(true))
                .arg(dialect_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("merge")
                .about("Merge an override document onto a base document")
                .arg(
                    Arg::new("base")
                        .help("Path to the base document (default: input.base_configuration.path)")
                        .required_unless_present("config")
                        .index(1),
                )
                .arg(
                    Arg::new("override")
                        .long("override")
                        .help("Path to the override document (default: input.merge_configuration.path)"),
                )
                .arg(target_arg())
                .arg(dialect_arg())
                .arg(output_arg())
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Service configuration file (TOML or YAML)"),
                ),
        )
}

fn file_arg() -> Arg {
    Arg::new("file")
        .help("Path to the ATV document")
        .required(true)
        .index(1)
}

fn target_arg() -> Arg {
    Arg::new("target")
        .long("target")
        .short('t')
        .help("Target schema version, e.g. 8.7.1-default")
}

fn dialect_arg() -> Arg {
    Arg::new("dialect")
        .long("dialect")
        .short('d')
        .help("Output dialect")
        .value_parser(["atv", "ecs"])
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help("Write the result to this file instead of stdout")
}

fn main() -> Result<()> {
    init_logging();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("check", args)) => handle_check_command(args),
        Some(("inspect", args)) => handle_inspect_command(args),
        Some(("migrate", args)) => handle_migrate_command(args),
        Some(("merge", args)) => handle_merge_command(args),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read and parse a document from disk
fn read_file(path: &Path) -> Result<File> {
    tracing::debug!("Reading '{}'...", path.display());
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    File::parse(&source).with_context(|| format!("failed to parse '{}'", path.display()))
}

fn path_arg(args: &ArgMatches, id: &str) -> Option<PathBuf> {
    args.get_one::<String>(id).map(PathBuf::from)
}

fn version_arg(args: &ArgMatches) -> Result<Option<Version>> {
    args.get_one::<String>("target")
        .map(|text| text.parse::<Version>())
        .transpose()
        .context("invalid --target")
}

fn dialect_of(args: &ArgMatches) -> Result<Option<Dialect>> {
    args.get_one::<String>("dialect")
        .map(|name| name.parse::<Dialect>().map_err(anyhow::Error::msg))
        .transpose()
}

fn write_output(file: &File, dialect: Dialect, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let text = file.serialize(dialect)?;
            fs::write(path, text)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            tracing::info!("Wrote {} document '{}'", dialect, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            file.write_to(&mut handle, dialect)?;
            handle.flush()?;
        }
    }
    Ok(())
}

/// Handle the check command
fn handle_check_command(args: &ArgMatches) -> Result<()> {
    let path = path_arg(args, "file").context("missing file argument")?;
    let file = read_file(&path)?;
    file.document()
        .validate()
        .with_context(|| format!("'{}' is inconsistent", path.display()))?;
    println!("{}: ok (version {})", path.display(), file.version());
    Ok(())
}

/// Handle the inspect command
fn handle_inspect_command(args: &ArgMatches) -> Result<()> {
    let path = path_arg(args, "file").context("missing file argument")?;
    let file = read_file(&path)?;
    println!("{}", serde_json::to_string_pretty(&file)?);
    Ok(())
}

/// Handle the migrate command
fn handle_migrate_command(args: &ArgMatches) -> Result<()> {
    let path = path_arg(args, "file").context("missing file argument")?;
    let target = version_arg(args)?.context("missing --target")?;
    let dialect = dialect_of(args)?.unwrap_or_default();

    let file = read_file(&path)?;
    let migrated = file
        .migrate_to(&target)
        .with_context(|| format!("failed to migrate '{}'", path.display()))?;
    tracing::info!("Migrated '{}' from {} to {}", path.display(), file.version(), target);

    write_output(&migrated, dialect, path_arg(args, "output").as_deref())
}

/// Settings of one merge run, from the command line with the service
/// configuration as fallback
struct MergeJob {
    base: PathBuf,
    overrides: Option<PathBuf>,
    target: Option<Version>,
    dialects: Vec<Dialect>,
    output: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl MergeJob {
    fn from_args(args: &ArgMatches) -> Result<Self> {
        let config = match path_arg(args, "config") {
            Some(path) => Some(
                atv_config::load_service_config(&path)
                    .with_context(|| format!("failed to load '{}'", path.display()))?,
            ),
            None => None,
        };
        let config: Option<&ServiceConfig> = config.as_ref();

        let base = match path_arg(args, "base") {
            Some(path) => path,
            None => config
                .map(|config| config.input.base_configuration.path.clone())
                .context("no base document given")?,
        };
        let overrides = path_arg(args, "override").or_else(|| {
            config
                .and_then(ServiceConfig::merge_configuration_path)
                .map(Path::to_path_buf)
        });
        let target = match version_arg(args)? {
            Some(version) => Some(version),
            None => match config {
                Some(config) => config.target_version()?,
                None => None,
            },
        };
        let dialects = match (dialect_of(args)?, config) {
            (Some(dialect), _) => vec![dialect],
            (None, Some(config)) => config.output_dialects(),
            (None, None) => vec![Dialect::Atv],
        };
        let output = path_arg(args, "output");
        let output_dir = config
            .and_then(ServiceConfig::merged_configurations_path)
            .map(Path::to_path_buf);

        if dialects.is_empty() {
            bail!("no output dialect enabled");
        }
        if dialects.len() > 1 && output_dir.is_none() {
            bail!("several output dialects need an output directory");
        }
        if dialects.len() > 1 && output.is_some() {
            bail!("--output takes a single dialect, pass --dialect");
        }

        Ok(MergeJob {
            base,
            overrides,
            target,
            dialects,
            output,
            output_dir,
        })
    }

    fn output_path(&self, dialect: Dialect) -> Option<PathBuf> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }
        let dir = self.output_dir.as_ref()?;
        let stem = self
            .base
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "merged".to_string());
        Some(dir.join(format!("{stem}.{}", dialect.extension())))
    }
}

/// Without an explicit target both documents move to the newer of their versions
fn merge_target(base: &File, overrides: Option<&File>) -> Version {
    match overrides {
        Some(overrides) if overrides.version().release_cmp(base.version()).is_gt() => {
            overrides.version().clone()
        }
        _ => base.version().clone(),
    }
}

/// Handle the merge command
fn handle_merge_command(args: &ArgMatches) -> Result<()> {
    let job = MergeJob::from_args(args)?;

    let base = read_file(&job.base)?;
    let overrides = job.overrides.as_deref().map(read_file).transpose()?;
    let target = job
        .target
        .clone()
        .unwrap_or_else(|| merge_target(&base, overrides.as_ref()));

    let base = base
        .migrate_to(&target)
        .with_context(|| format!("failed to migrate '{}'", job.base.display()))?;
    let overrides = match (overrides, &job.overrides) {
        (Some(file), Some(path)) => Some(
            file.migrate_to(&target)
                .with_context(|| format!("failed to migrate '{}'", path.display()))?,
        ),
        _ => None,
    };

    let merged = base.merge(overrides.as_ref()).context("failed to merge")?;
    tracing::info!("Merged configuration at version {}", merged.version());

    if let (None, Some(dir)) = (&job.output, &job.output_dir) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create '{}'", dir.display()))?;
    }
    for dialect in &job.dialects {
        write_output(&merged, *dialect, job.output_path(*dialect).as_deref())?;
    }
    Ok(())
}
