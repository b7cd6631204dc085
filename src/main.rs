//! hivescope - Enumerate and report on registry-style key stores.
//!
//! Usage:
//!   hivescope tree --snapshot FILE [ROOT]    Export a key tree
//!   hivescope users --snapshot FILE          List per-user identities
//!   hivescope software --snapshot FILE       Export each user's SOFTWARE tree
//!   hivescope values --snapshot FILE         Export configured value groups
//!   hivescope --help                         Show help

mod config;
mod logging;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info};

use hivescope_core::{EnumerationOptions, EnumerationResult, Hive, KeyStore, StoreLocator, ValueQuery, View};
use hivescope_export::{
    ReportHeader, ReportSink, TREE_TITLE, VALUES_TITLE, render_tree, render_tree_body, render_values, separator,
};
use hivescope_filter::{FilterSpec, NameFilter};
use hivescope_scan::identity::{self, ProfileListResolver};
use hivescope_scan::{DirectoryStore, KeyEnumerator, MemoryStore, forward_progress, read_value_groups};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "hivescope",
    version,
    about = "Enumerate and report on registry-style key stores",
    long_about = "hivescope walks a hierarchical key store (a JSON snapshot or a directory \
                  tree laid out by hive), filters key names, and writes text or JSON reports."
)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase stderr log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the key tree below a root path
    Tree {
        /// Root path below the hive ("" = hive top level)
        #[arg(default_value = "")]
        root: String,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        location: LocationArgs,

        /// Descend below the direct children of the root
        #[arg(short, long)]
        recursive: bool,

        /// Deepest depth to include when recursive (-1 = unlimited)
        #[arg(short = 'd', long, default_value_t = -1, allow_negative_numbers = true)]
        max_depth: i64,

        /// Omit keys without children
        #[arg(long)]
        exclude_empty: bool,

        #[command(flatten)]
        filter: FilterArgs,

        /// Report title
        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List per-user identities under HKEY_USERS
    Users {
        #[command(flatten)]
        store: StoreArgs,

        /// Resolve account names from the machine profile list
        #[arg(short, long)]
        labels: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export each user's SOFTWARE key tree
    Software {
        #[command(flatten)]
        store: StoreArgs,

        /// Deepest depth to include (-1 = unlimited)
        #[arg(short = 'd', long, default_value_t = identity::DEFAULT_SOFTWARE_DEPTH as i64, allow_negative_numbers = true)]
        max_depth: i64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export the configured value groups
    Values {
        #[command(flatten)]
        store: StoreArgs,

        /// Read a single key instead of the configured groups
        #[arg(short, long)]
        key: Option<String>,

        /// Value names to read from --key
        #[arg(short = 'n', long = "value", requires = "key")]
        values: Vec<String>,

        #[command(flatten)]
        location: LocationArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Which store to read.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct StoreArgs {
    /// JSON snapshot file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Directory tree with one subdirectory per hive
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Args)]
struct LocationArgs {
    /// Hive (HKLM, HKCU, HKU, HKCR, HKCC or the full name)
    #[arg(long, default_value = "HKLM")]
    hive: Hive,

    /// Registry view (default, registry32, registry64)
    #[arg(long, default_value = "registry64")]
    view: View,
}

impl LocationArgs {
    fn locator(&self) -> StoreLocator {
        StoreLocator::new(self.hive, self.view)
    }
}

#[derive(Args)]
struct FilterArgs {
    /// Keep only names matching this pattern
    #[arg(short, long = "match")]
    pattern: Option<String>,

    /// How --match is interpreted
    #[arg(long, value_enum, default_value_t = MatchMode::Exact)]
    mode: MatchMode,

    /// Regular expression vetoing a name (repeatable)
    #[arg(short = 'x', long)]
    exclude: Vec<String>,

    /// Invert the filter
    #[arg(long)]
    invert: bool,

    /// Compare case-sensitively
    #[arg(long)]
    case_sensitive: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatchMode {
    Exact,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    Wildcard,
}

impl FilterArgs {
    /// The command-line filter, or `None` when no filter option was given.
    fn spec(&self) -> Option<FilterSpec> {
        if self.pattern.is_none() && self.exclude.is_empty() && !self.invert {
            return None;
        }

        let mut spec = match &self.pattern {
            None => FilterSpec::any(),
            Some(p) => match self.mode {
                MatchMode::Exact => FilterSpec::exact(p),
                MatchMode::Contains => FilterSpec::contains(p),
                MatchMode::StartsWith => FilterSpec::starts_with(p),
                MatchMode::EndsWith => FilterSpec::ends_with(p),
                MatchMode::Regex => FilterSpec::regex(p),
                MatchMode::Wildcard => FilterSpec::wildcard(p),
            },
        };
        for pattern in &self.exclude {
            spec = spec.excluding(pattern);
        }
        if self.invert {
            spec = spec.inverted();
        }
        Some(spec.case_sensitive(self.case_sensitive))
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output file ("-" = stdout; relative paths resolve against output_dir)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// An opened store of either kind.
enum Source {
    Snapshot(MemoryStore),
    Directory(DirectoryStore),
}

impl StoreArgs {
    fn open(&self) -> Result<Source> {
        match (&self.snapshot, &self.dir) {
            (Some(path), _) => {
                let store = MemoryStore::load(path)
                    .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
                Ok(Source::Snapshot(store))
            }
            (None, Some(dir)) => {
                if !dir.is_dir() {
                    bail!("Store directory does not exist: {}", dir.display());
                }
                Ok(Source::Directory(DirectoryStore::new(dir)))
            }
            (None, None) => bail!("Either --snapshot or --dir is required"),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = logging::init(&config.log_dir, cli.verbose);
    debug!(output_dir = %config.output_dir.display(), "configuration loaded");

    let sink = ReportSink::new(&config.output_dir);

    match cli.command {
        Command::Tree {
            root,
            store,
            location,
            recursive,
            max_depth,
            exclude_empty,
            filter,
            title,
            output,
        } => {
            let options = EnumerationOptions {
                recursive,
                max_depth: None,
                include_empty: !exclude_empty,
            }
            .with_signed_max_depth(max_depth);

            let spec = filter.spec().or_else(|| config.tree_filter.clone());
            let filter = spec
                .map(|s| s.compile())
                .transpose()
                .context("Invalid filter")?;

            let request = TreeRequest {
                root: &root,
                locator: location.locator(),
                options,
                filter: filter.as_ref(),
                title: title.as_deref(),
            };
            match store.open()? {
                Source::Snapshot(s) => run_tree(&s, &request, &sink, &output)?,
                Source::Directory(s) => run_tree(&s, &request, &sink, &output)?,
            }
        }
        Command::Users { store, labels, output } => match store.open()? {
            Source::Snapshot(s) => run_users(&s, labels, &sink, &output)?,
            Source::Directory(s) => run_users(&s, labels, &sink, &output)?,
        },
        Command::Software { store, max_depth, output } => {
            let options = identity::default_software_options().with_signed_max_depth(max_depth);
            match store.open()? {
                Source::Snapshot(s) => run_software(&s, &options, &sink, &output)?,
                Source::Directory(s) => run_software(&s, &options, &sink, &output)?,
            }
        }
        Command::Values {
            store,
            key,
            values,
            location,
            output,
        } => {
            let queries = match key {
                Some(path) => vec![ValueQuery::new(path, values).with_locator(location.locator())],
                None => config.value_groups.clone(),
            };
            match store.open()? {
                Source::Snapshot(s) => run_values(&s, &queries, &sink, &output)?,
                Source::Directory(s) => run_values(&s, &queries, &sink, &output)?,
            }
        }
    }

    Ok(())
}

struct TreeRequest<'a> {
    root: &'a str,
    locator: StoreLocator,
    options: EnumerationOptions,
    filter: Option<&'a NameFilter>,
    title: Option<&'a str>,
}

/// Enumerate one root and emit its report.
fn run_tree<S: KeyStore>(
    store: &S,
    request: &TreeRequest<'_>,
    sink: &ReportSink,
    output: &OutputArgs,
) -> Result<()> {
    let enumerator = KeyEnumerator::new();
    let progress = watch_progress(&enumerator);

    let result = enumerator.enumerate(
        store,
        request.root,
        &request.locator,
        request.filter.map(|f| f as &dyn hivescope_filter::NameMatch),
        &request.options,
    );
    drop(enumerator);
    let _ = progress.join();

    let title = request.title.unwrap_or(if request.root.is_empty() { TREE_TITLE } else { request.root });
    match output.format {
        OutputFormat::Text => {
            let text = render_tree(&result, &ReportHeader::now(title));
            emit(sink, output, "registry_enumerate", &text)?;
        }
        OutputFormat::Json => emit_json(sink, output, &result)?,
    }

    if !result.success {
        bail!(result.error_message.unwrap_or_default());
    }
    Ok(())
}

/// Forward progress snapshots to the log until the enumerator is dropped.
fn watch_progress(enumerator: &KeyEnumerator) -> std::thread::JoinHandle<()> {
    let rx = enumerator.subscribe();
    std::thread::spawn(move || {
        forward_progress(rx, |progress| {
            debug!(
                inspected = progress.keys_inspected,
                retained = progress.keys_retained,
                current = %progress.current_path,
                rate = progress.keys_per_second(),
                "progress"
            );
        })
    })
}

#[derive(Serialize)]
struct Identity {
    sid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<String>,
}

fn run_users<S: KeyStore>(store: &S, labels: bool, sink: &ReportSink, output: &OutputArgs) -> Result<()> {
    let users = StoreLocator::hive(Hive::Users);
    let identities: Vec<Identity> = if labels {
        let resolver = ProfileListResolver::new(store);
        identity::identities_with_labels(store, &users, &resolver)
            .into_iter()
            .map(|(sid, label)| Identity { sid, account: Some(label) })
            .collect()
    } else {
        identity::list_identities(store, &users)
            .into_iter()
            .map(|sid| Identity { sid, account: None })
            .collect()
    };
    info!(count = identities.len(), "identities discovered");

    match output.format {
        OutputFormat::Text => {
            let mut text = String::new();
            for id in &identities {
                match &id.account {
                    Some(account) => text.push_str(&format!("{}\t{account}\n", id.sid)),
                    None => text.push_str(&format!("{}\n", id.sid)),
                }
            }
            // Short listing: stdout unless a file was asked for.
            if output.output.is_none() {
                print!("{text}");
                return Ok(());
            }
            emit(sink, output, "registry_users", &text)
        }
        OutputFormat::Json => emit_json(sink, output, &identities),
    }
}

fn run_software<S: KeyStore>(
    store: &S,
    options: &EnumerationOptions,
    sink: &ReportSink,
    output: &OutputArgs,
) -> Result<()> {
    let users = StoreLocator::hive(Hive::Users);
    let results = identity::enumerate_user_software(&KeyEnumerator::new(), store, &users, options);

    match output.format {
        OutputFormat::Text => {
            let header = ReportHeader::now("User Software Export");
            let mut text = format!("{}\nUsers: {}\n{}\n\n", header.title_line(), results.len(), separator());
            for (sid, result) in &results {
                text.push_str(&software_section(sid, result));
            }
            emit(sink, output, "registry_software", &text)
        }
        OutputFormat::Json => emit_json(sink, output, &results),
    }
}

fn software_section(sid: &str, result: &EnumerationResult) -> String {
    format!(
        "===== {sid} =====\nTotal: {}, Filtered: {}\n\n{}\n",
        result.total_count,
        result.filtered_count,
        render_tree_body(&result.nodes)
    )
}

fn run_values<S: KeyStore>(
    store: &S,
    queries: &[ValueQuery],
    sink: &ReportSink,
    output: &OutputArgs,
) -> Result<()> {
    let groups = read_value_groups(store, queries);
    info!(
        groups = groups.len(),
        read = groups.iter().filter(|g| g.is_read()).count(),
        "value groups read"
    );

    match output.format {
        OutputFormat::Text => {
            let text = render_values(&ReportHeader::now(VALUES_TITLE), &groups);
            emit(sink, output, "registry_export", &text)
        }
        OutputFormat::Json => emit_json(sink, output, &groups),
    }
}

/// Write a text report to `--output`, or to a timestamped file named after
/// `base` in the output directory.
fn emit(sink: &ReportSink, output: &OutputArgs, base: &str, text: &str) -> Result<()> {
    match output.output.as_deref() {
        Some("-") => print!("{text}"),
        Some(path) => write_report(sink, path, text)?,
        None => write_report(sink, &ReportSink::export_name(base), text)?,
    }
    Ok(())
}

/// JSON goes to stdout unless `--output` names a file.
fn emit_json<T: Serialize>(sink: &ReportSink, output: &OutputArgs, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output.output.as_deref() {
        None | Some("-") => println!("{json}"),
        Some(path) => write_report(sink, path, &json)?,
    }
    Ok(())
}

fn write_report(sink: &ReportSink, path: &str, text: &str) -> Result<()> {
    let written = sink.write(path, text).context("Failed to write report")?;
    eprintln!("Report written to {}", written.display());
    Ok(())
}
