use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use roster_stats::filter::FieldFilter;
use roster_stats::{
    Dashboard, DashboardConfig, RosterCache, Selection, SemanticField, open_source,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OptionField {
    District,
    School,
    Class,
}

impl From<OptionField> for SemanticField {
    fn from(field: OptionField) -> Self {
        match field {
            OptionField::District => Self::District,
            OptionField::School => Self::School,
            OptionField::Class => Self::Class,
        }
    }
}

/// Filter selections shared by every subcommand; an omitted flag means "All".
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Keep only students of this district.
    #[arg(long)]
    district: Option<String>,

    /// Keep only students of this school.
    #[arg(long)]
    school: Option<String>,

    /// Keep only students of this class.
    #[arg(long)]
    class: Option<String>,
}

impl FilterArgs {
    fn to_filters(&self, dashboard: &Dashboard) -> Result<Vec<FieldFilter>> {
        [
            (SemanticField::District, &self.district),
            (SemanticField::School, &self.school),
            (SemanticField::Class, &self.class),
        ]
        .into_iter()
        .map(|(field, choice)| {
            dashboard
                .semantic_filter(field, Selection::from(choice.clone()))
                .with_context(|| format!("cannot filter on {field}"))
        })
        .collect()
    }
}

/// Summarize student counselling rosters from CSV or Parquet files.
#[derive(Parser, Debug)]
#[command(name = "roster-stats", version, about)]
struct Cli {
    /// JSON configuration file; defaults apply to absent settings.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every dashboard section for the filtered roster.
    Report {
        /// Roster file (.csv or .parquet) or directory of roster files.
        path: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write the filtered roster as delimited text.
    Export {
        /// Roster file (.csv or .parquet) or directory of roster files.
        path: PathBuf,

        /// Destination file.
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output field delimiter; the input keeps the configured one.
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// List the choices of a filter field under the given filters.
    Options {
        /// Roster file (.csv or .parquet) or directory of roster files.
        path: PathBuf,

        #[arg(long, value_enum)]
        field: OptionField,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    let config = match path {
        Some(path) => DashboardConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => DashboardConfig::default().with_env_overrides().validated()?,
    };
    Ok(config)
}

async fn load_dashboard(path: &Path, config: DashboardConfig) -> Result<Dashboard> {
    let start = Instant::now();
    let source = open_source(path, &config)
        .with_context(|| format!("cannot open roster source {}", path.display()))?;
    let cache = Arc::new(RosterCache::from_config(source, &config));
    let roster = cache
        .get_async()
        .await
        .with_context(|| format!("failed to read roster from {}", path.display()))?;

    info!(
        "Loaded {} students from {} in {:?}",
        roster.num_rows(),
        path.display(),
        start.elapsed()
    );

    Dashboard::new(roster, config).context("no roster data to summarize")
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Report {
            path,
            filters,
            format,
        } => {
            let dashboard = load_dashboard(&path, config).await?;
            let filters = filters.to_filters(&dashboard)?;
            let report = dashboard.report(&filters)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            match format {
                OutputFormat::Text => out.write_all(report.render_text().as_bytes())?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &report)?;
                    writeln!(out)?;
                }
            }
        }
        Command::Export {
            path,
            output,
            filters,
            delimiter,
        } => {
            if delimiter.is_some() {
                config.export_delimiter = delimiter;
                config = config.validated()?;
            }
            let dashboard = load_dashboard(&path, config).await?;
            let filters = filters.to_filters(&dashboard)?;

            let file = std::fs::File::create(&output)
                .with_context(|| format!("cannot create {}", output.display()))?;
            let mut writer = BufWriter::new(file);
            dashboard.export(&filters, &mut writer)?;
            writer.flush()?;
            info!("Exported filtered roster to {}", output.display());
        }
        Command::Options {
            path,
            field,
            filters,
        } => {
            let dashboard = load_dashboard(&path, config).await?;
            let filters = filters.to_filters(&dashboard)?;
            for choice in dashboard.options(field.into(), &filters)? {
                println!("{choice}");
            }
        }
    }

    Ok(())
}
