//! `seobot` CLI: one-shot engine runs against the configured database.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use seobot_common::{BotSettings, Config};
use seobot_engine::{workflows, SeoStore};
use seobot_store::PgStore;

const CLI_ACTOR: &str = "cli";

#[derive(Parser)]
#[command(name = "seobot", about = "SEO metadata engine for the dental directory")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate metadata for the whole page space
    Generate,
    /// Run the corpus-wide duplicate pass
    CheckDuplicates,
    /// Read-only corpus audit
    Audit,
    /// Preview (or apply) a rollback by batch id or slug
    Rollback {
        #[arg(long)]
        batch_id: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        /// Write the history values back instead of previewing
        #[arg(long)]
        apply: bool,
    },
    /// Pages similar to the given slug
    Similar {
        slug: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Recent audit runs
    Runs,
    /// Lightweight corpus stats
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("seobot=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::cli_from_env();

    let store = PgStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let settings = BotSettings::from_kv(&store.raw_settings().await.unwrap_or_default());
    let store: &dyn SeoStore = &store;

    match cli.command {
        Command::Generate => {
            let outcome =
                workflows::generate::generate_metadata(store, &settings, &config.site_base_url, CLI_ACTOR)
                    .await?;
            print_json(&outcome)?;
        }
        Command::CheckDuplicates => {
            let outcome = workflows::duplicates::check_duplicates(store).await?;
            print_json(&outcome)?;
        }
        Command::Audit => {
            let report = workflows::audit::audit(store).await?;
            print_json(&report)?;
        }
        Command::Rollback {
            batch_id,
            slug,
            apply,
        } => {
            if apply {
                let outcome = workflows::rollback::apply(
                    store,
                    batch_id.as_deref(),
                    slug.as_deref(),
                    CLI_ACTOR,
                )
                .await?;
                print_json(&outcome)?;
            } else {
                let preview =
                    workflows::rollback::preview(store, batch_id.as_deref(), slug.as_deref())
                        .await?;
                print_json(&preview)?;
            }
        }
        Command::Similar { slug, limit } => {
            let outcome = workflows::similar::similar_pages(store, &slug, limit, &settings).await?;
            print_json(&outcome)?;
        }
        Command::Runs => {
            let runs = workflows::recent_runs(store).await?;
            print_json(&runs)?;
        }
        Command::Stats => {
            let stats = workflows::corpus_stats(store).await?;
            print_json(&stats)?;
        }
    }

    info!("Done");
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
