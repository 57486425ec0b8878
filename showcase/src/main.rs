use std::path::PathBuf;
use clap::{Parser, Subcommand};
use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showcase::api::{ApiServer, ApiServerConfig, AppState};
use showcase::{client_from_config, AppConfig};
use showcase_core::controller::{QueryParams, SortDirection};
use showcase_core::layout::{solve, LayoutConstraints};
use showcase_core::portfolio::ProjectController;

#[derive(Parser)]
#[command(name = "showcase")]
#[command(about = "GitHub portfolio showcase", long_about = None)]
struct Cli {
    /// Config file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Response cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects with filters and sorts applied
    Projects {
        /// GitHub user (defaults to GITHUB_USER)
        #[arg(short, long)]
        user: Option<String>,

        /// Comma-separated filter ids (e.g. pinned,hasDemo)
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort id (e.g. mostStars, name, category:Rust)
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort direction
        #[arg(long, value_parser = parse_direction)]
        sort_dir: Option<SortDirection>,

        /// Show one language only, ordered by its share
        #[arg(long)]
        category: Option<String>,

        /// Container width in pixels, to also print a layout
        #[arg(short, long)]
        width: Option<f64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Solve the card layout for a width
    Layout {
        /// Container width in pixels
        #[arg(short, long)]
        width: f64,

        /// Number of cards
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Start API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached response
    Clear,
}

fn parse_direction(value: &str) -> Result<SortDirection, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "showcase=info,showcase_core=info".into())
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Projects { ref user, ref filter, ref sort, sort_dir, ref category, width, json } => {
            let Some(user) = user.clone().or_else(|| config.github.user.clone()) else {
                bail!("No GitHub user given. Pass --user or set GITHUB_USER.");
            };

            let mut params = QueryParams::new();
            if let Some(filter) = filter {
                params.set("filter", filter.as_str());
            }
            if let Some(sort) = sort {
                params.set("sort", sort.as_str());
            }
            if let Some(dir) = sort_dir {
                params.set("sortDir", dir.as_str());
            }
            if let Some(category) = category {
                params.set("category", category.as_str());
            }

            let github = client_from_config(&config)?;
            let projects = github.load_projects(&user).await?;
            let controller = ProjectController::builder(projects)
                .config(config.controller.clone())
                .initial_query(params)
                .build();

            let layout = width.map(|width| {
                solve(&LayoutConstraints {
                    total_width: width,
                    item_count_upper_bound: controller.items().len().max(1),
                    ..config.layout
                })
            });

            if json {
                let out = serde_json::json!({
                    "user": user,
                    "projects": controller.items(),
                    "query": controller.query_params().to_query_string(),
                    "layout": layout,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            let stats = controller.stats();
            println!(
                "{}: {} of {} projects ({} stars)",
                user,
                controller.items().len(),
                stats.total_projects,
                stats.total_stars
            );
            let query = controller.query_params().to_query_string();
            if !query.is_empty() {
                println!("State: ?{}", query);
            }
            println!("{}", "=".repeat(70));
            for project in controller.items() {
                let pin = if project.pinned { "*" } else { " " };
                println!(
                    "{} {:<32} {:>6} stars {:>5} forks  {}",
                    pin,
                    project.name,
                    project.stars,
                    project.forks,
                    project.language.as_deref().unwrap_or("-")
                );
            }

            if let Some(layout) = layout {
                println!(
                    "\nLayout: {} columns, {:.1}px cards, {:.1}px gap, {} rows",
                    layout.columns,
                    layout.card_width,
                    layout.gap,
                    layout.rows(controller.items().len())
                );
            }
        }

        Commands::Layout { width, count } => {
            let constraints = LayoutConstraints {
                total_width: width,
                item_count_upper_bound: count.unwrap_or(config.layout.item_count_upper_bound),
                ..config.layout
            };
            let layout = solve(&constraints);
            println!("Columns:    {}", layout.columns);
            println!("Card width: {:.2}px", layout.card_width);
            println!("Gap:        {:.2}px", layout.gap);
            println!("Row width:  {:.2}px of {:.2}px", layout.row_width(), width);
        }

        Commands::Cache { action: CacheAction::Clear } => {
            let github = client_from_config(&config)?;
            github.cache().clear().await;
            println!("Cleared cache at {:?}", config.cache.dir);
        }

        Commands::Serve { ref host, port } => {
            let server_config = ApiServerConfig {
                host: host.clone().unwrap_or_else(|| config.server.host.clone()),
                port: port.unwrap_or(config.server.port),
            };
            let state = AppState {
                github: client_from_config(&config)?,
                default_user: config.github.user.clone(),
                controller: config.controller.clone(),
                layout: config.layout,
            };

            println!("Starting API server on {}:{}", server_config.host, server_config.port);
            ApiServer::new(server_config, state).start().await?;
        }
    }

    Ok(())
}

/// File and environment settings with CLI flags applied on top
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(token) = &cli.token {
        config.github.token = Some(token.clone());
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}
