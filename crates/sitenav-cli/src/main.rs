use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use sitenav_core::services::{EventBus, MenuService};
use sitenav_core::tree;
use sitenav_gateway::HttpMenuGateway;
use sitenav_shared::config::AppConfig;
use sitenav_shared::{telemetry, EntityId};

#[derive(Parser)]
#[command(name = "sitenav-cli")]
#[command(about = "Inspect and verify a site's navigation tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Site whose menu tree to operate on
    #[arg(short, long, env = "SITENAV_SITE_ID")]
    site: EntityId,

    /// Override the API base URL from configuration
    #[arg(long, env = "SITENAV_BASE_URL")]
    base_url: Option<String>,

    /// Bearer token for the admin API
    #[arg(long, env = "SITENAV_TOKEN")]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the site's menu tree
    Tree {
        /// Only enabled entries, pruning disabled subtrees
        #[arg(long)]
        enabled_only: bool,
    },
    /// Verify ordering and parent invariants over the flat list
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_telemetry();

    let cli = Cli::parse();

    let mut api = AppConfig::load()?.api;
    if let Some(base_url) = cli.base_url {
        api.base_url = base_url;
    }
    if cli.token.is_some() {
        api.token = cli.token;
    }

    let gateway = Arc::new(HttpMenuGateway::from_settings(&api));
    let events = Arc::new(EventBus::default());
    let service = MenuService::new(gateway, events, cli.site);

    let count = service.refresh().await?;
    info!("Fetched {} menus for site {}", count, cli.site);

    match cli.command {
        Commands::Tree { enabled_only } => {
            let forest = if enabled_only {
                service.enabled_tree().await
            } else {
                service.tree().await
            };
            if forest.is_empty() {
                println!("(no menus)");
            }
            for root in &forest {
                print_node(root, 0);
            }
        }
        Commands::Check => {
            let nodes = service.nodes().await;
            let violations = tree::invariants::violations(&nodes);
            if violations.is_empty() {
                println!("OK: {} menus, invariants hold", count);
            } else {
                for violation in &violations {
                    println!("VIOLATION: {}", violation);
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_node(tree_node: &tree::TreeNode, depth: usize) {
    let menu = &tree_node.menu;
    let marker = if menu.enabled { "" } else { " (disabled)" };
    println!(
        "{}{} [{}]{}",
        "  ".repeat(depth),
        menu.name,
        menu.url.as_deref().unwrap_or("-"),
        marker
    );
    for child in &tree_node.children {
        print_node(child, depth + 1);
    }
}
