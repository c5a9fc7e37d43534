use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use ymonitor::app::{log_boot_banner, AppContext};
use ymonitor::config::Config;
use ymonitor::services::{AlertFilters, AlertService, DiscoveryService, RuleService, TransportService};

#[derive(Parser)]
#[command(name = "ymonitor", about = "SNMP network-device monitoring platform")]
struct Cli {
    #[arg(long, default_value = "config/ymonitor.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs pending migrations, then starts the scheduler and blocks.
    Serve,
    /// Applies pending database migrations and exits.
    Migrate,
    /// Seeds a handful of sample devices, rules and transports.
    Seed,
    /// Runs a full discovery session against one device.
    Discover {
        device_id: Uuid,
        #[arg(long, value_delimiter = ',')]
        modules: Option<Vec<String>>,
    },
    /// Dry-runs a rule against one device without creating an alert.
    TestRule { rule_id: Uuid, device_id: Uuid },
    /// Sends a synthetic test notification through one transport.
    TestTransport { transport_id: Uuid },
    /// Lists currently open/acknowledged/suppressed alerts.
    ListAlerts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli.command {
        Command::Migrate => {
            let db = sea_orm::Database::connect(&config.database_url).await?;
            Migrator::up(&db, None).await?;
            println!("migrations applied");
        }
        Command::Seed => {
            let db = sea_orm::Database::connect(&config.database_url).await?;
            ymonitor::seeders::seed_development(&db).await?;
            println!("seed data inserted");
        }
        Command::Serve => {
            let db = sea_orm::Database::connect(&config.database_url).await?;
            Migrator::up(&db, None).await?;
            let ctx = AppContext::boot(config).await?;
            log_boot_banner(&ctx.config);
            let handles = ctx.run_scheduler();
            futures_wait_forever(handles).await;
        }
        Command::Discover { device_id, modules } => {
            let ctx = AppContext::boot(config).await?;
            let service = DiscoveryService::new(ctx.db.clone(), ctx.orchestrator.clone());
            let session_id = service.start_discovery(device_id, modules).await?;
            println!("discovery session started: {session_id}");
        }
        Command::TestRule { rule_id, device_id } => {
            let ctx = AppContext::boot(config).await?;
            let service = RuleService::new(ctx.db.clone(), ctx.evaluator.clone());
            let matched = service.test_rule(rule_id, device_id).await?;
            println!("rule {rule_id} against device {device_id}: {}", if matched { "matches" } else { "does not match" });
        }
        Command::TestTransport { transport_id } => {
            let ctx = AppContext::boot(config).await?;
            let service = TransportService::new(ctx.db.clone());
            let result = service.test_transport(transport_id).await?;
            println!("transport {transport_id} responded: {result}");
        }
        Command::ListAlerts => {
            let ctx = AppContext::boot(config).await?;
            let service = AlertService::new(ctx.db.clone());
            let alerts = service.list_alerts(AlertFilters::default()).await?;
            for alert in alerts {
                println!("{} [{}] {} - {}", alert.id, alert.severity.as_str(), alert.state.as_str(), alert.title);
            }
        }
    }

    Ok(())
}

async fn futures_wait_forever(handles: Vec<tokio::task::JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}
