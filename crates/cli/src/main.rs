use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the effective settings as JSON
    Config,
    /// Print the method/path table of every module
    Routes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve { port, host } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(host) = host {
                settings.server.host = host;
            }
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf serve");

            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(bookshelf_app::serve(settings))
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Routes => {
            let registry = bookshelf_app::build_registry(&settings)?;
            for module in registry.modules() {
                let mount_path = module.mount_path();
                for route in module.route_table() {
                    let path = if route.path == "/" {
                        mount_path.clone()
                    } else {
                        format!("{}{}", mount_path, route.path)
                    };
                    println!("{:<7} {:<16} {}", route.method, path, route.summary);
                }
            }
            Ok(())
        }
    }
}
