use clap::{Parser, Subcommand};

/// Command-line interface definition for eventboard
/// Event tracking service with start/stop logging over SQLite
#[derive(Parser)]
#[command(
    name = "eventboard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Event tracking service: start/stop logging with running duration statistics over SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Run the HTTP API server
    Serve {
        /// Override the listen address (host:port)
        #[arg(long = "listen", help = "Listen address, e.g. 127.0.0.1:5000")]
        listen: Option<String>,

        /// Directory of static dashboard files served at /
        #[arg(long = "static-dir", help = "Serve static dashboard files from this directory")]
        static_dir: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Manage the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,
    },
}
