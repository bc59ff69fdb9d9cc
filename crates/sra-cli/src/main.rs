use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "sra-dispatch",
    about = "Balance SRA downloads across HTCondor nodes",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a size table into node batches and print the result.
    ///
    /// Nothing is written to disk.
    Plan {
        /// Job config (TOML, or JSON with a .json extension)
        #[arg(short, long, default_value = "sra-dispatch.toml")]
        config: String,
        /// Size table exported from the archive query (TSV, CSV or JSON)
        #[arg(short = 't', long)]
        catalog: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Pack, write per-node record lists, and render the HTCondor submission.
    Dispatch {
        #[arg(short, long, default_value = "sra-dispatch.toml")]
        config: String,
        #[arg(short = 't', long)]
        catalog: String,
    },
    /// Write a starter sra-dispatch.toml
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Query keyword to put in the scaffold
        #[arg(short, long, default_value = "RNA-Seq")]
        keyword: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("sra_dispatch=info".parse()?)
        .add_directive("sra_balance=info".parse()?)
        .add_directive("sra_catalog=info".parse()?)
        .add_directive("sra_submit=info".parse()?);

    if cli.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Commands::Plan {
            config,
            catalog,
            format,
        } => commands::plan::plan(&config, &catalog, &format),
        Commands::Dispatch { config, catalog } => commands::dispatch::dispatch(&config, &catalog),
        Commands::Init { path, keyword } => commands::init::init(&path, &keyword),
    }
}
