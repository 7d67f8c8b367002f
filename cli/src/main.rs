use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cw_bindgen_cli::{compile_contract, run, ContractTarget, DriverConfig};

#[derive(Parser)]
#[command(name = "cw-bindgen")]
#[command(about = "Generate typed Rust bindings from CosmWasm contract schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings for every contract in a config file, or for one contract
    Generate {
        /// TOML file listing the contracts to generate
        #[arg(short, long, conflicts_with_all = ["name", "schema", "out"])]
        config: Option<PathBuf>,

        /// Contract identity (used for the client name)
        #[arg(short, long)]
        name: Option<String>,

        /// Directory holding the contract's schema files
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output file name (defaults to `<name>.rs`)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Print the generated module's type names and client methods as JSON
    Inspect(ContractArgs),

    /// Print the generated Rust code to stdout
    Print(ContractArgs),
}

#[derive(Args)]
struct ContractArgs {
    /// Contract identity (used for the client name)
    #[arg(short, long)]
    name: String,

    /// Directory holding the contract's schema files
    #[arg(short, long)]
    schema: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cw_bindgen=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config, name, schema, out, file } => {
            let config = match (config, name, schema, out) {
                (Some(path), ..) => DriverConfig::load(&path)?,
                (None, Some(name), Some(schema), Some(out)) => {
                    let mut target = ContractTarget::new(name, schema, out);
                    target.file = file;
                    DriverConfig::single(target)
                }
                _ => bail!("Pass either --config, or all of --name, --schema and --out"),
            };

            let report = run(&config);
            info!(
                generated = report.generated.len(),
                failed = report.failed.len(),
                "finished"
            );
            if !report.is_success() {
                let names: Vec<&str> = report.failed.iter().map(|f| f.name.as_str()).collect();
                bail!("Failed to generate bindings for {}", names.join(", "));
            }
            Ok(())
        }

        Commands::Inspect(args) => {
            let module = compile_contract(&args.name, &args.schema)?;
            println!("{}", serde_json::to_string_pretty(&module)?);
            Ok(())
        }

        Commands::Print(args) => {
            let module = compile_contract(&args.name, &args.schema)?;
            print!("{}", module.render());
            Ok(())
        }
    }
}
