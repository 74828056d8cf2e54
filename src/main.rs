use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use nios_extattr::app::run_module_use_case::RunModuleUseCase;
use nios_extattr::config::Config;
use nios_extattr::extensible_attribute;
use nios_extattr::infra::{ReqwestWapi, WapiReconciler};
use nios_extattr::logging;
use nios_extattr::schema::argument_spec;

#[derive(Parser)]
#[command(name = "nios_extensible_attribute")]
#[command(about = "Configure NIOS extensible attribute definitions through WAPI")]
#[command(version = "0.1.0")]
struct Cli {
    /// JSON arguments file (read from stdin when omitted)
    args_file: Option<PathBuf>,

    /// TOML settings file with [provider] and [logging] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report what would change without touching the appliance
    #[arg(long)]
    check: bool,

    /// Print the JSON Schema of the accepted arguments and exit
    #[arg(long)]
    print_schema: bool,
}

fn read_args(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(p) => fs::read_to_string(p)
            .with_context(|| format!("failed to read arguments file '{}'", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read arguments from stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("module arguments are not valid JSON")
}

fn run(cli: &Cli, config: &Config) -> Result<String> {
    if cli.print_schema {
        let schema = argument_spec(extensible_attribute::ib_spec()).to_json_schema();
        return Ok(serde_json::to_string_pretty(&schema)?);
    }

    let use_case = RunModuleUseCase::extensible_attribute();
    let raw = read_args(cli.args_file.as_deref())?;

    // Validation happens before any connection is opened
    let mut params = use_case.prepare(raw, &config.provider)?;
    params.check_mode |= cli.check;

    info!(host = %params.provider.host, wapi_version = %params.provider.wapi_version, "connecting to WAPI");
    let client = WapiReconciler::new(ReqwestWapi::new(&params.provider)?);
    let result = use_case.execute(&params, &client)?;

    Ok(serde_json::to_string(&result)?)
}

fn fail(msg: String) -> ! {
    println!("{}", json!({ "failed": true, "msg": msg }));
    std::process::exit(1);
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(e.to_string()),
    };
    let guard = match logging::init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => fail(e.to_string()),
    };

    match run(&cli, &config) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("module failed: {:#}", e);
            // exit() skips destructors; flush the log file first
            drop(guard);
            fail(format!("{:#}", e));
        }
    }
}
