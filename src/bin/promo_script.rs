//! promo-script — 根据关键词生成促销脚本的命令行工具
//!
//! Usage:
//!   promo-script generate <keywords> [--config <path>] [--json]   Generate a script
//!   promo-script prompt <keywords>                                  Print the rendered prompt
//!   promo-script schema                                             Print input/output schemas

use anyhow::{bail, Context};
use jinglemaker::backend::GeminiBackend;
use jinglemaker::config::FlowConfig;
use jinglemaker::flows::promo_script::{self, GenerationRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jinglemaker::telemetry::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]).await,
        "prompt" => cmd_prompt(&args[2..]),
        "schema" => cmd_schema(),
        "version" | "--version" | "-V" => {
            println!("promo-script {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"promo-script — promotional script generator

USAGE:
    promo-script <COMMAND> [OPTIONS]

COMMANDS:
    generate <keywords> [--config <path>] [--json]
                                Generate a promotional script
    prompt <keywords>           Print the rendered prompt without calling the model
    schema                      Print the declared input and output schemas
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    GEMINI_API_KEY              API key for the generation backend
    JINGLE_MODEL                Model override (default gemini-2.0-flash)
    JINGLE_BASE_URL             API base URL override
    JINGLE_TIMEOUT_SECS         Request timeout in seconds (default 30)
    JINGLE_TEMPERATURE          Sampling temperature
    RUST_LOG                    Log filter (default jinglemaker=info)"#
    );
}

/// Positional keywords (joined with spaces) plus `--flag [value]` options.
struct Args {
    keywords: String,
    config: Option<String>,
    json: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut words = Vec::new();
    let mut config = None;
    let mut json = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(iter.next().context("--config needs a path")?.clone());
            }
            "--json" => json = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            word => words.push(word.to_string()),
        }
    }
    if words.is_empty() {
        bail!("missing <keywords>");
    }
    Ok(Args {
        keywords: words.join(" "),
        config,
        json,
    })
}

async fn cmd_generate(args: &[String]) -> anyhow::Result<()> {
    let args = parse_args(args)?;
    let config = match &args.config {
        Some(path) => FlowConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => FlowConfig::from_env()?,
    };
    let backend = GeminiBackend::from_config(&config)?;

    let result = promo_script::generate(&backend, GenerationRequest::new(args.keywords)).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.script);
    }
    Ok(())
}

fn cmd_prompt(args: &[String]) -> anyhow::Result<()> {
    let args = parse_args(args)?;
    print!(
        "{}",
        promo_script::render_prompt(&GenerationRequest::new(args.keywords))?
    );
    Ok(())
}

fn cmd_schema() -> anyhow::Result<()> {
    let flow = promo_script::flow()?;
    let schemas = serde_json::json!({
        "flow": flow.name(),
        "input": flow.prompt().input_schema(),
        "output": flow.prompt().output_schema(),
    });
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}
