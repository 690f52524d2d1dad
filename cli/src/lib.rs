mod cli;

use std::path::Path;

use admin_assistant_core::AdminAssistant;
use admin_assistant_core::Proposal;
use admin_assistant_core::ReqwestBackend;
use admin_assistant_core::changeset::redact;
use admin_assistant_core::config::Config;
use admin_assistant_core::config::ConfigOverrides;
use admin_assistant_core::review_turn;
use anyhow::Context;
pub use cli::ApplyArgs;
pub use cli::Cli;
pub use cli::Command;
pub use cli::InputArgs;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let default_level = "error";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let Cli {
        config_path,
        base_url,
        token,
        secrets,
        command,
    } = cli;

    let config = Config::load_with_overrides(ConfigOverrides {
        config_path,
        base_url,
        bearer_token: token,
        secrets,
    })?;
    debug!("loaded config: {config:?}");

    match command {
        Command::Redact(args) => {
            let text = read_input(&args)?;
            print!("{}", redact(&text, &config.secrets));
        }
        Command::Review(args) => {
            let text = read_input(&args)?;
            review(&text, &config);
        }
        Command::Apply(args) => apply(args, &config).await?,
        Command::Check => {
            let assistant = AdminAssistant::new(ReqwestBackend::from_config(&config)?)
                .with_secrets(config.secrets.clone());
            for note in assistant.health_notes().await {
                println!("{note}");
            }
        }
    }

    Ok(())
}

fn read_input(args: &InputArgs) -> anyhow::Result<String> {
    if args.is_stdin() {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")
    } else {
        read_file(&args.input)
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn review(text: &str, config: &Config) {
    let turn = review_turn(text, &config.secrets);
    println!("{}", turn.display_text.trim_end());
    match turn.proposal {
        Proposal::None => {}
        Proposal::Ready(validated) => {
            println!();
            println!("--- proposed changes ---");
            print!("{}", redact(&validated.to_string(), &config.secrets));
        }
        Proposal::Rejected { banner } => {
            println!();
            println!("{banner}");
            std::process::exit(1);
        }
    }
}

async fn apply(args: ApplyArgs, config: &Config) -> anyhow::Result<()> {
    let text = read_input(&args.input)?;
    let validated = match review_turn(&text, &config.secrets).proposal {
        Proposal::Ready(validated) => validated,
        Proposal::Rejected { banner } => {
            eprintln!("{banner}");
            std::process::exit(1);
        }
        Proposal::None => {
            eprintln!("No change set found in the message.");
            std::process::exit(1);
        }
    };

    // With --json, stdout carries nothing but the summary.
    let preview = redact(&validated.to_string(), &config.secrets);
    if args.json {
        eprint!("{preview}");
    } else {
        print!("{preview}");
    }

    if !args.yes {
        if args.input.is_stdin() {
            eprintln!("The message was read from stdin, so there is no way to confirm; pass --yes.");
            std::process::exit(1);
        }
        let count = validated.change_set().requests.len();
        if !confirm(count).await? {
            eprintln!("Nothing applied.");
            return Ok(());
        }
    }

    let mut assistant = AdminAssistant::new(ReqwestBackend::from_config(config)?)
        .with_secrets(config.secrets.clone());
    let summary = assistant.apply(validated).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("{}", summary.message);
    }

    if summary.fail_count() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

async fn confirm(count: usize) -> anyhow::Result<bool> {
    let noun = if count == 1 { "request" } else { "requests" };
    let mut stderr = tokio::io::stderr();
    stderr
        .write_all(format!("\nApply {count} {noun}? [y/N] ").as_bytes())
        .await?;
    stderr.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
