use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "admin-assistant", version)]
pub struct Cli {
    /// Read settings from this file instead of ~/.admin-assistant/config.toml.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_path: Option<PathBuf>,

    /// Base URL of the admin API, e.g. `https://admin.example.com`.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token sent with every admin request.
    #[arg(long = "token", value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// A value that must never be printed. May be given more than once.
    #[arg(long = "secret", value_name = "VALUE", global = true)]
    pub secrets: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show what an assistant message proposes, without applying anything.
    Review(InputArgs),

    /// Apply the change set proposed in an assistant message.
    Apply(ApplyArgs),

    /// Print a message with every configured secret replaced.
    Redact(InputArgs),

    /// Run the config validation and restart checks against the admin API.
    Check,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// File holding the assistant message. `-` reads stdin.
    #[arg(value_name = "FILE", default_value = "-")]
    pub input: PathBuf,
}

impl InputArgs {
    pub fn is_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Apply without asking for confirmation.
    #[arg(long = "yes", short = 'y', default_value_t = false)]
    pub yes: bool,

    /// Print the apply summary as JSON.
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}
