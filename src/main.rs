use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use receiptify::{
    cli, config, error,
    types::{Metric, TimeRange},
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default())
        .placeholder(AnsiColor::BrightBlue.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Forget the stored Spotify session
    Logout,

    /// Show whether you are logged in and when the token expires
    Status,

    /// Print your listening receipt
    Receipt(ReceiptOptions),

    #[clap(about = "Save your top tracks as a private playlist")]
    Playlist(PlaylistOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ReceiptOptions {
    /// What the receipt lists
    #[clap(long, value_enum, default_value = "top-tracks")]
    pub metric: Metric,

    /// Listening period to cover
    #[clap(long, value_enum, default_value = "short-term")]
    pub range: TimeRange,

    /// Number of tracks or artists (1-50)
    #[clap(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Print the receipt as JSON
    #[clap(long)]
    pub json: bool,

    /// Reload the receipt every N seconds until interrupted
    #[clap(long, value_name = "SECONDS")]
    pub watch: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    /// Listening period the top tracks come from
    #[clap(long, value_enum, default_value = "short-term")]
    pub range: TimeRange,

    /// Number of tracks to add (1-50)
    #[clap(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Playlist name, defaults to "<your name>'s Top Tracks"
    #[clap(long)]
    pub name: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Status => cli::status().await,
        Command::Receipt(opt) => {
            cli::receipt(opt.metric, opt.range, opt.limit, opt.json, opt.watch).await
        }
        Command::Playlist(opt) => cli::playlist(opt.range, opt.limit, opt.name).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
