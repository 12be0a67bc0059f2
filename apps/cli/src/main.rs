mod domains;

use mybar_core::{
	config::AppConfig,
	credentials::StaticCredentials,
	remote::AuthToken,
	Session,
};

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use domains::{bar::BarCmd, cocktail::CocktailCmd, sync::SyncCmd};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

#[derive(Parser, Debug)]
#[command(name = "mybar", about = "Offline first MyBar client")]
struct Cli {
	/// Path to the MyBar data directory
	#[arg(long, env = "MYBAR_DATA_DIR")]
	data_dir: Option<PathBuf>,

	/// Signed in user
	#[arg(long, env = "MYBAR_USER", requires = "token")]
	user: Option<Uuid>,

	/// Bearer token of the signed in user
	#[arg(long, env = "MYBAR_TOKEN", hide_env_values = true)]
	token: Option<String>,

	/// Output format
	#[arg(long, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Current bar and pending action counts
	Status,
	/// Personal bar operations
	#[command(subcommand)]
	Bar(BarCmd),
	/// Cached cocktail operations
	#[command(subcommand)]
	Cocktail(CocktailCmd),
	/// Synchronization with the server
	#[command(subcommand)]
	Sync(SyncCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = match &cli.data_dir {
		Some(data_dir) => AppConfig::load_from(data_dir)?,
		None => AppConfig::load()?,
	};

	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
		)
		.with_writer(std::io::stderr)
		.init();

	debug!(data_dir = %config.data_dir.display(), "Loaded config;");

	let credentials = Arc::new(match (cli.user, cli.token) {
		(Some(user_id), Some(token)) => StaticCredentials::signed_in(user_id, AuthToken::new(token)),
		_ => StaticCredentials::default(),
	});

	let session = Session::open(&config, credentials, cli.user).await?;

	match cli.command {
		Commands::Status => domains::status(&session, cli.format).await,
		Commands::Bar(cmd) => domains::bar::run(&session, cli.format, cmd).await,
		Commands::Cocktail(cmd) => domains::cocktail::run(&session, cli.format, cmd).await,
		Commands::Sync(cmd) => domains::sync::run(&session, &config, cli.format, cmd).await,
	}
}
