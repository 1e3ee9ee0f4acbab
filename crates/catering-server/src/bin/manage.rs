//! SEA Catering management utility.
//!
//! ```bash
//! manage runserver --address 0.0.0.0:8000
//! manage migrate
//! manage seed
//! manage createsuperuser --email admin@seacatering.id --full-name "Admin"
//! ```

use std::path::PathBuf;
use std::process;

use catering_auth::Argon2Hasher;
use catering_conf::Settings;
use catering_core::validation::password_policy_violations;
use catering_server::commands;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Password;

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "SEA Catering administration utility", long_about = None)]
#[command(version)]
struct Cli {
	/// TOML settings file, overridden by CATERING_* variables
	#[arg(short, long, value_name = "FILE", global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Migrate, seed and serve the API
	Runserver {
		/// Address to bind, defaults to the configured bind address
		#[arg(short, long, value_name = "ADDR")]
		address: Option<String>,
	},

	/// Apply pending schema migrations
	Migrate,

	/// Insert or refresh the meal-plan catalog
	Seed,

	/// Create an admin account
	Createsuperuser {
		#[arg(long, value_name = "EMAIL")]
		email: String,

		#[arg(long, value_name = "NAME")]
		full_name: String,

		/// Prompted for when omitted
		#[arg(long, value_name = "PASSWORD")]
		password: Option<String>,
	},
}

fn prompt_password() -> anyhow::Result<String> {
	let password = Password::new()
		.with_prompt("Password")
		.with_confirmation("Password (again)", "Passwords do not match")
		.validate_with(|input: &String| -> Result<(), String> {
			match password_policy_violations(input).first() {
				Some(failure) => Err(failure.to_string()),
				None => Ok(()),
			}
		})
		.interact()?;
	Ok(password)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
	let settings = match &cli.config {
		Some(path) => Settings::from_toml_file(path)?,
		None => Settings::from_env()?,
	};
	commands::init_tracing(&settings.log_filter);

	match cli.command {
		Commands::Runserver { address } => {
			commands::runserver(&settings, address.as_deref()).await?;
		}
		Commands::Migrate => {
			let pool = catering_db::connect(&settings.database_url).await?;
			let applied = catering_db::migrate(&pool).await?;
			if applied.is_empty() {
				println!("{}", style("No migrations to apply.").dim());
			}
			for name in applied {
				println!("  Applying {}... {}", name, style("OK").green());
			}
		}
		Commands::Seed => {
			let pool = commands::prepare_database(&settings.database_url).await?;
			let count = catering_db::MEAL_PLAN_CATALOG.len();
			pool.close().await;
			println!("{} {} meal plans", style("Seeded").green().bold(), count);
		}
		Commands::Createsuperuser {
			email,
			full_name,
			password,
		} => {
			let password = match password {
				Some(password) => password,
				None => prompt_password()?,
			};
			let pool = commands::prepare_database(&settings.database_url).await?;
			let user =
				commands::create_superuser(&pool, &Argon2Hasher::new(), &email, &full_name, &password)
					.await?;
			println!(
				"{} {} ({})",
				style("Superuser created:").green().bold(),
				user.email,
				user.id
			);
		}
	}
	Ok(())
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	if let Err(err) = run(cli).await {
		eprintln!("{} {:#}", style("Error:").red().bold(), err);
		process::exit(1);
	}
}
