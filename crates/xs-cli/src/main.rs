use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use xs_cli::CliError;
use xs_cli::commands::admin::{NewAdmin, create_admin};
use xs_cli::commands::gentoken::{self, GenTokenArgs};
use xs_config::DatabaseConfig;

#[derive(Parser)]
#[command(name = "xs-cli")]
#[command(about = "xs-cli - Administrative tools for the xs-website backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a token for a user with the given private key
    Gentoken {
        /// Id of the user the token is issued for
        user_id: Option<String>,

        /// ADMIN or EMPLOYEE
        role: Option<String>,

        /// RSA private key (PEM)
        private_key_file: Option<PathBuf>,

        /// RS256, RS384 or RS512
        algorithm: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Create a new administrator account
    CreateAdmin {
        /// Login of the new admin
        #[arg(short = 'l', long)]
        login: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Display name
        #[arg(short = 'f', long)]
        full_name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Gentoken {
            user_id,
            role,
            private_key_file,
            algorithm,
        } => gentoken::run(GenTokenArgs {
            user_id,
            role,
            private_key_file,
            algorithm,
        })
        .map(|_| ()),
        Commands::Migrate => handle_migrate().await,
        Commands::CreateAdmin {
            login,
            password,
            full_name,
        } => handle_create_admin(login, password, full_name).await,
    };

    if let Err(e) = result {
        if !matches!(e, CliError::HelpRequested) {
            eprintln!("\n❌ Error: {}", e);
        }
        std::process::exit(e.exit_code());
    }
}

async fn connect() -> Result<sqlx::PgPool, CliError> {
    let config = DatabaseConfig::from_env().ok_or(CliError::MissingDatabaseUrl)?;
    Ok(xs_db::init_db_pool(&config).await?)
}

async fn handle_migrate() -> Result<(), CliError> {
    let pool = connect().await?;
    xs_db::run_migrations(&pool).await?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_create_admin(
    login: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
) -> Result<(), CliError> {
    let login = match login {
        Some(login) => login,
        None => Input::<String>::new().with_prompt("Login").interact_text()?,
    };

    let full_name = match full_name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Full name")
            .allow_empty(true)
            .interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let pool = connect().await?;
    let admin = NewAdmin {
        login,
        password,
        full_name: Some(full_name),
    };
    let id = create_admin(&pool, &admin).await?;

    println!("\n✅ Admin created successfully!");
    println!("   Id: {}", id);
    println!("   Login: {}", admin.login.trim());
    Ok(())
}
