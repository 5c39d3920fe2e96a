use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use custodian::auth::PasswordHasher;
use custodian::config::{PasswordPolicy, ServerConfig};
use custodian::server::{AppState, create_router};
use custodian::store::{SqliteStore, Store};
use custodian::types::{NewUser, Role};

const NOT_INITIALIZED: &str = "Server not initialized. Run 'custodian admin init' first \
     to create the database and admin account.";

#[derive(Parser)]
#[command(name = "custodian")]
#[command(about = "A records-management server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database and uploaded files
        #[arg(long, env = "CUSTODIAN_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// HMAC secret used to sign session tokens
        #[arg(
            long,
            env = "CUSTODIAN_JWT_SECRET",
            default_value = "",
            hide_env_values = true,
            hide_default_value = true
        )]
        jwt_secret: String,

        /// Session token lifetime in seconds
        #[arg(long, default_value_t = 86_400)]
        token_ttl_seconds: i64,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        request_timeout_secs: u64,

        /// Largest accepted upload in bytes
        #[arg(long, default_value_t = 10 * 1024 * 1024)]
        max_upload_bytes: usize,

        #[command(flatten)]
        password: PasswordArgs,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create the database and the first admin account)
    Init {
        /// Data directory for the database and uploaded files
        #[arg(long, env = "CUSTODIAN_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// School ID of the admin account
        #[arg(long)]
        school_id: Option<String>,

        /// Password of the admin account
        #[arg(long)]
        password: Option<String>,

        /// Full name of the admin account
        #[arg(long)]
        full_name: Option<String>,

        /// Email of the admin account
        #[arg(long)]
        email: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        #[command(flatten)]
        password_policy: PasswordArgs,
    },

    /// Print a random secret suitable for CUSTODIAN_JWT_SECRET
    GenSecret,
}

#[derive(Args)]
struct PasswordArgs {
    /// Shortest accepted password
    #[arg(long, default_value_t = 4)]
    min_password_length: usize,

    /// Longest accepted password
    #[arg(long, default_value_t = 4)]
    max_password_length: usize,
}

impl From<PasswordArgs> for PasswordPolicy {
    fn from(args: PasswordArgs) -> Self {
        PasswordPolicy {
            min_len: args.min_password_length,
            max_len: args.max_password_length,
        }
    }
}

struct AdminAccount {
    school_id: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
    email: Option<String>,
}

fn prompt_missing(
    value: Option<String>,
    label: &str,
    non_interactive: bool,
    flag: &str,
) -> anyhow::Result<String> {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(value.trim().to_string());
    }
    if non_interactive {
        bail!("--{flag} is required with --non-interactive");
    }

    let value = inquire::Text::new(label)
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Ok(inquire::validator::Validation::Invalid(
                    "Value cannot be empty".into(),
                ))
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;
    Ok(value.trim().to_string())
}

fn run_init(
    data_dir: PathBuf,
    account: AdminAccount,
    non_interactive: bool,
    policy: PasswordPolicy,
) -> anyhow::Result<()> {
    fs::create_dir_all(&data_dir)?;

    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    fs::create_dir_all(config.uploads_dir())?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    if store.has_admin()? {
        bail!(
            "Server already initialized. An admin account exists in {}",
            config.db_path().display()
        );
    }

    let school_id = prompt_missing(
        account.school_id,
        "Admin school ID:",
        non_interactive,
        "school-id",
    )?;
    let email = prompt_missing(account.email, "Admin email:", non_interactive, "email")?;
    let full_name = match account.full_name {
        Some(name) => Some(name),
        None if non_interactive => None,
        None => Some(inquire::Text::new("Admin full name:").prompt()?)
            .filter(|n| !n.trim().is_empty()),
    };
    let password = match account.password {
        Some(password) => password,
        None if non_interactive => bail!("--password is required with --non-interactive"),
        None => inquire::Password::new("Admin password:").prompt()?,
    };
    policy.check(&password)?;

    let user = store.create_user(&NewUser {
        school_id,
        password_hash: PasswordHasher::new().hash(&password)?,
        full_name,
        email,
        role: Role::Admin,
        department_id: None,
    })?;

    println!();
    println!("========================================");
    println!("Created admin account '{}'", user.school_id);
    println!("Database: {}", config.db_path().display());
    println!("========================================");
    println!();

    Ok(())
}

fn gen_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    if !config.db_path().exists() {
        bail!(NOT_INITIALIZED);
    }
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin()? {
        bail!(NOT_INITIALIZED);
    }
    fs::create_dir_all(config.uploads_dir())?;

    let addr = config
        .socket_addr()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let state = Arc::new(AppState::new(Arc::new(store), config)?);
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("custodian=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                school_id,
                password,
                full_name,
                email,
                non_interactive,
                password_policy,
            } => {
                let account = AdminAccount {
                    school_id,
                    password,
                    full_name,
                    email,
                };
                run_init(data_dir, account, non_interactive, password_policy.into())?;
            }
            AdminCommands::GenSecret => {
                println!("{}", gen_secret());
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            jwt_secret,
            token_ttl_seconds,
            request_timeout_secs,
            max_upload_bytes,
            password,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir,
                jwt_secret,
                token_ttl_seconds,
                max_upload_bytes,
                request_timeout_secs,
                password_policy: password.into(),
            };
            run_serve(config).await?;
        }
    }

    Ok(())
}
