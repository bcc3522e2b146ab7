use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use clinic_api::{ApiClient, HttpTransport, Navigator};
use clinic_core::{
    navigate, ClinicConfig, Navigation, RouteGuard, RouteTable, SessionStore,
};

mod storage;

use storage::FileStorage;

#[derive(Parser, Debug)]
#[command(
    name = "clinic-cli",
    about = "Inspect tokens, check route access and call the clinic API from a terminal."
)]
struct Args {
    /// Base URL of the clinic API.
    #[arg(long, env = "CLINIC_API_URL", global = true)]
    api_url: Option<String>,

    /// JSON file holding the session (token and profile).
    #[arg(
        long,
        env = "CLINIC_SESSION_FILE",
        default_value = ".clinic-session.json",
        global = true
    )]
    session_file: PathBuf,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a token's claims. Defaults to the stored token.
    Inspect { token: Option<String> },
    /// Show what the guard does for a path with the stored session.
    Route { path: String },
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CLINIC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Ask the API who the stored token belongs to.
    Whoami,
    /// Check that the API answers.
    Ping,
}

/// Stands in for the browser location: the terminal is never on the login
/// view, so a rejected session always asks the user to sign in again.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        "/".to_string()
    }

    fn redirect(&self, path: &str) {
        tracing::warn!(to = path, "session rejected; run `clinic-cli login` again");
    }
}

type CliClient = ApiClient<FileStorage, HttpTransport, TerminalNavigator>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = ClinicConfig::default();
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    if let Some(secs) = args.timeout {
        config.request_timeout_secs = secs;
    }

    let session = Rc::new(SessionStore::new(
        FileStorage::new(&args.session_file),
        &config,
    ));

    match args.command {
        Command::Inspect { token } => inspect(&session, token),
        Command::Route { path } => route(session, &config, &path),
        Command::Login { email, password } => {
            let client = client(session, &config);
            let response = client
                .login(&email, &password)
                .await
                .with_context(|| format!("Login failed for {email}"))?;
            println!(
                "Signed in as {} ({})",
                response.full_name,
                response.role.as_deref().unwrap_or("no role")
            );
            Ok(())
        }
        Command::Logout => {
            client(session, &config).logout();
            println!("Session cleared: {}", args.session_file.display());
            Ok(())
        }
        Command::Whoami => {
            let client = client(session, &config);
            if !client.is_authenticated() {
                bail!("Not signed in; run `clinic-cli login` first");
            }
            let user = client
                .current_user()
                .await
                .context("Could not fetch the current user")?;
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        Command::Ping => {
            let pong = client(session, &config)
                .ping()
                .await
                .with_context(|| format!("No answer from {}", config.api_base_url))?;
            println!("ok={} msg={}", pong.ok, pong.msg.as_deref().unwrap_or("-"));
            Ok(())
        }
    }
}

fn client(session: Rc<SessionStore<FileStorage>>, config: &ClinicConfig) -> CliClient {
    ApiClient::new(session, HttpTransport::new(config), TerminalNavigator, config)
}

fn inspect(session: &SessionStore<FileStorage>, token: Option<String>) -> anyhow::Result<()> {
    let token = match token.or_else(|| session.token()) {
        Some(token) => token,
        None => bail!("No token given and none stored"),
    };
    let claims = clinic_core::decode(&token).context("Token payload could not be decoded")?;

    println!("{}", serde_json::to_string_pretty(&claims)?);
    println!("role: {}", claims.primary_role().unwrap_or("-"));
    println!("expired: {}", clinic_core::is_expired(&token));
    Ok(())
}

fn route(
    session: Rc<SessionStore<FileStorage>>,
    config: &ClinicConfig,
    path: &str,
) -> anyhow::Result<()> {
    let guard = RouteGuard::new(session, config);
    match navigate(&RouteTable::default(), &guard, config, path) {
        Navigation::Render(matched) => {
            println!("render {} ({})", matched.route.title, matched.route.pattern);
            for (name, value) in &matched.params {
                println!("  {name} = {value}");
            }
        }
        Navigation::Redirect { to, from } => match from {
            Some(from) => println!("redirect {to} (return to {from})"),
            None => println!("redirect {to}"),
        },
        Navigation::NotFound { path } => println!("not found: {path}"),
    }
    Ok(())
}
