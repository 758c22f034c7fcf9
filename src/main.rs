use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use murales::config::ConfigError;
use murales::net::types::{Attachment, Credentials, MuralUpdate, ProfileUpdate, Registration, User};
use murales::services::{contenido, mural};
use murales::state::murales::MuralesState;
use murales::{
    ApiError, ClientConfig, FileTokenStore, HttpApi, IdentityApi, SessionError, SessionManager, TokenStore,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("not logged in; run `murales login` first")]
    NotLoggedIn,
    #[error("{operation} failed: {}", messages.join("; "))]
    Rejected { operation: &'static str, messages: Vec<String> },
    #[error("mural {0} is not one of your own murales")]
    NotOwner(String),
    #[error("cannot read {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "murales", about = "Murales board service CLI")]
struct Cli {
    #[arg(long, env = "MURALES_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "MURALES_TOKEN_PATH")]
    token_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

struct CliContext {
    api: Arc<HttpApi>,
    session: Arc<SessionManager>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        nombre_usuario: String,
        #[arg(long)]
        correo: String,
        #[arg(long, env = "MURALES_PASSWORD")]
        password: String,
    },
    Login {
        #[arg(long)]
        correo: String,
        #[arg(long, env = "MURALES_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    Profile(ProfileCommand),
    Mural(MuralCommand),
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show,
    Update {
        #[arg(long)]
        nombre_usuario: Option<String>,
        #[arg(long)]
        correo: Option<String>,
    },
}

#[derive(Args, Debug)]
struct MuralCommand {
    #[command(subcommand)]
    command: MuralSubcommand,
}

#[derive(Subcommand, Debug)]
enum MuralSubcommand {
    List,
    Create {
        #[arg(long)]
        titulo: String,
        #[arg(long, default_value = "")]
        descripcion: String,
    },
    Join {
        codigo: String,
    },
    Show {
        mural_id: String,
    },
    Update {
        mural_id: String,
        #[arg(long)]
        titulo: Option<String>,
        #[arg(long)]
        descripcion: Option<String>,
    },
    Delete {
        mural_id: String,
    },
    Post {
        mural_id: String,
        #[arg(long)]
        texto: String,
        #[arg(long)]
        archivo: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_owned();
    }
    if let Some(path) = cli.token_path {
        config.token_path = Some(path);
    }

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.resolved_token_path()?));
    let api = Arc::new(HttpApi::new(&config, Arc::clone(&tokens))?);
    let identity: Arc<dyn IdentityApi> = api.clone();
    let session = SessionManager::recovered(identity, tokens).await;
    let ctx = CliContext { api, session };

    match cli.command {
        Command::Register { nombre_usuario, correo, password } => {
            let registration = Registration { nombre_usuario, correo, password };
            if !ctx.session.register(&registration).await {
                return Err(rejected(&ctx, "register"));
            }
            print_json(&ctx.session.current_user())
        }
        Command::Login { correo, password } => {
            if !ctx.session.login(&Credentials::new(correo, password)).await {
                return Err(rejected(&ctx, "login"));
            }
            print_json(&ctx.session.current_user())
        }
        Command::Logout => {
            ctx.session.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => print_json(&require_user(&ctx)?),
        Command::Profile(profile) => run_profile(&ctx, profile.command).await,
        Command::Mural(board) => run_mural(&ctx, board.command).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_profile(ctx: &CliContext, command: ProfileSubcommand) -> Result<(), CliError> {
    require_user(ctx)?;
    match command {
        ProfileSubcommand::Show => print_json(&ctx.api.profile().await?),
        ProfileSubcommand::Update { nombre_usuario, correo } => {
            let update = ProfileUpdate { nombre_usuario, correo };
            print_json(&ctx.session.update_profile(&update).await?)
        }
    }
}

async fn run_mural(ctx: &CliContext, command: MuralSubcommand) -> Result<(), CliError> {
    let user = require_user(ctx)?;
    let api = ctx.api.as_ref();
    match command {
        MuralSubcommand::List => {
            let board = load_board(api, "mural list").await?;
            print_json(&mural::MuralLists { own: board.own, participant: board.participant })
        }
        MuralSubcommand::Create { titulo, descripcion } => {
            print_json(&mural::create(api, &titulo, &descripcion, Some(&user)).await?)
        }
        MuralSubcommand::Join { codigo } => print_json(&mural::join(api, &codigo).await?),
        MuralSubcommand::Show { mural_id } => {
            let board = load_board(api, "mural show").await?;
            let contenidos = mural::contents(api, &mural_id).await?;
            print_json(&serde_json::json!({ "mural": board.find(mural_id.trim()), "contenidos": contenidos }))
        }
        MuralSubcommand::Update { mural_id, titulo, descripcion } => {
            let board = load_board(api, "mural update").await?;
            if !board.is_owned(mural_id.trim()) {
                return Err(CliError::NotOwner(mural_id));
            }
            let update = MuralUpdate { titulo, descripcion };
            print_json(&mural::update(api, &mural_id, &update).await?)
        }
        MuralSubcommand::Delete { mural_id } => {
            let board = load_board(api, "mural delete").await?;
            if !board.is_owned(mural_id.trim()) {
                return Err(CliError::NotOwner(mural_id));
            }
            print_json(&mural::delete(api, &mural_id).await?)
        }
        MuralSubcommand::Post { mural_id, texto, archivo } => {
            let attachment = match archivo {
                Some(path) => Some(
                    Attachment::read(&path)
                        .await
                        .map_err(|source| CliError::ReadFile { path, source })?,
                ),
                None => None,
            };
            print_json(&contenido::publish(api, &mural_id, &texto, attachment).await?)
        }
    }
}

async fn load_board(api: &HttpApi, operation: &'static str) -> Result<MuralesState, CliError> {
    let mut board = MuralesState::default();
    board.begin_load();
    board.finish_load(mural::load_all(api).await);
    match board.error.take() {
        Some(error) => Err(CliError::Rejected { operation, messages: vec![error] }),
        None => Ok(board),
    }
}

/// Route guard shared by every command that needs a logged-in user.
fn require_user(ctx: &CliContext) -> Result<User, CliError> {
    let session = ctx.session.snapshot();
    if session.should_redirect_unauth() {
        return Err(CliError::NotLoggedIn);
    }
    session.current_user.ok_or(CliError::NotLoggedIn)
}

fn rejected(ctx: &CliContext, operation: &'static str) -> CliError {
    CliError::Rejected { operation, messages: ctx.session.last_errors() }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
