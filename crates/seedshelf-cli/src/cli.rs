//! Argument parsing and command dispatch.

use std::env;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use seedshelf_api_models::{SortField, SortOrder, TorrentFilter};
use seedshelf_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, command_span, init_logging};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::CatalogApi;
use crate::client::{CliError, CliResult, build_http_client, parse_url};
use crate::commands::{Console, auth, comments, torrents};
use crate::forms::TerminalPrompt;
use crate::session::AuthState;
use crate::storage::FileStore;
use crate::workspace::Workspace;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
const SESSION_DIR: &str = ".seedshelf";
const SESSION_FILE: &str = "session.json";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli
            .log_format
            .map_or_else(LogFormat::infer, LogFormatArg::into_format),
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let span = command_span(command_name, &trace_id);

    let result = dispatch(cli, &trace_id).instrument(span).await;
    match result {
        Ok(()) => 0,
        Err(err) => {
            let exit_code = err.exit_code();
            eprintln!("error: {}", err.display_message());
            tracing::debug!(command = command_name, exit_code, "command failed");
            exit_code
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let client = build_http_client(cli.timeout, trace_id)?;
    let session_path = match cli.session_file {
        Some(path) => path,
        None => default_session_path()?,
    };
    let store = FileStore::new(session_path);
    tracing::debug!(
        api_url = %cli.api_url,
        session_file = %store.path().display(),
        "starting command"
    );

    let auth = AuthState::load_from_storage(Box::new(store));
    let mut workspace = Workspace::new(CatalogApi::new(client, cli.api_url), auth);

    let mut prompt = TerminalPrompt;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut console = Console {
        format: cli.output,
        prompt: &mut prompt,
        out: &mut out,
    };

    match cli.command {
        Command::Ls(args) => torrents::handle_list(&workspace, args, &mut console).await,
        Command::Show(args) => torrents::handle_show(&workspace, &args.id, &mut console).await,
        Command::Add(args) => torrents::handle_add(&workspace, args, &mut console).await,
        Command::Comment(comment) => match comment {
            CommentCommand::Add(args) => comments::handle_add(&workspace, args, &mut console).await,
            CommentCommand::Edit(args) => {
                comments::handle_edit(&workspace, args, &mut console).await
            }
            CommentCommand::Delete(args) => {
                comments::handle_delete(&workspace, args, &mut console).await
            }
        },
        Command::Login(args) => auth::handle_login(&mut workspace, args, &mut console).await,
        Command::Register(args) => {
            auth::handle_register(&mut workspace, args, &mut console).await
        }
        Command::Logout => auth::handle_logout(&mut workspace, &mut console),
        Command::Whoami => auth::handle_whoami(&workspace, &mut console),
        Command::Ping => torrents::handle_ping(&workspace, &mut console).await,
    }
}

fn default_session_path() -> CliResult<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(SESSION_DIR).join(SESSION_FILE))
        .ok_or_else(|| {
            CliError::validation(
                "cannot locate the session file: set HOME, --session-file or SEEDSHELF_SESSION_FILE",
            )
        })
}

#[derive(Parser)]
#[command(
    name = "seedshelf",
    version,
    about = "Browse and curate a Seedshelf torrent catalogue"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "SEEDSHELF_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    api_url: Url,
    #[arg(
        long,
        global = true,
        env = "SEEDSHELF_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        global = true,
        env = "SEEDSHELF_SESSION_FILE",
        help = "Where the login session is kept (defaults to ~/.seedshelf/session.json)"
    )]
    session_file: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "SEEDSHELF_LOG",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter directive; RUST_LOG takes precedence"
    )]
    log_level: String,
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List torrents, optionally filtered server-side.
    Ls(ListArgs),
    /// Show a torrent with its comments.
    Show(ShowArgs),
    /// Publish a new torrent (requires login).
    Add(AddArgs),
    /// Manage comments on a torrent.
    #[command(subcommand)]
    Comment(CommentCommand),
    /// Sign in and remember the session.
    Login(LoginArgs),
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user and what they may do.
    Whoami,
    /// Check that the API is reachable.
    Ping,
}

#[derive(Subcommand)]
pub(crate) enum CommentCommand {
    Add(CommentAddArgs),
    Edit(CommentEditArgs),
    Delete(CommentDeleteArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    #[arg(long, help = "Title contains (case-insensitive)")]
    pub(crate) title: Option<String>,
    #[arg(long, help = "Description contains (case-insensitive)")]
    pub(crate) description: Option<String>,
    #[arg(long, help = "Comma-separated categories; any match qualifies")]
    pub(crate) categories: Option<String>,
    #[arg(long = "from", help = "Created on or after (YYYY-MM-DD)")]
    pub(crate) from_date: Option<NaiveDate>,
    #[arg(long = "to", help = "Created on or before (YYYY-MM-DD)")]
    pub(crate) to_date: Option<NaiveDate>,
    #[arg(long, help = "Minimum size in MB")]
    pub(crate) min_size: Option<f64>,
    #[arg(long, help = "Maximum size in MB")]
    pub(crate) max_size: Option<f64>,
    #[arg(long, value_enum)]
    pub(crate) sort: Option<SortArg>,
    #[arg(long, value_enum)]
    pub(crate) order: Option<OrderArg>,
}

impl From<ListArgs> for TorrentFilter {
    fn from(args: ListArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            categories: args.categories,
            from_date: args.from_date,
            to_date: args.to_date,
            min_size: args.min_size,
            max_size: args.max_size,
            sort: args.sort.map(SortArg::into_field),
            order: args.order.map(OrderArg::into_order),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    #[arg(help = "Torrent identifier")]
    pub(crate) id: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AddArgs {
    #[arg(long)]
    pub(crate) title: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long, help = "Size in MB")]
    pub(crate) size: Option<String>,
    #[arg(long, help = "Comma-separated categories")]
    pub(crate) categories: Option<String>,
    #[arg(long, help = "URL of the .torrent file")]
    pub(crate) file_url: Option<String>,
    #[arg(long, help = "Comma-separated preview image URLs")]
    pub(crate) images: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CommentAddArgs {
    #[arg(help = "Torrent identifier")]
    pub(crate) torrent_id: String,
    #[arg(long)]
    pub(crate) text: Option<String>,
    #[arg(long, help = "Star rating between 1 and 5")]
    pub(crate) rating: Option<String>,
    #[arg(long, help = "Display name (defaults to your username)")]
    pub(crate) author: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CommentEditArgs {
    #[arg(help = "Comment identifier")]
    pub(crate) comment_id: String,
    #[arg(long)]
    pub(crate) text: Option<String>,
    #[arg(long, help = "Star rating between 1 and 5")]
    pub(crate) rating: Option<String>,
    #[arg(long = "torrent", help = "Torrent to re-display afterwards (defaults to the last one shown)")]
    pub(crate) torrent_id: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CommentDeleteArgs {
    #[arg(help = "Comment identifier")]
    pub(crate) comment_id: String,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
    #[arg(long = "torrent", help = "Torrent to re-display afterwards (defaults to the last one shown)")]
    pub(crate) torrent_id: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) username: Option<String>,
    #[arg(long, env = "SEEDSHELF_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) username: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
    #[arg(long, env = "SEEDSHELF_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum SortArg {
    CreatedAt,
    Size,
    Title,
}

impl SortArg {
    const fn into_field(self) -> SortField {
        match self {
            Self::CreatedAt => SortField::CreatedAt,
            Self::Size => SortField::Size,
            Self::Title => SortField::Title,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum OrderArg {
    Asc,
    Desc,
}

impl OrderArg {
    const fn into_order(self) -> SortOrder {
        match self {
            Self::Asc => SortOrder::Asc,
            Self::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl LogFormatArg {
    const fn into_format(self) -> LogFormat {
        match self {
            Self::Pretty => LogFormat::Pretty,
            Self::Json => LogFormat::Json,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Ls(_) => "ls",
        Command::Show(_) => "show",
        Command::Add(_) => "add",
        Command::Comment(CommentCommand::Add(_)) => "comment_add",
        Command::Comment(CommentCommand::Edit(_)) => "comment_edit",
        Command::Comment(CommentCommand::Delete(_)) => "comment_delete",
        Command::Login(_) => "login",
        Command::Register(_) => "register",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Ping => "ping",
    }
}
