use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use collabsheet::buttons::Command;
use collabsheet::chat::{ChatHub, ChatTransport, HttpChatTransport};
use collabsheet::config::ClientConfig;
use collabsheet::controller::{ClientError, SheetController};
use collabsheet::engine::cell::column_name;
use collabsheet::engine::{LocalEngine, SheetEngine};
use collabsheet::game::{GAME_OPERATIONS, GAME_TARGET};
use collabsheet::session::Session;
use collabsheet::sync::Mount;
use collabsheet::view::{DisplayState, Navigator, Notifier};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "collabsheet", about = "Collaborative spreadsheet terminal client")]
struct Cli {
    #[arg(long, env = "SHEET_USER_NAME")]
    user: Option<String>,

    #[arg(long, env = "SHEET_DOCUMENT")]
    document: Option<String>,

    #[arg(long, env = "SHEET_SERVER")]
    server: Option<String>,

    #[arg(long, env = "SHEET_POLL_INTERVAL_MS")]
    poll_ms: Option<u64>,

    #[arg(long, env = "SHEET_CHAT_URL")]
    chat_url: Option<String>,
}

struct StderrNotifier;

#[async_trait::async_trait]
impl Notifier for StderrNotifier {
    async fn alert(&self, message: &str) {
        eprintln!("!! {message}");
    }
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn push_and_reload(&self, url: &str) {
        println!("navigating to {url}");
    }
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(user) = cli.user {
        config.user_name = user;
    }
    if let Some(document) = cli.document {
        if std::env::var("SHEET_LOCATION").is_err() {
            config.location = collabsheet::config::default_location(&document);
        }
        config.document_name = document;
    }
    if let Some(server) = cli.server {
        config.server = server;
    }
    if let Some(poll_ms) = cli.poll_ms {
        config.poll_interval = Duration::from_millis(poll_ms.max(1));
    }
    if let Some(url) = cli.chat_url.filter(|url| !url.trim().is_empty()) {
        config.chat_url = Some(url.trim_end_matches('/').to_string());
    }

    let engine: Arc<dyn SheetEngine> = Arc::new(LocalEngine::new());
    let mut poller = None;
    let chat: Arc<dyn ChatTransport> = match &config.chat_url {
        Some(url) => {
            let transport = HttpChatTransport::new(url, &config.document_name);
            poller = Some(transport.spawn_poller(config.chat_poll_interval));
            Arc::new(transport)
        }
        None => Arc::new(ChatHub::new().transport(&config.document_name)),
    };

    let controller = Arc::new(SheetController::new(
        engine,
        chat,
        Arc::new(StderrNotifier),
        Session::new(config.user_name.clone(), config.document_name.clone()),
        &config.server,
    ));
    let mut mount = Mount::new(controller.clone(), config.poll_interval);
    if let Some(poller) = poller {
        mount.attach(poller);
    }

    print_help();
    println!("{}", render(&controller.display()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (verb, arg) = line.split_once(' ').map_or((line, ""), |(v, a)| (v, a.trim()));

        let outcome = match verb {
            "" => continue,
            "name" => {
                controller.set_user_name(arg);
                controller.refresh().await;
                Ok(())
            }
            "click" => controller.on_cell_click(&arg.to_ascii_uppercase()).await,
            "press" => controller.on_button_click(arg).await,
            "cmd" => controller.on_command_name(arg).await,
            "select" => controller.on_number_or_operation_select(arg).await,
            "server" => {
                controller.server_selector(arg);
                Ok(())
            }
            "show" => Ok(()),
            "json" => {
                match serde_json::to_string_pretty(&controller.display()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("failed to encode display state: {e}"),
                }
                continue;
            }
            "login" => {
                if let Some(warning) = controller.before_unload() {
                    eprintln!("!! {warning}");
                }
                controller.return_to_login_page(&PrintNavigator, &config.location);
                break;
            }
            "quit" | "exit" => {
                if let Some(warning) = controller.before_unload() {
                    eprintln!("!! {warning}");
                }
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            other => {
                eprintln!("unknown input: {other} (try `help`)");
                continue;
            }
        };

        if let Err(e @ (ClientError::UnknownCommand(_) | ClientError::InvalidToken(_))) = outcome {
            eprintln!("{e}");
        }
        println!("{}", render(&controller.display()));
    }

    mount.unmount();
    Ok(())
}

fn print_help() {
    let commands: Vec<&str> = Command::ALL.iter().map(|c| c.as_str()).collect();
    println!("name <user> | click <cell> | press <token> | select <value> | server <name>");
    println!("cmd <{}> | show | json | login | quit", commands.join("|"));
}

fn render(state: &DisplayState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {} | server {}", state.user_name, state.status, state.server);
    let _ = writeln!(out, "formula: {}  =  {}", state.formula, state.result);

    if state.game_mode {
        let numbers: Vec<String> = state.game_numbers.iter().map(u32::to_string).collect();
        let _ = writeln!(
            out,
            "GAME target {GAME_TARGET}: numbers {} ops {}",
            numbers.join(" "),
            GAME_OPERATIONS.join(" ")
        );
    }

    let _ = write!(out, "    ");
    for col in 0..state.cells.col_count() {
        let _ = write!(out, "{:>8}", column_name(col));
    }
    for (row, cells) in state.cells.rows().iter().enumerate() {
        let _ = write!(out, "\n{:>3} ", row + 1);
        for (col, value) in cells.iter().enumerate() {
            let label = format!("{}{}", column_name(col), row + 1);
            if label == state.working_cell {
                let _ = write!(out, "{:>8}", format!("[{value}]"));
            } else {
                let _ = write!(out, "{value:>8}");
            }
        }
    }
    let _ = write!(out, "\n{}", state.game_toggle_label());
    out
}
