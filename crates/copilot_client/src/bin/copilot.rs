//! copilot: terminal front end for the AI Copilot backend.
//! One-shot by default (text from args or stdin, rendered reply on stdout);
//! `--interactive` runs a chat loop; `--health` / `--hello` probe the backend.

use clap::{CommandFactory, Parser};
use copilot_client::config::{self, Config};
use copilot_client::render::to_terminal;
use copilot_client::{ApiClient, Conversation, Message, Mode, RequestDefaults, Submission};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "copilot", version, about = "Chat with the AI Copilot backend")]
struct Args {
    /// Config file (default: $COPILOT_CONFIG or ~/.copilot/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides env and config file
    #[arg(long)]
    base_url: Option<String>,

    /// Origin the front end is served from, e.g. https://copilot.example.com
    #[arg(long)]
    page_origin: Option<String>,

    /// generate, explain or debug
    #[arg(long, short, default_value = "generate")]
    mode: Mode,

    /// Error output to send along with code; only valid with `--mode debug`
    #[arg(long, conflicts_with_all = ["health", "hello", "interactive"])]
    error: Option<String>,

    /// Probe `GET /` and exit
    #[arg(long, conflicts_with_all = ["hello", "interactive"])]
    health: bool,

    /// Call `GET /api/hello` and exit
    #[arg(long, conflicts_with = "interactive")]
    hello: bool,

    /// Chat loop; a line holding a single `.` sends the lines typed so far
    #[arg(long, short)]
    interactive: bool,

    /// Message text; read from stdin when omitted
    text: Vec<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("COPILOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(args: &Args) -> Config {
    // 1. --config <path> flag, 2. COPILOT_CONFIG env var: file must exist.
    let explicit = args
        .config
        .clone()
        .or_else(|| std::env::var_os(config::CONFIG_PATH_ENV).map(PathBuf::from));
    let result = match &explicit {
        Some(path) => config::load(path),
        // 3. Default path (~/.copilot/config.yaml), optional.
        None => match config::default_config_path() {
            Some(path) => config::load_or_default(&path),
            None => Ok(Config::default()),
        },
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: failed to load config: {}", e);
        process::exit(1);
    })
}

fn build_client(args: &Args, cfg: &Config) -> ApiClient {
    let base_url = match &args.base_url {
        Some(url) => config::resolve_base_url(Some(url), None),
        None => cfg.base_url(),
    };
    let page_origin = args.page_origin.clone().or_else(|| cfg.page_origin());
    ApiClient::from_parts(
        &base_url,
        page_origin.as_deref(),
        RequestDefaults::from_config(cfg),
    )
}

fn read_input(args: &Args) -> String {
    if !args.text.is_empty() {
        return args.text.join(" ");
    }
    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("Error: failed to read stdin: {}", e);
        process::exit(1);
    }
    buf.trim_end_matches(['\n', '\r']).to_string()
}

fn print_message(message: &Message) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = write!(out, "{}", to_terminal(&message.blocks()));
    let _ = out.flush();
}

async fn run_health(client: &ApiClient) {
    match client.health().await {
        Ok(status) => println!(
            "Backend at {} is up: {}",
            client.base_url(),
            status.message.as_deref().unwrap_or("ok")
        ),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run_hello(client: &ApiClient) {
    match client.hello().await {
        Ok(payload) => {
            let body = payload.unwrap_or(serde_json::Value::Null);
            println!(
                "{}",
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run_once(client: ApiClient, args: &Args) {
    let text = read_input(args);
    if text.trim().is_empty() {
        eprintln!("Error: no input provided (pass text as arguments or on stdin)");
        process::exit(1);
    }

    let mut submission = Submission::new(args.mode, text);
    if let Some(error) = &args.error {
        submission = submission.with_error_context(error.as_str());
    }

    let mut conversation = Conversation::new(client);
    if let Some(reply) = conversation.submit(submission).await {
        print_message(reply);
    }
    if let Some(banner) = conversation.last_error() {
        eprintln!("Error: {}", banner);
        process::exit(1);
    }
}

/// Line-level commands in interactive mode. Anything else is message text.
enum Command {
    Quit,
    Health,
    Mode(String),
    Send,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line {
        "." => Some(Command::Send),
        ":quit" | ":q" => Some(Command::Quit),
        ":health" => Some(Command::Health),
        _ => line
            .strip_prefix(":mode")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            .map(|rest| Command::Mode(rest.trim().to_string())),
    }
}

/// Submit the buffered lines as one message, keeping them verbatim.
async fn send_pending(conversation: &mut Conversation, mode: Mode, pending: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    let submission = Submission::new(mode, pending.join("\n"));
    pending.clear();
    if !conversation.begin(&submission) {
        return;
    }
    println!("Assistant is typing...");
    let outcome = conversation.client().dispatch(&submission).await;
    let reply = conversation.settle(outcome).clone();
    print_message(&reply);
    if let Some(banner) = conversation.last_error() {
        eprintln!("Error: {}", banner);
    }
}

async fn run_interactive(client: ApiClient) -> io::Result<()> {
    println!("AI Copilot");
    println!("Connected to {}", client.base_url());
    match client.health().await {
        Ok(status) => println!("Status: {}", status.message.as_deref().unwrap_or("ok")),
        Err(e) => println!("Status: unreachable ({})", e),
    }
    let modes: Vec<&str> = Mode::all().iter().map(Mode::as_str).collect();
    println!("Enter a message over one or more lines, then a line with a single `.` to send.");
    println!("Commands: :mode <{}>, :health, :quit", modes.join("|"));

    let mut conversation = Conversation::new(client);
    if let Some(greeting) = conversation.messages().first() {
        print_message(greeting);
    }

    let mut mode = Mode::default();
    println!("{}", mode.placeholder());
    let mut pending: Vec<String> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if pending.is_empty() {
            print!("[{}]> ", mode);
        } else {
            print!("...> ");
        }
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let Some(command) = parse_command(&line) else {
            pending.push(line.trim_end_matches('\r').to_string());
            continue;
        };
        // A command ends the message being typed.
        send_pending(&mut conversation, mode, &mut pending).await;
        match command {
            Command::Send => {}
            Command::Quit => return Ok(()),
            Command::Health => match conversation.client().health().await {
                Ok(status) => println!("Status: {}", status.message.as_deref().unwrap_or("ok")),
                Err(e) => eprintln!("Error: {}", e),
            },
            Command::Mode(name) => match name.parse::<Mode>() {
                Ok(m) => {
                    mode = m;
                    println!("Mode: {}. {}", mode.label(), mode.placeholder());
                }
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }
    send_pending(&mut conversation, mode, &mut pending).await;
    Ok(())
}

fn main() {
    init_logging();
    let args = Args::parse();
    if args.error.is_some() && args.mode != Mode::Debug {
        Args::command()
            .error(
                clap::error::ErrorKind::ArgumentConflict,
                "--error can only be used with --mode debug",
            )
            .exit();
    }
    let cfg = load_config(&args);
    let client = build_client(&args, &cfg);
    tracing::debug!(base_url = client.base_url(), "client configured");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    rt.block_on(async {
        if args.health {
            run_health(&client).await;
        } else if args.hello {
            run_hello(&client).await;
        } else if args.interactive {
            if let Err(e) = run_interactive(client).await {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        } else {
            run_once(client, &args).await;
        }
    });
}
