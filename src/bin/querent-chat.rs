//! Interactive front end for the login/register/query backend.
//!
//! This binary walks through the login and registration forms and then
//! drops into a chat REPL that forwards each line to the backend.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a backend on localhost:8080, persisting the session token
//! querent-chat
//!
//! # Point at another backend
//! querent-chat --base-url https://chat.example.com
//!
//! # Keep the token in memory only and disable colors
//! querent-chat --ephemeral --no-color
//! ```
//!
//! # Commands
//!
//! On any screen you can use slash commands:
//! - `/login`, `/register`, `/guest` - Switch screens
//! - `/logout` - Forget the stored token
//! - `/history` - Reprint the conversation
//! - `/status` - Show backend and login state
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use querent::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatView, LoginView, Navigation, PlainTextRenderer,
    RegisterView, Renderer, help_text, parse_command,
};
use querent::{Client, SessionStore};

type MainResult<T> = Result<T, Box<dyn std::error::Error>>;

/// One line read from the terminal.
enum Input {
    Text(String),
    Command(ChatCommand),
    Quit,
}

/// What a command asks the current screen to do.
enum Step {
    Stay,
    Go(Navigation),
    Quit,
}

/// Result of prompting for a form field.
enum Field {
    Value(String),
    Leave(Option<Navigation>),
}

/// Main entry point for the querent-chat application.
#[tokio::main]
async fn main() -> MainResult<()> {
    init_tracing();

    let (args, _) = ChatArgs::from_command_line_relaxed("querent-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let store = config.open_store()?;
    let client = Client::with_options(config.base_url.as_deref(), store, config.client_options())?;
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("querent (backend: {})", client.base_url());
    println!("Type /help for commands, /quit to exit\n");

    let mut screen = match client.session().token() {
        Ok(Some(_)) => Navigation::Chat,
        Ok(None) => Navigation::Login,
        Err(err) => {
            renderer.print_error(&err.user_message());
            Navigation::Login
        }
    };
    loop {
        let next = match screen {
            Navigation::Login => login_screen(&mut rl, &client, &mut renderer).await?,
            Navigation::Register => register_screen(&mut rl, &client, &mut renderer).await?,
            Navigation::Chat => chat_screen(&mut rl, &client, &mut renderer).await?,
        };
        match next {
            Some(next) => screen = next,
            None => break,
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("querent=error"));
    // Logs go to stderr so they never interleave with the conversation.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

async fn login_screen(
    rl: &mut DefaultEditor,
    client: &Client,
    renderer: &mut dyn Renderer,
) -> MainResult<Option<Navigation>> {
    renderer.print_info("Please log in to continue (or /register, /guest).");
    let mut view = LoginView::new();
    loop {
        view.email = match prompt_field(rl, "Email: ", client, renderer)? {
            Field::Value(value) => value.trim().to_string(),
            Field::Leave(next) => return Ok(next),
        };
        view.password = match prompt_field(rl, "Password: ", client, renderer)? {
            Field::Value(value) => value,
            Field::Leave(next) => return Ok(next),
        };
        renderer.print_info("Logging in...");
        if let Some(next) = view.submit(client).await {
            renderer.print_info("Logged in.");
            return Ok(Some(next));
        }
        if let Some(error) = view.error() {
            renderer.print_error(error);
        }
    }
}

async fn register_screen(
    rl: &mut DefaultEditor,
    client: &Client,
    renderer: &mut dyn Renderer,
) -> MainResult<Option<Navigation>> {
    renderer.print_info("Create an account (or /login, /guest).");
    let mut view = RegisterView::new();
    loop {
        view.username = match prompt_field(rl, "Username: ", client, renderer)? {
            Field::Value(value) => value.trim().to_string(),
            Field::Leave(next) => return Ok(next),
        };
        view.email = match prompt_field(rl, "Email: ", client, renderer)? {
            Field::Value(value) => value.trim().to_string(),
            Field::Leave(next) => return Ok(next),
        };
        view.password = match prompt_field(rl, "Password: ", client, renderer)? {
            Field::Value(value) => value,
            Field::Leave(next) => return Ok(next),
        };
        renderer.print_info("Registering...");
        if let Some(next) = view.submit(client).await {
            renderer.print_info("Registered and logged in.");
            return Ok(Some(next));
        }
        if let Some(error) = view.error() {
            renderer.print_error(error);
        }
    }
}

async fn chat_screen(
    rl: &mut DefaultEditor,
    client: &Client,
    renderer: &mut dyn Renderer,
) -> MainResult<Option<Navigation>> {
    if let Ok(Some(_)) = client.session().token() {
        renderer.print_info("How can I help you today?");
    } else {
        renderer.print_info("Hello Guest. How can I help you today?");
    }
    let mut view = ChatView::new();
    loop {
        match read_input(rl, "You: ", true)? {
            Input::Quit => return Ok(None),
            Input::Command(ChatCommand::History) => {
                if view.turns().is_empty() {
                    renderer.print_info("No messages yet.");
                }
                for turn in view.turns() {
                    renderer.print_turn(turn);
                }
            }
            Input::Command(ChatCommand::Status) => {
                print_status(client, renderer, Some(view.turns().len()));
            }
            Input::Command(cmd) => match handle_command(cmd, client, renderer) {
                Step::Stay => {}
                Step::Go(next) => return Ok(Some(next)),
                Step::Quit => return Ok(None),
            },
            Input::Text(line) => {
                view.set_input(line);
                let Some(exchange) = view.send(client).await else {
                    continue;
                };
                if let Some(err) = &exchange.error {
                    debug!(error = %err, "query failed");
                }
                renderer.print_turn(&exchange.reply);
            }
        }
    }
}

fn prompt_field(
    rl: &mut DefaultEditor,
    prompt: &str,
    client: &Client,
    renderer: &mut dyn Renderer,
) -> Result<Field, ReadlineError> {
    loop {
        match read_input(rl, prompt, false)? {
            Input::Quit => return Ok(Field::Leave(None)),
            Input::Text(text) if text.trim().is_empty() => continue,
            Input::Text(text) => return Ok(Field::Value(text)),
            Input::Command(cmd) => match handle_command(cmd, client, renderer) {
                Step::Stay => continue,
                Step::Go(next) => return Ok(Field::Leave(Some(next))),
                Step::Quit => return Ok(Field::Leave(None)),
            },
        }
    }
}

fn read_input(
    rl: &mut DefaultEditor,
    prompt: &str,
    record_history: bool,
) -> Result<Input, ReadlineError> {
    match rl.readline(prompt) {
        Ok(line) => {
            if let Some(cmd) = parse_command(&line) {
                return Ok(match cmd {
                    ChatCommand::Quit => Input::Quit,
                    cmd => Input::Command(cmd),
                });
            }
            if record_history && !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.as_str());
            }
            Ok(Input::Text(line))
        }
        // Ctrl+C at a prompt abandons the line, not the program.
        Err(ReadlineError::Interrupted) => {
            println!();
            Ok(Input::Text(String::new()))
        }
        Err(ReadlineError::Eof) => Ok(Input::Quit),
        Err(err) => Err(err),
    }
}

fn handle_command(cmd: ChatCommand, client: &Client, renderer: &mut dyn Renderer) -> Step {
    match cmd {
        ChatCommand::Login => Step::Go(Navigation::Login),
        ChatCommand::Register => Step::Go(Navigation::Register),
        ChatCommand::Guest => Step::Go(Navigation::Chat),
        ChatCommand::Logout => match client.logout() {
            Ok(()) => {
                renderer.print_info("Logged out.");
                Step::Go(Navigation::Login)
            }
            Err(err) => {
                renderer.print_error(&err.user_message());
                Step::Stay
            }
        },
        ChatCommand::History => {
            renderer.print_info("There is no conversation on this screen.");
            Step::Stay
        }
        ChatCommand::Status => {
            print_status(client, renderer, None);
            Step::Stay
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                renderer.print_info(&format!("    {}", line));
            }
            Step::Stay
        }
        ChatCommand::Quit => Step::Quit,
        ChatCommand::Invalid(message) => {
            renderer.print_error(&message);
            Step::Stay
        }
    }
}

fn print_status(client: &Client, renderer: &mut dyn Renderer, turns: Option<usize>) {
    renderer.print_info(&format!("    Backend: {}", client.base_url()));
    let login = match client.session().token() {
        Ok(Some(_)) => "logged in".to_string(),
        Ok(None) => "guest".to_string(),
        Err(err) => format!("unknown ({})", err.user_message()),
    };
    renderer.print_info(&format!("    Session: {login}"));
    if let Some(turns) = turns {
        renderer.print_info(&format!("    Turns: {turns}"));
    }
}
