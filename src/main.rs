use notes_client::{
    config,
    controller::ScreenController,
    layout::{Layout, Viewport},
    service::NoteService,
    terminal::{self, Command},
};

use std::{env, io::Write};

use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_WIDTH: u16 = 100;

fn terminal_width() -> u16 {
    env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(DEFAULT_WIDTH)
}

fn prompt(text: &str) {
    print!("{text}");
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!("Failed to flush stdout: {e}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Log setup
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        std::process::exit(1);
    });
    let base_url = cfg.api_base_url();
    if base_url.is_empty() {
        tracing::info!("No API address configured, notes are kept in memory only");
    } else {
        tracing::info!("Using notes API at {}", base_url);
    }

    let viewport = Viewport::new(terminal_width());
    let mut screen = ScreenController::new(
        NoteService::from_config(&cfg),
        Layout::new(cfg.narrow_breakpoint, viewport.width()),
    );
    screen.attach_viewport(viewport.subscribe());

    screen.load().await;
    println!("{}", terminal::render(&screen.view(), cfg.env_label.as_deref()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt("> ");
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read command: {e}");
                break;
            }
        };

        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => {
                println!("{}", terminal::HELP);
                continue;
            }
            Command::Invalid(message) => {
                println!("{message}");
                continue;
            }
            Command::List | Command::Back => screen.back(),
            Command::Open(n) => match screen.notes().get(n - 1).map(|note| note.id.clone()) {
                Some(id) => screen.select(&id),
                None => {
                    println!("There is no note number {n}");
                    continue;
                }
            },
            Command::New => {
                screen.create().await;
            }
            Command::Title(title) => screen.edit_title(title),
            Command::Content(content) => screen.edit_content(content),
            Command::Save => {
                if !screen.can_save() {
                    println!("Nothing to save");
                    continue;
                }
                screen.save().await;
            }
            Command::Delete => {
                let Some(question) = screen.delete_prompt() else {
                    println!("No note selected");
                    continue;
                };
                prompt(&format!("{question} [y/N] "));
                let answer = lines.next_line().await.ok().flatten().unwrap_or_default();
                let confirmed = terminal::is_yes(&answer);
                screen.delete(|_: &str| confirmed).await;
            }
            Command::Width(width) => {
                viewport.set_width(width);
                screen.sync_viewport();
            }
            Command::Dismiss => screen.dismiss_error(),
            Command::Reload => {
                screen.load().await;
            }
        }

        println!("{}", terminal::render(&screen.view(), cfg.env_label.as_deref()));
    }

    screen.teardown();
    tracing::debug!("Notes client exiting");
}
