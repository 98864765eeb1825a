//! Line commands and text rendering for the terminal front end.

use crate::controller::ScreenView;
use crate::layout::Panel;

pub const HELP: &str = "\
Commands:
  list | ls          show the note list
  open <n>           open the n-th note of the list
  new                create a note
  title <text>       edit the title
  content <text>     edit the content (\\n starts a new line)
  save               save the current draft
  delete             delete the current note
  back               return to the list on narrow screens
  width <n>          set the screen width
  dismiss            hide the error message
  reload             fetch the notes again
  help               show this help
  quit | exit        leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    List,
    Open(usize),
    New,
    Title(String),
    Content(String),
    Save,
    Delete,
    Back,
    Width(u16),
    Dismiss,
    Reload,
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.trim_start().split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line.trim(), ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "list" | "ls" => Self::List,
            "open" => rest
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map_or_else(|| Self::Invalid("usage: open <n>".to_string()), Self::Open),
            "new" => Self::New,
            "title" => Self::Title(rest.to_string()),
            "content" => Self::Content(rest.replace("\\n", "\n")),
            "save" => Self::Save,
            "delete" | "rm" => Self::Delete,
            "back" => Self::Back,
            "width" => rest
                .trim()
                .parse::<u16>()
                .map_or_else(|_| Self::Invalid("usage: width <n>".to_string()), Self::Width),
            "dismiss" => Self::Dismiss,
            "reload" => Self::Reload,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command '{other}', try 'help'")),
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn render(view: &ScreenView<'_>, env_label: Option<&str>) -> String {
    let mut lines = Vec::new();

    match env_label {
        Some(label) => lines.push(format!("== Notes [{label}] ==")),
        None => lines.push("== Notes ==".to_string()),
    }
    if view.offline {
        lines.push("(offline: changes are kept in memory only)".to_string());
    }
    if let Some(error) = view.error {
        lines.push(format!("! {error}  (type 'dismiss' to hide)"));
    }
    if view.loading {
        lines.push("Loading...".to_string());
    }

    if view.panels.shows(Panel::List) {
        lines.push(String::new());
        if view.items.is_empty() && !view.loading {
            lines.push("  No notes yet. Type 'new' to create one.".to_string());
        }
        for (n, item) in view.items.iter().enumerate() {
            let marker = if item.selected { '*' } else { ' ' };
            lines.push(format!(
                "{marker} {:>2}. {}  ({})",
                n + 1,
                item.title,
                item.updated_at
            ));
        }
    }

    if view.panels.shows(Panel::Editor) {
        lines.push(String::new());
        match view.selected {
            Some(note) => {
                let state = if view.saving {
                    "saving..."
                } else if view.draft.dirty {
                    "unsaved changes"
                } else {
                    "saved"
                };
                lines.push(format!("Title: {}", view.draft.title));
                lines.push("Content:".to_string());
                lines.extend(view.draft.content.lines().map(|l| format!("  {l}")));
                lines.push(format!("[{state}] Last updated: {}", note.updated_at));
            }
            None => lines.push("Select a note to start editing.".to_string()),
        }
    }

    lines.join("\n")
}
