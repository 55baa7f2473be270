use crate::commands::dispatcher::CommandDispatcher;
use crate::core::error::DriveThruError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::path::{Path, PathBuf};

/// Line-editing helper: slash-command completion plus history hints.
pub struct OrderHelper {
    commands: CommandDispatcher,
    history_hinter: HistoryHinter,
}

impl OrderHelper {
    pub fn new(commands: CommandDispatcher) -> Self {
        Self {
            commands,
            history_hinter: HistoryHinter::new(),
        }
    }
}

impl Completer for OrderHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !line.starts_with('/') {
            return Ok((pos, Vec::new()));
        }

        let command_part = &line[1..pos];
        let matches: Vec<Pair> = self
            .commands
            .get_command_names()
            .into_iter()
            .filter(|cmd| cmd.starts_with(command_part))
            .map(|cmd| Pair {
                display: format!("/{}", cmd),
                replacement: cmd,
            })
            .collect();

        Ok((1, matches))
    }
}

impl Hinter for OrderHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.history_hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for OrderHelper {}
impl Validator for OrderHelper {}
impl Helper for OrderHelper {}

fn history_path() -> PathBuf {
    dirs::home_dir()
        .map(|mut path| {
            path.push(".drivethru/input_history.txt");
            path
        })
        .unwrap_or_else(|| Path::new(".drivethru/input_history.txt").to_path_buf())
}

/// Creates a configured rustyline editor
pub fn create_editor(
    commands: CommandDispatcher,
) -> Result<Editor<OrderHelper, FileHistory>, DriveThruError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| DriveThruError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(OrderHelper::new(commands)));

    let _ = editor.load_history(&history_path());

    Ok(editor)
}

/// Reads one line; `None` means the customer is done (Ctrl-C/Ctrl-D).
pub fn read_input(
    editor: &mut Editor<OrderHelper, FileHistory>,
) -> Result<Option<String>, DriveThruError> {
    let prompt = style("you> ").bold().cyan().to_string();
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                if let Err(e) = editor.add_history_entry(&line) {
                    return Err(DriveThruError::Input(format!(
                        "Failed to add history entry: {}",
                        e
                    )));
                }
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Thanks for coming through!");
            Ok(None)
        }
        Err(err) => Err(DriveThruError::Input(format!("Input error: {}", err))),
    }
}

/// Saves the editor history
pub fn save_history(editor: &mut Editor<OrderHelper, FileHistory>) -> Result<(), DriveThruError> {
    let path = history_path();

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DriveThruError::Input(format!("Failed to create history directory: {}", e))
            })?;
        }
    }

    editor
        .save_history(&path)
        .map_err(|e| DriveThruError::Input(format!("Failed to save history: {}", e)))
}
