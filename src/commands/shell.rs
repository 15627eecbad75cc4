//! Line-oriented session over one loaded data directory.
//!
//! Each input line is split like a shell command line and parsed with the
//! same subcommands as the CLI, plus session commands for undo, redo, and
//! switching days. Unsaved changes are written when the session ends.

use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Write};
use yada_core::{DataStore, DietManager};

use super::{parse_date, FoodCommand, LogCommand, ProfileCommand};

#[derive(Args)]
pub struct ShellCommand {
    /// Day to start on (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,
}

#[derive(Parser)]
#[command(name = "yada", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellAction,
}

#[derive(Subcommand)]
enum ShellAction {
    /// Manage the food catalog
    Food(FoodCommand),

    /// Log food for the active day
    Log(LogCommand),

    /// Manage body metrics and calorie method
    Profile(ProfileCommand),

    /// Undo the last log or profile edit
    Undo,

    /// Redo the last undone edit
    Redo,

    /// List edits that can be undone, oldest first
    History,

    /// Show or switch the active day (clears undo history)
    Date {
        /// New active day (YYYY-MM-DD)
        date: Option<String>,
    },

    /// Write all data now
    Save,

    /// Save and leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

impl ShellCommand {
    pub fn run(
        &self,
        manager: DietManager,
        store: DataStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut session = Session::new(manager, store);
        if let Some(date) = &self.date {
            session.manager.set_date(parse_date(date)?);
        }

        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        if interactive {
            println!("YADA shell. Type 'help' for commands, 'quit' to leave.");
        }

        let mut lines = stdin.lock().lines();
        loop {
            if interactive {
                print!("yada [{}]> ", session.manager.date());
                io::stdout().flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            match session.handle(&line?) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        session.finish()
    }
}

struct Session {
    manager: DietManager,
    store: DataStore,
    unsaved: bool,
}

impl Session {
    fn new(manager: DietManager, store: DataStore) -> Self {
        Self {
            manager,
            store,
            unsaved: false,
        }
    }

    fn handle(&mut self, line: &str) -> Result<Flow, Box<dyn std::error::Error>> {
        let words = split_words(line)?;
        if words.is_empty() || words[0].starts_with('#') {
            return Ok(Flow::Continue);
        }

        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Covers `help` and `--help` as well as usage errors.
                e.print()?;
                return Ok(Flow::Continue);
            }
        };

        match parsed.command {
            ShellAction::Food(cmd) => self.unsaved |= cmd.apply(&mut self.manager)?,
            ShellAction::Log(cmd) => self.unsaved |= cmd.apply(&mut self.manager)?,
            ShellAction::Profile(cmd) => self.unsaved |= cmd.apply(&mut self.manager)?,
            ShellAction::Undo => match self.manager.undo() {
                Some(description) => {
                    println!("Undid: {}", description);
                    self.unsaved = true;
                }
                None => println!("Nothing to undo"),
            },
            ShellAction::Redo => match self.manager.redo() {
                Some(description) => {
                    println!("Redid: {}", description);
                    self.unsaved = true;
                }
                None => println!("Nothing to redo"),
            },
            ShellAction::History => {
                let history = self.manager.history();
                if history.is_empty() {
                    println!("No edits to undo.");
                }
                for (i, description) in history.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, description);
                }
                let redo = self.manager.redo_history();
                if !redo.is_empty() {
                    println!("Undone (redo applies the last first):");
                    for description in redo.iter().rev() {
                        println!("     {}", description);
                    }
                }
            }
            ShellAction::Date { date } => {
                if let Some(date) = date {
                    self.manager.set_date(parse_date(&date)?);
                }
                println!("Active day: {}", self.manager.date());
            }
            ShellAction::Save => {
                self.manager.save(&self.store)?;
                self.unsaved = false;
                println!("Saved to {}", self.store.data_dir().display());
            }
            ShellAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn finish(mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.unsaved {
            self.manager.save(&self.store)?;
            println!("Saved to {}", self.store.data_dir().display());
        }
        Ok(())
    }
}

/// Split a line into words. Single and double quotes group words, and a
/// backslash outside single quotes escapes the next character.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "Trailing backslash".to_string())?;
                current.push(escaped);
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("Unterminated {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use yada_core::DEFAULT_METHOD;

    fn session(temp: &TempDir) -> Session {
        let store = DataStore::new(temp.path());
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let (manager, _) = DietManager::open(&store, date, DEFAULT_METHOD, 100).unwrap();
        Session::new(manager, store)
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words("log add Banana -s 2").unwrap(),
            vec!["log", "add", "Banana", "-s", "2"]
        );
        assert_eq!(
            split_words(r#"food add "Peanut Butter" --calories 94"#).unwrap(),
            vec!["food", "add", "Peanut Butter", "--calories", "94"]
        );
        assert_eq!(
            split_words(r"log add Mac\ and\ Cheese 'it''s'").unwrap(),
            vec!["log", "add", "Mac and Cheese", "its"]
        );
        assert_eq!(split_words("say ''").unwrap(), vec!["say", ""]);
        assert!(split_words("   ").unwrap().is_empty());
    }

    #[test]
    fn test_split_words_unterminated_quote() {
        assert!(split_words("food show \"Banana").is_err());
    }

    #[test]
    fn test_remove_and_undo_in_session() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        for line in [
            "food add Banana --calories 100 -k fruit,yellow",
            "log add Banana --servings 2",
            "log remove Banana",
        ] {
            assert_eq!(session.handle(line).unwrap(), Flow::Continue);
        }
        assert_eq!(session.manager.daily_log().servings("Banana"), None);

        session.handle("undo").unwrap();
        assert_eq!(session.manager.daily_log().servings("Banana"), Some(2.0));
        session.handle("redo").unwrap();
        assert_eq!(session.manager.daily_log().servings("Banana"), None);
    }

    #[test]
    fn test_bad_lines_do_not_end_session() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        assert_eq!(session.handle("").unwrap(), Flow::Continue);
        assert_eq!(session.handle("# comment").unwrap(), Flow::Continue);
        assert_eq!(session.handle("frobnicate").unwrap(), Flow::Continue);
        assert!(session.handle("log add Banana --servings 0").is_err());
        assert!(session.handle("date 2025/06/02").is_err());
        assert_eq!(session.handle("quit").unwrap(), Flow::Quit);
        assert_eq!(session.handle("exit").unwrap(), Flow::Quit);
    }

    #[test]
    fn test_date_switch_clears_history() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        session.handle("log add Oats").unwrap();
        assert!(session.manager.can_undo());

        session.handle("date 2025-06-02").unwrap();
        assert_eq!(
            session.manager.date(),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
        assert!(!session.manager.can_undo());
    }

    #[test]
    fn test_finish_saves_unsaved_changes() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        session
            .handle("food add \"Greek Yogurt\" --calories 59 -k dairy")
            .unwrap();
        assert!(session.unsaved);
        session.finish().unwrap();

        let reopened = self::session(&temp);
        assert_eq!(reopened.manager.food_calories("Greek Yogurt").unwrap(), 59.0);
    }
}
