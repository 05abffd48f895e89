//! Shell command grammar.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wordsearch_core::{Direction, ExportFormat, Theme};

/// One line typed at the prompt.
#[derive(Parser, Debug, PartialEq)]
#[command(no_binary_name = true, disable_help_subcommand = true, disable_help_flag = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Add a word
    Add {
        #[arg(required = true, num_args = 1..)]
        word: Vec<String>,
    },
    /// Paste many words, one block ended by an empty line
    Paste,
    /// Load words from a .txt or .csv file
    Import { path: PathBuf },
    /// Remove a word
    Remove {
        #[arg(required = true, num_args = 1..)]
        word: Vec<String>,
    },
    /// Shuffle the word list
    Shuffle,
    /// Remove every word
    Clear,
    /// Load the sample word list
    Samples,
    /// Show the word list
    Words,
    /// Select a shape by name
    Shape { name: String },
    /// List built-in and custom shapes
    Shapes,
    /// Select a custom shape
    Use { name: String },
    /// Upload an image as a custom shape
    Upload { path: PathBuf, name: String },
    /// Draw a custom shape
    Draw {
        #[command(subcommand)]
        action: DrawAction,
    },
    /// Delete a custom shape
    Delete { name: String },
    /// Delete every custom shape
    ClearShapes,
    /// Enable or disable a placement direction
    Dir {
        #[arg(value_parser = parse_direction)]
        direction: Direction,
        state: Toggle,
    },
    /// Show the current preview
    Preview,
    /// Generate and save the puzzle document
    Export {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        font: Option<String>,
        #[arg(long, value_parser = parse_theme)]
        theme: Option<Theme>,
        #[arg(long, value_parser = parse_format)]
        format: Option<ExportFormat>,
    },
    /// Show this help
    Help,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum DrawAction {
    /// Start a stroke
    Down { x: f64, y: f64 },
    /// Continue the stroke
    Move { x: f64, y: f64 },
    /// End the stroke
    Up,
    /// Set the brush width (1-50)
    Brush { width: f64 },
    /// Set the brush colour (#rrggbb)
    Color { hex: String },
    /// Clear the drawing
    Clear,
    /// Save the drawing as a custom shape
    Save { name: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::parse(s).ok_or_else(|| format!("unknown direction '{}' (use h, v or d)", s))
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    Theme::parse(s).ok_or_else(|| format!("unknown theme '{}' (use modern, cozy or playful)", s))
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(s).ok_or_else(|| format!("unknown format '{}' (use pdf or word)", s))
}

/// Split a line into arguments, honouring single and double quotes.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// Parse a prompt line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let args = split_line(line)?;
    if args.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(args)
        .map(|line| Some(line.command))
        .map_err(|e| e.render().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(
            split_line(r#"export --title "Zoo Trip" --subject 'Grade 2'"#).unwrap(),
            vec!["export", "--title", "Zoo Trip", "--subject", "Grade 2"]
        );
        assert_eq!(split_line("  ").unwrap(), Vec::<String>::new());
        assert_eq!(split_line("add \"\"").unwrap(), vec!["add", ""]);
        assert!(split_line("add \"oops").is_err());
    }

    #[test]
    fn test_multi_word_add() {
        assert_eq!(
            parse("add ice cream"),
            Command::Add { word: vec!["ice".to_string(), "cream".to_string()] }
        );
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn test_draw_and_dir() {
        assert_eq!(
            parse("draw move 10 20.5"),
            Command::Draw { action: DrawAction::Move { x: 10.0, y: 20.5 } }
        );
        assert_eq!(
            parse("dir d off"),
            Command::Dir { direction: Direction::Diagonal, state: Toggle::Off }
        );
        assert_eq!(parse("clear-shapes"), Command::ClearShapes);
        assert_eq!(parse("exit"), Command::Quit);
    }

    #[test]
    fn test_export_options() {
        assert_eq!(
            parse("export --title \"My Puzzle\" --theme cozy --format word"),
            Command::Export {
                title: Some("My Puzzle".to_string()),
                subject: None,
                font: None,
                theme: Some(Theme::Cozy),
                format: Some(ExportFormat::Word),
            }
        );
        assert!(parse_line("export --theme neon").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_line("frobnicate").is_err());
    }
}
