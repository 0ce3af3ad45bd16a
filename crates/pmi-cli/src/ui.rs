//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use pmi_core::{AnalysisOutcome, Error, ErrorCategory, Result, Section, StructuralWarning};

use crate::history::AnalysisHistory;

const PROMPT: &str = "pmi>";

fn terminal_width() -> usize {
    size().map(|(w, _)| w as usize).unwrap_or(80)
}

/// Display startup banner
pub fn display_banner() {
    let banner_width = std::cmp::min(67, terminal_width().saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "PM Insight Copilot";
    let title_line = format!(
        "│  {}{}│",
        title.blue().bold(),
        " ".repeat(banner_width - title.len() - 4)
    );
    println!("{}", title_line);

    println!("{}", empty_line.blue());

    let feature_lines = [
        "AI-powered competitive analysis",
        "",
        "Dimensions:",
        "• Model Stack    • Scene-Fit     • Data Moat",
        "• UX Friction    • Commercial ROI",
        "• Asymmetric competition suggestion",
        "",
        "Powered by Gemini",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let padding = banner_width.saturating_sub(line.chars().count() + 4);
            let content = if line.starts_with("Powered by") {
                format!("│  {}{}│", line.dimmed(), " ".repeat(padding))
            } else {
                format!("│  {}{}│", line, " ".repeat(padding))
            };
            println!("{}", content.blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "💡 Tip: Type a competitor name or product description, or 'help' for commands".dimmed()
    );
    println!();
}

fn redraw(input: &str, cursor_pos: usize) -> io::Result<()> {
    let tail = input[cursor_pos..].chars().count();
    print!("\r\x1b[2K{} {}", PROMPT.green().bold(), input);
    if tail > 0 {
        print!("\x1b[{}D", tail);
    }
    io::stdout().flush()
}

/// Handle input with history navigation
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Piped input: read a plain line, no raw mode
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok("exit".to_string());
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(input)
}

fn read_line_raw(history: &[String]) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    // byte offset into `input`, always on a char boundary
    let mut cursor_pos = 0;

    redraw(&input, cursor_pos)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind == KeyEventKind::Release {
            continue;
        }

        match key_event.code {
            KeyCode::Enter => return Ok(input.trim().to_string()),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok("exit".to_string());
            }
            KeyCode::Char(c) => {
                input.insert(cursor_pos, c);
                cursor_pos += c.len_utf8();
            }
            KeyCode::Backspace => {
                if let Some((prev, _)) = input[..cursor_pos].char_indices().next_back() {
                    input.remove(prev);
                    cursor_pos = prev;
                }
            }
            KeyCode::Left => {
                if let Some((prev, _)) = input[..cursor_pos].char_indices().next_back() {
                    cursor_pos = prev;
                }
            }
            KeyCode::Right => {
                if let Some(c) = input[cursor_pos..].chars().next() {
                    cursor_pos += c.len_utf8();
                }
            }
            KeyCode::Up => {
                if history.is_empty() {
                    continue;
                }
                let new_index = match history_index {
                    None => history.len() - 1,
                    Some(idx) if idx > 0 => idx - 1,
                    Some(idx) => idx,
                };
                history_index = Some(new_index);
                input = history[new_index].clone();
                cursor_pos = input.len();
            }
            KeyCode::Down => {
                let Some(idx) = history_index else {
                    continue;
                };
                if idx + 1 < history.len() {
                    history_index = Some(idx + 1);
                    input = history[idx + 1].clone();
                } else {
                    history_index = None;
                    input.clear();
                }
                cursor_pos = input.len();
            }
            KeyCode::Esc => return Ok(String::new()),
            _ => continue,
        }

        redraw(&input, cursor_pos)?;
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Analyze a competitor by name or description", "<product>".green());
    println!("  {} - List analyses from this session", "history".green());
    println!("  {} - Show a previous analysis by number or name", "show <n|name>".green());
    println!("  {} - Save the last analysis as a Markdown report", "export [path]".green());
    println!("  {} - Forget this session's analyses", "clear".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  ChatGPT");
    println!("  Notion AI");
    println!("  an AI note-taking app for sales calls");
    println!("  export ./reports");
}

/// Greedy word wrap on char counts. Words longer than `width` are split.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let indent: String = paragraph.chars().take_while(|c| c.is_whitespace()).collect();
        let mut current = indent.clone();
        let mut current_len = indent.chars().count();

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let needs_space = current_len > indent.chars().count();
                let room = width.saturating_sub(current_len + usize::from(needs_space));

                if word.len() <= room {
                    if needs_space {
                        current.push(' ');
                        current_len += 1;
                    }
                    current.extend(word.iter());
                    current_len += word.len();
                    break;
                }

                if needs_space {
                    lines.push(std::mem::replace(&mut current, indent.clone()));
                    current_len = indent.chars().count();
                    continue;
                }

                // a single word wider than the line
                let take = room.max(1);
                current.extend(word.drain(..take));
                lines.push(std::mem::replace(&mut current, indent.clone()));
                current_len = indent.chars().count();
                if word.is_empty() {
                    break;
                }
            }
        }

        if current_len > indent.chars().count() {
            lines.push(current);
        }
    }

    lines
}

fn render_panel(index: Option<usize>, section: Section, body: &str, width: usize) {
    let title = match index {
        Some(n) => format!("{}. {}", n, section.title()),
        None => format!("💡 {}", section.title()),
    };
    let rule = "─".repeat(width.saturating_sub(title.chars().count() + 5));

    println!("{} {} {}", "┌─".blue(), title.bold(), rule.blue());
    if body.trim().is_empty() {
        println!("{} {}", "│".blue(), "No data".dimmed());
    } else {
        for line in wrap_text(body.trim(), width.saturating_sub(4)) {
            println!("{} {}", "│".blue(), line);
        }
    }
    println!("{}", "└".blue());
    println!();
}

/// Print the six panels of an analysis followed by any structural warnings
pub fn render_outcome(outcome: &AnalysisOutcome) {
    let width = terminal_width().min(100);

    println!();
    println!(
        "{} Analysis complete: {} {}",
        "✅".green(),
        outcome.product().bold(),
        format!("({}, {} attempt(s))", outcome.model_id, outcome.attempts).dimmed()
    );
    println!();

    for (idx, section) in Section::DIMENSIONS.into_iter().enumerate() {
        render_panel(Some(idx + 1), section, outcome.response.get(section), width);
    }
    render_panel(None, Section::Suggestion, &outcome.response.suggestion, width);

    render_warnings(&outcome.warnings);
}

/// Print structural warnings to stderr
pub fn render_warnings(warnings: &[StructuralWarning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!(
        "{} The response did not fully match the expected structure; results may be partial:",
        "⚠️".yellow()
    );
    for warning in warnings {
        eprintln!("  {} {}", "•".yellow(), warning);
    }
    eprintln!();
}

/// Short advice shown under an error, by category
pub(crate) fn error_hint(err: &Error) -> &'static str {
    match err.category() {
        ErrorCategory::Configuration => {
            "Set GEMINI_API_KEY in your environment or in a .env file, then try again."
        }
        ErrorCategory::Network => "Check your connection and try again.",
        ErrorCategory::RateLimit => "The provider is rate limiting requests. Wait a moment and try again.",
        ErrorCategory::Provider => "The provider rejected the request. Try rephrasing or simplifying the product description.",
        ErrorCategory::Input => "Enter a competitor name or product description.",
        ErrorCategory::Internal => "Something unexpected happened. Run with --verbose for details.",
    }
}

/// Print a categorized error to stderr
pub fn render_error(err: &Error) {
    let label = match err.category() {
        ErrorCategory::Configuration => "Configuration error",
        ErrorCategory::Network => "Network error",
        ErrorCategory::RateLimit => "Rate limited",
        ErrorCategory::Provider => "Provider error",
        ErrorCategory::Input => "Invalid input",
        ErrorCategory::Internal => "Error",
    };

    eprintln!("{} {}: {}", "❌".red(), label.red().bold(), err);
    eprintln!("   {}", error_hint(err).dimmed());
    if err.is_retryable() {
        eprintln!("   {}", "This is usually temporary. Try again in a moment.".dimmed());
    }
}

/// List the session history, most recent first
pub fn render_history(history: &AnalysisHistory) {
    if history.is_empty() {
        println!("{}", "No analyses yet in this session.".dimmed());
        return;
    }

    println!("{}", format!("Recent analyses ({}):", history.len()).bold());
    for (idx, entry) in history.iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("{:>2}.", idx + 1).green(),
            entry.product,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
}
