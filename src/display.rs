use console::style;
use termimad::MadSkin;

/// Welcome banner shown once the menu is loaded.
pub fn display_welcome(item_count: usize, menu_source: &str) {
    println!(
        "\n{}",
        style("🍔 Welcome to the AI Drive-Thru!").bold().yellow()
    );
    println!(
        "{}",
        style(format!("Menu loaded: {} items ({})", item_count, menu_source)).dim()
    );
    println!(
        "{}",
        style("Ask for the menu, order in plain English, or type /help for commands.").dim()
    );
    println!("{}", style("Press Ctrl-D or type /quit to leave.\n").dim());
}

/// Display an assistant reply in a formatted box.
pub fn display_response(response: &str) {
    let term = console::Term::stdout();
    let terminal_width = term.size().1 as usize;
    let max_width = std::cmp::min(terminal_width.saturating_sub(4), 100).max(40);

    let mut wrapped = Vec::new();
    for line in response.lines() {
        if line.len() <= max_width.saturating_sub(4) {
            wrapped.push(line.to_string());
        } else {
            wrapped.extend(wrap_line(line, max_width.saturating_sub(4)));
        }
    }

    let content_width = wrapped.iter().map(|l| l.len()).max().unwrap_or(0);
    let box_width = std::cmp::min(max_width, content_width + 4);

    let top = "┌".to_string() + &"─".repeat(box_width.saturating_sub(2)) + "┐";
    let bottom = "└".to_string() + &"─".repeat(box_width.saturating_sub(2)) + "┘";

    println!("\n{}", style(&top).dim().yellow());
    for line in wrapped {
        let padding = box_width.saturating_sub(line.len() + 3);
        println!("│ {}{}│", style(&line).white(), " ".repeat(padding));
    }
    println!("{}", style(&bottom).dim().yellow());
}

/// Render markdown-ish replies (menus come back as lists) with termimad.
pub fn display_markdown(response: &str) {
    let skin = MadSkin::default();
    println!();
    skin.print_text(response);
    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", style("✗").bold().red(), style(error).red());
}

fn wrap_line(line: &str, max_len: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut remaining = line;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            lines.push(remaining.to_string());
            break;
        }
        // break on a space near the limit when there is one
        if let Some(break_pos) = remaining[..max_len].rfind(' ') {
            lines.push(remaining[..break_pos].to_string());
            remaining = remaining[break_pos + 1..].trim_start();
        } else {
            lines.push(remaining[..max_len].to_string());
            remaining = &remaining[max_len..];
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_line_breaks_on_spaces() {
        let wrapped = wrap_line("one two three four five", 10);
        assert!(wrapped.iter().all(|l| l.len() <= 10));
        assert_eq!(wrapped.join(" "), "one two three four five");
    }

    #[test]
    fn wrap_line_hard_breaks_long_words() {
        let wrapped = wrap_line(&"x".repeat(25), 10);
        assert_eq!(wrapped.len(), 3);
    }
}
