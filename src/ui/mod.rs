//! Terminal output helpers for the popcorn CLI.
//!
//! Colored status lines, a loading spinner, and the boxed detail and summary
//! views shown by `details`, `watched summary`, and the interactive mode.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::models::{MovieDetails, MovieSummary, WatchedMovie};
use crate::watchlist::WatchSummary;

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Loading => "◐",
        Status::Search => "🔍",
        Status::Star => "⭐",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Loading,
    Search,
    Star,
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => println!("{} {}", icon.green().bold(), msg),
        Status::Error => println!("{} {}", icon.red().bold(), msg),
        Status::Warning => println!("{} {}", icon.yellow().bold(), msg),
        Status::Info => println!("{} {}", icon.cyan().bold(), msg),
        Status::Loading => println!("{} {}", icon.cyan(), msg),
        Status::Search => println!("{} {}", icon.yellow(), msg),
        Status::Star => println!("{} {}", icon.yellow(), msg),
    }
}

/// Welcome banner for the interactive mode.
pub fn print_banner() {
    println!();
    println!(
        "{} {} {}",
        "🍿".bold(),
        "popcorn".yellow().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!(
        "{}",
        "Type to search. :open <n>, :rate <1-10>, :add, :close, :watched, :summary, :help, :quit"
            .dimmed()
    );
    println!();
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print search results header.
pub fn print_search_header(query: &str, count: usize, duration: Duration) {
    println!();
    println!(
        "{} Search results for: \"{}\"",
        status_icon(Status::Search).yellow().bold(),
        query.cyan().bold()
    );
    println!(
        "{} Found {} results in {:.2}s",
        "─".repeat(30).dimmed(),
        count.to_string().green().bold(),
        duration.as_secs_f64()
    );
    println!();
}

/// Print a numbered list of search results.
pub fn print_movie_list(movies: &[MovieSummary]) {
    let width = terminal_width().saturating_sub(16).max(20);
    for (i, movie) in movies.iter().enumerate() {
        println!(
            "{:>3}. {} {} {}",
            (i + 1).to_string().dimmed(),
            truncate_with_ellipsis(&movie.title, width).bold(),
            format!("({})", movie.year).yellow(),
            movie.imdb_id.dimmed()
        );
    }
}

/// Print a movie's details in a formatted box.
pub fn print_details_box(details: &MovieDetails, user_rating: Option<u8>) {
    let width = terminal_width().clamp(40, 100) - 4;

    println!();
    println!("┌{}┐", "─".repeat(width + 2));
    println!(
        "│ {} {}",
        "🎬".cyan(),
        truncate_with_ellipsis(&details.title, width - 3).blue().bold()
    );
    println!("├{}┤", "─".repeat(width + 2));
    println!(
        "│  {} • {}",
        details.released.yellow(),
        details.runtime.green()
    );
    println!("│  {}", truncate_with_ellipsis(&details.genre, width - 2));
    println!(
        "│  {} {} IMDb rating",
        status_icon(Status::Star),
        details.imdb_rating.yellow()
    );
    if let Some(rating) = user_rating {
        println!(
            "│  You rated this movie {} {}",
            status_icon(Status::Star),
            rating.to_string().green().bold()
        );
    }
    println!("├{}┤", "─".repeat(width + 2));
    for line in wrap(&details.plot, width - 2) {
        println!("│  {}", line.italic());
    }
    println!(
        "│  Starring {}",
        truncate_with_ellipsis(&details.actors, width - 11)
    );
    println!(
        "│  Directed by {}",
        truncate_with_ellipsis(&details.director, width - 14)
    );
    println!("└{}┘", "─".repeat(width + 2));
}

/// Print the watch-list summary line block.
pub fn print_watch_summary(summary: &WatchSummary) {
    print_section("Movies you watched");
    println!(
        "  #️⃣  {} movies   ⭐️ {:.2}   🌟 {:.2}   ⏳ {:.0} min",
        summary.count.to_string().bold(),
        summary.avg_imdb_rating,
        summary.avg_user_rating,
        summary.avg_runtime
    );
}

/// Print the watched movies, one per line.
pub fn print_watched(movies: &[WatchedMovie]) {
    let width = terminal_width().saturating_sub(40).max(20);
    for movie in movies {
        println!(
            "  {} {}  ⭐️ {:.1}  🌟 {}  ⏳ {} min",
            movie.imdb_id.dimmed(),
            truncate_with_ellipsis(&movie.title, width).bold(),
            movie.imdb_rating,
            movie.user_rating.to_string().green(),
            movie.runtime
        );
    }
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width <= 3 {
        return "...".to_string();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let mut current_width = 0;
    let mut end_idx = 0;
    for (i, (_, w)) in char_widths.iter().enumerate() {
        if current_width + w > max_width - 3 {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated)
}

/// Greedy word wrap by display width.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let w = unicode_width::UnicodeWidthStr::width(word);
        if line_width > 0 && line_width + 1 + w > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if line_width > 0 {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(word);
        line_width += w;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Loading spinner shown while a search is outstanding.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(style("{spinner:.cyan} {msg}").tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Remove the spinner from the terminal.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}
