//! Output formatting for the command-line shell.
//!
//! Errors are red, section headers white, secondary details bright black. Every
//! message is surrounded by blank lines so command output stands apart in a terminal.

use crate::core::change_list::CommittedChangeList;
use colored::*;

/// Formats and prints an error message
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a warning that did not stop the command
pub fn print_warning(message: &str) {
    println!("\n{} {}\n", "! Warning:".yellow(), message.white());
}

pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// One line per change list: number, date, author and first comment line.
pub fn format_change_list<L: CommittedChangeList + ?Sized>(list: &L) -> String {
    let summary = list.comment().lines().next().unwrap_or("");
    format!(
        "  {} {} {} {} {}",
        format!("[{}]", list.number()).blue(),
        list.commit_date().format("%Y-%m-%d %H:%M").to_string().bright_black(),
        list.author().cyan(),
        summary.white(),
        format!("({} files)", list.changes().len()).bright_black()
    )
}

pub fn print_change_lists<L: CommittedChangeList>(header: &str, lists: &[L]) {
    print_section_header(header);
    for list in lists {
        println!("{}", format_change_list(list));
    }
    println!();
}
