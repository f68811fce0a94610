use crate::core::{
    command_init::CacheCommandInit,
    error::Result,
    output::{print_info, print_section_header},
};
use colored::*;

/// Print the header summary of the cache for this repository.
pub fn execute_info() -> Result<()> {
    let mut context = CacheCommandInit::initialize()?;
    let cache = &mut context.cache;

    if cache.is_empty() {
        print_info("Cache is empty");
        return Ok(());
    }

    let branch = context
        .git_repo
        .get_current_branch()
        .unwrap_or_else(|_| "-none-".to_string());
    let entries = cache.index_entry_count()?;

    print_section_header("Cache");
    let rows = [
        ("Branch", branch),
        ("Location", cache.location().to_string()),
        ("File", cache.path().display().to_string()),
        ("Change lists", entries.to_string()),
        ("First change list", cache.first_cached_change_list().to_string()),
        ("First cached", cache.first_cached_date().to_rfc3339()),
        ("Last cached", cache.last_cached_date().to_rfc3339()),
        (
            "History",
            if cache.has_complete_history() {
                "complete".to_string()
            } else {
                "partial".to_string()
            },
        ),
    ];
    for (label, value) in rows {
        println!("  {:<18} {}", format!("{label}:").bright_black(), value.white());
    }
    println!();
    Ok(())
}
