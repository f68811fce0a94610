use crate::core::{
    command_init::CacheCommandInit,
    error::Result,
    output::{print_change_lists, print_info, print_success},
};

/// Read recent history from git and append it to the cache.
///
/// `count == Some(0)` fetches the whole history and marks the cache as holding it.
pub fn execute_fetch(count: Option<usize>, incomplete: bool) -> Result<()> {
    let mut context = CacheCommandInit::initialize()?;
    let count = count.unwrap_or(context.config.default_count);
    let assume_complete = context.config.assume_complete && !incomplete;

    // Older history cannot be appended behind newer entries, so a partial cache is rebuilt.
    if count == 0 && !context.cache.is_empty() && !context.cache.has_complete_history() {
        log::info!("Rebuilding partial cache with the whole history");
        context.cache.clear();
    }

    let fetched = context.git_repo.fetch_change_lists(count)?;
    log::debug!("Fetched {} change lists from git", fetched.len());
    let fetched = context.cache.retain_uncached(fetched)?;

    let written = context
        .cache
        .append_change_lists(fetched, assume_complete)
        .map_err(|e| {
            log::error!("Failed to append change lists: {e}");
            e
        })?;

    if count == 0 {
        context.cache.set_complete_history(true)?;
    }

    if written.is_empty() {
        print_info("No new change lists to cache");
    } else {
        print_change_lists("Cached", &written);
        print_success(&format!("Cached {} change lists", written.len()));
    }
    Ok(())
}
