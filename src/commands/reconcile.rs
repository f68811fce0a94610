use crate::core::{
    command_init::CacheCommandInit,
    error::{CacheError, Result},
    output::{print_info, print_success, print_warning},
    updated_files::UpdatedFiles,
};
use std::fs;
use std::path::Path;

/// Load an updated files report written as JSON.
pub fn load_report(path: &Path) -> Result<UpdatedFiles> {
    let content =
        fs::read_to_string(path).map_err(|e| CacheError::report_read_failed(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Reconcile incoming change lists with a report file or with commits since `since`.
pub fn execute_reconcile(report: Option<&Path>, since: Option<&str>) -> Result<()> {
    let context = CacheCommandInit::initialize()?;

    let updated = match (report, since) {
        (Some(path), _) => load_report(path)?,
        (None, Some(rev)) => context.git_repo.updated_files_since(rev)?,
        (None, None) => {
            print_info("Nothing to reconcile: pass a report file or --since <rev>");
            return Ok(());
        }
    };

    // Promotion rewrites entries in place, so the same tail window holds the candidates afterwards.
    let candidates = context.cache.incoming_count()?;
    let unaccounted = context.cache.reconcile_updated_files(&updated)?;
    let still_incoming = context
        .cache
        .read_last_index_entries(0, candidates as u64)?
        .iter()
        .filter(|entry| !entry.completely_downloaded)
        .count();

    if unaccounted {
        print_warning("Updated files include changes the cache does not know about");
    } else {
        print_success(&format!(
            "{} change lists marked completely downloaded, {} still incoming",
            candidates - still_incoming,
            still_incoming
        ));
    }
    Ok(())
}
