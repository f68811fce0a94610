use crate::core::{
    command_init::CacheCommandInit,
    error::Result,
    output::{print_info, print_success},
};

/// Show or change whether the cache holds the complete history.
pub fn execute_history(set: Option<bool>) -> Result<()> {
    let mut context = CacheCommandInit::initialize()?;

    match set {
        Some(complete) => {
            context.cache.set_complete_history(complete)?;
            print_success(if complete {
                "Cache marked as holding the complete history"
            } else {
                "Cache marked as holding partial history"
            });
        }
        None => {
            let state = if context.cache.has_complete_history() {
                "complete"
            } else {
                "partial"
            };
            print_info(&format!("History: {state}"));
        }
    }
    Ok(())
}
