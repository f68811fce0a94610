use crate::core::{
    command_init::CacheCommandInit,
    error::Result,
    output::{print_change_lists, print_info},
};

/// List cached change lists not yet confirmed against the work tree.
pub fn execute_incoming() -> Result<()> {
    let context = CacheCommandInit::initialize()?;
    let incoming = context.cache.load_incoming_change_lists()?;

    if incoming.is_empty() {
        print_info("No incoming change lists");
    } else {
        print_change_lists("Incoming", &incoming);
    }
    Ok(())
}
