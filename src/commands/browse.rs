use crate::core::{
    command_init::CacheCommandInit,
    error::{CacheError, Result},
    filter::ChangeBrowserSettings,
    output::{print_change_lists, print_info, print_warning},
};
use chrono::{DateTime, Utc};
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct BrowseArgs {
    /// Number of change lists to show (0 = all)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
    /// Only change lists by this author
    #[arg(long)]
    pub author: Option<String>,
    /// Only change lists whose comment contains this text
    #[arg(long)]
    pub grep: Option<String>,
    /// Only change lists committed at or after this RFC 3339 date
    #[arg(long)]
    pub since: Option<String>,
    /// Only change lists committed at or before this RFC 3339 date
    #[arg(long)]
    pub until: Option<String>,
}

impl BrowseArgs {
    pub fn to_settings(&self) -> Result<ChangeBrowserSettings> {
        let mut settings = ChangeBrowserSettings::default()
            .with_dates(parse_date(&self.since)?, parse_date(&self.until)?);
        if let Some(author) = &self.author {
            settings = settings.with_author(author);
        }
        if let Some(needle) = &self.grep {
            settings = settings.with_comment(needle);
        }
        Ok(settings)
    }
}

fn parse_date(input: &Option<String>) -> Result<Option<DateTime<Utc>>> {
    input
        .as_deref()
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|date| date.with_timezone(&Utc))
                .map_err(|_| CacheError::invalid_date(s))
        })
        .transpose()
}

/// Show cached change lists. Read failures degrade to an empty listing.
pub fn execute_browse(args: BrowseArgs) -> Result<()> {
    let context = CacheCommandInit::initialize()?;
    let settings = args.to_settings()?;
    let count = args.count.unwrap_or(context.config.default_count);

    let lists = match context.cache.read_change_lists(&settings, count) {
        Ok(lists) => lists,
        Err(e) => {
            log::warn!("Failed to read cached change lists: {e}");
            print_warning(&format!("Could not read the cache: {e}"));
            Vec::new()
        }
    };

    if lists.is_empty() {
        print_info("No cached change lists");
    } else {
        print_change_lists("Change lists", &lists);
    }
    Ok(())
}
