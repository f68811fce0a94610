//! Filters applied when reading change lists back out of the cache.
//!
//! [`ChangeListFilter::any_filter_specified`] tells the read path whether it may take
//! the index-only shortcut; [`ChangeBrowserSettings`] is the stock filter with
//! author, comment, date and number constraints.

use crate::core::change_list::CommittedChangeList;
use chrono::{DateTime, Utc};

pub trait ChangeListFilter<L: ?Sized> {
    fn accepts(&self, list: &L) -> bool;

    fn any_filter_specified(&self) -> bool;
}

/// Criteria for browsing cached history. All criteria that are set must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBrowserSettings {
    pub author: Option<String>,
    pub comment_contains: Option<String>,
    pub date_after: Option<DateTime<Utc>>,
    pub date_before: Option<DateTime<Utc>>,
    pub change_after: Option<i64>,
    pub change_before: Option<i64>,
}

impl ChangeBrowserSettings {
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_comment(mut self, needle: impl Into<String>) -> Self {
        self.comment_contains = Some(needle.into());
        self
    }

    pub fn with_dates(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_after = after;
        self.date_before = before;
        self
    }

    pub fn with_numbers(mut self, after: Option<i64>, before: Option<i64>) -> Self {
        self.change_after = after;
        self.change_before = before;
        self
    }
}

impl<L: CommittedChangeList + ?Sized> ChangeListFilter<L> for ChangeBrowserSettings {
    fn accepts(&self, list: &L) -> bool {
        if let Some(author) = &self.author {
            if !list.author().eq_ignore_ascii_case(author) {
                return false;
            }
        }
        if let Some(needle) = &self.comment_contains {
            if !list
                .comment()
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }

        // Bounds are inclusive.
        let date = list.commit_date();
        if self.date_after.is_some_and(|after| date < after) {
            return false;
        }
        if self.date_before.is_some_and(|before| date > before) {
            return false;
        }
        let number = list.number();
        if self.change_after.is_some_and(|after| number < after) {
            return false;
        }
        if self.change_before.is_some_and(|before| number > before) {
            return false;
        }
        true
    }

    fn any_filter_specified(&self) -> bool {
        self.author.is_some()
            || self.comment_contains.is_some()
            || self.date_after.is_some()
            || self.date_before.is_some()
            || self.change_after.is_some()
            || self.change_before.is_some()
    }
}
