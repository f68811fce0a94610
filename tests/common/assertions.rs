//! Common assertion helpers for command output validation

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for git repository error messages
pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

/// Creates a predicate that checks for a listed change list number
pub fn has_change_list(number: i64) -> impl Predicate<str> {
    predicates::str::contains(format!("[{}]", number))
}

/// Creates a predicate that checks for the empty cache message
pub fn cache_is_empty() -> impl Predicate<str> {
    predicates::str::contains("Cache is empty").or(predicates::str::contains("No cached change lists"))
}

/// Creates a predicate that checks a change list number is listed exactly once
pub fn lists_change_list_once(number: i64) -> impl Predicate<str> {
    let tag = format!("[{}]", number);
    predicates::function::function(move |output: &str| output.matches(tag.as_str()).count() == 1)
}
