use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;

use crate::domain::{Notification, Project, Task};
use crate::store::{Filter, Record};

pub const DASHBOARD_PAGE_SIZE: usize = 10;
pub const TASKS_PAGE_SIZE: usize = 5;
pub const NOTIFICATIONS_PAGE_SIZE: usize = 10;

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Items shown on the 1-based `page`. Pages past the end are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Rows that carry a deadline the due buckets can look at.
pub trait Dated {
    fn due(&self) -> Option<OffsetDateTime>;
}

impl Dated for Task {
    fn due(&self) -> Option<OffsetDateTime> {
        self.due_date
    }
}

impl Dated for Notification {
    fn due(&self) -> Option<OffsetDateTime> {
        self.end_date
    }
}

pub trait ListFilter<T> {
    fn matches(&self, item: &T, now: OffsetDateTime) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueBucket {
    #[default]
    All,
    Today,
    Overdue,
}

impl DueBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            DueBucket::All => "all",
            DueBucket::Today => "today",
            DueBucket::Overdue => "overdue",
        }
    }

    /// "Today" is the same UTC calendar day as `now`; "overdue" is strictly
    /// before `now`. Rows without a deadline only show under "all".
    pub fn contains(self, due: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
        match (self, due) {
            (DueBucket::All, _) => true,
            (_, None) => false,
            (DueBucket::Today, Some(due)) => due.date() == now.date(),
            (DueBucket::Overdue, Some(due)) => due < now,
        }
    }
}

impl fmt::Display for DueBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDueBucketError {
    input: String,
}

impl fmt::Display for ParseDueBucketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown due filter '{}'; expected all, today or overdue",
            self.input
        )
    }
}

impl std::error::Error for ParseDueBucketError {}

impl FromStr for DueBucket {
    type Err = ParseDueBucketError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(DueBucket::All),
            "today" => Ok(DueBucket::Today),
            "overdue" | "due" => Ok(DueBucket::Overdue),
            _ => Err(ParseDueBucketError {
                input: value.to_string(),
            }),
        }
    }
}

impl<T: Dated> ListFilter<T> for DueBucket {
    fn matches(&self, item: &T, now: OffsetDateTime) -> bool {
        self.contains(item.due(), now)
    }
}

/// Dashboard filters. Both narrow the list when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub unassigned: bool,
}

impl ProjectFilter {
    pub fn new(status: Option<&str>, unassigned: bool) -> Self {
        let status = status
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Self { status, unassigned }
    }
}

impl ListFilter<Project> for ProjectFilter {
    fn matches(&self, project: &Project, _now: OffsetDateTime) -> bool {
        if let Some(expected) = self.status.as_deref() {
            if project.status.as_deref().map(str::trim) != Some(expected) {
                return false;
            }
        }
        if !self.unassigned {
            return true;
        }
        let mut owner = Record::new();
        owner.insert("assigned_to".to_string(), project.owner().into());
        Filter::is_null("assigned_to").matches(&owner)
    }
}

/// What happens to the current page when the filter changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageReset {
    OnFilterChange,
    Never,
}

/// A fetched collection held in memory with client-side filter and paging.
#[derive(Debug, Clone)]
pub struct ListView<T, F> {
    items: Vec<T>,
    filter: F,
    page: usize,
    page_size: usize,
    reset: PageReset,
    now: OffsetDateTime,
}

impl<T, F> ListView<T, F>
where
    F: ListFilter<T> + PartialEq + Default,
{
    /// An empty, unfiltered list on page 1.
    pub fn new(page_size: usize, reset: PageReset, now: OffsetDateTime) -> Self {
        Self {
            items: Vec::new(),
            filter: F::default(),
            page: 1,
            page_size,
            reset,
            now,
        }
    }

    pub fn load(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn set_filter(&mut self, filter: F) {
        if self.filter != filter && self.reset == PageReset::OnFilterChange {
            self.page = 1;
        }
        self.filter = filter;
    }

    pub fn goto_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Everything fetched, before filtering.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn filtered(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| self.filter.matches(item, self.now))
            .collect()
    }

    pub fn visible(&self) -> Vec<&T> {
        let filtered = self.filtered();
        page_slice(&filtered, self.page, self.page_size).to_vec()
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered().len(), self.page_size)
    }
}

#[cfg(test)]
#[path = "listing_tests_ext.rs"]
mod tests_ext;
