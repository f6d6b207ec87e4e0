//! Pagination, sorting and search parameters shared by the list endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Items per page when the caller does not choose
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// The API rejects larger pages
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    sort: Option<(String, SortOrder)>,
    search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort: None,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based; 0 is treated as the first page
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Blank terms are dropped so they do not filter everything out
    pub fn search(mut self, term: impl AsRef<str>) -> Self {
        let term = term.as_ref().trim();
        self.search = if term.is_empty() { None } else { Some(term.to_string()) };
        self
    }

    pub fn next_page(&self) -> Self {
        self.clone().page(self.page.saturating_add(1))
    }

    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.limit
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some((ref field, order)) = self.sort {
            pairs.push(("sortBy".to_string(), field.clone()));
            pairs.push(("order".to_string(), order.to_string()));
        }
        if let Some(ref term) = self.search {
            pairs.push(("search".to_string(), term.clone()));
        }
        pairs
    }
}

/// Paged list envelope returned by the list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "data", alias = "results")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn first_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardPeriod {
    Daily,
    Weekly,
    Monthly,
    #[default]
    All,
}

impl LeaderboardPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardPeriod::Daily => "daily",
            LeaderboardPeriod::Weekly => "weekly",
            LeaderboardPeriod::Monthly => "monthly",
            LeaderboardPeriod::All => "all",
        }
    }
}

impl std::str::FromStr for LeaderboardPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(LeaderboardPeriod::Daily),
            "weekly" | "week" => Ok(LeaderboardPeriod::Weekly),
            "monthly" | "month" => Ok(LeaderboardPeriod::Monthly),
            "all" | "all-time" => Ok(LeaderboardPeriod::All),
            other => Err(format!("unknown leaderboard period: {}", other)),
        }
    }
}

/// Global leaderboard, or one quiz's, over a time window
#[derive(Debug, Clone, Default)]
pub struct LeaderboardQuery {
    pub quiz_id: Option<String>,
    pub period: LeaderboardPeriod,
    pub list: ListQuery,
}

impl LeaderboardQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.list.to_pairs();
        if let Some(ref quiz_id) = self.quiz_id {
            pairs.push(("quizId".to_string(), quiz_id.clone()));
        }
        pairs.push(("period".to_string(), self.period.as_str().to_string()));
        pairs
    }
}
