//! Pagination and sorting for member searches

use serde::{Deserialize, Serialize};

use crate::error::{MemberQueryError, Result};
use crate::predicate::Field;

fn default_offset() -> i64 {
    0
}

fn default_limit() -> i64 {
    20
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Where NULLs go in an ORDER BY term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullOrdering {
    First,
    Last,
}

impl NullOrdering {
    pub fn sql(self) -> &'static str {
        match self {
            NullOrdering::First => "NULLS FIRST",
            NullOrdering::Last => "NULLS LAST",
        }
    }
}

/// One ORDER BY term
///
/// Without an explicit null ordering PostgreSQL puts NULLs last when
/// ascending and first when descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: Field,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullOrdering>,
}

impl SortOrder {
    pub fn asc(field: Field) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
            nulls: None,
        }
    }

    pub fn desc(field: Field) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullOrdering::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullOrdering::Last);
        self
    }

    /// Parse a sort key such as `age`, `username,desc` or `teamName,asc,nullslast`
    pub fn parse(key: &str) -> Result<Self> {
        let mut parts = key.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default();
        let field = Field::parse(name)
            .ok_or_else(|| MemberQueryError::invalid_search(format!("unknown sort field '{}'", name)))?;
        let mut order = Self::asc(field);

        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "asc" => order.direction = SortDirection::Asc,
                "desc" => order.direction = SortDirection::Desc,
                "nullsfirst" => order.nulls = Some(NullOrdering::First),
                "nullslast" => order.nulls = Some(NullOrdering::Last),
                other => {
                    return Err(MemberQueryError::invalid_search(format!(
                        "invalid sort option '{}' in '{}'",
                        other, key
                    )));
                }
            }
        }

        Ok(order)
    }
}

/// Which slice of the result set to return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of rows to skip
    #[serde(default = "default_offset")]
    pub offset: i64,
    /// Maximum number of rows to return
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// ORDER BY terms; empty means member id ascending
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: default_offset(),
            limit: default_limit(),
            sort: Vec::new(),
        }
    }
}

impl PageRequest {
    /// Zero-based page number and page size
    pub fn of(page: i64, size: i64) -> Self {
        Self {
            offset: page.saturating_mul(size),
            limit: size,
            sort: Vec::new(),
        }
    }

    /// Raw offset/limit
    pub fn with_pagination(mut self, offset: i64, limit: i64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Append a sort term
    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.offset < 0 {
            return Err(format!("Offset must not be negative, got {}", self.offset));
        }
        if self.limit <= 0 {
            return Err(format!("Limit must be positive, got {}", self.limit));
        }
        Ok(())
    }
}

/// One page of results plus the total number of matching rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Self {
            content,
            total,
            offset: request.offset,
            limit: request.limit,
        }
    }

    /// Zero-based page number
    pub fn number(&self) -> i64 {
        if self.limit <= 0 {
            0
        } else {
            self.offset / self.limit
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            0
        } else {
            self.total / self.limit + i64::from(self.total % self.limit != 0)
        }
    }

    pub fn has_next(&self) -> bool {
        let seen = i64::try_from(self.content.len()).unwrap_or(i64::MAX);
        self.offset.saturating_add(seen) < self.total
    }
}
