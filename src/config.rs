//! Configuration for MemberStore
//!
//! Provides a builder pattern for configuring the member store.

/// What the store does with a search whose filter is empty
///
/// An empty [`SearchCondition`](crate::search::SearchCondition) selects every
/// member, which on a large table is a full scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnfilteredSearch {
    /// Return every row
    #[default]
    Allow,
    /// Return at most this many rows (must be positive)
    Cap(i64),
    /// Fail with `MemberQueryError::UnfilteredSearch`
    Reject,
}

/// Configuration for the member store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Name of the members table (default: "members")
    pub members_table: String,
    /// Name of the teams table (default: "teams")
    pub teams_table: String,
    /// Policy for searches without any filter
    pub unfiltered_search: UnfilteredSearch,
    /// Maximum pool connections
    pub max_connections: u32,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    members_table: String,
    teams_table: String,
    unfiltered_search: UnfilteredSearch,
    max_connections: u32,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            members_table: "members".to_string(),
            teams_table: "teams".to_string(),
            unfiltered_search: UnfilteredSearch::Allow,
            max_connections: 5,
        }
    }

    /// Set the members table name (default: "members")
    pub fn members_table(mut self, name: impl Into<String>) -> Self {
        self.members_table = name.into();
        self
    }

    /// Set the teams table name (default: "teams")
    pub fn teams_table(mut self, name: impl Into<String>) -> Self {
        self.teams_table = name.into();
        self
    }

    /// Prefix both table names, e.g. `test_ab12` gives `test_ab12_members`
    pub fn table_prefix(mut self, prefix: &str) -> Self {
        self.members_table = format!("{}_members", prefix);
        self.teams_table = format!("{}_teams", prefix);
        self
    }

    /// Set the policy for searches without any filter (default: Allow)
    pub fn unfiltered_search(mut self, policy: UnfilteredSearch) -> Self {
        self.unfiltered_search = policy;
        self
    }

    /// Reject searches without any filter
    pub fn reject_unfiltered(self) -> Self {
        self.unfiltered_search(UnfilteredSearch::Reject)
    }

    /// Cap searches without any filter at `limit` rows
    ///
    /// `limit` must be positive; the store rejects the config otherwise.
    pub fn cap_unfiltered(self, limit: i64) -> Self {
        self.unfiltered_search(UnfilteredSearch::Cap(limit))
    }

    /// Set the maximum number of pooled connections (default: 5)
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            members_table: self.members_table,
            teams_table: self.teams_table,
            unfiltered_search: self.unfiltered_search,
            max_connections: self.max_connections,
        }
    }
}
