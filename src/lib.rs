//! # member-query
//!
//! Dynamic, type-checked search over Members belonging to Teams, stored in
//! PostgreSQL.
//!
//! The core of the crate is the predicate composer: a [`SearchCondition`] with
//! four optional filters becomes a single [`Predicate`] via [`build_filter`].
//! Absent filters (and blank text) contribute nothing; when every filter is
//! absent the result is [`Predicate::Always`], which selects every member.
//!
//! ## Features
//!
//! - **Optional filters**: each filter is an `Option<Predicate>`, and the
//!   combiners [`combine`] and [`any_of`] skip the absent ones
//! - **In-memory evaluation**: predicates evaluate against any [`Record`]
//!   with SQL NULL semantics
//! - **SQL rendering**: parameterized WHERE and ORDER BY clauses over the
//!   members/teams join
//! - **Store**: CRUD for members and teams, joined search, paged search,
//!   projections
//! - **Unfiltered search policy**: allow, cap or reject searches with no filters
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use member_query::{MemberStore, PageRequest, SearchCondition, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::builder("postgres://localhost/mydb")
//!         .cap_unfiltered(100)
//!         .build();
//!     let store = MemberStore::new(config).await?;
//!
//!     store.seed_sample_members(100).await?;
//!
//!     let condition = SearchCondition::from_query("teamName=teamB&ageGoe=31&ageLoe=35")?;
//!     let rows = store.search(&condition).await?;
//!     assert_eq!(rows.len(), 3);
//!
//!     let page = store.search_page(&condition, PageRequest::of(0, 10)).await?;
//!     println!("{} of {}", page.content.len(), page.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Evaluating without a database
//!
//! ```rust
//! use member_query::{build_filter, MemberTeamRow, SearchCondition, Team};
//!
//! let team_b = Team { id: 2, name: "teamB".to_string() };
//! let rows = vec![
//!     MemberTeamRow::new(3, "member3", 30, Some(&team_b)),
//!     MemberTeamRow::new(4, "member4", 40, Some(&team_b)),
//! ];
//!
//! let filter = build_filter(&SearchCondition::new().with_age_goe(35));
//! let matched: Vec<_> = rows.iter().filter(|row| filter.evaluate(*row)).collect();
//! assert_eq!(matched.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod page;
pub mod predicate;
pub mod search;
pub mod sql;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config::{StoreConfig, StoreConfigBuilder, UnfilteredSearch};
pub use error::{MemberQueryError, Result};
pub use page::{NullOrdering, Page, PageRequest, SortDirection, SortOrder};
pub use predicate::{CompareOp, Entity, Field, Predicate, Record, Value, any_of, combine};
pub use search::{SearchCondition, age_between, build_filter};
pub use store::MemberStore;
pub use types::{AgeStats, Member, MemberSummary, MemberTeamRow, NewMember, Team, TeamAgeStats};
