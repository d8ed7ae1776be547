//! Member search conditions and the filter built from them
//!
//! A [`SearchCondition`] carries four independent, optional filters. Each one
//! maps to an `Option<Predicate>` through a small helper and [`build_filter`]
//! ANDs whatever is present. Nothing absent is ever handed to the combiner as
//! a placeholder.
//!
//! ```
//! use member_query::search::{build_filter, SearchCondition};
//! use member_query::predicate::{Field, Predicate};
//!
//! let condition = SearchCondition::new().with_team_name("teamB").with_age_goe(35);
//! assert_eq!(
//!     build_filter(&condition),
//!     Predicate::eq(Field::TeamName, "teamB").and(Predicate::gte(Field::Age, 35)),
//! );
//!
//! // No filters: matches everything
//! assert!(build_filter(&SearchCondition::new()).is_always());
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::predicate::{Field, Predicate, combine};

/// Optional search filters for members
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCondition {
    /// Exact username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Exact team name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Minimum age, inclusive
    #[serde(
        default,
        deserialize_with = "optional_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age_goe: Option<i32>,
    /// Maximum age, inclusive
    #[serde(
        default,
        deserialize_with = "optional_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age_loe: Option<i32>,
}

impl SearchCondition {
    /// Create a condition with every filter absent
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a condition from a URL query string
    ///
    /// Keys are `username`, `teamName`, `ageGoe` and `ageLoe`; unknown keys are
    /// ignored and empty ages count as absent. A non-numeric age is rejected.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Ok(serde_urlencoded::from_str(query)?)
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    pub fn with_age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    pub fn with_age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }

    /// True when no filter is effectively present (blank text counts as absent)
    pub fn is_unfiltered(&self) -> bool {
        build_filter(self).is_always()
    }
}

fn optional_age<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    let raw = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(raw) => raw,
    };

    let number = match raw {
        Raw::Int(n) => n,
        Raw::Text(s) if s.trim().is_empty() => return Ok(None),
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("invalid age '{}'", s)))?,
    };

    i32::try_from(number)
        .map(Some)
        .map_err(|_| de::Error::custom(format!("age {} is out of range", number)))
}

fn has_text(value: &str) -> bool {
    value.chars().any(|c| !c.is_whitespace())
}

/// `username = value`, or nothing when the username is absent or blank
pub fn username_eq(username: Option<&str>) -> Option<Predicate> {
    username
        .filter(|s| has_text(s))
        .map(|s| Predicate::eq(Field::Username, s))
}

/// `team.name = value`, or nothing when the team name is absent or blank
pub fn team_name_eq(team_name: Option<&str>) -> Option<Predicate> {
    team_name
        .filter(|s| has_text(s))
        .map(|s| Predicate::eq(Field::TeamName, s))
}

/// `age >= value`
pub fn age_goe(age: Option<i32>) -> Option<Predicate> {
    age.map(|a| Predicate::gte(Field::Age, a))
}

/// `age <= value`
pub fn age_loe(age: Option<i32>) -> Option<Predicate> {
    age.map(|a| Predicate::lte(Field::Age, a))
}

/// Age range from optional bounds; either side may be missing
pub fn age_between(age_goe_bound: Option<i32>, age_loe_bound: Option<i32>) -> Option<Predicate> {
    match (age_goe(age_goe_bound), age_loe(age_loe_bound)) {
        (None, None) => None,
        (lower, upper) => Some(combine([lower, upper])),
    }
}

/// Build the WHERE predicate for a search condition
///
/// Terms appear in a fixed order: username, team name, minimum age, maximum
/// age. Returns [`Predicate::Always`] when every filter is absent; callers
/// that cannot afford an unbounded scan must check for that.
pub fn build_filter(condition: &SearchCondition) -> Predicate {
    let filter = combine([
        username_eq(condition.username.as_deref()),
        team_name_eq(condition.team_name.as_deref()),
        age_goe(condition.age_goe),
        age_loe(condition.age_loe),
    ]);
    tracing::trace!(%filter, "built member search filter");
    filter
}
