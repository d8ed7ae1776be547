//! Core type definitions for member queries
//!
//! Includes the Team and Member entities, the joined `MemberTeamRow`
//! projection, the `MemberSummary` projection and the age aggregates.

use serde::{Deserialize, Serialize};

use crate::predicate::{Field, Record, Value};

/// A team; owns zero or more members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Database identifier (`team_id`)
    pub id: i64,
    pub name: String,
}

/// A member; belongs to at most one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Database identifier (`member_id`)
    pub id: i64,
    pub username: String,
    pub age: i32,
    #[serde(rename = "teamId", skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
}

/// Request to create a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub age: i32,
    #[serde(rename = "teamId", default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
}

impl NewMember {
    /// Create a member without a team
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: None,
        }
    }

    /// Assign the member to a team
    pub fn in_team(mut self, team_id: i64) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

/// Flattened member/team projection produced by the left-join search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTeamRow {
    #[serde(rename = "memberId")]
    pub member_id: i64,
    pub username: String,
    pub age: i32,
    #[serde(rename = "teamId")]
    pub team_id: Option<i64>,
    #[serde(rename = "teamName")]
    pub team_name: Option<String>,
}

impl MemberTeamRow {
    pub fn new(
        member_id: i64,
        username: impl Into<String>,
        age: i32,
        team: Option<&Team>,
    ) -> Self {
        Self {
            member_id,
            username: username.into(),
            age,
            team_id: team.map(|t| t.id),
            team_name: team.map(|t| t.name.clone()),
        }
    }
}

impl Record for MemberTeamRow {
    fn field_value(&self, field: Field) -> Option<Value> {
        match field {
            Field::MemberId => Some(Value::Int(self.member_id)),
            Field::Username => Some(Value::Text(self.username.clone())),
            Field::Age => Some(Value::from(self.age)),
            Field::TeamId => self.team_id.map(Value::Int),
            Field::TeamName => self.team_name.clone().map(Value::Text),
        }
    }
}

impl Record for Member {
    // Team name is not loaded on the bare entity
    fn field_value(&self, field: Field) -> Option<Value> {
        match field {
            Field::MemberId => Some(Value::Int(self.id)),
            Field::Username => Some(Value::Text(self.username.clone())),
            Field::Age => Some(Value::from(self.age)),
            Field::TeamId => self.team_id.map(Value::Int),
            Field::TeamName => None,
        }
    }
}

/// Username/age projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub username: String,
    pub age: i32,
}

impl From<&Member> for MemberSummary {
    fn from(member: &Member) -> Self {
        Self {
            username: member.username.clone(),
            age: member.age,
        }
    }
}

/// Age aggregates over every member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeStats {
    pub count: i64,
    pub sum_age: i64,
    /// `None` when there are no members, as are max and min
    pub avg_age: Option<f64>,
    pub max_age: Option<i32>,
    pub min_age: Option<i32>,
}

/// Age aggregates for the members of one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAgeStats {
    pub team_name: String,
    pub count: i64,
    pub sum_age: i64,
    pub avg_age: f64,
    pub max_age: i32,
    pub min_age: i32,
}
