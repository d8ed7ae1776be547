//! Predicate model for member/team queries
//!
//! A [`Predicate`] is a boolean expression over the fields of a joined
//! member/team record. Optional filters are represented as
//! `Option<Predicate>` and are dropped by [`combine`] and [`any_of`] before
//! anything is combined, so an absent filter never reaches the WHERE clause.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The entity a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Entity {
    Member,
    Team,
}

/// Fields that can be filtered and sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    MemberId,
    Username,
    Age,
    TeamId,
    TeamName,
}

impl Field {
    /// Entity (table) that owns this field
    pub fn entity(self) -> Entity {
        match self {
            Field::MemberId | Field::Username | Field::Age => Entity::Member,
            Field::TeamId | Field::TeamName => Entity::Team,
        }
    }

    /// Column name in the owning table
    pub fn column(self) -> &'static str {
        match self {
            Field::MemberId => "member_id",
            Field::Username => "username",
            Field::Age => "age",
            Field::TeamId => "team_id",
            Field::TeamName => "name",
        }
    }

    /// Public (camelCase) name, as used in query strings and JSON
    pub fn name(self) -> &'static str {
        match self {
            Field::MemberId => "memberId",
            Field::Username => "username",
            Field::Age => "age",
            Field::TeamId => "teamId",
            Field::TeamName => "teamName",
        }
    }

    /// Parse a field from its camelCase or snake_case name
    pub fn parse(name: &str) -> Option<Field> {
        match name {
            "memberId" | "member_id" | "id" => Some(Field::MemberId),
            "username" => Some(Field::Username),
            "age" => Some(Field::Age),
            "teamId" | "team_id" => Some(Field::TeamId),
            "teamName" | "team_name" => Some(Field::TeamName),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal compared against a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    /// Compare two values of the same kind; mixed kinds are incomparable
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// SQL spelling of the operator
    pub fn sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A record whose fields a predicate can be evaluated against
///
/// `None` means the field is NULL for this record (e.g. the team name of a
/// member without a team).
pub trait Record {
    fn field_value(&self, field: Field) -> Option<Value>;
}

/// Boolean expression over record fields
///
/// An empty `And` group is TRUE and an empty `Or` group is FALSE. Use [`combine`] and
/// [`any_of`] to build these from optional parts; they never produce an empty
/// group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Predicate {
    /// No constraint; matches every record
    Always,
    Compare {
        field: Field,
        op: CompareOp,
        value: Value,
    },
    And {
        terms: Vec<Predicate>,
    },
    Or {
        terms: Vec<Predicate>,
    },
    Not {
        term: Box<Predicate>,
    },
}

impl Predicate {
    pub fn compare(field: Field, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field,
            op,
            value: value.into(),
        }
    }

    /// field = value
    pub fn eq(field: Field, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// field != value
    pub fn ne(field: Field, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// field > value
    pub fn gt(field: Field, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// field >= value
    pub fn gte(field: Field, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// field < value
    pub fn lt(field: Field, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// field <= value
    pub fn lte(field: Field, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    pub fn and(self, other: Predicate) -> Self {
        combine([Some(self), Some(other)])
    }

    pub fn or(self, other: Predicate) -> Self {
        any_of([Some(self), Some(other)])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not {
            term: Box::new(self),
        }
    }

    /// Whether `record` satisfies the predicate
    ///
    /// Uses SQL three-valued logic: a comparison against a NULL field is
    /// unknown, and unknown does not match.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.truth(record) == Some(true)
    }

    fn truth<R: Record + ?Sized>(&self, record: &R) -> Option<bool> {
        match self {
            Predicate::Always => Some(true),
            Predicate::Compare { field, op, value } => {
                let actual = record.field_value(*field)?;
                actual.compare(value).map(|ordering| op.holds(ordering))
            }
            Predicate::And { terms } => {
                let mut result = Some(true);
                for term in terms {
                    match term.truth(record) {
                        Some(false) => return Some(false),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                result
            }
            Predicate::Or { terms } => {
                let mut result = Some(false);
                for term in terms {
                    match term.truth(record) {
                        Some(true) => return Some(true),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                result
            }
            Predicate::Not { term } => term.truth(record).map(|b| !b),
        }
    }

    /// Fields this predicate restricts, in order of first appearance
    pub fn fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<Field>) {
        match self {
            Predicate::Always => {}
            Predicate::Compare { field, .. } => {
                if !out.contains(field) {
                    out.push(*field);
                }
            }
            Predicate::And { terms } | Predicate::Or { terms } => {
                for term in terms {
                    term.collect_fields(out);
                }
            }
            Predicate::Not { term } => term.collect_fields(out),
        }
    }

    /// Whether any term touches the team table
    pub fn references_team(&self) -> bool {
        self.fields()
            .iter()
            .any(|field| field.entity() == Entity::Team)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group(
            f: &mut fmt::Formatter<'_>,
            terms: &[Predicate],
            joiner: &str,
            empty: &str,
        ) -> fmt::Result {
            if terms.is_empty() {
                return f.write_str(empty);
            }
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    f.write_str(joiner)?;
                }
                match term {
                    Predicate::And { .. } | Predicate::Or { .. } => write!(f, "({})", term)?,
                    _ => write!(f, "{}", term)?,
                }
            }
            Ok(())
        }

        match self {
            Predicate::Always => f.write_str("TRUE"),
            Predicate::Compare { field, op, value } => {
                write!(f, "{} {} {}", field, op.sql(), value)
            }
            Predicate::And { terms } => group(f, terms, " AND ", "TRUE"),
            Predicate::Or { terms } => group(f, terms, " OR ", "FALSE"),
            Predicate::Not { term } => write!(f, "NOT ({})", term),
        }
    }
}

/// AND together the present filters
///
/// `None` and [`Predicate::Always`] entries are skipped, nested AND groups are
/// flattened. No present filter yields `Always`; a single one is returned as
/// is.
pub fn combine<I>(filters: I) -> Predicate
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    let mut terms = Vec::new();
    for predicate in filters.into_iter().flatten() {
        match predicate {
            Predicate::Always => {}
            Predicate::And { terms: inner } => terms.extend(inner),
            other => terms.push(other),
        }
    }

    if terms.len() > 1 {
        return Predicate::And { terms };
    }
    terms.pop().unwrap_or(Predicate::Always)
}

/// OR together the present filters
///
/// `None` entries are skipped, nested OR groups are flattened. An `Always`
/// entry makes the whole group `Always`, and so does an empty group: an
/// absent alternative imposes no constraint.
pub fn any_of<I>(filters: I) -> Predicate
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    let mut terms = Vec::new();
    for predicate in filters.into_iter().flatten() {
        match predicate {
            Predicate::Always => return Predicate::Always,
            Predicate::Or { terms: inner } => terms.extend(inner),
            other => terms.push(other),
        }
    }

    if terms.len() > 1 {
        return Predicate::Or { terms };
    }
    terms.pop().unwrap_or(Predicate::Always)
}
