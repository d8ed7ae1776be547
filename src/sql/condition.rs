//! Condition building for SQL WHERE clauses
//!
//! Renders a [`Predicate`] against the member/team join. Members are aliased
//! `m`, teams `t`; every literal becomes a `$n` placeholder.

use crate::page::SortOrder;
use crate::predicate::{Entity, Field, Predicate, Value};
use crate::sql::sanitize::quote_identifier;

/// Alias of the members table in generated queries
pub const MEMBER_ALIAS: &str = "m";
/// Alias of the teams table in generated queries
pub const TEAM_ALIAS: &str = "t";

/// Qualified, quoted column reference for a field
pub fn column_ref(field: Field) -> String {
    let alias = match field.entity() {
        Entity::Member => MEMBER_ALIAS,
        Entity::Team => TEAM_ALIAS,
    };
    format!("{}.{}", alias, quote_identifier(field.column()))
}

/// Build a SQL WHERE clause from a Predicate
///
/// Returns `(clause, params)` where `clause` uses placeholders starting at
/// `param_offset` and `params` holds the values to bind, in order.
/// `param_offset` is left at the next free placeholder number.
pub fn build_condition_clause(predicate: &Predicate, param_offset: &mut i32) -> (String, Vec<Value>) {
    let mut params = Vec::new();
    let clause = render(predicate, param_offset, &mut params);
    (clause, params)
}

fn render(predicate: &Predicate, param_offset: &mut i32, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::Always => "TRUE".to_string(),
        Predicate::Compare { field, op, value } => {
            params.push(value.clone());
            let clause = format!("{} {} ${}", column_ref(*field), op.sql(), param_offset);
            *param_offset += 1;
            clause
        }
        Predicate::And { terms } => render_group(terms, " AND ", "TRUE", param_offset, params),
        Predicate::Or { terms } => render_group(terms, " OR ", "FALSE", param_offset, params),
        Predicate::Not { term } => format!("NOT ({})", render(term, param_offset, params)),
    }
}

fn render_group(
    terms: &[Predicate],
    joiner: &str,
    empty: &str,
    param_offset: &mut i32,
    params: &mut Vec<Value>,
) -> String {
    if terms.is_empty() {
        return empty.to_string();
    }
    terms
        .iter()
        .map(|term| format!("({})", render(term, param_offset, params)))
        .collect::<Vec<_>>()
        .join(joiner)
}

/// Build ORDER BY terms (without the "ORDER BY" prefix)
///
/// Defaults to member id ascending. When sort terms are given, member id is
/// appended as a tie-breaker so paging is deterministic.
pub fn build_order_by_clause(sort: &[SortOrder]) -> String {
    let mut parts: Vec<String> = sort
        .iter()
        .map(|order| {
            let mut term = format!("{} {}", column_ref(order.field), order.direction.sql());
            if let Some(nulls) = order.nulls {
                term.push(' ');
                term.push_str(nulls.sql());
            }
            term
        })
        .collect();

    if !sort.iter().any(|order| order.field == Field::MemberId) {
        parts.push(format!("{} ASC", column_ref(Field::MemberId)));
    }

    parts.join(", ")
}
