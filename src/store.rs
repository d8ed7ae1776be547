//! MemberStore - PostgreSQL storage and search for members and teams
//!
//! Members live in one table and reference teams in another. Every search
//! runs members LEFT JOIN teams with a WHERE clause rendered from
//! [`build_filter`], so the same predicate serves the joined projection, the
//! paged projection and the plain entity list.

use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::{Arguments, Row};
use tracing::{debug, info, instrument, warn};

use crate::config::{StoreConfig, UnfilteredSearch};
use crate::error::{MemberQueryError, Result};
use crate::page::{Page, PageRequest};
use crate::predicate::{Predicate, Value};
use crate::search::{SearchCondition, build_filter};
use crate::sql::condition::{MEMBER_ALIAS, TEAM_ALIAS, build_condition_clause, build_order_by_clause};
use crate::sql::ddl::DdlGenerator;
use crate::sql::sanitize::{quote_identifier, validate_identifier};
use crate::types::{AgeStats, Member, MemberSummary, MemberTeamRow, NewMember, Team, TeamAgeStats};

const MEMBER_TEAM_COLUMNS: &str =
    "m.member_id, m.username, m.age, t.team_id AS team_id, t.name AS team_name";
const MEMBER_COLUMNS: &str = "m.member_id, m.username, m.age, m.team_id";

/// Member/team store backed by PostgreSQL
pub struct MemberStore {
    /// Database connection pool
    pool: PgPool,
    /// Store configuration
    config: StoreConfig,
}

impl MemberStore {
    /// Connect, validate table names and create the tables if missing
    pub async fn new(config: StoreConfig) -> Result<Self> {
        validate_config(&config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                MemberQueryError::Connection(format!("Database connection failed: {}", e))
            })?;

        let store = Self { pool, config };
        store.ensure_tables().await?;

        Ok(store)
    }

    /// Create a store on an existing pool
    pub async fn from_pool(pool: PgPool, config: StoreConfig) -> Result<Self> {
        validate_config(&config)?;

        let store = Self { pool, config };
        store.ensure_tables().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn ensure_tables(&self) -> Result<()> {
        for statement in DdlGenerator::new(&self.config).generate_schema() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        debug!(
            members = %self.config.members_table,
            teams = %self.config.teams_table,
            "member tables ready"
        );
        Ok(())
    }

    /// Drop both tables
    pub async fn drop_tables(&self) -> Result<()> {
        for statement in DdlGenerator::new(&self.config).generate_drop_tables() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Team Operations
    // =========================================================================

    /// Create a team
    pub async fn save_team(&self, name: &str) -> Result<Team> {
        if name.trim().is_empty() {
            return Err(MemberQueryError::validation("Team name cannot be blank"));
        }

        let sql = format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING team_id",
            self.teams()
        );
        let id: i64 = sqlx::query_scalar(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(Team {
            id,
            name: name.to_string(),
        })
    }

    /// Get team by ID
    pub async fn find_team(&self, id: i64) -> Result<Option<Team>> {
        let sql = format!(
            "SELECT team_id, name FROM {} WHERE team_id = $1",
            self.teams()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_team).transpose()
    }

    /// List all teams by ID
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        let sql = format!("SELECT team_id, name FROM {} ORDER BY team_id", self.teams());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_team).collect()
    }

    // =========================================================================
    // Member Operations
    // =========================================================================

    /// Create a member, optionally in a team
    pub async fn save_member(&self, member: NewMember) -> Result<Member> {
        if member.username.trim().is_empty() {
            return Err(MemberQueryError::validation("Username cannot be blank"));
        }
        if member.age < 0 {
            return Err(MemberQueryError::validation(format!(
                "Age must not be negative, got {}",
                member.age
            )));
        }
        if let Some(team_id) = member.team_id {
            self.require_team(team_id).await?;
        }

        let sql = format!(
            "INSERT INTO {} (username, age, team_id) VALUES ($1, $2, $3) RETURNING member_id",
            self.members()
        );
        let id: i64 = sqlx::query_scalar(&sql)
            .bind(&member.username)
            .bind(member.age)
            .bind(member.team_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Member {
            id,
            username: member.username,
            age: member.age,
            team_id: member.team_id,
        })
    }

    /// Get member by ID
    pub async fn find_member(&self, id: i64) -> Result<Option<Member>> {
        let sql = format!(
            "SELECT member_id, username, age, team_id FROM {} WHERE member_id = $1",
            self.members()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_member).transpose()
    }

    /// List all members by ID
    pub async fn find_all_members(&self) -> Result<Vec<Member>> {
        let sql = format!(
            "SELECT member_id, username, age, team_id FROM {} ORDER BY member_id",
            self.members()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_member).collect()
    }

    /// List members with exactly this username
    pub async fn find_members_by_username(&self, username: &str) -> Result<Vec<Member>> {
        let sql = format!(
            "SELECT member_id, username, age, team_id FROM {} WHERE username = $1 ORDER BY member_id",
            self.members()
        );
        let rows = sqlx::query(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_member).collect()
    }

    /// Move a member to another team, or out of any team with `None`
    pub async fn change_team(&self, member_id: i64, team_id: Option<i64>) -> Result<()> {
        if let Some(team_id) = team_id {
            self.require_team(team_id).await?;
        }

        let sql = format!(
            "UPDATE {} SET team_id = $2 WHERE member_id = $1",
            self.members()
        );
        let result = sqlx::query(&sql)
            .bind(member_id)
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MemberQueryError::member_not_found(member_id.to_string()));
        }

        Ok(())
    }

    /// Delete a member
    pub async fn delete_member(&self, member_id: i64) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE member_id = $1", self.members());
        let result = sqlx::query(&sql)
            .bind(member_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MemberQueryError::member_not_found(member_id.to_string()));
        }

        Ok(())
    }

    /// Username/age of every member, by ID
    pub async fn member_summaries(&self) -> Result<Vec<MemberSummary>> {
        let sql = format!(
            "SELECT username, age FROM {} ORDER BY member_id",
            self.members()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<MemberSummary> {
                Ok(MemberSummary {
                    username: row.try_get("username")?,
                    age: row.try_get("age")?,
                })
            })
            .collect()
    }

    /// Count, sum, average, max and min of age over every member
    pub async fn member_age_stats(&self) -> Result<AgeStats> {
        let sql = format!(
            "SELECT COUNT(*) AS count, COALESCE(SUM(m.age), 0)::BIGINT AS sum_age, \
             AVG(m.age)::FLOAT8 AS avg_age, MAX(m.age) AS max_age, MIN(m.age) AS min_age \
             FROM {} {}",
            self.members(),
            MEMBER_ALIAS
        );
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;

        Ok(AgeStats {
            count: row.try_get("count")?,
            sum_age: row.try_get("sum_age")?,
            avg_age: row.try_get("avg_age")?,
            max_age: row.try_get("max_age")?,
            min_age: row.try_get("min_age")?,
        })
    }

    /// Age aggregates per team name, for members that have a team
    pub async fn team_age_stats(&self) -> Result<Vec<TeamAgeStats>> {
        let sql = format!(
            "SELECT {t}.name AS team_name, COUNT(*) AS count, SUM({m}.age)::BIGINT AS sum_age, \
             AVG({m}.age)::FLOAT8 AS avg_age, MAX({m}.age) AS max_age, MIN({m}.age) AS min_age \
             FROM {from} WHERE {t}.team_id IS NOT NULL GROUP BY {t}.name ORDER BY {t}.name",
            from = self.joined_tables(),
            m = MEMBER_ALIAS,
            t = TEAM_ALIAS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<TeamAgeStats> {
                Ok(TeamAgeStats {
                    team_name: row.try_get("team_name")?,
                    count: row.try_get("count")?,
                    sum_age: row.try_get("sum_age")?,
                    avg_age: row.try_get("avg_age")?,
                    max_age: row.try_get("max_age")?,
                    min_age: row.try_get("min_age")?,
                })
            })
            .collect()
    }

    // =========================================================================
    // Search Operations
    // =========================================================================

    /// Members joined with their team, filtered by `condition`, by member ID
    #[instrument(skip(self))]
    pub async fn search(&self, condition: &SearchCondition) -> Result<Vec<MemberTeamRow>> {
        let filter = build_filter(condition);
        let cap = self.unfiltered_cap(&filter)?;

        let mut param_offset = 1;
        let (where_clause, params) = build_condition_clause(&filter, &mut param_offset);

        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            MEMBER_TEAM_COLUMNS,
            self.joined_tables(),
            where_clause,
            build_order_by_clause(&[])
        );

        let mut args = bind_params(&params)?;
        if let Some(limit) = cap {
            sql.push_str(&format!(" LIMIT ${}", param_offset));
            add_arg(&mut args, limit)?;
        }

        debug!(%sql, params = params.len(), "searching members");
        let rows = sqlx::query_with(&sql, args).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_member_team).collect()
    }

    /// One page of [`search`](Self::search) results plus the total match count
    #[instrument(skip(self))]
    pub async fn search_page(
        &self,
        condition: &SearchCondition,
        page: PageRequest,
    ) -> Result<Page<MemberTeamRow>> {
        page.validate().map_err(MemberQueryError::validation)?;

        let filter = build_filter(condition);
        let mut page = page;
        if let Some(cap) = self.unfiltered_cap(&filter)? {
            page.limit = page.limit.min(cap);
        }

        let mut param_offset = 1;
        let (where_clause, params) = build_condition_clause(&filter, &mut param_offset);
        let from = self.joined_tables();

        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {}", from, where_clause);
        let select_sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            MEMBER_TEAM_COLUMNS,
            from,
            where_clause,
            build_order_by_clause(&page.sort),
            param_offset,
            param_offset + 1
        );

        debug!(sql = %select_sql, offset = page.offset, limit = page.limit, "searching member page");

        let total: i64 = sqlx::query_scalar_with(&count_sql, bind_params(&params)?)
            .fetch_one(&self.pool)
            .await?;

        let mut args = bind_params(&params)?;
        add_arg(&mut args, page.limit)?;
        add_arg(&mut args, page.offset)?;
        let rows = sqlx::query_with(&select_sql, args)
            .fetch_all(&self.pool)
            .await?;

        let content = rows
            .iter()
            .map(row_to_member_team)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(content, total, &page))
    }

    /// Member entities matching `condition`, by member ID
    ///
    /// Uses the same filter as [`search`](Self::search). The teams table is
    /// only joined when the filter touches a team field.
    #[instrument(skip(self))]
    pub async fn search_members(&self, condition: &SearchCondition) -> Result<Vec<Member>> {
        let filter = build_filter(condition);
        let cap = self.unfiltered_cap(&filter)?;

        let mut param_offset = 1;
        let (where_clause, params) = build_condition_clause(&filter, &mut param_offset);

        let from = if filter.references_team() {
            self.joined_tables()
        } else {
            format!("{} {}", self.members(), MEMBER_ALIAS)
        };

        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            MEMBER_COLUMNS,
            from,
            where_clause,
            build_order_by_clause(&[])
        );

        let mut args = bind_params(&params)?;
        if let Some(limit) = cap {
            sql.push_str(&format!(" LIMIT ${}", param_offset));
            add_arg(&mut args, limit)?;
        }

        debug!(%sql, params = params.len(), "searching member entities");
        let rows = sqlx::query_with(&sql, args).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_member).collect()
    }

    // =========================================================================
    // Sample Data
    // =========================================================================

    /// Create `teamA`, `teamB` and `count` members
    ///
    /// Member `i` is named `member{i}`, is `i` years old, and joins `teamA`
    /// when `i` is even and `teamB` otherwise.
    pub async fn seed_sample_members(&self, count: i32) -> Result<(Team, Team)> {
        let team_a = self.save_team("teamA").await?;
        let team_b = self.save_team("teamB").await?;

        let sql = format!(
            "INSERT INTO {} (username, age, team_id) VALUES ($1, $2, $3)",
            self.members()
        );
        for i in 0..count {
            let team = if i % 2 == 0 { &team_a } else { &team_b };
            sqlx::query(&sql)
                .bind(format!("member{}", i))
                .bind(i)
                .bind(team.id)
                .execute(&self.pool)
                .await?;
        }

        info!(count, "seeded sample members");
        Ok((team_a, team_b))
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn members(&self) -> String {
        quote_identifier(&self.config.members_table)
    }

    fn teams(&self) -> String {
        quote_identifier(&self.config.teams_table)
    }

    fn joined_tables(&self) -> String {
        format!(
            "{members} {m} LEFT JOIN {teams} {t} ON {m}.team_id = {t}.team_id",
            members = self.members(),
            teams = self.teams(),
            m = MEMBER_ALIAS,
            t = TEAM_ALIAS
        )
    }

    async fn require_team(&self, team_id: i64) -> Result<Team> {
        self.find_team(team_id)
            .await?
            .ok_or_else(|| MemberQueryError::team_not_found(team_id.to_string()))
    }

    /// Row cap for a filter under the configured unfiltered-search policy
    fn unfiltered_cap(&self, filter: &Predicate) -> Result<Option<i64>> {
        if !filter.is_always() {
            return Ok(None);
        }

        match self.config.unfiltered_search {
            UnfilteredSearch::Allow => {
                warn!("member search has no filters; every member will be returned");
                Ok(None)
            }
            UnfilteredSearch::Cap(limit) => {
                warn!(limit, "member search has no filters; capping result size");
                Ok(Some(limit))
            }
            UnfilteredSearch::Reject => Err(MemberQueryError::UnfilteredSearch(
                "at least one of username, teamName, ageGoe or ageLoe is required".to_string(),
            )),
        }
    }
}

fn validate_config(config: &StoreConfig) -> Result<()> {
    validate_identifier(&config.members_table).map_err(MemberQueryError::validation)?;
    validate_identifier(&config.teams_table).map_err(MemberQueryError::validation)?;

    if config.members_table == config.teams_table {
        return Err(MemberQueryError::validation(format!(
            "Members and teams cannot share the table '{}'",
            config.members_table
        )));
    }

    if let UnfilteredSearch::Cap(limit @ ..=0) = config.unfiltered_search {
        return Err(MemberQueryError::validation(format!(
            "Unfiltered search cap must be positive, got {}",
            limit
        )));
    }

    Ok(())
}

fn bind_params(params: &[Value]) -> Result<PgArguments> {
    let mut args = PgArguments::default();
    for param in params {
        match param {
            Value::Int(n) => add_arg(&mut args, *n)?,
            Value::Text(s) => add_arg(&mut args, s.clone())?,
        }
    }
    Ok(args)
}

fn add_arg<T>(args: &mut PgArguments, value: T) -> Result<()>
where
    T: 'static + for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(value).map_err(sqlx::Error::Encode)?;
    Ok(())
}

fn row_to_team(row: &PgRow) -> Result<Team> {
    Ok(Team {
        id: row.try_get("team_id")?,
        name: row.try_get("name")?,
    })
}

fn row_to_member(row: &PgRow) -> Result<Member> {
    Ok(Member {
        id: row.try_get("member_id")?,
        username: row.try_get("username")?,
        age: row.try_get("age")?,
        team_id: row.try_get("team_id")?,
    })
}

fn row_to_member_team(row: &PgRow) -> Result<MemberTeamRow> {
    Ok(MemberTeamRow {
        member_id: row.try_get("member_id")?,
        username: row.try_get("username")?,
        age: row.try_get("age")?,
        team_id: row.try_get("team_id")?,
        team_name: row.try_get("team_name")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_defaults() {
        let config = StoreConfig::builder("postgres://localhost/test").build();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_bad_name() {
        let config = StoreConfig::builder("postgres://localhost/test")
            .members_table("members; DROP TABLE teams")
            .build();
        assert!(matches!(
            validate_config(&config),
            Err(MemberQueryError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_config_rejects_shared_name() {
        let config = StoreConfig::builder("postgres://localhost/test")
            .members_table("people")
            .teams_table("people")
            .build();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("cannot share"));
    }

    #[test]
    fn test_validate_config_rejects_non_positive_cap() {
        for cap in [0, -1] {
            let config = StoreConfig::builder("postgres://localhost/test")
                .cap_unfiltered(cap)
                .build();
            let err = validate_config(&config).unwrap_err();
            assert!(matches!(err, MemberQueryError::Validation(_)));
            assert!(err.to_string().contains("must be positive"));
        }

        let config = StoreConfig::builder("postgres://localhost/test")
            .cap_unfiltered(1)
            .build();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bind_params_accepts_both_kinds() {
        let params = vec![Value::Text("teamB".to_string()), Value::Int(35)];
        assert!(bind_params(&params).is_ok());
    }
}
