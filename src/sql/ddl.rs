//! DDL generation for the member and team tables

use crate::config::StoreConfig;
use crate::sql::sanitize::quote_identifier;

/// DDL generator for the configured tables
pub struct DdlGenerator<'a> {
    config: &'a StoreConfig,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(config: &'a StoreConfig) -> Self {
        Self { config }
    }

    /// CREATE TABLE for teams
    pub fn generate_create_teams(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (team_id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL)",
            quote_identifier(&self.config.teams_table)
        )
    }

    /// CREATE TABLE for members, with a nullable reference to teams
    pub fn generate_create_members(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (member_id BIGSERIAL PRIMARY KEY, username TEXT NOT NULL, age INTEGER NOT NULL, team_id BIGINT REFERENCES {} (team_id))",
            quote_identifier(&self.config.members_table),
            quote_identifier(&self.config.teams_table)
        )
    }

    /// Index backing the member -> team join
    pub fn generate_team_index(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (team_id)",
            quote_identifier(&format!("{}_team_id_idx", self.config.members_table)),
            quote_identifier(&self.config.members_table)
        )
    }

    /// All statements needed to bootstrap the schema, in execution order
    pub fn generate_schema(&self) -> Vec<String> {
        vec![
            self.generate_create_teams(),
            self.generate_create_members(),
            self.generate_team_index(),
        ]
    }

    /// DROP statements, members first because of the foreign key
    pub fn generate_drop_tables(&self) -> Vec<String> {
        vec![
            format!(
                "DROP TABLE IF EXISTS {} CASCADE",
                quote_identifier(&self.config.members_table)
            ),
            format!(
                "DROP TABLE IF EXISTS {} CASCADE",
                quote_identifier(&self.config.teams_table)
            ),
        ]
    }
}
