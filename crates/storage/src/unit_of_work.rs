//! Batched team and membership writes.
//!
//! Balancing results are staged in a [`TeamAssignmentBatch`] and written in a
//! single transaction, so a failure halfway through never leaves a player
//! pointing at a team that does not list them.

use std::collections::HashSet;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Team;

pub(crate) const TEAM_COLUMNS: &str =
    "team_id, competition_id, name, score, max_score, captain_id, member_ids, created_at";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub captain_id: Option<Uuid>,
    pub member_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipUpdate {
    pub team_id: Uuid,
    pub member_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAssignmentBatch {
    competition_id: Uuid,
    new_teams: Vec<NewTeam>,
    memberships: Vec<MembershipUpdate>,
    replace_existing: bool,
}

impl TeamAssignmentBatch {
    pub fn new(competition_id: Uuid) -> Self {
        Self {
            competition_id,
            new_teams: Vec::new(),
            memberships: Vec::new(),
            replace_existing: false,
        }
    }

    /// Drops every existing team of the competition before the staged teams are created.
    pub fn replace_existing_teams(&mut self) -> &mut Self {
        self.replace_existing = true;
        self
    }

    /// Stages a new team. Its members are detached from any other team of the competition.
    pub fn create_team(
        &mut self,
        name: impl Into<String>,
        captain_id: Option<Uuid>,
        member_ids: Vec<Uuid>,
    ) -> &mut Self {
        self.new_teams.push(NewTeam {
            name: name.into(),
            captain_id,
            member_ids,
        });
        self
    }

    /// Stages a full replacement of an existing team's member list.
    pub fn set_members(&mut self, team_id: Uuid, member_ids: Vec<Uuid>) -> &mut Self {
        self.memberships.push(MembershipUpdate {
            team_id,
            member_ids,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.new_teams.is_empty() && self.memberships.is_empty()
    }

    /// Applies every staged change in one transaction and returns the written teams.
    pub async fn commit(self, pool: &PgPool) -> Result<Vec<Team>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = pool.begin().await?;
        let mut written = Vec::with_capacity(self.new_teams.len() + self.memberships.len());

        if self.replace_existing {
            let removed = sqlx::query("DELETE FROM teams WHERE competition_id = $1")
                .bind(self.competition_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            info!(competition_id = %self.competition_id, removed, "Removed previous teams");
        }

        for team in &self.new_teams {
            written.push(self.insert_team(team, &mut tx).await?);
        }

        if !self.memberships.is_empty() {
            written.extend(self.replace_memberships(&mut tx).await?);
        }

        tx.commit().await?;

        info!(
            competition_id = %self.competition_id,
            created = self.new_teams.len(),
            updated = self.memberships.len(),
            "Committed team assignment batch"
        );

        Ok(written)
    }

    async fn insert_team(
        &self,
        team: &NewTeam,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Team> {
        detach_players(self.competition_id, &team.member_ids, tx).await?;

        let created = sqlx::query_as::<_, Team>(&format!(
            r#"
            INSERT INTO teams (competition_id, name, captain_id, member_ids)
            VALUES ($1, $2, $3, $4)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(self.competition_id)
        .bind(&team.name)
        .bind(team.captain_id)
        .bind(&team.member_ids)
        .fetch_one(&mut **tx)
        .await?;

        assign_registrations(self.competition_id, created.team_id, &team.member_ids, tx).await?;

        Ok(created)
    }

    async fn replace_memberships(&self, tx: &mut Transaction<'_, Postgres>) -> Result<Vec<Team>> {
        let team_ids: Vec<Uuid> = self.memberships.iter().map(|m| m.team_id).collect();
        let assigned: Vec<Uuid> = self
            .memberships
            .iter()
            .flat_map(|m| m.member_ids.iter().copied())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut updated = Vec::with_capacity(self.memberships.len());
        for membership in &self.memberships {
            let team = sqlx::query_as::<_, Team>(&format!(
                r#"
                UPDATE teams
                SET member_ids = $3
                WHERE team_id = $1 AND competition_id = $2
                RETURNING {TEAM_COLUMNS}
                "#
            ))
            .bind(membership.team_id)
            .bind(self.competition_id)
            .bind(&membership.member_ids)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(crate::error::StorageError::NotFound)?;

            assign_registrations(
                self.competition_id,
                membership.team_id,
                &membership.member_ids,
                tx,
            )
            .await?;

            updated.push(team);
        }

        sqlx::query(
            r#"
            UPDATE competition_registrations
            SET team_id = NULL
            WHERE competition_id = $1 AND team_id = ANY($2) AND NOT (player_id = ANY($3))
            "#,
        )
        .bind(self.competition_id)
        .bind(&team_ids)
        .bind(&assigned)
        .execute(&mut **tx)
        .await?;

        Ok(updated)
    }
}

/// Removes players from every team of the competition, clearing captaincies they held.
pub(crate) async fn detach_players(
    competition_id: Uuid,
    player_ids: &[Uuid],
    tx: &mut Transaction<'_, Postgres>,
) -> Result<()> {
    if player_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE teams
        SET member_ids = ARRAY(
                SELECT m FROM unnest(member_ids) AS m WHERE m <> ALL($2)
            ),
            captain_id = CASE WHEN captain_id = ANY($2) THEN NULL ELSE captain_id END
        WHERE competition_id = $1 AND member_ids && $2
        "#,
    )
    .bind(competition_id)
    .bind(player_ids)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "UPDATE competition_registrations SET team_id = NULL WHERE competition_id = $1 AND player_id = ANY($2)",
    )
    .bind(competition_id)
    .bind(player_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Points the players' registrations in this competition at `team_id`.
async fn assign_registrations(
    competition_id: Uuid,
    team_id: Uuid,
    player_ids: &[Uuid],
    tx: &mut Transaction<'_, Postgres>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE competition_registrations
        SET team_id = $2
        WHERE competition_id = $1 AND player_id = ANY($3)
        "#,
    )
    .bind(competition_id)
    .bind(team_id)
    .bind(player_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_staging() {
        let competition = Uuid::new_v4();
        let team = Uuid::new_v4();
        let player = Uuid::new_v4();

        let mut batch = TeamAssignmentBatch::new(competition);
        assert!(batch.is_empty());

        batch
            .create_team("Team 1", Some(player), vec![player])
            .set_members(team, vec![player]);

        assert!(!batch.is_empty());
        assert!(!batch.replace_existing);
        batch.replace_existing_teams();
        assert!(batch.replace_existing);
        assert_eq!(batch.competition_id, competition);
        assert_eq!(batch.new_teams[0].name, "Team 1");
        assert_eq!(batch.new_teams[0].captain_id, Some(player));
        assert_eq!(batch.memberships[0].team_id, team);
    }
}
