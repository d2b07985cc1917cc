use crate::sql::error::SqlError;
use crate::sql::traits::{
    BugSqlLogic, EnvironmentSqlLogic, MembershipSqlLogic, ProjectSqlLogic, UserSqlLogic,
};
use bugtrack_settings::DatabaseSettings;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone)]
pub struct PostgresClient {}

impl UserSqlLogic for PostgresClient {}
impl ProjectSqlLogic for PostgresClient {}
impl MembershipSqlLogic for PostgresClient {}
impl EnvironmentSqlLogic for PostgresClient {}
impl BugSqlLogic for PostgresClient {}

impl PostgresClient {
    /// Setup the application with the given database pool.
    ///
    /// # Returns
    ///
    /// * `Result<Pool<Postgres>, SqlError>` - Result of the database pool
    #[instrument(skip(database_settings))]
    pub async fn create_db_pool(
        database_settings: &DatabaseSettings,
    ) -> Result<Pool<Postgres>, SqlError> {
        let pool = PgPoolOptions::new()
            .max_connections(database_settings.max_connections)
            .connect(&database_settings.connection_uri)
            .await
            .inspect_err(|e| error!("🚨 Failed to connect to database {:?}", e))?;

        info!("✅ Successfully connected to database");

        Self::run_migrations(&pool).await?;

        Ok(pool)
    }

    /// Pool that opens connections on first use
    pub fn create_lazy_pool(database_settings: &DatabaseSettings) -> Result<Pool<Postgres>, SqlError> {
        let pool = PgPoolOptions::new()
            .max_connections(database_settings.max_connections)
            .connect_lazy(&database_settings.connection_uri)?;

        Ok(pool)
    }

    pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), SqlError> {
        info!("Running migrations");
        sqlx::migrate!("src/sql/migrations")
            .run(pool)
            .await
            .map_err(|e| SqlError::MigrationError(format!("{}", e)))?;

        debug!("Migrations complete");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::pagination::PageDirection;
    use crate::sql::schema::{Bug, NewBug};
    use crate::sql::traits::BugListing;
    use bugtrack_types::Role;
    use chrono::{Duration, TimeZone, Utc};

    /// Runs only when `DATABASE_URI` points at a live Postgres
    async fn db_pool() -> Option<Pool<Postgres>> {
        std::env::var("DATABASE_URI").ok()?;
        let settings = DatabaseSettings::from_env().unwrap();
        Some(PostgresClient::create_db_pool(&settings).await.unwrap())
    }

    fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    async fn test_membership_roles() {
        let Some(pool) = db_pool().await else {
            return;
        };

        let owner = PostgresClient::insert_user(&pool, &unique("owner"), "hash")
            .await
            .unwrap();
        let member = PostgresClient::insert_user(&pool, &unique("member"), "hash")
            .await
            .unwrap();
        let stranger = PostgresClient::insert_user(&pool, &unique("stranger"), "hash")
            .await
            .unwrap();

        let project = PostgresClient::insert_project(&pool, &unique("web"), "Web", owner.id, None)
            .await
            .unwrap();

        PostgresClient::insert_membership(&pool, member.id, project.id, Role::Admin)
            .await
            .unwrap();

        let role = PostgresClient::get_role(&pool, owner.id, project.id).await.unwrap();
        assert_eq!(role, Some(Role::Owner));

        let role = PostgresClient::get_role(&pool, member.id, project.id).await.unwrap();
        assert_eq!(role, Some(Role::Admin));

        let role = PostgresClient::get_role(&pool, stranger.id, project.id).await.unwrap();
        assert_eq!(role, None);

        PostgresClient::delete_project(&pool, project.id).await.unwrap();
        let gone = PostgresClient::get_project_by_slug(&pool, &project.slug).await.unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_list_bugs_pages_stitch() {
        let Some(pool) = db_pool().await else {
            return;
        };

        let owner = PostgresClient::insert_user(&pool, &unique("owner"), "hash")
            .await
            .unwrap();
        let project = PostgresClient::insert_project(&pool, &unique("api"), "API", owner.id, None)
            .await
            .unwrap();
        let environment = PostgresClient::insert_environment(&pool, project.id, "production")
            .await
            .unwrap();

        // pairs of bugs share a latest_occurrence so the tie-break matters
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..7_i64 {
            let seen = start + Duration::hours(i / 2);
            PostgresClient::insert_bug(
                &pool,
                &NewBug {
                    environment_id: environment.id,
                    class_name: "RuntimeError".to_string(),
                    message: format!("failure {}", i),
                    description: String::new(),
                    occurrences_count: i + 1,
                    first_occurrence: seen,
                    latest_occurrence: seen,
                },
            )
            .await
            .unwrap();
        }

        let mut collected: Vec<Bug> = Vec::new();
        loop {
            let listing = BugListing {
                environment_id: environment.id,
                sort: "bugs.latest_occurrence",
                direction: PageDirection::Descending,
                after: collected.last(),
                limit: 3,
            };
            let page = PostgresClient::list_bugs(&pool, &listing).await.unwrap();
            assert!(page.items.len() <= 3);

            let has_more = page.has_more;
            collected.extend(page.items);
            if !has_more {
                break;
            }
        }

        let numbers: Vec<i64> = collected.iter().map(|bug| bug.number).collect();
        assert_eq!(numbers, vec![7, 6, 5, 4, 3, 2, 1]);

        let mut bug = PostgresClient::get_bug(&pool, environment.id, 3)
            .await
            .unwrap()
            .unwrap();
        bug.fixed = true;
        bug.notes = Some("patched".to_string());
        PostgresClient::update_bug(&pool, &bug).await.unwrap();

        let bug = PostgresClient::get_bug(&pool, environment.id, 3)
            .await
            .unwrap()
            .unwrap();
        assert!(bug.fixed);
        assert_eq!(bug.notes.as_deref(), Some("patched"));

        PostgresClient::delete_project(&pool, project.id).await.unwrap();
    }
}
