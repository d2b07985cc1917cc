use crate::sql::error::SqlError;
use crate::sql::pagination::{push_order_by, Page, PageDirection, PaginationClause};
use crate::sql::query::Queries;
use crate::sql::schema::{Bug, NewBug};

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::{debug, error, instrument};

/// Unique within an environment, so it breaks ties between equal sort values
pub const BUG_TIE_BREAK_KEY: &str = "bugs.number";

/// A keyset page request over an environment's bugs
#[derive(Debug, Clone)]
pub struct BugListing<'a> {
    pub environment_id: i64,

    /// Qualified sort column, e.g. `bugs.latest_occurrence`
    pub sort: &'a str,
    pub direction: PageDirection,

    /// Last bug of the previous page, `None` for the first page
    pub after: Option<&'a Bug>,
    pub limit: i64,
}

#[async_trait]
pub trait BugSqlLogic {
    async fn insert_bug(pool: &Pool<Postgres>, bug: &NewBug) -> Result<Bug, SqlError> {
        let query = Queries::InsertBug.get_query();

        let bug: Bug = sqlx::query_as(query)
            .bind(bug.environment_id)
            .bind(&bug.class_name)
            .bind(&bug.message)
            .bind(&bug.description)
            .bind(bug.occurrences_count)
            .bind(bug.first_occurrence)
            .bind(bug.latest_occurrence)
            .fetch_one(pool)
            .await
            .inspect_err(|e| error!("Failed to insert bug: {:?}", e))?;

        Ok(bug)
    }

    /// Looks up a bug by its per-environment number
    async fn get_bug(
        pool: &Pool<Postgres>,
        environment_id: i64,
        number: i64,
    ) -> Result<Option<Bug>, SqlError> {
        let query = Queries::GetBug.get_query();

        let bug: Option<Bug> = sqlx::query_as(query)
            .bind(environment_id)
            .bind(number)
            .fetch_optional(pool)
            .await?;

        Ok(bug)
    }

    async fn update_bug(pool: &Pool<Postgres>, bug: &Bug) -> Result<(), SqlError> {
        let query = Queries::UpdateBug.get_query();

        sqlx::query(query)
            .bind(bug.fixed)
            .bind(bug.irrelevant)
            .bind(bug.assigned_user_id)
            .bind(&bug.notes)
            .bind(bug.id)
            .execute(pool)
            .await
            .inspect_err(|e| error!("Failed to update bug: {:?}", e))?;

        Ok(())
    }

    /// Retrieves one keyset page of an environment's bugs
    ///
    /// # Arguments
    /// * `pool` - The database connection pool
    /// * `listing` - Sort column, direction, cursor row and limit
    ///
    /// # Returns
    /// * The page of bugs and whether another page follows
    #[instrument(skip_all)]
    async fn list_bugs(
        pool: &Pool<Postgres>,
        listing: &BugListing<'_>,
    ) -> Result<Page<Bug>, SqlError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(Queries::ListBugs.get_query());

        builder.push(" bugs.environment_id = ");
        builder.push_bind(listing.environment_id);

        if let Some(last) = listing.after {
            let clause = PaginationClause::new(
                listing.sort,
                listing.direction,
                last,
                Some(BUG_TIE_BREAK_KEY),
            )?;
            builder.push(" AND ");
            clause.push_to(&mut builder);
        }

        push_order_by(
            &mut builder,
            listing.sort,
            listing.direction,
            Some(BUG_TIE_BREAK_KEY),
        )?;

        // one extra row tells us whether another page exists
        builder.push(" LIMIT ");
        builder.push_bind(listing.limit + 1);

        debug!("Listing bugs: {}", builder.sql());

        let items: Vec<Bug> = builder
            .build_query_as::<Bug>()
            .fetch_all(pool)
            .await
            .inspect_err(|e| error!("Failed to list bugs: {:?}", e))?;

        Ok(Page::from_overfetch(items, listing.limit))
    }
}
