//constants

const INSERT_USER: &str = include_str!("scripts/insert_user.sql");
const GET_USER: &str = include_str!("scripts/get_user.sql");
const INSERT_PROJECT: &str = include_str!("scripts/insert_project.sql");
const GET_PROJECT_BY_SLUG: &str = include_str!("scripts/get_project_by_slug.sql");
const UPDATE_PROJECT: &str = include_str!("scripts/update_project.sql");
const DELETE_PROJECT: &str = include_str!("scripts/delete_project.sql");
const INSERT_MEMBERSHIP: &str = include_str!("scripts/insert_membership.sql");
const GET_MEMBERSHIP_ROLE: &str = include_str!("scripts/get_membership_role.sql");
const INSERT_ENVIRONMENT: &str = include_str!("scripts/insert_environment.sql");
const GET_ENVIRONMENT: &str = include_str!("scripts/get_environment.sql");
const INSERT_BUG: &str = include_str!("scripts/insert_bug.sql");
const GET_BUG: &str = include_str!("scripts/get_bug.sql");
const UPDATE_BUG: &str = include_str!("scripts/update_bug.sql");
const LIST_BUGS: &str = include_str!("scripts/list_bugs.sql");

pub enum Queries {
    InsertUser,
    GetUser,
    InsertProject,
    GetProjectBySlug,
    UpdateProject,
    DeleteProject,
    InsertMembership,
    GetMembershipRole,
    InsertEnvironment,
    GetEnvironment,
    InsertBug,
    GetBug,
    UpdateBug,

    /// Select prefix ending in `WHERE`, completed by the caller's query builder
    ListBugs,
}

impl Queries {
    pub fn get_query(&self) -> &'static str {
        match self {
            // load sql file from scripts/
            Queries::InsertUser => INSERT_USER,
            Queries::GetUser => GET_USER,
            Queries::InsertProject => INSERT_PROJECT,
            Queries::GetProjectBySlug => GET_PROJECT_BY_SLUG,
            Queries::UpdateProject => UPDATE_PROJECT,
            Queries::DeleteProject => DELETE_PROJECT,
            Queries::InsertMembership => INSERT_MEMBERSHIP,
            Queries::GetMembershipRole => GET_MEMBERSHIP_ROLE,
            Queries::InsertEnvironment => INSERT_ENVIRONMENT,
            Queries::GetEnvironment => GET_ENVIRONMENT,
            Queries::InsertBug => INSERT_BUG,
            Queries::GetBug => GET_BUG,
            Queries::UpdateBug => UPDATE_BUG,
            Queries::ListBugs => LIST_BUGS.trim_end(),
        }
    }
}
