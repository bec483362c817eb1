mod auth;
mod companies;
mod health_check;
mod jobs;
mod users;

pub use auth::{login, logout, refresh};
pub use companies::{
    add_recruiter, create_company, delete_company, get_company, list_companies, remove_recruiter,
    update_company,
};
pub use health_check::health_check;
pub use jobs::{create_job, delete_job, get_job, list_jobs, update_job};
pub use users::{create_user, current_user, delete_user, update_user};
