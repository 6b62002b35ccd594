pub mod analytics;
pub mod assessments;
pub mod attendance;
pub mod backup_exchange;
pub mod core;
pub mod courses;
pub mod faculty;
pub mod integrity;
pub mod reports;
pub mod students;
pub mod users;
