// Domain layer - Job configuration and Tableau resources
pub mod permission;
pub mod project_data;
pub mod resources;
