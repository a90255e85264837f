// Command line arguments
use clap::Parser;
use std::path::PathBuf;

use crate::domain::resources::Credentials;

/// Publish, query and set permissions on Tableau Server workbooks.
#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    #[arg(long, env = "TABLEAU_USERNAME")]
    pub username: String,

    #[arg(long, env = "TABLEAU_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// JSON array of job entries (a single object is accepted too).
    #[arg(long = "project_data", value_name = "JSON")]
    pub project_data: String,

    /// Settings file; defaults to config/tableau.* when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
