// Schedule service - extract refresh schedules
use std::sync::Arc;

use crate::application::tableau_api::TableauApi;
use crate::domain::project_data::ScheduleSpec;
use crate::domain::resources::{Schedule, Session};

#[derive(Clone)]
pub struct ScheduleService {
    api: Arc<dyn TableauApi>,
}

impl ScheduleService {
    pub fn new(api: Arc<dyn TableauApi>) -> Self {
        Self { api }
    }

    pub async fn create_schedule(&self, session: &Session, spec: &ScheduleSpec) -> anyhow::Result<Schedule> {
        let new_schedule = spec.to_new_schedule()?;
        let schedule = self.api.create_schedule(session, &new_schedule).await?;
        tracing::info!(
            "Created schedule {} ({}) running every {}h between {} and {}",
            schedule.name,
            schedule.id,
            new_schedule.interval_hours,
            new_schedule.start_time,
            new_schedule.end_time
        );
        Ok(schedule)
    }
}
