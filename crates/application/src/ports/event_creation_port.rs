//! Event creation port
//!
//! The only sanctioned way for the sync subsystem to add events to the
//! schedule. Implementations assign the identifier and stamp metadata.

use async_trait::async_trait;
use domain::{NewScheduleEvent, ScheduleEventId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for creating schedule events
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventCreationPort: Send + Sync {
    /// Persist a new event
    ///
    /// # Returns
    /// The created event's ID
    async fn create_event(
        &self,
        event: &NewScheduleEvent,
    ) -> Result<ScheduleEventId, ApplicationError>;
}
