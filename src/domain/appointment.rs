//! Appointments and their status machine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::config::{DEFAULT_APPOINTMENT_MINUTES, MAX_APPOINTMENT_MINUTES, MIN_APPOINTMENT_MINUTES};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    CheckedIn,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::CheckedIn => "CHECKED_IN",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }

    /// Statuses that occupy the doctor's calendar
    pub const BLOCKING: [AppointmentStatus; 2] =
        [AppointmentStatus::Scheduled, AppointmentStatus::CheckedIn];

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, CheckedIn)
                | (Scheduled, Cancelled)
                | (Scheduled, NoShow)
                | (CheckedIn, Completed)
                | (CheckedIn, Cancelled)
        )
    }
}

impl From<&str> for AppointmentStatus {
    fn from(s: &str) -> Self {
        match s {
            "SCHEDULED" => AppointmentStatus::Scheduled,
            "CHECKED_IN" => AppointmentStatus::CheckedIn,
            "COMPLETED" => AppointmentStatus::Completed,
            "NO_SHOW" => AppointmentStatus::NoShow,
            "CANCELLED" => AppointmentStatus::Cancelled,
            other => {
                tracing::warn!(
                    status = other,
                    "Unknown appointment status, reading as CANCELLED"
                );
                AppointmentStatus::Cancelled
            }
        }
    }
}

/// Appointment domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub department_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn transition(&mut self, next: AppointmentStatus) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::bad_request(
                "INVALID_TRANSITION",
                format!(
                    "Cannot move appointment from {} to {}",
                    self.status.as_str(),
                    next.as_str()
                ),
            ));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Compute and check a slot: start strictly in the future, 5-480 minutes long.
pub fn schedule_window(
    starts_at: DateTime<Utc>,
    duration_minutes: Option<i64>,
    now: DateTime<Utc>,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let minutes = duration_minutes.unwrap_or(DEFAULT_APPOINTMENT_MINUTES);
    if starts_at <= now {
        return Err(AppError::bad_request(
            "INVALID_SCHEDULE",
            "Appointment must start in the future",
        ));
    }
    if !(MIN_APPOINTMENT_MINUTES..=MAX_APPOINTMENT_MINUTES).contains(&minutes) {
        return Err(AppError::bad_request(
            "INVALID_SCHEDULE",
            format!(
                "Duration must be between {} and {} minutes",
                MIN_APPOINTMENT_MINUTES, MAX_APPOINTMENT_MINUTES
            ),
        ));
    }
    Ok((starts_at, starts_at + Duration::minutes(minutes)))
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub department_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    /// Defaults to 30 minutes
    #[schema(example = 30)]
    pub duration_minutes: Option<i64>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RescheduleAppointment {
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointmentStatus {
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// Only appointments starting at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only appointments starting before this instant
    pub to: Option<DateTime<Utc>>,
}

/// Appointment with display names resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(Scheduled.can_transition_to(CheckedIn));
        assert!(Scheduled.can_transition_to(NoShow));
        assert!(CheckedIn.can_transition_to(Completed));
        assert!(CheckedIn.can_transition_to(Cancelled));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!CheckedIn.can_transition_to(NoShow));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!NoShow.can_transition_to(CheckedIn));
    }

    #[test]
    fn test_stored_status_parsing() {
        assert_eq!(AppointmentStatus::from("NO_SHOW"), NoShow);
        assert_eq!(AppointmentStatus::from("CANCELLED"), Cancelled);
        assert_eq!(AppointmentStatus::from("garbled"), Cancelled);
    }

    #[test]
    fn test_schedule_window_defaults_to_thirty_minutes() {
        let now = Utc::now();
        let start = now + Duration::hours(2);
        let (s, e) = schedule_window(start, None, now).unwrap();
        assert_eq!(s, start);
        assert_eq!(e - s, Duration::minutes(30));
    }

    #[test]
    fn test_schedule_window_rejects_past_and_bad_durations() {
        let now = Utc::now();
        let past = now - Duration::minutes(1);
        assert_eq!(
            schedule_window(past, None, now).unwrap_err().code(),
            "INVALID_SCHEDULE"
        );

        let future = now + Duration::hours(1);
        assert!(schedule_window(future, Some(4), now).is_err());
        assert!(schedule_window(future, Some(481), now).is_err());
        assert!(schedule_window(future, Some(480), now).is_ok());
    }
}
