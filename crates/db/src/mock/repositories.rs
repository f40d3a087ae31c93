use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use uuid::Uuid;

use smokecheck_core::errors::BookingResult;
use smokecheck_core::models::appointment::{
    Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment,
};
use smokecheck_core::store::AppointmentStore;

// Mock appointment store for testing
mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentStore for AppointmentRepo {
        async fn query(
            &self,
            date: NaiveDate,
            statuses: &[AppointmentStatus],
        ) -> BookingResult<Vec<Appointment>>;
        async fn create(&self, appointment: NewAppointment) -> BookingResult<Appointment>;
        async fn get(&self, id: Uuid) -> BookingResult<Option<Appointment>>;
        async fn list_for_user(&self, user_id: Uuid) -> BookingResult<Vec<Appointment>>;
        async fn list(&self, status: Option<AppointmentStatus>) -> BookingResult<Vec<Appointment>>;
        async fn update(&self, id: Uuid, update: AppointmentUpdate) -> BookingResult<Appointment>;
    }
}
