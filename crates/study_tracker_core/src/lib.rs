pub mod calendar;
pub mod domain;
pub mod ports;
pub mod service;
pub mod stats;

pub use domain::{CalendarView, MonthRef, StatsSnapshot, User, UserCredentials};
pub use ports::{AuthStore, CoreError, CoreResult, SessionTimeStore, StudyDayStore};
pub use service::AttendanceService;
