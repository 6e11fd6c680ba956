pub mod api;
pub mod app;
pub mod conversations;
pub mod error;
pub mod grades;
pub mod schedule;
pub mod ui;
pub mod utils;

pub use api::models::{Conversation, CourseEntry, Message};
pub use conversations::group_conversations;
pub use error::ApiError;
pub use schedule::{DayFallback, ScheduleRow, TimeSlot, Weekday, build_schedule_rows, build_schedule_rows_with};
