pub mod auth_init;
pub mod auth_submit;
pub mod create_event;
pub mod delete_event;
pub mod list_events;
