//! The calendar store seam.
//!
//! A store is bound to one calendar. [`crate::remote::Remote`] implements it
//! by talking to a provider binary; tests use an in-memory store.

use chrono::{DateTime, Utc};

use crate::error::GameCalResult;
use crate::record::StoreRecord;

#[allow(async_fn_in_trait)]
pub trait CalendarStore {
    /// Every record starting at or after `since`.
    async fn list_upcoming(&self, since: DateTime<Utc>) -> GameCalResult<Vec<StoreRecord>>;

    /// Insert a record, returning the id the store assigned to it.
    async fn insert(&self, record: &StoreRecord) -> GameCalResult<String>;

    async fn delete(&self, id: &str) -> GameCalResult<()>;
}

impl<T: CalendarStore + ?Sized> CalendarStore for &T {
    async fn list_upcoming(&self, since: DateTime<Utc>) -> GameCalResult<Vec<StoreRecord>> {
        (**self).list_upcoming(since).await
    }

    async fn insert(&self, record: &StoreRecord) -> GameCalResult<String> {
        (**self).insert(record).await
    }

    async fn delete(&self, id: &str) -> GameCalResult<()> {
        (**self).delete(id).await
    }
}
