//! Service context
//!
//! A service runs on behalf of one user against one store, on one day.

use bt_contracts::base::UserContext;
use bt_core::error::TrackerError;
use bt_db::Store;
use chrono::{NaiveDate, Utc};

/// How often a write that lost an optimistic-lock race is retried
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Who is acting, against which store, and what "today" is
pub struct ServiceContext<'a, U: UserContext + ?Sized> {
    pub store: &'a dyn Store,
    pub user: &'a U,
    pub today: NaiveDate,
}

impl<'a, U: UserContext + ?Sized> ServiceContext<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self {
            store,
            user,
            today: Utc::now().date_naive(),
        }
    }

    /// Act as if today were `date`
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.today = date;
        self
    }
}

impl<U: UserContext + ?Sized> Clone for ServiceContext<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U: UserContext + ?Sized> Copy for ServiceContext<'_, U> {}

/// Reject anonymous callers before touching the store
pub(crate) fn require_role<U: UserContext + ?Sized>(user: &U) -> Result<bt_models::Role, TrackerError> {
    user.role()
        .ok_or_else(|| TrackerError::unauthorized("sign in required"))
}
