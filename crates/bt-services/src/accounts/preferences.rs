//! Preferences Service

use bt_contracts::base::UserContext;
use bt_core::error::TrackerError;
use bt_models::{User, UserPreferences};
use tracing::{debug, instrument};

use crate::base::{require_role, ServiceContext};
use crate::result::ServiceResult;

/// Stores the signed-in user's own preferences
pub struct UpdatePreferencesService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> UpdatePreferencesService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self), fields(user_id = %self.ctx.user.id()))]
    pub async fn call(self, preferences: UserPreferences) -> ServiceResult<User> {
        self.run(preferences).await.into()
    }

    async fn run(&self, preferences: UserPreferences) -> Result<User, TrackerError> {
        require_role(self.ctx.user)?;
        let user = self
            .ctx
            .store
            .update_preferences(self.ctx.user.id(), preferences)
            .await?;
        debug!(dark_mode = user.preferences.dark_mode, "Preferences saved");
        Ok(user)
    }
}
