//! Material usage and delivery service

use bt_contracts::base::{present, UserContext};
use bt_contracts::material_logs::{
    movement_kind_for, validate_material_log_entry, MaterialLogInput, MaterialLogPolicy,
};
use bt_core::error::TrackerError;
use bt_core::traits::new_id;
use bt_db::RepositoryError;
use bt_models::{Material, MaterialMovement};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::base::{ServiceContext, MAX_WRITE_ATTEMPTS};
use crate::result::ServiceResult;

/// A recorded movement and the material after it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLogOutcome {
    pub movement: MaterialMovement,
    pub material: Material,
}

/// Logs material used on site (workers, employers) or delivered (suppliers).
///
/// Stock is re-read and the entry re-validated when another write got to
/// the material first.
pub struct LogMaterialService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> LogMaterialService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, input), fields(user_id = %self.ctx.user.id()))]
    pub async fn call(self, input: MaterialLogInput) -> ServiceResult<MaterialLogOutcome> {
        self.run(input).await.into()
    }

    async fn run(&self, input: MaterialLogInput) -> Result<MaterialLogOutcome, TrackerError> {
        let store = self.ctx.store;
        let user = self.ctx.user;
        let kind = movement_kind_for(user.role())
            .ok_or_else(|| TrackerError::access_denied("log materials"))?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let material = match present(input.material_id.as_ref()) {
                Some(id) => store.find_material(id).await?,
                None => None,
            };
            let draft = validate_material_log_entry(&input, material.as_ref(), kind, self.ctx.today)?;

            let project = store
                .find_project(&draft.project_id)
                .await?
                .ok_or_else(|| TrackerError::not_found("project", "id", draft.project_id.clone()))?;
            MaterialLogPolicy::new(user).check(&project)?;

            let expected_version = material.as_ref().map(|m| m.lock_version).unwrap_or_default();
            let movement = draft.into_movement(new_id("mov"), user, Utc::now());

            match store.record_movement(movement.clone(), expected_version).await {
                Ok(material) => {
                    info!(
                        material_id = %material.id,
                        kind = %movement.kind,
                        quantity = movement.quantity,
                        remaining = material.remaining_quantity,
                        "Material movement recorded"
                    );
                    return Ok(MaterialLogOutcome { movement, material });
                }
                Err(RepositoryError::Conflict(reason)) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(attempt, %reason, "Material changed concurrently, retrying");
                }
                Err(err) => {
                    if matches!(err, RepositoryError::Conflict(_)) {
                        warn!(attempts = attempt, "Giving up on contended material");
                    }
                    return Err(err.into());
                }
            }
        }
    }
}
