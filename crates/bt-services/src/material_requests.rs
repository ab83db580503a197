//! Material request services
//!
//! Workers submit requests for their projects; employers and suppliers
//! move them through `pending -> approved -> fulfilled` or
//! `pending -> rejected`.

use bt_contracts::base::UserContext;
use bt_contracts::material_requests::{
    validate_material_request, MaterialRequestInput, MaterialRequestPolicy,
};
use bt_contracts::visibility::can_see_material_request;
use bt_core::error::TrackerError;
use bt_core::traits::new_id;
use bt_db::RepositoryError;
use bt_models::{MaterialRequest, RequestTransition};
use tracing::{debug, info, instrument};

use crate::base::{ServiceContext, MAX_WRITE_ATTEMPTS};
use crate::result::ServiceResult;

pub struct SubmitMaterialRequestService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> SubmitMaterialRequestService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, input), fields(user_id = %self.ctx.user.id()))]
    pub async fn call(self, input: MaterialRequestInput) -> ServiceResult<MaterialRequest> {
        self.run(input).await.into()
    }

    async fn run(&self, input: MaterialRequestInput) -> Result<MaterialRequest, TrackerError> {
        let store = self.ctx.store;
        let user = self.ctx.user;
        let draft = validate_material_request(&input)?;

        let project = store
            .find_project(&draft.project_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("project", "id", draft.project_id.clone()))?;
        MaterialRequestPolicy::new(user).check_submit(&project)?;

        // Catalogued materials lend their unit when the form leaves it empty
        let catalogued = store.find_material_by_name(&draft.material_name).await?;
        let request = draft.into_request(
            new_id("req"),
            user,
            &project,
            catalogued.as_ref().map(|m| m.unit.as_str()),
            self.ctx.today,
        );
        let request = store.insert_material_request(request).await?;

        info!(
            request_id = %request.id,
            project_id = %request.project_id,
            material = %request.material_name,
            urgency = request.urgency.as_str(),
            "Material request submitted"
        );
        Ok(request)
    }
}

/// Approves, rejects or fulfills a request.
///
/// The store only accepts the change while the request is still in the
/// status it was read in; on a lost race the request is read again and
/// the transition re-checked against its new status.
pub struct TransitionMaterialRequestService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> TransitionMaterialRequestService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, transition), fields(user_id = %self.ctx.user.id(), action = transition.verb()))]
    pub async fn call(self, request_id: &str, transition: RequestTransition) -> ServiceResult<MaterialRequest> {
        self.run(request_id, transition).await.into()
    }

    async fn run(&self, request_id: &str, transition: RequestTransition) -> Result<MaterialRequest, TrackerError> {
        let store = self.ctx.store;
        let user = self.ctx.user;
        let policy = MaterialRequestPolicy::new(user);
        policy.check_transition(&transition)?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let current = store
                .find_material_request(request_id)
                .await?
                .filter(|r| can_see_material_request(r, user))
                .ok_or_else(|| TrackerError::not_found("material request", "id", request_id))?;

            let mut updated = current.clone();
            policy.apply(&mut updated, transition.clone(), self.ctx.today)?;

            match store.transition_material_request(updated, current.status).await {
                Ok(request) => {
                    info!(
                        request_id = %request.id,
                        from = %current.status,
                        to = %request.status,
                        "Material request updated"
                    );
                    return Ok(request);
                }
                Err(RepositoryError::Conflict(reason)) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(attempt, %reason, "Request changed concurrently, re-reading");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
