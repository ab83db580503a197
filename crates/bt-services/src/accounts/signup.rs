//! Signup Service
//!
//! Creates the account and, for workers and suppliers, the directory entry
//! that goes with it, in one write.

use bt_auth::hash_password;
use bt_contracts::base::{Contract, UserContext};
use bt_contracts::signup::{SignupContract, SignupData, SignupPolicy};
use bt_core::error::TrackerError;
use bt_core::traits::new_id;
use bt_db::{DirectoryProfile, RepositoryError, Store};
use bt_models::{Role, Supplier, User, Worker, SPECIALIZATIONS};
use tracing::{info, instrument};

use super::email_taken;
use crate::result::ServiceResult;

pub struct SignupService<'a> {
    store: &'a dyn Store,
    contract: SignupContract,
    inviter: Option<&'a dyn UserContext>,
}

impl<'a> SignupService<'a> {
    pub fn new(store: &'a dyn Store, password_min_length: usize) -> Self {
        Self {
            store,
            contract: SignupContract::new(password_min_length),
            inviter: None,
        }
    }

    /// Open the account on behalf of a signed-in user
    pub fn invited_by(mut self, inviter: &'a dyn UserContext) -> Self {
        self.inviter = Some(inviter);
        self
    }

    #[instrument(skip(self, data), fields(role = %data.role))]
    pub async fn call(self, data: SignupData) -> ServiceResult<User> {
        self.run(data).await.into()
    }

    async fn run(&self, data: SignupData) -> Result<User, TrackerError> {
        self.contract.validate(&data)?;
        let role = data
            .role()
            .ok_or_else(|| TrackerError::Internal("validated signup without a role".into()))?;

        let first_account = self.inviter.is_none()
            && role == Role::Employer
            && self.store.count_users().await? == 0;
        SignupPolicy::new(self.inviter).check(role, first_account)?;

        if self.store.find_user_by_email(&data.email).await?.is_some() {
            return Err(email_taken());
        }

        let name = data.full_name();
        let phone = data.phone.trim().to_string();
        let password_hash = hash_password(&data.password)?;

        let mut user = User::new(new_id(role.as_str()), name.clone(), role, data.email.as_str())
            .with_phone(phone.clone())
            .with_password_hash(password_hash);
        let company = data
            .company_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if role.requires_company() {
            user = user.with_company(company.clone());
        }

        let profile = match role {
            Role::Worker => {
                let specialization = canonical_specialization(data.specialization.as_deref());
                Some(DirectoryProfile::Worker(Worker::new(
                    user.id.clone(),
                    name,
                    specialization,
                    phone,
                )))
            }
            Role::Supplier => Some(DirectoryProfile::Supplier(Supplier {
                id: user.id.clone(),
                name: company,
                contact_person: name,
                phone,
                email: user.email.clone(),
                materials: Vec::new(),
                user_id: Some(user.id.clone()),
            })),
            Role::Employer => None,
        };

        let user = match self.store.insert_account(user, profile).await {
            Ok(user) => user,
            Err(RepositoryError::Conflict(_)) => return Err(email_taken()),
            Err(err) => return Err(err.into()),
        };

        info!(
            user_id = %user.id,
            role = %user.role,
            invited_by = self.inviter.map(|u| u.id()),
            "User signed up"
        );
        Ok(user)
    }
}

/// Use the listed spelling of a specialization when one matches
fn canonical_specialization(value: Option<&str>) -> String {
    let value = value.map(str::trim).unwrap_or_default();
    SPECIALIZATIONS
        .iter()
        .find(|s| s.eq_ignore_ascii_case(value))
        .map(|s| s.to_string())
        .unwrap_or_else(|| value.to_string())
}
