//! Staff administration: roster listing, approval of pending members,
//! and manager promotion/demotion.
//!
//! Manager seat invariants, checked before any write:
//! - a company holds at most two managers;
//! - demotion never removes the last manager.

use realdesk_sql::Value;
use tracing::info;

use crate::model::{Profile, ProfilePublic, StaffActionRequest};
use crate::service::guard;
use crate::service::{AuthError, AuthService};

const MAX_MANAGERS: usize = 2;

impl AuthService {
    /// Roster of a company, newest first. Requester must be an admin
    /// or a member of that company.
    pub fn list_staff(
        &self,
        requester_raw: &str,
        company_id: &str,
    ) -> Result<Vec<ProfilePublic>, AuthError> {
        let requester = self.require_requester(Some(requester_raw))?;
        if !guard::can_access_company_scope(&requester, Some(company_id)) {
            return Err(AuthError::Forbidden(
                "requester is outside this company".into(),
            ));
        }

        let profiles: Vec<Profile> = self.list_records(
            "profiles",
            &[("company_id", Value::Text(company_id.to_string()))],
        )?;
        Ok(profiles.into_iter().map(ProfilePublic::from).collect())
    }

    /// Apply a staff action (`approve`, `promote`, `demote`) to a
    /// target account. Only a manager of the same company or an admin
    /// may act.
    pub fn staff_action(&self, req: &StaffActionRequest) -> Result<ProfilePublic, AuthError> {
        let requester = self.require_requester(Some(&req.requester_id))?;

        let target_id = self
            .resolve_account(&req.target_user_id)?
            .ok_or_else(|| AuthError::NotFound(format!("account {}", req.target_user_id)))?;
        let mut target = self.get_profile(&target_id)?;

        if !guard::is_admin(&requester) {
            if requester.role != "manager" {
                return Err(AuthError::Forbidden("requester is not a manager".into()));
            }
            if !guard::can_access_company_scope(&requester, target.company_id.as_deref()) {
                return Err(AuthError::Forbidden(
                    "target belongs to another company".into(),
                ));
            }
        }

        match req.action.as_str() {
            "approve" => {
                if target.status != "pending_approval" {
                    return Err(AuthError::Validation(
                        "account is not awaiting approval".into(),
                    ));
                }
                target.status = "active".to_string();
            }
            "promote" => {
                if target.role == "manager" {
                    return Err(AuthError::Validation("account is already a manager".into()));
                }
                let company_id = target.company_id.clone().ok_or_else(|| {
                    AuthError::Validation("account has no company to manage".into())
                })?;
                if self.manager_count(&company_id)? >= MAX_MANAGERS {
                    return Err(AuthError::Conflict(
                        "company already has the maximum number of managers".into(),
                    ));
                }
                target.role = "manager".to_string();
                // Promotion of a pending member implies approval.
                target.status = "active".to_string();
            }
            "demote" => {
                if target.role != "manager" {
                    return Err(AuthError::Validation("account is not a manager".into()));
                }
                let company_id = target.company_id.clone().ok_or_else(|| {
                    AuthError::Validation("account has no company".into())
                })?;
                if self.manager_count(&company_id)? <= 1 {
                    return Err(AuthError::Conflict(
                        "cannot demote the last manager of a company".into(),
                    ));
                }
                target.role = "staff".to_string();
            }
            other => {
                return Err(AuthError::Validation(format!(
                    "unknown staff action: {}",
                    other
                )));
            }
        }

        self.save_profile(&mut target)?;
        info!(target = %target.id, action = %req.action, by = %requester.id, "staff action applied");
        Ok(ProfilePublic::from(target))
    }

    fn manager_count(&self, company_id: &str) -> Result<usize, AuthError> {
        self.count_records(
            "profiles",
            &[
                ("company_id", Value::Text(company_id.to_string())),
                ("role", Value::Text("manager".to_string())),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::model::StaffActionRequest;
    use crate::service::AuthError;
    use crate::service::test_support::{staff_profile, test_service};

    fn action(target: &str, action: &str, requester: &str) -> StaffActionRequest {
        StaffActionRequest {
            target_user_id: target.to_string(),
            action: action.to_string(),
            requester_id: requester.to_string(),
        }
    }

    #[test]
    fn manager_approves_pending_member() {
        let svc = test_service();
        let manager = svc.create_profile(staff_profile("manager", Some("c1"))).unwrap();
        let mut pending_input = staff_profile("staff", Some("c1"));
        pending_input.status = "pending_approval".to_string();
        let pending = svc.create_profile(pending_input).unwrap();

        let updated = svc
            .staff_action(&action(&pending.id, "approve", &manager.id))
            .unwrap();
        assert_eq!(updated.status, "active");

        // Approving twice fails.
        let err = svc
            .staff_action(&action(&pending.id, "approve", &manager.id))
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[test]
    fn staff_cannot_act() {
        let svc = test_service();
        let staff = svc.create_profile(staff_profile("staff", Some("c1"))).unwrap();
        let other = svc.create_profile(staff_profile("staff", Some("c1"))).unwrap();

        let err = svc
            .staff_action(&action(&other.id, "promote", &staff.id))
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[test]
    fn cross_company_action_is_forbidden() {
        let svc = test_service();
        let manager = svc.create_profile(staff_profile("manager", Some("c1"))).unwrap();
        let outsider = svc.create_profile(staff_profile("staff", Some("c2"))).unwrap();

        let err = svc
            .staff_action(&action(&outsider.id, "approve", &manager.id))
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[test]
    fn promotion_caps_at_two_managers() {
        let svc = test_service();
        let manager = svc.create_profile(staff_profile("manager", Some("c1"))).unwrap();
        let first = svc.create_profile(staff_profile("staff", Some("c1"))).unwrap();
        let second = svc.create_profile(staff_profile("staff", Some("c1"))).unwrap();

        let promoted = svc
            .staff_action(&action(&first.id, "promote", &manager.id))
            .unwrap();
        assert_eq!(promoted.role, "manager");

        let err = svc
            .staff_action(&action(&second.id, "promote", &manager.id))
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[test]
    fn demotion_never_removes_last_manager() {
        let svc = test_service();
        let solo = svc.create_profile(staff_profile("manager", Some("c1"))).unwrap();
        let err = svc
            .staff_action(&action(&solo.id, "demote", &solo.id))
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));

        // With a second manager in place, demotion works.
        let staff = svc.create_profile(staff_profile("staff", Some("c1"))).unwrap();
        svc.staff_action(&action(&staff.id, "promote", &solo.id)).unwrap();
        let demoted = svc
            .staff_action(&action(&solo.id, "demote", &staff.id))
            .unwrap();
        assert_eq!(demoted.role, "staff");
    }

    #[test]
    fn admin_acts_across_companies() {
        let svc = test_service();
        let admin = svc.create_profile(staff_profile("admin", None)).unwrap();
        let mut pending_input = staff_profile("staff", Some("c9"));
        pending_input.status = "pending_approval".to_string();
        let pending = svc.create_profile(pending_input).unwrap();

        let updated = svc
            .staff_action(&action(&pending.id, "approve", &admin.id))
            .unwrap();
        assert_eq!(updated.status, "active");
    }
}
