//! Landing-page counters, scoped like every list: the requester's
//! company, or everything for admins.

use realdesk_sql::Value;
use serde::Serialize;

use auth::service::guard;

use crate::service::{OfficeError, OfficeService};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub properties: usize,
    pub customers: usize,
    pub schedules: usize,
    pub contracts_in_progress: usize,
}

impl OfficeService {
    pub fn dashboard(&self, requester_raw: &str) -> Result<DashboardCounts, OfficeError> {
        let requester = self.require_requester(requester_raw)?;

        let scope: Vec<(&str, Value)> = if guard::is_admin(&requester) {
            Vec::new()
        } else {
            match &requester.company_id {
                Some(company) => vec![("company_id", Value::Text(company.clone()))],
                None => vec![("manager_id", Value::Text(requester.id.clone()))],
            }
        };

        Ok(DashboardCounts {
            properties: self.count_records("properties", &scope)?,
            customers: self.count_records("customers", &scope)?,
            schedules: self.count_records("schedules", &scope)?,
            contracts_in_progress: self.count_contracts_in_progress(&requester),
        })
    }

    /// Statuses that end a contract's life. Everything else counts as
    /// in progress on the dashboard.
    const TERMINAL_STATUSES: &'static str =
        "('completed', 'canceled', 'rejected', 'trash', 'expired', 'deleted')";

    /// Contracts live in the e-signature module's table. It may not be
    /// present when that module is disabled, so failures read as zero.
    fn count_contracts_in_progress(&self, requester: &auth::model::RequesterProfile) -> usize {
        let (scope_sql, params): (&str, Vec<Value>) = if guard::is_admin(requester) {
            ("", Vec::new())
        } else if let Some(company) = &requester.company_id {
            ("company_id = ?1 AND ", vec![Value::Text(company.clone())])
        } else {
            ("user_id = ?1 AND ", vec![Value::Text(requester.id.clone())])
        };
        let sql = format!(
            "SELECT COUNT(*) AS cnt FROM contracts WHERE {}LOWER(status) NOT IN {}",
            scope_sql,
            Self::TERMINAL_STATUSES
        );

        self.sql
            .query(&sql, &params)
            .ok()
            .and_then(|rows| rows.first().and_then(|r| r.get_i64("cnt")))
            .unwrap_or(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use realdesk_sql::Value;

    use crate::model::EntityKind;
    use crate::service::test_support::{make_user, test_env};

    #[test]
    fn counts_are_company_scoped() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let bob = make_user(&env.auth, "staff", Some("c2"));

        env.office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"address": "a"}))
            .unwrap();
        env.office
            .create_entity(&alice, EntityKind::Customer, serde_json::json!({"name": "x"}))
            .unwrap();
        env.office
            .create_entity(&bob, EntityKind::Property, serde_json::json!({"address": "b"}))
            .unwrap();

        let counts = env.office.dashboard(&alice).unwrap();
        assert_eq!(counts.properties, 1);
        assert_eq!(counts.customers, 1);
        // Property + customer creation each left an audit schedule.
        assert_eq!(counts.schedules, 2);
        // No contracts table rows; the counter degrades to zero.
        assert_eq!(counts.contracts_in_progress, 0);

        let admin = make_user(&env.auth, "admin", None);
        let all = env.office.dashboard(&admin).unwrap();
        assert_eq!(all.properties, 2);
    }

    #[test]
    fn contract_counter_skips_terminal_statuses() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));

        env.office
            .sql
            .exec(
                "CREATE TABLE contracts (id TEXT PRIMARY KEY, user_id TEXT,
                 company_id TEXT, status TEXT, data TEXT)",
                &[],
            )
            .unwrap();
        let statuses = [
            ("k1", "on_going"),
            ("k2", "WAITING"),
            ("k3", "completed"),
            ("k4", "canceled"),
            ("k5", "rejected"),
            ("k6", "trash"),
            ("k7", "expired"),
            ("k8", "deleted"),
        ];
        for (id, status) in statuses {
            env.office
                .sql
                .exec(
                    "INSERT INTO contracts (id, user_id, company_id, status, data)
                     VALUES (?1, ?2, 'c1', ?3, '{}')",
                    &[
                        Value::Text(id.to_string()),
                        Value::Text(alice.clone()),
                        Value::Text(status.to_string()),
                    ],
                )
                .unwrap();
        }

        // Only on_going and WAITING survive; matching is case-blind.
        let counts = env.office.dashboard(&alice).unwrap();
        assert_eq!(counts.contracts_in_progress, 2);
    }
}
