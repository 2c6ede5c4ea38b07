//! Generic company-scoped CRUD over the entity tables.
//!
//! The envelope columns (`company_id`, `manager_id`, `status`) are the
//! only thing the server interprets; the rest of each record is an
//! opaque document owned by the frontend.

use realdesk_sql::Value;
use tracing::warn;

use auth::model::RequesterProfile;
use auth::service::guard::{self, ResourceScope};

use crate::model::{EntityKind, Record};
use crate::service::{OfficeError, OfficeService};
use realdesk_core::{merge_patch, new_id, now_rfc3339};

fn scope_of(record: &Record) -> ResourceScope {
    ResourceScope {
        company_id: record.company_id.clone(),
        owner_id: Some(record.manager_id.clone()),
    }
}

impl OfficeService {
    /// List records of one kind visible to the requester. Admins see
    /// everything; everyone else sees their company's rows, or their
    /// own when they have no company.
    pub fn list_entities(
        &self,
        requester_raw: &str,
        kind: EntityKind,
        status: Option<&str>,
    ) -> Result<Vec<Record>, OfficeError> {
        let requester = self.require_requester(requester_raw)?;

        let mut filters: Vec<(&str, Value)> = Vec::new();
        if !guard::is_admin(&requester) {
            match &requester.company_id {
                Some(company) => filters.push(("company_id", Value::Text(company.clone()))),
                None => filters.push(("manager_id", Value::Text(requester.id.clone()))),
            }
        }
        if let Some(status) = status {
            filters.push(("status", Value::Text(status.to_string())));
        }

        self.list_records(kind.table(), &filters)
    }

    /// Fetch one record; out-of-scope rows read as 404, not 403, so
    /// record ids don't leak across tenants.
    pub fn get_entity(
        &self,
        requester_raw: &str,
        kind: EntityKind,
        id: &str,
    ) -> Result<Record, OfficeError> {
        let requester = self.require_requester(requester_raw)?;
        let record: Record = self.get_record(kind.table(), id)?;
        if !guard::can_access_resource(&requester, &scope_of(&record)) {
            return Err(OfficeError::NotFound(format!("{}/{}", kind.table(), id)));
        }
        Ok(record)
    }

    /// Create a record from a frontend document. Ownership is taken
    /// from the resolved requester, never from the payload.
    pub fn create_entity(
        &self,
        requester_raw: &str,
        kind: EntityKind,
        data: serde_json::Value,
    ) -> Result<Record, OfficeError> {
        let requester = self.require_requester(requester_raw)?;

        let status = data
            .get("status")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let now = now_rfc3339();
        let record = Record {
            id: new_id(),
            company_id: requester.company_id.clone(),
            manager_id: requester.id.clone(),
            status,
            data,
            created_at: now.clone(),
            updated_at: now,
        };

        self.write_entity_row(kind, &record, true)?;

        if kind.audited()
            && let Err(e) = self.append_audit_entry(&requester, kind, &record)
        {
            // Audit trail is best-effort; the create itself stands.
            warn!(kind = kind.label(), id = %record.id, error = %e, "audit entry failed");
        }

        Ok(record)
    }

    /// JSON merge-patch update of the `data` document. The envelope
    /// `status` column follows `data.status` when patched.
    pub fn update_entity(
        &self,
        requester_raw: &str,
        kind: EntityKind,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<Record, OfficeError> {
        let requester = self.require_requester(requester_raw)?;
        let mut record: Record = self.get_record(kind.table(), id)?;
        if !guard::can_access_resource(&requester, &scope_of(&record)) {
            return Err(OfficeError::NotFound(format!("{}/{}", kind.table(), id)));
        }
        if kind == EntityKind::Template && record.is_system() {
            return Err(OfficeError::Forbidden(
                "system templates cannot be modified".into(),
            ));
        }

        merge_patch(&mut record.data, patch);
        record.status = record
            .data
            .get("status")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        record.updated_at = now_rfc3339();

        self.write_entity_row(kind, &record, false)?;
        Ok(record)
    }

    /// Delete a record (guarded; system templates refuse).
    pub fn delete_entity(
        &self,
        requester_raw: &str,
        kind: EntityKind,
        id: &str,
    ) -> Result<(), OfficeError> {
        let requester = self.require_requester(requester_raw)?;
        let record: Record = self.get_record(kind.table(), id)?;
        if !guard::can_access_resource(&requester, &scope_of(&record)) {
            return Err(OfficeError::NotFound(format!("{}/{}", kind.table(), id)));
        }
        if kind == EntityKind::Template && record.is_system() {
            return Err(OfficeError::Forbidden(
                "system templates cannot be deleted".into(),
            ));
        }
        self.delete_record(kind.table(), id)
    }

    /// Append a completed-contract entry to a property's document
    /// (deduplicated by contract id) and flip its status. Used by the
    /// contract completion flow.
    pub fn mark_property_contract_completed(
        &self,
        property_id: &str,
        contract_id: &str,
        file_key: &str,
    ) -> Result<(), OfficeError> {
        let mut record: Record = self.get_record("properties", property_id)?;

        if !record.data.is_object() {
            record.data = serde_json::json!({});
        }
        let obj = record
            .data
            .as_object_mut()
            .ok_or_else(|| OfficeError::Internal("property data is not an object".into()))?;
        let contracts = obj
            .entry("contracts")
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if !contracts.is_array() {
            *contracts = serde_json::Value::Array(Vec::new());
        }
        let entries = contracts
            .as_array_mut()
            .ok_or_else(|| OfficeError::Internal("property contracts is not an array".into()))?;

        let already = entries
            .iter()
            .any(|e| e.get("contractId").and_then(|v| v.as_str()) == Some(contract_id));
        if !already {
            entries.push(serde_json::json!({
                "contractId": contract_id,
                "fileKey": file_key,
                "completedAt": now_rfc3339(),
            }));
        }

        record.status = Some("contract_completed".to_string());
        record.updated_at = now_rfc3339();
        self.write_entity_row(EntityKind::Property, &record, false)
    }

    fn write_entity_row(
        &self,
        kind: EntityKind,
        record: &Record,
        insert: bool,
    ) -> Result<(), OfficeError> {
        let indexes = [
            ("company_id", match &record.company_id {
                Some(id) => Value::Text(id.clone()),
                None => Value::Null,
            }),
            ("manager_id", Value::Text(record.manager_id.clone())),
            ("status", match &record.status {
                Some(s) => Value::Text(s.clone()),
                None => Value::Null,
            }),
            ("created_at", Value::Text(record.created_at.clone())),
            ("updated_at", Value::Text(record.updated_at.clone())),
        ];
        if insert {
            self.insert_record(kind.table(), &record.id, record, &indexes)
        } else {
            self.update_record(kind.table(), &record.id, record, &indexes)
        }
    }

    fn append_audit_entry(
        &self,
        requester: &RequesterProfile,
        kind: EntityKind,
        created: &Record,
    ) -> Result<(), OfficeError> {
        let now = now_rfc3339();
        let entry = Record {
            id: new_id(),
            company_id: requester.company_id.clone(),
            manager_id: requester.id.clone(),
            status: None,
            data: serde_json::json!({
                "kind": "audit",
                "title": format!("{} created", kind.label()),
                "entityId": created.id,
                "entityKind": kind.label(),
            }),
            created_at: now.clone(),
            updated_at: now,
        };
        self.write_entity_row(EntityKind::Schedule, &entry, true)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::EntityKind;
    use crate::service::OfficeError;
    use crate::service::test_support::{make_user, test_env};

    #[test]
    fn crud_roundtrip_scoped_to_company() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let bob = make_user(&env.auth, "staff", Some("c2"));

        let created = env
            .office
            .create_entity(
                &alice,
                EntityKind::Property,
                serde_json::json!({"address": "123 Main St Apt 4", "status": "listed"}),
            )
            .unwrap();
        assert_eq!(created.company_id.as_deref(), Some("c1"));
        assert_eq!(created.manager_id, alice);
        assert_eq!(created.status.as_deref(), Some("listed"));

        // Same company sees it; another company reads 404.
        assert_eq!(env.office.list_entities(&alice, EntityKind::Property, None).unwrap().len(), 1);
        assert!(env.office.list_entities(&bob, EntityKind::Property, None).unwrap().is_empty());
        let err = env
            .office
            .get_entity(&bob, EntityKind::Property, &created.id)
            .unwrap_err();
        assert!(matches!(err, OfficeError::NotFound(_)));

        let updated = env
            .office
            .update_entity(
                &alice,
                EntityKind::Property,
                &created.id,
                &serde_json::json!({"status": "sold", "price": 450000}),
            )
            .unwrap();
        assert_eq!(updated.status.as_deref(), Some("sold"));
        assert_eq!(updated.data["address"], "123 Main St Apt 4");
        assert_eq!(updated.data["price"], 450000);

        env.office
            .delete_entity(&alice, EntityKind::Property, &created.id)
            .unwrap();
        assert!(env
            .office
            .get_entity(&alice, EntityKind::Property, &created.id)
            .is_err());
    }

    #[test]
    fn property_creation_leaves_audit_schedule() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));

        env.office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"address": "x"}))
            .unwrap();

        let schedules = env
            .office
            .list_entities(&alice, EntityKind::Schedule, None)
            .unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].data["kind"], "audit");
        assert_eq!(schedules[0].data["entityKind"], "property");
    }

    #[test]
    fn notice_creation_leaves_no_audit() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        env.office
            .create_entity(&alice, EntityKind::Notice, serde_json::json!({"title": "hi"}))
            .unwrap();
        assert!(env
            .office
            .list_entities(&alice, EntityKind::Schedule, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn admin_sees_all_companies() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let bob = make_user(&env.auth, "staff", Some("c2"));
        let admin = make_user(&env.auth, "admin", None);

        env.office
            .create_entity(&alice, EntityKind::Customer, serde_json::json!({"name": "a"}))
            .unwrap();
        env.office
            .create_entity(&bob, EntityKind::Customer, serde_json::json!({"name": "b"}))
            .unwrap();

        assert_eq!(env.office.list_entities(&admin, EntityKind::Customer, None).unwrap().len(), 2);
    }

    #[test]
    fn companyless_user_sees_own_rows_only() {
        let env = test_env();
        let floating = make_user(&env.auth, "staff", None);
        let other = make_user(&env.auth, "staff", None);

        env.office
            .create_entity(&floating, EntityKind::Schedule, serde_json::json!({"title": "mine"}))
            .unwrap();
        env.office
            .create_entity(&other, EntityKind::Schedule, serde_json::json!({"title": "theirs"}))
            .unwrap();

        let mine = env
            .office
            .list_entities(&floating, EntityKind::Schedule, None)
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].data["title"], "mine");
    }

    #[test]
    fn status_filter_applies() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        env.office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"status": "listed"}))
            .unwrap();
        env.office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"status": "sold"}))
            .unwrap();

        let sold = env
            .office
            .list_entities(&alice, EntityKind::Property, Some("sold"))
            .unwrap();
        assert_eq!(sold.len(), 1);
        assert_eq!(sold[0].status.as_deref(), Some("sold"));
    }

    #[test]
    fn system_templates_are_immutable() {
        let env = test_env();
        let admin = make_user(&env.auth, "admin", None);
        let system = env
            .office
            .create_entity(
                &admin,
                EntityKind::Template,
                serde_json::json!({"name": "standard lease", "isSystem": true}),
            )
            .unwrap();

        let err = env
            .office
            .update_entity(&admin, EntityKind::Template, &system.id, &serde_json::json!({"name": "x"}))
            .unwrap_err();
        assert!(matches!(err, OfficeError::Forbidden(_)));
        let err = env
            .office
            .delete_entity(&admin, EntityKind::Template, &system.id)
            .unwrap_err();
        assert!(matches!(err, OfficeError::Forbidden(_)));

        // User templates stay editable.
        let mine = env
            .office
            .create_entity(&admin, EntityKind::Template, serde_json::json!({"name": "mine"}))
            .unwrap();
        env.office
            .update_entity(&admin, EntityKind::Template, &mine.id, &serde_json::json!({"name": "renamed"}))
            .unwrap();
        env.office
            .delete_entity(&admin, EntityKind::Template, &mine.id)
            .unwrap();
    }

    #[test]
    fn completion_appends_once_and_flips_status() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let property = env
            .office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"address": "x"}))
            .unwrap();

        env.office
            .mark_property_contract_completed(&property.id, "doc-1", "contracts/doc-1.pdf")
            .unwrap();
        // Re-running the flow must not duplicate the entry.
        env.office
            .mark_property_contract_completed(&property.id, "doc-1", "contracts/doc-1.pdf")
            .unwrap();

        let reloaded = env
            .office
            .get_entity(&alice, EntityKind::Property, &property.id)
            .unwrap();
        let contracts = reloaded.data["contracts"].as_array().unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0]["contractId"], "doc-1");
        assert_eq!(contracts[0]["fileKey"], "contracts/doc-1.pdf");
        assert_eq!(reloaded.status.as_deref(), Some("contract_completed"));
    }
}
