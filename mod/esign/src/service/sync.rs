//! Contract read-path sync and the on-demand completion workflow.
//!
//! The provider is the source of truth for document status and name;
//! the cache rows add the local overlay (`propertyId`, `filePath`).
//! The completion workflow is non-transactional on purpose: every step
//! is attempted, failures are logged, and the response reports which
//! steps landed.

use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::EsignError;
use crate::model::{ContractRecord, SyncRequest, SyncSummary};
use crate::service::EsignService;
use realdesk_core::now_rfc3339;

/// Provider document id, whichever key the endpoint used.
pub(crate) fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("documentId")
        .or_else(|| doc.get("id"))
        .and_then(|v| v.as_str())
}

fn doc_status(doc: &Value) -> Option<&str> {
    doc.get("status").and_then(|v| v.as_str())
}

fn doc_name(doc: &Value) -> Option<&str> {
    doc.get("name")
        .or_else(|| doc.get("documentName"))
        .and_then(|v| v.as_str())
}

/// Pull the document array out of a provider list response. List
/// endpoints wrap it differently depending on the API generation.
pub(crate) fn documents_from(json: &Value) -> Vec<Value> {
    if let Some(arr) = json.as_array() {
        return arr.clone();
    }
    for key in ["list", "documents"] {
        if let Some(arr) = json.get(key).and_then(|v| v.as_array()) {
            return arr.clone();
        }
    }
    if let Some(result) = json.get("result") {
        if let Some(arr) = result.as_array() {
            return arr.clone();
        }
        if let Some(arr) = result.get("list").and_then(|v| v.as_array()) {
            return arr.clone();
        }
    }
    Vec::new()
}

/// Merge the provider's view with the refreshed local rows, keyed by
/// document id. Provider documents come first; a matching local row
/// overlays the keys it owns (`propertyId`, `filePath`). Local rows
/// the provider no longer lists are kept as-is. Sorted by `createdAt`
/// descending.
pub fn merge_contracts(provider: &[Value], local: &[ContractRecord]) -> Vec<Value> {
    let mut merged: Vec<Value> = provider.to_vec();

    for record in local {
        let position = merged
            .iter()
            .position(|doc| doc_id(doc) == Some(record.document_id.as_str()));
        match position {
            Some(i) => {
                if let Some(obj) = merged[i].as_object_mut() {
                    if let Some(property_id) = &record.property_id {
                        obj.insert("propertyId".to_string(), Value::String(property_id.clone()));
                    }
                    if let Some(file_key) = &record.file_key {
                        obj.insert("filePath".to_string(), Value::String(file_key.clone()));
                    }
                }
            }
            None => {
                if let Ok(value) = serde_json::to_value(record) {
                    merged.push(value);
                }
            }
        }
    }

    merged.sort_by(|a, b| {
        let a_created = a.get("createdAt").and_then(|v| v.as_str()).unwrap_or("");
        let b_created = b.get("createdAt").and_then(|v| v.as_str()).unwrap_or("");
        b_created.cmp(a_created)
    });
    merged
}

impl EsignService {
    /// `GET /contracts` — the provider list with local overlays, after
    /// eagerly re-validating every cached row against the live
    /// document.
    pub async fn list_contracts(
        &self,
        requester_raw: &str,
        status: Option<&str>,
    ) -> Result<Vec<Value>, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;

        let path = match status {
            Some(status) => format!("/documents?status={}", status),
            None => "/documents".to_string(),
        };
        let listing = self.client.request(&account_id, Method::GET, &path, None).await?;
        let provider_docs = documents_from(&listing);

        let mut locals = self.cached_contracts(&account_id)?;
        for record in &mut locals {
            if record.document_id.is_empty() {
                continue;
            }
            match self.refresh_cached_row(&account_id, record).await {
                Ok(()) => {}
                Err(e) => {
                    // Stale cache beats a failed request.
                    warn!(document = %record.document_id, error = %e, "per-document refresh failed, using cached row");
                }
            }
        }

        Ok(merge_contracts(&provider_docs, &locals))
    }

    /// `GET /contracts/{id}` — live document detail, refreshing the
    /// cached row as a side effect.
    pub async fn contract_detail(
        &self,
        requester_raw: &str,
        document_id: &str,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        let doc = self
            .client
            .request(&account_id, Method::GET, &format!("/documents/{}", document_id), None)
            .await?;

        if let Some(mut record) = self.cached_contract(&account_id, document_id)? {
            let changed = apply_doc(&mut record, &doc);
            if changed {
                self.save_cached_contract(&mut record)?;
            }
        }
        Ok(doc)
    }

    /// `POST /contracts/sync` — the on-demand completion workflow.
    pub async fn sync_contract(
        &self,
        requester_raw: &str,
        req: &SyncRequest,
    ) -> Result<SyncSummary, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        let document_id = req.contract_id.as_str();

        // Step 1: latest status/name onto the cached row.
        let doc = self
            .client
            .request(&account_id, Method::GET, &format!("/documents/{}", document_id), None)
            .await?;

        let mut record = match self.cached_contract(&account_id, document_id)? {
            Some(record) => record,
            None => self.insert_cached_contract(
                &account_id,
                document_id,
                doc_name(&doc).unwrap_or("untitled"),
                doc_status(&doc).unwrap_or("on_going"),
                None,
            )?,
        };

        let mut summary = SyncSummary::default();
        if apply_doc(&mut record, &doc) {
            self.save_cached_contract(&mut record)?;
            summary.status_updated = true;
        }
        summary.status = record.status.clone();

        if record.status != "completed" {
            return Ok(summary);
        }

        // Step 2: fetch and persist the signed PDF once.
        if record.file_key.is_none() {
            match self.download_and_store(&account_id, &mut record).await {
                Ok(()) => summary.file_saved = true,
                Err(e) => {
                    warn!(document = %document_id, error = %e, "signed file download failed");
                }
            }
        } else {
            summary.file_saved = true;
        }

        // Step 3: stamp the linked property.
        if let (Some(property_id), Some(file_key)) =
            (record.property_id.clone(), record.file_key.clone())
        {
            match self
                .office
                .mark_property_contract_completed(&property_id, document_id, &file_key)
            {
                Ok(()) => summary.property_linked = true,
                Err(e) => {
                    warn!(document = %document_id, property = %property_id, error = %e, "property completion update failed");
                }
            }
        }

        info!(
            document = %document_id,
            status = %summary.status,
            file_saved = summary.file_saved,
            property_linked = summary.property_linked,
            "contract sync finished"
        );
        Ok(summary)
    }

    async fn refresh_cached_row(
        &self,
        account_id: &str,
        record: &mut ContractRecord,
    ) -> Result<(), EsignError> {
        let doc = self
            .client
            .request(
                account_id,
                Method::GET,
                &format!("/documents/{}", record.document_id),
                None,
            )
            .await?;
        if apply_doc(record, &doc) {
            self.save_cached_contract(record)?;
        }
        Ok(())
    }

    async fn download_and_store(
        &self,
        account_id: &str,
        record: &mut ContractRecord,
    ) -> Result<(), EsignError> {
        let link = self
            .client
            .request(
                account_id,
                Method::GET,
                &format!("/documents/{}/download", record.document_id),
                None,
            )
            .await?;
        let url = download_url(&link)
            .ok_or_else(|| EsignError::Upstream("download response carried no url".into()))?;

        let bytes = self.client.fetch_file(url).await?;
        let key = format!("contracts/{}.pdf", record.document_id);
        self.blob
            .put(&key, &bytes)
            .map_err(|e| EsignError::Storage(e.to_string()))?;

        record.file_key = Some(key);
        record.downloaded_at = Some(now_rfc3339());
        self.save_cached_contract(record)?;
        Ok(())
    }
}

/// Copy the provider-owned fields onto the cached row. Returns whether
/// anything changed.
fn apply_doc(record: &mut ContractRecord, doc: &Value) -> bool {
    let mut changed = false;
    if let Some(status) = doc_status(doc)
        && status != record.status
    {
        record.status = status.to_string();
        changed = true;
    }
    if let Some(name) = doc_name(doc)
        && name != record.name
    {
        record.name = name.to_string();
        changed = true;
    }
    changed
}

fn download_url(json: &Value) -> Option<&str> {
    json.get("url")
        .or_else(|| json.get("downloadUrl"))
        .or_else(|| json.get("result").and_then(|r| r.get("url")))
        .and_then(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use realdesk_core::new_id;

    fn local(document_id: &str, created_at: &str) -> ContractRecord {
        ContractRecord {
            id: new_id(),
            user_id: "u1".to_string(),
            company_id: None,
            document_id: document_id.to_string(),
            status: "on_going".to_string(),
            name: "Cached".to_string(),
            property_id: None,
            file_key: None,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
            downloaded_at: None,
        }
    }

    #[test]
    fn overlay_wins_on_local_keys_only() {
        let provider = vec![serde_json::json!({
            "documentId": "doc-1",
            "status": "completed",
            "name": "Provider Name",
            "createdAt": "2026-01-02T00:00:00+00:00",
        })];
        let mut record = local("doc-1", "2026-01-01T00:00:00+00:00");
        record.property_id = Some("prop-9".to_string());
        record.file_key = Some("contracts/doc-1.pdf".to_string());

        let merged = merge_contracts(&provider, &[record]);
        assert_eq!(merged.len(), 1);
        // Provider owns status/name; local owns the overlay keys.
        assert_eq!(merged[0]["status"], "completed");
        assert_eq!(merged[0]["name"], "Provider Name");
        assert_eq!(merged[0]["propertyId"], "prop-9");
        assert_eq!(merged[0]["filePath"], "contracts/doc-1.pdf");
    }

    #[test]
    fn local_only_rows_survive_the_merge() {
        let provider = vec![serde_json::json!({
            "documentId": "doc-1",
            "createdAt": "2026-01-01T00:00:00+00:00",
        })];
        let merged = merge_contracts(&provider, &[local("doc-2", "2026-01-03T00:00:00+00:00")]);
        assert_eq!(merged.len(), 2);
        // Sorted newest first, so the local-only row leads.
        assert_eq!(merged[0]["documentId"], "doc-2");
        assert_eq!(merged[1]["documentId"], "doc-1");
    }

    #[test]
    fn merge_sorts_created_at_descending() {
        let provider = vec![
            serde_json::json!({"documentId": "a", "createdAt": "2026-01-01T00:00:00+00:00"}),
            serde_json::json!({"documentId": "b", "createdAt": "2026-03-01T00:00:00+00:00"}),
            serde_json::json!({"documentId": "c", "createdAt": "2026-02-01T00:00:00+00:00"}),
        ];
        let merged = merge_contracts(&provider, &[]);
        let order: Vec<&str> = merged.iter().filter_map(doc_id).collect();
        assert_eq!(order, ["b", "c", "a"]);
    }

    #[test]
    fn overlay_without_local_fields_changes_nothing() {
        let provider = vec![serde_json::json!({
            "documentId": "doc-1",
            "status": "on_going",
            "createdAt": "2026-01-01T00:00:00+00:00",
        })];
        let merged = merge_contracts(&provider, &[local("doc-1", "2026-01-01T00:00:00+00:00")]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].get("propertyId").is_none());
        assert!(merged[0].get("filePath").is_none());
    }

    #[test]
    fn apply_doc_tracks_provider_fields() {
        let mut record = local("doc-1", "2026-01-01T00:00:00+00:00");
        assert!(!apply_doc(
            &mut record,
            &serde_json::json!({"status": "on_going", "name": "Cached"})
        ));
        assert!(apply_doc(
            &mut record,
            &serde_json::json!({"status": "completed", "name": "Renamed"})
        ));
        assert_eq!(record.status, "completed");
        assert_eq!(record.name, "Renamed");
    }

    #[test]
    fn list_response_shapes() {
        let flat = serde_json::json!([{"documentId": "a"}]);
        assert_eq!(documents_from(&flat).len(), 1);
        let wrapped = serde_json::json!({"list": [{"documentId": "a"}, {"documentId": "b"}]});
        assert_eq!(documents_from(&wrapped).len(), 2);
        let nested = serde_json::json!({"result": {"list": [{"documentId": "a"}]}});
        assert_eq!(documents_from(&nested).len(), 1);
        assert!(documents_from(&serde_json::json!({"msg": "ok"})).is_empty());
    }

    #[test]
    fn download_url_shapes() {
        assert_eq!(
            download_url(&serde_json::json!({"url": "https://x/1"})),
            Some("https://x/1")
        );
        assert_eq!(
            download_url(&serde_json::json!({"result": {"url": "https://x/2"}})),
            Some("https://x/2")
        );
        assert_eq!(download_url(&serde_json::json!({})), None);
    }
}
