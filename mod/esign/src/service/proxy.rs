//! Thin resolved-identity proxies onto the provider API. Each call
//! resolves the requester, forwards, and returns the provider's JSON.

use reqwest::Method;
use serde_json::Value;

use crate::error::EsignError;
use crate::model::CreateFromTemplateRequest;
use crate::service::EsignService;
use crate::service::sync::doc_id;

impl EsignService {
    /// `POST /contracts/create-from-template` — create a document and
    /// seed a cache row for it.
    pub async fn create_from_template(
        &self,
        requester_raw: &str,
        req: &CreateFromTemplateRequest,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;

        let mut body = serde_json::json!({
            "templateId": req.template_id,
            "documentName": req.document_name,
        });
        if let (Some(obj), Some(extra)) = (body.as_object_mut(), req.payload.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }

        let created = self
            .client
            .request(
                &account_id,
                Method::POST,
                "/documents/create-with-template",
                Some(&body),
            )
            .await?;

        // The cached row is what carries the optional property link.
        if let Some(document_id) = doc_id(&created).or_else(|| {
            created
                .get("result")
                .and_then(|r| r.get("documentId"))
                .and_then(|v| v.as_str())
        }) {
            self.insert_cached_contract(
                &account_id,
                document_id,
                &req.document_name,
                "on_going",
                req.property_id.clone(),
            )?;
        }

        Ok(created)
    }

    /// `GET /contracts/download?contractId=` — signed-file link.
    pub async fn download_link(
        &self,
        requester_raw: &str,
        document_id: &str,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        self.client
            .request(
                &account_id,
                Method::GET,
                &format!("/documents/{}/download", document_id),
                None,
            )
            .await
    }

    /// Folder management passthroughs.
    pub async fn list_folders(&self, requester_raw: &str) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        self.client
            .request(&account_id, Method::GET, "/folders", None)
            .await
    }

    pub async fn create_folder(
        &self,
        requester_raw: &str,
        body: &Value,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        self.client
            .request(&account_id, Method::POST, "/folders", Some(body))
            .await
    }

    pub async fn folder_documents(
        &self,
        requester_raw: &str,
        folder_id: &str,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        self.client
            .request(
                &account_id,
                Method::GET,
                &format!("/folders/{}/documents", folder_id),
                None,
            )
            .await
    }

    /// `GET /contracts/templates` — the provider's template list,
    /// flattened to the array the frontend picks template ids from.
    pub async fn list_templates(&self, requester_raw: &str) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        let response = self
            .client
            .request(
                &account_id,
                Method::GET,
                "/templates?currentPage=1&limit=10",
                None,
            )
            .await?;
        Ok(template_list_from(&response))
    }

    /// Points balance and history passthroughs.
    pub async fn points_balance(&self, requester_raw: &str) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        self.client
            .request(&account_id, Method::GET, "/point/balance", None)
            .await
    }

    pub async fn points_history(
        &self,
        requester_raw: &str,
        kind: &str,
    ) -> Result<Value, EsignError> {
        if !matches!(kind, "charge" | "usage") {
            return Err(EsignError::Validation(format!(
                "unknown points history kind: {}",
                kind
            )));
        }
        let account_id = self.resolve_account(requester_raw)?;
        self.client
            .request(
                &account_id,
                Method::GET,
                &format!("/point/{}/history", kind),
                None,
            )
            .await
    }

    /// Embedding sessions: the provider hands back a short-lived URL
    /// for an iframe. Every variant requires a `redirectUrl` in the
    /// body, checked here so a bad request never reaches the provider.
    pub async fn sign_embedding(
        &self,
        requester_raw: &str,
        body: &Value,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        require_redirect_url(body)?;
        let response = self
            .client
            .request(
                &account_id,
                Method::POST,
                "/embedding/sign-creating",
                Some(body),
            )
            .await?;
        Ok(embedding_url_from(response))
    }

    pub async fn view_embedding(
        &self,
        requester_raw: &str,
        document_id: &str,
        body: &Value,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        require_redirect_url(body)?;
        let response = self
            .client
            .request(
                &account_id,
                Method::POST,
                &format!("/embedding/view/{}", document_id),
                Some(body),
            )
            .await?;
        Ok(embedding_url_from(response))
    }

    pub async fn template_create_embedding(
        &self,
        requester_raw: &str,
        body: &Value,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        require_redirect_url(body)?;
        let response = self
            .client
            .request(
                &account_id,
                Method::POST,
                "/embedding/template-creating",
                Some(body),
            )
            .await?;
        Ok(embedding_url_from(response))
    }

    pub async fn template_modify_embedding(
        &self,
        requester_raw: &str,
        document_id: &str,
        body: &Value,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        require_redirect_url(body)?;
        let response = self
            .client
            .request(
                &account_id,
                Method::POST,
                &format!("/embedding/template-modifying/{}", document_id),
                Some(body),
            )
            .await?;
        Ok(embedding_url_from(response))
    }
}

fn require_redirect_url(body: &Value) -> Result<(), EsignError> {
    match body.get("redirectUrl").and_then(|v| v.as_str()) {
        Some(url) if !url.is_empty() => Ok(()),
        _ => Err(EsignError::Validation("redirectUrl is required".into())),
    }
}

/// The embedding endpoints answer `{msg, result: {url, expiration}, code}`
/// but occasionally put the url at the top level.
fn embedding_url_from(response: Value) -> Value {
    match response.get("result") {
        Some(result) if !result.is_null() => result.clone(),
        _ => response,
    }
}

/// Template listings nest the array one level deeper than documents.
fn template_list_from(response: &Value) -> Value {
    response
        .pointer("/result/record/list")
        .or_else(|| response.pointer("/result/list"))
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}
