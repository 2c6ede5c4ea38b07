//! Contract action dispatch: a pure mapping from action names to
//! provider calls. No local state changes here — the next read-path
//! sync picks up whatever the provider did.

use reqwest::Method;
use serde_json::Value;

use crate::error::EsignError;
use crate::model::ActionRequest;
use crate::service::EsignService;

/// Documents extended through the UI get 30 more days.
const EXTEND_EXPIRY_MINUTES: i64 = 43200;

/// A provider call: method, path, optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Map an action name onto the provider endpoint that performs it.
pub fn action_call(
    action: &str,
    document_id: &str,
    message: Option<&str>,
) -> Result<ProviderCall, EsignError> {
    let call = match action {
        "cancel" => ProviderCall {
            method: Method::POST,
            path: format!("/documents/{}/request/cancellation", document_id),
            body: Some(serde_json::json!({
                "message": message.unwrap_or("canceled by requester"),
            })),
        },
        "remind" => ProviderCall {
            method: Method::POST,
            path: format!("/documents/{}/request/reminder", document_id),
            body: None,
        },
        // "delete" moves to the provider's trash; archive takes a batch.
        "delete" => ProviderCall {
            method: Method::PUT,
            path: "/documents/archive".to_string(),
            body: Some(serde_json::json!([document_id])),
        },
        "destroy" => ProviderCall {
            method: Method::DELETE,
            path: format!("/documents/{}", document_id),
            body: None,
        },
        "restore" => ProviderCall {
            method: Method::PUT,
            path: format!("/documents/{}/restore", document_id),
            body: None,
        },
        "permanent_delete" => ProviderCall {
            method: Method::DELETE,
            path: format!("/documents/{}/archive", document_id),
            body: None,
        },
        "extend_expiry" => ProviderCall {
            method: Method::PUT,
            path: format!("/documents/{}/expiry", document_id),
            body: Some(serde_json::json!({
                "configExpireMinute": EXTEND_EXPIRY_MINUTES,
                "configExpireReminderDay": 1,
            })),
        },
        other => {
            return Err(EsignError::Validation(format!(
                "unknown contract action: {}",
                other
            )));
        }
    };
    Ok(call)
}

impl EsignService {
    /// Execute a contract action for the resolved requester.
    pub async fn dispatch_action(
        &self,
        requester_raw: &str,
        req: &ActionRequest,
    ) -> Result<Value, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        let call = action_call(&req.action, &req.contract_id, req.message.as_deref())?;
        self.client
            .request(&account_id, call.method, &call.path, call.body.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_carries_message() {
        let call = action_call("cancel", "doc-1", Some("wrong tenant")).unwrap();
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.path, "/documents/doc-1/request/cancellation");
        assert_eq!(call.body.unwrap()["message"], "wrong tenant");

        let defaulted = action_call("cancel", "doc-1", None).unwrap();
        assert_eq!(defaulted.body.unwrap()["message"], "canceled by requester");
    }

    #[test]
    fn trash_is_a_batch_archive() {
        let call = action_call("delete", "doc-2", None).unwrap();
        assert_eq!(call.method, Method::PUT);
        assert_eq!(call.path, "/documents/archive");
        assert_eq!(call.body.unwrap(), serde_json::json!(["doc-2"]));
    }

    #[test]
    fn lifecycle_endpoints() {
        assert_eq!(
            action_call("remind", "d", None).unwrap().path,
            "/documents/d/request/reminder"
        );
        assert_eq!(action_call("destroy", "d", None).unwrap().method, Method::DELETE);
        assert_eq!(action_call("destroy", "d", None).unwrap().path, "/documents/d");
        assert_eq!(
            action_call("restore", "d", None).unwrap().path,
            "/documents/d/restore"
        );
        let permanent = action_call("permanent_delete", "d", None).unwrap();
        assert_eq!(permanent.method, Method::DELETE);
        assert_eq!(permanent.path, "/documents/d/archive");
    }

    #[test]
    fn extend_expiry_payload() {
        let call = action_call("extend_expiry", "doc-3", None).unwrap();
        assert_eq!(call.method, Method::PUT);
        assert_eq!(call.path, "/documents/doc-3/expiry");
        let body = call.body.unwrap();
        assert_eq!(body["configExpireMinute"], 43200);
        assert_eq!(body["configExpireReminderDay"], 1);
    }

    #[test]
    fn unknown_action_is_validation_error() {
        assert!(matches!(
            action_call("explode", "d", None).unwrap_err(),
            EsignError::Validation(_)
        ));
    }
}
