//! Public property briefing links.
//!
//! A link is an unauthenticated view onto one property, with sensitive
//! fields stripped and the address masked. Expiry is checked on every
//! fetch; expired links answer 410, unknown tokens 404.

use realdesk_sql::Value;

use auth::service::guard;

use crate::model::{CreateShareLink, Record, ShareLink};
use crate::service::{OfficeError, OfficeService};
use realdesk_core::{merge_patch, new_id, now_rfc3339};

const DEFAULT_EXPIRES_IN_DAYS: i64 = 7;

/// Mask an address to its first two space-separated segments.
pub(crate) fn mask_address(address: &str) -> String {
    let kept: Vec<&str> = address.split_whitespace().take(2).collect();
    if kept.is_empty() {
        "***".to_string()
    } else {
        format!("{} ***", kept.join(" "))
    }
}

fn link_indexes(link: &ShareLink) -> [(&'static str, Value); 7] {
    [
        ("token", Value::Text(link.token.clone())),
        ("property_id", Value::Text(link.property_id.clone())),
        ("consultant_id", Value::Text(link.consultant_id.clone())),
        ("expires_at", Value::Text(link.expires_at.clone())),
        ("view_count", Value::Integer(link.view_count)),
        ("created_at", Value::Text(link.created_at.clone())),
        ("updated_at", Value::Text(link.updated_at.clone())),
    ]
}

impl OfficeService {
    /// Create a briefing link for a property the requester can see.
    pub fn create_share_link(
        &self,
        requester_raw: &str,
        req: &CreateShareLink,
    ) -> Result<ShareLink, OfficeError> {
        let requester = self.require_requester(requester_raw)?;

        // The property must exist and be in scope.
        self.get_entity(requester_raw, crate::model::EntityKind::Property, &req.property_id)?;

        let days = req.expires_in_days.unwrap_or(DEFAULT_EXPIRES_IN_DAYS).max(1);
        let expires_at = (chrono::Utc::now() + chrono::Duration::days(days)).to_rfc3339();

        let now = now_rfc3339();
        let link = ShareLink {
            id: new_id(),
            token: new_id(),
            property_id: req.property_id.clone(),
            consultant_id: requester.id.clone(),
            expires_at,
            view_count: 0,
            options: req.options.clone().unwrap_or_else(|| serde_json::json!({})),
            created_at: now.clone(),
            updated_at: now,
        };

        self.insert_record("share_links", &link.id, &link, &link_indexes(&link))?;
        Ok(link)
    }

    /// The requester's own links (admin sees all).
    pub fn list_share_links(&self, requester_raw: &str) -> Result<Vec<ShareLink>, OfficeError> {
        let requester = self.require_requester(requester_raw)?;
        if guard::is_admin(&requester) {
            self.list_records("share_links", &[])
        } else {
            self.list_records(
                "share_links",
                &[("consultant_id", Value::Text(requester.id.clone()))],
            )
        }
    }

    /// Patch a link's display options.
    pub fn update_share_link(
        &self,
        requester_raw: &str,
        link_id: &str,
        options_patch: &serde_json::Value,
    ) -> Result<ShareLink, OfficeError> {
        let mut link = self.owned_share_link(requester_raw, link_id)?;
        merge_patch(&mut link.options, options_patch);
        link.updated_at = now_rfc3339();
        self.update_record("share_links", &link.id.clone(), &link, &link_indexes(&link))?;
        Ok(link)
    }

    /// Force-expire a link immediately.
    pub fn expire_share_link(
        &self,
        requester_raw: &str,
        link_id: &str,
    ) -> Result<ShareLink, OfficeError> {
        let mut link = self.owned_share_link(requester_raw, link_id)?;
        link.expires_at = now_rfc3339();
        link.updated_at = link.expires_at.clone();
        self.update_record("share_links", &link.id.clone(), &link, &link_indexes(&link))?;
        Ok(link)
    }

    /// Public fetch by token. Counts the view and returns the masked
    /// property document plus the consultant's contact card.
    pub fn fetch_share_link(&self, token: &str) -> Result<serde_json::Value, OfficeError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM share_links WHERE token = ?1",
                &[Value::Text(token.to_string())],
            )
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
        let data = rows
            .first()
            .and_then(|r| r.get_str("data"))
            .ok_or_else(|| OfficeError::NotFound("briefing link".into()))?;
        let mut link: ShareLink =
            serde_json::from_str(data).map_err(|e| OfficeError::Internal(e.to_string()))?;

        let expired = chrono::DateTime::parse_from_rfc3339(&link.expires_at)
            .map(|t| t <= chrono::Utc::now())
            .unwrap_or(true);
        if expired {
            return Err(OfficeError::Gone("briefing link has expired".into()));
        }

        link.view_count += 1;
        link.updated_at = now_rfc3339();
        self.update_record("share_links", &link.id.clone(), &link, &link_indexes(&link))?;

        let property: Record = self.get_record("properties", &link.property_id)?;
        let view = self.masked_property_view(&property, &link)?;
        Ok(view)
    }

    fn owned_share_link(
        &self,
        requester_raw: &str,
        link_id: &str,
    ) -> Result<ShareLink, OfficeError> {
        let requester = self.require_requester(requester_raw)?;
        let link: ShareLink = self.get_record("share_links", link_id)?;
        if !guard::is_admin(&requester) && link.consultant_id != requester.id {
            return Err(OfficeError::NotFound("briefing link".into()));
        }
        Ok(link)
    }

    fn masked_property_view(
        &self,
        property: &Record,
        link: &ShareLink,
    ) -> Result<serde_json::Value, OfficeError> {
        let hide_address = link
            .options
            .get("hideAddress")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let show_briefing_price = link
            .options
            .get("showBriefingPrice")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let mut data = property.data.clone();
        if let Some(obj) = data.as_object_mut() {
            obj.remove("ownerContact");
            obj.remove("tenantContact");
            obj.remove("earnings");

            match obj.get("address").and_then(|v| v.as_str()) {
                Some(addr) if hide_address => {
                    let masked = mask_address(addr);
                    obj.insert("address".to_string(), serde_json::Value::String(masked));
                }
                _ => {}
            }

            if show_briefing_price
                && let Some(briefing) = obj.get("briefingPrice").cloned()
            {
                obj.insert("price".to_string(), briefing);
            }
        }

        // Consultant contact card, best-effort on a deleted account.
        let consultant = match self.auth.get_profile(&link.consultant_id) {
            Ok(profile) => serde_json::json!({
                "name": profile.name,
                "email": profile.email,
                "mobile": profile.mobile,
            }),
            Err(_) => serde_json::Value::Null,
        };

        Ok(serde_json::json!({
            "property": data,
            "consultant": consultant,
            "viewCount": link.view_count,
            "expiresAt": link.expires_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::mask_address;
    use crate::model::{CreateShareLink, EntityKind};
    use crate::service::OfficeError;
    use crate::service::test_support::{make_user, test_env};

    fn create_link_req(property_id: &str, options: serde_json::Value) -> CreateShareLink {
        CreateShareLink {
            property_id: property_id.to_string(),
            expires_in_days: None,
            options: Some(options),
        }
    }

    #[test]
    fn address_masking() {
        assert_eq!(mask_address("123 Main St Apt 4"), "123 Main ***");
        assert_eq!(mask_address("Seoul"), "Seoul ***");
        assert_eq!(mask_address(""), "***");
    }

    #[test]
    fn public_fetch_masks_and_counts() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let property = env
            .office
            .create_entity(
                &alice,
                EntityKind::Property,
                serde_json::json!({
                    "address": "123 Main St Apt 4",
                    "price": 500000,
                    "briefingPrice": 480000,
                    "ownerContact": "010-0000-0000",
                    "tenantContact": "010-1111-1111",
                    "earnings": 12000,
                }),
            )
            .unwrap();

        let link = env
            .office
            .create_share_link(
                &alice,
                &create_link_req(
                    &property.id,
                    serde_json::json!({"hideAddress": true, "showBriefingPrice": true}),
                ),
            )
            .unwrap();

        let view = env.office.fetch_share_link(&link.token).unwrap();
        let prop = &view["property"];
        assert_eq!(prop["address"], "123 Main ***");
        assert_eq!(prop["price"], 480000);
        assert!(prop.get("ownerContact").is_none());
        assert!(prop.get("tenantContact").is_none());
        assert!(prop.get("earnings").is_none());
        assert_eq!(view["viewCount"], 1);
        assert_eq!(view["consultant"]["name"], "Office User");

        // Second fetch increments again.
        let view = env.office.fetch_share_link(&link.token).unwrap();
        assert_eq!(view["viewCount"], 2);
    }

    #[test]
    fn options_off_keep_full_address_and_price() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let property = env
            .office
            .create_entity(
                &alice,
                EntityKind::Property,
                serde_json::json!({"address": "123 Main St Apt 4", "price": 500000, "briefingPrice": 1}),
            )
            .unwrap();
        let link = env
            .office
            .create_share_link(&alice, &create_link_req(&property.id, serde_json::json!({})))
            .unwrap();

        let view = env.office.fetch_share_link(&link.token).unwrap();
        assert_eq!(view["property"]["address"], "123 Main St Apt 4");
        assert_eq!(view["property"]["price"], 500000);
    }

    #[test]
    fn unknown_token_is_not_found_and_expired_is_gone() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let property = env
            .office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"address": "x"}))
            .unwrap();
        let link = env
            .office
            .create_share_link(&alice, &create_link_req(&property.id, serde_json::json!({})))
            .unwrap();

        assert!(matches!(
            env.office.fetch_share_link("no-such-token").unwrap_err(),
            OfficeError::NotFound(_)
        ));

        env.office.expire_share_link(&alice, &link.id).unwrap();
        assert!(matches!(
            env.office.fetch_share_link(&link.token).unwrap_err(),
            OfficeError::Gone(_)
        ));
    }

    #[test]
    fn links_are_owned_by_their_consultant() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let mallory = make_user(&env.auth, "staff", Some("c1"));
        let property = env
            .office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"address": "x"}))
            .unwrap();
        let link = env
            .office
            .create_share_link(&alice, &create_link_req(&property.id, serde_json::json!({})))
            .unwrap();

        assert_eq!(env.office.list_share_links(&alice).unwrap().len(), 1);
        assert!(env.office.list_share_links(&mallory).unwrap().is_empty());
        assert!(env
            .office
            .expire_share_link(&mallory, &link.id)
            .is_err());

        let updated = env
            .office
            .update_share_link(&alice, &link.id, &serde_json::json!({"hideAddress": true}))
            .unwrap();
        assert_eq!(updated.options["hideAddress"], true);
    }

    #[test]
    fn link_requires_visible_property() {
        let env = test_env();
        let alice = make_user(&env.auth, "staff", Some("c1"));
        let bob = make_user(&env.auth, "staff", Some("c2"));
        let property = env
            .office
            .create_entity(&alice, EntityKind::Property, serde_json::json!({"address": "x"}))
            .unwrap();

        assert!(env
            .office
            .create_share_link(&bob, &create_link_req(&property.id, serde_json::json!({})))
            .is_err());
    }
}
