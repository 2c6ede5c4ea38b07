use serde::{Deserialize, Serialize};

/// The tenant-scoped entity families sharing one CRUD surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Property,
    Customer,
    Schedule,
    BusinessCard,
    Notice,
    Template,
}

impl EntityKind {
    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Property => "properties",
            EntityKind::Customer => "customers",
            EntityKind::Schedule => "schedules",
            EntityKind::BusinessCard => "business_cards",
            EntityKind::Notice => "notices",
            EntityKind::Template => "templates",
        }
    }

    /// Singular label used in audit entries and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Property => "property",
            EntityKind::Customer => "customer",
            EntityKind::Schedule => "schedule",
            EntityKind::BusinessCard => "business card",
            EntityKind::Notice => "notice",
            EntityKind::Template => "template",
        }
    }

    /// Whether creation leaves an audit trail entry in `schedules`.
    pub fn audited(&self) -> bool {
        matches!(self, EntityKind::Property | EntityKind::Customer)
    }

    pub const ALL: [EntityKind; 6] = [
        EntityKind::Property,
        EntityKind::Customer,
        EntityKind::Schedule,
        EntityKind::BusinessCard,
        EntityKind::Notice,
        EntityKind::Template,
    ];
}

/// A stored entity: a fixed envelope of ownership and status columns
/// around a schemaless `data` document. Only the envelope is ever
/// interpreted server-side; `data` belongs to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,

    /// Tenant the record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Account that created the record (the "manager" of it).
    pub manager_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Schemaless payload.
    #[serde(default)]
    pub data: serde_json::Value,

    pub created_at: String,
    pub updated_at: String,
}

impl Record {
    /// Truthy `isSystem` flag, meaningful for templates only.
    pub fn is_system(&self) -> bool {
        self.data
            .get("isSystem")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
