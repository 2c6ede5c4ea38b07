mod contract;

pub use contract::{ActionRequest, ContractRecord, CreateFromTemplateRequest, SyncRequest, SyncSummary};
