mod record;
mod settings;
mod share_link;

pub use record::{EntityKind, Record};
pub use settings::AppSettings;
pub use share_link::{CreateShareLink, ShareLink};
