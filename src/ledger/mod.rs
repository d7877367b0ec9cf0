//! Ledger entity models, the composite read-model, and the in-memory ledger.

pub mod account;
pub mod category;
pub mod composite;
#[allow(clippy::module_inception)]
pub mod ledger;

pub use account::{Account, AccountRecord};
pub use category::{Category, CategoryRecord};
pub use composite::CompositeNode;
pub use ledger::Ledger;
