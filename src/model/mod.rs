pub mod activity;
pub mod attendance;
pub mod employee;
pub mod ledger;
pub mod profile;
pub mod user;
pub mod workplace;

/// Anything kept in a store table keyed by a numeric id.
pub trait Record {
    fn id(&self) -> u64;
}
