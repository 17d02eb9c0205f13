pub mod domain;
pub mod ids;

pub use domain::DomainType;
