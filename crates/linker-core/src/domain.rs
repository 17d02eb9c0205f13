use serde::{Deserialize, Serialize};

/// Domain layers a sub-task reads from or writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DomainType {
    Code,
    Ticket,
    Cross,
}

impl std::fmt::Display for DomainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code => write!(f, "CODE"),
            Self::Ticket => write!(f, "TICKET"),
            Self::Cross => write!(f, "CROSS"),
        }
    }
}

impl std::str::FromStr for DomainType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CODE" => Ok(Self::Code),
            "TICKET" => Ok(Self::Ticket),
            "CROSS" => Ok(Self::Cross),
            other => Err(format!("unknown domain type: {other}")),
        }
    }
}
