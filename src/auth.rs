//! Capability boundary for the export endpoint.
//! Role resolution lives outside this crate; callers hand us the role.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub trait Capability {
    fn can_export(&self) -> bool;
    fn label(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Manager,
    Teacher,
    Student,
}

impl Capability for Role {
    fn can_export(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    fn label(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}
