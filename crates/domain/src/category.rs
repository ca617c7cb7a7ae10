use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification bucket a domain can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ban,
    Sanction,
}

impl Category {
    /// Checker responses are tested against categories in this order.
    pub const ALL: [Category; 2] = [Category::Ban, Category::Sanction];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ban => "ban",
            Self::Sanction => "sanction",
        }
    }

    /// Comment line written at the top of a freshly created fragment file.
    pub fn fragment_header(&self) -> String {
        format!("\n\n# hosts file which contains {} domains:\n", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
