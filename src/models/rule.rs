use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Extension,
    Date,
    Content,
}

impl RuleType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "extension" => Some(RuleType::Extension),
            "date" => Some(RuleType::Date),
            "content" => Some(RuleType::Content),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Extension => "extension",
            RuleType::Date => "date",
            RuleType::Content => "content",
        }
    }
}

/// A user-authored classification/placement rule. `parent_id` nests it under another rule for
/// destination-path purposes; the forest must stay acyclic (enforced at write time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    pub priority: i64,
    pub rule_type: RuleType,
    pub value: String,
    pub folder_name: String,
    pub parent_id: Option<i64>,
}

/// `extension -> category`. Merged over the built-in extension map; built-in wins on collision
/// at insertion time (rejected at write), but always wins at read regardless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomExtension {
    pub id: i64,
    pub extension: String,
    pub category: String,
}

/// A user-defined category with a keyword list used both as an embedding prototype seed and as
/// tag candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCategory {
    pub id: i64,
    pub name: String,
    pub keywords: Vec<String>,
}
