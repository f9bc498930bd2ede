//! The five gateway operations, parsed from the query string

/// One requested operation with its validated query input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List { path: String },
    Delete { path: String },
    Upload,
    Mkdir { dir: String },
    Domain,
}

impl Operation {
    /// Parse `operate` and its parameters; `None` when no known operation
    /// was requested. A repeated parameter keeps its first value.
    pub fn from_params(params: &[(String, String)]) -> Option<Self> {
        let first = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let param = |key: &str| first(key).unwrap_or_default().to_string();

        let operation = match first("operate")? {
            "list" => {
                let path = param("path");
                Operation::List {
                    path: if path.is_empty() { "/".to_string() } else { path },
                }
            }
            "delete" => Operation::Delete {
                path: param("path"),
            },
            "upload" => Operation::Upload,
            "mkdir" => Operation::Mkdir { dir: param("dir") },
            "domain" => Operation::Domain,
            _ => return None,
        };
        Some(operation)
    }

    /// Value of `operate` selecting this operation
    pub fn name(&self) -> &'static str {
        match self {
            Operation::List { .. } => "list",
            Operation::Delete { .. } => "delete",
            Operation::Upload => "upload",
            Operation::Mkdir { .. } => "mkdir",
            Operation::Domain => "domain",
        }
    }

    /// Prefix of the envelope message when the operation fails
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Operation::List { .. } => "ErrorList:",
            Operation::Delete { .. } => "ErrorDelete:",
            Operation::Upload => "ErrorUpload:",
            Operation::Mkdir { .. } => "ErrorMkdir:",
            Operation::Domain => "ErrorDomain:",
        }
    }
}
