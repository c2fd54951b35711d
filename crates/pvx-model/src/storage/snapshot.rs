use serde::{Deserialize, Serialize};

use crate::SNAPSHOT_CURRENT;

/// Named point-in-time state of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snaptime: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Snapshot {
    /// The `current` entry describes the live state, not a real snapshot.
    pub fn is_current(&self) -> bool {
        self.name == SNAPSHOT_CURRENT
    }

    /// Description folded onto one line.
    pub fn summary(&self) -> String {
        self.description
            .as_deref()
            .unwrap_or_default()
            .replace('\n', " ")
            .trim_end()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::Snapshot;

    #[test]
    fn current_is_detected() {
        let list: Vec<Snapshot> = serde_json::from_str(
            r#"[{"name":"current","description":"You are here!","parent":"pvxsnap1"},
                {"name":"pvxsnap1","description":"snapshot taken\nby pvx\n","snaptime":1520000000}]"#,
        )
        .unwrap();
        assert!(list[0].is_current());
        assert!(!list[1].is_current());
        assert_eq!(list[1].summary(), "snapshot taken by pvx");
    }

    #[test]
    fn missing_description_is_empty_summary() {
        let s = Snapshot {
            name: "s".into(),
            description: None,
            snaptime: None,
            parent: None,
        };
        assert_eq!(s.summary(), "");
    }
}
