use pvx_model::{ContainerId, OperationRequest};

/// HTTP verb of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Writes carry the CSRF token.
    pub fn is_write(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// API call that starts an asynchronous job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub method: Method,
    /// Path segments below the API base.
    pub path: Vec<String>,
    pub form: Vec<(&'static str, String)>,
}

impl SubmitRequest {
    /// Map an operation on `node` to its endpoint.
    pub fn for_operation(node: &str, request: &OperationRequest) -> Self {
        let lxc = |id: &ContainerId, rest: &[&str]| -> Vec<String> {
            let mut path = vec!["nodes".to_string(), node.to_string(), "lxc".to_string(), id.to_string()];
            path.extend(rest.iter().map(|s| s.to_string()));
            path
        };

        match request {
            OperationRequest::Stop { id } => Self {
                method: Method::Post,
                path: lxc(id, &["status", "stop"]),
                form: Vec::new(),
            },
            OperationRequest::Destroy { id } => Self {
                method: Method::Delete,
                path: lxc(id, &[]),
                form: Vec::new(),
            },
            OperationRequest::SnapshotCreate {
                id,
                name,
                description,
            } => Self {
                method: Method::Post,
                path: lxc(id, &["snapshot"]),
                form: vec![("snapname", name.clone()), ("description", description.clone())],
            },
            OperationRequest::SnapshotDelete { id, name } => Self {
                method: Method::Delete,
                path: lxc(id, &["snapshot", name.as_str()]),
                form: Vec::new(),
            },
            OperationRequest::Backup { id, storage, mode } => Self {
                method: Method::Post,
                path: vec!["nodes".into(), node.to_string(), "vzdump".into()],
                form: vec![
                    ("all", "0".into()),
                    ("compress", "1".into()),
                    ("storage", storage.clone()),
                    ("remove", "1".into()),
                    ("pigz", "1".into()),
                    ("mode", mode.as_str().into()),
                    ("lockwait", "5".into()),
                    ("vmid", id.to_string()),
                ],
            },
            OperationRequest::Restore {
                id,
                archive,
                storage,
            } => Self {
                method: Method::Post,
                path: vec!["nodes".into(), node.to_string(), "lxc".into()],
                form: vec![
                    ("vmid", id.to_string()),
                    ("ostemplate", archive.clone()),
                    ("force", "1".into()),
                    ("restore", "1".into()),
                    ("storage", storage.clone()),
                ],
            },
        }
    }
}
