use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, trace};

use pvx_core::{ClientError, ClusterClient};
use pvx_model::{
    BackupJob, BackupJobUpdate, ContainerId, LogEntry, OperationRequest, ResourceEntry, Snapshot,
    StorageVolume, TaskHandle, TaskState,
};

use crate::auth::Ticket;
use crate::config::ClusterConfig;
use crate::envelope::decode;
use crate::error::ConfigError;
use crate::request::{Method, SubmitRequest};

#[derive(Debug, Deserialize)]
struct TaskStatusPayload {
    status: String,
    #[serde(default)]
    exitstatus: Option<String>,
}

/// Authenticated Proxmox VE API client.
#[derive(Debug, Clone)]
pub struct ProxmoxClient {
    http: Client,
    base: Url,
    ticket: Ticket,
}

impl ProxmoxClient {
    /// Build the HTTP client and obtain an auth ticket.
    #[instrument(level = "debug", skip(cfg), fields(endpoint = %cfg.endpoint, user = %cfg.username))]
    pub async fn connect(cfg: &ClusterConfig) -> Result<Self, ClientError> {
        cfg.validate().map_err(config_error)?;
        let base = cfg.base_url().map_err(config_error)?;
        let http = Client::builder()
            .timeout(cfg.timeout())
            .danger_accept_invalid_certs(cfg.insecure_tls)
            .build()
            .map_err(|e| config_error(ConfigError::Client(e.to_string())))?;

        let url = join(&base, &["access", "ticket"])?;
        let form = [
            ("username", cfg.username.as_str()),
            ("password", cfg.password.as_str()),
            ("realm", cfg.realm.as_str()),
        ];
        let resp = http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(transport)?;
        let ticket: Ticket = decode(resp).await.map_err(|e| match e {
            ClientError::Rejected { status, .. } => {
                ClientError::Auth(format!("ticket request refused with status {status}"))
            }
            other => other,
        })?;
        debug!("cluster ticket obtained");

        Ok(Self { http, base, ticket })
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let url = join(&self.base, segments)?;
        trace!(method = ?method, url = %url, "api call");
        let mut req = self
            .http
            .request(method.into(), url)
            .header(reqwest::header::COOKIE, self.ticket.cookie());
        if method.is_write() {
            req = req.header(Ticket::CSRF_HEADER, self.ticket.csrf());
        }
        Ok(req)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let resp = self
            .request(Method::Get, segments)?
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }

    async fn send_form<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        form: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut req = self.request(method, segments)?;
        if !form.is_empty() {
            req = req.form(form);
        }
        let resp = req.send().await.map_err(transport)?;
        decode(resp).await
    }
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::Decode(format!("endpoint {base} cannot be a base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn transport(e: reqwest::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

fn config_error(e: ConfigError) -> ClientError {
    ClientError::Transport(e.to_string())
}

#[async_trait]
impl ClusterClient for ProxmoxClient {
    async fn submit(&self, node: &str, request: &OperationRequest) -> Result<TaskHandle, ClientError> {
        let call = SubmitRequest::for_operation(node, request);
        let segments: Vec<&str> = call.path.iter().map(String::as_str).collect();
        let upid: String = self.send_form(call.method, &segments, &call.form).await?;
        debug!(op = %request.kind(), id = %request.id(), task = %upid, "job submitted");
        Ok(TaskHandle::new(upid))
    }

    async fn task_status(&self, handle: &TaskHandle, node: &str) -> Result<TaskState, ClientError> {
        let payload: TaskStatusPayload = self
            .get(&["nodes", node, "tasks", handle.as_str(), "status"], &[])
            .await?;
        Ok(TaskState::from_parts(&payload.status, payload.exitstatus.as_deref()))
    }

    async fn task_log(
        &self,
        handle: &TaskHandle,
        node: &str,
        start: u64,
        limit: u32,
    ) -> Result<Vec<LogEntry>, ClientError> {
        self.get(
            &["nodes", node, "tasks", handle.as_str(), "log"],
            &[("start", start.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn cluster_resources(&self) -> Result<Vec<ResourceEntry>, ClientError> {
        self.get(&["cluster", "resources"], &[("type", "vm".to_string())])
            .await
    }

    async fn list_snapshots(&self, node: &str, id: ContainerId) -> Result<Vec<Snapshot>, ClientError> {
        let id = id.to_string();
        self.get(&["nodes", node, "lxc", &id, "snapshot"], &[]).await
    }

    async fn list_backup_jobs(&self) -> Result<Vec<BackupJob>, ClientError> {
        self.get(&["cluster", "backup"], &[]).await
    }

    async fn get_backup_job(&self, id: &str) -> Result<BackupJob, ClientError> {
        self.get(&["cluster", "backup", id], &[]).await
    }

    async fn update_backup_job(&self, id: &str, update: &BackupJobUpdate) -> Result<(), ClientError> {
        let mut form = Vec::with_capacity(2);
        if let Some(starttime) = &update.starttime {
            form.push(("starttime", starttime.clone()));
        }
        form.push(("exclude", update.exclude.to_string()));

        let _: serde_json::Value = self
            .send_form(Method::Put, &["cluster", "backup", id], &form)
            .await?;
        Ok(())
    }

    async fn list_storage_content(
        &self,
        node: &str,
        storage: &str,
    ) -> Result<Vec<StorageVolume>, ClientError> {
        self.get(&["nodes", node, "storage", storage, "content"], &[])
            .await
    }

    #[instrument(level = "debug", skip(self, file), fields(file = %file.display()))]
    async fn upload_template(
        &self,
        file: &Path,
        node: &str,
        storage: &str,
    ) -> Result<Option<TaskHandle>, ClientError> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Io(format!("not a file path: {}", file.display())))?
            .to_string();
        let handle = tokio::fs::File::open(file).await?;
        let len = handle.metadata().await?.len();

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), len)
            .file_name(file_name);
        let form = Form::new().text("content", "vztmpl").part("filename", part);

        let resp = self
            .request(Method::Post, &["nodes", node, "storage", storage, "upload"])?
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let upid: Option<String> = decode(resp).await?;
        Ok(upid.map(TaskHandle::new))
    }
}
