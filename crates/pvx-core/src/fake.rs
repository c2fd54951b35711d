//! In-memory [`ClusterClient`] used by the unit tests of this crate.
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pvx_model::{
    BackupJob, BackupJobUpdate, ContainerId, LogEntry, OperationKind, OperationRequest,
    ResourceEntry, Snapshot, StorageVolume, TaskHandle, TaskState,
};

use crate::client::{ClientError, ClusterClient};
use crate::config::OrchestratorConfig;
use crate::context::OpsContext;
use crate::waiter::TaskLogSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Submit { node: String, request: OperationRequest },
    Status { task: String },
    Log { task: String, start: u64 },
    Resources,
    Snapshots { node: String, id: ContainerId },
    ListJobs,
    GetJob(String),
    UpdateJob { id: String, update: BackupJobUpdate },
    StorageContent { node: String, storage: String },
    Upload { file: PathBuf, node: String, storage: String },
}

/// Scripted lifecycle of one job: the status sequence (last one repeats) and
/// the log, revealed a few lines per status poll.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedTask {
    states: VecDeque<TaskState>,
    log: Vec<LogEntry>,
    revealed: usize,
    per_poll: usize,
    overlap: bool,
}

impl ScriptedTask {
    pub(crate) fn new(states: Vec<TaskState>, log: Vec<LogEntry>) -> Self {
        Self {
            states: states.into(),
            log,
            revealed: 0,
            per_poll: usize::MAX,
            overlap: false,
        }
    }

    pub(crate) fn reveal_per_poll(mut self, n: usize) -> Self {
        self.per_poll = n;
        self
    }

    /// Also return the entry at `start` itself, as a sloppy server would.
    pub(crate) fn with_overlap(mut self) -> Self {
        self.overlap = true;
        self
    }

    fn finished(exit: &str) -> Self {
        Self::new(
            vec![
                TaskState::parse("running"),
                TaskState::parse(&format!("stopped:{exit}")),
            ],
            vec![LogEntry::new(1, "starting"), LogEntry::new(2, "done")],
        )
    }
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    resources: Vec<ResourceEntry>,
    snapshots: HashMap<ContainerId, Vec<Snapshot>>,
    failing_snapshots: HashSet<ContainerId>,
    jobs: BTreeMap<String, BackupJob>,
    volumes: Vec<StorageVolume>,
    rejected_ops: HashSet<(OperationKind, ContainerId)>,
    failed_ops: HashSet<(OperationKind, ContainerId)>,
    rejected_updates: HashSet<String>,
    scripted: VecDeque<ScriptedTask>,
    tasks: HashMap<String, ScriptedTask>,
    status_error: bool,
    upload_task: bool,
    next_task: u32,
}

#[derive(Default)]
pub(crate) struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_container(self, id: u32, node: &str, name: &str, status: &str) -> Self {
        self.with_resource(ResourceEntry {
            kind: Some("lxc".into()),
            vmid: Some(id as u64),
            node: Some(node.into()),
            name: Some(name.into()),
            status: Some(status.into()),
        })
    }

    pub(crate) fn with_resource(self, entry: ResourceEntry) -> Self {
        self.state.lock().unwrap().resources.push(entry);
        self
    }

    pub(crate) fn with_job(self, id: &str, exclude: &str) -> Self {
        let job: BackupJob = serde_json::from_value(serde_json::json!({
            "id": id,
            "starttime": "02:00",
            "exclude": exclude,
            "storage": "backup-nfs",
            "dow": "mon,tue,wed,thu,fri",
        }))
        .unwrap();
        self.state.lock().unwrap().jobs.insert(id.to_string(), job);
        self
    }

    pub(crate) fn with_snapshots(self, id: u32, names: &[(&str, &str)]) -> Self {
        let list = names
            .iter()
            .map(|(name, description)| Snapshot {
                name: name.to_string(),
                description: Some(description.to_string()),
                snaptime: None,
                parent: None,
            })
            .collect();
        self.state.lock().unwrap().snapshots.insert(cid(id), list);
        self
    }

    pub(crate) fn failing_snapshots(self, id: u32) -> Self {
        self.state.lock().unwrap().failing_snapshots.insert(cid(id));
        self
    }

    pub(crate) fn with_volume(self, volid: &str, content: &str, size: u64) -> Self {
        self.state.lock().unwrap().volumes.push(StorageVolume {
            volid: volid.into(),
            content: Some(content.into()),
            size: Some(size),
            format: None,
        });
        self
    }

    /// Submissions of `kind` for `id` are refused.
    pub(crate) fn reject(self, kind: OperationKind, id: u32) -> Self {
        self.state.lock().unwrap().rejected_ops.insert((kind, cid(id)));
        self
    }

    /// Submissions of `kind` for `id` finish with a non-OK exit status.
    pub(crate) fn fail(self, kind: OperationKind, id: u32) -> Self {
        self.state.lock().unwrap().failed_ops.insert((kind, cid(id)));
        self
    }

    pub(crate) fn reject_update(self, job: &str) -> Self {
        self.state.lock().unwrap().rejected_updates.insert(job.to_string());
        self
    }

    pub(crate) fn upload_returns_task(self) -> Self {
        self.state.lock().unwrap().upload_task = true;
        self
    }

    pub(crate) fn fail_status(&self) {
        self.state.lock().unwrap().status_error = true;
    }

    /// Register a scripted job and return its handle.
    pub(crate) fn script(&self, task: ScriptedTask) -> TaskHandle {
        let mut st = self.state.lock().unwrap();
        st.next_task += 1;
        let upid = format!("UPID:fake:{:08X}:scripted", st.next_task);
        st.tasks.insert(upid.clone(), task);
        TaskHandle::new(upid)
    }

    /// Use `task` for the next submission instead of the default script.
    pub(crate) fn script_next(&self, task: ScriptedTask) {
        self.state.lock().unwrap().scripted.push_back(task);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn submitted(&self) -> Vec<OperationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn updates(&self) -> Vec<(String, BackupJobUpdate)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateJob { id, update } => Some((id, update)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn job(&self, id: &str) -> Option<BackupJob> {
        self.state.lock().unwrap().jobs.get(id).cloned()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

pub(crate) fn cid(id: u32) -> ContainerId {
    ContainerId::new(id).unwrap()
}

fn rejected(body: &str) -> ClientError {
    ClientError::Rejected {
        status: 500,
        body: body.to_string(),
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn submit(&self, node: &str, request: &OperationRequest) -> Result<TaskHandle, ClientError> {
        self.record(Call::Submit {
            node: node.to_string(),
            request: request.clone(),
        });
        let mut st = self.state.lock().unwrap();
        let key = (request.kind(), request.id());
        if st.rejected_ops.contains(&key) {
            return Err(rejected("NOK: error code = 500"));
        }

        let task = match st.scripted.pop_front() {
            Some(task) => task,
            None if st.failed_ops.contains(&key) => ScriptedTask::finished("command failed: exit code 1"),
            None => ScriptedTask::finished("OK"),
        };
        st.next_task += 1;
        let upid = format!(
            "UPID:{node}:{:08X}:{}:{}:root@pam:",
            st.next_task,
            request.kind(),
            request.id()
        );
        st.tasks.insert(upid.clone(), task);
        Ok(TaskHandle::new(upid))
    }

    async fn task_status(&self, handle: &TaskHandle, _node: &str) -> Result<TaskState, ClientError> {
        self.record(Call::Status {
            task: handle.to_string(),
        });
        let mut st = self.state.lock().unwrap();
        if st.status_error {
            return Err(ClientError::Transport("connection reset".into()));
        }
        let task = st
            .tasks
            .get_mut(handle.as_str())
            .ok_or_else(|| rejected("no such task"))?;

        task.revealed = task.revealed.saturating_add(task.per_poll).min(task.log.len());
        let state = if task.states.len() > 1 {
            task.states.pop_front()
        } else {
            task.states.front().cloned()
        };
        state.ok_or_else(|| ClientError::Decode("empty script".into()))
    }

    async fn task_log(
        &self,
        handle: &TaskHandle,
        _node: &str,
        start: u64,
        limit: u32,
    ) -> Result<Vec<LogEntry>, ClientError> {
        self.record(Call::Log {
            task: handle.to_string(),
            start,
        });
        let st = self.state.lock().unwrap();
        let task = st
            .tasks
            .get(handle.as_str())
            .ok_or_else(|| rejected("no such task"))?;

        Ok(task.log[..task.revealed]
            .iter()
            .filter(|e| {
                if task.overlap {
                    e.sequence >= start
                } else {
                    e.sequence > start
                }
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn cluster_resources(&self) -> Result<Vec<ResourceEntry>, ClientError> {
        self.record(Call::Resources);
        Ok(self.state.lock().unwrap().resources.clone())
    }

    async fn list_snapshots(&self, node: &str, id: ContainerId) -> Result<Vec<Snapshot>, ClientError> {
        self.record(Call::Snapshots {
            node: node.to_string(),
            id,
        });
        let st = self.state.lock().unwrap();
        if st.failing_snapshots.contains(&id) {
            return Err(rejected("snapshot listing failed"));
        }
        let mut list = st.snapshots.get(&id).cloned().unwrap_or_default();
        list.push(Snapshot {
            name: "current".into(),
            description: Some("You are here!".into()),
            snaptime: None,
            parent: None,
        });
        Ok(list)
    }

    async fn list_backup_jobs(&self) -> Result<Vec<BackupJob>, ClientError> {
        self.record(Call::ListJobs);
        Ok(self.state.lock().unwrap().jobs.values().cloned().collect())
    }

    async fn get_backup_job(&self, id: &str) -> Result<BackupJob, ClientError> {
        self.record(Call::GetJob(id.to_string()));
        self.state
            .lock()
            .unwrap()
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| rejected("no such job"))
    }

    async fn update_backup_job(&self, id: &str, update: &BackupJobUpdate) -> Result<(), ClientError> {
        self.record(Call::UpdateJob {
            id: id.to_string(),
            update: update.clone(),
        });
        let mut st = self.state.lock().unwrap();
        if st.rejected_updates.contains(id) {
            return Err(rejected("update refused"));
        }
        let job = st.jobs.get_mut(id).ok_or_else(|| rejected("no such job"))?;
        job.exclude = update.exclude.clone();
        Ok(())
    }

    async fn list_storage_content(
        &self,
        node: &str,
        storage: &str,
    ) -> Result<Vec<StorageVolume>, ClientError> {
        self.record(Call::StorageContent {
            node: node.to_string(),
            storage: storage.to_string(),
        });
        Ok(self.state.lock().unwrap().volumes.clone())
    }

    async fn upload_template(
        &self,
        file: &Path,
        node: &str,
        storage: &str,
    ) -> Result<Option<TaskHandle>, ClientError> {
        self.record(Call::Upload {
            file: file.to_path_buf(),
            node: node.to_string(),
            storage: storage.to_string(),
        });
        let returns_task = self.state.lock().unwrap().upload_task;
        if returns_task {
            Ok(Some(self.script(ScriptedTask::finished("OK"))))
        } else {
            Ok(None)
        }
    }
}

/// Sink collecting replayed lines for assertions.
#[derive(Default)]
pub(crate) struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
    rejections: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().map(|e| e.text.clone()).collect()
    }

    pub(crate) fn sequences(&self) -> Vec<u64> {
        self.entries.lock().unwrap().iter().map(|e| e.sequence).collect()
    }

    pub(crate) fn rejections(&self) -> Vec<String> {
        self.rejections.lock().unwrap().clone()
    }
}

impl TaskLogSink for RecordingSink {
    fn entry(&self, _task: &TaskHandle, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }

    fn rejected(&self, error: &ClientError) {
        self.rejections.lock().unwrap().push(error.to_string());
    }
}

/// Context with no poll delay and a recording sink.
pub(crate) fn test_context(fake: Arc<FakeCluster>, sink: Arc<RecordingSink>) -> OpsContext {
    let config = OrchestratorConfig {
        poll_interval_ms: 0,
        ..OrchestratorConfig::default()
    };
    OpsContext::new(fake, config).with_log_sink(sink)
}
