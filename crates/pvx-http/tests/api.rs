//! Runs [`ProxmoxClient`] against an in-process fake of the Proxmox API.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use pvx_core::{ClientError, ClusterClient, ClusterStateCache, ContainerOrchestrator, OpsContext, OrchestratorConfig};
use pvx_http::{ClusterConfig, ProxmoxClient};
use pvx_model::{
    BackupJobUpdate, BackupMode, ContainerId, ExcludeSet, OperationRequest, TaskHandle,
};

const TICKET: &str = "PVE:root@pam:65A1B2C3::c2lnbmF0dXJl==";
const COOKIE: &str = "PVEAuthCookie=PVE%3Aroot@pam%3A65A1B2C3%3A%3Ac2lnbmF0dXJl%3D%3D";
const CSRF: &str = "65A1B2C3:csrf";

#[derive(Default)]
struct Recorded {
    forms: Vec<(String, HashMap<String, String>)>,
    log_queries: Vec<HashMap<String, String>>,
    uploads: Vec<Bytes>,
}

type Shared = Arc<Mutex<Recorded>>;

fn authorized(headers: &HeaderMap, write: bool) -> bool {
    let cookie = headers.get("cookie").and_then(|v| v.to_str().ok()) == Some(COOKIE);
    let csrf = headers.get("CSRFPreventionToken").and_then(|v| v.to_str().ok()) == Some(CSRF);
    cookie && (!write || csrf)
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

fn denied() -> Response {
    (StatusCode::UNAUTHORIZED, "permission denied - invalid PVE ticket").into_response()
}

async fn ticket(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("password").map(String::as_str) != Some("secret") {
        return (StatusCode::UNAUTHORIZED, "authentication failure").into_response();
    }
    assert_eq!(form.get("realm").map(String::as_str), Some("pam"));
    data(json!({ "ticket": TICKET, "CSRFPreventionToken": CSRF, "username": "root@pam" }))
}

async fn resources(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers, false) {
        return denied();
    }
    assert_eq!(q.get("type").map(String::as_str), Some("vm"));
    data(json!([
        { "type": "lxc", "vmid": 6101, "node": "pve1", "name": "web01", "status": "running", "maxmem": 536870912 },
        { "type": "qemu", "vmid": 100, "node": "pve1", "name": "vm", "status": "running" },
        { "type": "lxc", "vmid": 6102, "node": "pve2", "name": "db01", "status": "stopped" }
    ]))
}

async fn stop(
    State(rec): State<Shared>,
    headers: HeaderMap,
    Path((node, id)): Path<(String, u32)>,
) -> Response {
    if !authorized(&headers, true) {
        return denied();
    }
    rec.lock().unwrap().forms.push((format!("stop:{node}:{id}"), HashMap::new()));
    data(json!(format!("UPID:{node}:0000A1B2:00C3D4E5:65A1B2C3:vzstop:{id}:root@pam:")))
}

async fn destroy(headers: HeaderMap, Path((_node, id)): Path<(String, u32)>) -> Response {
    if !authorized(&headers, true) {
        return denied();
    }
    (StatusCode::INTERNAL_SERVER_ERROR, format!("CT {id} is locked (backup)")).into_response()
}

async fn vzdump(
    State(rec): State<Shared>,
    headers: HeaderMap,
    Path(node): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers, true) {
        return denied();
    }
    let id = form.get("vmid").cloned().unwrap_or_default();
    rec.lock().unwrap().forms.push((format!("vzdump:{node}"), form));
    data(json!(format!("UPID:{node}:0000A1B3:00C3D4E6:65A1B2C4:vzdump:{id}:root@pam:")))
}

async fn task_status(headers: HeaderMap, Path((_node, upid)): Path<(String, String)>) -> Response {
    if !authorized(&headers, false) {
        return denied();
    }
    assert!(upid.starts_with("UPID:"));
    data(json!({ "status": "stopped", "exitstatus": "OK", "upid": upid }))
}

async fn task_log(
    State(rec): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers, false) {
        return denied();
    }
    let start: u64 = q.get("start").and_then(|s| s.parse().ok()).unwrap_or(0);
    rec.lock().unwrap().log_queries.push(q);
    let lines: Vec<Value> = (1..=3u64)
        .filter(|n| *n > start)
        .map(|n| json!({ "n": n, "t": format!("line {n}") }))
        .collect();
    data(Value::Array(lines))
}

async fn backup_jobs(headers: HeaderMap) -> Response {
    if !authorized(&headers, false) {
        return denied();
    }
    data(json!([
        { "id": "backup-a1b2", "starttime": "02:30", "exclude": "950", "storage": "nfs", "enabled": 1 },
        { "id": "backup-c3d4", "starttime": "04:00", "storage": "nfs" }
    ]))
}

async fn update_job(
    State(rec): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers, true) {
        return denied();
    }
    rec.lock().unwrap().forms.push((format!("job:{id}"), form));
    data(Value::Null)
}

async fn upload(
    State(rec): State<Shared>,
    headers: HeaderMap,
    Path((node, _storage)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    if !authorized(&headers, true) {
        return denied();
    }
    rec.lock().unwrap().uploads.push(body);
    data(json!(format!("UPID:{node}:0000A1B4:00C3D4E7:65A1B2C5:imgcopy::root@pam:")))
}

async fn serve() -> (String, Shared) {
    let rec = Shared::default();
    let app = Router::new()
        .route("/api2/json/access/ticket", post(ticket))
        .route("/api2/json/cluster/resources", get(resources))
        .route("/api2/json/cluster/backup", get(backup_jobs))
        .route("/api2/json/cluster/backup/{id}", put(update_job))
        .route("/api2/json/nodes/{node}/lxc/{id}/status/stop", post(stop))
        .route("/api2/json/nodes/{node}/lxc/{id}", delete(destroy))
        .route("/api2/json/nodes/{node}/vzdump", post(vzdump))
        .route("/api2/json/nodes/{node}/tasks/{upid}/status", get(task_status))
        .route("/api2/json/nodes/{node}/tasks/{upid}/log", get(task_log))
        .route("/api2/json/nodes/{node}/storage/{storage}/upload", post(upload))
        .with_state(rec.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api2/json"), rec)
}

fn config(endpoint: &str, password: &str) -> ClusterConfig {
    ClusterConfig {
        endpoint: endpoint.to_string(),
        username: "root".into(),
        password: password.into(),
        ..ClusterConfig::default()
    }
}

fn id(n: u32) -> ContainerId {
    ContainerId::new(n).unwrap()
}

#[tokio::test]
async fn wrong_password_is_an_auth_error() {
    let (endpoint, _rec) = serve().await;
    let err = ProxmoxClient::connect(&config(&endpoint, "nope")).await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));
}

#[tokio::test]
async fn resources_are_decoded_from_envelope() {
    let (endpoint, _rec) = serve().await;
    let client = ProxmoxClient::connect(&config(&endpoint, "secret")).await.unwrap();

    let cache = ClusterStateCache::refresh(&client).await.unwrap();
    let ids: Vec<u32> = cache.ids().map(|i| i.get()).collect();
    assert_eq!(ids, vec![6101, 6102]);
}

#[tokio::test]
async fn submissions_carry_ticket_and_csrf() {
    let (endpoint, rec) = serve().await;
    let client = ProxmoxClient::connect(&config(&endpoint, "secret")).await.unwrap();

    let handle = client
        .submit(
            "pve1",
            &OperationRequest::Backup {
                id: id(6101),
                storage: "nfs".into(),
                mode: BackupMode::Snapshot,
            },
        )
        .await
        .unwrap();
    assert!(handle.as_str().contains(":vzdump:6101:"));

    let recorded = rec.lock().unwrap();
    let (name, form) = &recorded.forms[0];
    assert_eq!(name, "vzdump:pve1");
    assert_eq!(form.get("mode").map(String::as_str), Some("snapshot"));
    assert_eq!(form.get("compress").map(String::as_str), Some("1"));
    assert_eq!(form.get("vmid").map(String::as_str), Some("6101"));
}

#[tokio::test]
async fn error_status_is_a_rejection() {
    let (endpoint, _rec) = serve().await;
    let client = ProxmoxClient::connect(&config(&endpoint, "secret")).await.unwrap();

    let err = client
        .submit("pve1", &OperationRequest::Destroy { id: id(6101) })
        .await
        .unwrap_err();
    match err {
        ClientError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("is locked"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn task_status_and_log_paging() {
    let (endpoint, rec) = serve().await;
    let client = ProxmoxClient::connect(&config(&endpoint, "secret")).await.unwrap();
    let handle = TaskHandle::new("UPID:pve1:0000A1B2:00C3D4E5:65A1B2C3:vzstop:6101:root@pam:");

    let state = client.task_status(&handle, "pve1").await.unwrap();
    assert!(state.succeeded());

    let page = client.task_log(&handle, "pve1", 1, 20).await.unwrap();
    let seqs: Vec<u64> = page.iter().map(|e| e.sequence).collect();
    assert_eq!(seqs, vec![2, 3]);
    assert_eq!(page[0].text, "line 2");

    let q = &rec.lock().unwrap().log_queries[0];
    assert_eq!(q.get("limit").map(String::as_str), Some("20"));
}

#[tokio::test]
async fn backup_job_update_is_a_form_put() {
    let (endpoint, rec) = serve().await;
    let client = ProxmoxClient::connect(&config(&endpoint, "secret")).await.unwrap();

    let jobs = client.list_backup_jobs().await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].exclude.to_string(), "950");
    assert!(jobs[1].exclude.is_empty());
    assert!(jobs[0].fields().contains_key("enabled"));

    let update = BackupJobUpdate {
        starttime: jobs[0].starttime.clone(),
        exclude: [id(950), id(999)].into_iter().collect::<ExcludeSet>(),
    };
    client.update_backup_job("backup-a1b2", &update).await.unwrap();

    let recorded = rec.lock().unwrap();
    let (name, form) = &recorded.forms[0];
    assert_eq!(name, "job:backup-a1b2");
    assert_eq!(form.get("exclude").map(String::as_str), Some("950,999"));
    assert_eq!(form.get("starttime").map(String::as_str), Some("02:30"));
}

#[tokio::test]
async fn template_upload_streams_file() {
    let (endpoint, rec) = serve().await;
    let client = ProxmoxClient::connect(&config(&endpoint, "secret")).await.unwrap();

    let dir = std::env::temp_dir().join(format!("pvx-http-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("alpine-3.19-default_amd64.tar.xz");
    tokio::fs::write(&path, b"template-bytes").await.unwrap();

    let handle = client.upload_template(&path, "pve1", "local").await.unwrap();
    assert!(handle.unwrap().as_str().contains("imgcopy"));

    let body = rec.lock().unwrap().uploads[0].clone();
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("vztmpl"));
    assert!(text.contains("alpine-3.19-default_amd64.tar.xz"));
    assert!(text.contains("template-bytes"));
}

#[tokio::test]
async fn orchestrator_runs_over_http() {
    let (endpoint, rec) = serve().await;
    let client = Arc::new(ProxmoxClient::connect(&config(&endpoint, "secret")).await.unwrap());
    let cache = ClusterStateCache::refresh(client.as_ref()).await.unwrap();

    let cfg = OrchestratorConfig {
        poll_interval_ms: 0,
        ..OrchestratorConfig::default()
    };
    let ctx = OpsContext::new(client, cfg);
    let orch = ContainerOrchestrator::new(&ctx, &cache);

    assert!(orch.stop(id(6101)).await);
    // already stopped, no call
    assert!(orch.stop(id(6102)).await);
    assert!(!orch.destroy(id(6101)).await);

    let recorded = rec.lock().unwrap();
    let stops: Vec<&str> = recorded.forms.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(stops, vec!["stop:pve1:6101"]);
}
