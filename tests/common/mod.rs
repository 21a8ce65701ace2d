use std::fs;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// Helper struct to run marketdesk commands in an isolated temp directory
pub struct DeskTest {
    pub temp_dir: TempDir,
    binary_path: &'static str,
}

impl DeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        DeskTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_marketdesk"),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("MARKETDESK_TOKEN")
            .env_remove("MARKETDESK_LOG")
            .env_remove("RUST_LOG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute marketdesk command")
    }

    #[allow(dead_code)]
    pub fn run_with_env(&self, args: &[&str], key: &str, value: &str) -> Output {
        self.command(args)
            .env(key, value)
            .output()
            .expect("Failed to execute marketdesk command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".marketdesk");
        fs::create_dir_all(&dir).expect("Failed to create .marketdesk directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }

    /// Point the console at `base_url`, optionally with a token.
    pub fn configure(&self, base_url: &str, token: Option<&str>) {
        let mut config = format!("api:\n  base_url: {base_url}\n  timeout: 5\n");
        if let Some(token) = token {
            config.push_str(&format!("auth:\n  token: {token}\n"));
        }
        self.write_config(&config);
    }

    #[allow(dead_code)]
    pub fn read_config(&self) -> String {
        fs::read_to_string(self.temp_dir.path().join(".marketdesk").join("config.yaml"))
            .expect("Failed to read config file")
    }
}

/// A request received by [`FakeApi`]
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: String,
    /// Path including the query string
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

type Responder = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

#[derive(Clone)]
struct FakeState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Arc<Responder>,
}

/// axum server answering every request with the responder's status and
/// JSON body. Shuts down when dropped.
pub struct FakeApi {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    _runtime: Runtime,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn start(responder: impl Fn(&Recorded) -> (u16, String) + Send + Sync + 'static) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("Failed to build fake api runtime");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            requests: requests.clone(),
            responder: Arc::new(responder),
        };

        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("Failed to bind fake api");
        let addr = listener.local_addr().expect("Failed to read fake api address");

        let app = Router::new().fallback(record).with_state(state);
        runtime.spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        FakeApi {
            base_url: format!("http://{addr}/admin/"),
            requests,
            _runtime: runtime,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }
}

async fn record(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let request = Recorded {
        method: method.to_string(),
        target: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    };
    let (status, payload) = (state.responder)(&request);
    state.requests.lock().expect("requests lock").push(request);

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], payload)
}

/// Base URL of a port nothing listens on
#[allow(dead_code)]
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    format!("http://{addr}/admin/")
}
