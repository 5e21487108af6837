//! Shared harness: fixture formatters and a stdio LSP session with the server binary
#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use tempfile::TempDir;
use tower_lsp::lsp_types::Url;

const SERVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Path to an executable script under `tests/fixtures`
pub fn fixture(name: &str) -> PathBuf {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).expect("fixture exists").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("make fixture executable");
    }
    path
}

pub fn fake_formatter() -> PathBuf {
    fixture("fake-verilog-format")
}

/// How the test client introduces itself to the server
pub struct SessionOptions {
    pub capabilities: Value,
    pub initialization_options: Value,
    /// Answer to every `workspace/configuration` item; `None` answers `null`
    pub configuration_reply: Option<Value>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            capabilities: json!({}),
            initialization_options: Value::Null,
            configuration_reply: None,
        }
    }
}

pub struct Session {
    child: Child,
    stdin: ChildStdin,
    messages: Receiver<Value>,
    next_id: i64,
    configuration_reply: Option<Value>,
    pub configuration_requests: usize,
    pub initialize_result: Value,
    pub root: TempDir,
    pub staging: PathBuf,
    pub project: PathBuf,
}

impl Session {
    pub fn start(initialization_options: Value) -> Self {
        Self::start_with(SessionOptions {
            initialization_options,
            ..Default::default()
        })
    }

    pub fn start_with(options: SessionOptions) -> Self {
        let root = tempfile::tempdir().expect("create sandbox");
        let staging = root.path().join("staging");
        let project = root.path().join("rtl src");
        fs::create_dir(&staging).unwrap();
        fs::create_dir(&project).unwrap();
        // Empty config keeps the user's own config.toml out of the test
        let config = root.path().join("config.toml");
        fs::write(&config, "").unwrap();

        let bin_path = std::env::var("CARGO_BIN_EXE_verilog-format-ls")
            .unwrap_or_else(|_| "target/debug/verilog-format-ls".to_string());
        let mut child = Command::new(bin_path)
            .arg("--formatter-path")
            .arg(fake_formatter())
            .arg("--temp-dir")
            .arg(&staging)
            .arg("--config")
            .arg(&config)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn language server");

        let stdin = child.stdin.take().expect("stdin");
        let stdout = child.stdout.take().expect("stdout");
        let (tx, messages) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            while let Some(message) = read_message(&mut reader) {
                if tx.send(message).is_err() {
                    break;
                }
            }
        });

        let mut session = Session {
            child,
            stdin,
            messages,
            next_id: 1,
            configuration_reply: options.configuration_reply,
            configuration_requests: 0,
            initialize_result: Value::Null,
            root,
            staging,
            project,
        };

        let (response, _) = session.request(
            "initialize",
            json!({
                "processId": null,
                "rootUri": null,
                "capabilities": options.capabilities,
                "initializationOptions": options.initialization_options,
                "clientInfo": { "name": "test-client", "version": "1.0" }
            }),
        );
        session.initialize_result = response
            .get("result")
            .cloned()
            .unwrap_or_else(|| panic!("initialize failed: {response}"));
        session.notify("initialized", json!({}));
        session
    }

    fn send(&mut self, message: &Value) {
        let body = message.to_string();
        write!(self.stdin, "Content-Length: {}\r\n\r\n{}", body.len(), body)
            .expect("Failed to write message");
        self.stdin.flush().expect("Failed to flush stdin");
    }

    pub fn notify(&mut self, method: &str, params: Value) {
        self.send(&json!({ "jsonrpc": "2.0", "method": method, "params": params }));
    }

    /// Send a request and wait for its response, returning the notifications seen on the way.
    ///
    /// `workspace/configuration` requests from the server are answered as they arrive.
    pub fn request(&mut self, method: &str, params: Value) -> (Value, Vec<Value>) {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }));

        let mut notifications = Vec::new();
        loop {
            let message = self
                .messages
                .recv_timeout(SERVER_TIMEOUT)
                .unwrap_or_else(|_| panic!("Timeout waiting for response to {method}"));

            match message.get("method").and_then(Value::as_str) {
                None if message.get("id").and_then(Value::as_i64) == Some(id) => {
                    return (message, notifications);
                }
                Some("workspace/configuration") => self.answer_configuration(&message),
                _ => notifications.push(message),
            }
        }
    }

    fn answer_configuration(&mut self, request: &Value) {
        self.configuration_requests += 1;
        let items = request["params"]["items"].as_array().map_or(1, Vec::len);
        let reply = self.configuration_reply.clone().unwrap_or(Value::Null);
        let result: Vec<Value> = vec![reply; items];
        self.send(&json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }));
    }

    pub fn open(&mut self, uri: &Url, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": { "uri": uri, "languageId": "verilog", "version": 1, "text": text }
            }),
        );
    }

    pub fn change(&mut self, uri: &Url, version: i32, text: &str) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": uri, "version": version },
                "contentChanges": [{ "text": text }]
            }),
        );
    }

    pub fn format(&mut self, uri: &Url) -> (Value, Vec<Value>) {
        self.request(
            "textDocument/formatting",
            json!({
                "textDocument": { "uri": uri },
                "options": { "tabSize": 4, "insertSpaces": true }
            }),
        )
    }

    pub fn document_uri(&self) -> Url {
        Url::from_file_path(self.project.join("top.v")).expect("absolute path")
    }

    pub fn logged_args(&self) -> Vec<String> {
        let log = fs::read_to_string(self.staging.join("args.log")).expect("formatter ran");
        log.lines().map(str::to_string).collect()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn read_message(reader: &mut BufReader<ChildStdout>) -> Option<Value> {
    let mut content_length = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some(length) = line.strip_prefix("Content-Length:") {
            content_length = length.trim().parse::<usize>().ok();
        }
    }

    let mut body = vec![0u8; content_length?];
    reader.read_exact(&mut body).ok()?;
    serde_json::from_slice(&body).ok()
}

pub fn shown_messages(notifications: &[Value]) -> Vec<&Value> {
    notifications
        .iter()
        .filter(|n| n.get("method").and_then(Value::as_str) == Some("window/showMessage"))
        .collect()
}
