//! Playwright browser automation
//!
//! A [`PlaywrightSession`] owns one `node` child process running a small
//! bridge script. The bridge launches a browser, opens a single page and then
//! serves JSON-lines requests on stdin, answering each on stdout.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use yapee_qa_common::RunConfiguration;

use crate::error::{E2eError, E2eResult};
use crate::page::{LoadState, Page, WaitState};

/// Exit code the bridge uses when `require('playwright')` fails
const BRIDGE_MISSING_MODULE: i32 = 3;

/// Extra time granted on top of a request's own timeout before giving up on the bridge
const BRIDGE_GRACE: Duration = Duration::from_secs(5);

const BRIDGE_SCRIPT: &str = r#"
const readline = require('readline');
const write = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');
let playwright;
try {
  playwright = require('playwright');
} catch (error) {
  write({ id: 0, ok: false, error: 'playwright module not found: ' + error.message });
  process.exit(3);
}

(async () => {
  const opts = JSON.parse(process.env.YAPEE_QA_BRIDGE_OPTIONS || '{}');
  const browser = await playwright[opts.browser || 'chromium'].launch({
    headless: opts.headless !== false,
    slowMo: opts.slowMo || 0,
  });
  const context = await browser.newContext({ viewport: opts.viewport });
  const page = await context.newPage();
  page.setDefaultTimeout(opts.timeout || 30000);

  const first = (selector) => page.locator(selector).first();
  const done = () => null;
  const handlers = {
    goto: (a) => page.goto(a.url, { timeout: a.timeout }).then(done),
    waitForLoadState: (a) => page.waitForLoadState(a.state, { timeout: a.timeout }).then(done),
    waitForSelector: (a) => first(a.selector).waitFor({ state: a.state, timeout: a.timeout }).then(done),
    waitForEither: (a) =>
      Promise.any(
        a.targets.map((t, i) =>
          first(t.selector).waitFor({ state: a.state, timeout: t.timeout }).then(() => i)
        )
      ).catch(() => {
        throw new Error('Timeout: none of ' + a.targets.map((t) => t.selector).join(', ') + ' became ' + a.state);
      }),
    waitForUrl: (a) => page.waitForURL(a.pattern, { timeout: a.timeout }).then(done),
    fill: (a) => first(a.selector).fill(a.value).then(done),
    inputValue: (a) => first(a.selector).inputValue(),
    click: (a) => first(a.selector).click().then(done),
    press: (a) => first(a.selector).press(a.key).then(done),
    selectOption: (a) => first(a.selector).selectOption(a.value).then(done),
    scrollIntoView: (a) => first(a.selector).scrollIntoViewIfNeeded().then(done),
    setViewport: (a) => page.setViewportSize({ width: a.width, height: a.height }).then(done),
    count: (a) => page.locator(a.selector).count(),
    isVisible: (a) => first(a.selector).isVisible(),
    textContent: (a) => first(a.selector).textContent(),
    allTextContents: (a) => page.locator(a.selector).allTextContents(),
    getAttribute: (a) => first(a.selector).getAttribute(a.name),
    validationMessage: (a) => first(a.selector).evaluate((el) => el.validationMessage || ''),
    title: () => page.title(),
  };

  write({ id: 0, ok: true, value: 'ready' });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let req;
    try {
      req = JSON.parse(line);
    } catch (error) {
      write({ id: -1, ok: false, error: 'malformed request: ' + error.message });
      continue;
    }
    if (req.op === 'close') {
      await browser.close();
      write({ id: req.id, ok: true, value: null });
      break;
    }
    const handler = handlers[req.op];
    if (!handler) {
      write({ id: req.id, ok: false, error: 'unknown op: ' + req.op });
      continue;
    }
    try {
      const value = await handler(req.args || {});
      write({ id: req.id, ok: true, value: value === undefined ? null : value });
    } catch (error) {
      write({ id: req.id, ok: false, error: error.message });
    }
  }
  process.exit(0);
})().catch((error) => {
  write({ id: 0, ok: false, error: error.message });
  process.exit(1);
});
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for a Playwright session
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub slow_mo_ms: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub default_timeout: Duration,
    /// How long to wait for the browser to come up
    pub launch_timeout: Duration,
    /// Node executable
    pub node_binary: PathBuf,
    /// Directory `playwright` is resolved from (its `node_modules`)
    pub working_dir: PathBuf,
}

impl PlaywrightConfig {
    pub fn from_run_config(config: &RunConfiguration, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            headless: config.headless,
            slow_mo_ms: config.slow_mo_ms,
            default_timeout: Duration::from_millis(config.timeout_ms),
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }

    fn bridge_options(&self) -> Value {
        json!({
            "browser": self.browser.as_str(),
            "headless": self.headless,
            "slowMo": self.slow_mo_ms,
            "timeout": self.default_timeout.as_millis() as u64,
            "viewport": { "width": self.viewport_width, "height": self.viewport_height },
        })
    }
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            slow_mo_ms: 0,
            viewport_width: 1280,
            viewport_height: 720,
            default_timeout: Duration::from_secs(30),
            launch_timeout: Duration::from_secs(30),
            node_binary: PathBuf::from("node"),
            working_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: i64,
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

struct BridgeIo {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// A live browser page driven through the Playwright bridge
pub struct PlaywrightSession {
    child: Mutex<Child>,
    io: Mutex<BridgeIo>,
    next_id: AtomicU64,
    default_timeout: Duration,
}

impl PlaywrightSession {
    /// Spawn the bridge and wait until the browser page is ready
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        info!(
            "Launching {} ({})",
            config.browser.as_str(),
            if config.headless { "headless" } else { "headed" }
        );

        let mut child = Command::new(&config.node_binary)
            .arg("-e")
            .arg(BRIDGE_SCRIPT)
            .current_dir(&config.working_dir)
            .env("YAPEE_QA_BRIDGE_OPTIONS", config.bridge_options().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    E2eError::PlaywrightNotFound
                } else {
                    E2eError::Playwright(format!(
                        "Failed to spawn {}: {}",
                        config.node_binary.display(),
                        e
                    ))
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".into()))?;

        let session = Self {
            child: Mutex::new(child),
            io: Mutex::new(BridgeIo {
                stdin,
                stdout: BufReader::new(stdout).lines(),
            }),
            next_id: AtomicU64::new(1),
            default_timeout: config.default_timeout,
        };

        let ready = {
            let mut io = session.io.lock().await;
            tokio::time::timeout(config.launch_timeout, Self::read_response(&mut io, 0)).await
        };

        match ready {
            Ok(Ok(_)) => {
                debug!("Playwright bridge ready");
                Ok(session)
            }
            Ok(Err(e)) => {
                let exit = session.child.lock().await.wait().await.ok().and_then(|s| s.code());
                if exit == Some(BRIDGE_MISSING_MODULE) {
                    Err(E2eError::PlaywrightNotFound)
                } else {
                    Err(e)
                }
            }
            Err(_) => Err(E2eError::Timeout("browser launch".into())),
        }
    }

    async fn read_response(io: &mut BridgeIo, id: i64) -> E2eResult<Value> {
        loop {
            let line = io
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| E2eError::Playwright("bridge exited unexpectedly".into()))?;

            let resp: BridgeResponse = match serde_json::from_str(&line) {
                Ok(resp) => resp,
                Err(_) => {
                    // Page scripts may log to stdout; those lines are not ours.
                    debug!("[bridge] {}", line);
                    continue;
                }
            };

            if resp.id != id {
                if resp.id == 0 && !resp.ok {
                    return Err(E2eError::Playwright(resp.error.unwrap_or_default()));
                }
                warn!("Discarding bridge response {} while waiting for {}", resp.id, id);
                continue;
            }

            return if resp.ok {
                Ok(resp.value)
            } else {
                Err(E2eError::Playwright(
                    resp.error.unwrap_or_else(|| "unknown bridge error".into()),
                ))
            };
        }
    }

    /// Send one request and wait for its response
    async fn call(&self, op: &str, args: Value, timeout: Option<Duration>) -> E2eResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let mut request = serde_json::to_string(&json!({ "id": id, "op": op, "args": args }))?;
        request.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(request.as_bytes()).await?;
        io.stdin.flush().await?;

        let bound = timeout.unwrap_or(self.default_timeout) + BRIDGE_GRACE;
        match tokio::time::timeout(bound, Self::read_response(&mut io, id)).await {
            Ok(result) => result,
            Err(_) => Err(E2eError::Timeout(format!("bridge response to '{}'", op))),
        }
    }

    fn ms(duration: Duration) -> u64 {
        duration.as_millis() as u64
    }

    /// Close the browser and stop the bridge process
    pub async fn close(self) -> E2eResult<()> {
        let closed = self.call("close", json!({}), Some(Duration::from_secs(5))).await;
        if let Err(e) = &closed {
            warn!("Browser did not close cleanly: {}", e);
        }

        let mut child = self.child.lock().await;
        match tokio::time::timeout(Duration::from_secs(2), child.wait()).await {
            Ok(_) => Ok(()),
            Err(_) => {
                if send_sigterm(&child) {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
                let _ = child.kill().await;
                Ok(())
            }
        }
    }
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match child.id() {
        Some(pid) => kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok(),
        None => false,
    }
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) -> bool {
    false
}

/// Arguments for the bridge's concurrent two-selector wait
fn either_args(first: (&str, Duration), second: (&str, Duration), state: WaitState) -> Value {
    json!({
        "state": state.as_str(),
        "targets": [
            { "selector": first.0, "timeout": first.1.as_millis() as u64 },
            { "selector": second.0, "timeout": second.1.as_millis() as u64 },
        ],
    })
}

fn value_as_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Page for PlaywrightSession {
    async fn goto(&self, url: &str, timeout: Duration) -> E2eResult<()> {
        self.call("goto", json!({ "url": url, "timeout": Self::ms(timeout) }), Some(timeout))
            .await
            .map(|_| ())
    }

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()> {
        self.call(
            "waitForLoadState",
            json!({ "state": state.as_str(), "timeout": Self::ms(timeout) }),
            Some(timeout),
        )
        .await
        .map(|_| ())
    }

    async fn wait_for_selector(&self, selector: &str, state: WaitState, timeout: Duration) -> E2eResult<()> {
        self.call(
            "waitForSelector",
            json!({ "selector": selector, "state": state.as_str(), "timeout": Self::ms(timeout) }),
            Some(timeout),
        )
        .await
        .map(|_| ())
        .map_err(|e| match e {
            E2eError::Playwright(msg) if msg.contains("Timeout") => {
                E2eError::Timeout(format!("{} to be {}", selector, state.as_str()))
            }
            other => other,
        })
    }

    async fn wait_for_either(
        &self,
        first: (&str, Duration),
        second: (&str, Duration),
        state: WaitState,
    ) -> E2eResult<usize> {
        let bound = first.1.max(second.1);
        let value = self
            .call("waitForEither", either_args(first, second, state), Some(bound))
            .await
            .map_err(|e| match e {
                E2eError::Playwright(msg) if msg.contains("Timeout") => {
                    E2eError::Timeout(format!("{} or {} to be {}", first.0, second.0, state.as_str()))
                }
                other => other,
            })?;
        value
            .as_u64()
            .map(|i| i as usize)
            .ok_or_else(|| E2eError::Playwright(format!("unexpected waitForEither result: {}", value)))
    }

    async fn wait_for_url(&self, pattern: &str, timeout: Duration) -> E2eResult<()> {
        self.call(
            "waitForUrl",
            json!({ "pattern": pattern, "timeout": Self::ms(timeout) }),
            Some(timeout),
        )
        .await
        .map(|_| ())
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.call("fill", json!({ "selector": selector, "value": value }), None)
            .await
            .map(|_| ())
    }

    async fn input_value(&self, selector: &str) -> E2eResult<String> {
        let value = self.call("inputValue", json!({ "selector": selector }), None).await?;
        Ok(value_as_string(value).unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.call("click", json!({ "selector": selector }), None)
            .await
            .map(|_| ())
    }

    async fn press(&self, selector: &str, key: &str) -> E2eResult<()> {
        self.call("press", json!({ "selector": selector, "key": key }), None)
            .await
            .map(|_| ())
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.call("selectOption", json!({ "selector": selector, "value": value }), None)
            .await
            .map(|_| ())
    }

    async fn scroll_into_view(&self, selector: &str) -> E2eResult<()> {
        self.call("scrollIntoView", json!({ "selector": selector }), None)
            .await
            .map(|_| ())
    }

    async fn set_viewport(&self, width: u32, height: u32) -> E2eResult<()> {
        self.call("setViewport", json!({ "width": width, "height": height }), None)
            .await
            .map(|_| ())
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        let value = self.call("count", json!({ "selector": selector }), None).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Playwright(format!("count returned {}", value)))
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        let value = self.call("isVisible", json!({ "selector": selector }), None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>> {
        let value = self.call("textContent", json!({ "selector": selector }), None).await?;
        Ok(value_as_string(value))
    }

    async fn all_text_contents(&self, selector: &str) -> E2eResult<Vec<String>> {
        let value = self.call("allTextContents", json!({ "selector": selector }), None).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get_attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>> {
        let value = self
            .call("getAttribute", json!({ "selector": selector, "name": name }), None)
            .await?;
        Ok(value_as_string(value))
    }

    async fn validation_message(&self, selector: &str) -> E2eResult<String> {
        let value = self.call("validationMessage", json!({ "selector": selector }), None).await?;
        Ok(value_as_string(value).unwrap_or_default())
    }

    async fn title(&self) -> E2eResult<String> {
        let value = self.call("title", json!({}), None).await?;
        Ok(value_as_string(value).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_run_config() {
        let run = RunConfiguration {
            headless: false,
            slow_mo_ms: 250,
            timeout_ms: 12_000,
            ..RunConfiguration::default()
        };
        let config = PlaywrightConfig::from_run_config(&run, "/srv/yapee");
        assert!(!config.headless);
        assert_eq!(config.slow_mo_ms, 250);
        assert_eq!(config.default_timeout, Duration::from_secs(12));
        assert_eq!(config.working_dir, PathBuf::from("/srv/yapee"));

        let options = config.bridge_options();
        assert_eq!(options["browser"], "chromium");
        assert_eq!(options["viewport"]["width"], 1280);
    }

    #[test]
    fn test_bridge_response_parsing() {
        let ok: BridgeResponse = serde_json::from_str(r#"{"id":4,"ok":true,"value":3}"#).unwrap();
        assert_eq!(ok.id, 4);
        assert_eq!(ok.value, json!(3));

        let err: BridgeResponse =
            serde_json::from_str(r#"{"id":5,"ok":false,"error":"Timeout 500ms exceeded"}"#).unwrap();
        assert!(!err.ok);
        assert_eq!(err.value, Value::Null);
        assert_eq!(err.error.as_deref(), Some("Timeout 500ms exceeded"));
    }

    #[test]
    fn test_value_as_string() {
        assert_eq!(value_as_string(Value::Null), None);
        assert_eq!(value_as_string(json!("x")), Some("x".to_string()));
        assert_eq!(value_as_string(json!(7)), Some("7".to_string()));
    }

    #[test]
    fn test_either_wait_is_one_request() {
        let args = either_args(
            ("#done", Duration::from_secs(5)),
            ("#busy", Duration::from_secs(2)),
            WaitState::Visible,
        );
        assert_eq!(args["state"], "visible");
        assert_eq!(args["targets"][0]["selector"], "#done");
        assert_eq!(args["targets"][0]["timeout"], 5000);
        assert_eq!(args["targets"][1]["selector"], "#busy");
        assert_eq!(args["targets"][1]["timeout"], 2000);
        assert!(BRIDGE_SCRIPT.contains("waitForEither: (a) =>"));
        assert!(BRIDGE_SCRIPT.contains("Promise.any("));
    }

    #[tokio::test]
    async fn test_missing_node_is_reported() {
        let config = PlaywrightConfig {
            node_binary: PathBuf::from("/nonexistent/yapee-qa-node"),
            ..PlaywrightConfig::default()
        };
        let result = PlaywrightSession::launch(&config).await;
        assert!(matches!(result, Err(E2eError::PlaywrightNotFound)));
    }
}
