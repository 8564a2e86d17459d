//! Mock backends and fixtures for console integration tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dbide_console::{Console, ConsoleConfig, EditorBuffer, PageSpec, TextBuffer};
use dbide_primitives::{
	DataSourceCaps, ExecutionMode, PageKey, PlSchema, Range, ScriptKind, SessionHandle, SessionId, TextEdit, TransactionState,
};
use dbide_rpc::{
	CompileDiagnostic, CompileRequest, CompileResponse, DebugBackend, DebugEvent, DebugStartRequest, ExecuteRequest, ExecuteResponse, ExplainPlan,
	ExplainRequest, ParseRequest, ParseResponse, PlRunRequest, RemoteDebugId, Result, RpcError, SqlBackend, StackFrame, StepCommand, StopRequest,
	TransactionResponse,
};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// In-memory SQL backend that counts requests and can hold executions open.
#[derive(Debug)]
pub struct MockSql {
	calls: Mutex<HashMap<&'static str, usize>>,
	failing: Mutex<HashSet<&'static str>>,
	hold: AtomicBool,
	gate: Semaphore,
	pub parse_as: Mutex<ScriptKind>,
	pub after_execute: Mutex<TransactionState>,
	pub diagnostics: Mutex<Vec<CompileDiagnostic>>,
	pub executed: Mutex<Vec<ExecuteRequest>>,
	pub stops: Mutex<Vec<StopRequest>>,
}

impl Default for MockSql {
	fn default() -> Self {
		Self {
			calls: Mutex::new(HashMap::new()),
			failing: Mutex::new(HashSet::new()),
			hold: AtomicBool::new(false),
			gate: Semaphore::new(0),
			parse_as: Mutex::new(ScriptKind::Sql),
			after_execute: Mutex::new(TransactionState::Active),
			diagnostics: Mutex::new(Vec::new()),
			executed: Mutex::new(Vec::new()),
			stops: Mutex::new(Vec::new()),
		}
	}
}

impl MockSql {
	pub fn calls(&self, op: &str) -> usize {
		self.calls.lock().get(op).copied().unwrap_or(0)
	}

	/// Makes every later `op` request fail with a backend error.
	pub fn fail(&self, op: &'static str) {
		self.failing.lock().insert(op);
	}

	/// Holds execute, commit, PL run and compile requests until
	/// [`release`](Self::release).
	pub fn hold(&self) {
		self.hold.store(true, Ordering::SeqCst);
	}

	pub fn release(&self) {
		self.hold.store(false, Ordering::SeqCst);
		self.gate.add_permits(64);
	}

	async fn enter(&self, op: &'static str) -> Result<()> {
		*self.calls.lock().entry(op).or_default() += 1;
		if self.failing.lock().contains(op) {
			return Err(RpcError::backend(format!("{op} failed")));
		}
		Ok(())
	}

	async fn wait_released(&self) {
		if self.hold.load(Ordering::SeqCst)
			&& let Ok(permit) = self.gate.acquire().await
		{
			permit.forget();
		}
	}

	fn respond(&self) -> ExecuteResponse {
		ExecuteResponse {
			statements: Vec::new(),
			transaction_state: *self.after_execute.lock(),
		}
	}
}

#[async_trait]
impl SqlBackend for MockSql {
	async fn execute(&self, req: ExecuteRequest) -> Result<ExecuteResponse> {
		self.executed.lock().push(req);
		self.enter("execute").await?;
		self.wait_released().await;
		Ok(self.respond())
	}

	async fn commit(&self, _session: &SessionId) -> Result<TransactionResponse> {
		self.enter("commit").await?;
		self.wait_released().await;
		Ok(TransactionResponse::default())
	}

	async fn rollback(&self, _session: &SessionId) -> Result<TransactionResponse> {
		self.enter("rollback").await?;
		Ok(TransactionResponse::default())
	}

	async fn stop(&self, req: StopRequest) -> Result<()> {
		self.stops.lock().push(req);
		self.enter("stop").await
	}

	async fn run_pl(&self, _req: PlRunRequest) -> Result<ExecuteResponse> {
		self.enter("run_pl").await?;
		self.wait_released().await;
		Ok(self.respond())
	}

	async fn compile(&self, _req: CompileRequest) -> Result<CompileResponse> {
		self.enter("compile").await?;
		self.wait_released().await;
		Ok(CompileResponse {
			diagnostics: self.diagnostics.lock().clone(),
		})
	}

	async fn parse(&self, _req: ParseRequest) -> Result<ParseResponse> {
		self.enter("parse").await?;
		Ok(*self.parse_as.lock())
	}

	async fn explain(&self, req: ExplainRequest) -> Result<ExplainPlan> {
		self.enter("explain").await?;
		Ok(ExplainPlan {
			lines: vec![format!("PLAN {}", req.sql)],
		})
	}
}

/// Remote debugger that pauses at line 3 on start and replays scripted step
/// events, finishing once the script runs out.
#[derive(Debug, Default)]
pub struct MockDebugger {
	calls: Mutex<HashMap<&'static str, usize>>,
	pub steps: Mutex<VecDeque<Result<DebugEvent>>>,
	pub fail_start: AtomicBool,
	pub started: Mutex<Vec<DebugStartRequest>>,
}

impl MockDebugger {
	pub fn calls(&self, op: &str) -> usize {
		self.calls.lock().get(op).copied().unwrap_or(0)
	}

	pub fn script(&self, events: impl IntoIterator<Item = Result<DebugEvent>>) {
		self.steps.lock().extend(events);
	}

	fn count(&self, op: &'static str) {
		*self.calls.lock().entry(op).or_default() += 1;
	}
}

pub fn paused(line: u32) -> DebugEvent {
	DebugEvent::Paused {
		line,
		call_stack: vec![
			StackFrame {
				pl_name: "inner".into(),
				package_name: None,
				line,
			},
			StackFrame {
				pl_name: "outer".into(),
				package_name: None,
				line: 1,
			},
		],
	}
}

#[async_trait]
impl DebugBackend for MockDebugger {
	async fn start(&self, req: DebugStartRequest) -> Result<(RemoteDebugId, DebugEvent)> {
		self.count("start");
		self.started.lock().push(req);
		if self.fail_start.load(Ordering::SeqCst) {
			return Err(RpcError::backend("debugger unavailable"));
		}
		let id = RemoteDebugId(format!("dbg-{}", self.calls("start")));
		Ok((id, paused(3)))
	}

	async fn step(&self, _id: &RemoteDebugId, _command: StepCommand) -> Result<DebugEvent> {
		self.count("step");
		self.steps.lock().pop_front().unwrap_or(Ok(DebugEvent::Finished { output: None }))
	}

	async fn set_breakpoint(&self, _id: &RemoteDebugId, _line: u32) -> Result<()> {
		self.count("set_breakpoint");
		Ok(())
	}

	async fn remove_breakpoint(&self, _id: &RemoteDebugId, _line: u32) -> Result<()> {
		self.count("remove_breakpoint");
		Ok(())
	}

	async fn exit(&self, _id: &RemoteDebugId) -> Result<()> {
		self.count("exit");
		Ok(())
	}
}

/// Buffer the test keeps a handle to after the page takes ownership.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(pub Arc<Mutex<TextBuffer>>);

impl SharedBuffer {
	pub fn new(text: &str) -> Self {
		Self(Arc::new(Mutex::new(TextBuffer::new(text))))
	}

	pub fn text(&self) -> String {
		self.0.lock().text().to_owned()
	}

	pub fn markers(&self) -> Vec<u32> {
		self.0.lock().markers().iter().copied().collect()
	}

	pub fn highlighted(&self) -> Option<u32> {
		self.0.lock().highlighted()
	}

	pub fn select(&self, selection: Range) {
		self.0.lock().set_selection(selection);
	}
}

impl EditorBuffer for SharedBuffer {
	fn get_value(&self) -> String {
		self.0.lock().get_value()
	}

	fn set_value(&mut self, text: &str) {
		self.0.lock().set_value(text);
	}

	fn get_selection(&self) -> Range {
		self.0.lock().get_selection()
	}

	fn execute_edits(&mut self, edits: &[TextEdit]) {
		self.0.lock().execute_edits(edits);
	}

	fn set_breakpoint_marker(&mut self, line: u32, enabled: bool) {
		self.0.lock().set_breakpoint_marker(line, enabled);
	}

	fn clear_markers(&mut self) {
		self.0.lock().clear_markers();
	}

	fn highlight_line(&mut self, line: Option<u32>) {
		self.0.lock().highlight_line(line);
	}
}

pub struct Harness {
	pub console: Console,
	pub sql: Arc<MockSql>,
	pub debugger: Arc<MockDebugger>,
}

impl Harness {
	pub fn new(mode: ExecutionMode) -> Self {
		let _ = tracing_subscriber::fmt::try_init();
		let config = ConsoleConfig {
			execution_mode: mode,
			..ConsoleConfig::default()
		};
		let sql = Arc::new(MockSql::default());
		let debugger = Arc::new(MockDebugger::default());
		let console = Console::new(config, sql.clone(), debugger.clone());
		Self { console, sql, debugger }
	}

	pub fn multi() -> Self {
		Self::new(ExecutionMode::MultiSession)
	}

	pub fn shared() -> Self {
		Self::new(ExecutionMode::SharedSession)
	}

	/// Opens a SQL page on its own session.
	pub fn sql_page(&self, session: &str, text: &str) -> PageKey {
		self.console
			.open_page(PageSpec::sql(session_handle(session), TextBuffer::new(text)))
			.expect("open sql page")
	}

	pub fn pl_page(&self, session: &str, schema: PlSchema, text: &str) -> PageKey {
		self.console
			.open_page(PageSpec::pl(session_handle(session), schema, TextBuffer::new(text)))
			.expect("open pl page")
	}

	/// Opens a page whose buffer the test can inspect afterwards.
	pub fn shared_page(&self, session: &str, schema: Option<PlSchema>, text: &str) -> (PageKey, SharedBuffer) {
		let buffer = SharedBuffer::new(text);
		let spec = PageSpec {
			session: session_handle(session),
			schema,
			buffer: Box::new(buffer.clone()),
		};
		let page = self.console.open_page(spec).expect("open page");
		(page, buffer)
	}

	pub fn notification_ids(&self) -> Vec<&'static str> {
		self.console.take_notifications().iter().map(|n| n.id()).collect()
	}
}

pub fn session_handle(id: &str) -> SessionHandle {
	SessionHandle::new(SessionId::new(id), DataSourceCaps::all())
}

/// Polls a condition with a timeout.
pub async fn wait_until(timeout: Duration, mut f: impl FnMut() -> bool) -> bool {
	let start = std::time::Instant::now();
	while start.elapsed() < timeout {
		if f() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	false
}

pub const WAIT: Duration = Duration::from_secs(2);
