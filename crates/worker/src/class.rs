/// Scheduling class attached to every spawned effect, surfaced in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Runs because the user pressed something; its outcome moves the toolbar.
	Interactive,
	/// Fire-and-forget work such as tearing down a remote debug session.
	Background,
}

impl TaskClass {
	pub(crate) const fn label(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
