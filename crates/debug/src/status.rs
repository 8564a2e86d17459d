use dbide_rpc::StepCommand;

/// Lifecycle status of a debug session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugStatus {
	/// Paused and ready for the next stepping command.
	Init,
	StepIn,
	StepOver,
	StepOut,
	Resume,
	/// Remote teardown in flight.
	Exiting,
	/// Local transient while an ended session is restarted.
	Recover,
	/// The routine ran to completion.
	Finished,
	/// The remote session ended abnormally.
	Terminated,
}

impl DebugStatus {
	/// Status held while `command` is awaiting its response.
	pub const fn for_command(command: StepCommand) -> Self {
		match command {
			StepCommand::StepIn => Self::StepIn,
			StepCommand::StepOver => Self::StepOver,
			StepCommand::StepOut => Self::StepOut,
			StepCommand::Resume => Self::Resume,
		}
	}

	/// Stepping command in flight, if any.
	pub const fn in_flight(self) -> Option<StepCommand> {
		match self {
			Self::StepIn => Some(StepCommand::StepIn),
			Self::StepOver => Some(StepCommand::StepOver),
			Self::StepOut => Some(StepCommand::StepOut),
			Self::Resume => Some(StepCommand::Resume),
			_ => None,
		}
	}

	/// True once the remote process has completed or died.
	pub const fn is_end(self) -> bool {
		matches!(self, Self::Finished | Self::Terminated)
	}

	/// Name used in log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Init => "INIT",
			Self::StepIn => "STEP_IN",
			Self::StepOver => "STEP_OVER",
			Self::StepOut => "STEP_OUT",
			Self::Resume => "RESUME",
			Self::Exiting => "EXITING",
			Self::Recover => "RECOVER",
			Self::Finished => "FINISHED",
			Self::Terminated => "TERMINATED",
		}
	}
}
