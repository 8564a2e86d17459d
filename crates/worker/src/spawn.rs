use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

static FALLBACK: OnceLock<Runtime> = OnceLock::new();

/// Handle of the runtime the caller is on, or of a small shared fallback
/// runtime when called from plain threads.
pub(crate) fn handle() -> Handle {
	match Handle::try_current() {
		Ok(current) => current,
		Err(_) => FALLBACK
			.get_or_init(|| {
				Builder::new_multi_thread()
					.worker_threads(2)
					.thread_name("dbide-effects")
					.enable_all()
					.build()
					.expect("dbide-worker: cannot start fallback runtime")
			})
			.handle()
			.clone(),
	}
}

/// Spawns `fut` as a `class` task.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(class = class.label(), "worker.spawn");
	handle().spawn(fut)
}
