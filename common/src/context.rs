use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

struct RawContext {
	// Dropped together with the last context clone, which is what `Handler`
	// waits on.
	_sender: oneshot::Sender<()>,
	token: CancellationToken,
}

/// A cheap cloneable shutdown signal handed to long running tasks.
#[derive(Clone)]
pub struct Context(Arc<RawContext>);

/// The owning side of a [`Context`].
pub struct Handler {
	recv: oneshot::Receiver<()>,
	token: CancellationToken,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		let (sender, recv) = oneshot::channel();
		let token = CancellationToken::new();

		(
			Self(Arc::new(RawContext {
				_sender: sender,
				token: token.clone(),
			})),
			Handler { recv, token },
		)
	}

	/// Resolves once the handler has been cancelled.
	pub async fn done(&self) {
		self.0.token.cancelled().await
	}

	pub fn is_done(&self) -> bool {
		self.0.token.is_cancelled()
	}
}

impl Handler {
	/// Resolves when every clone of the context has been dropped.
	pub async fn done(&mut self) {
		let _ = (&mut self.recv).await;
	}

	/// Signals all contexts and waits for them to be dropped.
	pub async fn cancel(self) {
		self.token.cancel();

		let _ = self.recv.await;
	}
}
