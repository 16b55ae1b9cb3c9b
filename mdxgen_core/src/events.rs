use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;

use crate::MdxError;
use crate::MdxResult;
use crate::StepKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
	Debug,
	Info,
	Warn,
	Error,
}

/// Structured progress reported by a running step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
	StepStarted {
		step: StepKind,
	},
	Progress {
		step: StepKind,
		done: usize,
		total: usize,
	},
	Message {
		step: StepKind,
		level: EventLevel,
		text: String,
	},
	StepFinished {
		step: StepKind,
		success: bool,
	},
}

/// Cooperative cancellation shared between a caller and a running step.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Per-invocation context threaded through every step.
///
/// Events go to the attached channel. Without a channel they are forwarded to
/// `tracing` instead.
#[derive(Debug, Clone, Default)]
pub struct StepContext {
	events: Option<Sender<StepEvent>>,
	cancel: CancelFlag,
}

impl StepContext {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_events(mut self, events: Sender<StepEvent>) -> Self {
		self.events = Some(events);
		self
	}

	#[must_use]
	pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
		self.cancel = cancel;
		self
	}

	pub fn cancel_flag(&self) -> &CancelFlag {
		&self.cancel
	}

	/// Fail with [`MdxError::Cancelled`] once cancellation was requested.
	pub fn check_cancelled(&self, step: StepKind) -> MdxResult<()> {
		if self.cancel.is_cancelled() {
			return Err(MdxError::Cancelled(step.name()));
		}
		Ok(())
	}

	pub fn emit(&self, event: StepEvent) {
		match &self.events {
			// A dropped receiver only means nobody is listening any more.
			Some(sender) => {
				let _ = sender.send(event);
			}
			None => trace_event(&event),
		}
	}

	pub fn progress(&self, step: StepKind, done: usize, total: usize) {
		self.emit(StepEvent::Progress { step, done, total });
	}

	pub fn message(&self, step: StepKind, level: EventLevel, text: impl Into<String>) {
		self.emit(StepEvent::Message {
			step,
			level,
			text: text.into(),
		});
	}

	pub fn debug(&self, step: StepKind, text: impl Into<String>) {
		self.message(step, EventLevel::Debug, text);
	}

	pub fn info(&self, step: StepKind, text: impl Into<String>) {
		self.message(step, EventLevel::Info, text);
	}

	pub fn warn(&self, step: StepKind, text: impl Into<String>) {
		self.message(step, EventLevel::Warn, text);
	}

	pub fn error(&self, step: StepKind, text: impl Into<String>) {
		self.message(step, EventLevel::Error, text);
	}
}

fn trace_event(event: &StepEvent) {
	match event {
		StepEvent::StepStarted { step } => tracing::info!(step = step.name(), "step started"),
		StepEvent::Progress { step, done, total } => {
			tracing::trace!(step = step.name(), done, total, "progress");
		}
		StepEvent::Message { step, level, text } => {
			match level {
				EventLevel::Debug => tracing::debug!(step = step.name(), "{text}"),
				EventLevel::Info => tracing::info!(step = step.name(), "{text}"),
				EventLevel::Warn => tracing::warn!(step = step.name(), "{text}"),
				EventLevel::Error => tracing::error!(step = step.name(), "{text}"),
			}
		}
		StepEvent::StepFinished { step, success } => {
			tracing::info!(step = step.name(), success, "step finished");
		}
	}
}
