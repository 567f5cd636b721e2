use std::collections::VecDeque;
use std::sync::OnceLock;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

/// Central output broker that owns every line the agent prints.
/// Lines are filtered by verbosity; tick summaries are batched until flushed.
#[derive(Clone)]
pub struct OutputBroker {
    sender: mpsc::UnboundedSender<BrokerMessage>,
}

/// A single line queued through the broker
pub struct OutputRequest {
    pub level: OutputLevel,
    pub message: String,
    pub timestamp: Instant,
}

enum BrokerMessage {
    Line(OutputRequest),
    FlushSummaries(Option<oneshot::Sender<()>>),
}

/// Output levels for filtering
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum OutputLevel {
    Error,      // Always shown
    Summary,    // Always shown, batched per scheduler tick
    Info,       // Level 1+
    Debug,      // Level 2+
    Trace,      // Level 2+
}

impl OutputLevel {
    pub fn is_enabled(&self, verbosity: u8) -> bool {
        match self {
            OutputLevel::Error | OutputLevel::Summary => true,
            OutputLevel::Info => verbosity >= 1,
            OutputLevel::Debug | OutputLevel::Trace => verbosity >= 2,
        }
    }
}

struct BrokerState {
    pending_summaries: VecDeque<String>,
    started: Instant,
}

const MAX_PENDING_SUMMARIES: usize = 200;

impl OutputBroker {
    /// Create a broker and start its worker. The worker lives on a dedicated
    /// thread so logging works with or without a tokio runtime.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let spawned = std::thread::Builder::new()
            .name("output-broker".to_string())
            .spawn(move || Self::broker_worker(receiver));
        if let Err(e) = spawned {
            eprintln!("⚠️ Output broker could not start, output is lost: {}", e);
        }

        Self { sender }
    }

    /// Queue a line. Dropped silently if the worker is gone.
    pub fn emit(&self, level: OutputLevel, message: String) {
        let request = OutputRequest {
            level,
            message,
            timestamp: Instant::now(),
        };
        let _ = self.sender.send(BrokerMessage::Line(request));
    }

    /// Print the batched summaries as one block
    pub fn flush_summaries(&self) {
        let _ = self.sender.send(BrokerMessage::FlushSummaries(None));
    }

    /// Flush summaries and wait until everything queued before this call is printed
    pub async fn flush_and_wait(&self) {
        let (done_sender, done_receiver) = oneshot::channel();
        if self.sender.send(BrokerMessage::FlushSummaries(Some(done_sender))).is_ok() {
            let _ = done_receiver.await;
        }
    }

    fn broker_worker(mut receiver: mpsc::UnboundedReceiver<BrokerMessage>) {
        let mut state = BrokerState {
            pending_summaries: VecDeque::new(),
            started: Instant::now(),
        };

        while let Some(message) = receiver.blocking_recv() {
            match message {
                BrokerMessage::Line(request) => Self::handle_output(&mut state, request),
                BrokerMessage::FlushSummaries(done) => {
                    Self::flush_pending_summaries(&mut state);
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                }
            }
        }

        Self::flush_pending_summaries(&mut state);
    }

    fn handle_output(state: &mut BrokerState, request: OutputRequest) {
        let verbosity = crate::verbosity::get_verbosity_level();
        if !request.level.is_enabled(verbosity) {
            return;
        }

        match request.level {
            OutputLevel::Summary => {
                state.pending_summaries.push_back(request.message);
                if state.pending_summaries.len() > MAX_PENDING_SUMMARIES {
                    state.pending_summaries.pop_front();
                }
            }
            OutputLevel::Error => eprintln!("{}", request.message),
            OutputLevel::Trace => {
                let elapsed = request.timestamp.duration_since(state.started);
                println!("[{:>9.3}s] {}", elapsed.as_secs_f64(), request.message);
            }
            _ => println!("{}", request.message),
        }
    }

    fn flush_pending_summaries(state: &mut BrokerState) {
        if state.pending_summaries.is_empty() {
            return;
        }

        println!("\n🎖️ === TICK SUMMARY ===");
        while let Some(summary) = state.pending_summaries.pop_front() {
            println!("{}", summary);
        }
        println!("🎖️ === END SUMMARY ===\n");
    }
}

impl Default for OutputBroker {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_BROKER: OnceLock<OutputBroker> = OnceLock::new();

/// Start the global broker early so the first lines are not delayed
pub fn init_output_broker() {
    get_output_broker();
}

pub fn get_output_broker() -> &'static OutputBroker {
    GLOBAL_BROKER.get_or_init(OutputBroker::new)
}

#[macro_export]
macro_rules! o_error {
    ($($arg:tt)*) => {
        $crate::output_broker::get_output_broker()
            .emit($crate::output_broker::OutputLevel::Error, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! o_summary {
    ($($arg:tt)*) => {
        $crate::output_broker::get_output_broker()
            .emit($crate::output_broker::OutputLevel::Summary, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! o_info {
    ($($arg:tt)*) => {
        $crate::output_broker::get_output_broker()
            .emit($crate::output_broker::OutputLevel::Info, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! o_debug {
    ($($arg:tt)*) => {
        $crate::output_broker::get_output_broker()
            .emit($crate::output_broker::OutputLevel::Debug, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! o_trace {
    ($($arg:tt)*) => {
        $crate::output_broker::get_output_broker()
            .emit($crate::output_broker::OutputLevel::Trace, format!($($arg)*))
    };
}
