pub mod line;
pub mod registry;
pub mod session;

pub use line::{LineKind, OutputLine};
pub use registry::CommandRegistry;
pub use session::{interpret, ConsoleSession, Latency, Outcome, Submission};
