use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;

use super::line::OutputLine;
use super::registry::{banner, cleared_banner, CommandRegistry};

/// Simulated processing delay for console commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub base: Duration,
    pub jitter: Duration,
    pub unknown: Duration,
}

impl Latency {
    pub fn new(base: Duration, jitter: Duration, unknown: Duration) -> Self {
        Self {
            base,
            jitter,
            unknown,
        }
    }

    /// No delay at all; completions are due the moment they are scheduled.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    fn sample_known(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(300),
            Duration::from_millis(400),
            Duration::from_millis(200),
        )
    }
}

/// Result of interpreting one command without a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// History is replaced by these lines.
    Cleared(Vec<OutputLine>),
    /// A registered command ran: blank separator followed by its lines.
    Output(Vec<OutputLine>),
    /// Nothing matched: alert block echoing the raw input.
    Unknown(Vec<OutputLine>),
}

impl Outcome {
    pub fn lines(&self) -> &[OutputLine] {
        match self {
            Outcome::Cleared(lines) | Outcome::Output(lines) | Outcome::Unknown(lines) => lines,
        }
    }
}

pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Pure dispatch: (registry, input) → outcome. `None` for blank input.
pub fn interpret(registry: &CommandRegistry, raw: &str) -> Option<Outcome> {
    let typed = raw.trim();
    if typed.is_empty() {
        return None;
    }

    let command = normalize(typed);
    if command == "clear" {
        return Some(Outcome::Cleared(cleared_banner()));
    }

    match registry.get(&command) {
        Some(handler) => {
            let mut lines = vec![OutputLine::blank()];
            lines.extend(handler());
            Some(Outcome::Output(lines))
        }
        None => Some(Outcome::Unknown(vec![
            OutputLine::alert(format!("  Command \"{}\" not recognized.", typed)),
            OutputLine::info("  Type \"help\" for available commands."),
        ])),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    id: u64,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank input, nothing happened.
    Ignored,
    /// A command is still in flight; the submission was dropped.
    Busy,
    /// History was reset synchronously.
    Cleared,
    /// Output will be appended once the ticket completes.
    Scheduled(Ticket),
}

struct InFlight {
    ticket: Ticket,
    due: Instant,
    lines: Vec<OutputLine>,
}

/// One console's state: append-only history plus at most one in-flight command.
pub struct ConsoleSession {
    registry: Arc<CommandRegistry>,
    latency: Latency,
    history: Vec<OutputLine>,
    in_flight: Option<InFlight>,
    generation: u64,
    next_id: u64,
}

impl ConsoleSession {
    pub fn new(registry: Arc<CommandRegistry>, latency: Latency) -> Self {
        Self {
            registry,
            latency,
            history: banner(),
            in_flight: None,
            generation: 0,
            next_id: 0,
        }
    }

    pub fn history(&self) -> &[OutputLine] {
        &self.history
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    #[cfg(test)]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// When the in-flight command (if any) becomes due.
    pub fn due_at(&self) -> Option<Instant> {
        self.in_flight.as_ref().map(|f| f.due)
    }

    pub fn submit(&mut self, raw: &str, now: Instant) -> Submission {
        if self.in_flight.is_some() {
            log::debug!("console busy, dropping {:?}", raw);
            return Submission::Busy;
        }

        let Some(outcome) = interpret(&self.registry, raw) else {
            return Submission::Ignored;
        };

        self.history.push(OutputLine::echo(format!("$ {}", raw.trim())));

        let (delay, lines) = match outcome {
            Outcome::Cleared(lines) => {
                self.history = lines;
                return Submission::Cleared;
            }
            Outcome::Output(lines) => (self.latency.sample_known(), lines),
            Outcome::Unknown(lines) => (self.latency.unknown, lines),
        };

        let ticket = Ticket {
            id: self.next_id,
            generation: self.generation,
        };
        self.next_id += 1;
        self.in_flight = Some(InFlight {
            ticket,
            due: now + delay,
            lines,
        });
        Submission::Scheduled(ticket)
    }

    /// Apply the in-flight command if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let ready = self
            .in_flight
            .as_ref()
            .filter(|f| f.due <= now)
            .map(|f| f.ticket);
        match ready {
            Some(ticket) => self.complete(ticket),
            None => false,
        }
    }

    /// Apply a completion. Stale tickets (other command, torn-down session) are ignored.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        match self.in_flight.take() {
            Some(f) if f.ticket == ticket => {
                self.history.extend(f.lines);
                true
            }
            other => {
                self.in_flight = other;
                false
            }
        }
    }

    /// Drop any pending completion; later completions for it become no-ops.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::line::LineKind;

    fn session() -> ConsoleSession {
        ConsoleSession::new(Arc::new(CommandRegistry::standard()), Latency::immediate())
    }

    fn run(session: &mut ConsoleSession, raw: &str) -> Submission {
        let submission = session.submit(raw, Instant::now());
        if let Submission::Scheduled(ticket) = submission {
            assert!(session.complete(ticket));
        }
        submission
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let registry = CommandRegistry::standard();
        let plain = interpret(&registry, "status").unwrap();
        for variant in ["  status  ", "STATUS", "\tStAtUs\n", "sTaTuS "] {
            assert_eq!(interpret(&registry, variant).unwrap(), plain, "{:?}", variant);
        }
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut s = session();
        let before = s.history().to_vec();
        assert_eq!(s.submit("   ", Instant::now()), Submission::Ignored);
        assert_eq!(s.history(), before.as_slice());
        assert!(!s.is_processing());
    }

    #[test]
    fn test_help_appends_blank_then_menu_each_time() {
        let mut s = session();
        let start = s.history().len();
        let menu = (s.registry().get("help").unwrap())();

        run(&mut s, "help");
        let first = s.history()[start..].to_vec();
        assert_eq!(first[0], OutputLine::echo("$ help"));
        assert_eq!(first[1], OutputLine::blank());
        assert_eq!(&first[2..], menu.as_slice());

        run(&mut s, "help");
        let second = s.history()[start + first.len()..].to_vec();
        assert_eq!(second, first);
    }

    #[test]
    fn test_second_submission_while_busy_is_dropped() {
        let mut s = session();
        let now = Instant::now();
        let start = s.history().len();

        let Submission::Scheduled(ticket) = s.submit("status", now) else {
            panic!("expected a scheduled command");
        };
        assert!(s.is_processing());
        assert_eq!(s.submit("products", now), Submission::Busy);
        assert_eq!(s.submit("clear", now), Submission::Busy);

        assert!(s.complete(ticket));
        assert!(!s.is_processing());

        let appended = &s.history()[start..];
        let status = (s.registry().get("status").unwrap())();
        assert_eq!(appended.len(), 2 + status.len());
        assert_eq!(appended[0], OutputLine::echo("$ status"));
        assert!(!appended.iter().any(|l| l.text.contains("PRODUCT")));
    }

    #[test]
    fn test_clear_resets_to_banner() {
        let mut s = session();
        run(&mut s, "help");
        run(&mut s, "nonsense");
        run(&mut s, "demo");

        assert_eq!(run(&mut s, "  ClEaR "), Submission::Cleared);
        assert_eq!(s.history(), cleared_banner().as_slice());
        assert!(!s.is_processing());
    }

    #[test]
    fn test_unknown_command_echoes_raw_text() {
        let mut s = session();
        let before = s.history().to_vec();

        run(&mut s, "  Launch Rockets ");

        let appended = &s.history()[before.len()..];
        assert_eq!(&s.history()[..before.len()], before.as_slice());
        assert_eq!(appended.len(), 3);
        assert_eq!(appended[0], OutputLine::echo("$ Launch Rockets"));
        assert_eq!(appended[1].kind, LineKind::Alert);
        assert_eq!(appended[1].text, "  Command \"Launch Rockets\" not recognized.");
        assert_eq!(appended[2].kind, LineKind::Info);
        assert_eq!(s.registry().len(), 6);
    }

    #[test]
    fn test_poll_waits_for_deadline() {
        let latency = Latency::new(
            Duration::from_millis(300),
            Duration::from_millis(400),
            Duration::from_millis(200),
        );
        let mut s = ConsoleSession::new(Arc::new(CommandRegistry::standard()), latency);
        let now = Instant::now();
        let start = s.history().len();

        s.submit("roi", now);
        let due = s.due_at().unwrap();
        assert!(due >= now + Duration::from_millis(300));
        assert!(due <= now + Duration::from_millis(700));

        assert!(!s.poll(now + Duration::from_millis(299)));
        assert_eq!(s.history().len(), start + 1);
        assert!(s.poll(now + Duration::from_millis(700)));
        assert!(!s.is_processing());
    }

    #[test]
    fn test_unknown_uses_fixed_delay() {
        let latency = Latency::new(
            Duration::from_millis(300),
            Duration::from_millis(400),
            Duration::from_millis(200),
        );
        let mut s = ConsoleSession::new(Arc::new(CommandRegistry::standard()), latency);
        let now = Instant::now();
        s.submit("xyzzy", now);
        assert_eq!(s.due_at(), Some(now + Duration::from_millis(200)));
    }

    #[test]
    fn test_late_completion_after_teardown_is_ignored() {
        let mut s = session();
        let Submission::Scheduled(ticket) = s.submit("book", Instant::now()) else {
            panic!("expected a scheduled command");
        };
        let snapshot = s.history().to_vec();

        s.teardown();
        assert!(!s.complete(ticket));
        assert_eq!(s.history(), snapshot.as_slice());
        assert!(!s.is_processing());
    }
}
