use std::collections::HashMap;

use super::line::OutputLine;

pub type Handler = fn() -> Vec<OutputLine>;

/// Fixed table of console commands. Built once, never mutated afterwards.
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl CommandRegistry {
    pub fn new(entries: &[(&'static str, Handler)]) -> Self {
        let mut handlers = HashMap::with_capacity(entries.len());
        for &(name, handler) in entries {
            debug_assert_eq!(name, name.to_lowercase(), "command names are lowercase");
            let previous = handlers.insert(name, handler);
            debug_assert!(previous.is_none(), "duplicate command `{}`", name);
        }
        Self { handlers }
    }

    /// The registry the console ships with.
    pub fn standard() -> Self {
        Self::new(&[
            ("help", help),
            ("status", status),
            ("products", products),
            ("roi", roi),
            ("demo", demo),
            ("book", book),
        ])
    }

    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).copied()
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lines shown when a session opens.
pub fn banner() -> Vec<OutputLine> {
    vec![
        OutputLine::system("// Parsec Core Network — Authorized Access Only"),
        OutputLine::system("// System Status: [STABLE]"),
        OutputLine::success("✓ Connection established to PARSEC_NODE_01"),
        OutputLine::blank(),
        OutputLine::info("  Type \"help\" to see available commands"),
    ]
}

/// Lines that replace the history on `clear`.
pub fn cleared_banner() -> Vec<OutputLine> {
    vec![
        OutputLine::system("// Terminal cleared"),
        OutputLine::info("  Type \"help\" to see available commands"),
    ]
}

fn help() -> Vec<OutputLine> {
    vec![
        OutputLine::info("┌─────────────────────────────────────────────────┐"),
        OutputLine::info("│  PARSEC COMMAND INTERFACE v2.4.1                │"),
        OutputLine::info("├─────────────────────────────────────────────────┤"),
        OutputLine::system("│  help      → Display this help menu             │"),
        OutputLine::system("│  status    → System health & metrics            │"),
        OutputLine::system("│  products  → View our AI solutions              │"),
        OutputLine::system("│  roi       → Calculate automation ROI           │"),
        OutputLine::system("│  demo      → Experience AI capability           │"),
        OutputLine::system("│  book      → Schedule a strategy call           │"),
        OutputLine::system("│  clear     → Clear terminal output              │"),
        OutputLine::info("└─────────────────────────────────────────────────┘"),
    ]
}

fn status() -> Vec<OutputLine> {
    vec![
        OutputLine::success("✓ PARSEC CORE STATUS"),
        OutputLine::system("──────────────────────────────────"),
        OutputLine::system("  Uptime:        99.97% (365 days)"),
        OutputLine::system("  Active Nodes:  47 worldwide"),
        OutputLine::system("  AI Models:     GPT-4, Claude, Custom LLMs"),
        OutputLine::system("  Latency:       12ms avg response"),
        OutputLine::system("  Security:      SOC2 Type II Compliant"),
        OutputLine::success("  Status:        ALL SYSTEMS OPERATIONAL"),
    ]
}

fn products() -> Vec<OutputLine> {
    vec![
        OutputLine::info("╔═══════════════════════════════════════════════╗"),
        OutputLine::info("║          PARSEC PRODUCT ECOSYSTEM             ║"),
        OutputLine::info("╠═══════════════════════════════════════════════╣"),
        OutputLine::success("║  [01] SIGMA HQ                                ║"),
        OutputLine::system("║       AI operating system for fit-out         ║"),
        OutputLine::system("║       contractors. Automate bids, manage      ║"),
        OutputLine::system("║       teams, track margins in real-time.      ║"),
        OutputLine::info("║───────────────────────────────────────────────║"),
        OutputLine::success("║  [02] VOICE AGENTS                            ║"),
        OutputLine::system("║       24/7 AI receptionists for dental        ║"),
        OutputLine::system("║       clinics. Never miss a call again.       ║"),
        OutputLine::info("║───────────────────────────────────────────────║"),
        OutputLine::success("║  [03] AI ASSISTANTS                           ║"),
        OutputLine::system("║       Personal AI that learns your workflow   ║"),
        OutputLine::system("║       and multiplies your productivity.       ║"),
        OutputLine::info("╚═══════════════════════════════════════════════╝"),
    ]
}

fn roi() -> Vec<OutputLine> {
    vec![
        OutputLine::info("📊 PARSEC ROI CALCULATOR"),
        OutputLine::system("──────────────────────────────────"),
        OutputLine::system("  Industry Average Results:"),
        OutputLine::blank(),
        OutputLine::success("  ▸ Time Saved:     40+ hours/week"),
        OutputLine::success("  ▸ Cost Reduction: 60% operational"),
        OutputLine::success("  ▸ Revenue Boost:  23% avg increase"),
        OutputLine::success("  ▸ ROI Timeline:   4-8 weeks"),
        OutputLine::blank(),
        OutputLine::alert("  → Type \"book\" for personalized ROI analysis"),
    ]
}

fn demo() -> Vec<OutputLine> {
    vec![
        OutputLine::info("🤖 INITIATING AI DEMONSTRATION..."),
        OutputLine::blank(),
        OutputLine::system("  User: \"Schedule a meeting with client X\""),
        OutputLine::success("  AI:   ✓ Checking calendar availability..."),
        OutputLine::success("        ✓ Found 3 open slots this week"),
        OutputLine::success("        ✓ Sent invitation to client@xyz.com"),
        OutputLine::success("        ✓ Added to CRM with context notes"),
        OutputLine::blank(),
        OutputLine::info("  ⚡ Task completed in 2.3 seconds"),
        OutputLine::system("     Manual equivalent: ~15 minutes"),
    ]
}

fn book() -> Vec<OutputLine> {
    vec![
        OutputLine::success("📅 STRATEGY SESSION BOOKING"),
        OutputLine::system("──────────────────────────────────"),
        OutputLine::system("  What you'll get:"),
        OutputLine::blank(),
        OutputLine::info("  ✦ 30-min discovery call"),
        OutputLine::info("  ✦ Custom automation roadmap"),
        OutputLine::info("  ✦ ROI projection for your business"),
        OutputLine::info("  ✦ Live product demonstration"),
        OutputLine::blank(),
        OutputLine::alert("  → Run `parsec ui` and open the Quiz tab to book"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_commands_registered() {
        let registry = CommandRegistry::standard();
        assert_eq!(
            registry.names(),
            vec!["book", "demo", "help", "products", "roi", "status"]
        );
        assert!(!registry.contains("clear"));
    }

    #[test]
    fn test_handlers_are_deterministic_and_non_empty() {
        let registry = CommandRegistry::standard();
        for name in registry.names() {
            let handler = registry.get(name).unwrap();
            let first = handler();
            assert!(!first.is_empty(), "{} produced no lines", name);
            assert_eq!(first, handler(), "{} is not deterministic", name);
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = CommandRegistry::standard();
        assert!(registry.get("HELP").is_none());
        assert!(registry.get(" help").is_none());
        assert!(registry.get("help").is_some());
    }
}
