use clap::{Parser, Subcommand};

use crate::configurator::{Channel, Skill};
use crate::quiz::{Industry, Language};

#[derive(Parser)]
#[command(name = "parsec", about = "ParSec system console and automation readiness tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive console and quiz
    Ui,
    /// Run a single console command (e.g. `parsec run status`)
    Run {
        #[arg(trailing_var_arg = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Show the recommendation tiers
    Tiers {
        /// en or ar
        #[arg(long, default_value = "en")]
        lang: Language,
    },
    /// List the quiz questions for an industry
    Questions {
        /// real-estate, healthcare, construction, ecommerce or other
        industry: Industry,
        /// en or ar
        #[arg(long, default_value = "en")]
        lang: Language,
    },
    /// Show completed quiz runs
    History {
        /// Max results
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Estimate the return on automating repetitive work
    Roi {
        /// Hours per week spent on repetitive tasks (5-100)
        #[arg(long, default_value = "40")]
        hours: u32,
        /// Average hourly cost (10-100)
        #[arg(long, default_value = "25")]
        rate: u32,
    },
    /// Configure an agent and get a quote link. Without flags, shows the saved one
    Configure {
        #[arg(long)]
        industry: Option<Industry>,
        /// Add or remove a channel; repeat for several
        #[arg(long = "channel")]
        channels: Vec<Channel>,
        /// Add or remove a skill; repeat for several
        #[arg(long = "skill")]
        skills: Vec<Skill>,
        /// Clear the saved configuration
        #[arg(long, conflicts_with_all = ["industry", "channels", "skills"])]
        reset: bool,
    },
    /// Browse workflow templates or request one over WhatsApp
    Workflows {
        /// Only templates for this industry
        #[arg(long)]
        industry: Option<Industry>,
        /// en or ar
        #[arg(long, default_value = "en")]
        lang: Language,
        /// Template id to request
        #[arg(long)]
        request: Option<String>,
        /// Your WhatsApp number, remembered for later requests
        #[arg(long)]
        whatsapp: Option<String>,
    },
    /// Leave your contact details for a follow-up
    Lead {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        whatsapp: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Print a WhatsApp link with the default greeting
    Contact,
    /// Ask the ParSec assistant a question
    Ask {
        #[arg(trailing_var_arg = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Serve the HTTP API
    Serve {
        /// Port to serve on
        #[arg(long, default_value = "3141")]
        port: u16,
    },
}
