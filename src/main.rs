mod cli;
mod config;
mod configurator;
mod console;
mod contact;
mod db;
mod llm;
mod quiz;
mod roi;
mod tui;
mod web;
mod workflows;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::{ColoredString, Colorize};

use cli::{Cli, Commands};
use configurator::{AgentConfig, Channel, Skill};
use console::{LineKind, OutputLine, Outcome};
use contact::lead::{ContactUpdate, UserContact};
use db::queries::{CONFIGURATOR_SNAPSHOT, LEAD_SNAPSHOT};
use quiz::{Industry, Language, QuestionBank, QuestionKind};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cfg = config::settings::load_config()?;
    quiz::tiers::validate(&quiz::tiers::RECOMMENDATIONS)?;

    match cli.command {
        Some(Commands::Ui) | None => tui::app::run_tui(&cfg)?,
        Some(Commands::Run { command }) => handle_run(&command.join(" ")),
        Some(Commands::Tiers { lang }) => handle_tiers(lang),
        Some(Commands::Questions { industry, lang }) => handle_questions(industry, lang)?,
        Some(Commands::History { limit }) => handle_history(limit)?,
        Some(Commands::Roi { hours, rate }) => handle_roi(hours, rate),
        Some(Commands::Configure {
            industry,
            channels,
            skills,
            reset,
        }) => handle_configure(&cfg, industry, &channels, &skills, reset)?,
        Some(Commands::Workflows {
            industry,
            lang,
            request,
            whatsapp,
        }) => match request {
            Some(id) => handle_workflow_request(&cfg, &id, whatsapp)?,
            None => handle_workflows(industry, lang),
        },
        Some(Commands::Lead {
            name,
            whatsapp,
            email,
        }) => handle_lead(ContactUpdate {
            name,
            whatsapp,
            email,
        })?,
        Some(Commands::Contact) => handle_contact(&cfg)?,
        Some(Commands::Ask { message }) => handle_ask(&cfg, &message.join(" ")).await?,
        Some(Commands::Serve { port }) => web::server::start_server(cfg, port).await?,
    }

    Ok(())
}

fn handle_run(raw: &str) {
    let registry = console::CommandRegistry::standard();
    let Some(outcome) = console::interpret(&registry, raw) else {
        return;
    };

    println!();
    println!("  {}", format!("$ {}", raw.trim()).white().bold());
    let lines = match &outcome {
        // A fresh process has no history to clear.
        Outcome::Cleared(_) => &[][..],
        other => other.lines(),
    };
    for line in lines {
        println!("  {}", paint(line));
    }
    println!();
}

fn paint(line: &OutputLine) -> ColoredString {
    let text = line.text.as_str();
    match line.kind {
        LineKind::System => text.normal(),
        LineKind::UserEcho => text.white().bold(),
        LineKind::Alert => text.yellow(),
        LineKind::Success => text.green(),
        LineKind::Info => text.cyan(),
    }
}

fn handle_tiers(lang: Language) {
    print_header(lang.pick("Recommendation tiers", "التوصيات"), None);
    for tier in &quiz::tiers::RECOMMENDATIONS {
        let range = format!("{:>3}-{:<3}", tier.range.0, tier.range.1);
        let title = tier.title_in(lang);
        let title = match tier.priority {
            quiz::Priority::Low => title.green(),
            quiz::Priority::Medium => title.yellow(),
            quiz::Priority::High => title.truecolor(255, 140, 60),
            quiz::Priority::Critical => title.red(),
        };
        println!("  {} {}  {}", "│".dimmed(), range.white().bold(), title.bold());
        println!("  {}          {}", "│".dimmed(), tier.description_in(lang).dimmed());
        println!("  {}          {} {}", "│".dimmed(), "→".cyan(), tier.suggested_agent_in(lang));
    }
    print_footer();
}

fn handle_questions(industry: Industry, lang: Language) -> Result<()> {
    let bank = QuestionBank::standard()?;
    let questions = bank.sequence(industry);

    print_header(industry.label_in(lang), Some(format!("{} questions", questions.len())));
    for (i, q) in questions.iter().enumerate() {
        let kind = match q.kind {
            QuestionKind::Single => "",
            QuestionKind::Multi => " (multi)",
        };
        println!(
            "\n  {} {}{}",
            format!("{:>2}.", i + 1).cyan(),
            q.prompt_in(lang).bold(),
            kind.dimmed()
        );
        println!("  {}", q.id.dimmed());
        for opt in q.options() {
            println!(
                "      {:>3}  {:<12} {}",
                opt.score.to_string().yellow(),
                opt.value.dimmed(),
                opt.label_in(lang)
            );
        }
    }
    println!();
    println!(
        "  {} {}-{}",
        "Score range:".dimmed(),
        bank.min_score(industry),
        bank.max_score(industry).to_string().bold()
    );
    print_footer();
    Ok(())
}

fn handle_history(limit: usize) -> Result<()> {
    let conn = db::schema::open_db()?;
    let runs = db::queries::recent_runs(&conn, limit)?;

    if runs.is_empty() {
        println!("\n  {} {}\n", "●".dimmed(), "No completed quizzes yet.".dimmed());
        return Ok(());
    }

    print_header("Completed quizzes", Some(format!("{} runs", runs.len())));
    for run in &runs {
        let when = chrono::DateTime::from_timestamp_millis(run.completed_at)
            .map(|dt| {
                dt.with_timezone(&chrono::Local)
                    .format("%b %d  %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "?".to_string());
        let label = run
            .industry
            .parse::<Industry>()
            .map(|i| i.label())
            .unwrap_or(run.industry.as_str());

        println!(
            "  {} {}  {:<24} {:<16} {:>4}  {}",
            "│".dimmed(),
            when.dimmed(),
            run.company_name.bold(),
            label.blue(),
            format!("{}%", run.percentage).yellow(),
            run.suggested_agent.green()
        );
    }
    print_footer();
    Ok(())
}

fn handle_roi(hours: u32, rate: u32) {
    let r = roi::calculate(hours, rate);
    print_header(
        "ROI estimate",
        Some(format!("{} h/week at ${}/h", r.hours_per_week, r.hourly_rate)),
    );
    println!("  {} {:<22} {}", "│".dimmed(), "Hours saved / year", r.annual_hours_saved.to_string().bold());
    println!("  {} {:<22} {}", "│".dimmed(), "Cost saved / year", format!("${}", r.annual_cost_saved).green().bold());
    println!("  {} {:<22} {}", "│".dimmed(), "ROI", format!("{}%", r.roi_percentage).cyan().bold());
    println!("  {} {:<22} {}", "│".dimmed(), "Payback", format!("{} weeks", r.payback_weeks).yellow());
    print_footer();
}

fn handle_configure(
    cfg: &config::settings::Config,
    industry: Option<Industry>,
    channels: &[Channel],
    skills: &[Skill],
    reset: bool,
) -> Result<()> {
    let conn = db::schema::open_db()?;
    let mut agent = load_or_default::<AgentConfig>(&conn, CONFIGURATOR_SNAPSHOT);

    if reset {
        agent.reset();
        db::queries::save_snapshot(&conn, CONFIGURATOR_SNAPSHOT, &agent)?;
        println!("\n  {} {}\n", "●".dimmed(), "Saved configuration cleared.".dimmed());
        return Ok(());
    }

    let changing = industry.is_some() || !channels.is_empty() || !skills.is_empty();
    if !changing && agent == AgentConfig::default() {
        println!(
            "\n  {} {}\n",
            "●".dimmed(),
            "No saved configuration. Start with --industry and some --channel/--skill flags.".dimmed()
        );
        return Ok(());
    }

    agent.apply(industry, channels, skills);
    let Some(industry) = agent.industry else {
        bail!("Pick an industry with --industry");
    };

    let channel_labels: Vec<&str> = agent.channels().iter().map(|c| c.label()).collect();
    let skill_labels: Vec<&str> = agent.skills().iter().map(|s| s.label()).collect();

    print_header("Agent configuration", Some(industry.label().to_string()));
    println!("  {} {:<10} {}", "│".dimmed(), "Channels", channel_labels.join(", "));
    println!("  {} {:<10} {}", "│".dimmed(), "Skills", skill_labels.join(", "));
    println!(
        "  {} {:<10} {}",
        "│".dimmed(),
        "Savings",
        format!("{} hours/month", agent.estimated_savings()).green().bold()
    );
    println!();
    let link = contact::whatsapp::link(
        &cfg.contact.whatsapp_number,
        &contact::whatsapp::quote_message(&agent),
    )?;
    println!("  {} {}", "Get a quote:".dimmed(), link.cyan());
    print_footer();

    if changing {
        db::queries::save_snapshot(&conn, CONFIGURATOR_SNAPSHOT, &agent)?;
    }
    Ok(())
}

/// A saved value that no longer parses is logged and replaced by the default.
fn load_or_default<T: serde::de::DeserializeOwned + Default>(
    conn: &rusqlite::Connection,
    key: &str,
) -> T {
    db::queries::load_snapshot(conn, key)
        .unwrap_or_else(|e| {
            log::warn!("ignoring saved {}: {:#}", key, e);
            None
        })
        .unwrap_or_default()
}

fn handle_workflows(industry: Option<Industry>, lang: Language) {
    let templates = workflows::for_industry(industry);
    let scope = industry.map_or(lang.pick("All", "الكل"), |i| i.label_in(lang));

    print_header(
        lang.pick("Workflow templates", "قوالب سير العمل"),
        Some(format!("{}  {}", scope, templates.len())),
    );
    if templates.is_empty() {
        println!("  {} {}", "│".dimmed(), "No templates for this industry yet.".dimmed());
    }
    for t in &templates {
        println!(
            "  {} {}  {}",
            "│".dimmed(),
            t.name_in(lang).bold(),
            t.category.label().dimmed()
        );
        println!("  {}   {}", "│".dimmed(), t.description_in(lang));
        println!(
            "  {}   {}  {} nodes  {} downloads  {}",
            "│".dimmed(),
            t.id.cyan(),
            t.nodes,
            t.downloads,
            format!("★ {:.1}", t.rating).yellow()
        );
    }
    print_footer();
}

fn handle_workflow_request(
    cfg: &config::settings::Config,
    id: &str,
    whatsapp: Option<String>,
) -> Result<()> {
    let template = workflows::find(id).with_context(|| format!("Unknown workflow template `{}`", id))?;

    let conn = db::schema::open_db()?;
    let mut lead = load_or_default::<UserContact>(&conn, LEAD_SNAPSHOT);
    lead.update(ContactUpdate {
        whatsapp,
        ..Default::default()
    });
    if !lead.has_whatsapp() {
        bail!("Add your WhatsApp number with --whatsapp so the template can be sent to you");
    }
    db::queries::save_snapshot(&conn, LEAD_SNAPSHOT, &lead)?;

    let link = contact::whatsapp::link(
        &cfg.contact.whatsapp_number,
        &contact::whatsapp::template_request_message(template),
    )?;
    println!("\n  {} {}", "◉".cyan(), template.name.bold());
    println!("  {} {}\n", "Request it:".dimmed(), link.cyan());
    Ok(())
}

fn handle_lead(update: ContactUpdate) -> Result<()> {
    let conn = db::schema::open_db()?;
    let mut lead = load_or_default::<UserContact>(&conn, LEAD_SNAPSHOT);
    lead.update(update);
    lead.submit()?;
    db::queries::save_snapshot(&conn, LEAD_SNAPSHOT, &lead)?;

    print_header("Contact saved", None);
    for (field, value) in [("Name", &lead.name), ("WhatsApp", &lead.whatsapp), ("Email", &lead.email)] {
        let value = if value.is_empty() { "-" } else { value.as_str() };
        println!("  {} {:<10} {}", "│".dimmed(), field, value);
    }
    print_footer();
    Ok(())
}

fn handle_contact(cfg: &config::settings::Config) -> Result<()> {
    let link = contact::whatsapp::link(&cfg.contact.whatsapp_number, &cfg.contact.default_message)?;
    println!("\n  {} {}\n", "◉".cyan(), link);
    Ok(())
}

async fn handle_ask(cfg: &config::settings::Config, message: &str) -> Result<()> {
    println!();
    println!("  {} {}", "◉".cyan(), "Thinking...".dimmed());

    let reply = llm::assistant::reply(&cfg.llm, message, &[]).await?;

    println!();
    println!("  {}", "─".repeat(60).dimmed());
    for line in reply.lines() {
        println!("  {}", line);
    }
    println!("  {}", "─".repeat(60).dimmed());
    println!();

    Ok(())
}

// ─── Rich output helpers ────────────────────────────────────

fn print_header(title: &str, detail: Option<String>) {
    println!();
    println!(
        "  {} {}  {}",
        "◉".cyan(),
        title.bold(),
        detail.unwrap_or_default().dimmed()
    );
    println!("  {}", "─".repeat(60).dimmed());
}

fn print_footer() {
    println!("  {}", "─".repeat(60).dimmed());
    println!();
}
