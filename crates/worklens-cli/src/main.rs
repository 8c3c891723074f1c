//! `worklens` binary
//!
//! Thin entry point over the report library: builds a query from flags,
//! assembles against the store configured in the environment
//! (`FRAPPE_URL` / `FRAPPE_API_KEY` / `FRAPPE_API_SECRET`), and prints
//! JSON to stdout. Errors go to stderr as a structured payload.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::sync::Arc;
use worklens_report::{ReportAssembler, ReportQuery, Strategy};
use worklens_store::FrappeClient;

fn cli() -> Command {
    Command::new("worklens")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hierarchical progress reports from a remote document store")
        .subcommand_required(true)
        .subcommand(
            Command::new("report")
                .about("Assemble a progress report")
                .arg(Arg::new("from").long("from").help("Start date (YYYY-MM-DD, inclusive)"))
                .arg(Arg::new("to").long("to").help("End date (YYYY-MM-DD, inclusive day)"))
                .arg(Arg::new("company").long("company").help("Restrict to a company"))
                .arg(Arg::new("project").long("project").help("Restrict to a project id"))
                .arg(
                    Arg::new("owner")
                        .long("owner")
                        .help("Responsible-person identity (personal report)"),
                )
                .arg(Arg::new("keyword").long("keyword").help("Comment text filter"))
                .arg(
                    Arg::new("status")
                        .long("status")
                        .help("Task statuses, comma-separated (default: Open,Working,Completed,Overdue,Pending Review)"),
                )
                .arg(
                    Arg::new("project-status")
                        .long("project-status")
                        .help("Project statuses, comma-separated"),
                )
                .arg(
                    Arg::new("leaf")
                        .long("leaf")
                        .action(ArgAction::SetTrue)
                        .help("Keep only non-group tasks"),
                )
                .arg(
                    Arg::new("latest")
                        .long("latest")
                        .action(ArgAction::SetTrue)
                        .help("Keep only the most recent comment per task"),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .default_value("top-down")
                        .help("Resolution strategy: top-down or bottom-up"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the JSON output"),
                ),
        )
        .subcommand(
            Command::new("projects")
                .about("List projects (id and display name)")
                .arg(Arg::new("company").long("company").help("Restrict to a company")),
        )
        .subcommand(Command::new("companies").about("List distinct company names"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    if let Err(error) = run(&matches).await {
        eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
        std::process::exit(1);
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let store = Arc::new(FrappeClient::from_env()?);
    let assembler = ReportAssembler::new(store);

    match matches.subcommand() {
        Some(("report", args)) => {
            let query = query_from_args(args)?;
            let strategy: Strategy = args
                .get_one::<String>("strategy")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default();
            let report = assembler.with_strategy(strategy).assemble(&query).await?;
            print_json(&report, args.get_flag("pretty"))?;
        }
        Some(("projects", args)) => {
            let company = args.get_one::<String>("company").map(String::as_str);
            let summaries = assembler.project_summaries(company).await?;
            print_json(&summaries, false)?;
        }
        Some(("companies", _)) => {
            let companies = assembler.companies().await?;
            print_json(&companies, false)?;
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}

/// Reuse the entry-point parameter parsing for flag values.
fn query_from_args(args: &ArgMatches) -> anyhow::Result<ReportQuery> {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    for (flag, param) in [
        ("from", "from_date"),
        ("to", "to_date"),
        ("company", "company"),
        ("project", "project"),
        ("owner", "comment_owner"),
        ("keyword", "keyword"),
        ("status", "task_status"),
        ("project-status", "project_status"),
    ] {
        if let Some(value) = args.get_one::<String>(flag) {
            pairs.push((param, value.clone()));
        }
    }
    if args.get_flag("leaf") {
        pairs.push(("leaf", String::new()));
    }
    if args.get_flag("latest") {
        pairs.push(("latest", String::new()));
    }
    Ok(ReportQuery::from_pairs(&pairs)?)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
