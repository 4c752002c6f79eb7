use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{error, warn};

mod cache;
mod config;
mod db;
mod extract;
mod grade;
mod holidays;
mod models;
mod recommend;
mod report;
mod semester;
mod vacation;

use config::StrideConfig;
use holidays::{CsvHolidays, HolidayCalendar, HolidaySource, PgHolidays};
use models::RecommendKind;

#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Attendance, grade and calendar helper for students", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the holiday database schema
    InitDb,
    /// Load the institute holiday calendar
    Seed,
    /// Import holidays from a CSV file (name,date,is_floating)
    ImportHolidays {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Parse an MIS attendance report and recommend bunks per subject
    Attendance {
        #[arg(long)]
        file: PathBuf,
        /// MIME type reported by the uploader, if known
        #[arg(long)]
        mime: Option<String>,
        #[arg(long)]
        target: Option<u32>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Recommend bunks for a single attended/total pair
    Recommend {
        #[arg(long)]
        attended: u32,
        #[arg(long)]
        total: u32,
        #[arg(long)]
        target: Option<u32>,
        #[arg(long, value_enum, default_value_t = RecommendKind::Lecture)]
        kind: RecommendKind,
    },
    /// Map a weighted percentage to a grade
    Grade {
        #[arg(long)]
        percentage: f64,
    },
    /// Compute SGPA per semester and CGPA from a CSV of subject scores
    Gpa {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Resolve branch and semester from an institute email
    Semester {
        #[arg(long)]
        email: String,
        /// Resolve as of this date instead of today
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Suggest single-day leaves that make four-day weekends
    #[command(group(
        ArgGroup::new("source")
            .args(["holidays_csv", "database"])
            .multiple(false)
    ))]
    Vacations {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long, default_value_t = 1)]
        months: u32,
        #[arg(long)]
        skip_floating: bool,
        #[arg(long)]
        holidays_csv: Option<PathBuf>,
        /// Read holidays from Postgres instead of a CSV file
        #[arg(long)]
        database: bool,
    },
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("STRIDE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

async fn connect(config: &StrideConfig) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to a Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

fn resolve_target(requested: Option<u32>, config: &StrideConfig) -> u32 {
    let target = requested.unwrap_or(config.default_target);
    let clamped = target.clamp(1, 100);
    if clamped != target {
        warn!(requested = target, used = clamped, "target clamped to 1..=100");
    }
    clamped
}

async fn print_vacations<S: HolidaySource>(
    mut calendar: HolidayCalendar<S>,
    skip_floating: bool,
    year: i32,
    month: u32,
    months: u32,
) -> anyhow::Result<()> {
    calendar.include_floating(!skip_floating);
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("invalid month {year}-{month}"))?;

    let mut found = false;
    for offset in 0..months.max(1) {
        let first = start
            .checked_add_months(chrono::Months::new(offset))
            .context("month out of range")?;
        let holidays = calendar.for_month(first.year(), first.month()).await?;

        for day in vacation::scan_month(first.year(), first.month(), &holidays) {
            if let Some(suggestion) = &day.suggestion {
                found = true;
                println!("- {} ({}): {}", day.date, day.date.weekday(), suggestion);
            } else if day.long_weekend {
                println!("  {} ({}) part of a long weekend", day.date, day.date.weekday());
            }
        }
    }

    if !found {
        println!("No bridge days in this range.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let config = StrideConfig::load()?;

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(&config).await?;
            let inserted = db::seed(&pool).await?;
            println!("Seeded {inserted} holidays.");
        }
        Commands::ImportHolidays { csv } => {
            let pool = connect(&config).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Imported {inserted} holidays from {}.", csv.display());
        }
        Commands::Attendance {
            file,
            mime,
            target,
            json,
            out,
        } => {
            let target = resolve_target(target, &config);
            let records = match extract::extract_file(&file, mime.as_deref()) {
                Ok(records) => records,
                Err(err) => {
                    error!(error = %err, file = %file.display(), "attendance report rejected");
                    println!("Failed to parse attendance report.");
                    return Ok(());
                }
            };

            if records.is_empty() {
                println!("No attendance data found in this report.");
                return Ok(());
            }

            if json {
                let assessed = report::assess(&records, target);
                println!("{}", serde_json::to_string_pretty(&assessed)?);
                return Ok(());
            }

            let source = file.display().to_string();
            let rendered = report::build_report(&source, target, &records, config.report_limit);
            match out {
                Some(out) => {
                    std::fs::write(&out, rendered)?;
                    println!("Report written to {}.", out.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Recommend {
            attended,
            total,
            target,
            kind,
        } => {
            let target = resolve_target(target, &config);
            let percentage = recommend::attendance_percentage(attended, total);
            let result = recommend::recommend(attended, total, target, kind);
            println!(
                "{}% [{}] {}",
                percentage,
                result.kind.bucket(),
                result.message
            );
        }
        Commands::Grade { percentage } => {
            let result = grade::grade_for(percentage);
            println!("{} ({} points)", result.grade.label(), result.points);
        }
        Commands::Gpa { csv } => {
            let scores = grade::load_scores(&csv)?;
            let summaries = grade::summarize(&scores);

            if summaries.is_empty() {
                println!("No subject scores found in {}.", csv.display());
                return Ok(());
            }

            for summary in &summaries {
                println!(
                    "Semester {}: SGPA {:.2} over {} credits",
                    summary.semester, summary.sgpa, summary.credits
                );
                for (score, grade) in &summary.subjects {
                    println!(
                        "- {} {:.2}% -> {} ({})",
                        score.subject,
                        score.percentage,
                        grade.grade.label(),
                        grade.points
                    );
                }
            }
            println!("CGPA {:.2}", grade::overall_cgpa(&summaries));
        }
        Commands::Semester { email, on } => {
            let Some(student) = semester::parse_student(&email) else {
                println!("{email} is not a recognised student email.");
                return Ok(());
            };
            let today = on.unwrap_or_else(|| Utc::now().date_naive());
            let current = semester::current_semester(student.admission_year, today);
            let [odd, even] = semester::eligible_semesters(current);
            println!(
                "{} ({}, admitted {}): semester {} (showing {} and {})",
                student.roll_no, student.branch, student.admission_year, current, odd, even
            );
        }
        Commands::Vacations {
            year,
            month,
            months,
            skip_floating,
            holidays_csv,
            database,
        } => {
            let ttl = Duration::from_secs(config.cache_ttl_secs);
            if database {
                let pool = connect(&config).await?;
                let calendar = HolidayCalendar::new(PgHolidays::new(&pool), ttl);
                print_vacations(calendar, skip_floating, year, month, months).await?;
            } else {
                let path = holidays_csv
                    .or_else(|| config.holidays_csv.clone())
                    .context("pass --holidays-csv, set holidays_csv, or use --database")?;
                let calendar = HolidayCalendar::new(CsvHolidays::new(path), ttl);
                print_vacations(calendar, skip_floating, year, month, months).await?;
            }
        }
    }

    Ok(())
}
