use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::holidays;
use crate::models::Holiday;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_holiday(pool: &PgPool, holiday: &Holiday) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO stride.holidays (id, name, holiday_date, is_floating)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (holiday_date, name) DO UPDATE
        SET is_floating = EXCLUDED.is_floating
        WHERE stride.holidays.is_floating IS DISTINCT FROM EXCLUDED.is_floating
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&holiday.name)
    .bind(holiday.date)
    .bind(holiday.is_floating)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let calendar = vec![
        ("Republic Day", (2025, 1, 26), false),
        ("Maha Shivratri", (2025, 2, 26), true),
        ("Holi", (2025, 3, 14), false),
        ("Independence Day", (2025, 8, 15), false),
        ("Parsi New Year", (2025, 8, 19), true),
        ("Ganesh Chaturthi", (2025, 8, 27), false),
        ("Gandhi Jayanti", (2025, 10, 2), false),
        ("Diwali", (2025, 10, 21), false),
        ("Christmas", (2025, 12, 25), false),
    ];

    let mut inserted = 0usize;
    for (name, (year, month, day), is_floating) in calendar {
        let holiday = Holiday {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day).context("invalid date")?,
            is_floating,
        };
        if upsert_holiday(pool, &holiday).await? {
            inserted += 1;
        }
    }

    info!(inserted, "holiday calendar seeded");
    Ok(inserted)
}

pub async fn fetch_holidays(pool: &PgPool, year: i32) -> anyhow::Result<Vec<Holiday>> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid year")?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).context("invalid year")?;

    let rows = sqlx::query(
        "SELECT name, holiday_date, is_floating \
         FROM stride.holidays \
         WHERE holiday_date >= $1 AND holiday_date < $2 \
         ORDER BY holiday_date",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Holiday {
            name: row.get("name"),
            date: row.get("holiday_date"),
            is_floating: row.get("is_floating"),
        })
        .collect())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for holiday in holidays::read_csv(csv_path)? {
        if upsert_holiday(pool, &holiday).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}
