use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Datelike;
use sqlx::PgPool;
use tracing::debug;

use crate::cache::TtlCache;
use crate::db;
use crate::models::Holiday;

pub(crate) trait HolidaySource {
    async fn holidays_in_year(&self, year: i32) -> anyhow::Result<Vec<Holiday>>;
}

pub struct CsvHolidays {
    path: PathBuf,
}

impl CsvHolidays {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub fn read_csv(path: &Path) -> anyhow::Result<Vec<Holiday>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open holiday list {}", path.display()))?;
    let mut holidays = Vec::new();

    for result in reader.deserialize::<Holiday>() {
        holidays.push(result?);
    }

    Ok(holidays)
}

impl HolidaySource for CsvHolidays {
    async fn holidays_in_year(&self, year: i32) -> anyhow::Result<Vec<Holiday>> {
        Ok(read_csv(&self.path)?
            .into_iter()
            .filter(|holiday| holiday.date.year() == year)
            .collect())
    }
}

pub struct PgHolidays<'a> {
    pool: &'a PgPool,
}

impl<'a> PgHolidays<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl HolidaySource for PgHolidays<'_> {
    async fn holidays_in_year(&self, year: i32) -> anyhow::Result<Vec<Holiday>> {
        db::fetch_holidays(self.pool, year).await
    }
}

/// Read-only view over a holiday source, cached per year. Switching floating
/// holidays on or off invalidates the cache.
pub struct HolidayCalendar<S> {
    source: S,
    include_floating: bool,
    cache: TtlCache<i32, Vec<Holiday>, bool>,
}

impl<S: HolidaySource> HolidayCalendar<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        let mut cache = TtlCache::new(ttl);
        cache.set_filter(true);
        Self {
            source,
            include_floating: true,
            cache,
        }
    }

    pub fn include_floating(&mut self, include: bool) {
        if self.cache.set_filter(include) {
            debug!(include, "floating holiday filter changed, cache cleared");
        }
        self.include_floating = include;
    }

    pub async fn for_year(&mut self, year: i32) -> anyhow::Result<Vec<Holiday>> {
        let now = Instant::now();
        if let Some(cached) = self.cache.get(&year, now) {
            debug!(year, "holiday cache hit");
            return Ok(cached.clone());
        }

        let include_floating = self.include_floating;
        let holidays: Vec<Holiday> = self
            .source
            .holidays_in_year(year)
            .await?
            .into_iter()
            .filter(|holiday| include_floating || !holiday.is_floating)
            .collect();

        self.cache.insert(year, holidays.clone(), now);
        debug!(year, cached_years = self.cache.len(), "holidays loaded");
        Ok(holidays)
    }

    /// Holidays needed to scan a month, including the neighbouring year at
    /// January and December so bridge days across the boundary are seen.
    pub async fn for_month(&mut self, year: i32, month: u32) -> anyhow::Result<Vec<Holiday>> {
        let mut holidays = self.for_year(year).await?;
        if month == 1 {
            holidays.extend(self.for_year(year - 1).await?);
        }
        if month == 12 {
            holidays.extend(self.for_year(year + 1).await?);
        }
        Ok(holidays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::io::Write;

    struct CountingSource {
        holidays: Vec<Holiday>,
        calls: Cell<usize>,
    }

    impl HolidaySource for CountingSource {
        async fn holidays_in_year(&self, year: i32) -> anyhow::Result<Vec<Holiday>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self
                .holidays
                .iter()
                .filter(|holiday| holiday.date.year() == year)
                .cloned()
                .collect())
        }
    }

    fn holiday(name: &str, date: (i32, u32, u32), is_floating: bool) -> Holiday {
        Holiday {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            is_floating,
        }
    }

    fn source() -> CountingSource {
        CountingSource {
            holidays: vec![
                holiday("Independence Day", (2025, 8, 15), false),
                holiday("Parsi New Year", (2025, 8, 19), true),
                holiday("New Year", (2026, 1, 1), false),
            ],
            calls: Cell::new(0),
        }
    }

    #[tokio::test]
    async fn repeated_year_lookups_hit_cache() {
        let mut calendar = HolidayCalendar::new(source(), Duration::from_secs(300));

        let first = calendar.for_year(2025).await.unwrap();
        let second = calendar.for_year(2025).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(calendar.source.calls.get(), 1);
    }

    #[tokio::test]
    async fn excluding_floating_refetches() {
        let mut calendar = HolidayCalendar::new(source(), Duration::from_secs(300));
        calendar.for_year(2025).await.unwrap();

        calendar.include_floating(false);
        let fixed = calendar.for_year(2025).await.unwrap();
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].name, "Independence Day");
        assert_eq!(calendar.source.calls.get(), 2);
    }

    #[tokio::test]
    async fn december_includes_next_year() {
        let mut calendar = HolidayCalendar::new(source(), Duration::from_secs(300));
        let holidays = calendar.for_month(2025, 12).await.unwrap();
        assert_eq!(holidays.len(), 3);
    }

    #[tokio::test]
    async fn csv_source_filters_by_year() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,date,is_floating").unwrap();
        writeln!(file, "Independence Day,2025-08-15,false").unwrap();
        writeln!(file, "Republic Day,2026-01-26,false").unwrap();

        let csv = CsvHolidays::new(file.path());
        let holidays = csv.holidays_in_year(2026).await.unwrap();
        assert_eq!(holidays.len(), 1);
        assert_eq!(holidays[0].name, "Republic Day");
    }
}
