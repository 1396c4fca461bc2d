// src/jobs/export.rs
//! CSV export of tracked jobs, and bulk import of saved listings
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::jobs::model::{Job, JobStatus, NewJob};

#[derive(Debug, Serialize)]
struct JobRow<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    status: &'static str,
    salary: &'a str,
    url: &'a str,
    last_activity: String,
    last_note: &'a str,
    notes: usize,
    resume_id: &'a str,
    cover_letter_id: &'a str,
}

impl<'a> From<&'a Job> for JobRow<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            id: &job.id,
            title: &job.title,
            company: &job.company,
            location: job.location.as_deref().unwrap_or(""),
            status: job.status.as_str(),
            salary: job.salary.as_deref().unwrap_or(""),
            url: job.url.as_deref().unwrap_or(""),
            last_activity: job.last_activity().format("%Y-%m-%d").to_string(),
            last_note: job.notes.last().map(String::as_str).unwrap_or(""),
            notes: job.notes.len(),
            resume_id: job.resume_id.as_deref().unwrap_or(""),
            cover_letter_id: job.cover_letter_id.as_deref().unwrap_or(""),
        }
    }
}

pub fn export_csv<W: Write>(jobs: &[Job], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for job in jobs {
        csv_writer
            .serialize(JobRow::from(job))
            .with_context(|| format!("Failed to write job {}", job.id))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn export_csv_string(jobs: &[Job]) -> Result<String> {
    let mut buf = Vec::new();
    export_csv(jobs, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}

/// Import summary: parsed listings plus the rows that were skipped
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub jobs: Vec<NewJob>,
    pub skipped: Vec<String>,
}

/// Read `title,company[,location,url,salary,status]` rows. The first row is a header.
pub fn parse_import_csv(content: &str) -> ImportBatch {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut batch = ImportBatch::default();

    for (line, result) in reader.records().enumerate() {
        let row = line + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("CSV parsing error on row {}: {}", row, e);
                batch.skipped.push(format!("row {}: {}", row, e));
                continue;
            }
        };

        let field = |i: usize| {
            record
                .get(i)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let (Some(title), Some(company)) = (field(0), field(1)) else {
            batch
                .skipped
                .push(format!("row {}: title and company are required", row));
            continue;
        };

        let status = match field(5).map(|s| s.parse::<JobStatus>()) {
            Some(Ok(status)) => Some(status),
            Some(Err(e)) => {
                batch.skipped.push(format!("row {}: {}", row, e));
                continue;
            }
            None => None,
        };

        batch.jobs.push(NewJob {
            title,
            company,
            location: field(2),
            url: field(3),
            salary: field(4),
            status,
        });
    }

    batch
}
