// src/jobs/tracker.rs
//! Local mirror of the tracked jobs with optimistic mutations.
//!
//! Every mutation snapshots the job, applies the change locally, then sends
//! it. A failed request puts the snapshot back. Mutations on one job are
//! numbered, and a response (or rollback) that belongs to an older mutation
//! is dropped so it cannot clobber newer edits. Once the last in-flight
//! mutation of a job resolves, the job lands on the newest confirmed server
//! copy, or on the state before the batch when every request failed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::jobs::backend::JobsBackend;
use crate::jobs::model::{Job, JobDetails, JobPatch, JobStatus, NewJob, TimelineEntry};
use crate::notify::Notifier;

const LOCAL_ID_PREFIX: &str = "local-";

/// Overlapping mutations on one job
#[derive(Debug)]
struct Pending {
    /// The job before the oldest mutation still unresolved
    base: Job,
    base_index: usize,
    newest: u64,
    in_flight: BTreeSet<u64>,
    /// Server copy from the highest-numbered mutation that succeeded
    confirmed: Option<(u64, Job)>,
}

#[derive(Debug, Default)]
struct TrackerState {
    jobs: Vec<Job>,
    pending: HashMap<String, Pending>,
    next_seq: u64,
}

impl TrackerState {
    fn position(&self, id: &str) -> Option<usize> {
        self.jobs.iter().position(|job| job.id == id)
    }

    /// Claim the next sequence number for a mutation of the job at `index`
    fn claim(&mut self, id: &str, index: usize) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        let base = &self.jobs[index];
        let pending = self.pending.entry(id.to_string()).or_insert_with(|| Pending {
            base: base.clone(),
            base_index: index,
            newest: seq,
            in_flight: BTreeSet::new(),
            confirmed: None,
        });
        pending.newest = seq;
        pending.in_flight.insert(seq);
        seq
    }
}

fn put_back(jobs: &mut Vec<Job>, job: Job, index: usize) {
    match jobs.iter().position(|j| j.id == job.id) {
        Some(i) => jobs[i] = job,
        None => {
            let index = index.min(jobs.len());
            jobs.insert(index, job);
        }
    }
}

enum Resolution {
    Confirmed(Job),
    Removed,
    Rejected,
}

/// An optimistic change awaiting its response
struct InFlight {
    id: String,
    seq: u64,
    index: usize,
    snapshot: Job,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStats {
    pub total: usize,
    pub by_status: BTreeMap<JobStatus, usize>,
}

impl JobStats {
    pub fn count(&self, status: JobStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Jobs that are neither rejected nor archived
    pub fn active(&self) -> usize {
        self.total - self.count(JobStatus::Rejected) - self.count(JobStatus::Archived)
    }
}

pub struct JobTracker {
    backend: Arc<dyn JobsBackend>,
    notifier: Arc<Notifier>,
    state: Mutex<TrackerState>,
}

impl JobTracker {
    pub fn new(backend: Arc<dyn JobsBackend>, notifier: Arc<Notifier>) -> Self {
        Self {
            backend,
            notifier,
            state: Mutex::new(TrackerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the local list with the server's. Responses to mutations
    /// started before the reload are ignored.
    pub async fn load(&self) -> Result<usize> {
        let result = self.backend.list().await;
        let jobs = self.notifier.report("Failed to load jobs", result)?;
        let count = jobs.len();
        let mut state = self.lock();
        state.jobs = jobs;
        state.pending.clear();
        info!("Loaded {} tracked jobs", count);
        Ok(count)
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.lock().jobs.clone()
    }

    pub fn get(&self, id: &str) -> Option<Job> {
        let state = self.lock();
        state.position(id).map(|i| state.jobs[i].clone())
    }

    pub fn filter_by_status(&self, status: JobStatus) -> Vec<Job> {
        self.lock()
            .jobs
            .iter()
            .filter(|job| job.status == status)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> JobStats {
        let state = self.lock();
        let mut by_status: BTreeMap<JobStatus, usize> =
            JobStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for job in &state.jobs {
            *by_status.entry(job.status).or_insert(0) += 1;
        }
        JobStats {
            total: state.jobs.len(),
            by_status,
        }
    }

    // ===== Mutations =====

    /// Move a job to `status`, recording the transition at the top of its timeline
    pub async fn change_status(&self, id: &str, status: JobStatus, note: &str) -> Result<Job> {
        let note = note.trim().to_string();
        let job = self
            .mutate(id, "Failed to update status", move |job| {
                job.timeline.insert(
                    0,
                    TimelineEntry {
                        status,
                        note,
                        date: Utc::now(),
                    },
                );
                job.status = status;
                Ok(JobPatch {
                    status: Some(status),
                    timeline: Some(job.timeline.clone()),
                    ..Default::default()
                })
            })
            .await?;
        self.notifier
            .success(format!("{} moved to {}", job.title, job.status));
        Ok(job)
    }

    pub async fn add_note(&self, id: &str, note: &str) -> Result<Job> {
        let note = note.trim().to_string();
        self.mutate(id, "Failed to add note", move |job| {
            if note.is_empty() {
                anyhow::bail!("Note is empty");
            }
            job.notes.push(note);
            Ok(JobPatch {
                notes: Some(job.notes.clone()),
                ..Default::default()
            })
        })
        .await
    }

    pub async fn remove_note(&self, id: &str, index: usize) -> Result<Job> {
        self.mutate(id, "Failed to remove note", move |job| {
            check_index("note", index, job.notes.len())?;
            job.notes.remove(index);
            Ok(JobPatch {
                notes: Some(job.notes.clone()),
                ..Default::default()
            })
        })
        .await
    }

    pub async fn remove_timeline_entry(&self, id: &str, index: usize) -> Result<Job> {
        self.mutate(id, "Failed to remove timeline entry", move |job| {
            check_index("timeline entry", index, job.timeline.len())?;
            job.timeline.remove(index);
            Ok(JobPatch {
                timeline: Some(job.timeline.clone()),
                ..Default::default()
            })
        })
        .await
    }

    /// Attach (or with `None`, detach) the resume and cover letter used for this application
    pub async fn link_documents(
        &self,
        id: &str,
        resume_id: Option<String>,
        cover_letter_id: Option<String>,
    ) -> Result<Job> {
        let job = self
            .mutate(id, "Failed to link documents", move |job| {
                job.resume_id = resume_id.clone();
                job.cover_letter_id = cover_letter_id.clone();
                Ok(JobPatch {
                    resume_id: Some(resume_id),
                    cover_letter_id: Some(cover_letter_id),
                    ..Default::default()
                })
            })
            .await?;
        self.notifier.success("Documents linked");
        Ok(job)
    }

    pub async fn update_details(&self, id: &str, details: JobDetails) -> Result<Job> {
        self.mutate(id, "Failed to update job", move |job| {
            if details.is_empty() {
                anyhow::bail!("No changes to save");
            }
            let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
            if blank(&details.title) || blank(&details.company) {
                anyhow::bail!("Title and company cannot be empty");
            }

            let JobDetails {
                title,
                company,
                location,
                url,
                salary,
            } = details.clone();
            if let Some(title) = title {
                job.title = title;
            }
            if let Some(company) = company {
                job.company = company;
            }
            if location.is_some() {
                job.location = location;
            }
            if url.is_some() {
                job.url = url;
            }
            if salary.is_some() {
                job.salary = salary;
            }
            Ok(JobPatch {
                details,
                ..Default::default()
            })
        })
        .await
    }

    /// Remove a job. On failure it is put back where it was.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let action = "Failed to delete job";
        let started = self.begin_delete(id);
        let in_flight = self.notifier.report(action, started)?;

        match self.backend.delete(id).await {
            Ok(()) => {
                let title = in_flight.snapshot.title.clone();
                self.resolve(in_flight, Resolution::Removed);
                info!("Deleted job {}", id);
                self.notifier.success(format!("Deleted {}", title));
                Ok(())
            }
            Err(e) => {
                warn!("Delete of job {} failed: {:#}", id, e);
                self.resolve(in_flight, Resolution::Rejected);
                self.notifier.error(action, &e);
                Err(e)
            }
        }
    }

    /// Add a job. A placeholder shows at the top of the list until the
    /// server assigns the real id.
    pub async fn create(&self, new_job: NewJob) -> Result<Job> {
        let action = "Failed to add job";
        if new_job.title.trim().is_empty() || new_job.company.trim().is_empty() {
            let err = anyhow!("Title and company are required");
            self.notifier.error(action, &err);
            return Err(err);
        }

        let local_id = format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4());
        let now = Utc::now();
        let placeholder = Job {
            id: local_id.clone(),
            title: new_job.title.trim().to_string(),
            company: new_job.company.trim().to_string(),
            location: new_job.location.clone(),
            url: new_job.url.clone(),
            salary: new_job.salary.clone(),
            status: new_job.status.unwrap_or(JobStatus::Saved),
            timeline: Vec::new(),
            notes: Vec::new(),
            resume_id: None,
            cover_letter_id: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().jobs.insert(0, placeholder);

        let result = self.backend.create(&new_job).await;

        let mut state = self.lock();
        let position = state.position(&local_id);
        match result {
            Ok(job) => {
                match position {
                    Some(i) => state.jobs[i] = job.clone(),
                    None => debug!("Placeholder {} gone before create returned", local_id),
                }
                drop(state);
                info!("Created job {}", job.id);
                self.notifier
                    .success(format!("Added {} at {}", job.title, job.company));
                Ok(job)
            }
            Err(e) => {
                if let Some(i) = position {
                    state.jobs.remove(i);
                }
                drop(state);
                self.notifier.error(action, &e);
                Err(e)
            }
        }
    }

    async fn mutate<F>(&self, id: &str, action: &str, apply: F) -> Result<Job>
    where
        F: FnOnce(&mut Job) -> Result<JobPatch>,
    {
        let started = self.begin(id, apply);
        let (in_flight, patch) = self.notifier.report(action, started)?;
        let result = self.backend.update(id, &patch).await;
        self.settle(in_flight, action, result)
    }

    /// Snapshot, apply locally, and claim a sequence number, all under one lock
    fn begin<F>(&self, id: &str, apply: F) -> Result<(InFlight, JobPatch)>
    where
        F: FnOnce(&mut Job) -> Result<JobPatch>,
    {
        if id.starts_with(LOCAL_ID_PREFIX) {
            anyhow::bail!("Job is still being created");
        }
        let mut state = self.lock();
        let index = state
            .position(id)
            .ok_or_else(|| anyhow!("Job {} not found", id))?;
        let snapshot = state.jobs[index].clone();

        let job = &mut state.jobs[index];
        let patch = match apply(job) {
            Ok(patch) => patch,
            Err(e) => {
                *job = snapshot;
                return Err(e);
            }
        };
        job.updated_at = Utc::now();

        let seq = state.claim(id, index);
        debug!("Job {} mutation {} applied locally", id, seq);
        Ok((
            InFlight {
                id: id.to_string(),
                seq,
                index,
                snapshot,
            },
            patch,
        ))
    }

    fn begin_delete(&self, id: &str) -> Result<InFlight> {
        if id.starts_with(LOCAL_ID_PREFIX) {
            anyhow::bail!("Job is still being created");
        }
        let mut state = self.lock();
        let index = state
            .position(id)
            .ok_or_else(|| anyhow!("Job {} not found", id))?;
        let seq = state.claim(id, index);
        let snapshot = state.jobs.remove(index);
        Ok(InFlight {
            id: id.to_string(),
            seq,
            index,
            snapshot,
        })
    }

    fn settle(&self, in_flight: InFlight, action: &str, result: Result<Job>) -> Result<Job> {
        match result {
            Ok(job) => {
                self.resolve(in_flight, Resolution::Confirmed(job.clone()));
                Ok(job)
            }
            Err(e) => {
                warn!("Mutation of job {} failed: {:#}", in_flight.id, e);
                self.resolve(in_flight, Resolution::Rejected);
                self.notifier.error(action, &e);
                Err(e)
            }
        }
    }

    fn resolve(&self, in_flight: InFlight, resolution: Resolution) {
        let InFlight {
            id,
            seq,
            index,
            snapshot,
        } = in_flight;
        let mut guard = self.lock();
        let TrackerState { jobs, pending, .. } = &mut *guard;

        let Some(entry) = pending.get_mut(&id) else {
            debug!("Ignoring response for job {} from before the last reload", id);
            return;
        };
        entry.in_flight.remove(&seq);
        let newest = entry.newest == seq;

        match resolution {
            Resolution::Removed => {
                pending.remove(&id);
                return;
            }
            Resolution::Confirmed(job) => {
                if entry.confirmed.as_ref().map_or(true, |(s, _)| *s < seq) {
                    entry.confirmed = Some((seq, job.clone()));
                }
                if newest {
                    put_back(jobs, job, index);
                } else {
                    debug!("Ignoring stale response for job {} (mutation {})", id, seq);
                }
            }
            Resolution::Rejected => {
                if newest {
                    put_back(jobs, snapshot, index);
                } else {
                    debug!("Skipping rollback of superseded mutation {} for job {}", seq, id);
                }
            }
        }

        if entry.in_flight.is_empty() {
            if let Some(done) = pending.remove(&id) {
                let settled = done.confirmed.map(|(_, job)| job).unwrap_or(done.base);
                put_back(jobs, settled, done.base_index);
            }
        }
    }
}

fn check_index(what: &str, index: usize, len: usize) -> Result<()> {
    if index >= len {
        anyhow::bail!("No {} at position {} (have {})", what, index + 1, len);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastLevel;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    type Reply = std::result::Result<Job, String>;

    /// Backend double. Updates echo the patch onto the stored job unless a
    /// scripted reply is queued or failures are switched on.
    #[derive(Default)]
    struct ScriptedBackend {
        jobs: Mutex<Vec<Job>>,
        replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
        patches: Mutex<Vec<(String, JobPatch)>>,
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl ScriptedBackend {
        fn with_jobs(jobs: Vec<Job>) -> Arc<Self> {
            Arc::new(Self {
                jobs: Mutex::new(jobs),
                ..Default::default()
            })
        }

        fn script(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().push_back(rx);
            tx
        }

        fn failing(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        fn patches(&self) -> Vec<(String, JobPatch)> {
            self.patches.lock().unwrap().clone()
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check_failure(&self) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("server unavailable");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl JobsBackend for ScriptedBackend {
        async fn list(&self) -> Result<Vec<Job>> {
            Ok(self.jobs.lock().unwrap().clone())
        }

        async fn get(&self, id: &str) -> Result<Job> {
            self.jobs
                .lock()
                .unwrap()
                .iter()
                .find(|j| j.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("not found"))
        }

        async fn create(&self, job: &NewJob) -> Result<Job> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_failure()?;
            let created = sample_job("j-new", &job.title, job.status.unwrap_or(JobStatus::Saved));
            Ok(created)
        }

        async fn update(&self, id: &str, patch: &JobPatch) -> Result<Job> {
            self.patches
                .lock()
                .unwrap()
                .push((id.to_string(), patch.clone()));
            let scripted = self.replies.lock().unwrap().pop_front();
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(rx) = scripted {
                return match rx.await {
                    Ok(Ok(job)) => Ok(job),
                    Ok(Err(msg)) => Err(anyhow!(msg)),
                    Err(_) => Err(anyhow!("reply dropped")),
                };
            }
            self.check_failure()?;

            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .iter_mut()
                .find(|j| j.id == id)
                .ok_or_else(|| anyhow!("not found"))?;
            if let Some(status) = patch.status {
                job.status = status;
            }
            if let Some(timeline) = &patch.timeline {
                job.timeline = timeline.clone();
            }
            if let Some(notes) = &patch.notes {
                job.notes = notes.clone();
            }
            if let Some(resume_id) = &patch.resume_id {
                job.resume_id = resume_id.clone();
            }
            if let Some(cover_letter_id) = &patch.cover_letter_id {
                job.cover_letter_id = cover_letter_id.clone();
            }
            if let Some(salary) = &patch.details.salary {
                job.salary = Some(salary.clone());
            }
            Ok(job.clone())
        }

        async fn delete(&self, _id: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_failure()
        }
    }

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, n, 9, 0, 0).unwrap()
    }

    fn sample_job(id: &str, title: &str, status: JobStatus) -> Job {
        Job {
            id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            url: None,
            salary: None,
            status,
            timeline: vec![TimelineEntry {
                status,
                note: String::new(),
                date: day(1),
            }],
            notes: vec!["Referral from Sam".to_string()],
            resume_id: None,
            cover_letter_id: None,
            created_at: day(1),
            updated_at: day(1),
        }
    }

    fn fixtures() -> Vec<Job> {
        vec![
            sample_job("j1", "Platform Engineer", JobStatus::Saved),
            sample_job("j2", "SRE", JobStatus::Applied),
            sample_job("j3", "Data Engineer", JobStatus::Rejected),
        ]
    }

    async fn tracker_with(backend: Arc<ScriptedBackend>) -> (Arc<JobTracker>, Arc<Notifier>) {
        let notifier = Arc::new(Notifier::new());
        let tracker = Arc::new(JobTracker::new(backend, notifier.clone()));
        tracker.load().await.unwrap();
        (tracker, notifier)
    }

    async fn wait_for_calls(backend: &ScriptedBackend, n: usize) {
        for _ in 0..1000 {
            if backend.calls() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("backend never received {} calls", n);
    }

    #[tokio::test]
    async fn test_change_status_prepends_timeline_and_patches() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, notifier) = tracker_with(backend.clone()).await;

        let job = tracker
            .change_status("j1", JobStatus::Applied, " Sent via portal ")
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Applied);
        assert_eq!(job.timeline.len(), 2);
        assert_eq!(job.timeline[0].status, JobStatus::Applied);
        assert_eq!(job.timeline[0].note, "Sent via portal");
        assert_eq!(job.timeline[1].status, JobStatus::Saved);

        let patches = backend.patches();
        assert_eq!(patches.len(), 1);
        let (id, patch) = &patches[0];
        assert_eq!(id, "j1");
        assert_eq!(patch.status, Some(JobStatus::Applied));
        assert_eq!(patch.timeline.as_ref().unwrap(), &job.timeline);
        assert_eq!(patch.notes, None);

        assert_eq!(tracker.get("j1").unwrap().status, JobStatus::Applied);
        assert_eq!(notifier.last().unwrap().message, "Platform Engineer moved to Applied");
    }

    #[tokio::test]
    async fn test_failed_status_change_rolls_back_to_snapshot() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, notifier) = tracker_with(backend.clone()).await;
        let before = tracker.jobs();

        backend.failing();
        let err = tracker
            .change_status("j2", JobStatus::Offer, "")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "server unavailable");
        assert_eq!(tracker.jobs(), before);
        let toast = notifier.last().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Failed to update status: server unavailable");
    }

    #[tokio::test]
    async fn test_optimistic_state_visible_while_in_flight() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;
        let before = tracker.jobs();
        let reply = backend.script();

        let task = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.add_note("j1", "Call back Friday").await }
        });
        wait_for_calls(&backend, 1).await;

        let pending = tracker.get("j1").unwrap();
        assert_eq!(pending.notes.last().unwrap(), "Call back Friday");

        reply.send(Err("gateway timeout".to_string())).unwrap();
        assert!(task.await.unwrap().is_err());
        assert_eq!(tracker.jobs(), before);
    }

    #[tokio::test]
    async fn test_stale_response_does_not_overwrite_newer_edit() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;
        let first_reply = backend.script();
        let second_reply = backend.script();

        let first = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.change_status("j1", JobStatus::Applied, "").await }
        });
        wait_for_calls(&backend, 1).await;
        let second = tokio::spawn({
            let tracker = tracker.clone();
            async move {
                tracker
                    .change_status("j1", JobStatus::Interviewing, "Phone screen")
                    .await
            }
        });
        wait_for_calls(&backend, 2).await;

        let mut interviewing = sample_job("j1", "Platform Engineer", JobStatus::Interviewing);
        interviewing.timeline = backend.patches()[1].1.timeline.clone().unwrap();
        second_reply.send(Ok(interviewing.clone())).unwrap();
        second.await.unwrap().unwrap();

        // The older request's response lands last and must be dropped
        first_reply
            .send(Ok(sample_job("j1", "Platform Engineer", JobStatus::Applied)))
            .unwrap();
        first.await.unwrap().unwrap();

        assert_eq!(tracker.get("j1").unwrap(), interviewing);
    }

    #[tokio::test]
    async fn test_superseded_failure_does_not_roll_back() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, notifier) = tracker_with(backend.clone()).await;
        let first_reply = backend.script();
        let second_reply = backend.script();

        let first = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.add_note("j2", "First").await }
        });
        wait_for_calls(&backend, 1).await;
        let second = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.change_status("j2", JobStatus::Interviewing, "").await }
        });
        wait_for_calls(&backend, 2).await;

        first_reply.send(Err("conflict".to_string())).unwrap();
        assert!(first.await.unwrap().is_err());
        // Still showing the newer in-flight edit
        assert_eq!(tracker.get("j2").unwrap().status, JobStatus::Interviewing);
        assert_eq!(notifier.last().unwrap().level, ToastLevel::Error);

        let mut confirmed = sample_job("j2", "SRE", JobStatus::Interviewing);
        confirmed.timeline = backend.patches()[1].1.timeline.clone().unwrap();
        second_reply.send(Ok(confirmed.clone())).unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(tracker.get("j2").unwrap(), confirmed);
    }

    async fn overlapping_failures(older_fails_first: bool) {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;
        let before = tracker.jobs();
        let first_reply = backend.script();
        let second_reply = backend.script();

        let first = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.add_note("j2", "First").await }
        });
        wait_for_calls(&backend, 1).await;
        let second = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.change_status("j2", JobStatus::Interviewing, "").await }
        });
        wait_for_calls(&backend, 2).await;

        if older_fails_first {
            first_reply.send(Err("conflict".to_string())).unwrap();
            assert!(first.await.unwrap().is_err());
            second_reply.send(Err("conflict".to_string())).unwrap();
            assert!(second.await.unwrap().is_err());
        } else {
            second_reply.send(Err("conflict".to_string())).unwrap();
            assert!(second.await.unwrap().is_err());
            // The older edit is still pending and stays visible
            assert_eq!(tracker.get("j2").unwrap().notes.last().unwrap(), "First");
            first_reply.send(Err("conflict".to_string())).unwrap();
            assert!(first.await.unwrap().is_err());
        }

        assert_eq!(tracker.jobs(), before);
    }

    #[tokio::test]
    async fn test_overlapping_failures_restore_original() {
        overlapping_failures(true).await;
        overlapping_failures(false).await;
    }

    #[tokio::test]
    async fn test_older_success_survives_newer_failure() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;
        let first_reply = backend.script();
        let second_reply = backend.script();

        let first = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.add_note("j2", "First").await }
        });
        wait_for_calls(&backend, 1).await;
        let second = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.change_status("j2", JobStatus::Offer, "").await }
        });
        wait_for_calls(&backend, 2).await;

        let mut noted = sample_job("j2", "SRE", JobStatus::Applied);
        noted.notes.push("First".to_string());
        first_reply.send(Ok(noted.clone())).unwrap();
        first.await.unwrap().unwrap();
        second_reply.send(Err("conflict".to_string())).unwrap();
        assert!(second.await.unwrap().is_err());

        assert_eq!(tracker.get("j2").unwrap(), noted);
    }

    #[tokio::test]
    async fn test_failed_delete_after_failed_edit_restores_original() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;
        let before = tracker.jobs();
        let reply = backend.script();

        let edit = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.add_note("j1", "Follow up").await }
        });
        wait_for_calls(&backend, 1).await;

        backend.failing();
        assert!(tracker.delete("j1").await.is_err());
        assert_eq!(tracker.get("j1").unwrap().notes.last().unwrap(), "Follow up");

        reply.send(Err("conflict".to_string())).unwrap();
        assert!(edit.await.unwrap().is_err());
        assert_eq!(tracker.jobs(), before);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_position() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, notifier) = tracker_with(backend.clone()).await;
        let before = tracker.jobs();

        backend.failing();
        assert!(tracker.delete("j2").await.is_err());
        assert_eq!(tracker.jobs(), before);
        assert_eq!(notifier.last().unwrap().level, ToastLevel::Error);
    }

    #[tokio::test]
    async fn test_delete_removes_job() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;

        tracker.delete("j1").await.unwrap();
        let ids: Vec<String> = tracker.jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["j2", "j3"]);
        assert!(tracker.delete("j1").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_index_sends_nothing() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, notifier) = tracker_with(backend.clone()).await;
        let before = tracker.jobs();

        assert!(tracker.remove_note("j1", 5).await.is_err());
        assert!(tracker.remove_timeline_entry("j1", 1).await.is_err());
        assert!(tracker.add_note("j1", "   ").await.is_err());

        assert!(backend.patches().is_empty());
        assert_eq!(tracker.jobs(), before);
        assert!(notifier
            .drain()
            .iter()
            .all(|t| t.level == ToastLevel::Error));
    }

    #[tokio::test]
    async fn test_remove_note_and_link_documents() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;

        let job = tracker.remove_note("j3", 0).await.unwrap();
        assert!(job.notes.is_empty());

        tracker
            .link_documents("j3", Some("r1".into()), None)
            .await
            .unwrap();
        let (_, patch) = backend.patches().pop().unwrap();
        assert_eq!(patch.resume_id, Some(Some("r1".to_string())));
        assert_eq!(patch.cover_letter_id, Some(None));
        assert_eq!(tracker.get("j3").unwrap().resume_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_update_details_rejects_blank_title() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;

        let details = JobDetails {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(tracker.update_details("j1", details).await.is_err());
        assert_eq!(tracker.get("j1").unwrap().title, "Platform Engineer");

        let details = JobDetails {
            salary: Some("CHF 140k".into()),
            ..Default::default()
        };
        tracker.update_details("j1", details).await.unwrap();
        let (_, patch) = backend.patches().pop().unwrap();
        assert_eq!(patch.details.salary.as_deref(), Some("CHF 140k"));
    }

    #[tokio::test]
    async fn test_create_replaces_placeholder() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend.clone()).await;

        let job = tracker
            .create(NewJob {
                title: "Staff Engineer".into(),
                company: "Globex".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let jobs = tracker.jobs();
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs[0], job);
        assert!(jobs.iter().all(|j| !j.id.starts_with(LOCAL_ID_PREFIX)));
    }

    #[tokio::test]
    async fn test_failed_create_removes_placeholder() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, notifier) = tracker_with(backend.clone()).await;
        let before = tracker.jobs();

        backend.failing();
        let result = tracker
            .create(NewJob {
                title: "Staff Engineer".into(),
                company: "Globex".into(),
                ..Default::default()
            })
            .await;
        assert!(result.is_err());
        assert_eq!(tracker.jobs(), before);
        assert_eq!(notifier.last().unwrap().message, "Failed to add job: server unavailable");

        let missing = tracker.create(NewJob::default()).await;
        assert!(missing.is_err());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_filter_and_stats() {
        let backend = ScriptedBackend::with_jobs(fixtures());
        let (tracker, _) = tracker_with(backend).await;

        let applied = tracker.filter_by_status(JobStatus::Applied);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].id, "j2");

        let stats = tracker.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(JobStatus::Saved), 1);
        assert_eq!(stats.count(JobStatus::Offer), 0);
        assert_eq!(stats.by_status.len(), JobStatus::ALL.len());
        assert_eq!(stats.active(), 2);
    }
}
