// src/cli.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::auth::AuthService;
use crate::billing::BillingService;
use crate::chat::ChatSession;
use crate::config::ClientConfig;
use crate::core::{ApiClient, ApiError, FsOps, SessionStore};
use crate::documents::{CoverLetterService, ResumeService};
use crate::jobs::{
    export_csv_string, parse_import_csv, JobStatus, JobTracker, NewJob, RestJobsBackend,
};
use crate::notify::{Notifier, Toast, ToastLevel};
use crate::routes::Route;
use crate::store::editors::{
    edit_named_list, reorder_section, set_personal_field, set_section_visibility,
};
use crate::store::{ListEdit, PersonalField, ResumeStore};
use crate::templates::{render, render_cover_letter, TemplateCatalog};
use crate::types::documents::ResumeDraft;
use crate::types::resume::ResumeMetaData;

#[derive(Parser)]
#[command(name = "cvenom")]
#[command(about = "Build resumes and cover letters, and track job applications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and save the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and discard the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Send a password reset link
    ForgotPassword { email: String },
    /// Set a new password with a reset token
    ResetPassword {
        token: String,
        #[arg(long)]
        password: String,
    },
    #[command(subcommand)]
    Resumes(ResumeCommand),
    /// Ask the assistant to edit a resume
    Chat {
        resume_id: String,
        message: String,
        /// File holding the job description to tailor against
        #[arg(long)]
        job_description: Option<PathBuf>,
        /// Save the edited resume back to the server
        #[arg(long)]
        save: bool,
    },
    #[command(subcommand)]
    CoverLetters(CoverLetterCommand),
    #[command(subcommand)]
    Jobs(JobCommand),
    #[command(subcommand)]
    Billing(BillingCommand),
    /// List the available resume templates
    Templates,
}

#[derive(Subcommand)]
pub enum ResumeCommand {
    List,
    Show { id: String },
    /// Render to HTML. Without an id the demo resume is rendered.
    Render {
        id: Option<String>,
        #[arg(long)]
        template: Option<String>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    Delete { id: String },
    Duplicate { id: String },
    /// Import a PDF or DOCX resume
    Import { file: PathBuf },
    /// Generate a resume for a job description file
    Generate {
        job_description: PathBuf,
        #[arg(long)]
        base: Option<String>,
    },
    /// Set a personal-info field (name, title, email, phone, location, website, linkedin, github, summary)
    Set {
        id: String,
        field: String,
        value: String,
    },
    /// Show, hide or move a section
    Section {
        id: String,
        key: String,
        #[arg(long, conflicts_with = "show")]
        hide: bool,
        #[arg(long)]
        show: bool,
        #[arg(long)]
        position: Option<usize>,
    },
    /// Remove entry NUMBER (1-based) from a list section
    RemoveEntry {
        id: String,
        section: String,
        number: usize,
    },
    /// Move an entry within a list section (1-based positions)
    MoveEntry {
        id: String,
        section: String,
        from: usize,
        to: usize,
    },
}

#[derive(Subcommand)]
pub enum CoverLetterCommand {
    List,
    Render {
        id: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    Generate {
        resume_id: String,
        job_description: PathBuf,
        #[arg(long)]
        tone: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum JobCommand {
    List {
        #[arg(long)]
        status: Option<String>,
    },
    Add {
        title: String,
        company: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        salary: Option<String>,
    },
    /// Move a job to a new status (defaults to the usual next step)
    Status {
        id: String,
        status: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
    },
    Note { id: String, text: String },
    Link {
        id: String,
        #[arg(long)]
        resume: Option<String>,
        #[arg(long)]
        cover_letter: Option<String>,
    },
    Delete { id: String },
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import saved listings from a CSV file (title,company,location,url,salary,status)
    Import { csv_file: PathBuf },
}

#[derive(Subcommand)]
pub enum BillingCommand {
    Plans,
    Checkout { plan_id: String },
    Verify { session_id: String },
    Status,
    Cancel,
    Portal,
    Credits,
}

impl Command {
    /// Dashboard page this command stands in for
    fn route(&self) -> Route {
        match self {
            Command::Login { .. }
            | Command::Logout
            | Command::ForgotPassword { .. }
            | Command::ResetPassword { .. } => Route::SignIn,
            Command::Register { .. } => Route::SignUp,
            Command::Whoami => Route::Dashboard,
            Command::Resumes(ResumeCommand::Render { id: None, .. }) | Command::Templates => {
                Route::Pricing
            }
            Command::Resumes(ResumeCommand::Show { id } | ResumeCommand::Set { id, .. }) => {
                Route::ResumeEditor(id.clone())
            }
            Command::Resumes(_) => Route::Resumes,
            Command::Chat { resume_id, .. } => Route::ResumeEditor(resume_id.clone()),
            Command::CoverLetters(_) => Route::CoverLetters,
            Command::Jobs(JobCommand::Status { id, .. } | JobCommand::Note { id, .. }) => {
                Route::JobDetail(id.clone())
            }
            Command::Jobs(_) => Route::Jobs,
            Command::Billing(BillingCommand::Plans) => Route::Pricing,
            Command::Billing(BillingCommand::Credits) => Route::Credits,
            Command::Billing(_) => Route::Billing,
        }
    }
}

pub struct App {
    pub config: ClientConfig,
    pub client: Arc<ApiClient>,
    pub notifier: Arc<Notifier>,
}

impl App {
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let session_file = config.session_file();
        let session = Arc::new(SessionStore::open(&session_file).await?);
        let client = Arc::new(ApiClient::new(&config, session)?);
        Ok(Self {
            config,
            client,
            notifier: Arc::new(Notifier::new()),
        })
    }

    fn resumes(&self) -> ResumeService {
        ResumeService::new(
            self.client.clone(),
            self.notifier.clone(),
            self.config.generation_poll.clone(),
        )
    }

    fn cover_letters(&self) -> CoverLetterService {
        CoverLetterService::new(self.client.clone(), self.notifier.clone())
    }

    fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone(), self.notifier.clone())
    }

    fn billing(&self) -> BillingService {
        BillingService::new(
            self.client.clone(),
            self.notifier.clone(),
            self.config.checkout_base_url.clone(),
        )
    }

    async fn jobs(&self) -> Result<JobTracker> {
        let backend = Arc::new(RestJobsBackend::new(self.client.clone()));
        let tracker = JobTracker::new(backend, self.notifier.clone());
        tracker.load().await?;
        Ok(tracker)
    }
}

pub async fn run(cli: Cli, mut config: ClientConfig) -> Result<()> {
    if let Some(url) = cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    info!("Using API at {}", config.api_base_url);

    let app = App::new(config).await?;
    let result = dispatch(&app, cli.command).await;
    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }

    let mut toasts = app.notifier.drain();
    if let (Err(e), true) = (&result, toasts.is_empty()) {
        toasts.push(Toast::from_error("Error", e));
    }
    for toast in &toasts {
        print_toast(toast);
    }
    result
}

fn print_toast(toast: &Toast) {
    let marker = match toast.level {
        ToastLevel::Success => "✅",
        ToastLevel::Info => "ℹ️ ",
        ToastLevel::Error => "❌",
    };
    println!("{} {}", marker, toast.message);
    if let Some(route) = &toast.redirect {
        println!("   → continue at {}", route);
    }
}

async fn dispatch(app: &App, command: Command) -> Result<()> {
    let route = command.route();
    if !route.is_public() && !app.client.session().is_signed_in() {
        let err = anyhow::Error::new(ApiError::SessionExpired {
            redirect: Route::SignIn,
        });
        app.notifier.push(Toast {
            level: ToastLevel::Error,
            message: format!("Sign in to open {}", route),
            redirect: Some(Route::SignIn),
        });
        return Err(err);
    }
    match command {
        Command::Login { email, password } => {
            let session = app.auth().login(&email, &password).await?;
            if let Some(user) = session.user {
                println!("Signed in as {}", user.email);
            }
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            app.auth().register(&name, &email, &password).await?;
        }
        Command::Logout => app.auth().logout().await?,
        Command::Whoami => {
            let user = app.auth().me().await?;
            println!("{} <{}>", user.name.as_deref().unwrap_or("-"), user.email);
            println!("  plan:    {}", user.plan.as_deref().unwrap_or("free"));
            if let Some(credits) = user.credits {
                println!("  credits: {}", credits);
            }
        }
        Command::ForgotPassword { email } => app.auth().forgot_password(&email).await?,
        Command::ResetPassword { token, password } => {
            app.auth().reset_password(&token, &password).await?
        }
        Command::Resumes(command) => handle_resume_command(app, command).await?,
        Command::Chat {
            resume_id,
            message,
            job_description,
            save,
        } => handle_chat(app, &resume_id, &message, job_description.as_deref(), save).await?,
        Command::CoverLetters(command) => handle_cover_letter_command(app, command).await?,
        Command::Jobs(command) => handle_job_command(app, command).await?,
        Command::Billing(command) => handle_billing_command(app, command).await?,
        Command::Templates => {
            let catalog = TemplateCatalog::builtin()?;
            for manifest in catalog.list() {
                println!(
                    "{:<13} {:<13} {}{}",
                    manifest.id,
                    manifest.name,
                    manifest.description,
                    if manifest.premium { " (premium)" } else { "" }
                );
                println!("{:<27} fonts: {}", "", manifest.fonts.join(", "));
            }
        }
    }
    Ok(())
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    FsOps::write_file_safe(path, content).await?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn read_text(path: &Path, what: &str) -> Result<String> {
    let text = FsOps::read_file_safe(path)
        .await
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))?;
    if text.trim().is_empty() {
        anyhow::bail!("{} file {} is empty", what, path.display());
    }
    Ok(text)
}

/// Load a resume, apply `edit` to it in a store, and save it back
async fn edit_resume<F>(app: &App, id: &str, edit: F) -> Result<()>
where
    F: FnOnce(&ResumeStore) -> Result<crate::store::ResumeAction>,
{
    let service = app.resumes();
    let record = service.get(id).await?;
    let mut store = ResumeStore::new(record.into_meta());
    let action = app.notifier.report("Edit rejected", edit(&store))?;
    store.dispatch(action);
    service.update(id, &ResumeDraft::from(store.state())).await?;
    Ok(())
}

async fn handle_resume_command(app: &App, command: ResumeCommand) -> Result<()> {
    let service = app.resumes();
    match command {
        ResumeCommand::List => {
            let resumes = service.list().await?;
            if resumes.is_empty() {
                println!("No resumes yet");
            }
            for resume in resumes {
                let updated = resume
                    .updated_at
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{:<24} {:<32} {:<13} {}",
                    resume.id, resume.title, resume.settings.template, updated
                );
            }
        }
        ResumeCommand::Show { id } => {
            let record = service.get(&id).await?;
            println!("{}", serde_json::to_string_pretty(&record.into_meta())?);
        }
        ResumeCommand::Render {
            id,
            template,
            output,
        } => {
            let mut meta = match &id {
                Some(id) => service.get(id).await?.into_meta(),
                None => ResumeMetaData::demo(),
            };
            if let Some(template) = template {
                meta.resume_settings.template = template;
            }
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!("{}.html", id.as_deref().unwrap_or("demo")))
            });
            write_output(&path, &render(&meta)).await?;
        }
        ResumeCommand::Delete { id } => service.delete(&id).await?,
        ResumeCommand::Duplicate { id } => {
            let copy = service.duplicate(&id).await?;
            println!("{}", copy.id);
        }
        ResumeCommand::Import { file } => {
            let record = service.import_file(&file).await?;
            println!("Imported as {} ({})", record.id, record.title);
        }
        ResumeCommand::Generate {
            job_description,
            base,
        } => {
            let description = read_text(&job_description, "Job description").await?;
            let ticket = service.start_generation(&description, base.as_deref()).await?;
            let resume_id = service.wait_for_generation(&ticket.generation_id).await?;
            println!("Generated resume {}", resume_id);
            println!("Open it at {}", Route::ResumeEditor(resume_id));
        }
        ResumeCommand::Set { id, field, value } => {
            let field = PersonalField::parse(&field)
                .ok_or_else(|| anyhow::anyhow!("Unknown personal field: {}", field))?;
            edit_resume(app, &id, |store| {
                Ok(set_personal_field(store.state(), field, &value))
            })
            .await?;
        }
        ResumeCommand::Section {
            id,
            key,
            hide,
            show,
            position,
        } => {
            if !hide && !show && position.is_none() {
                anyhow::bail!("Nothing to change: pass --hide, --show or --position");
            }
            let record = service.get(&id).await?;
            let mut store = ResumeStore::new(record.into_meta());
            if hide || show {
                let action = set_section_visibility(store.state(), &key, show);
                store.dispatch(action);
            }
            if let Some(position) = position {
                let action = app
                    .notifier
                    .report("Edit rejected", reorder_section(store.state(), &key, position))?;
                store.dispatch(action);
            }
            service.update(&id, &ResumeDraft::from(store.state())).await?;
        }
        ResumeCommand::RemoveEntry {
            id,
            section,
            number,
        } => {
            let index = one_based(number)?;
            edit_resume(app, &id, |store| {
                edit_named_list(store.state(), &section, ListEdit::Remove(index))
            })
            .await?;
        }
        ResumeCommand::MoveEntry {
            id,
            section,
            from,
            to,
        } => {
            let edit = ListEdit::Move {
                from: one_based(from)?,
                to: one_based(to)?,
            };
            edit_resume(app, &id, |store| edit_named_list(store.state(), &section, edit)).await?;
        }
    }
    Ok(())
}

fn one_based(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("Positions start at 1"))
}

async fn handle_chat(
    app: &App,
    resume_id: &str,
    message: &str,
    job_description: Option<&Path>,
    save: bool,
) -> Result<()> {
    let job_description = match job_description {
        Some(path) => Some(read_text(path, "Job description").await?),
        None => None,
    };

    let service = app.resumes();
    let record = service.get(resume_id).await?;
    let mut store = ResumeStore::new(record.into_meta());
    let mut session = ChatSession::new(app.client.clone(), app.notifier.clone());

    let outcome = session
        .send(&mut store, message, job_description.as_deref())
        .await?;
    println!("{}", outcome.reply);

    if outcome.applied > 0 {
        if save {
            service
                .update(resume_id, &ResumeDraft::from(store.state()))
                .await?;
        } else {
            app.notifier
                .info("Changes applied locally, rerun with --save to keep them");
        }
    }
    Ok(())
}

async fn handle_cover_letter_command(app: &App, command: CoverLetterCommand) -> Result<()> {
    let service = app.cover_letters();
    match command {
        CoverLetterCommand::List => {
            for letter in service.list().await? {
                println!(
                    "{:<24} {:<32} {}",
                    letter.id,
                    letter.title,
                    letter.company.as_deref().unwrap_or("")
                );
            }
        }
        CoverLetterCommand::Render { id, output } => {
            let letter = service.get(&id).await?;
            let meta = match letter.resume_id.as_deref() {
                Some(resume_id) => Some(app.resumes().get(resume_id).await?.into_meta()),
                None => None,
            };
            let (sender, settings) = match &meta {
                Some(meta) => (
                    meta.resume_data.personal_info.as_ref(),
                    meta.resume_settings.clone(),
                ),
                None => (None, Default::default()),
            };
            let html = render_cover_letter(&letter, sender, &settings);
            let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.html", id)));
            write_output(&path, &html).await?;
        }
        CoverLetterCommand::Generate {
            resume_id,
            job_description,
            tone,
        } => {
            let description = read_text(&job_description, "Job description").await?;
            let letter = service
                .generate(&resume_id, &description, tone.as_deref())
                .await?;
            println!("{}\n", letter.id);
            println!("{}", letter.content);
        }
        CoverLetterCommand::Delete { id } => service.delete(&id).await?,
    }
    Ok(())
}

async fn handle_job_command(app: &App, command: JobCommand) -> Result<()> {
    let tracker = app.jobs().await?;
    match command {
        JobCommand::List { status } => {
            let jobs = match status {
                Some(status) => tracker.filter_by_status(status.parse()?),
                None => tracker.jobs(),
            };
            for job in &jobs {
                println!(
                    "{:<24} {:<13} {:<28} {:<20} {}",
                    job.id,
                    job.status.label(),
                    job.title,
                    job.company,
                    job.last_activity().format("%Y-%m-%d")
                );
            }
            let stats = tracker.stats();
            let summary: Vec<String> = stats
                .by_status
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(status, count)| format!("{} {}", count, status.as_str()))
                .collect();
            println!(
                "\n{} jobs ({} active): {}",
                stats.total,
                stats.active(),
                summary.join(", ")
            );
        }
        JobCommand::Add {
            title,
            company,
            location,
            url,
            salary,
        } => {
            let job = tracker
                .create(NewJob {
                    title,
                    company,
                    location,
                    url,
                    salary,
                    status: None,
                })
                .await?;
            println!("{}", job.id);
        }
        JobCommand::Status { id, status, note } => {
            let current = tracker
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("Job {} not found", id))?;
            let status: JobStatus = match status {
                Some(status) => status.parse()?,
                None => current.status.suggested_next().ok_or_else(|| {
                    anyhow::anyhow!("{} has no next step, pass a status", current.status)
                })?,
            };
            tracker.change_status(&id, status, &note).await?;
        }
        JobCommand::Note { id, text } => {
            tracker.add_note(&id, &text).await?;
        }
        JobCommand::Link {
            id,
            resume,
            cover_letter,
        } => {
            tracker.link_documents(&id, resume, cover_letter).await?;
        }
        JobCommand::Delete { id } => tracker.delete(&id).await?,
        JobCommand::Export { output } => {
            let csv = export_csv_string(&tracker.jobs())?;
            match output {
                Some(path) => write_output(&path, &csv).await?,
                None => print!("{}", csv),
            }
        }
        JobCommand::Import { csv_file } => {
            let content = read_text(&csv_file, "CSV").await?;
            let batch = parse_import_csv(&content);
            let mut imported = 0;
            for job in batch.jobs {
                if tracker.create(job).await.is_ok() {
                    imported += 1;
                }
            }
            for skipped in &batch.skipped {
                println!("⚠️  Skipped {}", skipped);
            }
            println!("Imported {} job(s), skipped {}", imported, batch.skipped.len());
        }
    }
    Ok(())
}

async fn handle_billing_command(app: &App, command: BillingCommand) -> Result<()> {
    let billing = app.billing();
    match command {
        BillingCommand::Plans => {
            for plan in billing.plans().await? {
                println!("{:<12} {:<16} {}", plan.id, plan.name, plan.price_label());
                for feature in &plan.features {
                    println!("{:<12} - {}", "", feature);
                }
            }
        }
        BillingCommand::Checkout { plan_id } => {
            let (session, url) = billing.create_checkout(&plan_id).await?;
            println!("Complete payment at: {}", url);
            println!("Then run: cvenom billing verify {}", session.session_id);
        }
        BillingCommand::Verify { session_id } => {
            let verification = billing.verify_checkout(&session_id).await?;
            if let Some(credits) = verification.credits_added {
                println!("{} credits added", credits);
            }
            println!("→ {}", verification.landing_route());
        }
        BillingCommand::Status => match billing.subscription().await? {
            Some(subscription) => {
                println!(
                    "{} ({})",
                    if subscription.plan_name.is_empty() {
                        &subscription.plan_id
                    } else {
                        &subscription.plan_name
                    },
                    subscription.status
                );
                if let Some(end) = subscription.current_period_end {
                    let verb = if subscription.cancel_at_period_end {
                        "ends"
                    } else {
                        "renews"
                    };
                    println!("  {} {}", verb, end.format("%Y-%m-%d"));
                }
            }
            None => println!("No active subscription, see {}", Route::Pricing),
        },
        BillingCommand::Cancel => {
            billing.cancel_subscription().await?;
        }
        BillingCommand::Portal => println!("{}", billing.portal_url().await?),
        BillingCommand::Credits => {
            let credits = billing.credits().await?;
            println!("Balance: {}", credits.balance);
            if let (Some(limit), Some(left)) = (credits.monthly_limit, credits.monthly_remaining())
            {
                println!("This month: {} of {} left", left, limit);
            }
        }
    }
    Ok(())
}
