//! Subcommands, each driven through the same page controllers a graphical
//! front end would use.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Subcommand};
use client_core::{
    pages::{ModulesPage, SchedulePage, UsersPage},
    resources::{ContentForm, ModuleForm, UserForm},
    ClientError, LmsClient, ReorderOutcome, Route, Upload,
};
use shared::{
    domain::{ContentId, ContentType, ModuleId, UserId},
    protocol::RegisterRequest,
};
use tracing::warn;

use crate::render;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and keep the session for later commands.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LMS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a participant account and sign in as it.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirmation: String,
    },
    Logout,
    Whoami,
    Dashboard,
    #[command(subcommand)]
    Modules(ModuleCommand),
    #[command(subcommand)]
    Contents(ContentCommand),
    #[command(subcommand)]
    Participants(ParticipantCommand),
    #[command(subcommand)]
    Instructors(InstructorCommand),
    /// Month calendar of schedules.
    Schedule {
        /// `YYYY-MM`; defaults to the current month.
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
        /// Show the month before `--month`.
        #[arg(long, conflicts_with = "next")]
        prev: bool,
        /// Show the month after `--month`.
        #[arg(long)]
        next: bool,
        #[arg(long)]
        day: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// How many pages of results to fetch.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Show {
        id: i64,
    },
    Create(ModuleFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ModuleFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug, Default)]
pub struct ModuleFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    active: Option<bool>,
    /// Instructor user id.
    #[arg(long)]
    pemateri: Option<i64>,
    /// Image file uploaded as the module thumbnail.
    #[arg(long)]
    thumbnail: Option<PathBuf>,
}

impl ModuleFields {
    async fn apply(self, form: &mut ModuleForm) -> Result<()> {
        if let Some(v) = self.title {
            form.title = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.active {
            form.is_active = v;
        }
        if let Some(v) = self.pemateri {
            form.pemateri_id = Some(UserId(v));
        }
        if let Some(path) = self.thumbnail {
            form.thumbnail = Some(read_upload(&path).await?);
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum ContentCommand {
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        module: i64,
        #[command(flatten)]
        fields: ContentFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: ContentFields,
    },
    Delete {
        id: i64,
    },
    /// Move the item at position `--from` to position `--to` (1-based).
    Move {
        #[arg(long)]
        module: i64,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
}

#[derive(Args, Debug, Default)]
pub struct ContentFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    body: Option<String>,
    #[arg(long = "type")]
    content_type: Option<ContentType>,
    #[arg(long)]
    order: Option<u32>,
    #[arg(long)]
    published: Option<bool>,
    #[arg(long)]
    thumbnail: Option<PathBuf>,
}

impl ContentFields {
    async fn apply(self, form: &mut ContentForm) -> Result<()> {
        if let Some(v) = self.title {
            form.title = v;
        }
        if let Some(v) = self.body {
            form.body = v;
        }
        if let Some(v) = self.content_type {
            form.content_type = v;
        }
        if let Some(v) = self.order {
            form.order = v;
        }
        if let Some(v) = self.published {
            form.is_published = v;
        }
        if let Some(path) = self.thumbnail {
            form.thumbnail = Some(read_upload(&path).await?);
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum ParticipantCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    Create(NewUser),
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum InstructorCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    Create(NewUser),
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Leave out to keep the current password.
        #[arg(long)]
        password: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct NewUser {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

impl NewUser {
    fn apply(self, form: &mut UserForm) {
        form.name = self.name;
        form.email = self.email;
        form.password = self.password;
    }
}

fn parse_month(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got '{raw}'"))
}

async fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
    Ok(Upload {
        filename,
        mime_type,
        bytes,
    })
}

impl Command {
    /// Screen the command belongs to; private screens require a session.
    fn route(&self) -> Route {
        match self {
            Command::Login { .. } | Command::Logout => Route::Login,
            Command::Register { .. } => Route::Register,
            Command::Whoami => Route::Profile,
            Command::Dashboard => Route::Dashboard,
            Command::Modules(ModuleCommand::Show { id }) => Route::ModuleDetail(ModuleId(*id)),
            Command::Modules(_) => Route::Modules,
            Command::Contents(ContentCommand::Show { id }) => Route::ContentDetail(ContentId(*id)),
            Command::Contents(ContentCommand::Create { module, .. })
            | Command::Contents(ContentCommand::Move { module, .. }) => {
                Route::ModuleDetail(ModuleId(*module))
            }
            Command::Contents(_) => Route::Modules,
            Command::Participants(_) => Route::Participants,
            Command::Instructors(_) => Route::Instructors,
            Command::Schedule { .. } => Route::Schedule,
        }
    }
}

pub async fn run(client: &LmsClient, command: Command) -> Result<()> {
    let route = command.route();
    if !route.is_public() && client.navigate(route).await != route {
        bail!("not signed in; run `lms login --email <email>` first");
    }

    let result = dispatch(client, command).await;
    if let Err(err) = &result {
        let expired = err
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_unauthorized);
        if expired {
            return Err(anyhow!("session expired; please sign in again"));
        }
    }
    result
}

async fn dispatch(client: &LmsClient, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let mut page = client.login_page();
            match page.submit(&email, &password).await {
                Some(user) => {
                    println!("Signed in as {} ({})", user.name, user.role);
                    Ok(())
                }
                None => bail!("{}", page.error().unwrap_or("Login failed")),
            }
        }
        Command::Register {
            name,
            email,
            password,
            password_confirmation,
        } => {
            let mut page = client.register_page();
            let profile = RegisterRequest {
                name,
                email,
                password,
                password_confirmation,
            };
            match page.submit(&profile).await {
                Some(user) => {
                    println!("Welcome, {}! You are signed in.", user.name);
                    Ok(())
                }
                None => bail!("{}", page.error().unwrap_or("Registration failed")),
            }
        }
        Command::Logout => {
            client.profile_page().logout().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let user = client
                .profile_page()
                .user()
                .await
                .ok_or_else(|| anyhow!("not signed in"))?;
            render::profile(&user, &client.assets);
            Ok(())
        }
        Command::Dashboard => {
            let mut page = client.dashboard_page();
            page.load().await;
            if let Some(err) = page.state.error() {
                bail!("{err}");
            }
            render::dashboard(&page, &client.assets);
            Ok(())
        }
        Command::Modules(command) => modules(client, command).await,
        Command::Contents(command) => contents(client, command).await,
        Command::Participants(command) => participants(client, command).await,
        Command::Instructors(command) => instructors(client, command).await,
        Command::Schedule {
            month,
            prev,
            next,
            day,
        } => {
            let today = Local::now().date_naive();
            let mut page = client.schedule_page(today);
            page.load().await;
            if let Some(err) = page.state.error() {
                bail!("{err}");
            }
            position_calendar(&mut page, today, month, prev, next, day);
            render::calendar(&page);
            Ok(())
        }
    }
}

/// A month other than the current one starts with no day selected.
fn position_calendar(
    page: &mut SchedulePage,
    today: NaiveDate,
    month: Option<NaiveDate>,
    prev: bool,
    next: bool,
    day: Option<u32>,
) {
    if let Some(month) = month {
        page.show_month(month.year(), month.month());
    }
    if prev {
        page.prev_month();
    } else if next {
        page.next_month();
    }
    let shown = page.month();
    if (shown.year(), shown.month()) != (today.year(), today.month()) {
        page.clear_selection();
    }
    if let Some(day) = day {
        page.select_day(day);
    }
}

fn saved(ok: bool, error: Option<&str>, what: &str) -> Result<()> {
    if ok {
        println!("{what} saved.");
        Ok(())
    } else {
        bail!("{}", error.unwrap_or("Failed to save"))
    }
}

async fn editable_modules_page(client: &LmsClient) -> Result<ModulesPage> {
    let page = client.modules_page().await;
    if !page.can_edit() {
        bail!("your role cannot manage modules");
    }
    Ok(page)
}

async fn modules(client: &LmsClient, command: ModuleCommand) -> Result<()> {
    match command {
        ModuleCommand::List { search, pages } => {
            let mut page = client.modules_page().await;
            if search.trim().is_empty() {
                page.open().await;
            } else {
                page.search_now(&search).await;
            }
            for _ in 1..pages {
                if !page.load_more().await || page.list().error().is_some() {
                    break;
                }
            }
            if let Some(err) = page.list().error() {
                if page.list().items().is_empty() {
                    bail!("{err}");
                }
                warn!(error = %err, "failed to load a later page of modules");
                println!("Showing the modules loaded so far; a later page failed: {err}");
            }
            render::module_list(page.list().items(), &client.assets);
            if page.list().has_more() {
                println!("more modules available; use --pages {}", pages + 1);
            }
            Ok(())
        }
        ModuleCommand::Show { id } => {
            let mut page = client.module_detail_page(ModuleId(id)).await;
            page.load().await;
            if let Some(err) = page.error() {
                bail!("{err}");
            }
            render::module_detail(page.module(), page.contents(), &client.assets);
            Ok(())
        }
        ModuleCommand::Create(fields) => {
            let mut page = editable_modules_page(client).await?;
            page.open_create();
            fields.apply(&mut page.dialog.form).await?;
            let ok = page.save().await;
            saved(ok, page.dialog.error(), "Module")
        }
        ModuleCommand::Update { id, fields } => {
            let mut page = editable_modules_page(client).await?;
            let module = client.modules.get(ModuleId(id)).await?;
            page.open_edit(&module);
            fields.apply(&mut page.dialog.form).await?;
            let ok = page.save().await;
            saved(ok, page.dialog.error(), "Module")
        }
        ModuleCommand::Delete { id } => {
            let mut page = editable_modules_page(client).await?;
            page.delete(ModuleId(id)).await?;
            println!("Module {id} deleted.");
            Ok(())
        }
    }
}

async fn contents(client: &LmsClient, command: ContentCommand) -> Result<()> {
    match command {
        ContentCommand::Show { id } => {
            let mut page = client.content_detail_page(ContentId(id));
            page.load().await;
            if let Some(err) = page.state.error() {
                bail!("{err}");
            }
            if let Some(content) = page.content() {
                render::content(content, &client.assets);
            }
            Ok(())
        }
        ContentCommand::Create { module, fields } => {
            let mut page = client.module_detail_page(ModuleId(module)).await;
            if !page.can_edit() {
                bail!("your role cannot edit module contents");
            }
            page.load().await;
            if let Some(err) = page.error() {
                bail!("{err}");
            }
            page.open_create();
            fields.apply(&mut page.dialog.form).await?;
            let ok = page.save().await;
            saved(ok, page.dialog.error(), "Content")
        }
        ContentCommand::Update { id, fields } => {
            let content = client.contents.get(ContentId(id)).await?;
            let mut page = client.module_detail_page(content.module_id).await;
            if !page.can_edit() {
                bail!("your role cannot edit module contents");
            }
            page.open_edit(&content);
            fields.apply(&mut page.dialog.form).await?;
            let ok = page.save().await;
            saved(ok, page.dialog.error(), "Content")
        }
        ContentCommand::Delete { id } => {
            let content = client.contents.get(ContentId(id)).await?;
            let mut page = client.module_detail_page(content.module_id).await;
            if !page.can_edit() {
                bail!("your role cannot edit module contents");
            }
            page.delete(content.id).await?;
            println!("Content {id} deleted.");
            Ok(())
        }
        ContentCommand::Move { module, from, to } => {
            if from == 0 || to == 0 {
                bail!("positions start at 1");
            }
            let mut page = client.module_detail_page(ModuleId(module)).await;
            if !page.can_edit() {
                bail!("your role cannot reorder module contents");
            }
            page.load().await;
            if let Some(err) = page.error() {
                bail!("{err}");
            }
            match page.move_item(from - 1, to - 1).await? {
                ReorderOutcome::Unchanged => println!("Nothing to move."),
                ReorderOutcome::Confirmed => println!("New order saved."),
                ReorderOutcome::RolledBack { reason } => {
                    warn!(%reason, "reorder rolled back");
                    println!("Could not save the new order; showing the server's order.");
                }
            }
            render::module_detail(page.module(), page.contents(), &client.assets);
            Ok(())
        }
    }
}

async fn list_users(page: &mut UsersPage, search: &str, client: &LmsClient) -> Result<()> {
    if search.trim().is_empty() {
        page.load().await;
    } else {
        page.search_now(search).await;
    }
    if let Some(err) = page.state.error() {
        bail!("{err}");
    }
    render::users(page.users(), &client.assets);
    Ok(())
}

async fn create_user(mut page: UsersPage, new_user: NewUser) -> Result<()> {
    if !page.can_manage() {
        bail!("only admins can manage accounts");
    }
    page.open_create();
    new_user.apply(&mut page.dialog.form);
    let ok = page.save().await;
    saved(ok, page.dialog.error(), "Account")
}

async fn delete_user(mut page: UsersPage, id: i64) -> Result<()> {
    if !page.can_manage() {
        bail!("only admins can manage accounts");
    }
    page.delete(UserId(id)).await?;
    println!("Account {id} deleted.");
    Ok(())
}

async fn participants(client: &LmsClient, command: ParticipantCommand) -> Result<()> {
    let mut page = client.participants_page().await;
    match command {
        ParticipantCommand::List { search } => list_users(&mut page, &search, client).await,
        ParticipantCommand::Create(new_user) => create_user(page, new_user).await,
        ParticipantCommand::Delete { id } => delete_user(page, id).await,
    }
}

async fn instructors(client: &LmsClient, command: InstructorCommand) -> Result<()> {
    let mut page = client.instructors_page().await;
    match command {
        InstructorCommand::List { search } => list_users(&mut page, &search, client).await,
        InstructorCommand::Create(new_user) => create_user(page, new_user).await,
        InstructorCommand::Update {
            id,
            name,
            email,
            password,
        } => {
            page.load().await;
            let user = page
                .users()
                .iter()
                .find(|u| u.id == UserId(id))
                .cloned()
                .ok_or_else(|| anyhow!("no instructor with id {id}"))?;
            if !page.open_edit(&user) {
                bail!("only admins can manage accounts");
            }
            let form = &mut page.dialog.form;
            if let Some(v) = name {
                form.name = v;
            }
            if let Some(v) = email {
                form.email = v;
            }
            if let Some(v) = password {
                form.password = v;
            }
            let ok = page.save().await;
            saved(ok, page.dialog.error(), "Account")
        }
        InstructorCommand::Delete { id } => delete_user(page, id).await,
    }
}
