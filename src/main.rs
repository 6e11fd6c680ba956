use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{info, warn};

use tanedu_client::api::models::{Department, NewCourse, Profile, Role};
use tanedu_client::api::ApiClient;
use tanedu_client::app::AppState;
use tanedu_client::error::ApiError;
use tanedu_client::grades::summarize_by_subject;
use tanedu_client::schedule::{CourseSource, DayFallback, build_schedule_rows_with};
use tanedu_client::ui::{chat_view, department_view, grades_view, login, schedule_table, sidebar};
use tanedu_client::{group_conversations, utils};

/// Terminal client for the TanEdu school administration system.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// API root, e.g. http://localhost:8080/api (overrides the saved one)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Log requests and decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session token
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the session token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Set a new password for the signed-in user
    ChangePassword {
        #[arg(long)]
        password: Option<String>,
    },
    /// List conversations, most recent first
    Conversations,
    /// Show every message exchanged with one user
    Thread { other_user_id: i64 },
    /// Send a direct message
    Send {
        #[arg(long, value_name = "EMAIL")]
        to: String,
        text: String,
    },
    /// Print the weekly timetable
    Schedule {
        /// Department to browse (administrators only)
        #[arg(long)]
        department: Option<String>,
        /// Show courses with an unknown day in their own column instead of under Tuesday
        #[arg(long)]
        strict_days: bool,
    },
    /// Add a course to the timetable
    CourseCreate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        day: String,
        #[arg(long)]
        duration: String,
        /// Teacher email
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        department: String,
    },
    /// Remove a course from the timetable
    CourseDelete { id: i64 },
    /// List departments
    Departments,
    /// Show grades by subject with the average
    Grades,
    /// Show the message board of a department
    DeptMessages {
        /// Department id; defaults to your own department
        #[arg(long)]
        department: Option<i64>,
    },
    /// Post to a department message board
    DeptSend {
        /// Department id; defaults to your own department
        #[arg(long)]
        department: Option<i64>,
        text: String,
    },
    /// List teacher email addresses
    Teachers,
}

fn client_for(state: &AppState) -> Result<ApiClient> {
    if !state.is_logged_in() {
        return Err(ApiError::NotLoggedIn).context("run `tanedu login` first");
    }
    Ok(ApiClient::new(&state.base_url, state.token.clone())?)
}

/// Bad credentials get the familiar message; transport and decode errors keep their own.
fn login_failure(err: ApiError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::Error::new(err).context("Hibás email/jelszó!")
    } else {
        anyhow::Error::new(err)
    }
}

/// Explicit id first, then the user's own department. Administrators without a
/// department fall back to the first listed one.
fn pick_department(explicit: Option<i64>, me: &Profile, role: &Role, departments: &[Department]) -> Option<i64> {
    explicit.or(me.department_id).or_else(|| match role {
        Role::Sysadmin => departments.iter().find_map(|d| d.id),
        _ => None,
    })
}

fn resolve_department(client: &ApiClient, explicit: Option<i64>) -> Result<(Profile, i64)> {
    let (me, role) = utils::block_on(async { tokio::try_join!(client.current_user(), client.current_user_role()) })?;
    let departments = if explicit.is_none() && me.department_id.is_none() && role == Role::Sysadmin {
        utils::block_on(client.departments())?
    } else {
        Vec::new()
    };
    match pick_department(explicit, &me, &role, &departments) {
        Some(id) => Ok((me, id)),
        None => bail!("no department to show, pass --department"),
    }
}

fn run(cli: Cli, state: &mut AppState) -> Result<()> {
    if let Some(url) = cli.base_url {
        state.base_url = url;
    }

    match cli.command {
        Command::Login { email, password } => {
            let stdin = std::io::stdin();
            let creds = login::resolve_credentials(
                email,
                password,
                |key| std::env::var(key).ok(),
                &mut stdin.lock(),
                &mut std::io::stderr(),
            )?;
            if let Err(msg) = creds.validate() {
                bail!(msg);
            }
            let mut client = ApiClient::new(&state.base_url, None)?;
            let token = utils::block_on(client.login(&creds.email, &creds.password)).map_err(login_failure)?;
            state.login(token, Utc::now());
            info!("logged in as {}", creds.email);
            println!("Logged in as {}", creds.email);
        }
        Command::Logout => {
            state.logout();
            println!("Logged out");
        }
        Command::Whoami => {
            let client = client_for(state)?;
            let (profile, role) = utils::block_on(async {
                client.check_token().await?;
                tokio::try_join!(client.current_user(), client.current_user_role())
            })?;
            println!("{} <{}>", profile.display_name(), profile.email);
            println!("role: {}", role);
            if !profile.department_name.is_empty() {
                println!("department: {}", profile.department_name);
            }
        }
        Command::ChangePassword { password } => {
            let client = client_for(state)?;
            let password = match password {
                Some(p) => p,
                None => login::prompt(&mut std::io::stdin().lock(), &mut std::io::stderr(), "Új jelszó")?,
            };
            if password.is_empty() {
                bail!("password must not be empty");
            }
            utils::block_on(client.change_password(&password))?;
            println!("Password changed");
        }
        Command::Conversations => {
            let client = client_for(state)?;
            let (me, messages) = utils::block_on(async {
                tokio::try_join!(client.current_user(), client.messages_for_current_user())
            })?;
            let conversations = group_conversations(&messages, me.id);
            print!("{}", sidebar::render_conversations(&conversations));
        }
        Command::Thread { other_user_id } => {
            let client = client_for(state)?;
            let (me, messages) = utils::block_on(async {
                tokio::try_join!(client.current_user(), client.messages_for_current_user())
            })?;
            let conversations = group_conversations(&messages, me.id);
            match conversations.iter().find(|c| c.other_user_id == other_user_id) {
                Some(conv) => print!("{}", chat_view::render_thread(conv, me.id)),
                None => println!("No conversation with user {}", other_user_id),
            }
        }
        Command::Send { to, text } => {
            if to.trim().is_empty() || text.trim().is_empty() {
                bail!("recipient and message are both required");
            }
            let client = client_for(state)?;
            utils::block_on(client.send_message(to.trim(), &text))?;
            println!("Sent to {}", to.trim());
        }
        Command::Schedule { department, strict_days } => {
            let client = client_for(state)?;
            let courses = utils::block_on(async {
                let role = client.current_user_role().await?;
                let source = CourseSource::for_role(&role, department.as_deref());
                info!("loading courses for {} from {:?}", role, source);
                client.courses(&source).await
            })?;
            let fallback = if strict_days { DayFallback::Unrecognized } else { DayFallback::Tuesday };
            let rows = build_schedule_rows_with(&courses, fallback);
            print!("{}", schedule_table::render_schedule(&rows));
        }
        Command::CourseCreate { name, day, duration, teacher, department } => {
            let course = NewCourse { name, day, duration, teacher_email: teacher, department_name: department };
            if [&course.name, &course.teacher_email, &course.department_name].iter().any(|f| f.trim().is_empty()) {
                bail!("Kérlek töltsd ki az összes mezőt!");
            }
            let client = client_for(state)?;
            utils::block_on(client.create_course(&course))?;
            println!("Course {} created", course.name);
        }
        Command::CourseDelete { id } => {
            let client = client_for(state)?;
            utils::block_on(client.delete_course(id))?;
            println!("Course {} deleted", id);
        }
        Command::Departments => {
            let client = client_for(state)?;
            for dep in utils::block_on(client.departments())? {
                match dep.id {
                    Some(id) => println!("[{}] {}", id, dep.name),
                    None => println!("{}", dep.name),
                }
            }
        }
        Command::Grades => {
            let client = client_for(state)?;
            let grades = utils::block_on(client.grades_for_current_user())?;
            print!("{}", grades_view::render_grades(&summarize_by_subject(&grades)));
        }
        Command::DeptMessages { department } => {
            let client = client_for(state)?;
            let (me, dept_id) = resolve_department(&client, department)?;
            let posts = utils::block_on(client.department_messages(dept_id))?;
            print!("{}", department_view::render_department_messages(&posts, me.id));
        }
        Command::DeptSend { department, text } => {
            if text.trim().is_empty() {
                bail!("message must not be empty");
            }
            let client = client_for(state)?;
            let (me, dept_id) = resolve_department(&client, department)?;
            utils::block_on(client.post_to_department(dept_id, Some(me.id), &text))?;
            println!("Posted to department {}", dept_id);
        }
        Command::Teachers => {
            let client = client_for(state)?;
            for email in utils::block_on(client.teacher_emails())? {
                println!("{}", email);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::setup_logging(cli.verbose);

    let mut state = AppState::load();
    let uses_session = !matches!(cli.command, Command::Login { .. } | Command::Logout);
    let result = run(cli, &mut state);

    match &result {
        Ok(()) if uses_session => state.touch(Utc::now()),
        Err(e) if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized) => {
            warn!("server rejected the session token");
            state.logout();
        }
        _ => {}
    }
    if let Err(e) = state.save() {
        warn!("could not save settings: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(department_id: Option<i64>) -> Profile {
        serde_json::from_value(serde_json::json!({"id": 5, "departmentId": department_id})).unwrap()
    }

    #[test]
    fn rejected_login_reads_as_bad_credentials() {
        let err = login_failure(ApiError::Status { status: 401, body: String::new() });
        assert_eq!(err.to_string(), "Hibás email/jelszó!");
        assert!(err.downcast_ref::<ApiError>().is_some());
    }

    #[test]
    fn other_login_failures_keep_their_message() {
        let err = login_failure(ApiError::Decode("token not found in response".into()));
        assert_eq!(err.to_string(), "unexpected response: token not found in response");
        let err = login_failure(ApiError::Status { status: 500, body: "boom".into() });
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn every_subcommand_has_help() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        cmd.clone().debug_assert();
        for sub in cmd.get_subcommands() {
            assert!(sub.get_about().is_some(), "{} has no help text", sub.get_name());
        }
    }

    #[test]
    fn department_choice() {
        let deps = [Department { id: None, name: "x".into() }, Department { id: Some(3), name: "Info".into() }];
        assert_eq!(pick_department(Some(7), &profile(Some(2)), &Role::Student, &deps), Some(7));
        assert_eq!(pick_department(None, &profile(Some(2)), &Role::Student, &deps), Some(2));
        assert_eq!(pick_department(None, &profile(None), &Role::Sysadmin, &deps), Some(3));
        assert_eq!(pick_department(None, &profile(None), &Role::Teacher, &deps), None);
    }
}
