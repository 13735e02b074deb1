//! `supportdesk`: terminal front end for the support console.
//!
//! Every command resolves the console route it corresponds to for the
//! signed-in role and goes through the same route guard as the web client.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};

use supportdesk_lib::error::{ApiError, ErrorNotice};
use supportdesk_lib::notification::NotificationKind;
use supportdesk_lib::routes::{guard, home_for, menu_for, AdminPage, AgentPage, Route, RouteDecision};
use supportdesk_lib::services::{self, agents::AgentForm, agents::PasswordChange, dashboard::DashboardView};
use supportdesk_lib::state::{load_config, AppState, API_URL_ENV};
use supportdesk_lib::types::{
    CallType, EntityId, NewTicket, Role, TicketPriority, TicketStatus, TicketType, UserStatus,
};
use supportdesk_lib::views::agents::AgentsView;
use supportdesk_lib::views::calls::{AgentCallsView, CallCard, CallTab, CallsView, OutboundCallsView};
use supportdesk_lib::views::notes::NotesView;
use supportdesk_lib::views::tickets::{TicketCard, TicketsView};
use supportdesk_lib::views::users::{preference_flags, UserCard, UsersView};
use supportdesk_lib::views::{DetailPanel, LoadState, ServerPager};

#[derive(Parser, Debug)]
#[command(name = "supportdesk", author, version, about = "Support desk console", long_about = None)]
struct Cli {
    /// API base URL (overrides config.json)
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Print detail and dashboard output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SUPPORTDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and drop cached data
    Logout,
    /// Show the signed-in account and its menu
    Whoami,
    /// Dashboard for the signed-in role
    Dashboard,
    /// List tickets (all for admins, assigned for agents)
    Tickets {
        #[arg(long)]
        select: Option<String>,
    },
    /// Ticket detail with conversation history
    Ticket { id: String },
    /// List calls
    Calls {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// inbound or outbound (admin only)
        #[arg(long = "type")]
        call_type: Option<String>,
        #[arg(long)]
        select: Option<String>,
    },
    /// Call detail
    Call { id: String },
    /// Agent outbound calls by category
    Outbound {
        #[arg(long, default_value = "all")]
        tab: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Agent roster
    Agents {
        #[arg(long)]
        select: Option<String>,
    },
    /// Customer list
    Users {
        #[arg(long)]
        select: Option<String>,
    },
    /// Notes on a ticket
    Notes { ticket: String },
    /// Transfer a ticket to an agent
    Assign { ticket: String, agent: String },
    SetStatus { ticket: String, status: String },
    SetPriority { ticket: String, priority: String },
    CreateTicket {
        #[arg(long)]
        user: String,
        #[arg(long)]
        agent: String,
        #[arg(long)]
        summary: String,
        #[arg(long, default_value = "")]
        solution: String,
        #[arg(long = "type")]
        ticket_type: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    AddNote { ticket: String, text: String },
    EditNote { ticket: String, note: String, text: String },
    DeleteNote { ticket: String, note: String },
    /// Mark a call resolved or pending
    SetCallStatus { call: String, status: String },
    ToggleSatisfied { call: String },
    DeleteCall { call: String },
    /// Recording URL for a call
    Recording { call: String },
    CreateAgent {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long = "type")]
        ticket_type: String,
    },
    UpdateAgent {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "type")]
        ticket_type: Option<String>,
    },
    DeleteAgent { id: String },
    SetUserStatus { user: String, status: String },
    DeleteUser { user: String },
    ChangePassword {
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
}

/// Admin or agent variant of a page, depending on who is signed in.
/// Signed-out users get the admin route so the guard sends them to login.
fn page_for(role: Option<&Role>, admin: AdminPage, agent: Option<AgentPage>) -> Route {
    match (role, agent) {
        (Some(Role::Agent), Some(page)) => Route::Agent(page),
        _ => Route::Admin(admin),
    }
}

fn route_for(command: &Command, role: Option<&Role>) -> Route {
    use Command::*;
    match command {
        Login { .. } => Route::Login,
        Logout | Whoami | ChangePassword { .. } => Route::Home,
        Dashboard => page_for(role, AdminPage::Dashboard, Some(AgentPage::Dashboard)),
        Tickets { .. }
        | Ticket { .. }
        | Notes { .. }
        | Assign { .. }
        | SetStatus { .. }
        | SetPriority { .. }
        | AddNote { .. }
        | EditNote { .. }
        | DeleteNote { .. } => page_for(role, AdminPage::Tickets, Some(AgentPage::Tickets)),
        Calls { .. }
        | Call { .. }
        | SetCallStatus { .. }
        | ToggleSatisfied { .. }
        | Recording { .. } => page_for(role, AdminPage::Calls, Some(AgentPage::Calls)),
        DeleteCall { .. } => Route::Admin(AdminPage::Calls),
        Outbound { .. } => Route::Agent(AgentPage::Outbound),
        Agents { .. } | CreateAgent { .. } | UpdateAgent { .. } | DeleteAgent { .. } => {
            Route::Admin(AdminPage::Agents)
        }
        Users { .. } | CreateTicket { .. } | SetUserStatus { .. } | DeleteUser { .. } => {
            Route::Admin(AdminPage::Users)
        }
    }
}

fn enforce(state: &AppState, route: Route) -> anyhow::Result<()> {
    match guard(&state.session(), route) {
        RouteDecision::Allow => Ok(()),
        RouteDecision::Redirect(Route::Login) => {
            bail!("Not signed in. Run `supportdesk login` first.")
        }
        RouteDecision::Redirect(Route::Unauthorized) => {
            bail!("Unauthorized: {route} is not available to your role")
        }
        RouteDecision::Redirect(other) => bail!("Already signed in (home: {other})"),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn fail_on_load_error(state: &LoadState) -> anyhow::Result<()> {
    if let LoadState::Failed(message) = state {
        bail!("{message}");
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_notifications(state: &AppState) {
    for n in state.notifications.drain() {
        match n.kind {
            NotificationKind::Success => println!("{}", n.message),
            NotificationKind::Error => eprintln!("{}: {}", n.title, n.message),
        }
    }
}

fn print_dashboard(view: &DashboardView) {
    for card in &view.stat_cards {
        let delta = if card.today > 0 {
            format!(" (+{} today)", card.today)
        } else {
            String::new()
        };
        println!("{:<16}{:>6}{}  -> {}", card.title, card.value, delta, card.link);
    }
    println!();
    println!("Inbound share:   {:.1}%", view.inbound_share);
    println!("Average rating:  {:.1}", view.average_rating);
    println!("Today's activity: {}", view.today_activity);

    if !view.call_activity.is_empty() {
        println!();
        println!("Call activity");
        for point in &view.call_activity {
            println!(
                "  {}  in {:>3}  out {:>3}  total {:>3}",
                point.date, point.inbound, point.outbound, point.total
            );
        }
    }

    println!();
    println!("Top agents");
    for row in &view.leaderboard {
        println!("  {}. {:<24} {:.1}  {} calls", row.rank, row.label(), row.rating, row.calls);
    }
    match &view.own_performance {
        Some(services::dashboard::OwnPerformance::Entry(row)) => {
            println!();
            println!("Your rank: #{} ({:.1}, {} calls)", row.rank, row.rating, row.calls);
        }
        Some(services::dashboard::OwnPerformance::Unavailable { message }) => {
            println!();
            println!("{message}");
        }
        None => {}
    }
}

fn select_or_warn<T: supportdesk_lib::views::Identified>(
    list: &mut supportdesk_lib::views::ListDetail<T>,
    id: Option<&str>,
) {
    if let Some(id) = id {
        let id = EntityId::new(id);
        list.select(&id);
        if list.selected_id() != Some(&id) {
            log::warn!("{id} is not in the list");
        }
    }
}

async fn run(state: &AppState, command: Command, json: bool) -> anyhow::Result<()> {
    let session = state.session();
    let role = session.role().cloned();
    enforce(state, route_for(&command, role.as_ref()))?;

    match command {
        Command::Login { email, password } => {
            let user = services::auth::login(state, &email, &password).await?;
            let home = user.role.as_ref().and_then(home_for).unwrap_or(Route::Home);
            println!("Signed in as {} ({home})", user.display_name());
        }
        Command::Logout => services::auth::logout(state)?,
        Command::Whoami => match session.user().filter(|_| session.is_authenticated()) {
            Some(user) => {
                let role_name = role.as_ref().map(Role::as_str).unwrap_or("unknown");
                println!("{} <{}> [{role_name}]", user.display_name(), user.email.as_deref().unwrap_or(""));
                for item in role.as_ref().map(menu_for).unwrap_or_default() {
                    println!("  {:<10} {}", item.label, item.route);
                }
            }
            None => println!("Not signed in"),
        },
        Command::Dashboard => {
            let (role, data) = services::dashboard::load_dashboard(state).await?;
            let view = DashboardView::build(&data, &role, session.user_id());
            if json {
                print_json(&view)?;
            } else {
                print_dashboard(&view);
            }
        }
        Command::Tickets { select } => {
            let scope = services::tickets::TicketScope::for_session(&session)?;
            let mut view = TicketsView::new();
            view.apply(services::tickets::load_tickets(state, &scope).await);
            fail_on_load_error(&view.state)?;
            select_or_warn(&mut view.list, select.as_deref());

            println!("{}", view.table().render());
            println!();
            match view.detail() {
                DetailPanel::Selected(ticket) => println!("{}", TicketCard::from_ticket(ticket).render()),
                DetailPanel::Empty(prompt) => println!("{}", view.state.message().unwrap_or(prompt)),
            }
        }
        Command::Ticket { id } => {
            let ticket = services::tickets::load_ticket(state, &EntityId::new(id)).await?;
            let card = TicketCard::from_ticket(&ticket);
            if json {
                print_json(&card)?;
            } else {
                println!("{}", card.render());
            }
        }
        Command::Calls { page, call_type, select } => {
            if role == Some(Role::Agent) {
                let agent_id = session.user_id().cloned().ok_or_else(|| anyhow!("No agent id in session"))?;
                let mut view = AgentCallsView::new();
                view.apply(services::calls::load_agent_calls(state, &agent_id).await);
                fail_on_load_error(&view.state)?;
                select_or_warn(&mut view.list, select.as_deref());
                println!("{}", view.table().render());
                if let DetailPanel::Selected(call) = view.list.detail() {
                    println!();
                    println!("{}", CallCard::from_call(call).render());
                }
            } else {
                let mut view = CallsView::new();
                view.set_filter(call_type.as_deref().and_then(non_blank).map(CallType::from));
                view.pager = ServerPager::at(page);
                let result =
                    services::calls::load_calls_page(state, view.pager.requested(), view.filter()).await;
                view.apply(result);
                fail_on_load_error(&view.state)?;
                select_or_warn(&mut view.list, select.as_deref());

                println!("{}", view.table().render());
                println!("{}", view.footer());
                if let DetailPanel::Selected(call) = view.detail() {
                    println!();
                    println!("{}", CallCard::from_call(call).render());
                }
            }
        }
        Command::Call { id } => {
            let call = services::calls::load_call(state, &EntityId::new(id)).await?;
            let card = CallCard::from_call(&call);
            if json {
                print_json(&card)?;
            } else {
                println!("{}", card.render());
            }
        }
        Command::Outbound { tab, page } => {
            let tab = CallTab::parse(&tab).ok_or_else(|| anyhow!("Unknown tab {tab}: expected all, satisfaction or upsell"))?;
            let agent_id = session.user_id().cloned().ok_or_else(|| anyhow!("No agent id in session"))?;

            let mut view = OutboundCallsView::new(state.page_size());
            view.apply(services::calls::load_agent_calls(state, &agent_id).await);
            fail_on_load_error(&view.state)?;
            view.set_tab(tab);
            view.go_to(page);

            if let Some(message) = view.state.message() {
                println!("{message}");
            } else {
                println!("{}", view.table().render());
            }
            println!("{} [{}]", view.footer(), view.tab());
        }
        Command::Agents { select } => {
            let mut view = AgentsView::new();
            view.apply(services::agents::load_agents(state).await);
            fail_on_load_error(&view.state)?;
            select_or_warn(&mut view.list, select.as_deref());
            println!("{}", view.table().render());
            if let Some(message) = view.state.message() {
                println!("{message}");
            }
        }
        Command::Users { select } => {
            let mut view = UsersView::new();
            view.apply(services::users::load_users(state).await);
            fail_on_load_error(&view.state)?;
            select_or_warn(&mut view.list, select.as_deref());

            println!("{}", view.table().render());
            println!();
            match view.detail() {
                DetailPanel::Selected(user) => {
                    println!("{}", UserCard::from_user(user).render());
                    for (label, on) in preference_flags(user) {
                        println!("  {label:<18} {}", if on { "Yes" } else { "No" });
                    }
                }
                DetailPanel::Empty(prompt) => println!("{}", view.state.message().unwrap_or(prompt)),
            }
        }
        Command::Notes { ticket } => {
            let ticket_id = EntityId::new(ticket);
            let mut view = NotesView::new(ticket_id.clone());
            view.apply(services::notes::load_notes(state, &ticket_id).await);
            fail_on_load_error(&view.state)?;
            println!("{}", view.render());
        }
        Command::Assign { ticket, agent } => {
            let agent = EntityId::new(agent);
            services::tickets::assign_ticket(state, &EntityId::new(ticket), Some(&agent)).await?;
        }
        Command::SetStatus { ticket, status } => {
            let status = non_blank(&status).map(TicketStatus::from);
            services::tickets::update_ticket_status(state, &EntityId::new(ticket), status).await?;
        }
        Command::SetPriority { ticket, priority } => {
            let priority = non_blank(&priority).map(TicketPriority::from);
            services::tickets::update_ticket_priority(state, &EntityId::new(ticket), priority).await?;
        }
        Command::CreateTicket {
            user,
            agent,
            summary,
            solution,
            ticket_type,
            priority,
        } => {
            let mut ticket = NewTicket::for_user(EntityId::new(user));
            ticket.agent_id = EntityId::new(agent);
            ticket.summary = summary;
            ticket.proposed_solution = solution;
            if let Some(t) = ticket_type.as_deref().and_then(non_blank) {
                ticket.ticket_type = TicketType::from(t);
            }
            if let Some(p) = priority.as_deref().and_then(non_blank) {
                ticket.priority = TicketPriority::from(p);
            }
            services::tickets::create_ticket(state, ticket).await?;
        }
        Command::AddNote { ticket, text } => {
            services::notes::add_note(state, &EntityId::new(ticket), &text).await?;
        }
        Command::EditNote { ticket, note, text } => {
            let ticket_id = EntityId::new(ticket);
            let note_id = EntityId::new(note);
            let mut view = NotesView::new(ticket_id.clone());
            view.apply(services::notes::load_notes(state, &ticket_id).await);
            fail_on_load_error(&view.state)?;
            if !view.begin_edit(&note_id) {
                bail!("Note {note_id} not found on ticket {ticket_id}");
            }
            view.set_edit_text(text.clone());
            match view.commit_edit() {
                Some(edit) => services::notes::update_note(state, &ticket_id, &edit.note_id, &edit.text).await?,
                // Blank text: let the service reject it with the usual notification.
                None => services::notes::update_note(state, &ticket_id, &note_id, &text).await?,
            }
        }
        Command::DeleteNote { ticket, note } => {
            services::notes::delete_note(state, &EntityId::new(ticket), &EntityId::new(note)).await?;
        }
        Command::SetCallStatus { call, status } => {
            let resolved = services::calls::parse_resolution(&status);
            services::calls::update_call_resolution(state, &EntityId::new(call), resolved).await?;
        }
        Command::ToggleSatisfied { call } => {
            services::calls::toggle_call_satisfaction(state, &EntityId::new(call)).await?;
        }
        Command::DeleteCall { call } => {
            services::calls::delete_call(state, &EntityId::new(call)).await?;
        }
        Command::Recording { call } => {
            let recording = services::calls::load_recording_url(state, &EntityId::new(call)).await?;
            match recording.url.as_deref().and_then(non_blank) {
                Some(url) => println!("{url}"),
                None => println!("No recording available"),
            }
        }
        Command::CreateAgent {
            first_name,
            last_name,
            email,
            password,
            ticket_type,
        } => {
            let form = AgentForm {
                first_name,
                last_name,
                email,
                password,
                ticket_type,
                ..AgentForm::create()
            };
            services::agents::submit_agent_form(state, &form).await?;
        }
        Command::UpdateAgent {
            id,
            first_name,
            last_name,
            email,
            ticket_type,
        } => {
            let id = EntityId::new(id);
            let agents = services::agents::load_agents(state).await?;
            let agent = agents
                .iter()
                .find(|a| a.id == id)
                .ok_or_else(|| anyhow!("Agent {id} not found"))?;

            let mut form = AgentForm::edit(agent);
            if let Some(v) = first_name {
                form.first_name = v;
            }
            if let Some(v) = last_name {
                form.last_name = v;
            }
            if let Some(v) = email {
                form.email = v;
            }
            if let Some(v) = ticket_type {
                form.ticket_type = v;
            }
            services::agents::submit_agent_form(state, &form).await?;
        }
        Command::DeleteAgent { id } => {
            services::agents::delete_agent(state, &EntityId::new(id)).await?;
        }
        Command::SetUserStatus { user, status } => {
            let status = non_blank(&status).map(UserStatus::from);
            services::users::update_user_status(state, &EntityId::new(user), status).await?;
        }
        Command::DeleteUser { user } => {
            services::users::delete_user(state, &EntityId::new(user)).await?;
        }
        Command::ChangePassword { password, confirm } => {
            let change = PasswordChange {
                password,
                confirm_password: confirm,
            };
            services::agents::update_password(state, &change).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = load_config().context("Failed to load supportdesk config")?;
    if let Some(url) = cli.api_url.as_deref().and_then(non_blank) {
        config.api_base_url = url;
    }

    let state = AppState::from_config(config)?;
    let result = run(&state, cli.command, cli.json).await;
    print_notifications(&state);

    if let Some(err) = result.as_ref().err().and_then(|e| e.downcast_ref::<ApiError>()) {
        let notice = ErrorNotice::from(err);
        if cli.json {
            print_json(&notice)?;
        } else if !matches!(err, ApiError::Validation(_)) {
            eprintln!("{}", notice.recovery_suggestion);
        }
    }
    result
}
