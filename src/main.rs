mod completions;
mod date;
mod error;
mod habits;
mod json;
mod model;
mod output;
mod parse;
mod session;
mod store;
mod streaks;

use crate::completions::{completions_for_habit, load_completions, mark_complete};
use crate::date::{
    day_start_timestamp, format_day, parse_day, parse_timestamp, system_today_utc,
};
use crate::error::CliError;
use crate::habits::{
    apply_update, list_habits, load_habits, make_habit, next_habit_id, push_habit, remove_habit,
    replace_habit, select_habit, HabitUpdate,
};
use crate::json::stable_pretty;
use crate::model::{Category, Completion, COMPLETIONS};
use crate::output::{render_simple_table, Styler};
use crate::store::{read_store, resolve_store_path, update_store};
use crate::streaks::{build_streaks, current_streak};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CategoryArg {
    Health,
    Productivity,
    Learning,
    Social,
    Creativity,
}

impl CategoryArg {
    fn to_category(self) -> Category {
        match self {
            CategoryArg::Health => Category::Health,
            CategoryArg::Productivity => Category::Productivity,
            CategoryArg::Learning => Category::Learning,
            CategoryArg::Social => Category::Social,
            CategoryArg::Creativity => Category::Creativity,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "habits", version, about = "Local habit tracking CLI with per-habit streaks")]
struct Cli {
    /// Overrides the store path for this invocation.
    #[arg(long, global = true)]
    store: Option<String>,

    /// Overrides logical "today" for deterministic output/testing.
    #[arg(long, global = true)]
    today: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: Format,

    /// Disables ANSI color output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a session. Data commands refuse to run without one.
    Login(LoginArgs),
    /// End the session (idempotent).
    Logout,
    /// Show the active session.
    Whoami,
    Add(AddArgs),
    List(ListArgs),
    Show(SelectorArgs),
    Edit(EditArgs),
    /// Hard delete. Completion records for the habit are left behind.
    Remove(SelectorArgs),
    /// Record a completion for today (or `--at`).
    Done(DoneArgs),
    /// List a habit's completion records.
    Completions(SelectorArgs),
    /// Per-habit current streak, total completions, and completed-today.
    Streaks(StreaksArgs),
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Opaque user identifier; no password handling here.
    user: String,
}

#[derive(Args, Debug)]
struct AddArgs {
    name: String,

    #[arg(long, value_enum)]
    category: CategoryArg,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Include inactive habits
    #[arg(long)]
    all: bool,
}

#[derive(Args, Debug)]
struct SelectorArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,
}

#[derive(Args, Debug)]
struct EditArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long, value_enum)]
    category: Option<CategoryArg>,

    #[arg(long)]
    description: Option<String>,

    /// Soft-delete marker (`--active false` hides the habit from listings).
    ///
    /// Clap note: accepts an explicit boolean value (`--active true|false`).
    #[arg(long, action = clap::ArgAction::Set)]
    active: Option<bool>,
}

#[derive(Args, Debug)]
struct DoneArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,

    /// RFC3339 timestamp of the completion event (defaults to now, or to
    /// midnight UTC of the overridden "today").
    #[arg(long)]
    at: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct StreaksArgs {
    /// Include inactive habits
    #[arg(long)]
    all: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let exit = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code
        }
    };

    std::process::exit(exit);
}

fn print_line(s: &str) {
    println!("{}", s);
}

fn print_json<T: serde::Serialize>(obj: &T) -> Result<(), CliError> {
    let s = stable_pretty(obj).map_err(|_| CliError::io("Store IO error"))?;
    println!("{}", s);
    Ok(())
}

/// Logical "today" plus whether it was pinned by flag or env. Pinned runs get
/// deterministic event timestamps as well.
fn resolve_today(cli_today: Option<&str>) -> Result<(NaiveDate, bool), CliError> {
    if let Some(t) = cli_today {
        return Ok((parse_day(t, "today")?, true));
    }

    if let Ok(t) = std::env::var("HABITS_TODAY") {
        let tt = t.trim();
        if !tt.is_empty() {
            return Ok((parse_day(tt, "today")?, true));
        }
    }

    Ok((system_today_utc(), false))
}

fn resolve_event_time(today: NaiveDate, today_pinned: bool) -> DateTime<FixedOffset> {
    if today_pinned {
        day_start_timestamp(today)
    } else {
        Utc::now().fixed_offset()
    }
}

fn resolve_color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    true
}

/// Loads the completion records, degrading to an empty set when the
/// collection does not exist yet. Every other failure propagates.
fn completions_or_setup_notice(
    store: &model::Store,
) -> Result<(Vec<Completion>, bool), CliError> {
    match load_completions(store) {
        Ok(cs) => Ok((cs, false)),
        Err(e) if e.is_missing_collection() => Ok((Vec::new(), true)),
        Err(e) => Err(e),
    }
}

fn print_setup_notice(styler: &Styler) {
    eprintln!(
        "{}",
        styler.yellow(&format!(
            "Setup required: the `{}` collection does not exist yet. \
             Run `habits done <habit>` to create it.",
            COMPLETIONS
        ))
    );
}

fn run(cli: Cli) -> Result<(), CliError> {
    let store_path = resolve_store_path(cli.store.as_deref())?;
    let (today, today_pinned) = resolve_today(cli.today.as_deref())?;

    let styler = Styler::new(resolve_color_enabled(cli.no_color));

    match cli.command {
        Command::Login(args) => {
            let now = resolve_event_time(today, today_pinned);
            let session = session::sign_in(&store_path, &args.user, now)?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    session: session::Session,
                }
                print_json(&Out { session })?;
            } else {
                print_line(&format!("Signed in as {}", session.user));
            }

            Ok(())
        }

        Command::Logout => {
            let removed = session::sign_out(&store_path)?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    signed_out: bool,
                }
                print_json(&Out { signed_out: removed })?;
            } else if removed {
                print_line("Signed out");
            } else {
                print_line(&styler.gray("(no active session)"));
            }

            Ok(())
        }

        Command::Whoami => {
            let session = session::require_session(&store_path)?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    session: session::Session,
                }
                print_json(&Out { session })?;
            } else {
                print_line(&format!(
                    "{} (signed in {})",
                    session.user,
                    session.signed_in_at.to_rfc3339()
                ));
            }

            Ok(())
        }

        Command::Add(args) => {
            session::require_session(&store_path)?;
            let created_at = resolve_event_time(today, today_pinned);

            let created = update_store(&store_path, |store| {
                let id = next_habit_id(store);
                let habit = make_habit(
                    id,
                    &args.name,
                    args.category.to_category(),
                    args.description.as_deref(),
                    created_at,
                )?;
                push_habit(store, &habit)?;
                Ok(habit)
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: model::Habit,
                }
                print_json(&Out { habit: created })?;
            } else {
                let row = vec![
                    created.id.clone(),
                    created.name.clone(),
                    created.category.as_str().to_string(),
                    created.description.clone().unwrap_or_default(),
                ];
                print_line(&render_simple_table(
                    &["id", "name", "category", "description"],
                    &[row],
                ));
            }

            Ok(())
        }

        Command::List(args) => {
            session::require_session(&store_path)?;

            let store = read_store(&store_path)?;
            let all = load_habits(&store)?;
            let habits = list_habits(&all, args.all);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habits: Vec<model::Habit>,
                }
                print_json(&Out { habits })?;
            } else {
                let rows: Vec<Vec<String>> = habits
                    .iter()
                    .map(|h| {
                        vec![
                            h.id.clone(),
                            h.name.clone(),
                            h.category.as_str().to_string(),
                            h.description.clone().unwrap_or_default(),
                            if h.active {
                                "yes".to_string()
                            } else {
                                "no".to_string()
                            },
                        ]
                    })
                    .collect();

                print_line(&render_simple_table(
                    &["id", "name", "category", "description", "active"],
                    &rows,
                ));
            }

            Ok(())
        }

        Command::Show(args) => {
            session::require_session(&store_path)?;

            let store = read_store(&store_path)?;
            let all = load_habits(&store)?;
            let idx = select_habit(&all, &args.habit, true)?;
            let habit = all[idx].clone();

            let (completions, _) = completions_or_setup_notice(&store)?;
            let records = completions_for_habit(&completions, &habit.id);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: model::Habit,
                    completions: Vec<Completion>,
                }
                print_json(&Out {
                    habit,
                    completions: records,
                })?;
            } else {
                print_line(&format!("{} ({})", habit.name, habit.id));
                print_line(&format!(
                    "category: {}",
                    styler.category(habit.category, habit.category.as_str())
                ));
                if let Some(d) = habit.description.as_deref() {
                    print_line(&format!("description: {}", d));
                }
                print_line(&format!(
                    "active: {}",
                    if habit.active { "yes" } else { "no" }
                ));
                print_line(&format!("created_at: {}", habit.created_at.to_rfc3339()));
                if let Some(u) = habit.updated_at {
                    print_line(&format!("updated_at: {}", u.to_rfc3339()));
                }
                if !records.is_empty() {
                    print_line("completions:");
                    for c in records.iter() {
                        let day = format_day(date::calendar_day(&c.completion_date));
                        match c.notes.as_deref() {
                            Some(n) => print_line(&format!("- {} {} ({})", c.id, day, n)),
                            None => print_line(&format!("- {} {}", c.id, day)),
                        }
                    }
                }
            }

            Ok(())
        }

        Command::Edit(args) => {
            session::require_session(&store_path)?;

            let update = HabitUpdate {
                name: args.name.clone(),
                category: args.category.map(CategoryArg::to_category),
                description: args.description.clone(),
                active: args.active,
            };
            if update.is_empty() {
                return Err(CliError::usage(
                    "Nothing to update: pass --name, --category, --description, or --active",
                ));
            }

            let updated_at = resolve_event_time(today, today_pinned);
            let updated = update_store(&store_path, |store| {
                let all = load_habits(store)?;
                let idx = select_habit(&all, &args.habit, true)?;
                let mut habit = all[idx].clone();
                apply_update(&mut habit, &update, updated_at)?;
                replace_habit(store, &habit)?;
                Ok(habit)
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: model::Habit,
                }
                print_json(&Out { habit: updated })?;
            } else {
                print_line(&format!("Updated: {} ({})", updated.name, updated.id));
            }

            Ok(())
        }

        Command::Remove(args) => {
            session::require_session(&store_path)?;

            #[derive(Clone)]
            struct Removed {
                habit: model::Habit,
                completions_left: usize,
            }

            let out = update_store(&store_path, |store| {
                let all = load_habits(store)?;
                let idx = select_habit(&all, &args.habit, true)?;
                let habit = all[idx].clone();

                let (completions, _) = completions_or_setup_notice(store)?;
                let completions_left = completions
                    .iter()
                    .filter(|c| c.habit_id == habit.id)
                    .count();

                remove_habit(store, &habit.id)?;
                Ok(Removed {
                    habit,
                    completions_left,
                })
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: model::Habit,
                    completions_left: usize,
                }
                print_json(&Out {
                    habit: out.habit,
                    completions_left: out.completions_left,
                })?;
            } else if out.completions_left > 0 {
                print_line(&format!(
                    "Removed: {} ({}). {} completion record(s) left behind.",
                    out.habit.name, out.habit.id, out.completions_left
                ));
            } else {
                print_line(&format!("Removed: {} ({})", out.habit.name, out.habit.id));
            }

            Ok(())
        }

        Command::Done(args) => {
            session::require_session(&store_path)?;

            let at = match args.at.as_deref() {
                Some(raw) => parse_timestamp(raw, "at")?,
                None => resolve_event_time(today, today_pinned),
            };

            #[derive(Clone)]
            struct DoneOut {
                habit: model::Habit,
                completion: Completion,
                current_streak: u32,
            }

            let out = update_store(&store_path, |store| {
                let all = load_habits(store)?;
                let idx = select_habit(&all, &args.habit, true)?;
                let habit = all[idx].clone();

                let completion = mark_complete(store, &habit.id, at, args.notes.as_deref())?;
                let completions = load_completions(store)?;
                let streak = current_streak(&completions, &habit.id, today);

                Ok(DoneOut {
                    habit,
                    completion,
                    current_streak: streak,
                })
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit_id: String,
                    completion: Completion,
                    current_streak: u32,
                }
                print_json(&Out {
                    habit_id: out.habit.id,
                    completion: out.completion,
                    current_streak: out.current_streak,
                })?;
            } else {
                let day = format_day(date::calendar_day(&out.completion.completion_date));
                print_line(&format!(
                    "{} {} ({}) on {} (streak {})",
                    styler.green("Completed:"),
                    out.habit.name,
                    out.habit.id,
                    day,
                    out.current_streak
                ));
            }

            Ok(())
        }

        Command::Completions(args) => {
            session::require_session(&store_path)?;

            let store = read_store(&store_path)?;
            let all = load_habits(&store)?;
            let idx = select_habit(&all, &args.habit, true)?;
            let habit = all[idx].clone();

            let (completions, setup_required) = completions_or_setup_notice(&store)?;
            let records = completions_for_habit(&completions, &habit.id);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit_id: String,
                    setup_required: bool,
                    completions: Vec<Completion>,
                }
                print_json(&Out {
                    habit_id: habit.id,
                    setup_required,
                    completions: records,
                })?;
            } else {
                if setup_required {
                    print_setup_notice(&styler);
                }
                if records.is_empty() {
                    print_line(&styler.gray("(no completions)"));
                } else {
                    let rows: Vec<Vec<String>> = records
                        .iter()
                        .map(|c| {
                            vec![
                                c.id.clone(),
                                c.completion_date.to_rfc3339(),
                                c.status.clone(),
                                c.notes.clone().unwrap_or_default(),
                            ]
                        })
                        .collect();
                    print_line(&render_simple_table(
                        &["id", "completion_date", "status", "notes"],
                        &rows,
                    ));
                }
            }

            Ok(())
        }

        Command::Streaks(args) => {
            session::require_session(&store_path)?;

            let store = read_store(&store_path)?;
            let all = load_habits(&store)?;
            let habits = list_habits(&all, args.all);

            let (completions, setup_required) = completions_or_setup_notice(&store)?;
            let rows = build_streaks(&habits, &completions, today);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    date: String,
                    setup_required: bool,
                    streaks: Vec<streaks::StreakRow>,
                }
                print_json(&Out {
                    date: format_day(today),
                    setup_required,
                    streaks: rows,
                })?;
            } else {
                if setup_required {
                    print_setup_notice(&styler);
                }
                if rows.is_empty() {
                    print_line(&styler.gray("(no habits yet)"));
                } else {
                    let table_rows: Vec<Vec<String>> = rows
                        .iter()
                        .map(|r| {
                            vec![
                                r.habit_id.clone(),
                                r.name.clone(),
                                r.category.as_str().to_string(),
                                r.current_streak.to_string(),
                                r.total_completions.to_string(),
                                if r.completed_today {
                                    "yes".to_string()
                                } else {
                                    "no".to_string()
                                },
                            ]
                        })
                        .collect();

                    print_line(&format!("Streaks ({})", format_day(today)));
                    print_line(&render_simple_table(
                        &["id", "name", "category", "streak", "total", "today"],
                        &table_rows,
                    ));
                }
            }

            Ok(())
        }
    }
}
