use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::shell;
use crate::io::config_io;
use crate::io::recovery;
use crate::io::state_io::JsonFileStore;
use crate::model::config::TallyConfig;
use crate::model::item::{Item, Rarity};
use crate::model::state::ActiveType;
use crate::ops::aggregate::owning_lists;
use crate::ops::import::parse_import;
use crate::ops::reducer::Action;
use crate::ops::search::{matched_items, search_items};
use crate::tracker::clock::SystemClock;
use crate::tracker::notify::{LogNotifier, Notifier, StderrNotifier};
use crate::tracker::{Outcome, Tracker};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// A tracker opened on a data directory, shared by one-shot commands and
/// the interactive shell
pub struct Session {
    pub tracker: Tracker,
    pub data_dir: PathBuf,
}

impl Session {
    pub fn open(data_dir: &Path, config: &TallyConfig, notifier: Box<dyn Notifier>) -> Self {
        tracing::debug!(data_dir = %data_dir.display(), "opening tracker");
        let tracker = Tracker::open(
            config,
            Box::new(JsonFileStore::new(data_dir)),
            Box::new(SystemClock::new()),
            notifier,
        );
        Session {
            tracker,
            data_dir: data_dir.to_path_buf(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref());

    match cli.command {
        // The recovery log is readable even when state or config is broken
        Commands::Recovery(args) => cmd_recovery(&data_dir, args, json),
        cmd => {
            let config = config_io::read_config(&data_dir)?;
            let interactive = matches!(cmd, Commands::Shell) || std::io::stderr().is_terminal();
            // scripted runs keep stderr for errors; notices go to the log
            let notifier: Box<dyn Notifier> = if interactive {
                Box::new(StderrNotifier)
            } else {
                Box::new(LogNotifier)
            };
            let mut session = Session::open(&data_dir, &config, notifier);
            match cmd {
                Commands::Shell => shell::run(&mut session),
                cmd => run_command(&mut session, cmd, json),
            }
        }
    }
}

/// Run one command against an open session
pub fn run_command(session: &mut Session, cmd: Commands, json: bool) -> CmdResult {
    match cmd {
        // Read commands
        Commands::Lists => cmd_lists(session, json),
        Commands::Show(args) => cmd_show(session, args, json),
        Commands::Combined => cmd_combined(session, json),
        Commands::Find(args) => cmd_find(session, args, json),
        Commands::Recovery(args) => cmd_recovery(&session.data_dir, args, json),

        // List management
        Commands::Create(args) => cmd_create(session, args),
        Commands::Delete(args) => apply(session, Action::DeleteList { list_id: args.list }),
        Commands::Rename(args) => apply(
            session,
            Action::RenameList {
                list_id: args.list,
                name: args.name,
            },
        ),
        Commands::Add(args) => cmd_add(session, args),
        Commands::Import(args) => cmd_import(session, args),

        // Ledger
        Commands::Have(args) => apply_and_show_item(
            session,
            Action::SetHave {
                list_id: args.list.clone(),
                item_id: args.item.clone(),
                value: args.value,
            },
        ),
        Commands::Need(args) => apply_and_show_item(
            session,
            Action::SetNeed {
                list_id: args.list.clone(),
                item_id: args.item.clone(),
                value: args.value,
            },
        ),
        Commands::Inc(args) => apply_and_show_item(
            session,
            Action::Increment {
                list_id: args.list.clone(),
                item_id: args.item.clone(),
                step: args.step,
            },
        ),
        Commands::Dec(args) => apply_and_show_item(
            session,
            Action::Decrement {
                list_id: args.list.clone(),
                item_id: args.item.clone(),
                step: args.step,
            },
        ),
        Commands::Collect(args) => apply_and_show_item(
            session,
            Action::Collect {
                list_id: args.list.clone(),
                item_id: args.item.clone(),
            },
        ),
        Commands::Clear(args) => apply_and_show_item(
            session,
            Action::Clear {
                list_id: args.list.clone(),
                item_id: args.item.clone(),
            },
        ),

        // Subcategories
        Commands::Sub(args) => cmd_sub(session, args),

        // View settings
        Commands::View(args) => apply(session, Action::SetActiveType(parse_view(&args.kind)?)),
        Commands::Select(args) => apply(session, Action::SelectList { list_id: args.list }),
        Commands::Sort(args) => apply(session, Action::SetSortMode(parse_sort(&args.mode)?)),
        Commands::ShowCollected(args) => {
            apply(session, Action::SetShowCollected(parse_on_off(&args.state)?))
        }
        Commands::Favorite(args) => {
            apply(session, Action::SetFavorited(parse_on_off(&args.state)?))
        }

        Commands::Shell => Err("already in a shell".into()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Dispatch an action. A rejected action is reported, not an error.
fn apply(session: &mut Session, action: Action) -> CmdResult {
    if let Outcome::Rejected(e) = session.tracker.dispatch(action) {
        eprintln!("no effect: {}", e);
    }
    Ok(())
}

/// Dispatch a ledger action and print the item's new counts
fn apply_and_show_item(session: &mut Session, action: Action) -> CmdResult {
    let target = match &action {
        Action::SetHave { list_id, item_id, .. }
        | Action::SetNeed { list_id, item_id, .. }
        | Action::Increment { list_id, item_id, .. }
        | Action::Decrement { list_id, item_id, .. }
        | Action::Collect { list_id, item_id }
        | Action::Clear { list_id, item_id } => Some((list_id.clone(), item_id.clone())),
        _ => None,
    };
    match session.tracker.dispatch(action) {
        Outcome::Rejected(e) => eprintln!("no effect: {}", e),
        Outcome::Applied | Outcome::Unchanged => {
            if let Some((list_id, item_id)) = target
                && let Some(item) = session
                    .tracker
                    .state()
                    .find_list(&list_id)
                    .and_then(|l| l.find_item(&item_id))
            {
                println!("{}", format_item_line(item));
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_lists(session: &Session, json: bool) -> CmdResult {
    let state = session.tracker.state();
    if json {
        let lists: Vec<ListSummaryJson> = state
            .lists
            .iter()
            .map(|l| list_summary_to_json(l, l.id == state.selected_list_id))
            .collect();
        return print_json(&lists);
    }

    println!(
        "{}",
        format_view_status(
            state.active_type,
            state.sort_mode,
            state.show_collected,
            state.favorited
        )
    );
    for list in &state.lists {
        println!(
            "{}",
            format_list_summary(list, list.id == state.selected_list_id)
        );
    }
    Ok(())
}

fn cmd_show(session: &Session, args: ShowArgs, json: bool) -> CmdResult {
    let state = session.tracker.state();
    let list_id = match args.list {
        Some(id) => id,
        None if state.active_type == ActiveType::All => return cmd_combined(session, json),
        None => state.selected_list_id.clone(),
    };
    let list = state
        .find_list(&list_id)
        .ok_or_else(|| format!("list not found: {}", list_id))?;
    let groups = session.tracker.grouped_items(&list_id);
    let pending = session.tracker.cooldown_remaining(&list_id);

    if json {
        let out = ListJson {
            id: list.id.clone(),
            name: list.name.clone(),
            kind: list.kind.as_str(),
            category: list.category.clone(),
            subcategory_order: list.subcategory_order.clone(),
            groups: groups
                .iter()
                .map(|(label, items)| GroupJson {
                    label: label.clone(),
                    items: items.iter().map(|i| item_to_json(i)).collect(),
                })
                .collect(),
            resort_pending_ms: pending.map(|d| d.as_millis() as u64),
        };
        return print_json(&out);
    }

    for line in format_list_listing(list, &groups) {
        println!("{}", line);
    }
    if let Some(remaining) = pending {
        println!();
        println!("(re-sort in {:.1}s)", remaining.as_secs_f64());
    }
    Ok(())
}

fn cmd_combined(session: &Session, json: bool) -> CmdResult {
    let state = session.tracker.state();
    let rows: Vec<(Item, Vec<String>)> = session
        .tracker
        .combined_view()
        .into_iter()
        .map(|item| {
            let lists = owning_lists(&state.lists, &item.id)
                .into_iter()
                .map(str::to_string)
                .collect();
            (item, lists)
        })
        .collect();

    if json {
        let out: Vec<CombinedItemJson> = rows
            .iter()
            .map(|(item, lists)| CombinedItemJson {
                item: item_to_json(item),
                lists: lists.clone(),
            })
            .collect();
        return print_json(&out);
    }

    for line in format_combined(&rows) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_find(session: &Session, args: FindArgs, json: bool) -> CmdResult {
    let state = session.tracker.state();
    if let Some(list_id) = &args.list
        && state.find_list(list_id).is_none()
    {
        return Err(format!("list not found: {}", list_id).into());
    }
    let re = Regex::new(&args.pattern)?;
    let hits = search_items(&state.lists, &re, args.list.as_deref());

    let found: Vec<(&str, &Item, Vec<&'static str>)> = matched_items(&hits)
        .into_iter()
        .filter_map(|(list_id, item_id)| {
            let item = state.find_list(list_id)?.find_item(item_id)?;
            let fields = hits
                .iter()
                .filter(|h| h.list_id == list_id && h.item_id == item_id)
                .map(|h| h.field.as_str())
                .collect();
            Some((list_id, item, fields))
        })
        .collect();

    if json {
        let out: Vec<FindHitJson> = found
            .iter()
            .map(|(list_id, item, fields)| FindHitJson {
                list: list_id.to_string(),
                item: item.id.clone(),
                name: item.name.clone(),
                fields: fields.clone(),
            })
            .collect();
        return print_json(&out);
    }

    for (list_id, item, _) in &found {
        println!("[{}] {}", list_id, format_item_line(item));
    }
    Ok(())
}

fn cmd_recovery(data_dir: &Path, args: RecoveryCmd, json: bool) -> CmdResult {
    if let Some(RecoveryAction::Path) = args.action {
        let path = recovery::recovery_log_path(data_dir);
        let path = std::path::absolute(&path).unwrap_or(path);
        println!("{}", path.display());
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(data_dir, Some(args.limit.unwrap_or(10)));
    if json {
        let out: Vec<RecoveryEntryJson> = entries.iter().map(recovery_entry_to_json).collect();
        return print_json(&out);
    }
    if entries.is_empty() {
        println!("recovery log is empty");
        return Ok(());
    }
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_recovery_entry(entry) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_create(session: &mut Session, args: CreateArgs) -> CmdResult {
    let before: Vec<String> = session
        .tracker
        .state()
        .lists
        .iter()
        .map(|l| l.id.clone())
        .collect();
    apply(
        session,
        Action::CreateList {
            name: args.name,
            category: args.category,
            subcategories: args.subcategories,
        },
    )?;
    if let Some(created) = session
        .tracker
        .state()
        .lists
        .iter()
        .find(|l| !before.contains(&l.id))
    {
        println!("{}", created.id);
    }
    Ok(())
}

fn cmd_add(session: &mut Session, args: AddArgs) -> CmdResult {
    let rarity = match args.rarity.as_deref() {
        Some(s) => Rarity::parse_rarity(s).ok_or_else(|| {
            format!(
                "unknown rarity '{}' (expected: common, uncommon, rare, epic, legendary)",
                s
            )
        })?,
        None => Rarity::default(),
    };
    let mut item = Item::new(args.id.trim(), args.name.trim(), args.need).with_rarity(rarity);
    item.image = args.image.unwrap_or_default();
    item.subcategories = args.subcategories;
    apply_and_count(session, args.list, vec![item])
}

fn cmd_import(session: &mut Session, args: ImportArgs) -> CmdResult {
    let text = fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;
    let items = parse_import(&text)?;
    apply_and_count(session, args.list, items)
}

/// Add items and report how many were new
fn apply_and_count(session: &mut Session, list_id: String, items: Vec<Item>) -> CmdResult {
    let count = |s: &Session| {
        s.tracker
            .state()
            .find_list(&list_id)
            .map_or(0, |l| l.items.len())
    };
    let before = count(&*session);
    apply(
        session,
        Action::AddItems {
            list_id: list_id.clone(),
            items,
        },
    )?;
    let added = count(&*session).saturating_sub(before);
    if added > 0 {
        println!("added {} item(s) to {}", added, list_id);
    }
    Ok(())
}

fn cmd_sub(session: &mut Session, args: SubCmd) -> CmdResult {
    let action = match args.action {
        SubAction::Add(a) => Action::AddSubcategory {
            list_id: a.list,
            label: a.label,
        },
        SubAction::Rm(a) => Action::RemoveSubcategory {
            list_id: a.list,
            label: a.label,
        },
        SubAction::Order(a) => Action::ReorderSubcategories {
            list_id: a.list,
            order: a.labels,
        },
        SubAction::Toggle(a) => Action::ToggleItemSubcategory {
            list_id: a.list,
            item_id: a.item,
            label: a.label,
        },
    };
    apply(session, action)
}
