use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use sav_core::core_api::{CoreError, CoreErrorCode, Engine, Session};
use sav_core::{GameVersion, Lookup, Stats, WriteRequest};
use sav_render::{
    FieldSelection, render_json_full, render_json_selected, render_party_text,
    render_validation_text,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE.SAV")]
    path: PathBuf,
    /// Expected game; the save is rejected if its footers disagree.
    #[arg(long, value_name = "plat|hgss")]
    game: Option<GameVersion>,
    #[arg(long = "game-info")]
    game_info: bool,
    #[arg(long)]
    chunks: bool,
    #[arg(long = "party-size")]
    party_size: bool,
    #[arg(long)]
    party: bool,
    #[arg(long)]
    json: bool,
    /// Directory holding items.txt, abilities.txt and charset.txt.
    #[arg(long = "data-dir", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Party slot targeted by the --set-* flags.
    #[arg(long, default_value_t = 0)]
    slot: usize,
    #[arg(long = "set-level")]
    set_level: Option<u8>,
    #[arg(long = "set-item", value_name = "NAME|ID")]
    set_item: Option<String>,
    #[arg(long = "set-ability", value_name = "NAME|ID")]
    set_ability: Option<String>,
    #[arg(long = "set-nickname")]
    set_nickname: Option<String>,
    #[arg(long = "set-evs", value_name = "HP,ATK,DEF,SPA,SPD,SPE", value_parser = parse_stat_list)]
    set_evs: Option<Stats>,
    #[arg(long = "set-ivs", value_name = "HP,ATK,DEF,SPA,SPD,SPE", value_parser = parse_stat_list)]
    set_ivs: Option<Stats>,
    #[arg(long = "set-stats", value_name = "HP,ATK,DEF,SPA,SPD,SPE", value_parser = parse_stat_list)]
    set_stats: Option<Stats>,
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn has_edits(&self) -> bool {
        self.set_level.is_some()
            || self.set_item.is_some()
            || self.set_ability.is_some()
            || self.set_nickname.is_some()
            || self.set_evs.is_some()
            || self.set_ivs.is_some()
            || self.set_stats.is_some()
    }

    fn fields(&self) -> FieldSelection {
        FieldSelection {
            game: self.game_info,
            chunks: self.chunks,
            party_size: self.party_size,
            party: self.party,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let fields = cli.fields();
    let has_edits = cli.has_edits();
    if has_edits && cli.output.is_none() {
        eprintln!("--set-* flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set-* flag");
        process::exit(2);
    }

    let lookup = match &cli.data_dir {
        Some(dir) => Lookup::load_dir(dir).unwrap_or_else(|e| {
            eprintln!("Error loading data directory {}: {e}", dir.display());
            process::exit(1);
        }),
        None => Lookup::default(),
    };

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let mut session = Engine::new()
        .open_bytes(bytes, cli.game)
        .unwrap_or_else(|e| {
            eprintln!("Error parsing save file: {}", cli.path.display());
            eprintln!("  {e}");
            process::exit(1);
        });
    session.set_charset(lookup.charset.clone());
    for issue in &session.capabilities().issues {
        log::warn!("{issue:?}");
    }

    if has_edits {
        apply_edits(&cli, &mut session, &lookup);
        let Some(out_path) = cli.output.as_ref() else {
            return;
        };
        let edited_bytes = session.to_bytes_modified().unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });
        fs::write(out_path, edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        log::info!("wrote {}", out_path.display());
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, &lookup)
        } else {
            render_json_full(&session, &lookup)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        print_selected_text(&session, &fields, &lookup);
        return;
    }

    if let Some(out_path) = cli.output.as_ref() {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    print!("{}", render_party_text(&session, &lookup));
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn apply_edits(cli: &Cli, session: &mut Session, lookup: &Lookup) {
    let requests = edit_requests(cli, lookup).unwrap_or_else(|e| {
        eprintln!("Error resolving edit: {e}");
        process::exit(1);
    });
    session.apply(&requests).unwrap_or_else(|e| {
        eprintln!("Error applying edits to slot {}: {e}", cli.slot);
        process::exit(1);
    });
}

/// Collects the --set-* flags into one batch, resolving item and ability
/// names through `lookup`.
fn edit_requests(cli: &Cli, lookup: &Lookup) -> Result<Vec<WriteRequest>, CoreError> {
    let slot = cli.slot;
    let mut requests = Vec::new();
    if let Some(level) = cli.set_level {
        requests.push(WriteRequest::level(slot, level));
    }
    if let Some(item) = cli.set_item.as_deref() {
        requests.push(WriteRequest::held_item(
            slot,
            lookup.items.resolve(item, "item")?,
        ));
    }
    if let Some(ability) = cli.set_ability.as_deref() {
        let id = lookup.abilities.resolve(ability, "ability")?;
        let id = u8::try_from(id).map_err(|_| {
            CoreError::new(
                CoreErrorCode::FieldEncoding,
                format!("ability id {id} does not fit one byte"),
            )
        })?;
        requests.push(WriteRequest::ability(slot, id));
    }
    if let Some(nickname) = cli.set_nickname.as_deref() {
        requests.push(WriteRequest::nickname(slot, nickname));
    }
    if let Some(evs) = cli.set_evs {
        requests.push(WriteRequest::evs(slot, evs));
    }
    if let Some(ivs) = cli.set_ivs {
        requests.push(WriteRequest::ivs(slot, ivs));
    }
    if let Some(stats) = cli.set_stats {
        requests.push(WriteRequest::battle_stats(slot, stats));
    }
    Ok(requests)
}

fn print_selected_text(session: &Session, fields: &FieldSelection, lookup: &Lookup) {
    if fields.game {
        println!("game={}", session.game().code());
    }
    if fields.party_size {
        println!("party_size={}", session.snapshot().party_size);
    }
    if fields.chunks {
        print!("{}", render_validation_text(session));
    }
    if fields.party {
        print!("{}", render_party_text(session, lookup));
    }
}

fn parse_stat_list(value: &str) -> Result<Stats, String> {
    let parts = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u16>()
                .map_err(|e| format!("invalid stat value '{}': {e}", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        &[hp, attack, defense, sp_attack, sp_defense, speed] => Ok(Stats::new(
            hp, attack, defense, sp_attack, sp_defense, speed,
        )),
        _ => Err(format!(
            "expected six comma-separated values (hp,atk,def,spa,spd,spe), got {}",
            parts.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sav_core::NameTable;

    #[test]
    fn stat_list_is_in_hp_atk_def_spa_spd_spe_order() {
        let stats = parse_stat_list("1, 2,3,4,5,6").expect("six values");
        assert_eq!(stats, Stats::new(1, 2, 3, 4, 5, 6));
        assert_eq!(stats.speed, 6);
        assert_eq!(stats.sp_attack, 4);
    }

    #[test]
    fn stat_list_rejects_wrong_arity() {
        assert!(parse_stat_list("1,2,3").is_err());
        assert!(parse_stat_list("1,2,3,4,5,x").is_err());
    }

    #[test]
    fn set_flags_become_one_batch() {
        let cli = Cli::parse_from([
            "gen4-sav",
            "--slot",
            "2",
            "--set-level",
            "40",
            "--set-item",
            "Leftovers",
            "--set-evs",
            "0,0,0,0,0,252",
            "--output",
            "out.sav",
            "in.sav",
        ]);
        let lookup = Lookup {
            items: NameTable::parse("68|Leftovers\n").expect("items"),
            ..Lookup::default()
        };
        let requests = edit_requests(&cli, &lookup).expect("resolve");
        assert_eq!(
            requests,
            vec![
                WriteRequest::level(2, 40),
                WriteRequest::held_item(2, 68),
                WriteRequest::evs(2, Stats::new(0, 0, 0, 0, 0, 252)),
            ]
        );
    }

    #[test]
    fn unknown_ability_name_fails_before_any_edit() {
        let cli = Cli::parse_from([
            "gen4-sav",
            "--set-ability",
            "Levitate",
            "--output",
            "out.sav",
            "in.sav",
        ]);
        let err = edit_requests(&cli, &Lookup::default()).expect_err("empty table");
        assert_eq!(err.code, CoreErrorCode::Parse);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
