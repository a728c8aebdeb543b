use std::fmt::Write as _;

use sav_core::Lookup;
use sav_core::core_api::{BlockInfo, CapabilityIssue, ChunkStatus, PartyEntry, Session};
use sav_core::lookup::nature_effect;
use sav_core::record::Stats;
use sav_core::sav::ChunkSlot;
use serde_json::{Map as JsonMap, Value as JsonValue};

const NICKNAME_WIDTH: usize = 12;
const NAME_WIDTH: usize = 16;
const STAT_LABELS: [&str; 6] = ["HP", "Atk", "Def", "SpA", "SpD", "Spe"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub game: bool,
    pub chunks: bool,
    pub party_size: bool,
    pub party: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.game || self.chunks || self.party_size || self.party
    }
}

pub fn render_json_full(session: &Session, lookup: &Lookup) -> JsonValue {
    let all = FieldSelection {
        game: true,
        chunks: true,
        party_size: true,
        party: true,
    };
    JsonValue::Object(selected_json(&all, session, lookup))
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    lookup: &Lookup,
) -> JsonValue {
    JsonValue::Object(selected_json(fields, session, lookup))
}

fn selected_json(
    fields: &FieldSelection,
    session: &Session,
    lookup: &Lookup,
) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    if fields.game {
        out.insert(
            "game".to_string(),
            JsonValue::String(session.game().code().to_string()),
        );
        out.insert(
            "game_title".to_string(),
            JsonValue::String(session.game().title().to_string()),
        );
    }
    if fields.chunks {
        out.insert(
            "chunks".to_string(),
            JsonValue::Array(snapshot.chunks.iter().map(chunk_to_json).collect()),
        );
        let mut latest = JsonMap::new();
        latest.insert(
            "small".to_string(),
            JsonValue::String(slot_name(snapshot.latest_small).to_string()),
        );
        latest.insert(
            "big".to_string(),
            JsonValue::String(slot_name(snapshot.latest_big).to_string()),
        );
        out.insert("latest".to_string(), JsonValue::Object(latest));
    }
    if fields.party_size {
        out.insert(
            "party_size".to_string(),
            JsonValue::from(snapshot.party_size),
        );
    }
    if fields.party {
        out.insert(
            "party".to_string(),
            JsonValue::Array(
                session
                    .party()
                    .iter()
                    .map(|entry| party_entry_to_json(entry, lookup))
                    .collect(),
            ),
        );
    }
    out
}

fn slot_name(slot: ChunkSlot) -> &'static str {
    match slot {
        ChunkSlot::First => "first",
        ChunkSlot::Second => "second",
    }
}

fn chunk_to_json(chunk: &ChunkStatus) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "slot".to_string(),
        JsonValue::String(slot_name(chunk.slot).to_string()),
    );
    out.insert("valid".to_string(), JsonValue::Bool(chunk.is_valid()));
    out.insert("small".to_string(), block_to_json(&chunk.small));
    out.insert("big".to_string(), block_to_json(&chunk.big));
    JsonValue::Object(out)
}

fn block_to_json(block: &BlockInfo) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("address".to_string(), JsonValue::from(block.address));
    out.insert(
        "identifier".to_string(),
        JsonValue::from(block.footer.identifier),
    );
    out.insert(
        "save_number".to_string(),
        JsonValue::from(block.footer.save_number),
    );
    out.insert(
        "block_size".to_string(),
        JsonValue::from(block.footer.block_size),
    );
    out.insert(
        "checksum".to_string(),
        JsonValue::from(block.footer.checksum),
    );
    out.insert(
        "checksum_valid".to_string(),
        JsonValue::Bool(block.checksum_valid),
    );
    JsonValue::Object(out)
}

fn named_id_to_json(id: u16, name: Option<&str>) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("id".to_string(), JsonValue::from(id));
    out.insert(
        "name".to_string(),
        match name {
            Some(name) => JsonValue::String(name.to_string()),
            None => JsonValue::Null,
        },
    );
    JsonValue::Object(out)
}

fn stats_to_json(stats: &Stats) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("hp".to_string(), JsonValue::from(stats.hp));
    out.insert("attack".to_string(), JsonValue::from(stats.attack));
    out.insert("defense".to_string(), JsonValue::from(stats.defense));
    out.insert("sp_attack".to_string(), JsonValue::from(stats.sp_attack));
    out.insert("sp_defense".to_string(), JsonValue::from(stats.sp_defense));
    out.insert("speed".to_string(), JsonValue::from(stats.speed));
    out.insert("total".to_string(), JsonValue::from(stats.total()));
    JsonValue::Object(out)
}

fn party_entry_to_json(entry: &PartyEntry, lookup: &Lookup) -> JsonValue {
    let m = &entry.member;
    let mut out = JsonMap::new();
    out.insert("index".to_string(), JsonValue::from(entry.index));
    out.insert(
        "checksum_valid".to_string(),
        JsonValue::Bool(entry.checksum_valid),
    );
    out.insert("personality".to_string(), JsonValue::from(m.personality));
    out.insert("species".to_string(), JsonValue::from(m.species));
    out.insert(
        "nickname".to_string(),
        JsonValue::String(m.nickname(&lookup.charset)),
    );
    out.insert("level".to_string(), JsonValue::from(m.level));
    out.insert(
        "held_item".to_string(),
        named_id_to_json(m.held_item, lookup.item_name(m.held_item)),
    );
    let ability = u16::from(m.ability);
    out.insert(
        "ability".to_string(),
        named_id_to_json(ability, lookup.ability_name(ability)),
    );
    out.insert(
        "nature".to_string(),
        JsonValue::String(m.nature().to_string()),
    );
    out.insert(
        "nature_effect".to_string(),
        match nature_effect(m.nature_index()) {
            Some((raised, lowered)) => {
                let mut effect = JsonMap::new();
                effect.insert("raised".to_string(), JsonValue::from(raised));
                effect.insert("lowered".to_string(), JsonValue::from(lowered));
                JsonValue::Object(effect)
            }
            None => JsonValue::Null,
        },
    );
    out.insert("experience".to_string(), JsonValue::from(m.experience));
    out.insert("friendship".to_string(), JsonValue::from(m.friendship));
    out.insert("ot_id".to_string(), JsonValue::from(m.ot_id));
    out.insert("ot_secret_id".to_string(), JsonValue::from(m.ot_secret_id));
    out.insert(
        "moves".to_string(),
        JsonValue::Array(m.moves.iter().map(|&id| JsonValue::from(id)).collect()),
    );
    out.insert("is_egg".to_string(), JsonValue::Bool(m.is_egg));
    out.insert("current_hp".to_string(), JsonValue::from(m.current_hp));
    out.insert("stats".to_string(), stats_to_json(&m.stats));
    out.insert("evs".to_string(), stats_to_json(&m.evs));
    out.insert("ivs".to_string(), stats_to_json(&m.ivs));
    JsonValue::Object(out)
}

/// Fixed-width party listing, one header line per member followed by its
/// stats, EVs and IVs.
pub fn render_party_text(session: &Session, lookup: &Lookup) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "Pokemon {} - party of {}",
        session.game(),
        session.party().len()
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Slot  Dex  {:<nick$}Lv   {:<name$}{:<name$}Nature",
        "Nickname",
        "Item",
        "Ability",
        nick = NICKNAME_WIDTH,
        name = NAME_WIDTH,
    )
    .expect("writing to String cannot fail");

    for entry in session.party() {
        let m = &entry.member;
        let item = lookup
            .item_name(m.held_item)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", m.held_item));
        let ability_id = u16::from(m.ability);
        let ability = lookup
            .ability_name(ability_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{ability_id}"));
        let nature = match nature_effect(m.nature_index()) {
            Some((raised, lowered)) => format!("{} (+{raised} -{lowered})", m.nature()),
            None => m.nature().to_string(),
        };
        let corrupt = if entry.checksum_valid {
            ""
        } else {
            "  [checksum mismatch]"
        };
        writeln!(
            &mut out,
            "{:>4}  {:>3}  {}{:<3}  {}{}{}{}",
            entry.index,
            m.species,
            fit_column(&m.nickname(&lookup.charset), NICKNAME_WIDTH),
            m.level,
            fit_column(&item, NAME_WIDTH),
            fit_column(&ability, NAME_WIDTH),
            nature,
            corrupt,
        )
        .expect("writing to String cannot fail");
        write_stat_row(&mut out, "Stats", &m.stats);
        write_stat_row(&mut out, "EVs", &m.evs);
        write_stat_row(&mut out, "IVs", &m.ivs);
    }
    out
}

fn write_stat_row(out: &mut String, label: &str, stats: &Stats) {
    write!(out, "      {label:<6}").expect("writing to String cannot fail");
    for (name, value) in STAT_LABELS.iter().zip(stats.display_order()) {
        write!(out, " {name} {value:>3}").expect("writing to String cannot fail");
    }
    writeln!(out, "  Total {:>4}", stats.total()).expect("writing to String cannot fail");
}

/// Per-chunk footer and CRC report plus the latest-chunk selection.
pub fn render_validation_text(session: &Session) -> String {
    let snapshot = session.snapshot();
    let mut out = String::new();
    writeln!(&mut out, "Game: {}", session.game()).expect("writing to String cannot fail");
    for chunk in &snapshot.chunks {
        writeln!(
            &mut out,
            "{} {}",
            chunk.slot,
            if chunk.is_valid() { "OK" } else { "CORRUPT" }
        )
        .expect("writing to String cannot fail");
        for (label, block) in [("small", &chunk.small), ("big", &chunk.big)] {
            writeln!(
                &mut out,
                "  {label:<5} @{:#07x} {} {}",
                block.address,
                block.footer,
                if block.checksum_valid { "ok" } else { "mismatch" }
            )
            .expect("writing to String cannot fail");
        }
    }
    writeln!(
        &mut out,
        "Latest: small from {}, big from {}",
        snapshot.latest_small, snapshot.latest_big
    )
    .expect("writing to String cannot fail");
    for issue in &session.capabilities().issues {
        writeln!(&mut out, "Issue: {}", describe_issue(issue))
            .expect("writing to String cannot fail");
    }
    for entry in session.party() {
        writeln!(
            &mut out,
            "Party slot {}: {}",
            entry.index,
            if entry.checksum_valid {
                "ok"
            } else {
                "record checksum mismatch"
            }
        )
        .expect("writing to String cannot fail");
    }
    out
}

fn describe_issue(issue: &CapabilityIssue) -> String {
    match issue {
        CapabilityIssue::LatestChunkCorrupt => {
            "newest chunk is corrupt, data read from the backup".to_string()
        }
        CapabilityIssue::BackupChunkCorrupt => "backup chunk is corrupt".to_string(),
        CapabilityIssue::CorruptPartyRecord(index) => {
            format!("party slot {index} is locked by a bad record checksum")
        }
    }
}

fn fit_column(value: &str, width: usize) -> String {
    let mut s: String = value.chars().take(width.saturating_sub(1)).collect();
    while s.chars().count() < width {
        s.push(' ');
    }
    s
}
