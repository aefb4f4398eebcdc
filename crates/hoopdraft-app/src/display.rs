// Text rendering of players, rosters, and picks for the terminal driver.

use hoopdraft_core::draft::{DraftPick, Roster};
use hoopdraft_core::player::{Player, StatKey};

/// Columns shown in the available-player table, with their headers.
pub const STAT_COLUMNS: [(StatKey, &str); 12] = [
    (StatKey::Rank, "RK"),
    (StatKey::Adp, "ADP"),
    (StatKey::Gp, "GP"),
    (StatKey::FgPct, "FG%"),
    (StatKey::FtPct, "FT%"),
    (StatKey::Threes, "3PM"),
    (StatKey::Pts, "PTS"),
    (StatKey::Reb, "REB"),
    (StatKey::Ast, "AST"),
    (StatKey::Stl, "STL"),
    (StatKey::Blk, "BLK"),
    (StatKey::To, "TO"),
];

const NAME_WIDTH: usize = 26;
const COLUMN_WIDTH: usize = 6;

/// Format one attribute value for display.
///
/// Percentages render as `"47.5%"`; values above 1 are taken to be percent
/// already. Whole numbers drop the decimal, everything else keeps one.
/// Non-finite values render as `"-"`.
pub fn format_stat_value(key: StatKey, value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    if key.is_percentage() {
        let pct = if value > 1.0 { value } else { value * 100.0 };
        return format!("{pct:.1}%");
    }
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Header line matching [`format_player_row`].
pub fn table_header() -> String {
    let mut line = format!("{:>4}  {:<NAME_WIDTH$} {:<4} {:<9}", "#", "PLAYER", "TEAM", "POS");
    for (_, label) in STAT_COLUMNS {
        line.push_str(&format!(" {label:>COLUMN_WIDTH$}"));
    }
    line
}

/// One table row: 1-based list number, name, pro team, positions, stats.
pub fn format_player_row(number: usize, player: &Player) -> String {
    let meta = player.meta();
    let mut line = format!(
        "{:>4}  {:<NAME_WIDTH$} {:<4} {:<9}",
        number,
        truncate(&meta.name, NAME_WIDTH),
        meta.team,
        meta.positions.join(",")
    );
    for (key, _) in STAT_COLUMNS {
        line.push_str(&format!(" {:>COLUMN_WIDTH$}", format_stat_value(key, player.stat(key))));
    }
    line
}

/// One line per slot: slot label then occupant (or an empty marker).
pub fn format_roster(roster: &Roster) -> Vec<String> {
    roster
        .slots
        .iter()
        .map(|slot| match &slot.player {
            Some(player) => {
                let meta = player.meta();
                format!("{:<5} {} ({}) {}", slot.kind, meta.name, meta.team, meta.positions.join(","))
            }
            None => format!("{:<5} --", slot.kind),
        })
        .collect()
}

pub fn format_pick(pick: &DraftPick, team_name: &str) -> String {
    format!(
        "{:>3}. R{}.{:02} {:<8} {}",
        pick.overall_pick, pick.round, pick.pick_in_round, team_name, pick.player.player
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopdraft_core::draft::{SlotKind, STANDARD_ROSTER};
    use hoopdraft_core::player::PlayerId;

    #[test]
    fn percentages_accept_both_scales() {
        assert_eq!(format_stat_value(StatKey::FgPct, 0.4751), "47.5%");
        assert_eq!(format_stat_value(StatKey::FtPct, 84.7), "84.7%");
        assert_eq!(format_stat_value(StatKey::FgPct, 0.0), "0.0%");
    }

    #[test]
    fn whole_numbers_drop_decimal() {
        assert_eq!(format_stat_value(StatKey::Gp, 72.0), "72");
        assert_eq!(format_stat_value(StatKey::Rank, 3.0), "3");
        assert_eq!(format_stat_value(StatKey::Adp, 12.34), "12.3");
        assert_eq!(format_stat_value(StatKey::Pts, 27.56), "27.6");
    }

    #[test]
    fn non_finite_is_dash() {
        assert_eq!(format_stat_value(StatKey::Pts, f64::NAN), "-");
        assert_eq!(format_stat_value(StatKey::FgPct, f64::INFINITY), "-");
    }

    #[test]
    fn row_contains_name_team_and_stats() {
        let player = Player::new("Luka Doncic DAL - PG,SG")
            .with_stat(StatKey::Pts, 28.1)
            .with_stat(StatKey::FgPct, 0.48);
        let row = format_player_row(1, &player);
        assert!(row.contains("Luka Doncic"));
        assert!(row.contains("DAL"));
        assert!(row.contains("PG,SG"));
        assert!(row.contains("28.1"));
        assert!(row.contains("48.0%"));
        assert_eq!(row.len(), table_header().len());
    }

    #[test]
    fn roster_lines_follow_slots() {
        let mut roster = Roster::new(&STANDARD_ROSTER);
        roster.slots[6].player = Some(Player::new("Nikola Jokic DEN - C"));
        let lines = format_roster(&roster);
        assert_eq!(lines.len(), 13);
        assert!(lines[6].starts_with("C"));
        assert!(lines[6].contains("Nikola Jokic (DEN)"));
        assert!(lines[0].ends_with("--"));
        assert_eq!(roster.slots[8].kind, SlotKind::Utility);
        assert!(lines[8].starts_with("Util"));
    }

    #[test]
    fn pick_line() {
        let player = Player::new("A B - PG");
        let pick = DraftPick {
            player_id: PlayerId::from_identity(&player.player),
            player,
            team_index: 2,
            round: 2,
            pick_in_round: 7,
            overall_pick: 23,
        };
        assert_eq!(format_pick(&pick, "Team 3"), " 23. R2.07 Team 3   A B - PG");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
