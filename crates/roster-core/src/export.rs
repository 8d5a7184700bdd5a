//! `/roster export`: full replace of the `Raw Discord Data` sheet.

use chrono::{DateTime, Utc};

use crate::a1::RAW_DATA_SHEET;
use crate::error::Result;
use crate::store::RosterStore;

pub const OFFICER_ROLE: &str = "Officer";
pub const EVERYONE_ROLE: &str = "@everyone";

pub const MEMBERS_UNAVAILABLE_TEXT: &str = "Cannot fetch guild members. Enable **Server Members Intent** in the Developer Portal and add the `GUILD_MEMBERS` gateway intent to the client.";

pub const HEADER: [&str; 6] = [
    "ID",
    "Username",
    "Display Name",
    "Roles",
    "User Type",
    "Join Date",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub name: String,
    /// Guild hierarchy rank; higher sorts first.
    pub position: i64,
}

/// What the export needs to know about one guild member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub roles: Vec<RoleInfo>,
    pub bot: bool,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Exact, case-sensitive role-name check. Hierarchy is not considered.
pub fn has_officer_role<'a>(role_names: impl IntoIterator<Item = &'a str>) -> bool {
    role_names.into_iter().any(|name| name == OFFICER_ROLE)
}

/// `[Highest,Next,Lowest]`, excluding the everyone role.
pub fn roles_label(roles: &[RoleInfo]) -> String {
    let mut sorted: Vec<&RoleInfo> = roles.iter().filter(|r| r.name != EVERYONE_ROLE).collect();
    sorted.sort_by(|a, b| b.position.cmp(&a.position));
    let names: Vec<&str> = sorted.iter().map(|r| r.name.as_str()).collect();
    format!("[{}]", names.join(","))
}

/// `2025-09-22 13:34:19.825000+00:00`; precision is milliseconds, padded.
pub fn format_join_date(joined: DateTime<Utc>) -> String {
    format!("{}000+00:00", joined.format("%Y-%m-%d %H:%M:%S%.3f"))
}

/// One sheet row: `ID, Username, DisplayName, Roles, UserType, JoinDate`.
pub fn record(member: &MemberSnapshot) -> Vec<String> {
    vec![
        member.id.clone(),
        member.username.clone(),
        member.display_name.clone(),
        roles_label(&member.roles),
        if member.bot { "Bot" } else { "Human" }.to_string(),
        member.joined_at.map(format_join_date).unwrap_or_default(),
    ]
}

/// Records sorted ascending by the formatted join date.
pub fn build_records(members: &[MemberSnapshot]) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = members.iter().map(record).collect();
    rows.sort_by(|a, b| a[5].cmp(&b[5]));
    rows
}

/// Header plus sorted records, written over the whole destination sheet.
/// Returns the number of member rows written.
pub async fn export_members<S: RosterStore + ?Sized>(
    store: &S,
    members: &[MemberSnapshot],
) -> Result<usize> {
    let records = build_records(members);
    let count = records.len();
    let mut rows = Vec::with_capacity(count + 1);
    rows.push(HEADER.iter().map(|h| h.to_string()).collect());
    rows.extend(records);
    store.replace_sheet(RAW_DATA_SHEET, rows).await?;
    tracing::info!(members = count, sheet = RAW_DATA_SHEET, "roster exported");
    Ok(count)
}

pub fn success_reply(count: usize) -> String {
    format!("Exported {count} members to '{RAW_DATA_SHEET}'.")
}

pub fn failure_reply(reason: impl std::fmt::Display) -> String {
    format!("Export failed: {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn member(id: &str, joined: Option<&str>) -> MemberSnapshot {
        MemberSnapshot {
            id: id.into(),
            username: format!("user{id}"),
            display_name: format!("Display {id}"),
            roles: vec![],
            bot: false,
            joined_at: joined.map(at),
        }
    }

    fn role(name: &str, position: i64) -> RoleInfo {
        RoleInfo {
            name: name.into(),
            position,
        }
    }

    #[test]
    fn join_date_is_fixed_width_micros() {
        assert_eq!(
            format_join_date(at("2025-09-22T13:34:19.825Z")),
            "2025-09-22 13:34:19.825000+00:00"
        );
        assert_eq!(
            format_join_date(at("2025-01-01T00:00:00Z")),
            "2025-01-01 00:00:00.000000+00:00"
        );
    }

    #[test]
    fn sub_millisecond_digits_are_zero() {
        assert_eq!(
            format_join_date(at("2025-01-01T00:00:00.123456Z")),
            "2025-01-01 00:00:00.123000+00:00"
        );
    }

    #[test]
    fn roles_sorted_by_rank_without_everyone() {
        let roles = vec![
            role("@everyone", 0),
            role("Member", 2),
            role("Server Booster", 9),
            role("Officer", 5),
        ];
        assert_eq!(roles_label(&roles), "[Server Booster,Officer,Member]");
        assert_eq!(roles_label(&[]), "[]");
    }

    #[test]
    fn officer_check_is_exact() {
        assert!(has_officer_role(["Member", "Officer"]));
        assert!(!has_officer_role(["officer", "Officers"]));
    }

    #[test]
    fn records_sorted_by_join_date() {
        let rows = build_records(&[
            member("1", Some("2025-01-01T00:00:00.500Z")),
            member("2", Some("2025-01-01T00:00:00.100Z")),
        ]);
        assert_eq!(rows[0][0], "2");
        assert_eq!(rows[1][0], "1");
    }

    #[test]
    fn missing_join_date_sorts_first() {
        let rows = build_records(&[member("1", Some("2024-01-01T00:00:00Z")), member("2", None)]);
        assert_eq!(rows[0][0], "2");
        assert_eq!(rows[0][5], "");
    }

    #[test]
    fn bot_flag_maps_user_type() {
        let mut m = member("3", None);
        m.bot = true;
        assert_eq!(record(&m)[4], "Bot");
        assert_eq!(record(&member("4", None))[4], "Human");
    }

    #[tokio::test]
    async fn export_writes_header_and_rows() {
        let store = MemoryStore::new();
        let count = export_members(
            &store,
            &[member("1", Some("2025-01-01T00:00:00Z"))],
        )
        .await
        .unwrap();
        assert_eq!(count, 1);
        let sheet = store.sheet(RAW_DATA_SHEET).unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet[0][0], "ID");
        assert_eq!(sheet[0][5], "Join Date");
        assert_eq!(sheet[1][1], "user1");
        assert_eq!(success_reply(count), "Exported 1 members to 'Raw Discord Data'.");
    }

    #[test]
    fn failure_reply_carries_reason() {
        assert_eq!(
            failure_reply("HTTP 503 fetching roles"),
            "Export failed: HTTP 503 fetching roles"
        );
    }
}
