//! `/roster add|edit|remove|export`.

use futures::TryStreamExt;
use roster_core::export::{self, MemberSnapshot, RoleInfo, MEMBERS_UNAVAILABLE_TEXT};
use roster_core::roster::{self, CharacterUpdate};
use roster_core::store::RosterStore;
use roster_core::types::{Member, UpsertMode};
use roster_core::RosterError;
use serenity::all::{
    CommandInteraction, Context, GuildId, ResolvedOption, ResolvedValue, Role, RoleId,
};
use std::collections::HashMap;

use super::access_menu::AccessMenu;
use super::reply;

/// A parsed `/roster` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterRequest {
    Upsert(UpsertMode, CharacterUpdate),
    Remove { name: String },
    Export,
}

fn string_option(options: &[ResolvedOption<'_>], name: &str) -> Option<String> {
    options.iter().find_map(|o| match (o.name, &o.value) {
        (n, ResolvedValue::String(s)) if n == name => Some(s.to_string()),
        _ => None,
    })
}

fn integer_option(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options.iter().find_map(|o| match (o.name, &o.value) {
        (n, ResolvedValue::Integer(i)) if n == name => Some(*i),
        _ => None,
    })
}

fn character_update(options: &[ResolvedOption<'_>]) -> Option<CharacterUpdate> {
    Some(CharacterUpdate {
        name: string_option(options, "name")?,
        class: string_option(options, "class")?,
        level: u32::try_from(integer_option(options, "level")?).ok()?,
        aa: integer_option(options, "aa").and_then(|aa| u32::try_from(aa).ok()),
    })
}

pub fn parse_request(options: &[ResolvedOption<'_>]) -> Option<RosterRequest> {
    let sub = options.first()?;
    let ResolvedValue::SubCommand(args) = &sub.value else {
        return None;
    };
    match sub.name {
        "add" => Some(RosterRequest::Upsert(UpsertMode::Add, character_update(args)?)),
        "edit" => Some(RosterRequest::Upsert(UpsertMode::Edit, character_update(args)?)),
        "remove" => Some(RosterRequest::Remove {
            name: string_option(args, "name")?,
        }),
        "export" => Some(RosterRequest::Export),
        _ => None,
    }
}

/// Caller identity: user id plus guild display name, falling back to the
/// account name outside a guild.
fn invoking_member(command: &CommandInteraction) -> Member {
    let display_name = command
        .member
        .as_ref()
        .map(|m| m.display_name().to_string())
        .unwrap_or_else(|| command.user.name.clone());
    Member::new(command.user.id.to_string(), display_name)
}

pub async fn handle(
    ctx: &Context,
    command: &CommandInteraction,
    store: &dyn RosterStore,
    access_labels: &[String],
) -> anyhow::Result<()> {
    let Some(request) = parse_request(&command.data.options()) else {
        tracing::warn!(options = ?command.data.options, "unrecognized /roster invocation");
        return Ok(());
    };

    match request {
        RosterRequest::Export => export(ctx, command, store).await,
        RosterRequest::Upsert(mode, update) => {
            if !reply::defer(ctx, command).await? {
                return Ok(());
            }
            let member = invoking_member(command);
            let mut picker = AccessMenu::new(ctx, command, access_labels);
            let text = match roster::upsert_character(store, &member, &update, mode, &mut picker)
                .await
            {
                Ok(summary) => summary.reply(),
                Err(RosterError::NoRow) => {
                    roster::no_row_reply(mode == UpsertMode::Edit).to_string()
                }
                Err(e) if e.is_user_error() => e.to_string(),
                Err(e) => return Err(e.into()),
            };
            reply::edit(ctx, command, text).await?;
            Ok(())
        }
        RosterRequest::Remove { name } => {
            if !reply::defer(ctx, command).await? {
                return Ok(());
            }
            let member = invoking_member(command);
            let text = match roster::remove_character(store, &member, &name).await {
                Ok(summary) => summary.reply(),
                Err(RosterError::NoRow) => roster::no_row_reply(false).to_string(),
                Err(e) => return Err(e.into()),
            };
            reply::edit(ctx, command, text).await?;
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

type RoleTable = HashMap<RoleId, RoleInfo>;

fn role_table<'a>(roles: impl IntoIterator<Item = &'a Role>) -> RoleTable {
    roles
        .into_iter()
        .map(|role| {
            let info = RoleInfo {
                name: role.name.clone(),
                position: i64::from(role.position),
            };
            (role.id, info)
        })
        .collect()
}

/// Roles of `ids` known to `table`, in the order given.
fn resolve_roles(ids: &[RoleId], table: &RoleTable) -> Vec<RoleInfo> {
    ids.iter().filter_map(|id| table.get(id)).cloned().collect()
}

fn caller_is_officer(ids: &[RoleId], table: &RoleTable) -> bool {
    export::has_officer_role(
        resolve_roles(ids, table)
            .iter()
            .map(|role| role.name.as_str()),
    )
}

/// Guild roles from the gateway cache, over HTTP only when the guild is not
/// cached yet.
async fn guild_roles(ctx: &Context, guild_id: GuildId) -> serenity::Result<RoleTable> {
    let cached = ctx
        .cache
        .guild(guild_id)
        .map(|guild| role_table(guild.roles.values()));
    if let Some(table) = cached {
        return Ok(table);
    }
    tracing::debug!(guild = %guild_id, "guild not cached, fetching roles");
    let roles = guild_id.roles(&ctx.http).await?;
    Ok(role_table(roles.values()))
}

async fn export(
    ctx: &Context,
    command: &CommandInteraction,
    store: &dyn RosterStore,
) -> anyhow::Result<()> {
    let Some(guild_id) = command.guild_id else {
        reply::ephemeral(ctx, command, RosterError::MissingOfficerRole.to_string()).await?;
        return Ok(());
    };

    let roles = match guild_roles(ctx, guild_id).await {
        Ok(roles) => roles,
        Err(e) => {
            tracing::error!(guild = %guild_id, error = %e, "could not read guild roles");
            reply::ephemeral(ctx, command, export::failure_reply(&e)).await?;
            return Ok(());
        }
    };
    let caller_roles = command
        .member
        .as_ref()
        .map(|m| m.roles.as_slice())
        .unwrap_or_default();
    if !caller_is_officer(caller_roles, &roles) {
        reply::ephemeral(ctx, command, RosterError::MissingOfficerRole.to_string()).await?;
        return Ok(());
    }

    if !reply::defer(ctx, command).await? {
        return Ok(());
    }

    let members: Vec<serenity::all::Member> =
        match guild_id.members_iter(&ctx.http).try_collect().await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(error = %e, "member list unavailable");
                reply::edit(ctx, command, MEMBERS_UNAVAILABLE_TEXT).await?;
                return Ok(());
            }
        };

    let snapshots: Vec<MemberSnapshot> = members
        .iter()
        .map(|m| MemberSnapshot {
            id: m.user.id.to_string(),
            username: m.user.name.clone(),
            display_name: m.display_name().to_string(),
            roles: resolve_roles(&m.roles, &roles),
            bot: m.user.bot,
            joined_at: m.joined_at.map(|ts| *ts),
        })
        .collect();

    let text = match export::export_members(store, &snapshots).await {
        Ok(count) => export::success_reply(count),
        Err(e) => {
            tracing::error!(error = %e, "roster export failed");
            export::failure_reply(e)
        }
    };
    reply::edit(ctx, command, text).await?;
    Ok(())
}
