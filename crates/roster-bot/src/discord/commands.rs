//! Slash command bodies and their registration.

use roster_core::config::RegisterMode;
use roster_core::types::CharacterClass;
use serenity::all::{Command, CommandOptionType, CreateCommand, CreateCommandOption, GuildId};
use serenity::http::Http;

pub const ROSTER: &str = "roster";
pub const BACKUP: &str = "backup";

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 65;
pub const MIN_AA: u32 = 1;
pub const MAX_AA: u32 = 1000;

fn name_option() -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "name", "Character name").required(true)
}

fn character_subcommand(name: &str, description: &str) -> CreateCommandOption {
    let class = CharacterClass::all().iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "class", "Class").required(true),
        |option, class| option.add_string_choice(class.as_str(), class.as_str()),
    );
    CreateCommandOption::new(CommandOptionType::SubCommand, name, description)
        .add_sub_option(name_option())
        .add_sub_option(class)
        .add_sub_option(
            CreateCommandOption::new(CommandOptionType::Integer, "level", "Level 1–65")
                .required(true)
                .min_int_value(MIN_LEVEL.into())
                .max_int_value(MAX_LEVEL.into()),
        )
        .add_sub_option(
            CreateCommandOption::new(CommandOptionType::Integer, "aa", "Alternate Abilities 1–1000")
                .required(false)
                .min_int_value(MIN_AA.into())
                .max_int_value(MAX_AA.into()),
        )
}

pub fn roster_command() -> CreateCommand {
    CreateCommand::new(ROSTER)
        .description("Manage your guild roster")
        .add_option(character_subcommand(
            "add",
            "Add or upsert a character in your roster row",
        ))
        .add_option(character_subcommand(
            "edit",
            "Edit an existing character in your roster row",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "remove",
                "Remove a character from your roster row",
            )
            .add_sub_option(name_option()),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "export",
            "Replace 'Raw Discord Data' with current guild members",
        ))
}

pub fn backup_command() -> CreateCommand {
    CreateCommand::new(BACKUP)
        .description("Backup utilities")
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "test",
            "Validate backup channel access and permissions",
        ))
}

pub fn all() -> Vec<CreateCommand> {
    vec![roster_command(), backup_command()]
}

/// Publish the command set according to `mode`. `http` must carry the
/// application id.
pub async fn register(http: &Http, guild_id: GuildId, mode: RegisterMode) -> serenity::Result<()> {
    match mode {
        RegisterMode::GuildPurge => {
            Command::set_global_commands(http, Vec::new()).await?;
            guild_id.set_commands(http, Vec::new()).await?;
            guild_id.set_commands(http, all()).await?;
            tracing::info!(guild = %guild_id, "purged global and guild commands, registered guild commands");
        }
        RegisterMode::Guild => {
            guild_id.set_commands(http, all()).await?;
            tracing::info!(guild = %guild_id, "registered guild commands");
        }
        RegisterMode::Global => {
            Command::set_global_commands(http, all()).await?;
            tracing::info!("registered global commands");
        }
        RegisterMode::Off => {
            tracing::info!("command registration skipped (mode=off)");
        }
    }
    Ok(())
}
