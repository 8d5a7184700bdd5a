use anyhow::Result;
use roster_core::config::RegisterMode;
use secrecy::ExposeSecret;
use serenity::all::{ApplicationId, GuildId};
use serenity::http::Http;

use crate::discord::commands;
use crate::settings::ConfigArgs;

pub fn run(config: ConfigArgs, mode: Option<RegisterMode>) -> Result<()> {
    let settings = config.resolve()?;
    let mode = mode.unwrap_or(settings.register_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let http = Http::new(settings.discord_token.expose_secret());
        http.set_application_id(ApplicationId::new(settings.application_id));
        commands::register(&http, GuildId::new(settings.guild_id), mode).await?;
        println!("Commands registered ({mode})");
        Ok(())
    })
}
