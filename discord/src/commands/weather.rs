use crate::channel::{resolve_weather_channel, SerenityGuild};
use crate::common::{Context, Error};
use crate::update::send_weather_update;
use tracing::{error, info, warn};

const GUILD_ONLY: &str = "The weather command can only be used inside a server.";

/// Answers the deferred interaction. A failed answer is only logged, the
/// user has nothing else to see.
async fn reply(ctx: Context<'_>, text: impl Into<String>) {
    if let Err(e) = ctx.say(text).await {
        warn!(channel_id = ctx.channel_id().get(), error = %e, "could not reply to /weather");
    }
}

/// Get Philippines Weather Updates.
#[poise::command(slash_command)]
pub async fn weather(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let Some(guild_id) = ctx.guild_id() else {
        reply(ctx, GUILD_ONLY).await;
        return Ok(());
    };

    let channel_name = ctx
        .channel_id()
        .name(ctx.serenity_context())
        .await
        .unwrap_or_else(|_| ctx.channel_id().to_string());
    info!(channel = %channel_name, guild_id = guild_id.get(), "/weather command used");

    let app = &ctx.data().app;
    let http = ctx.serenity_context().http.clone();
    let guild = SerenityGuild::new(http.clone(), guild_id, app.bot_id);

    let channel = match resolve_weather_channel(&guild, &app.cache).await {
        Ok(channel) => channel,
        Err(e) => {
            error!(guild_id = guild_id.get(), error = %e, "could not resolve the weather channel");
            reply(ctx, format!("Error: {}", e)).await;
            return Ok(());
        }
    };

    if let Err(e) = send_weather_update(&http, app, channel, Some(ctx.author().id)).await {
        error!(guild_id = guild_id.get(), error = %e, "weather update failed");
        reply(ctx, format!("Error: {}", e)).await;
        return Ok(());
    }

    reply(ctx, format!("Weather update has been posted in <#{}>", channel.get())).await;

    Ok(())
}
