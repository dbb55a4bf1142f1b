use crate::common::Error;
use serenity::all::{
    Channel, ChannelId, ChannelType, CreateChannel, GuildId, Http, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId, UserId,
};
use std::future::Future;
use std::sync::Arc;
use storm_worker::cache::ChannelCache;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub(crate) const WEATHER_CHANNEL_NAME: &str = "🇵🇭-weather";
const WEATHER_CHANNEL_TOPIC: &str = "Philippine Weather Updates";
const WEATHER_CHANNEL_REASON: &str = "Created for weather updates (read-only for users, bot can send messages)";

/// The channel operations the resolver needs from a guild.
pub(crate) trait GuildChannels {
    fn guild_id(&self) -> GuildId;

    /// Whether `channel` is still a channel of this guild.
    fn channel_exists(&self, channel: ChannelId) -> impl Future<Output = bool> + Send;

    /// Creates the read-only weather channel.
    fn create_weather_channel(&self) -> impl Future<Output = Result<ChannelId, Error>> + Send;
}

pub(crate) struct SerenityGuild {
    http: Arc<Http>,
    guild_id: GuildId,
    bot_id: UserId,
}

impl SerenityGuild {
    pub fn new(http: Arc<Http>, guild_id: GuildId, bot_id: UserId) -> Self {
        Self { http, guild_id, bot_id }
    }
}

fn weather_channel_overwrites(guild_id: GuildId, bot_id: UserId) -> Vec<PermissionOverwrite> {
    vec![
        // the @everyone role shares the guild's id
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL,
            deny: Permissions::SEND_MESSAGES,
            kind: PermissionOverwriteType::Role(RoleId::new(guild_id.get())),
        },
        PermissionOverwrite {
            allow: Permissions::SEND_MESSAGES,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(bot_id),
        },
    ]
}

impl GuildChannels for SerenityGuild {
    fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    async fn channel_exists(&self, channel: ChannelId) -> bool {
        match self.http.get_channel(channel).await {
            Ok(Channel::Guild(found)) => found.guild_id == self.guild_id,
            Ok(_) => false,
            Err(e) => {
                debug!(channel_id = channel.get(), error = %e, "weather channel lookup failed");
                false
            }
        }
    }

    async fn create_weather_channel(&self) -> Result<ChannelId, Error> {
        let builder = CreateChannel::new(WEATHER_CHANNEL_NAME)
            .kind(ChannelType::Text)
            .topic(WEATHER_CHANNEL_TOPIC)
            .permissions(weather_channel_overwrites(self.guild_id, self.bot_id))
            .audit_log_reason(WEATHER_CHANNEL_REASON);

        let channel = self.guild_id.create_channel(self.http.as_ref(), builder).await?;
        Ok(channel.id)
    }
}

async fn cached_channel(guild: &impl GuildChannels, cache: &Mutex<ChannelCache>) -> Option<ChannelId> {
    let cached = cache.lock().await.weather_channel(guild.guild_id().get())?;
    let channel = ChannelId::new(cached);
    if guild.channel_exists(channel).await {
        Some(channel)
    } else {
        None
    }
}

/// The guild's weather channel, creating and registering one when none is
/// registered or the registered one is gone. Calling it again while the
/// channel exists never creates another.
pub(crate) async fn resolve_weather_channel(
    guild: &impl GuildChannels,
    cache: &Mutex<ChannelCache>,
) -> Result<ChannelId, Error> {
    if let Some(channel) = cached_channel(guild, cache).await {
        return Ok(channel);
    }

    let guild_id = guild.guild_id().get();
    let channel = guild.create_weather_channel().await?;
    info!(guild_id, channel_id = channel.get(), "created weather channel");

    if let Err(e) = cache.lock().await.set_weather_channel(guild_id, channel.get()) {
        warn!(guild_id, error = %e, "weather channel created but not saved to the cache");
    }
    Ok(channel)
}

/// Lookup only, for scheduled posts: guilds without a live registered
/// channel are skipped, never given a new one.
pub(crate) async fn scheduled_channel(guild: &impl GuildChannels, cache: &Mutex<ChannelCache>) -> Option<ChannelId> {
    cached_channel(guild, cache).await
}
