use serenity::all::UserId;
use std::sync::Arc;
use storm_worker::cache::ChannelCache;
use storm_worker::eonet::EonetClient;
use storm_worker::storm::StormRenderer;
use tokio::sync::Mutex;

pub(crate) type Error = Box<dyn std::error::Error + Send + Sync>;
pub(crate) type Context<'a> = poise::Context<'a, Data, Error>;

/// Everything the command handlers and the scheduler share. Built once the
/// bot is connected.
pub(crate) struct AppState {
    pub cache: Mutex<ChannelCache>,
    pub eonet: EonetClient,
    pub renderer: StormRenderer,
    pub bot_id: UserId,
}

pub(crate) struct Data {
    pub app: Arc<AppState>,
}
