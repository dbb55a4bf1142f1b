use crate::common::{AppState, Error};
use serde_json::Value;
use serenity::all::{ChannelId, CreateAttachment, CreateMessage, Http, UserId};
use tracing::{debug, warn};

const NO_UPDATES: &str = "No weather updates available.";
const NO_VISUALIZATION: &str = " (No visualization available)";

fn event_title(event: &Value) -> &str {
    event.get("title").and_then(Value::as_str).unwrap_or("Unknown")
}

/// The caption posted with a storm map. `mention` is set when a user asked
/// for the update.
pub(crate) fn compose_message(events: &[Value], mention: Option<UserId>) -> String {
    let prefix = match mention {
        Some(user) => format!("<@{}> - ", user.get()),
        None => String::new(),
    };

    match events {
        [] => format!("{}{}", prefix, NO_UPDATES),
        [event] => format!("{}Weather Alert: {}", prefix, event_title(event)),
        events => {
            let names: Vec<&str> = events.iter().map(event_title).collect();
            format!(
                "{}Weather Alert: Multiple storms detected ({})",
                prefix,
                names.join(", ")
            )
        }
    }
}

pub(crate) fn without_visualization(message: &str) -> String {
    format!("{}{}", message, NO_VISUALIZATION)
}

/// Fetches the open storms, renders them and posts the result to `channel`.
/// Only fetching and sending can fail; a failed render posts the caption
/// alone.
pub(crate) async fn send_weather_update(
    http: &Http,
    app: &AppState,
    channel: ChannelId,
    mention: Option<UserId>,
) -> Result<(), Error> {
    let events = app.eonet.fetch_severe_storms().await?;
    debug!(events = events.len(), channel_id = channel.get(), "storm events fetched");

    let message = compose_message(&events, mention);
    if events.is_empty() {
        channel.say(http, message).await?;
        return Ok(());
    }

    let image_path = app.renderer.plot_storm_path(events).await;

    let attachment = match image_path {
        Some(path) => match CreateAttachment::path(&path).await {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rendered storm map could not be attached");
                None
            }
        },
        None => None,
    };

    match attachment {
        Some(attachment) => {
            let builder = CreateMessage::new().content(message).add_file(attachment);
            channel.send_message(http, builder).await?;
        }
        None => {
            channel.say(http, without_visualization(&message)).await?;
        }
    }

    Ok(())
}
