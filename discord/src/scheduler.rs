use crate::channel::{scheduled_channel, SerenityGuild};
use crate::common::AppState;
use crate::update::send_weather_update;
use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Manila;
use chrono_tz::Tz;
use serenity::all::{GuildId, Http};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

const RETRY_DELAY: Duration = Duration::from_secs(5 * 60);

fn post_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// First occurrence of `at` strictly after `now`, in `now`'s timezone:
/// today if it is still ahead, tomorrow otherwise.
pub(crate) fn next_fire_time(now: DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    // a wall-clock time can be skipped by a DST jump, try a few days
    for _ in 0..3 {
        if let Some(fire) = tz.from_local_datetime(&date.and_time(at)).earliest() {
            if fire > now {
                return Some(fire);
            }
        }
        date = date.checked_add_days(Days::new(1))?;
    }
    None
}

enum SchedulerState {
    Idle,
    Waiting(DateTime<Tz>),
}

/// Sleeps until `duration` is over. `false` when shutdown was signalled
/// first. Once the sender is gone no shutdown can come, so the full
/// duration is slept.
async fn wait_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }

    let timer = sleep(duration);
    tokio::pin!(timer);
    loop {
        tokio::select! {
            _ = &mut timer => return true,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return false,
                Ok(()) => {}
                Err(_) => {
                    timer.as_mut().await;
                    return true;
                }
            },
        }
    }
}

/// Posts a storm update to every guild with a registered weather channel at
/// 08:00 Manila time, every day, until `shutdown` flips to true.
pub(crate) async fn run_scheduler(http: Arc<Http>, app: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    let mut state = SchedulerState::Idle;

    loop {
        state = match state {
            SchedulerState::Idle => {
                let now = Utc::now().with_timezone(&Manila);
                match next_fire_time(now, post_time()) {
                    Some(fire) => {
                        info!(next = %fire, "next scheduled weather update");
                        SchedulerState::Waiting(fire)
                    }
                    None => {
                        error!("could not compute the next scheduled update, retrying later");
                        if !wait_or_shutdown(RETRY_DELAY, &mut shutdown).await {
                            break;
                        }
                        SchedulerState::Idle
                    }
                }
            }
            SchedulerState::Waiting(fire) => {
                let wait = (fire - Utc::now().with_timezone(&Manila))
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                if !wait_or_shutdown(wait, &mut shutdown).await {
                    break;
                }

                if let Err(e) = post_scheduled_updates(&http, &app).await {
                    error!(error = %e, "error in scheduled weather update");
                    if !wait_or_shutdown(RETRY_DELAY, &mut shutdown).await {
                        break;
                    }
                }
                SchedulerState::Idle
            }
        };
    }

    info!("scheduler stopped");
}

/// One firing. The first failing guild aborts the rest of the cycle.
async fn post_scheduled_updates(http: &Arc<Http>, app: &AppState) -> anyhow::Result<()> {
    let registered = app.cache.lock().await.weather_channels();

    for (guild_id, _) in registered {
        let guild = SerenityGuild::new(http.clone(), GuildId::new(guild_id), app.bot_id);
        match scheduled_channel(&guild, &app.cache).await {
            Some(channel) => {
                info!(guild_id, channel_id = channel.get(), "sending scheduled weather update");
                send_weather_update(http, app, channel, None)
                    .await
                    .map_err(|e| anyhow::anyhow!("guild {}: {}", guild_id, e))?;
            }
            None => warn!(guild_id, "weather channel not found"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn manila(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Manila.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_fires_later_today() {
        let next = next_fire_time(manila(2024, 10, 20, 6, 30), post_time()).unwrap();
        assert_eq!(next, manila(2024, 10, 20, 8, 0));
    }

    #[test]
    fn test_fires_tomorrow_once_passed() {
        let next = next_fire_time(manila(2024, 10, 20, 9, 15), post_time()).unwrap();
        assert_eq!(next, manila(2024, 10, 21, 8, 0));

        // exactly on time counts as passed
        let next = next_fire_time(manila(2024, 10, 20, 8, 0), post_time()).unwrap();
        assert_eq!(next, manila(2024, 10, 21, 8, 0));
    }

    #[test]
    fn test_crosses_month_and_year() {
        let next = next_fire_time(manila(2024, 12, 31, 23, 59), post_time()).unwrap();
        assert_eq!(next, manila(2025, 1, 1, 8, 0));
    }

    #[test]
    fn test_from_utc_clock() {
        // 23:30 UTC is already 07:30 the next morning in Manila
        let now = Utc.with_ymd_and_hms(2024, 10, 19, 23, 30, 0).unwrap().with_timezone(&Manila);
        let next = next_fire_time(now, post_time()).unwrap();
        assert_eq!(next, manila(2024, 10, 20, 8, 0));
        assert_eq!((next - now).num_minutes(), 30);
        assert_eq!(next.with_timezone(&Utc).hour(), 0);
    }

    #[tokio::test]
    async fn test_wait_or_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        assert!(wait_or_shutdown(Duration::from_millis(5), &mut rx).await);

        tx.send(true).unwrap();
        assert!(!wait_or_shutdown(Duration::from_secs(3600), &mut rx).await);
    }

    #[tokio::test]
    async fn test_wait_ignores_false_signal() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(false).unwrap();
        assert!(wait_or_shutdown(Duration::from_millis(5), &mut rx).await);
    }

    #[tokio::test]
    async fn test_keeps_running_without_shutdown_sender() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);

        let started = tokio::time::Instant::now();
        assert!(wait_or_shutdown(Duration::from_millis(20), &mut rx).await);
        assert!(started.elapsed() >= Duration::from_millis(20));
        // and again on the next cycle
        assert!(wait_or_shutdown(Duration::from_millis(5), &mut rx).await);
    }
}
