use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use following_tracker::cli::{Cli, Command};
use following_tracker::config::ConfigStore;
use following_tracker::error::AppError;
use following_tracker::logging::init_logging;
use following_tracker::notifier;
use following_tracker::scheduler::run_tracking;
use following_tracker::services::twitter::TwitterClient;
use following_tracker::store::AccountStore;
use following_tracker::tracker::events;
use following_tracker::tracker::FollowingTracker;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Arc::new(ConfigStore::from_env());
    let accounts = Arc::new(AccountStore::from_env());

    match cli.command {
        Command::Start => {
            let (tracker, notifier) = build_tracker(&config, &accounts);
            run_tracking(tracker, config).await;
            // tracker was dropped by the scheduler; the channel is closed
            let _ = notifier.await;
        }

        Command::Add { username } => {
            let (mut tracker, notifier) = build_tracker(&config, &accounts);
            tracker.add_target_account(&username).await;
            drop(tracker);
            let _ = notifier.await;
        }

        Command::Unlist { username } => {
            let (mut tracker, notifier) = build_tracker(&config, &accounts);
            tracker.delist_target_account(&username).await;
            drop(tracker);
            let _ = notifier.await;
        }

        Command::Track { username } => {
            let (tracker, notifier) = build_tracker(&config, &accounts);
            tracker.track_new_following_by_username(&username).await;
            drop(tracker);
            let _ = notifier.await;
        }

        Command::All => {
            let all = accounts.get_all().await.unwrap_or_else(exit_on_error);
            if all.is_empty() {
                tracing::info!("No accounts in the track list");
            }
            for account in all.values() {
                tracing::info!(
                    "@{} ({}): {} following, last checked {}",
                    account.username,
                    account.name,
                    account.following.len(),
                    account.last_checked
                );
            }
        }

        Command::SetConsumerKey { value } => {
            config
                .set_consumer_key(value)
                .await
                .unwrap_or_else(exit_on_error);
            tracing::info!("consumer_key updated");
        }

        Command::SetConsumerSecret { value } => {
            config
                .set_consumer_secret(value)
                .await
                .unwrap_or_else(exit_on_error);
            tracing::info!("consumer_secret updated");
        }

        Command::SetToken { value } => {
            config.set_token(value).await.unwrap_or_else(exit_on_error);
            tracing::info!("token updated");
        }

        Command::SetTrackInterval { value } => {
            config
                .set_track_interval(value)
                .await
                .unwrap_or_else(exit_on_error);
            tracing::info!("track_interval updated");
        }

        Command::GetConfig => {
            let conf = config.get().await.unwrap_or_else(exit_on_error);
            tracing::info!(
                "consumer_key: {}",
                conf.consumer_key.as_deref().unwrap_or("null")
            );
            tracing::info!(
                "consumer_secret: {}",
                conf.consumer_secret.as_deref().unwrap_or("null")
            );
            tracing::info!(
                "token: {}",
                conf.token.as_deref().unwrap_or("null")
            );
            match conf.track_interval {
                Some(interval) => {
                    tracing::info!("track_interval: {}", interval)
                }
                None => tracing::info!("track_interval: null"),
            }
        }
    }
}

fn build_tracker(
    config: &Arc<ConfigStore>,
    accounts: &Arc<AccountStore>,
) -> (FollowingTracker, tokio::task::JoinHandle<()>) {
    let (tx, rx) = events::channel();
    let notifier = notifier::spawn(rx);
    let api = Arc::new(TwitterClient::new(config.clone()));
    let tracker = FollowingTracker::new(api, accounts.clone(), tx);
    (tracker, notifier)
}

fn exit_on_error<T>(err: AppError) -> T {
    tracing::error!("{}", err);
    std::process::exit(1);
}
