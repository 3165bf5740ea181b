// Command line front end for the Expo push client: send a batch of messages from a JSON file,
// or look up delivery receipts for ticket ids.
use dotenv::dotenv;
use log::{error, info, warn};
use std::{env, fs, process::exit};

use expo_notification_client::util::{self, get_short_token};
use expo_notification_client::{is_expo_push_token, ClientOptions, ExpoClient, PushError, PushMessage};

const USAGE: &str = "Usage: expo-notification-client send <messages.json> | receipts <receipt-id>...";

#[tokio::main]
async fn main() {
    dotenv().ok();
    util::init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        error!("{e}");
        if let PushError::Api(api_error) = &e {
            for other in &api_error.others {
                error!("  also: {} ({})", other.message, other.code);
            }
        }
        exit(1)
    }
}

async fn run(args: &[String]) -> Result<(), PushError> {
    let client = ExpoClient::new(ClientOptions::from_env()?)?;

    match args.split_first() {
        Some((command, rest)) if command == "send" && rest.len() == 1 => send(&client, &rest[0]).await,
        Some((command, rest)) if command == "receipts" && !rest.is_empty() => receipts(&client, rest).await,
        _ => {
            eprintln!("{USAGE}");
            exit(2)
        }
    }
}

async fn send(client: &ExpoClient, path: &str) -> Result<(), PushError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| PushError::InvalidArgument(format!("Could not read {path}: {e}")))?;
    let messages: Vec<PushMessage> = serde_json::from_str(&contents)
        .map_err(|e| PushError::InvalidArgument(format!("{path} is not a JSON array of messages: {e}")))?;

    for message in messages.iter().filter(|message| !is_expo_push_token(&message.to)) {
        warn!("send:: ...{} does not look like an Expo push token", get_short_token(&message.to));
    }

    let tickets = client.send_push_notifications(&messages).await?;
    info!("send:: received {} tickets", tickets.len());
    println!("{}", serde_json::to_string_pretty(&tickets)?);
    Ok(())
}

async fn receipts(client: &ExpoClient, receipt_ids: &[String]) -> Result<(), PushError> {
    let receipts = client.get_push_notification_receipts(receipt_ids).await?;
    info!("receipts:: received {} of {} receipts", receipts.len(), receipt_ids.len());
    println!("{}", serde_json::to_string_pretty(&receipts)?);
    Ok(())
}
