use anyhow::{bail, Result};
use checkout::{PollingPolicy, StatusRepository};
use clap::Args;
use futures::StreamExt;

use crate::config::Settings;

#[derive(Args)]
pub struct PollStatusSubCommand {
    /// Payment data of the await action
    payment_data: String,
}

pub async fn poll_status(settings: &Settings, sub_command_args: &PollStatusSubCommand) -> Result<()> {
    let connector = super::connector(settings)?;
    let repository = StatusRepository::new(connector, settings.client_key.clone())
        .with_policy(PollingPolicy::from(&settings.polling));

    let mut statuses = Box::pin(repository.poll(sub_command_args.payment_data.clone()));
    while let Some(result) = statuses.next().await {
        match result {
            Ok(response) => {
                println!(
                    "{}",
                    response.result_code.as_deref().unwrap_or("no result code")
                );
                if response.is_final_result() {
                    if let Some(payload) = response.payload {
                        println!("payload: {payload}");
                    }
                    return Ok(());
                }
            }
            Err(err) => tracing::warn!("Status call failed: {}", err),
        }
    }

    bail!("status polling timed out")
}
