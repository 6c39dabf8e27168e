use anyhow::Result;
use checkout::sessions::create_checkout_session;
use checkout::{OrderRequest, SessionModel};
use clap::Args;

use crate::config::Settings;

#[derive(Args)]
pub struct SessionSetupSubCommand {
    /// Session id
    session_id: String,
    /// Session data returned with the session
    session_data: String,
    /// PSP reference of an order to continue paying
    #[arg(long, requires = "order_data")]
    order_psp_reference: Option<String>,
    /// Order data of an order to continue paying
    #[arg(long, requires = "order_psp_reference")]
    order_data: Option<String>,
}

pub async fn session_setup(
    settings: &Settings,
    sub_command_args: &SessionSetupSubCommand,
) -> Result<()> {
    let connector = super::connector(settings)?;
    let order = match (
        &sub_command_args.order_psp_reference,
        &sub_command_args.order_data,
    ) {
        (Some(psp_reference), Some(order_data)) => {
            Some(OrderRequest::new(psp_reference, order_data))
        }
        _ => None,
    };

    let session = create_checkout_session(
        connector,
        &SessionModel::new(
            sub_command_args.session_id.clone(),
            Some(sub_command_args.session_data.clone()),
        ),
        settings.environment.clone(),
        &settings.client_key,
        order,
    )
    .await?;

    let params = session.session_params();
    println!("session: {}", session.setup_response.id);
    if let Some(amount) = &params.amount {
        println!(
            "amount: {} {}",
            amount.value,
            amount.currency.as_deref().unwrap_or_default()
        );
    }
    if let Some(expires_at) = &session.setup_response.expires_at {
        println!("expires at: {expires_at}");
    }
    println!(
        "store details: {}",
        params.enable_store_details.unwrap_or(false)
    );
    if let Some(payment_methods) = &session.setup_response.payment_methods {
        println!("{}", serde_json::to_string_pretty(payment_methods)?);
    }

    Ok(())
}
