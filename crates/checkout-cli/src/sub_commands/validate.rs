use std::sync::Arc;

use anyhow::{bail, Result};
use checkout::blik::{BlikDelegate, BlikInputData};
use checkout::card::{CardConfiguration, CardDelegate, CardInputData};
use checkout::{ComponentParams, Encrypter, PaymentComponentDelegate, PaymentMethod};
use checkout_common::payment_method::types;
use checkout_common::{EncryptionError, Validation};
use clap::{Args, Subcommand};

use crate::config::Settings;

#[derive(Args)]
pub struct ValidateSubCommand {
    #[command(subcommand)]
    method: ValidateMethod,
}

#[derive(Subcommand)]
enum ValidateMethod {
    /// Card details
    Card {
        /// Card number
        number: String,
        /// Expiry date, MM/YY
        #[arg(long, default_value = "")]
        expiry_date: String,
        /// Security code
        #[arg(long, default_value = "")]
        security_code: String,
        /// Holder name
        #[arg(long, default_value = "")]
        holder_name: String,
        /// Require the holder name
        #[arg(long)]
        holder_name_required: bool,
    },
    /// BLIK code
    Blik {
        /// Six digit code
        code: String,
    },
}

/// Validation never gets far enough to encrypt without a public key
#[derive(Debug)]
struct OfflineEncrypter;

impl Encrypter for OfflineEncrypter {
    fn encrypt_field(
        &self,
        _field: &str,
        _value: &str,
        _public_key: &str,
    ) -> Result<String, EncryptionError> {
        Err(EncryptionError::Failed(
            "encryption is not available offline".to_string(),
        ))
    }
}

fn print_field(name: &str, validation: &Validation) {
    match validation.reason() {
        None => println!("{name}: valid"),
        Some(reason) => println!("{name}: {reason}"),
    }
}

pub fn validate(settings: &Settings, sub_command_args: &ValidateSubCommand) -> Result<()> {
    let connector = super::connector(settings)?;
    let params =
        ComponentParams::builder(settings.environment.clone(), &settings.client_key).build()?;
    let encrypter: Arc<dyn Encrypter> = Arc::new(OfflineEncrypter);

    let is_valid = match &sub_command_args.method {
        ValidateMethod::Card {
            number,
            expiry_date,
            security_code,
            holder_name,
            holder_name_required,
        } => {
            let delegate = CardDelegate::new(
                PaymentMethod::new(types::SCHEME),
                params,
                CardConfiguration {
                    is_holder_name_required: *holder_name_required,
                    supported_brands: Vec::new(),
                },
                connector,
                encrypter,
            )?;
            delegate.update_input_data(|input: &mut CardInputData| {
                input.card_number = number.clone();
                input.expiry_date = expiry_date.clone();
                input.security_code = security_code.clone();
                input.holder_name = holder_name.clone();
            });

            let output = delegate.output_data();
            match output.selected_card_type() {
                Some(card_type) => println!("brand: {}", card_type.card_brand),
                None => println!("brand: unknown"),
            }
            print_field("number", &output.card_number.validation);
            print_field("expiry date", &output.expiry_date.validation);
            print_field("security code", &output.security_code.validation);
            print_field("holder name", &output.holder_name.validation);
            output.is_valid()
        }
        ValidateMethod::Blik { code } => {
            let delegate =
                BlikDelegate::new(PaymentMethod::new(types::BLIK), params, connector, encrypter)?;
            delegate.update_input_data(|input: &mut BlikInputData| input.blik_code = code.clone());

            let output = delegate.output_data();
            print_field("code", &output.blik_code.validation);
            output.is_valid()
        }
    };

    if !is_valid {
        bail!("input is not valid");
    }

    Ok(())
}
