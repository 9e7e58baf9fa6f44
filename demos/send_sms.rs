use std::io;

use smsmanager::{Credentials, RequestBuilder, SmsManagerClient};

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = required_env("SMSMANAGER_USERNAME")?;
    let password = required_env("SMSMANAGER_PASSWORD")?;
    let phone = required_env("SMSMANAGER_PHONE")?;
    let message = std::env::var("SMSMANAGER_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smsmanager demo.".to_owned());

    let client = SmsManagerClient::new(Credentials::with_password(username, password)?)?;

    let mut batch = RequestBuilder::new();
    batch.set_message_ascii(message)?.add_recipient(phone)?;
    if let Ok(sender) = std::env::var("SMSMANAGER_SENDER") {
        batch.set_sender(sender)?;
    }
    batch.finalize_request()?;

    let response = client.send_and_clear(&mut batch).await?;
    println!("status: {}", response.status_code);
    for (request_id, record) in &response.requests {
        println!(
            "request {request_id}: sms_count={}, sms_price={}, numbers={:?}",
            record.sms_count, record.sms_price, record.numbers
        );
    }

    Ok(())
}
