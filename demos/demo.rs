use mailhog_client::{Client, Criteria};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), mailhog_client::Error> {
    let host = std::env::var("MAILHOG_HOST").unwrap_or_else(|_| "http://localhost".to_string());

    let client = Client::builder()
        .host(host)
        .timeout(Duration::from_secs(10))
        .build()?;
    println!("Querying {}", client.base_url());

    let messages = client.find_all().await?;
    println!("{} captured message(s)", messages.len());
    for msg in messages {
        println!(
            "  {} | from {:?} | to {:?} | {:?}",
            msg.id(),
            msg.from(),
            msg.to(),
            msg.subject()
        );
    }

    if let Some(last) = client.get_last().await? {
        println!("Last message text part: {:?}", last.text_part());
        println!("Last message HTML part: {:?}", last.html_part());
    }

    let welcome = client.find_by(Criteria::Containing, "welcome", Some(5)).await?;
    println!("{} message(s) containing \"welcome\"", welcome.len());

    Ok(())
}
