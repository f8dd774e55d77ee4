use super::print_field;
use anyhow::Context;
use colored::Colorize;
use opcflow_resources::{Client, SshKeys};

pub async fn set(client: &Client, instance: &str, public_key: &str) -> anyhow::Result<()> {
    println!("{} {}", "Updating SSH key of".blue(), instance.cyan());

    let key = SshKeys::new(client)
        .set(instance, public_key)
        .await
        .with_context(|| format!("Failed to update SSH key of {}", instance))?;

    println!("{} {}", "✓".green(), "SSH key updated".green());
    if !key.last_update_time.is_empty() {
        print_field("Updated", &key.last_update_time);
    }
    Ok(())
}
