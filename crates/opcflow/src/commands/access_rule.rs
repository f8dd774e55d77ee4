use super::{paint_state, print_field};
use anyhow::Context;
use colored::Colorize;
use opcflow_resources::{AccessRuleInput, AccessRules, Client};

pub async fn create(client: &Client, instance: &str, input: AccessRuleInput) -> anyhow::Result<()> {
    println!(
        "{} {} on {}",
        "Creating access rule".blue(),
        input.rule_name.cyan(),
        instance
    );

    let rule = AccessRules::new(client)
        .create(instance, &input)
        .await
        .with_context(|| format!("Failed to create access rule {}", input.rule_name))?;

    println!("{} {}", "✓".green(), "Access rule created".green());
    print_field(
        "Status",
        paint_state(rule.status.as_str(), &["enabled"], &[]),
    );
    print_field("Source", &rule.source);
    print_field("Destination", &rule.destination);
    print_field("Ports", &rule.ports);
    Ok(())
}

pub async fn delete(client: &Client, instance: &str, name: &str) -> anyhow::Result<()> {
    println!(
        "{} {} on {}",
        "Deleting access rule".blue(),
        name.cyan(),
        instance
    );
    AccessRules::new(client)
        .delete(instance, name)
        .await
        .with_context(|| format!("Failed to delete access rule {}", name))?;
    println!("{} {}", "✓".green(), "Access rule deleted".green());
    Ok(())
}
