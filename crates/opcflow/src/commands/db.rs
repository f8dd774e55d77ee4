use super::{paint_state, print_field};
use anyhow::Context;
use colored::Colorize;
use opcflow_resources::{Client, CreateDatabaseInput, DatabaseInstance, Databases};

pub async fn create(client: &Client, input: CreateDatabaseInput) -> anyhow::Result<()> {
    println!(
        "{} {} ({} {})",
        "Creating database instance".blue(),
        input.service_name.cyan(),
        input.edition,
        input.version
    );
    println!(
        "{}",
        "Provisioning usually takes 30 minutes or more".dimmed()
    );

    let db = Databases::new(client)
        .create(&input)
        .await
        .with_context(|| format!("Failed to create database instance {}", input.service_name))?;

    println!("{} {}", "✓".green(), "Database instance is running".green());
    print_info(&db);
    Ok(())
}

pub async fn show(client: &Client, name: &str) -> anyhow::Result<()> {
    let db = Databases::new(client)
        .get(name)
        .await?
        .with_context(|| format!("Database instance '{}' not found", name))?;
    print_info(&db);
    Ok(())
}

pub async fn delete(client: &Client, name: &str) -> anyhow::Result<()> {
    println!("{} {}", "Deleting database instance".blue(), name.cyan());
    Databases::new(client)
        .delete(name)
        .await
        .with_context(|| format!("Failed to delete database instance {}", name))?;
    println!("{} {}", "✓".green(), "Database instance deleted".green());
    Ok(())
}

fn print_info(db: &DatabaseInstance) {
    println!();
    println!("{}", db.service_name.bold());
    print_field(
        "Status",
        paint_state(db.status.as_str(), &["Running"], &["Failed", "Stopped"]),
    );
    print_field("Version", &db.version);
    print_field("Edition", &db.edition);
    print_field("Shape", &db.shape);
    if !db.connect_descriptor.is_empty() {
        print_field("Connect", db.connect_descriptor.cyan());
    }
    if !db.em_url.is_empty() {
        print_field("EM console", &db.em_url);
    }
    if let Some(description) = &db.description {
        print_field("Description", description.dimmed());
    }
}
