use super::{paint_state, print_field};
use anyhow::Context;
use colored::Colorize;
use opcflow_resources::{Client, CreateLoadBalancerInput, LoadBalancerInfo, LoadBalancers};

pub async fn create(
    client: &Client,
    name: String,
    region: String,
    scheme: String,
    description: Option<String>,
    permitted_clients: Vec<String>,
) -> anyhow::Result<()> {
    println!(
        "{} {} ({})",
        "Creating load balancer".blue(),
        name.cyan(),
        region
    );

    let input = CreateLoadBalancerInput {
        name,
        region,
        scheme,
        description,
        permitted_clients,
        ..Default::default()
    };
    let lb = LoadBalancers::new(client)
        .create(&input)
        .await
        .with_context(|| format!("Failed to create load balancer {}", input.name))?;

    println!("{} {}", "✓".green(), "Load balancer is ready".green());
    print_info(&lb);
    Ok(())
}

pub async fn show(client: &Client, region: &str, name: &str) -> anyhow::Result<()> {
    let lbs = LoadBalancers::new(client);
    if lbs.get(region, name).await?.is_none() {
        anyhow::bail!("Load balancer '{}' not found in {}", name, region);
    }
    let lb = lbs.get_detailed(region, name).await?;
    print_info(&lb);
    Ok(())
}

pub async fn delete(client: &Client, region: &str, name: &str) -> anyhow::Result<()> {
    println!("{} {}", "Deleting load balancer".blue(), name.cyan());
    LoadBalancers::new(client)
        .delete(region, name)
        .await
        .with_context(|| format!("Failed to delete load balancer {}", name))?;
    println!("{} {}", "✓".green(), "Load balancer deleted".green());
    Ok(())
}

fn print_info(lb: &LoadBalancerInfo) {
    println!();
    println!("{}", lb.name.bold());
    print_field(
        "State",
        paint_state(
            lb.state.as_str(),
            &["HEALTHY", "CREATED"],
            &["CREATION_FAILED", "MODIFICATION_FAILED", "DELETION_FAILED"],
        ),
    );
    print_field("Region", &lb.region);
    print_field("Scheme", &lb.scheme);
    if !lb.canonical_host_name.is_empty() {
        print_field("Host", lb.canonical_host_name.cyan());
    }
    if let Some(description) = &lb.description {
        print_field("Description", description);
    }
    if lb.disabled {
        print_field("Disabled", "yes".yellow());
    }
    if !lb.permitted_clients.is_empty() {
        print_field("Permitted clients", lb.permitted_clients.join(", "));
    }
    if !lb.tags.is_empty() {
        print_field("Tags", lb.tags.join(", ").dimmed());
    }
}
