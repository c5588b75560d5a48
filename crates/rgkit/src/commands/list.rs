use crate::workspace::Workspace;
use colored::Colorize;

pub async fn handle(workspace: &Workspace) -> anyhow::Result<()> {
    let deployed = workspace.store().list().await?;

    println!(
        "{}",
        format!("コンポーネント ({} 個):", workspace.config.components.len()).bold()
    );
    for (name, component) in &workspace.config.components {
        let key = component.instance_key(name);
        let status = if deployed.contains(&key) {
            "deployed".green()
        } else {
            "-".dimmed()
        };
        println!(
            "  • {} ({}) {}",
            name.cyan(),
            component.component_type,
            status
        );
    }

    Ok(())
}
