use crate::components;
use crate::workspace::Workspace;
use colored::Colorize;
use rgkit_core::{Reconciler, ResourceClient};

pub async fn handle(workspace: &Workspace, name: &str) -> anyhow::Result<()> {
    let (component, key, desired) = workspace.component(name)?;
    let client = components::client_for(&component.component_type)?;
    workspace.print_header("デプロイを開始します...", name, &component.component_type);

    if !desired.has_identity(client.identity_field()) {
        println!(
            "{}",
            format!(
                "⚠ inputs に '{}' がないため、何もしません",
                client.identity_field()
            )
            .yellow()
        );
        return Ok(());
    }

    let store = workspace.store();
    let lock = store.acquire_lock().await?;

    let reconciler = Reconciler::new(client, store).with_logger(components::console_logger());
    let result = reconciler.deploy(&key, &desired).await;
    lock.release().await?;
    let state = result?;

    println!();
    println!("{}", "✓ デプロイが完了しました".green().bold());
    components::print_summary(&component.component_type, &state);

    Ok(())
}
