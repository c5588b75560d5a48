use crate::components;
use crate::workspace::Workspace;
use colored::Colorize;
use rgkit_core::{Reconciler, ResourceClient, StateStore};

pub async fn handle(workspace: &Workspace, name: &str) -> anyhow::Result<()> {
    let (component, key, desired) = workspace.component(name)?;
    let client = components::client_for(&component.component_type)?;
    workspace.print_header("状態を取得しています...", name, &component.component_type);

    let store = workspace.store();
    let lock = store.acquire_lock().await?;

    let deployed = match store.load(&key).await {
        Ok(current) => current.has_identity(client.identity_field()),
        Err(e) => {
            lock.release().await?;
            return Err(e.into());
        }
    };
    if !deployed {
        lock.release().await?;
        println!("{}", "デプロイされていません".yellow());
        return Ok(());
    }

    let reconciler = Reconciler::new(client, store).with_logger(components::console_logger());
    let result = reconciler.info(&key, &desired).await;
    lock.release().await?;
    let state = result?;

    println!();
    components::print_summary(&component.component_type, &state);
    Ok(())
}
