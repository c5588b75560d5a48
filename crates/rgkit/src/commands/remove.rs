use crate::components;
use crate::workspace::Workspace;
use colored::Colorize;
use rgkit_core::{Reconciler, ResourceClient, StateStore};

pub async fn handle(workspace: &Workspace, name: &str) -> anyhow::Result<()> {
    let (component, key, _) = workspace.component(name)?;
    let client = components::client_for(&component.component_type)?;
    workspace.print_header("削除を開始します...", name, &component.component_type);

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
        println!("{}", "デプロイされていません。何もしません".yellow());
        return Ok(());
    }

    let reconciler = Reconciler::new(client, store).with_logger(components::console_logger());
    let result = reconciler.remove(&key).await;
    lock.release().await?;
    result?;

    println!();
    println!("{}", "✓ 削除が完了しました".green().bold());
    Ok(())
}
