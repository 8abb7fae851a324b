use anyhow::Result;
use custodia::cli::{actions, actions::Action, start};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    match action {
        Action::Server { .. } => actions::server::handle(action).await?,
        Action::CreateAdmin { .. } => actions::create_admin::handle(action).await?,
    }

    Ok(())
}
