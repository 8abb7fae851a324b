use crate::api;
use crate::api::AuthConfig;
use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    if let Action::Server {
        port,
        dsn,
        base_url,
        session_ttl,
    } = action
    {
        let config = AuthConfig::new(base_url).with_session_ttl_seconds(session_ttl);
        api::serve(port, dsn, config).await?;
    }

    Ok(())
}
