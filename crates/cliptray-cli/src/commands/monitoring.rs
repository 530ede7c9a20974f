use crate::commands::common::Session;
use crate::error::CliError;

pub async fn run_monitoring(session: &Session, enabled: bool) -> Result<(), CliError> {
    session.sync().set_monitoring(enabled).await?;
    println!(
        "{}",
        if enabled {
            "Monitoring resumed"
        } else {
            "Monitoring paused"
        }
    );
    Ok(())
}
