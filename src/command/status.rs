use anyhow::Result;

use crate::environment::Environment;
use crate::handoff::collect_status;

const STATUS_CONTEXT_LIMIT: usize = 3;

pub async fn run_status(env: &Environment) -> Result<()> {
    let key_source = env.secrets().key_source().await?;
    let report = collect_status(
        key_source,
        &env.git(),
        &env.artifact_store(),
        STATUS_CONTEXT_LIMIT,
    )
    .await;

    if report.is_ready() {
        println!("✅ Ready to hand off");
    } else {
        println!("❌ Not ready to hand off");
    }
    println!("{}", report);
    Ok(())
}
