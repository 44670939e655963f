use healthlog_client::{HealthLogClient, config::Config, http_client::ReqwestHealthLogClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects HEALTHLOG_API_TOKEN and HEALTHLOG_USER_ID in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let Some(user_id) = cfg.user_id else {
        eprintln!("HEALTHLOG_USER_ID is not set");
        return Ok(());
    };
    let client = ReqwestHealthLogClient::from_config(&cfg)?;
    let profile = client.get_profile().await?;
    println!(
        "{}: goal {:.1}",
        profile.first_name.as_deref().unwrap_or("user"),
        profile.effective_goal_weight()
    );
    for w in client.list_weigh_ins(user_id).await? {
        println!("{}  {:.1}", w.date, w.weight);
    }
    Ok(())
}
