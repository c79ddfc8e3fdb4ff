use super::context::AppContext;

pub async fn run(cookie: Option<String>) -> anyhow::Result<()> {
    let ctx = AppContext::load(cookie)?;

    println!("feedsieve status");
    println!("================");
    println!();

    let config_path = ctx.paths.config_file();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() { "✓" } else { "✗ (not found, using defaults)" }
    );

    let cookie_status = if ctx.config.session_cookie().is_some() {
        "✓ configured"
    } else {
        "✗ not set"
    };
    println!("Cookie:    {}", cookie_status);

    match ctx.user() {
        Some(user) => println!("User:      {}", user),
        None => println!("User:      ✗ not logged in (no DedeUserID in cookie)"),
    }
    println!();

    let filter = &ctx.config.filter;
    println!("Feed:      {}", ctx.config.api.feed_url);
    println!("Limits:    {} pages per load, breaker after {} empty loads", filter.max_retry_pages, filter.max_empty_batches);
    println!(
        "Members:   page size {}, {} ms between pages",
        ctx.config.members.page_size, ctx.config.members.page_delay_ms
    );
    if let Some(proxy) = ctx.config.network.proxy.as_deref() {
        println!("Proxy:     {}", proxy);
    }
    Ok(())
}
