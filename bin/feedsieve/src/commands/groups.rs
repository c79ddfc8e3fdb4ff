use feedsieve_core::GroupId;

use super::context::AppContext;

pub async fn list(cookie: Option<String>) -> anyhow::Result<()> {
    let ctx = AppContext::load(cookie)?;
    ctx.require_login()?;

    let groups = ctx.directory().list_groups().await;
    if groups.is_empty() {
        println!("No follow groups found (or the request failed, see log).");
        return Ok(());
    }

    println!("{:>8}  {:>6}  {}", "TAGID", "COUNT", "NAME");
    for group in &groups {
        println!("{:>8}  {:>6}  {}", group.tagid, group.count, group.name);
    }
    println!();
    println!("Use `feedsieve feed --group <TAGID>` to filter the feed.");
    Ok(())
}

pub async fn members(cookie: Option<String>, group: i64) -> anyhow::Result<()> {
    let ctx = AppContext::load(cookie)?;
    ctx.require_login()?;

    if GroupId(group) == GroupId::ALL_CONTENT {
        anyhow::bail!("{} is the \"all content\" tab, not a group", group);
    }

    let members = ctx.resolver().resolve_members(GroupId(group)).await;
    for member in &members {
        println!("{}", member);
    }
    eprintln!("{} member(s) in group {}", members.len(), group);
    Ok(())
}
