use feedsieve_client::{RequestDescriptor, Transport};
use feedsieve_core::GroupSelection;
use feedsieve_filter::cursor;
use feedsieve_filter::envelope::author_of;
use feedsieve_filter::{lock_state, FeedEnvelope, Peek};
use serde_json::Value;

use super::context::AppContext;

const TEXT_PREVIEW_CHARS: usize = 40;

/// Select a group, then scroll the feed `loads` times through the
/// intercepted transport, the way the web page would.
pub async fn run(
    cookie: Option<String>,
    group: GroupSelection,
    loads: u32,
    offset: Option<String>,
) -> anyhow::Result<()> {
    let ctx = AppContext::load(cookie)?;
    ctx.require_login()?;

    let controller = ctx.controller();
    let outcome = controller.select(group).await;
    if let Some(advisory) = &outcome.advisory {
        eprintln!("⚠ {}", advisory);
    } else if outcome.filtering {
        eprintln!("Filtering feed to {} member(s)", outcome.members);
    }
    // Fresh reload of the feed tab.
    controller.switch_tab();

    let facade = ctx.intercepted();
    let author_pointer = ctx.config.filter.author_pointer.clone();
    let mut request = RequestDescriptor::get(ctx.config.api.feed_url.as_str());
    if let Some(offset) = offset.as_deref() {
        request = cursor::advance(&request, offset);
    }

    for load in 1..=loads.max(1) {
        let response = facade.send(request.clone()).await?;
        if !response.is_ok() {
            anyhow::bail!("feed request failed: HTTP {} {}", response.status().as_u16(), response.status_text());
        }

        let envelope = match FeedEnvelope::peek(&response) {
            Peek::Feed(envelope) => envelope,
            Peek::Passthrough(reason) => {
                let body: Option<Value> = response.json().ok();
                let message = body
                    .as_ref()
                    .and_then(|b| b.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                anyhow::bail!("unexpected feed response ({}): {}", reason, message);
            }
        };

        println!("── load {} ({} item(s)) ──", load, envelope.items().len());
        for item in envelope.items() {
            print_item(item, &author_pointer);
        }

        if !envelope.has_more() {
            let streak = lock_state(&ctx.state).empty_streak();
            println!("── end of feed (empty streak {}) ──", streak);
            break;
        }
        match envelope.offset() {
            Some(next) => request = cursor::advance(&request, &next),
            None => break,
        }
    }
    Ok(())
}

fn print_item(item: &Value, author_pointer: &str) {
    let id = item.get("id_str").and_then(Value::as_str).unwrap_or("-");
    let author = author_of(item, author_pointer)
        .map(|a| a.to_string())
        .unwrap_or_else(|| "?".to_string());
    let name = item
        .pointer("/modules/module_author/name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let kind = item
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t.trim_start_matches("DYNAMIC_TYPE_"))
        .unwrap_or_default();
    let text: String = item
        .pointer("/modules/module_dynamic/desc/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .take(TEXT_PREVIEW_CHARS)
        .collect();

    println!("{:<20} {:>12} {:<12} {:<8} {}", id, author, name, kind, text);
}
