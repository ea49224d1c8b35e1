use bookworm_core::config::StorefrontConfig;
use bookworm_core::Session;
use rust_decimal::Decimal;

const RULE: &str = "==================================================";
const THIN_RULE: &str = "--------------------------------------------------";

pub const COMMAND_HINT: &str =
    "commands: + N (more) | - N (less) | add N (add to cart) | discount | help | quit";

/// Whole amounts print without decimals, discounted ones keep at most two places.
pub fn format_amount(amount: Decimal) -> String {
    amount.round_dp(2).normalize().to_string()
}

/// Renders the full storefront screen for the current session.
///
/// While the catalog is loading only the loading indicator is drawn.
pub fn render(session: &Session, storefront: &StorefrontConfig, notice: Option<&str>) -> String {
    if session.is_loading() {
        return "Loading...".to_string();
    }

    let mut lines = Vec::new();
    lines.push(RULE.to_string());
    lines.push(format!("  {}", storefront.title));

    let metadata = &session.catalog().metadata;
    match (&metadata.display_name, metadata.published_date) {
        (Some(name), Some(date)) => lines.push(format!("  {name} ({date})")),
        (Some(name), None) => lines.push(format!("  {name}")),
        (None, Some(date)) => lines.push(format!("  bestsellers of {date}")),
        (None, None) => {}
    }
    lines.push(RULE.to_string());

    if session.catalog().is_empty() {
        lines.push("  no books available right now".to_string());
    }

    for (position, item) in session.catalog().items().iter().enumerate() {
        let card = position + 1;
        lines.push(format!("[{card}] {}", item.title));
        if let Some(author) = &item.attributes.author {
            lines.push(format!("    {author}"));
        }
        if let Some(image_url) = &item.image_url {
            lines.push(format!("    cover: {image_url}"));
        }
        lines.push(format!("    {} {}", format_amount(item.price), storefront.currency));
        lines.push(format!(
            "    [-] {} [+]    add to cart: `add {card}`",
            session.quantity_of(&item.id)
        ));
        lines.push(THIN_RULE.to_string());
    }

    lines.extend(render_footer(session, storefront));

    if let Some(notice) = notice {
        lines.push(format!("> {notice}"));
    }

    lines.join("\n")
}

fn render_footer(session: &Session, storefront: &StorefrontConfig) -> Vec<String> {
    let summary = session.summary();
    let toggle = if session.discount_applied() { "[x] on" } else { "[ ] off" };

    let mut lines = vec![
        format!("Cart total: {} {}", format_amount(summary.total), storefront.currency),
        format!("Discount ({}%): {toggle}", session.discount().as_percent()),
    ];
    if session.discount_applied() {
        lines.push("Discount applied!".to_string());
    }
    lines.push(RULE.to_string());
    lines.push(COMMAND_HINT.to_string());
    lines
}
