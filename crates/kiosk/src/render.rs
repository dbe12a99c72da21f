//! Text rendering of kiosk screens.

use std::fmt::Write;

use chrono::Local;
use domain::{CartEvent, CartView, Catalog, CompletedOrder, OrderStatus, PaymentMethod};

const RULE: &str = "----------------------------------------";

/// Renders the menu, marking items already in the cart.
pub fn menu(catalog: &Catalog, view: &CartView) -> String {
    let mut out = String::from("MENU\n");
    out.push_str(RULE);
    out.push('\n');
    for item in catalog.items() {
        let in_cart = view
            .lines
            .iter()
            .find(|line| line.item_id == item.id)
            .map(|line| format!("  [x{}]", line.quantity))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>3}. {:<24}{:>10}{in_cart}",
            item.id.value(),
            item.name,
            item.price.to_string()
        );
        if !item.description.is_empty() {
            let _ = writeln!(out, "     {}", item.description);
        }
    }
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&cart_badge(view));
    out
}

fn cart_badge(view: &CartView) -> String {
    match view.total_quantity {
        0 => "Cart is empty".to_string(),
        n => format!("Cart: {n} item(s), {}", view.total_amount),
    }
}

fn table_line(view: &CartView) -> String {
    match &view.table {
        Some(table) => format!("Table: {table}"),
        None => "Table: not scanned (use `scan` or `demo`)".to_string(),
    }
}

/// Renders the cart contents and total.
pub fn cart(view: &CartView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", table_line(view));
    if view.lines.is_empty() {
        out.push_str("Your cart is empty");
        return out;
    }
    out.push_str(RULE);
    out.push('\n');
    for line in &view.lines {
        let _ = writeln!(
            out,
            "{:>3}. {:<20} {:>3} x {:>8} = {:>9}",
            line.item_id.value(),
            line.name,
            line.quantity,
            line.price.to_string(),
            line.subtotal().to_string()
        );
    }
    out.push_str(RULE);
    out.push('\n');
    let _ = write!(out, "Total ({} item(s)): {}", view.total_quantity, view.total_amount);
    out
}

/// Renders the order status and whatever the customer should do next.
pub fn status(view: &CartView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status: {}", view.status);
    let _ = writeln!(out, "{}", table_line(view));
    let _ = write!(out, "{}", cart_badge(view));
    match view.status {
        OrderStatus::Idle => {}
        OrderStatus::Submitting => out.push_str("\nPlacing your order..."),
        OrderStatus::Placed => {
            if let Some(completed) = &view.completed_order {
                let _ = write!(out, "\nLast order: {}", completed.ack.order_ref);
            }
            out.push_str("\nType `new` to start another order");
        }
        OrderStatus::Failed => {
            if let Some(reason) = &view.last_error {
                let _ = write!(out, "\nLast attempt failed: {reason}");
            }
            out.push_str("\nCheck out again to retry, or `new` to dismiss");
        }
    }
    out
}

/// Renders the confirmation screen for a placed order.
pub fn confirmation(completed: &CompletedOrder) -> String {
    let order = &completed.order;
    let placed_at = order.submitted_at.with_timezone(&Local);

    let mut out = String::from("ORDER PLACED\n");
    out.push_str(RULE);
    out.push('\n');
    let _ = writeln!(out, "Order: {}", completed.ack.order_ref);
    if let Some(table) = &order.table {
        let _ = writeln!(out, "Table: {table}");
    }
    let _ = writeln!(out, "Name: {}", order.customer_info.name);
    let _ = writeln!(out, "Payment: {}", order.payment_method);
    let _ = writeln!(out, "Time: {}", placed_at.format("%H:%M"));
    if let Some(notes) = &order.customer_info.notes {
        let _ = writeln!(out, "Notes: {notes}");
    }
    out.push_str(RULE);
    out.push('\n');
    for line in &order.lines {
        let _ = writeln!(
            out,
            "{} x {:<20} {:>9}",
            line.quantity,
            line.name,
            line.subtotal().to_string()
        );
    }
    out.push_str(RULE);
    out.push('\n');
    let _ = write!(out, "Total: {}", order.total_amount);
    if order.payment_method == PaymentMethod::Cash {
        out.push_str("\nPlease pay at the counter");
    }
    out
}

/// Renders a change notification worth interrupting the customer for.
///
/// Cart edits are answered directly by the command that made them, so only
/// table binding and submission outcomes are rendered here.
pub fn event(event: &CartEvent, view: &CartView) -> Option<String> {
    match event {
        CartEvent::TableBound {
            table,
            previous: Some(previous),
        } if previous != table => Some(format!("Table changed from {previous} to {table}")),
        CartEvent::TableBound { table, .. } => Some(format!("Seated at table {table}")),
        CartEvent::OrderPlaced { .. } => view.completed_order.as_ref().map(confirmation),
        CartEvent::OrderFailed { reason } => Some(format!(
            "{reason}\nYour cart has been kept. Check out again to retry."
        )),
        CartEvent::SessionReset => Some("Session cleared".to_string()),
        _ => None,
    }
}

/// Renders the command reference.
pub fn help() -> String {
    let methods: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.as_str()).collect();
    format!(
        "\
Commands:
  menu                                   show the menu
  scan <payload>                         scan a table QR code
  demo                                   use the demo table
  add <id> | remove <id> | delete <id>   change the cart
  clear                                  empty the cart
  cart                                   show the cart
  checkout <payment> <name> [-- notes]   place the order
  new                                    start a new order
  status                                 show the order status
  json                                   dump the cart as JSON
  fail on|off                            make the kitchen reject orders
  metrics                                show Prometheus metrics
  help                                   show this help
  quit                                   leave
Payment methods: {}",
        methods.join(", ")
    )
}
