//! Handlers for the `order` command group.

use crate::cli::output;
use crate::cli::{CreateArgs, StatusArgs};
use crate::domain::order::{NewOrder, Order};
use crate::error::Result;
use crate::infrastructure::bootstrap::Ledger;
use crate::infrastructure::config::settings::Config;

fn print_order(order: &Order) {
    output::key_value("Id", order.id);
    output::key_value("Number", &order.order_number);
    output::key_value("Customer", order.customer_id);
    output::key_value("Status", order.status);
    output::key_value("Items", order.item_quantity());
    output::key_value("Total", order.total_amount);
}

/// Execute `order status`.
pub fn status(config: &Config, args: &StatusArgs) -> Result<()> {
    let ledger = Ledger::build(config)?;
    let update = ledger.orders.update_status(args.id, args.status)?;

    output::section("Order status");
    print_order(&update.order);
    println!();
    match update.refresh {
        Some(refresh) => {
            output::key_value("order_count", refresh.order_count);
            output::key_value("sales", refresh.sales);
            output::ok("Order stats refreshed");
        }
        None => output::note("Order stats unaffected"),
    }
    Ok(())
}

/// Execute `order create`.
pub fn create(config: &Config, args: CreateArgs) -> Result<()> {
    let new_order = NewOrder::try_new(args.customer, args.status, args.items)?;
    let ledger = Ledger::build(config)?;
    let order = ledger.orders.create(&new_order)?;

    output::section("Order created");
    print_order(&order);
    Ok(())
}
