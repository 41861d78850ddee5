//! 订单单据生成
//!
//! 每个订单一页，供取货/配送时打印使用，最后附营业额。

use std::fmt::Write;

use crate::models::order::{Day, Fulfillment, Order, SweetLiters};
use crate::services::pricing::{format_eur, order_total_cents, revenue_cents};

/// 页面之间的分隔符（换页符）
pub const PAGE_BREAK: &str = "\u{000C}\n";

/// 单据标题
pub const SLIP_TITLE: &str = "Bestellung Herbstfest";

fn sweet_line(choice: SweetLiters) -> Option<String> {
    match choice {
        SweetLiters::Keiner => Some("Neuer Süßer: 0".to_string()),
        SweetLiters::One | SweetLiters::Two | SweetLiters::Three => {
            Some(format!("Neuer Süßer: {}", choice.name()))
        }
        // 无法识别时不打印这一行，交给人工核对
        SweetLiters::Unrecognized => None,
    }
}

/// 生成单个订单的单据
pub fn render_slip(order: &Order) -> String {
    let mut lines: Vec<String> = vec![SLIP_TITLE.to_string(), String::new()];

    if order.fulfillment != Fulfillment::Unrecognized {
        lines.push(order.fulfillment.label().to_string());
    }
    if order.day != Day::Unrecognized {
        lines.push(format!("{}, {}", order.day.label(), order.time_slot));
    }
    lines.push(String::new());

    lines.push(order.customer_name());
    if let Some(address) = &order.address {
        lines.push(address.clone());
    }
    lines.push(format!("Tel: {}", order.phone));
    lines.push(String::new());

    lines.push(order.preparation_text.clone());
    lines.push(String::new());
    lines.push(format!("Stück Zwiebel: {}", order.pieces_onion));
    lines.push(format!("Blech Zwiebel: {}", order.trays_onion));
    lines.push(format!("Stück Flamm: {}", order.pieces_flame));
    lines.push(format!("Blech Flamm: {}", order.trays_flame));
    if let Some(line) = sweet_line(order.sweet_liters) {
        lines.push(line);
    }
    lines.push(String::new());
    lines.push(format!("Gesamt: {}", format_eur(order_total_cents(order))));

    lines.join("\n") + "\n"
}

/// 生成全部单据，按订单到达顺序
pub fn render_slips(orders: &[Order]) -> String {
    let mut out = String::new();
    for order in orders {
        out.push_str(&render_slip(order));
        out.push_str(PAGE_BREAK);
    }
    let _ = writeln!(out, "Umsatz: {}", format_eur(revenue_cents(orders)));
    out
}
