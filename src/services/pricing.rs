//! 价格计算 - 业务能力层
//!
//! 所有金额以欧分（整数）计算，避免浮点误差。
//! 数量可以为负，金额也可能为负。

use crate::models::order::{Order, SweetLiters};

/// 单块价格（洋葱饼、火焰饼相同）
pub const PIECE_PRICE_CENTS: i64 = 250;
/// 整盘价格
pub const TRAY_PRICE_CENTS: i64 = 2000;

/// 新酒价格，无法识别的选择不计价
pub fn sweet_price_cents(choice: SweetLiters) -> i64 {
    match choice {
        SweetLiters::One => 700,
        SweetLiters::Two => 1200,
        SweetLiters::Three => 1800,
        SweetLiters::Keiner | SweetLiters::Unrecognized => 0,
    }
}

/// 单个订单总价
pub fn order_total_cents(order: &Order) -> i64 {
    let pieces = order.pieces_onion.saturating_add(order.pieces_flame);
    let trays = order.trays_onion.saturating_add(order.trays_flame);
    pieces
        .saturating_mul(PIECE_PRICE_CENTS)
        .saturating_add(trays.saturating_mul(TRAY_PRICE_CENTS))
        .saturating_add(sweet_price_cents(order.sweet_liters))
}

/// 全部订单营业额
pub fn revenue_cents<'a>(orders: impl IntoIterator<Item = &'a Order>) -> i64 {
    orders
        .into_iter()
        .fold(0, |acc, order| acc.saturating_add(order_total_cents(order)))
}

/// 格式化为 "1,234.50 EUR"，负数为 "-2.50 EUR"
pub fn format_eur(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let euros = (cents / 100).to_string();
    let mut grouped = String::with_capacity(euros.len() + euros.len() / 3);
    for (i, ch) in euros.chars().enumerate() {
        if i > 0 && (euros.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}.{:02} EUR", sign, grouped, cents % 100)
}
