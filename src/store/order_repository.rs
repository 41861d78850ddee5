//! 订单仓库 - 单个处理周期内的订单集合
//!
//! 只追加，不修改、不删除；每个周期重新构建，用完即丢弃。

use crate::models::order::Order;

/// 一个周期内的订单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRepository {
    orders: Vec<Order>,
}

impl OrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加订单
    pub fn add(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// 全部订单，按追加顺序
    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    pub fn count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn into_orders(self) -> Vec<Order> {
        self.orders
    }
}
