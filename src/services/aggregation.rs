//! 汇总引擎 - 业务能力层
//!
//! 从一个周期内的全部订单计算所有视图。每个视图都是订单集合的纯函数，
//! 不保留任何跨周期状态。
//!
//! 取整规则：烤盘数 = ceil(折算块数 / 9)，每个产品线分别取整，
//! 并且在该视图自身的分组粒度上取整（按天视图先按天求和再取整，
//! 不是把按时段已取整的结果相加）。
//!
//! 数量可以为负，求和用饱和运算，极端输入不会溢出。

use std::collections::BTreeMap;

use crate::models::order::{Day, Order, Preparation, SweetLiters, ERROR_MARKER, PIECES_PER_TRAY};
use crate::models::table::{Cell, ReportSet, ResultTable, ViewName};
use crate::services::pricing::{format_eur, order_total_cents};

/// 折算块数 → 烤盘数（向上取整，负数 -5 → 0，-10 → -1）
pub fn trays_for(piece_equivalents: i64) -> i64 {
    let quotient = piece_equivalents / PIECES_PER_TRAY;
    // 整数除法向零截断，负数的截断结果已经是向上取整
    if piece_equivalents % PIECES_PER_TRAY > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// 烤盘汇总的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraySummary {
    pub day: Day,
    /// 按天汇总时为 None
    pub time_slot: Option<String>,
    pub preparation: Preparation,
    pub onion_piece_equivalents: i64,
    pub flame_piece_equivalents: i64,
    pub onion_trays: i64,
    pub flame_trays: i64,
    pub total_trays: i64,
}

impl TraySummary {
    fn new(
        day: Day,
        time_slot: Option<String>,
        preparation: Preparation,
        onion_piece_equivalents: i64,
        flame_piece_equivalents: i64,
    ) -> Self {
        let onion_trays = trays_for(onion_piece_equivalents);
        let flame_trays = trays_for(flame_piece_equivalents);
        Self {
            day,
            time_slot,
            preparation,
            onion_piece_equivalents,
            flame_piece_equivalents,
            onion_trays,
            flame_trays,
            total_trays: onion_trays.saturating_add(flame_trays),
        }
    }
}

/// 烤盘总计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrayTotals {
    pub onion_trays: i64,
    pub flame_trays: i64,
    pub total_trays: i64,
}

/// 新酒汇总（直接求和，不取整）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweetTotals {
    pub one_liter: u64,
    pub two_liter: u64,
    pub three_liter: u64,
    /// 选择无法识别的订单数
    pub unrecognized: u64,
    pub liters: u64,
}

impl SweetTotals {
    fn add(&mut self, choice: SweetLiters) {
        match choice.flags() {
            Some([one, two, three]) => {
                self.one_liter += u64::from(one);
                self.two_liter += u64::from(two);
                self.three_liter += u64::from(three);
            }
            None => self.unrecognized += 1,
        }
        self.liters += u64::from(choice.liters());
    }
}

/// 按时段/按天的新酒汇总行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweetSummary {
    pub day: Day,
    pub time_slot: Option<String>,
    pub totals: SweetTotals,
}

/// 按天营业额
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueSummary {
    pub day: Day,
    pub orders: u64,
    pub revenue_cents: i64,
}

/// 一次汇总的全部结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// 按 (day, time_slot) 稳定排序后的订单
    pub all_orders: Vec<Order>,
    pub tray_by_slot: Vec<TraySummary>,
    pub tray_by_day: Vec<TraySummary>,
    pub total_trays: TrayTotals,
    pub sweet_by_slot: Vec<SweetSummary>,
    pub sweet_by_day: Vec<SweetSummary>,
    pub total_sweet: SweetTotals,
    /// 按时段烤盘汇总，按总盘数降序（同值保持原分组顺序）
    pub alarm_ranking: Vec<TraySummary>,
    pub revenue_by_day: Vec<RevenueSummary>,
    pub total_revenue_cents: i64,
}

#[derive(Default)]
struct PieceAcc {
    onion: i64,
    flame: i64,
}

impl PieceAcc {
    fn add(&mut self, order: &Order) {
        self.onion = self.onion.saturating_add(order.onion_piece_equivalents());
        self.flame = self.flame.saturating_add(order.flame_piece_equivalents());
    }
}

/// 计算所有视图
///
/// 空订单集合得到空的分组视图和全零的总计，不会失败。
pub fn aggregate(orders: &[Order]) -> Aggregation {
    let mut all_orders = orders.to_vec();
    all_orders.sort_by(|a, b| (a.day, &a.time_slot).cmp(&(b.day, &b.time_slot)));

    let mut slot_pieces: BTreeMap<(Day, String, Preparation), PieceAcc> = BTreeMap::new();
    let mut day_pieces: BTreeMap<(Day, Preparation), PieceAcc> = BTreeMap::new();
    let mut slot_sweet: BTreeMap<(Day, String), SweetTotals> = BTreeMap::new();
    let mut day_sweet: BTreeMap<Day, SweetTotals> = BTreeMap::new();
    let mut day_revenue: BTreeMap<Day, (u64, i64)> = BTreeMap::new();
    let mut total_sweet = SweetTotals::default();

    for order in orders {
        slot_pieces
            .entry((order.day, order.time_slot.clone(), order.preparation))
            .or_default()
            .add(order);
        day_pieces
            .entry((order.day, order.preparation))
            .or_default()
            .add(order);
        slot_sweet
            .entry((order.day, order.time_slot.clone()))
            .or_default()
            .add(order.sweet_liters);
        day_sweet.entry(order.day).or_default().add(order.sweet_liters);
        total_sweet.add(order.sweet_liters);

        let revenue = day_revenue.entry(order.day).or_default();
        revenue.0 += 1;
        revenue.1 = revenue.1.saturating_add(order_total_cents(order));
    }

    let tray_by_slot: Vec<TraySummary> = slot_pieces
        .into_iter()
        .map(|((day, slot, prep), acc)| TraySummary::new(day, Some(slot), prep, acc.onion, acc.flame))
        .collect();

    let tray_by_day: Vec<TraySummary> = day_pieces
        .into_iter()
        .map(|((day, prep), acc)| TraySummary::new(day, None, prep, acc.onion, acc.flame))
        .collect();

    let total_trays = tray_by_day.iter().fold(TrayTotals::default(), |mut acc, row| {
        acc.onion_trays = acc.onion_trays.saturating_add(row.onion_trays);
        acc.flame_trays = acc.flame_trays.saturating_add(row.flame_trays);
        acc.total_trays = acc.total_trays.saturating_add(row.total_trays);
        acc
    });

    let mut alarm_ranking = tray_by_slot.clone();
    alarm_ranking.sort_by(|a, b| b.total_trays.cmp(&a.total_trays));

    let sweet_by_slot = slot_sweet
        .into_iter()
        .map(|((day, slot), totals)| SweetSummary {
            day,
            time_slot: Some(slot),
            totals,
        })
        .collect();

    let sweet_by_day = day_sweet
        .into_iter()
        .map(|(day, totals)| SweetSummary {
            day,
            time_slot: None,
            totals,
        })
        .collect();

    let revenue_by_day: Vec<RevenueSummary> = day_revenue
        .into_iter()
        .map(|(day, (orders, revenue_cents))| RevenueSummary {
            day,
            orders,
            revenue_cents,
        })
        .collect();
    let total_revenue_cents = revenue_by_day
        .iter()
        .fold(0i64, |acc, r| acc.saturating_add(r.revenue_cents));

    Aggregation {
        all_orders,
        tray_by_slot,
        tray_by_day,
        total_trays,
        sweet_by_slot,
        sweet_by_day,
        total_sweet,
        alarm_ranking,
        revenue_by_day,
        total_revenue_cents,
    }
}

// ========== 结果表 ==========

fn sweet_flag_cells(choice: SweetLiters) -> [Cell; 3] {
    match choice.flags() {
        Some([one, two, three]) => [Cell::from(one), Cell::from(two), Cell::from(three)],
        None => [
            Cell::from(ERROR_MARKER),
            Cell::from(ERROR_MARKER),
            Cell::from(ERROR_MARKER),
        ],
    }
}

fn all_orders_table(orders: &[Order]) -> ResultTable {
    let mut table = ResultTable::new(vec![
        "day",
        "time_slot",
        "preparation",
        "fulfillment",
        "pieces_onion",
        "trays_onion",
        "pieces_flame",
        "trays_flame",
        "sweet_1l",
        "sweet_2l",
        "sweet_3l",
        "first_name",
        "last_name",
        "email",
        "phone",
        "address",
        "onion_piece_equivalents",
        "flame_piece_equivalents",
        "total_piece_equivalents",
        "sweet_liters",
        "order_total",
    ]);
    for order in orders {
        let [one, two, three] = sweet_flag_cells(order.sweet_liters);
        table.push_row(vec![
            Cell::from(order.day.name()),
            Cell::from(order.time_slot.as_str()),
            Cell::from(order.preparation.name()),
            Cell::from(order.fulfillment.name()),
            Cell::from(order.pieces_onion),
            Cell::from(order.trays_onion),
            Cell::from(order.pieces_flame),
            Cell::from(order.trays_flame),
            one,
            two,
            three,
            Cell::from(order.first_name.as_str()),
            Cell::from(order.last_name.as_str()),
            Cell::from(order.email.as_str()),
            Cell::from(order.phone.as_str()),
            Cell::from(order.address_or_none()),
            Cell::from(order.onion_piece_equivalents()),
            Cell::from(order.flame_piece_equivalents()),
            Cell::from(order.total_piece_equivalents()),
            Cell::from(order.sweet_liter_total()),
            Cell::from(format_eur(order_total_cents(order))),
        ]);
    }
    table
}

fn tray_table(rows: &[TraySummary], with_slot: bool) -> ResultTable {
    let mut columns = vec!["day"];
    if with_slot {
        columns.push("time_slot");
    }
    columns.extend(["preparation", "onion_trays", "flame_trays", "total_trays"]);

    let mut table = ResultTable::new(columns);
    for row in rows {
        let mut cells = vec![Cell::from(row.day.name())];
        if with_slot {
            cells.push(Cell::from(row.time_slot.clone().unwrap_or_default()));
        }
        cells.extend([
            Cell::from(row.preparation.name()),
            Cell::from(row.onion_trays),
            Cell::from(row.flame_trays),
            Cell::from(row.total_trays),
        ]);
        table.push_row(cells);
    }
    table
}

const SWEET_COLUMNS: [&str; 5] = [
    "sweet_1l",
    "sweet_2l",
    "sweet_3l",
    "sweet_unrecognized",
    "sweet_liters",
];

fn sweet_cells(totals: &SweetTotals) -> [Cell; 5] {
    [
        Cell::from(totals.one_liter),
        Cell::from(totals.two_liter),
        Cell::from(totals.three_liter),
        Cell::from(totals.unrecognized),
        Cell::from(totals.liters),
    ]
}

fn sweet_table(rows: &[SweetSummary], with_slot: bool) -> ResultTable {
    let mut columns = vec!["day"];
    if with_slot {
        columns.push("time_slot");
    }
    columns.extend(SWEET_COLUMNS);

    let mut table = ResultTable::new(columns);
    for row in rows {
        let mut cells = vec![Cell::from(row.day.name())];
        if with_slot {
            cells.push(Cell::from(row.time_slot.clone().unwrap_or_default()));
        }
        cells.extend(sweet_cells(&row.totals));
        table.push_row(cells);
    }
    table
}

fn alarm_table(rows: &[TraySummary]) -> ResultTable {
    let mut table = ResultTable::new(vec!["day", "time_slot", "preparation", "total_trays"]);
    for row in rows {
        table.push_row(vec![
            Cell::from(row.day.name()),
            Cell::from(row.time_slot.clone().unwrap_or_default()),
            Cell::from(row.preparation.name()),
            Cell::from(row.total_trays),
        ]);
    }
    table
}

impl Aggregation {
    pub fn order_count(&self) -> usize {
        self.all_orders.len()
    }

    /// 转换为按名称组织的结果表集合
    pub fn to_report_set(&self) -> ReportSet {
        let mut set = ReportSet::new(self.order_count());

        set.insert(ViewName::AllOrders, all_orders_table(&self.all_orders));
        set.insert(ViewName::TraySummaryBySlot, tray_table(&self.tray_by_slot, true));
        set.insert(ViewName::TraySummaryByDay, tray_table(&self.tray_by_day, false));

        let mut total_trays = ResultTable::new(vec!["onion_trays", "flame_trays", "total_trays"]);
        total_trays.push_row(vec![
            Cell::from(self.total_trays.onion_trays),
            Cell::from(self.total_trays.flame_trays),
            Cell::from(self.total_trays.total_trays),
        ]);
        set.insert(ViewName::TotalTrays, total_trays);

        set.insert(ViewName::SweetLiterBySlot, sweet_table(&self.sweet_by_slot, true));
        set.insert(ViewName::SweetLiterByDay, sweet_table(&self.sweet_by_day, false));

        let mut total_sweet = ResultTable::new(SWEET_COLUMNS.to_vec());
        total_sweet.push_row(sweet_cells(&self.total_sweet).to_vec());
        set.insert(ViewName::TotalSweetLiter, total_sweet);

        set.insert(ViewName::AlarmRanking, alarm_table(&self.alarm_ranking));

        let mut revenue_by_day = ResultTable::new(vec!["day", "orders", "revenue_cents", "revenue"]);
        for row in &self.revenue_by_day {
            revenue_by_day.push_row(vec![
                Cell::from(row.day.name()),
                Cell::from(row.orders),
                Cell::from(row.revenue_cents),
                Cell::from(format_eur(row.revenue_cents)),
            ]);
        }
        set.insert(ViewName::RevenueByDay, revenue_by_day);

        let mut total_revenue = ResultTable::new(vec!["orders", "revenue_cents", "revenue"]);
        total_revenue.push_row(vec![
            Cell::from(self.order_count() as u64),
            Cell::from(self.total_revenue_cents),
            Cell::from(format_eur(self.total_revenue_cents)),
        ]);
        set.insert(ViewName::TotalRevenue, total_revenue);

        set
    }
}

/// 直接从订单得到结果表集合
pub fn build_report_set(orders: &[Order]) -> ReportSet {
    aggregate(orders).to_report_set()
}
