//! 单个处理周期
//!
//! 取消息 → 解析订单 → 订单仓库 → 汇总 → 输出。
//! 新订单判断所用的计数只包含成功提取的订单。

use std::future::Future;
use tracing::{debug, info, warn};

use crate::clients::message_source::{Message, MessageSource};
use crate::error::AppResult;
use crate::models::order::Order;
use crate::models::raw_row::RawRow;
use crate::models::table::ReportSet;
use crate::services::aggregation::build_report_set;
use crate::services::order_validator::parse_order;
use crate::services::table_parser::parse_message;
use crate::store::OrderRepository;

/// 一批消息的解析结果
#[derive(Debug, Default)]
pub struct IngestResult {
    pub repository: OrderRepository,
    /// 提取失败被丢弃的记录数
    pub dropped: usize,
    /// 含有无法识别字段的订单数
    pub flagged: usize,
}

impl IngestResult {
    fn accept(&mut self, source_id: &str, row: &RawRow) {
        match parse_order(row) {
            Ok(normalized) => {
                if !normalized.issues.is_empty() {
                    self.flagged += 1;
                    for issue in &normalized.issues {
                        warn!("[消息 {}] ⚠️ {}", source_id, issue);
                    }
                }
                if normalized.order.is_delivery_without_address() {
                    warn!(
                        "[消息 {}] ⚠️ 配送订单的取货文本不是 \"Lieferung\"，地址未录入",
                        source_id
                    );
                }
                self.repository.add(normalized.order);
            }
            Err(e) => self.drop_record(source_id, &e),
        }
    }

    fn drop_record(&mut self, source_id: &str, reason: &dyn std::fmt::Display) {
        self.dropped += 1;
        warn!("[消息 {}] ❌ 记录已丢弃: {}", source_id, reason);
    }
}

/// 解析一批原始表格
pub fn ingest_rows(rows: &[RawRow]) -> IngestResult {
    let mut result = IngestResult::default();
    for (idx, row) in rows.iter().enumerate() {
        result.accept(&(idx + 1).to_string(), row);
    }
    result
}

/// 解析一批邮件
pub fn ingest_messages(messages: &[Message]) -> IngestResult {
    let mut result = IngestResult::default();
    for message in messages {
        match parse_message(&message.body) {
            Ok(row) => result.accept(&message.id, &row),
            Err(e) => result.drop_record(&message.id, &e),
        }
    }
    result
}

/// 一个周期的输出
#[derive(Debug, Clone)]
pub struct CycleOutput {
    /// 按到达顺序的订单
    pub orders: Vec<Order>,
    pub report: ReportSet,
    pub dropped: usize,
}

/// 周期输出的去处（文件、网站等）
pub trait ReportSink {
    fn publish(&self, output: &CycleOutput) -> impl Future<Output = AppResult<()>>;
}

/// 周期结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 有新订单，已重新汇总并发布
    Published { count: usize, dropped: usize },
    /// 没有新订单
    Unchanged { count: usize, dropped: usize },
}

impl CycleOutcome {
    /// 本周期成功提取的订单数
    pub fn count(&self) -> usize {
        match self {
            CycleOutcome::Published { count, .. } | CycleOutcome::Unchanged { count, .. } => *count,
        }
    }

    /// 下一周期的对比基准：只有发布后才更新，
    /// 订单数回落（例如邮件被移走）不会降低基准
    pub fn baseline(&self, previous_count: usize) -> usize {
        match self {
            CycleOutcome::Published { count, .. } => *count,
            CycleOutcome::Unchanged { .. } => previous_count,
        }
    }
}

/// 执行一个周期
///
/// 订单数比 `previous_count` 多时才重新汇总并发布。
/// 消息源或输出失败时直接返回错误，不在周期内重试。
pub async fn run_cycle<S, K>(source: &S, sink: &K, previous_count: usize) -> AppResult<CycleOutcome>
where
    S: MessageSource,
    K: ReportSink,
{
    let messages = source.fetch_messages().await?;
    debug!("取回 {} 封消息", messages.len());

    let ingest = ingest_messages(&messages);
    let count = ingest.repository.count();
    let dropped = ingest.dropped;

    if count <= previous_count {
        info!("没有新的订单 (当前 {} 个)", count);
        return Ok(CycleOutcome::Unchanged { count, dropped });
    }

    info!("🆕 发现新订单，当前订单数: {} (丢弃 {} 条)", count, dropped);
    if ingest.flagged > 0 {
        warn!("⚠️ {} 个订单含有无法识别的字段", ingest.flagged);
    }

    let orders = ingest.repository.into_orders();
    let report = build_report_set(&orders);
    let output = CycleOutput {
        orders,
        report,
        dropped,
    };
    sink.publish(&output).await?;

    Ok(CycleOutcome::Published { count, dropped })
}
