//! 报表文件写入服务 - 业务能力层
//!
//! 只负责把结果写到本地文件：
//! - 完整报表（包括敏感视图）写成 JSON，供组织者使用
//! - 订单单据写成文本，供打印

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::order::Order;
use crate::models::table::ReportSet;
use crate::services::order_slip::render_slips;

/// 报表文件写入服务
pub struct ReportWriter {
    report_file: String,
    slip_file: Option<String>,
}

impl ReportWriter {
    pub fn new(report_file: impl Into<String>) -> Self {
        Self {
            report_file: report_file.into(),
            slip_file: None,
        }
    }

    /// 同时输出订单单据
    pub fn with_slip_file(mut self, path: impl Into<String>) -> Self {
        self.slip_file = Some(path.into());
        self
    }

    /// 写入完整报表
    pub async fn write_report(&self, report: &ReportSet) -> AppResult<()> {
        let json = serde_json::to_string_pretty(report).map_err(crate::error::PublishError::from)?;
        debug!("写入报表: {} ({} 字节)", self.report_file, json.len());
        fs::write(&self.report_file, json)
            .await
            .map_err(|e| AppError::write_failed(&self.report_file, e))
    }

    /// 写入订单单据，未配置单据文件时跳过
    pub async fn write_slips(&self, orders: &[Order]) -> AppResult<()> {
        let Some(path) = &self.slip_file else {
            return Ok(());
        };
        let content = render_slips(orders);
        debug!("写入订单单据: {} ({} 个订单)", path, orders.len());
        fs::write(path, content)
            .await
            .map_err(|e| AppError::write_failed(path, e))
    }
}
