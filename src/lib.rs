//! # Herbstfest Orders
//!
//! 读取 Herbstfest 订单邮件，统计烤盘和甜酒需求并发布统计页面
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 原始表格、规范化订单、结果表
//! - `store/` - 单个周期内的订单仓库
//!
//! ### ② 业务能力层（Services）
//! - `table_parser` - 从邮件 HTML 中取出第一个表格
//! - `field_extractor` / `order_validator` - 按位置取字段并规范化
//! - `aggregation` - 按日期/时间段/做法汇总，生成全部视图
//! - `html_report` / `order_slip` / `report_writer` - 各种输出
//!
//! ### ③ 外部接入（Clients）
//! - `MessageSource` - 消息源抽象，`FolderSource` 读取目录中的邮件
//! - `WordpressClient` - 发布公开统计页面
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/cycle` - 单个周期：取消息 → 解析 → 汇总 → 输出
//! - `orchestrator/poller` - 定时轮询，响应停止信号
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;

// 重新导出常用类型
pub use app::{App, ReportPipeline};
pub use clients::{FolderSource, Message, MessageSource, WordpressClient};
pub use config::Config;
pub use error::{AppError, AppResult, ExtractionError};
pub use models::{Order, ReportSet, ResultTable, ViewName};
pub use orchestrator::{run_cycle, CycleOutcome, Poller, PollSummary, ReportSink};
pub use services::build_report_set;
pub use store::OrderRepository;
