//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责周期调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `cycle` - 单个处理周期
//! - 取回消息（MessageSource）
//! - 逐条解析订单，统计丢弃/异常记录
//! - 构建订单仓库并汇总
//! - 有新订单时交给输出端（ReportSink）
//!
//! ### `poller` - 轮询循环
//! - 按间隔执行周期
//! - 在周期之间传递上一次的订单数
//! - 响应停止信号（中断等待、放弃未完成的周期）
//!
//! ## 层次关系
//!
//! ```text
//! poller (循环 + 停止信号)
//!     ↓
//! cycle (处理 Vec<Message>)
//!     ↓
//! services (能力层：解析 / 规范化 / 汇总 / 渲染)
//!     ↓
//! models (数据模型)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：poller 管时间，cycle 管一次处理
//! 2. **无跨周期状态**：订单仓库每个周期重新构建
//! 3. **向下依赖**：编排层 → services → models
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod cycle;
pub mod poller;

// 重新导出主要类型
pub use cycle::{ingest_messages, ingest_rows, run_cycle, CycleOutcome, CycleOutput, ReportSink};
pub use poller::{wait_for_shutdown, PollSummary, Poller};
