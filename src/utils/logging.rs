/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::cycle::CycleOutcome;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn now() -> String {
    chrono::Local::now().format("%d-%m-%Y %H:%M:%S").to_string()
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 {} 启动 Herbstfest 订单汇总", now());
    info!("📁 消息目录: {} (主题: {})", config.message_folder, config.message_subject);
    info!("⏱️ 轮询间隔: {} 分钟", config.sleep_timer_min);
    if config.publish_enabled {
        info!("🌐 发布到: {}{}", config.wp_url, config.wp_postid);
    }
    info!("{}", "=".repeat(60));
}

/// 记录周期开始
pub fn log_cycle_start(cycle: usize) {
    info!("{} 🔍 第 {} 轮：检查新订单", now(), cycle);
}

/// 记录发布完成
pub fn log_cycle_published(outcome: &CycleOutcome, elapsed: Duration) {
    info!("{}", "─".repeat(60));
    info!("✓ 订单汇总已更新: {} 个订单", outcome.count());
    if let CycleOutcome::Published { dropped, .. } = outcome {
        if *dropped > 0 {
            info!("❌ 无法解析的记录: {}", dropped);
        }
    }
    info!("⏱️ 用时 {:.3}s", elapsed.as_secs_f64());
    info!("{}", "─".repeat(60));
}

/// 记录停止信息
pub fn log_shutdown(cycles: usize, published: usize, failed: usize) {
    info!("\n{}", "=".repeat(60));
    info!("🛑 {} 停止 Herbstfest 订单汇总", now());
    info!("📊 共 {} 轮，发布 {} 次，失败 {} 次", cycles, published, failed);
    info!("{}", "=".repeat(60));
}
